// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The editor's current selection and focus.

use lumen_core::bootstrap::Subsystem;
use lumen_core::context::TypedContext;
use lumen_core::reflect::Reflect;

use crate::object::ObjectRef;

/// Number of frames a focus request stays active.
pub const FOCUS_FRAMES: u32 = 100;

/// Anything that can tell the inspector what is currently selected.
pub trait SelectionProvider {
    /// The selected object, if any.
    fn current_selection(&self) -> Option<ObjectRef>;
}

#[derive(Debug, Clone)]
struct Focus {
    object: ObjectRef,
    frames: u32,
}

/// Tracks the object selected in the editor and the object the viewport
/// was last asked to focus on.
///
/// Registered in the context by [`EditingSubsystem`].
#[derive(Debug, Default)]
pub struct EditingManager {
    selection: Option<ObjectRef>,
    focus: Option<Focus>,
}

impl EditingManager {
    /// Creates a manager with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `object`, replacing the previous selection.
    pub fn select(&mut self, object: ObjectRef) {
        log::debug!("EditingManager: selected {object:?}");
        self.selection = Some(object);
    }

    /// Clears the selection.
    pub fn unselect(&mut self) {
        if self.selection.take().is_some() {
            log::debug!("EditingManager: selection cleared");
        }
    }

    /// Clears the selection only if it holds a `T`. Returns whether it did.
    pub fn try_unselect<T: Reflect>(&mut self) -> bool {
        let matches = self.selection.as_ref().is_some_and(ObjectRef::is::<T>);
        if matches {
            self.unselect();
        }
        matches
    }

    /// Whether `object` is the current selection (by identity).
    pub fn is_selected(&self, object: &ObjectRef) -> bool {
        self.selection.as_ref() == Some(object)
    }

    /// The current selection.
    pub fn selected(&self) -> Option<&ObjectRef> {
        self.selection.as_ref()
    }

    /// Focuses `object` for the next [`FOCUS_FRAMES`] frames.
    pub fn focus(&mut self, object: ObjectRef) {
        log::debug!("EditingManager: focusing {object:?}");
        self.focus = Some(Focus {
            object,
            frames: FOCUS_FRAMES,
        });
    }

    /// Clears the focus.
    pub fn unfocus(&mut self) {
        self.focus = None;
    }

    /// Clears the focus only if it holds a `T`. Returns whether it did.
    pub fn try_unfocus<T: Reflect>(&mut self) -> bool {
        let matches = self.focus.as_ref().is_some_and(|f| f.object.is::<T>());
        if matches {
            self.unfocus();
        }
        matches
    }

    /// Whether `object` is the focused object (by identity).
    pub fn is_focused(&self, object: &ObjectRef) -> bool {
        self.focused() == Some(object)
    }

    /// The focused object.
    pub fn focused(&self) -> Option<&ObjectRef> {
        self.focus.as_ref().map(|f| &f.object)
    }

    /// Advances one frame. The focus expires once its frames run out.
    pub fn on_frame_update(&mut self) {
        if let Some(focus) = &mut self.focus {
            focus.frames = focus.frames.saturating_sub(1);
            if focus.frames == 0 {
                log::trace!("EditingManager: focus expired");
                self.focus = None;
            }
        }
    }

    /// Drops both the selection and the focus, e.g. when a project closes.
    pub fn clear(&mut self) {
        self.unselect();
        self.unfocus();
    }
}

impl SelectionProvider for EditingManager {
    fn current_selection(&self) -> Option<ObjectRef> {
        self.selection.clone()
    }
}

/// Owns the [`EditingManager`] service.
#[derive(Debug, Default)]
pub struct EditingSubsystem;

impl Subsystem for EditingSubsystem {
    fn name(&self) -> &str {
        "editing"
    }

    fn init(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()> {
        ctx.add(EditingManager::new())?;
        Ok(())
    }

    fn deinit(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()> {
        ctx.remove::<EditingManager>()?;
        Ok(())
    }
}
