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

//! The inspector panel: shows the current selection, or a locked object.

use lumen_core::bootstrap::Subsystem;
use lumen_core::context::{CachedHandle, TypedContext};

use crate::editing::{EditingManager, SelectionProvider};
use crate::inspector::{dispatch, InspectError, InspectResult, InspectorRegistry};
use crate::object::ObjectRef;
use crate::settings::InspectorSettings;
use crate::ui::UiSurface;

/// Label of the lock toggle in the panel's menu bar.
pub const LOCK_TOGGLE: &str = "lock";

/// Renders one object per frame through the inspector registry.
///
/// While unlocked the panel follows the [`EditingManager`] selection. Locking
/// pins whatever was selected at that moment, and later selection changes are
/// ignored until the panel is unlocked again.
///
/// As a [`Subsystem`] it owns the [`InspectorRegistry`] service, plus the
/// [`InspectorSettings`] service unless the host already added one.
#[derive(Debug)]
pub struct InspectorPanel {
    settings: InspectorSettings,
    owns_settings: bool,
    locked_object: Option<ObjectRef>,
    editing: Option<CachedHandle<EditingManager>>,
}

impl Default for InspectorPanel {
    fn default() -> Self {
        Self::new(InspectorSettings::default())
    }
}

impl InspectorPanel {
    /// Creates an unlocked panel.
    pub fn new(settings: InspectorSettings) -> Self {
        Self {
            settings,
            owns_settings: false,
            locked_object: None,
            editing: None,
        }
    }

    /// Whether the panel is pinned to an object.
    pub fn is_locked(&self) -> bool {
        self.locked_object.is_some()
    }

    /// The pinned object, if any.
    pub fn locked_object(&self) -> Option<&ObjectRef> {
        self.locked_object.as_ref()
    }

    /// Flips the lock. Locking pins `selection`; with nothing selected the
    /// panel stays unlocked. Returns the new lock state.
    pub fn toggle_lock(&mut self, selection: Option<&ObjectRef>) -> bool {
        self.locked_object = match self.locked_object.take() {
            Some(_) => None,
            None => selection.cloned(),
        };
        log::debug!(
            "InspectorPanel: {}",
            if self.is_locked() { "locked" } else { "unlocked" }
        );
        self.is_locked()
    }

    /// The object to inspect this frame: the locked one, else `selection`.
    pub fn dispatch_target<'a>(
        &'a self,
        selection: Option<&'a ObjectRef>,
    ) -> Option<&'a ObjectRef> {
        self.locked_object.as_ref().or(selection)
    }

    /// Draws the panel for one frame.
    ///
    /// The lock toggle is drawn and applied first, so a click takes effect on
    /// this frame's dispatch. Returns `None` when there is nothing to inspect.
    pub fn on_frame_ui_render(
        &mut self,
        ctx: &TypedContext,
    ) -> Result<Option<InspectResult>, InspectError> {
        let selection = self.current_selection(ctx)?;

        let clicked = {
            let mut ui = ctx.get_mut::<UiSurface>()?;
            let clicked = ui.toggle(LOCK_TOGGLE, self.is_locked());
            ui.tooltip("Lock/Unlock Inspector");
            clicked
        };
        if clicked {
            self.toggle_lock(selection.as_ref());
        }

        let Some(target) = self.dispatch_target(selection.as_ref()).cloned() else {
            return Ok(None);
        };
        let title = target.type_info().short_name();

        if !ctx.get_mut::<UiSurface>()?.begin_group(title) {
            return Ok(Some(InspectResult::Unchanged));
        }
        let result = dispatch(ctx, &target);
        ctx.get_mut::<UiSurface>()?.end_group();

        let result = result?;
        if result.is_invalid() {
            log::warn!("InspectorPanel: `{title}` does not match its inspector");
        }
        log::trace!("InspectorPanel: `{title}` -> {result:?}");
        Ok(Some(result))
    }

    fn current_selection(
        &mut self,
        ctx: &TypedContext,
    ) -> Result<Option<ObjectRef>, InspectError> {
        let handle = match self.editing.take() {
            Some(handle) if handle.is_valid() => handle,
            _ => ctx.get_cached::<EditingManager>()?,
        };
        let selection = handle.try_get()?.current_selection();
        self.editing = Some(handle);
        Ok(selection)
    }
}

impl Subsystem for InspectorPanel {
    fn name(&self) -> &str {
        "inspector"
    }

    fn init(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()> {
        // Settings go in last so a failed registry leaves the context untouched.
        let allow_override = match ctx.get::<InspectorSettings>() {
            Ok(host) => host.allow_override,
            Err(_) => self.settings.allow_override,
        };
        let registry = InspectorRegistry::with_registered(allow_override)?;
        let count = registry.len();
        ctx.add(registry)?;

        if !ctx.has::<InspectorSettings>() {
            ctx.add(self.settings.clone())?;
            self.owns_settings = true;
        }
        log::info!("InspectorPanel: {count} inspectors registered");
        Ok(())
    }

    fn deinit(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()> {
        self.editing = None;
        self.locked_object = None;
        ctx.remove::<InspectorRegistry>()?;
        if self.owns_settings {
            ctx.remove::<InspectorSettings>()?;
            self.owns_settings = false;
        }
        Ok(())
    }
}
