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

//! The boundary to the immediate-mode GUI library.
//!
//! Inspectors draw through the [`UiSurface`] service, which wraps whatever
//! [`UiBackend`] the host installed. [`HeadlessUi`] is a backend without a
//! window: it records every widget it is asked to draw and applies edits
//! queued ahead of time, which is how tests and the demo binary drive the
//! inspectors.

use std::any::Any;
use std::collections::{HashMap, HashSet};

/// The widgets an inspector may draw.
///
/// Every call returns `true` only if the user changed the value this frame.
/// Labels are scoped by the enclosing groups, like an immediate-mode ID stack.
pub trait UiBackend {
    /// Draws a read-only line of text.
    fn text(&mut self, label: &str, text: &str);

    /// Draws a checkbox.
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    /// Draws an unbounded drag field.
    fn drag_f64(&mut self, label: &str, value: &mut f64, speed: f64) -> bool;

    /// Draws a slider clamped to `min..=max`.
    fn slider_f64(&mut self, label: &str, value: &mut f64, min: f64, max: f64) -> bool;

    /// Draws a single-line text field.
    fn text_edit(&mut self, label: &str, value: &mut String) -> bool;

    /// Opens a collapsible group. Returns `false` if it is collapsed, in which
    /// case [`end_group`](Self::end_group) must not be called.
    fn begin_group(&mut self, label: &str) -> bool;

    /// Closes the innermost open group.
    fn end_group(&mut self);

    /// Draws a toggle button; returns `true` when clicked.
    fn toggle(&mut self, label: &str, active: bool) -> bool;

    /// Attaches a tooltip to the last widget.
    fn tooltip(&mut self, text: &str) {
        let _ = text;
    }

    /// Upcasts to [`Any`], so hosts can reach their concrete backend.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] mutably.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The UI service stored in the context.
pub struct UiSurface {
    backend: Box<dyn UiBackend>,
}

impl UiSurface {
    /// Wraps a backend.
    pub fn new(backend: impl UiBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// The concrete backend, if it is a `B`.
    pub fn backend<B: UiBackend + 'static>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref::<B>()
    }

    /// The concrete backend mutably, if it is a `B`.
    pub fn backend_mut<B: UiBackend + 'static>(&mut self) -> Option<&mut B> {
        self.backend.as_any_mut().downcast_mut::<B>()
    }
}

impl std::ops::Deref for UiSurface {
    type Target = dyn UiBackend;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}

impl std::ops::DerefMut for UiSurface {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.backend.as_mut()
    }
}

/// Kind of a widget recorded by [`HeadlessUi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// [`UiBackend::text`]
    Text,
    /// [`UiBackend::checkbox`]
    Checkbox,
    /// [`UiBackend::drag_f64`]
    Drag,
    /// [`UiBackend::slider_f64`]
    Slider,
    /// [`UiBackend::text_edit`]
    TextEdit,
    /// [`UiBackend::begin_group`]
    Group,
    /// [`UiBackend::toggle`]
    Toggle,
}

/// One widget drawn by [`HeadlessUi`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnWidget {
    /// Label qualified by its enclosing groups, e.g. `Light/intensity`.
    pub id: String,
    /// What was drawn.
    pub kind: WidgetKind,
    /// The displayed value after any edit was applied.
    pub value: String,
}

/// An edit waiting to be applied by [`HeadlessUi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// New checkbox state.
    Bool(bool),
    /// New numeric value for a drag field or slider.
    Number(f64),
    /// New text field contents.
    Text(String),
}

/// A windowless [`UiBackend`].
///
/// Edits are queued by qualified id and consumed by the first matching
/// widget. A widget reports a change only if the edit actually differs from
/// the current value.
#[derive(Debug, Default)]
pub struct HeadlessUi {
    groups: Vec<String>,
    drawn: Vec<DrawnWidget>,
    pending: HashMap<String, Edit>,
    clicks: HashSet<String>,
    collapsed: HashSet<String>,
}

impl HeadlessUi {
    /// Creates a backend with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `edit` for the widget with qualified id `id`.
    pub fn queue_edit(&mut self, id: impl Into<String>, edit: Edit) {
        self.pending.insert(id.into(), edit);
    }

    /// Queues a click on the toggle with qualified id `id`.
    pub fn queue_click(&mut self, id: impl Into<String>) {
        self.clicks.insert(id.into());
    }

    /// Collapses (or expands) the group with qualified id `id`.
    pub fn set_collapsed(&mut self, id: impl Into<String>, collapsed: bool) {
        let id = id.into();
        if collapsed {
            self.collapsed.insert(id);
        } else {
            self.collapsed.remove(&id);
        }
    }

    /// Widgets drawn since the last [`begin_frame`](Self::begin_frame).
    #[must_use]
    pub fn drawn(&self) -> &[DrawnWidget] {
        &self.drawn
    }

    /// Looks up the widget drawn under `id` this frame.
    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&DrawnWidget> {
        self.drawn.iter().find(|w| w.id == id)
    }

    /// Returns `true` if queued edits or clicks have not been consumed yet.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || !self.clicks.is_empty()
    }

    /// Clears the widget log for a new frame. Unconsumed edits stay queued.
    pub fn begin_frame(&mut self) {
        self.drawn.clear();
        self.groups.clear();
    }

    fn qualify(&self, label: &str) -> String {
        if self.groups.is_empty() {
            label.to_owned()
        } else {
            format!("{}/{}", self.groups.join("/"), label)
        }
    }

    fn record(&mut self, id: String, kind: WidgetKind, value: String) {
        self.drawn.push(DrawnWidget { id, kind, value });
    }

    fn edit_number(
        &mut self,
        label: &str,
        value: &mut f64,
        kind: WidgetKind,
        clamp: Option<(f64, f64)>,
    ) -> bool {
        let id = self.qualify(label);
        let mut changed = false;
        if let Some(Edit::Number(mut new)) = self.pending.get(&id).cloned() {
            self.pending.remove(&id);
            if let Some((min, max)) = clamp {
                new = new.clamp(min, max);
            }
            if new != *value {
                *value = new;
                changed = true;
            }
        }
        self.record(id, kind, value.to_string());
        changed
    }
}

impl UiBackend for HeadlessUi {
    fn text(&mut self, label: &str, text: &str) {
        let id = self.qualify(label);
        self.record(id, WidgetKind::Text, text.to_owned());
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let id = self.qualify(label);
        let mut changed = false;
        if let Some(Edit::Bool(new)) = self.pending.get(&id).cloned() {
            self.pending.remove(&id);
            changed = new != *value;
            *value = new;
        }
        self.record(id, WidgetKind::Checkbox, value.to_string());
        changed
    }

    fn drag_f64(&mut self, label: &str, value: &mut f64, _speed: f64) -> bool {
        self.edit_number(label, value, WidgetKind::Drag, None)
    }

    fn slider_f64(&mut self, label: &str, value: &mut f64, min: f64, max: f64) -> bool {
        self.edit_number(label, value, WidgetKind::Slider, Some((min, max)))
    }

    fn text_edit(&mut self, label: &str, value: &mut String) -> bool {
        let id = self.qualify(label);
        let mut changed = false;
        if let Some(Edit::Text(new)) = self.pending.get(&id).cloned() {
            self.pending.remove(&id);
            if new != *value {
                *value = new;
                changed = true;
            }
        }
        self.record(id, WidgetKind::TextEdit, value.clone());
        changed
    }

    fn begin_group(&mut self, label: &str) -> bool {
        let id = self.qualify(label);
        let open = !self.collapsed.contains(&id);
        self.record(id, WidgetKind::Group, open.to_string());
        if open {
            self.groups.push(label.to_owned());
        }
        open
    }

    fn end_group(&mut self) {
        self.groups.pop();
    }

    fn toggle(&mut self, label: &str, active: bool) -> bool {
        let id = self.qualify(label);
        let clicked = self.clicks.remove(&id);
        self.record(id, WidgetKind::Toggle, active.to_string());
        clicked
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
