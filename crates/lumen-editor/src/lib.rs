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

//! # Lumen Editor
//!
//! The inspector half of the editor backbone: a type-keyed registry of
//! [`Inspector`](inspector::Inspector)s, the reflective dispatcher that picks
//! the right one for a runtime-typed value, the generic structural fallback,
//! and the [`InspectorPanel`](panel::InspectorPanel) that feeds it the current
//! (or locked) selection every frame.
//!
//! Every collaborator is reached through the shared
//! [`TypedContext`](lumen_core::TypedContext); inspectors never reference
//! each other directly.

#![warn(missing_docs)]

pub mod editing;
pub mod inspector;
pub mod object;
pub mod panel;
pub mod settings;
pub mod ui;

pub use lumen_core;

#[doc(hidden)]
pub use inventory;

pub use editing::{EditingManager, EditingSubsystem, SelectionProvider};
pub use inspector::{
    dispatch, inspect_var, InspectError, InspectResult, Inspector, InspectorRegistry,
    RegistryError, TypedInspector, VarInfo,
};
pub use object::ObjectRef;
pub use panel::InspectorPanel;
pub use settings::InspectorSettings;
pub use ui::{HeadlessUi, UiBackend, UiSurface};
