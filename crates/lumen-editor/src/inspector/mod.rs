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

//! The inspector capability and the reflective dispatcher.
//!
//! An [`Inspector`] renders and edits one value of one concrete type. The
//! [`InspectorRegistry`] maps each registered type to its inspector, and
//! [`dispatch`] / [`inspect_var`] resolve the inspector for a value's exact
//! runtime type, falling back to the [`GenericInspector`] which walks the
//! value's reflected fields and dispatches each one in turn.

mod coretypes;
mod dispatch;
mod generic;
mod registry;

use std::marker::PhantomData;
use std::ops::{BitOr, BitOrAssign};

use lumen_core::context::{ContextError, TypedContext};
use lumen_core::reflect::{MetadataAccessor, Reflect, TypeInfo};
use thiserror::Error;

pub use coretypes::{
    register_builtin_inspectors, BoolInspector, Scalar, ScalarInspector, StringInspector,
};
pub use dispatch::{dispatch, inspect_var};
pub use generic::GenericInspector;
pub use registry::{InspectorRegistration, InspectorRegistry, RegistryError};

/// Outcome of one inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InspectResult {
    /// Nothing was edited.
    #[default]
    Unchanged,
    /// The value was mutated; downstream systems must treat it as dirty.
    Changed {
        /// The user finished the edit (released the slider, committed the text).
        edit_finished: bool,
    },
    /// The value did not have the shape the inspector expected.
    Invalid,
}

impl InspectResult {
    /// A completed edit.
    #[must_use]
    pub fn finished() -> Self {
        InspectResult::Changed {
            edit_finished: true,
        }
    }

    /// An edit still in progress (e.g. mid-drag).
    #[must_use]
    pub fn in_progress() -> Self {
        InspectResult::Changed {
            edit_finished: false,
        }
    }

    /// Returns `true` if the value was mutated.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, InspectResult::Changed { .. })
    }

    /// Returns `true` if the value was structurally incompatible.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, InspectResult::Invalid)
    }

    /// Returns `true` if a change was committed.
    #[must_use]
    pub fn edit_finished(&self) -> bool {
        matches!(
            self,
            InspectResult::Changed {
                edit_finished: true
            }
        )
    }

    /// Combines the results of two sibling inspections.
    ///
    /// `Changed` wins over `Invalid`, which wins over `Unchanged`: a mutation
    /// must never be hidden from dirty tracking. `edit_finished` is OR-ed.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        use InspectResult::*;
        match (self, other) {
            (Changed { edit_finished: a }, Changed { edit_finished: b }) => Changed {
                edit_finished: a || b,
            },
            (changed @ Changed { .. }, _) | (_, changed @ Changed { .. }) => changed,
            (Invalid, _) | (_, Invalid) => Invalid,
            (Unchanged, Unchanged) => Unchanged,
        }
    }
}

impl BitOr for InspectResult {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.merge(rhs)
    }
}

impl BitOrAssign for InspectResult {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.merge(rhs);
    }
}

/// Hard failures of an inspection. Unlike [`InspectResult::Invalid`], these
/// are programming or setup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    /// A service required by the dispatcher or by an inspector is missing or busy.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The inspected object's lock was poisoned by a panicking writer.
    #[error("inspected object is poisoned")]
    Poisoned,
}

/// Per-variable information passed alongside the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInfo {
    /// The widget label: the field name, or the type name at the root.
    pub label: &'static str,
    /// Display only; inspectors must not mutate the value.
    pub read_only: bool,
    /// How many structural levels above this value the generic inspector walked.
    pub depth: usize,
}

impl VarInfo {
    /// Info for a top-level value.
    #[must_use]
    pub fn root(label: &'static str) -> Self {
        Self {
            label,
            read_only: false,
            depth: 0,
        }
    }

    /// Info for a field one level below `self`. Read-only propagates downward.
    #[must_use]
    pub fn nested(&self, label: &'static str, read_only: bool) -> Self {
        Self {
            label,
            read_only: self.read_only || read_only,
            depth: self.depth + 1,
        }
    }

    /// Returns a copy with `read_only` set.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// The capability of rendering and editing a value of one concrete type.
///
/// Inspectors pull whatever services they need (UI surface, editing
/// manager, asset writer, ...) from `ctx`; the dispatcher knows nothing
/// about those dependencies.
pub trait Inspector: Send + Sync {
    /// Renders `value` and applies the user's edits to it.
    fn inspect(
        &self,
        ctx: &TypedContext,
        value: &mut dyn Reflect,
        info: &VarInfo,
        meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError>;
}

/// A statically typed inspector for `T`.
///
/// Register it with [`InspectorRegistry::register`]; the registry keys it by
/// `T`'s exact type and downcasts before calling it.
pub trait TypedInspector<T: Reflect>: Send + Sync {
    /// Renders `value` and applies the user's edits to it.
    fn inspect_typed(
        &self,
        ctx: &TypedContext,
        value: &mut T,
        info: &VarInfo,
        meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError>;
}

struct Typed<T, I> {
    inner: I,
    _target: PhantomData<fn() -> T>,
}

impl<T: Reflect, I: TypedInspector<T>> Inspector for Typed<T, I> {
    fn inspect(
        &self,
        ctx: &TypedContext,
        value: &mut dyn Reflect,
        info: &VarInfo,
        meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError> {
        let actual = value.type_info();
        match value.downcast_mut::<T>() {
            Some(value) => self.inner.inspect_typed(ctx, value, info, meta),
            None => {
                log::warn!(
                    "Inspector for `{}` was handed a `{}`",
                    TypeInfo::of::<T>().type_name(),
                    actual.type_name()
                );
                Ok(InspectResult::Invalid)
            }
        }
    }
}

/// Erases a [`TypedInspector`] into a boxed [`Inspector`].
pub fn boxed<T, I>(inspector: I) -> Box<dyn Inspector>
where
    T: Reflect,
    I: TypedInspector<T> + 'static,
{
    Box::new(Typed {
        inner: inspector,
        _target: PhantomData,
    })
}

/// Registers a [`TypedInspector`] at link time.
///
/// The inspector type must implement `Default`. Collected by
/// [`InspectorRegistry::with_registered`].
///
/// ```ignore
/// lumen_editor::register_inspector!(LightInspector => Light);
/// ```
#[macro_export]
macro_rules! register_inspector {
    ($inspector:ty => $target:ty) => {
        $crate::inventory::submit! {
            $crate::inspector::InspectorRegistration {
                type_info: || $crate::lumen_core::reflect::TypeInfo::of::<$target>(),
                factory: || $crate::inspector::boxed::<$target, $inspector>(
                    <$inspector as ::std::default::Default>::default(),
                ),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_changes() {
        use InspectResult::*;
        assert_eq!(Unchanged | Unchanged, Unchanged);
        assert_eq!(Unchanged | Invalid, Invalid);
        assert_eq!(Invalid | InspectResult::in_progress(), InspectResult::in_progress());
        assert_eq!(
            InspectResult::in_progress() | InspectResult::finished(),
            InspectResult::finished()
        );

        let mut acc = Unchanged;
        acc |= InspectResult::in_progress();
        acc |= Invalid;
        assert!(acc.is_changed());
        assert!(!acc.edit_finished());
    }

    #[test]
    fn test_nested_var_info_propagates_read_only() {
        let root = VarInfo::root("Light").with_read_only(true);
        let child = root.nested("intensity", false);
        assert!(child.read_only);
        assert_eq!(child.depth, 1);
        assert_eq!(child.label, "intensity");

        let writable = VarInfo::root("Light").nested("version", true);
        assert!(writable.read_only);
    }
}
