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

//! Type-keyed inspector registry.

use std::any::TypeId;
use std::collections::HashMap;

use lumen_core::reflect::{Reflect, TypeInfo};
use thiserror::Error;

use super::{boxed, coretypes, GenericInspector, Inspector, TypedInspector};

/// Errors raised while registering inspectors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The type already has an inspector and overwriting was not requested.
    #[error("an inspector for `{type_name}` is already registered")]
    DuplicateRegistration {
        /// The fully qualified name of the inspected type.
        type_name: &'static str,
    },
}

/// A link-time inspector registration, submitted with
/// [`register_inspector!`](crate::register_inspector).
pub struct InspectorRegistration {
    /// The exact type the inspector handles.
    pub type_info: fn() -> TypeInfo,
    /// Builds the inspector.
    pub factory: fn() -> Box<dyn Inspector>,
}

inventory::collect!(InspectorRegistration);

struct Registered {
    type_name: &'static str,
    inspector: Box<dyn Inspector>,
}

/// A registry that maps concrete types to their inspectors.
///
/// Resolution is exact-type only: a value whose type has no registration is
/// handled by the fallback inspector, never by the inspector of some related
/// type.
pub struct InspectorRegistry {
    inspectors: HashMap<TypeId, Registered>,
    fallback: Box<dyn Inspector>,
}

impl InspectorRegistry {
    /// Creates a registry with no registrations and the [`GenericInspector`] fallback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inspectors: HashMap::new(),
            fallback: Box::new(GenericInspector),
        }
    }

    /// Creates a registry holding the built-in core-type inspectors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        // A fresh registry cannot hold duplicates.
        if let Err(err) = coretypes::register_builtin_inspectors(&mut registry) {
            log::error!("InspectorRegistry: built-in registration failed: {err}");
        }
        registry
    }

    /// Creates a registry holding the built-ins plus every inspector
    /// submitted with [`register_inspector!`](crate::register_inspector).
    ///
    /// With `allow_override`, a submitted inspector replaces a built-in or an
    /// earlier submission for the same type; otherwise duplicates are errors.
    pub fn with_registered(allow_override: bool) -> Result<Self, RegistryError> {
        let mut registry = Self::with_builtins();
        for registration in inventory::iter::<InspectorRegistration> {
            let type_info = (registration.type_info)();
            let inspector = (registration.factory)();
            if allow_override {
                registry.register_inspector_overwrite(type_info, inspector);
            } else {
                registry.register_inspector(type_info, inspector)?;
            }
        }
        Ok(registry)
    }

    /// Associates `inspector` with the exact type described by `type_info`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRegistration`] if the type already
    /// has an inspector. Use
    /// [`register_inspector_overwrite`](Self::register_inspector_overwrite)
    /// to replace one deliberately.
    pub fn register_inspector(
        &mut self,
        type_info: TypeInfo,
        inspector: Box<dyn Inspector>,
    ) -> Result<(), RegistryError> {
        if self.inspectors.contains_key(&type_info.type_id()) {
            return Err(RegistryError::DuplicateRegistration {
                type_name: type_info.type_name(),
            });
        }

        log::info!(
            "InspectorRegistry: registered inspector for `{}`",
            type_info.type_name()
        );
        self.inspectors.insert(
            type_info.type_id(),
            Registered {
                type_name: type_info.type_name(),
                inspector,
            },
        );
        Ok(())
    }

    /// Registers a [`TypedInspector`] for `T`.
    pub fn register<T, I>(&mut self, inspector: I) -> Result<(), RegistryError>
    where
        T: Reflect,
        I: TypedInspector<T> + 'static,
    {
        self.register_inspector(TypeInfo::of::<T>(), boxed::<T, I>(inspector))
    }

    /// Associates `inspector` with the type, replacing any existing one.
    ///
    /// Returns the replaced inspector, if there was one.
    pub fn register_inspector_overwrite(
        &mut self,
        type_info: TypeInfo,
        inspector: Box<dyn Inspector>,
    ) -> Option<Box<dyn Inspector>> {
        let previous = self.inspectors.insert(
            type_info.type_id(),
            Registered {
                type_name: type_info.type_name(),
                inspector,
            },
        );
        match &previous {
            Some(_) => log::info!(
                "InspectorRegistry: overrode inspector for `{}`",
                type_info.type_name()
            ),
            None => log::info!(
                "InspectorRegistry: registered inspector for `{}`",
                type_info.type_name()
            ),
        }
        previous.map(|registered| registered.inspector)
    }

    /// Returns the inspector for exactly `type_id`, or the fallback.
    ///
    /// Never fails.
    #[must_use]
    pub fn resolve(&self, type_id: TypeId) -> &dyn Inspector {
        self.resolve_exact(type_id).unwrap_or(self.fallback.as_ref())
    }

    /// Returns the inspector registered for exactly `type_id`, if any.
    #[must_use]
    pub fn resolve_exact(&self, type_id: TypeId) -> Option<&dyn Inspector> {
        self.inspectors
            .get(&type_id)
            .map(|registered| registered.inspector.as_ref())
    }

    /// The inspector used for types without a registration.
    #[must_use]
    pub fn fallback(&self) -> &dyn Inspector {
        self.fallback.as_ref()
    }

    /// Replaces the fallback inspector.
    pub fn set_fallback(&mut self, fallback: Box<dyn Inspector>) {
        self.fallback = fallback;
    }

    /// Returns `true` if `type_id` has its own inspector.
    #[must_use]
    pub fn is_registered(&self, type_id: TypeId) -> bool {
        self.inspectors.contains_key(&type_id)
    }

    /// Number of registered (non-fallback) inspectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inspectors.len()
    }

    /// Returns `true` if no type has its own inspector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inspectors.is_empty()
    }

    /// Names of the types with their own inspector, sorted.
    pub fn registered_type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inspectors.values().map(|r| r.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl Default for InspectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
