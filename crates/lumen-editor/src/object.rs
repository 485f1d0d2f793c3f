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

//! Shared, identity-compared references to inspectable objects.

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use lumen_core::reflect::{Reflect, TypeInfo};

use crate::inspector::InspectError;

/// A dynamically typed reference to an object of interest (an entity
/// component, an asset handle, a settings block, ...).
///
/// Cloning an `ObjectRef` clones the reference, not the object. Equality is
/// reference identity: two refs are equal only if they point at the same
/// object, whatever its contents.
///
/// The object's type is captured on construction, so [`is`](Self::is) and
/// [`type_info`](Self::type_info) never lock. They are safe to call while the
/// object is being inspected.
#[derive(Clone)]
pub struct ObjectRef {
    object: Arc<Mutex<dyn Reflect>>,
    type_info: TypeInfo,
}

impl ObjectRef {
    /// Wraps `value` in a new shared reference.
    pub fn new<T: Reflect>(value: T) -> Self {
        Self {
            object: Arc::new(Mutex::new(value)),
            type_info: TypeInfo::of::<T>(),
        }
    }

    /// Locks the object for inspection or mutation.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Poisoned`] if a previous writer panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, dyn Reflect>, InspectError> {
        self.object.lock().map_err(|_| InspectError::Poisoned)
    }

    /// The exact runtime type of the referenced object.
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Returns `true` if the object is exactly a `T`.
    #[must_use]
    pub fn is<T: Reflect>(&self) -> bool {
        self.type_info.type_id() == TypeId::of::<T>()
    }

    /// Runs `f` on the object if it is exactly a `T`.
    ///
    /// Locks the object, so it must not be called on the object currently
    /// being dispatched.
    pub fn with<T: Reflect, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.lock().ok()?;
        guard.downcast_ref::<T>().map(f)
    }

    /// Runs `f` on the object mutably if it is exactly a `T`.
    pub fn with_mut<T: Reflect, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.lock().ok()?;
        guard.downcast_mut::<T>().map(f)
    }

    /// Returns `true` if both refs point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectRef<{}>({:p})",
            self.type_info.short_name(),
            Arc::as_ptr(&self.object)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_value_equality() {
        let a = ObjectRef::new(1.5_f32);
        let b = ObjectRef::new(1.5_f32);
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_typed_access() {
        let obj = ObjectRef::new(String::from("hello"));
        assert!(obj.is::<String>());
        assert!(!obj.is::<f32>());

        obj.with_mut::<String, _>(|s| s.push_str(" world"));
        assert_eq!(
            obj.with::<String, _>(|s| s.clone()).as_deref(),
            Some("hello world")
        );
        assert!(obj.with::<f32, _>(|_| ()).is_none());
        assert_eq!(obj.type_info(), TypeInfo::of::<String>());
    }

    #[test]
    fn test_type_queries_do_not_lock() {
        let obj = ObjectRef::new(3_u32);
        let _guard = obj.lock().unwrap();

        assert!(obj.is::<u32>());
        assert_eq!(obj.type_info().short_name(), "u32");
        assert!(format!("{obj:?}").starts_with("ObjectRef<u32>"));
    }
}
