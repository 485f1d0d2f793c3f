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

//! A type-keyed service context shared by every editor subsystem.
//!
//! The [`TypedContext`] holds at most one instance of each service type and
//! replaces ambient global singletons: subsystems explicitly [`add`] and
//! [`remove`] their services on one shared, explicitly-lived context, and any
//! other subsystem fetches only the services it needs.
//!
//! # Design
//!
//! This follows the **Service Locator** pattern. The context owns every
//! service. Lookups always re-resolve by [`TypeId`], while
//! [`get_cached`](TypedContext::get_cached) hands out a [`CachedHandle`] bound
//! to the slot itself so hot per-frame call sites skip the map lookup.
//!
//! The context is single-threaded (`!Send`). A multi-threaded host must keep
//! it on one owning thread and serialize all calls externally.
//!
//! [`add`]: TypedContext::add
//! [`remove`]: TypedContext::remove

use std::any::{type_name, Any, TypeId};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Errors raised by [`TypedContext`] operations.
///
/// These are programming errors (mismatched init/teardown, missing bootstrap
/// step).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A service of this type is already registered.
    #[error("service `{type_name}` is already registered")]
    DuplicateService {
        /// The fully qualified name of the service type.
        type_name: &'static str,
    },
    /// No service of this type is registered.
    #[error("service `{type_name}` is not registered")]
    NotFound {
        /// The fully qualified name of the service type.
        type_name: &'static str,
    },
    /// The service is currently borrowed in a way that conflicts with the request.
    #[error("service `{type_name}` is already borrowed")]
    Borrowed {
        /// The fully qualified name of the service type.
        type_name: &'static str,
    },
}

struct ServiceSlot<T> {
    value: RefCell<T>,
    live: Cell<bool>,
}

/// Type-erased view of a [`ServiceSlot`], so the context can retire and tear
/// down slots without knowing their concrete type.
trait ErasedSlot {
    fn retire(&self);
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: 'static> ErasedSlot for ServiceSlot<T> {
    fn retire(&self) {
        self.live.set(false);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

struct Entry {
    slot: Rc<dyn ErasedSlot>,
    type_name: &'static str,
}

/// A container holding at most one instance of each service type.
///
/// # Example
///
/// ```rust
/// use lumen_core::context::TypedContext;
///
/// struct Clock { frame: u64 }
///
/// let mut ctx = TypedContext::new();
/// ctx.add(Clock { frame: 0 }).unwrap();
///
/// ctx.get_mut::<Clock>().unwrap().frame += 1;
/// assert_eq!(ctx.get::<Clock>().unwrap().frame, 1);
///
/// ctx.remove::<Clock>().unwrap();
/// assert!(!ctx.has::<Clock>());
/// ```
#[derive(Default)]
pub struct TypedContext {
    slots: HashMap<TypeId, Entry>,
    /// Registration order, used for reverse-order teardown.
    order: Vec<TypeId>,
}

impl TypedContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Stores `service` as the single instance of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::DuplicateService`] if a `T` is already present.
    /// The existing instance is left untouched.
    pub fn add<T: 'static>(&mut self, service: T) -> Result<(), ContextError> {
        let type_id = TypeId::of::<T>();
        if self.slots.contains_key(&type_id) {
            return Err(ContextError::DuplicateService {
                type_name: type_name::<T>(),
            });
        }

        let slot: Rc<dyn ErasedSlot> = Rc::new(ServiceSlot {
            value: RefCell::new(service),
            live: Cell::new(true),
        });
        self.slots.insert(
            type_id,
            Entry {
                slot,
                type_name: type_name::<T>(),
            },
        );
        self.order.push(type_id);

        log::info!("TypedContext: added service `{}`", type_name::<T>());
        Ok(())
    }

    /// Constructs a default `T` and stores it. See [`add`](Self::add).
    pub fn add_default<T: Default + 'static>(&mut self) -> Result<(), ContextError> {
        self.add(T::default())
    }

    /// Unregisters and destroys the stored `T`.
    ///
    /// Every [`CachedHandle`] previously issued for `T` becomes stale. Owners
    /// must not keep handles across a `remove`; doing so trips a debug
    /// assertion on the next use. The instance itself is dropped once the
    /// last outstanding handle goes away.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::NotFound`] if no `T` is registered.
    pub fn remove<T: 'static>(&mut self) -> Result<(), ContextError> {
        let type_id = TypeId::of::<T>();
        let entry = self
            .slots
            .remove(&type_id)
            .ok_or(ContextError::NotFound {
                type_name: type_name::<T>(),
            })?;
        self.order.retain(|id| *id != type_id);
        entry.slot.retire();

        log::info!("TypedContext: removed service `{}`", entry.type_name);
        Ok(())
    }

    /// Returns a shared borrow of the stored `T`.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotFound`] if absent, [`ContextError::Borrowed`] if the
    /// service is currently borrowed mutably.
    pub fn get<T: 'static>(&self) -> Result<Ref<'_, T>, ContextError> {
        self.slot::<T>()?
            .value
            .try_borrow()
            .map_err(|_| ContextError::Borrowed {
                type_name: type_name::<T>(),
            })
    }

    /// Returns an exclusive borrow of the stored `T`.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotFound`] if absent, [`ContextError::Borrowed`] if the
    /// service is currently borrowed at all.
    pub fn get_mut<T: 'static>(&self) -> Result<RefMut<'_, T>, ContextError> {
        self.slot::<T>()?
            .value
            .try_borrow_mut()
            .map_err(|_| ContextError::Borrowed {
                type_name: type_name::<T>(),
            })
    }

    /// Returns a reusable handle bound to the current slot for `T`.
    ///
    /// The handle must be re-acquired after any `remove`/`add` cycle on `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::NotFound`] if no `T` is registered.
    pub fn get_cached<T: 'static>(&self) -> Result<CachedHandle<T>, ContextError> {
        let not_found = || ContextError::NotFound {
            type_name: type_name::<T>(),
        };
        let entry = self.slots.get(&TypeId::of::<T>()).ok_or_else(not_found)?;
        let slot = Rc::clone(&entry.slot)
            .into_any()
            .downcast::<ServiceSlot<T>>()
            .map_err(|_| not_found())?;
        Ok(CachedHandle { slot })
    }

    /// Returns `true` if a service of type `T` is registered.
    #[must_use]
    pub fn has<T: 'static>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of the registered services, in registration order.
    pub fn service_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(id))
            .map(|entry| entry.type_name)
    }

    /// Removes every service in reverse registration order.
    ///
    /// This is a fallback for hosts that do not run a symmetric teardown; it
    /// does not know about dependencies between services.
    pub fn clear(&mut self) {
        while let Some(type_id) = self.order.pop() {
            if let Some(entry) = self.slots.remove(&type_id) {
                log::debug!("TypedContext: tearing down `{}`", entry.type_name);
                entry.slot.retire();
            }
        }
    }

    fn slot<T: 'static>(&self) -> Result<&ServiceSlot<T>, ContextError> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.slot.as_any().downcast_ref::<ServiceSlot<T>>())
            .ok_or(ContextError::NotFound {
                type_name: type_name::<T>(),
            })
    }
}

impl Drop for TypedContext {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for TypedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedContext")
            .field("services", &self.service_names().collect::<Vec<_>>())
            .finish()
    }
}

/// A handle bound once to the slot of a service `T`.
///
/// Dereferencing a handle skips the type lookup, which makes it the right
/// tool for call sites that run every frame. A handle is valid only while the
/// service stays registered.
pub struct CachedHandle<T: 'static> {
    slot: Rc<ServiceSlot<T>>,
}

impl<T: 'static> CachedHandle<T> {
    /// Returns `false` once the service has been removed from its context.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.slot.live.get()
    }

    /// Borrows the service.
    ///
    /// # Panics
    ///
    /// Panics if the service is currently borrowed mutably. In debug builds,
    /// also panics if the service was removed after this handle was acquired.
    pub fn get(&self) -> Ref<'_, T> {
        self.check_live();
        self.slot.value.borrow()
    }

    /// Mutably borrows the service.
    ///
    /// # Panics
    ///
    /// Same conditions as [`get`](Self::get), plus any outstanding shared borrow.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.check_live();
        self.slot.value.borrow_mut()
    }

    /// Borrows the service, reporting borrow conflicts as errors.
    pub fn try_get(&self) -> Result<Ref<'_, T>, ContextError> {
        self.check_live();
        self.slot
            .value
            .try_borrow()
            .map_err(|_| ContextError::Borrowed {
                type_name: type_name::<T>(),
            })
    }

    /// Mutably borrows the service, reporting borrow conflicts as errors.
    pub fn try_get_mut(&self) -> Result<RefMut<'_, T>, ContextError> {
        self.check_live();
        self.slot
            .value
            .try_borrow_mut()
            .map_err(|_| ContextError::Borrowed {
                type_name: type_name::<T>(),
            })
    }

    fn check_live(&self) {
        debug_assert!(
            self.is_valid(),
            "cached handle to `{}` used after the service was removed",
            type_name::<T>()
        );
    }
}

impl<T: 'static> Clone for CachedHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: 'static> fmt::Debug for CachedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedHandle")
            .field("service", &type_name::<T>())
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeDevice {
        name: String,
    }

    struct FakeRenderer {
        frames: u32,
    }

    struct DropProbe {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Drop for DropProbe {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    struct FirstProbe(DropProbe);
    struct SecondProbe(DropProbe);
    struct ThirdProbe(DropProbe);

    #[test]
    fn test_add_then_get_returns_same_instance() {
        let mut ctx = TypedContext::new();
        ctx.add(FakeDevice {
            name: "GPU-0".to_string(),
        })
        .unwrap();

        let first = &*ctx.get::<FakeDevice>().unwrap() as *const FakeDevice;
        let second = &*ctx.get::<FakeDevice>().unwrap() as *const FakeDevice;
        assert_eq!(first, second, "get must return the stored instance, not a copy");
        assert_eq!(ctx.get::<FakeDevice>().unwrap().name, "GPU-0");

        let handle = ctx.get_cached::<FakeDevice>().unwrap();
        let cached = &*handle.get() as *const FakeDevice;
        assert_eq!(first, cached);
    }

    #[test]
    fn test_double_add_is_rejected() {
        let mut ctx = TypedContext::new();
        ctx.add(FakeDevice {
            name: "old".to_string(),
        })
        .unwrap();

        let err = ctx
            .add(FakeDevice {
                name: "new".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ContextError::DuplicateService { .. }));
        assert_eq!(ctx.get::<FakeDevice>().unwrap().name, "old");
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut ctx = TypedContext::new();
        assert!(matches!(
            ctx.remove::<FakeDevice>(),
            Err(ContextError::NotFound { .. })
        ));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let ctx = TypedContext::new();
        assert!(matches!(
            ctx.get::<FakeDevice>(),
            Err(ContextError::NotFound { .. })
        ));
        assert!(matches!(
            ctx.get_cached::<FakeDevice>(),
            Err(ContextError::NotFound { .. })
        ));
    }

    #[test]
    fn test_add_remove_add_cycle() {
        let mut ctx = TypedContext::new();
        ctx.add_default::<FakeDevice>().unwrap();
        ctx.remove::<FakeDevice>().unwrap();
        assert!(!ctx.has::<FakeDevice>());
        ctx.add_default::<FakeDevice>().unwrap();
        assert!(ctx.has::<FakeDevice>());
    }

    #[test]
    fn test_get_mut_conflicts_are_reported() {
        let mut ctx = TypedContext::new();
        ctx.add(FakeRenderer { frames: 0 }).unwrap();

        let mut renderer = ctx.get_mut::<FakeRenderer>().unwrap();
        renderer.frames += 1;
        assert!(matches!(
            ctx.get::<FakeRenderer>(),
            Err(ContextError::Borrowed { .. })
        ));
        drop(renderer);

        assert_eq!(ctx.get::<FakeRenderer>().unwrap().frames, 1);
    }

    #[test]
    fn test_cached_handle_sees_mutations() {
        let mut ctx = TypedContext::new();
        ctx.add(FakeRenderer { frames: 0 }).unwrap();
        let handle = ctx.get_cached::<FakeRenderer>().unwrap();

        for _ in 0..3 {
            handle.get_mut().frames += 1;
        }
        assert_eq!(ctx.get::<FakeRenderer>().unwrap().frames, 3);
        assert!(handle.is_valid());
    }

    #[test]
    fn test_cached_handle_goes_stale_after_remove() {
        let mut ctx = TypedContext::new();
        ctx.add(FakeRenderer { frames: 7 }).unwrap();
        let stale = ctx.get_cached::<FakeRenderer>().unwrap();

        ctx.remove::<FakeRenderer>().unwrap();
        ctx.add(FakeRenderer { frames: 0 }).unwrap();

        assert!(!stale.is_valid());
        let fresh = ctx.get_cached::<FakeRenderer>().unwrap();
        assert!(fresh.is_valid());
        assert_eq!(fresh.get().frames, 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "used after the service was removed")]
    fn test_stale_cached_handle_trips_debug_assertion() {
        let mut ctx = TypedContext::new();
        ctx.add(FakeRenderer { frames: 0 }).unwrap();
        let handle = ctx.get_cached::<FakeRenderer>().unwrap();
        ctx.remove::<FakeRenderer>().unwrap();

        let _ = handle.get();
    }

    #[test]
    fn test_teardown_runs_in_reverse_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let probe = |name| DropProbe {
            name,
            log: Rc::clone(&log),
        };

        let mut ctx = TypedContext::new();
        ctx.add(FirstProbe(probe("first"))).unwrap();
        ctx.add(SecondProbe(probe("second"))).unwrap();
        ctx.add(ThirdProbe(probe("third"))).unwrap();
        assert_eq!(
            ctx.service_names().count(),
            3,
            "all three probes should be listed"
        );

        drop(ctx);
        assert_eq!(*log.borrow(), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_remove_drops_service_once_handles_are_gone() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = TypedContext::new();
        ctx.add(FirstProbe(DropProbe {
            name: "first",
            log: Rc::clone(&log),
        }))
        .unwrap();

        ctx.remove::<FirstProbe>().unwrap();
        assert_eq!(*log.borrow(), vec!["first"]);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_service_names_follow_registration_order() {
        let mut ctx = TypedContext::new();
        ctx.add(FakeRenderer { frames: 0 }).unwrap();
        ctx.add_default::<FakeDevice>().unwrap();

        let names: Vec<_> = ctx.service_names().collect();
        assert!(names[0].ends_with("FakeRenderer"));
        assert!(names[1].ends_with("FakeDevice"));
    }
}
