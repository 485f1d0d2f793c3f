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

//! Resolves and invokes the inspector for a runtime-typed value.

use lumen_core::context::TypedContext;
use lumen_core::reflect::{MetadataAccessor, NoMetadata, Reflect};

use super::{InspectError, InspectResult, InspectorRegistry, VarInfo};
use crate::object::ObjectRef;

/// Inspects `value` with the inspector registered for its exact runtime
/// type, or with the registry's fallback.
///
/// The [`InspectorRegistry`] is fetched from `ctx`, and `ctx` is handed on to
/// the inspector so it can pull the services it needs.
///
/// # Errors
///
/// [`InspectError::Context`] if the registry is not in the context, or if
/// the inspector requested a service that is missing.
pub fn inspect_var(
    ctx: &TypedContext,
    value: &mut dyn Reflect,
    info: &VarInfo,
    meta: &dyn MetadataAccessor,
) -> Result<InspectResult, InspectError> {
    let registry = ctx.get::<InspectorRegistry>()?;
    let type_info = value.type_info();
    let inspector = registry.resolve(type_info.type_id());

    log::trace!(
        "inspect_var: `{}` as `{}` (depth {})",
        info.label,
        type_info.type_name(),
        info.depth
    );
    inspector.inspect(ctx, value, info, meta)
}

/// Locks `object` and inspects it as a top-level value labelled with its
/// type name.
pub fn dispatch(ctx: &TypedContext, object: &ObjectRef) -> Result<InspectResult, InspectError> {
    let mut guard = object.lock()?;
    let info = VarInfo::root(guard.type_info().short_name());
    inspect_var(ctx, &mut *guard, &info, &NoMetadata)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use lumen_core::context::ContextError;
    use lumen_core::Reflect;

    use super::*;
    use crate::editing::EditingManager;
    use crate::inspector::TypedInspector;
    use crate::ui::{Edit, HeadlessUi, UiSurface};

    #[derive(Reflect, Default)]
    struct Light {
        #[reflect(min = 0.0, max = 10.0)]
        intensity: f32,
        range: f32,
    }

    #[derive(Reflect, Default)]
    struct SpotLight {
        base: Light,
        angle: f32,
    }

    #[derive(Default)]
    struct QuietLightInspector;

    impl TypedInspector<Light> for QuietLightInspector {
        fn inspect_typed(
            &self,
            _ctx: &TypedContext,
            value: &mut Light,
            _info: &VarInfo,
            _meta: &dyn MetadataAccessor,
        ) -> Result<InspectResult, InspectError> {
            if value.intensity == 2.0 {
                return Ok(InspectResult::Unchanged);
            }
            value.intensity = 2.0;
            Ok(InspectResult::finished())
        }
    }

    #[derive(Default)]
    struct FocusingLightInspector;

    impl TypedInspector<Light> for FocusingLightInspector {
        fn inspect_typed(
            &self,
            ctx: &TypedContext,
            _value: &mut Light,
            _info: &VarInfo,
            _meta: &dyn MetadataAccessor,
        ) -> Result<InspectResult, InspectError> {
            let editing = ctx.get::<EditingManager>()?;
            let _ = editing.selected();
            Ok(InspectResult::Unchanged)
        }
    }

    thread_local! {
        static VISITS: Cell<u32> = const { Cell::new(0) };
    }

    #[derive(Default)]
    struct CountingLightInspector;

    impl TypedInspector<Light> for CountingLightInspector {
        fn inspect_typed(
            &self,
            _ctx: &TypedContext,
            _value: &mut Light,
            _info: &VarInfo,
            _meta: &dyn MetadataAccessor,
        ) -> Result<InspectResult, InspectError> {
            VISITS.with(|v| v.set(v.get() + 1));
            Ok(InspectResult::Unchanged)
        }
    }

    /// Drops the light from the editor's selection and focus while it is
    /// being inspected, like a "remove component" button would.
    #[derive(Default)]
    struct DetachingLightInspector;

    impl TypedInspector<Light> for DetachingLightInspector {
        fn inspect_typed(
            &self,
            ctx: &TypedContext,
            _value: &mut Light,
            _info: &VarInfo,
            _meta: &dyn MetadataAccessor,
        ) -> Result<InspectResult, InspectError> {
            let mut editing = ctx.get_mut::<EditingManager>()?;
            let unselected = editing.try_unselect::<Light>();
            let unfocused = editing.try_unfocus::<Light>();
            Ok(if unselected && unfocused {
                InspectResult::finished()
            } else {
                InspectResult::Unchanged
            })
        }
    }

    fn context_with<I: TypedInspector<Light> + 'static>(inspector: I) -> TypedContext {
        let mut registry = InspectorRegistry::with_builtins();
        registry.register::<Light, _>(inspector).unwrap();

        let mut ctx = TypedContext::new();
        ctx.add(UiSurface::new(HeadlessUi::new())).unwrap();
        ctx.add(registry).unwrap();
        ctx
    }

    #[test]
    fn test_dispatch_uses_only_requested_services() {
        let ctx = context_with(QuietLightInspector);
        assert!(!ctx.has::<EditingManager>());

        let light = ObjectRef::new(Light::default());
        let result = dispatch(&ctx, &light).unwrap();
        assert!(result.is_changed());
    }

    #[test]
    fn test_missing_requested_service_is_not_found() {
        let ctx = context_with(FocusingLightInspector);
        let light = ObjectRef::new(Light::default());

        let err = dispatch(&ctx, &light).unwrap_err();
        assert!(matches!(
            err,
            InspectError::Context(ContextError::NotFound { type_name })
                if type_name.ends_with("EditingManager")
        ));
    }

    #[test]
    fn test_second_dispatch_without_edits_is_unchanged() {
        let ctx = context_with(QuietLightInspector);
        let light = ObjectRef::new(Light::default());

        assert!(dispatch(&ctx, &light).unwrap().is_changed());
        assert_eq!(dispatch(&ctx, &light).unwrap(), InspectResult::Unchanged);
        assert_eq!(light.with::<Light, _>(|l| l.intensity), Some(2.0));
    }

    #[test]
    fn test_inspector_can_clear_selection_of_dispatched_object() {
        let mut ctx = context_with(DetachingLightInspector);
        ctx.add(EditingManager::new()).unwrap();
        let light = ObjectRef::new(Light::default());
        {
            let mut editing = ctx.get_mut::<EditingManager>().unwrap();
            editing.select(light.clone());
            editing.focus(light.clone());
        }

        let result = dispatch(&ctx, &light).unwrap();

        assert!(result.is_changed());
        let editing = ctx.get::<EditingManager>().unwrap();
        assert!(editing.selected().is_none());
        assert!(editing.focused().is_none());
    }

    #[test]
    fn test_missing_registry_is_reported() {
        let ctx = TypedContext::new();
        let light = ObjectRef::new(Light::default());
        assert!(matches!(
            dispatch(&ctx, &light),
            Err(InspectError::Context(ContextError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_derived_type_falls_back_and_recurses_into_base() {
        VISITS.with(|v| v.set(0));
        let ctx = context_with(CountingLightInspector);
        let spot = ObjectRef::new(SpotLight::default());

        dispatch(&ctx, &spot).unwrap();

        // The fallback handled SpotLight and dispatched its `base` field,
        // which is a Light, to the Light inspector exactly once.
        assert_eq!(VISITS.with(Cell::get), 1);
        let surface = ctx.get::<UiSurface>().unwrap();
        let ui = surface.backend::<HeadlessUi>().unwrap();
        assert!(ui.widget("base").is_some());
        assert!(ui.widget("angle").is_some());
    }

    #[test]
    fn test_fallback_edits_nested_fields() {
        let mut ctx = TypedContext::new();
        ctx.add(UiSurface::new(HeadlessUi::new())).unwrap();
        ctx.add(InspectorRegistry::with_builtins()).unwrap();
        ctx.get_mut::<UiSurface>()
            .unwrap()
            .backend_mut::<HeadlessUi>()
            .unwrap()
            .queue_edit("base/range", Edit::Number(25.0));

        let spot = ObjectRef::new(SpotLight::default());
        let result = dispatch(&ctx, &spot).unwrap();

        assert!(result.is_changed());
        assert_eq!(spot.with::<SpotLight, _>(|s| s.base.range), Some(25.0));
    }

    #[test]
    fn test_fallback_enumerates_fields_in_declaration_order() {
        let mut ctx = TypedContext::new();
        ctx.add(UiSurface::new(HeadlessUi::new())).unwrap();
        ctx.add(InspectorRegistry::with_builtins()).unwrap();

        let spot = ObjectRef::new(SpotLight::default());
        dispatch(&ctx, &spot).unwrap();

        let surface = ctx.get::<UiSurface>().unwrap();
        let ids: Vec<_> = surface
            .backend::<HeadlessUi>()
            .unwrap()
            .drawn()
            .iter()
            .map(|w| w.id.as_str())
            .collect();
        assert_eq!(ids, vec!["base", "base/intensity", "base/range", "angle"]);
    }
}
