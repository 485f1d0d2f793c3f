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

//! Built-in inspectors for the core value types.

use std::fmt::Display;
use std::marker::PhantomData;

use lumen_core::context::TypedContext;
use lumen_core::reflect::{MetadataAccessor, Reflect, TypeInfo};

use super::{
    boxed, InspectError, InspectResult, InspectorRegistry, RegistryError, TypedInspector, VarInfo,
};
use crate::settings::InspectorSettings;
use crate::ui::UiSurface;

/// A numeric type the scalar widgets can edit through an `f64`.
///
/// 64-bit integers beyond 2^53 lose precision on the way through.
pub trait Scalar: Reflect + Copy + PartialEq + Display {
    /// Widens to `f64`.
    fn to_f64(self) -> f64;
    /// Narrows from `f64`, saturating at the type's bounds.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Checkbox for `bool`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolInspector;

impl TypedInspector<bool> for BoolInspector {
    fn inspect_typed(
        &self,
        ctx: &TypedContext,
        value: &mut bool,
        info: &VarInfo,
        meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError> {
        let mut ui = ctx.get_mut::<UiSurface>()?;
        if info.read_only {
            ui.text(info.label, if *value { "true" } else { "false" });
            return Ok(InspectResult::Unchanged);
        }

        let changed = ui.checkbox(info.label, value);
        show_tooltip(&mut ui, meta);
        Ok(if changed {
            InspectResult::finished()
        } else {
            InspectResult::Unchanged
        })
    }
}

/// Slider (when a `max` hint is present) or drag field for numbers.
pub struct ScalarInspector<T>(PhantomData<fn() -> T>);

impl<T> Default for ScalarInspector<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: Scalar> TypedInspector<T> for ScalarInspector<T> {
    fn inspect_typed(
        &self,
        ctx: &TypedContext,
        value: &mut T,
        info: &VarInfo,
        meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError> {
        let drag_speed = ctx
            .get::<InspectorSettings>()
            .map(|settings| settings.drag_speed)
            .unwrap_or_else(|_| InspectorSettings::default().drag_speed);

        let mut ui = ctx.get_mut::<UiSurface>()?;
        if info.read_only {
            ui.text(info.label, &value.to_string());
            return Ok(InspectResult::Unchanged);
        }

        let min = meta.get("min").and_then(|m| m.as_f64());
        let max = meta.get("max").and_then(|m| m.as_f64());

        let mut edited = value.to_f64();
        let touched = match max {
            Some(max) => ui.slider_f64(info.label, &mut edited, min.unwrap_or(0.0), max),
            None => ui.drag_f64(info.label, &mut edited, drag_speed),
        };
        show_tooltip(&mut ui, meta);

        // A NaN never compares equal, so accepting it would report a change every frame.
        if !touched || edited.is_nan() {
            return Ok(InspectResult::Unchanged);
        }
        let new = T::from_f64(edited);
        if new == *value {
            return Ok(InspectResult::Unchanged);
        }
        *value = new;
        Ok(InspectResult::finished())
    }
}

/// Text field for `String`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringInspector;

impl TypedInspector<String> for StringInspector {
    fn inspect_typed(
        &self,
        ctx: &TypedContext,
        value: &mut String,
        info: &VarInfo,
        meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError> {
        let mut ui = ctx.get_mut::<UiSurface>()?;
        if info.read_only {
            ui.text(info.label, value);
            return Ok(InspectResult::Unchanged);
        }

        let changed = ui.text_edit(info.label, value);
        show_tooltip(&mut ui, meta);
        Ok(if changed {
            InspectResult::finished()
        } else {
            InspectResult::Unchanged
        })
    }
}

fn show_tooltip(ui: &mut UiSurface, meta: &dyn MetadataAccessor) {
    if let Some(tooltip) = meta.get("tooltip").and_then(|m| m.as_str()) {
        ui.tooltip(tooltip);
    }
}

fn register_scalar<T: Scalar>(registry: &mut InspectorRegistry) -> Result<(), RegistryError> {
    registry.register_inspector(
        TypeInfo::of::<T>(),
        boxed::<T, _>(ScalarInspector::<T>::default()),
    )
}

/// Registers the inspectors for `bool`, every primitive integer and float
/// width, and `String`.
pub fn register_builtin_inspectors(registry: &mut InspectorRegistry) -> Result<(), RegistryError> {
    registry.register::<bool, _>(BoolInspector)?;
    register_scalar::<i8>(registry)?;
    register_scalar::<i16>(registry)?;
    register_scalar::<i32>(registry)?;
    register_scalar::<i64>(registry)?;
    register_scalar::<u8>(registry)?;
    register_scalar::<u16>(registry)?;
    register_scalar::<u32>(registry)?;
    register_scalar::<u64>(registry)?;
    register_scalar::<f32>(registry)?;
    register_scalar::<f64>(registry)?;
    registry.register::<String, _>(StringInspector)?;
    Ok(())
}
