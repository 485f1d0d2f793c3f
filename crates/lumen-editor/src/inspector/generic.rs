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

//! The structural fallback used for types without their own inspector.

use lumen_core::context::TypedContext;
use lumen_core::reflect::{MetadataAccessor, Reflect};

use super::{inspect_var, InspectError, InspectResult, Inspector, VarInfo};
use crate::settings::InspectorSettings;
use crate::ui::UiSurface;

/// Inspects any [`Reflect`] value by walking its fields in declaration order
/// and dispatching each one through the registry.
///
/// Fields that are themselves structured are wrapped in a UI group named
/// after the field. Leaf values with no inspector are shown as their type
/// name.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericInspector;

impl Inspector for GenericInspector {
    fn inspect(
        &self,
        ctx: &TypedContext,
        value: &mut dyn Reflect,
        info: &VarInfo,
        _meta: &dyn MetadataAccessor,
    ) -> Result<InspectResult, InspectError> {
        let (enabled, max_depth) = match ctx.get::<InspectorSettings>() {
            Ok(settings) => (settings.fallback_enabled, settings.max_depth),
            Err(_) => {
                let defaults = InspectorSettings::default();
                (defaults.fallback_enabled, defaults.max_depth)
            }
        };

        let type_info = value.type_info();
        let fields = value.fields();
        if !enabled || fields.is_empty() {
            ctx.get_mut::<UiSurface>()?
                .text(info.label, type_info.short_name());
            return Ok(InspectResult::Unchanged);
        }
        if info.depth >= max_depth {
            log::debug!(
                "GenericInspector: `{}` exceeds max depth {max_depth}, not expanding",
                type_info.type_name()
            );
            ctx.get_mut::<UiSurface>()?.text(info.label, "...");
            return Ok(InspectResult::Unchanged);
        }

        let mut result = InspectResult::Unchanged;
        for (index, field_info) in fields.iter().enumerate() {
            let Some(field) = value.field_mut(index) else {
                continue;
            };
            let child = info.nested(field_info.name, field_info.read_only);
            let grouped = !field.fields().is_empty() && child.depth < max_depth;

            if grouped && !ctx.get_mut::<UiSurface>()?.begin_group(field_info.name) {
                continue;
            }
            let field_result = inspect_var(ctx, field, &child, field_info);
            if grouped {
                ctx.get_mut::<UiSurface>()?.end_group();
            }

            let field_result = field_result?;
            if field_result.is_invalid() {
                log::warn!(
                    "GenericInspector: field `{}.{}` is invalid for its inspector",
                    type_info.short_name(),
                    field_info.name
                );
            }
            result |= field_result;
        }
        Ok(result)
    }
}
