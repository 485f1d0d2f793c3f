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

//! The reflection facility consumed by the inspector dispatcher.
//!
//! A [`Reflect`] value exposes its exact runtime type ([`TypeInfo`]) and, for
//! structured types, an enumeration of its fields in declaration order. The
//! `#[derive(Reflect)]` macro generates the field table; leaf types use
//! [`impl_reflect_value!`](crate::impl_reflect_value).

use std::any::{type_name, Any, TypeId};
use std::fmt;

/// Identity of a concrete runtime type.
///
/// Two `TypeInfo`s are equal only when they describe exactly the same type.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeInfo {
    /// Returns the `TypeInfo` of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// The [`TypeId`] used as registration key.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The fully qualified type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The type name without its module path, e.g. `Light` for `scene::Light`.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self
            .type_name
            .split('<')
            .next()
            .unwrap_or(self.type_name);
        let start = base.rfind("::").map_or(0, |idx| idx + 2);
        &self.type_name[start..]
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A single display hint attached to a field (`min`, `max`, `tooltip`, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetaValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A static string, e.g. a tooltip.
    Str(&'static str),
}

impl MetaValue {
    /// Numeric view of the value; integers are widened.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            MetaValue::Float(v) => Some(v),
            MetaValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Integer view of the value; only exact integers qualify.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            MetaValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Boolean view of the value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            MetaValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// String view of the value.
    #[must_use]
    pub fn as_str(&self) -> Option<&'static str> {
        match *self {
            MetaValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Supplies per-field display hints keyed by name.
pub trait MetadataAccessor {
    /// Looks up the hint stored under `key`.
    fn get(&self, key: &str) -> Option<MetaValue>;
}

/// A metadata accessor that never has anything to say.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetadata;

impl MetadataAccessor for NoMetadata {
    fn get(&self, _key: &str) -> Option<MetaValue> {
        None
    }
}

/// Static description of one field of a reflected struct.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    /// The field identifier as declared.
    pub name: &'static str,
    /// The declared type, as written in source.
    pub type_name: &'static str,
    /// Whether editors may only display the field.
    pub read_only: bool,
    /// Display hints from `#[reflect(key = value)]` attributes.
    pub meta: &'static [(&'static str, MetaValue)],
}

impl MetadataAccessor for FieldInfo {
    fn get(&self, key: &str) -> Option<MetaValue> {
        match key {
            "name" => Some(MetaValue::Str(self.name)),
            _ => self
                .meta
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| *value),
        }
    }
}

/// A value whose exact runtime type and structure can be inspected.
///
/// Implemented by `#[derive(Reflect)]` for structs and by
/// [`impl_reflect_value!`](crate::impl_reflect_value) for leaf types.
pub trait Reflect: Any + Send {
    /// The exact runtime type of `self`.
    fn type_info(&self) -> TypeInfo;

    /// Upcasts to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for mutable downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Fields in declaration order. Empty for leaf types.
    fn fields(&self) -> &'static [FieldInfo] {
        &[]
    }

    /// Borrows the field at `index` (matching [`fields`](Self::fields)).
    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        let _ = index;
        None
    }

    /// Mutably borrows the field at `index` (matching [`fields`](Self::fields)).
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        let _ = index;
        None
    }
}

impl dyn Reflect {
    /// Returns `true` if the value is exactly a `T`.
    #[must_use]
    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to `T` if the value is exactly a `T`.
    #[must_use]
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcasts to `T` if the value is exactly a `T`.
    #[must_use]
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Borrows a field by its declared name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&dyn Reflect> {
        let index = self.fields().iter().position(|f| f.name == name)?;
        self.field(index)
    }

    /// Mutably borrows a field by its declared name.
    #[must_use]
    pub fn field_by_name_mut(&mut self, name: &str) -> Option<&mut dyn Reflect> {
        let index = self.fields().iter().position(|f| f.name == name)?;
        self.field_mut(index)
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect<{}>", self.type_info().type_name())
    }
}

/// Implements [`Reflect`] for leaf types that have no inspectable fields.
///
/// ```rust
/// #[derive(Clone, Copy)]
/// struct Seconds(f32);
/// lumen_core::impl_reflect_value!(Seconds);
/// ```
#[macro_export]
macro_rules! impl_reflect_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::reflect::Reflect for $ty {
                fn type_info(&self) -> $crate::reflect::TypeInfo {
                    $crate::reflect::TypeInfo::of::<$ty>()
                }

                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                    self
                }
            }
        )*
    };
}

impl_reflect_value!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String);
