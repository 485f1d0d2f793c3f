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

//! # Lumen Core
//!
//! Foundational crate containing the typed service context, the reflection
//! facility used by the inspector dispatcher, and the subsystem bootstrap
//! sequence that decides init/teardown ordering.

#![warn(missing_docs)]

// Lets `#[derive(Reflect)]` expand to `::lumen_core::...` inside this crate too.
extern crate self as lumen_core;

pub mod bootstrap;
pub mod context;
pub mod reflect;

pub use bootstrap::{Bootstrap, BootstrapError, Subsystem};
pub use context::{CachedHandle, ContextError, TypedContext};
pub use lumen_macros::Reflect;
pub use reflect::{FieldInfo, MetaValue, MetadataAccessor, NoMetadata, Reflect, TypeInfo};
