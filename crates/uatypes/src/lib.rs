// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # uatypes - descriptor-driven native types for OPC UA style stacks
//!
//! Describe the binary layout of your own `#[repr(C)]` structures, enums and
//! unions once, and let one generic engine allocate, deep-copy, clear and
//! compare them. External codecs consume the same descriptors together with
//! raw value handles.
//!
//! ## Quick Start
//!
//! ```rust
//! use uatypes::{native_type, NodeId, OwnershipWrapper, TypeDescriptorBuilder, UaString};
//!
//! #[repr(C)]
//! struct Sensor {
//!     name: UaString,
//!     reading: f64,
//! }
//!
//! native_type!(unsafe Sensor => || {
//!     TypeDescriptorBuilder::<Sensor>::create_structure(
//!         "Sensor",
//!         NodeId::numeric(1, 5001),
//!         NodeId::numeric(1, 5002),
//!     )
//!     .add_field("name", |s| &s.name)
//!     .add_field("reading", |s| &s.reading)
//!     .build()
//! });
//!
//! let mut sensor = OwnershipWrapper::<Sensor>::new();
//! // SAFETY: the string buffer comes from the memory engine.
//! unsafe {
//!     let value = sensor.handle_mut();
//!     value.name = UaString::alloc("boiler")?.into_native();
//!     value.reading = 71.5;
//! }
//!
//! let copy = sensor.clone();
//! assert!(copy == sensor);
//! assert_eq!(copy.name.as_bytes(), b"boiler");
//! # Ok::<(), uatypes::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |  TypeConverter / Variant        (idiomatic Rust <-> native)  |
//! +--------------------------------------------------------------+
//! |  OwnershipWrapper / ArrayOwnershipWrapper     (RAII owners)  |
//! +--------------------------------------------------------------+
//! |  memory: allocate | copy | clear | equal   (descriptor walk) |
//! +--------------------------------------------------------------+
//! |  TypeRegistry / NativeType / built-in table                  |
//! +--------------------------------------------------------------+
//! |  TypeDescriptorBuilder -> TypeDescriptor / MemberDescriptor  |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Runtime schema of a native layout |
//! | [`TypeDescriptorBuilder`] | Derives a descriptor from field selectors |
//! | [`NativeType`] | Binds a Rust type to its descriptor |
//! | [`OwnershipWrapper`] | Owns one native value |
//! | [`ArrayOwnershipWrapper`] | Owns a contiguous block of native values |
//! | [`Variant`] | Owns a value of a runtime-tagged type |

/// Typestate builder of type descriptors.
pub mod builder;
/// Built-in descriptor table and native built-in types.
pub mod builtin;
/// Layout constants of the native binary convention.
pub mod config;
/// Conversions between Rust values and native representations.
pub mod convert;
/// Type and member descriptors.
pub mod descriptor;
/// Error types.
pub mod error;
/// Descriptor-driven allocate / copy / clear / compare.
pub mod memory;
/// Protocol node identifiers.
pub mod node_id;
/// Type binding and process-wide lookup.
pub mod registry;
/// Runtime-tagged value holder.
pub mod variant;
/// RAII owners of native values.
pub mod wrapper;

pub use builder::{EnumKind, StructKind, TypeDescriptorBuilder, Unclassified, UnionKind};
pub use builtin::{
    builtin, TypeIndex, UaByteString, UaDateTime, UaGuid, UaLocalizedText, UaQualifiedName,
    UaStatusCode, UaString,
};
pub use convert::{from_native_array, to_native_array, LocalizedText, QualifiedName, TypeConverter};
pub use descriptor::{MemberDescriptor, TypeDescriptor, TypeKind};
pub use error::{Error, Result};
pub use node_id::{Guid, Identifier, NodeId};
pub use registry::{DataTypeArray, NativeType, TypeRegistry};
pub use variant::Variant;
pub use wrapper::{ArrayOwnershipWrapper, OwnershipWrapper};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
