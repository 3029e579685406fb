// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding of native Rust types to their descriptors.
//!
//! Static dispatch through [`NativeType::descriptor`] is the primary binding:
//! built-in types resolve to the lazily initialised table in
//! [`builtin`](crate::builtin), user types register with [`native_type!`].
//!
//! [`TypeRegistry`] adds a process-wide lookup by type id for code that only
//! knows the protocol identifier (codecs resolving an encoded type id).

mod data_type_array;

pub use data_type_array::DataTypeArray;

use crate::builtin::{builtin, TypeIndex};
use crate::config::ALLOC_ALIGN;
use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::node_id::NodeId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::mem::{align_of, size_of, MaybeUninit};
use std::sync::OnceLock;

/// A native value representation managed by the descriptor system.
///
/// # Safety
///
/// Implementors guarantee that:
/// - the type is `#[repr(C)]` (or a primitive / `#[repr(transparent)]` wrapper)
///   and its layout matches [`descriptor`](NativeType::descriptor) exactly,
/// - the all-zero bit pattern is a valid, empty value,
/// - its alignment is at most [`ALLOC_ALIGN`](crate::config::ALLOC_ALIGN),
/// - every heap block reachable from a value was allocated by
///   [`memory`](crate::memory) for the member type recorded in the descriptor.
pub unsafe trait NativeType: Sized + 'static {
    /// Descriptor of this type, shared for the process lifetime.
    fn descriptor() -> &'static TypeDescriptor;
}

/// All-zero value of `T`, the universal empty sentinel.
pub(crate) fn zeroed<T: NativeType>() -> T {
    // SAFETY: NativeType guarantees the all-zero bit pattern is a valid T.
    unsafe { MaybeUninit::<T>::zeroed().assume_init() }
}

/// Panic unless heap blocks of the memory engine are aligned enough for `T`.
pub(crate) fn assert_alloc_align<T>(name: &str) {
    assert!(
        align_of::<T>() <= ALLOC_ALIGN,
        "`{}` needs {}-byte alignment, heap blocks are {}-byte aligned",
        name,
        align_of::<T>(),
        ALLOC_ALIGN
    );
}

/// Panic unless `size_of::<T>()` matches the descriptor memory size.
pub(crate) fn assert_mem_size<T: NativeType>(descriptor: &TypeDescriptor) {
    assert_alloc_align::<T>(descriptor.name());
    assert_eq!(
        size_of::<T>(),
        descriptor.mem_size(),
        "native type `{}` does not match the memory size of descriptor `{}`",
        std::any::type_name::<T>(),
        descriptor.name()
    );
}

fn custom_types() -> &'static DashMap<NodeId, &'static TypeDescriptor> {
    static CUSTOM: OnceLock<DashMap<NodeId, &'static TypeDescriptor>> = OnceLock::new();
    CUSTOM.get_or_init(DashMap::new)
}

/// Process-wide type lookup.
pub struct TypeRegistry;

impl TypeRegistry {
    /// Descriptor bound to `T`.
    ///
    /// Panics if the descriptor does not describe a value of `size_of::<T>()`.
    pub fn descriptor<T: NativeType>() -> &'static TypeDescriptor {
        let descriptor = T::descriptor();
        assert_mem_size::<T>(descriptor);
        descriptor
    }

    /// Built-in descriptor by table index.
    pub fn builtin(index: TypeIndex) -> &'static TypeDescriptor {
        builtin(index)
    }

    /// Construct every built-in descriptor now.
    ///
    /// Lookups initialise lazily, so this is only needed to move the one-time
    /// cost to process start.
    pub fn init_builtins() {
        for index in TypeIndex::ALL {
            builtin(index);
        }
        log::debug!(
            "[TypeRegistry] {} built-in descriptors initialised",
            TypeIndex::COUNT
        );
    }

    /// Make `descriptor` discoverable through [`find`](Self::find).
    ///
    /// Registering the same descriptor twice is a no-op. A different
    /// descriptor under an already used type id (built-in or custom) fails
    /// with [`Error::DuplicateTypeId`].
    pub fn register(descriptor: &'static TypeDescriptor) -> Result<()> {
        let type_id = descriptor.type_id();
        if let Some(existing) = TypeIndex::from_node_id(type_id).map(builtin) {
            return if same_descriptor(existing, descriptor) {
                Ok(())
            } else {
                log::warn!(
                    "[TypeRegistry] `{}` collides with built-in type id {}",
                    descriptor.name(),
                    type_id
                );
                Err(Error::DuplicateTypeId(type_id.clone()))
            };
        }

        match custom_types().entry(type_id.clone()) {
            Entry::Occupied(entry) => {
                if same_descriptor(entry.get(), descriptor) {
                    Ok(())
                } else {
                    log::warn!(
                        "[TypeRegistry] `{}` rejected: type id {} already bound to `{}`",
                        descriptor.name(),
                        type_id,
                        entry.get().name()
                    );
                    Err(Error::DuplicateTypeId(type_id.clone()))
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(descriptor);
                log::debug!(
                    "[TypeRegistry] registered `{}` as {}",
                    descriptor.name(),
                    type_id
                );
                Ok(())
            }
        }
    }

    /// Register the descriptor bound to `T`.
    pub fn register_type<T: NativeType>() -> Result<()> {
        Self::register(Self::descriptor::<T>())
    }

    /// Descriptor by type id: built-ins first, then registered custom types.
    pub fn find(type_id: &NodeId) -> Option<&'static TypeDescriptor> {
        if let Some(index) = TypeIndex::from_node_id(type_id) {
            return Some(builtin(index));
        }
        custom_types().get(type_id).map(|entry| *entry.value())
    }

    /// Snapshot of every registered custom descriptor.
    pub fn registered() -> Vec<&'static TypeDescriptor> {
        custom_types().iter().map(|entry| *entry.value()).collect()
    }
}

fn same_descriptor(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    std::ptr::eq(a, b) || a == b
}

/// Bind a `#[repr(C)]` type to the descriptor produced by a builder closure.
///
/// The closure runs once, on first use, and its result lives for the rest of
/// the process. The `unsafe` keyword acknowledges the [`NativeType`] contract.
///
/// ```rust
/// use uatypes::{native_type, NodeId, TypeDescriptorBuilder, TypeRegistry};
///
/// #[repr(C)]
/// struct Point {
///     x: f32,
///     y: f32,
///     z: f32,
/// }
///
/// native_type!(unsafe Point => || {
///     TypeDescriptorBuilder::<Point>::create_structure(
///         "Point",
///         NodeId::numeric(1, 4242),
///         NodeId::numeric(1, 1),
///     )
///     .add_field("x", |p| &p.x)
///     .add_field("y", |p| &p.y)
///     .add_field("z", |p| &p.z)
///     .build()
/// });
///
/// assert_eq!(TypeRegistry::descriptor::<Point>().mem_size(), 12);
/// ```
#[macro_export]
macro_rules! native_type {
    (unsafe $ty:ty => $build:expr) => {
        unsafe impl $crate::NativeType for $ty {
            fn descriptor() -> &'static $crate::TypeDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::TypeDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init($build)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TypeDescriptorBuilder;
    use crate::descriptor::TypeKind;

    #[repr(C)]
    struct Sample {
        id: u32,
        value: f64,
    }

    native_type!(unsafe Sample => || {
        TypeDescriptorBuilder::<Sample>::create_structure(
            "Sample",
            NodeId::numeric(7, 9001),
            NodeId::numeric(7, 9002),
        )
        .add_field("id", |s| &s.id)
        .add_field("value", |s| &s.value)
        .build()
    });

    #[test]
    fn test_descriptor_is_shared() {
        let a = TypeRegistry::descriptor::<Sample>();
        let b = TypeRegistry::descriptor::<Sample>();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.type_kind(), TypeKind::Struct);
    }

    #[test]
    fn test_builtin_lookup_by_node_id() {
        TypeRegistry::init_builtins();
        let float = TypeRegistry::find(&NodeId::numeric(0, 10)).expect("Float");
        assert!(std::ptr::eq(float, TypeRegistry::descriptor::<f32>()));
        assert!(TypeRegistry::find(&NodeId::numeric(0, 999_999)).is_none());
    }

    #[test]
    fn test_register_and_find() {
        TypeRegistry::register_type::<Sample>().expect("register");
        // Idempotent for the same descriptor.
        TypeRegistry::register_type::<Sample>().expect("register again");

        let found = TypeRegistry::find(&NodeId::numeric(7, 9001)).expect("registered");
        assert_eq!(found.name(), "Sample");
        assert!(TypeRegistry::registered()
            .iter()
            .any(|d| std::ptr::eq(*d, found)));
    }

    #[test]
    fn test_register_conflicting_type_id() {
        let impostor = TypeDescriptor::new(
            "Impostor",
            NodeId::numeric(7, 9003),
            NodeId::default(),
            4,
            TypeKind::Scalar,
            true,
            false,
            Vec::new(),
        )
        .leak();
        let other = TypeDescriptor::new(
            "Other",
            NodeId::numeric(7, 9003),
            NodeId::default(),
            8,
            TypeKind::Scalar,
            true,
            false,
            Vec::new(),
        )
        .leak();

        TypeRegistry::register(impostor).expect("first");
        assert_eq!(
            TypeRegistry::register(other),
            Err(Error::DuplicateTypeId(NodeId::numeric(7, 9003)))
        );
    }

    #[test]
    fn test_register_cannot_shadow_builtin() {
        let fake_float = TypeDescriptor::new(
            "NotAFloat",
            NodeId::numeric(0, 10),
            NodeId::numeric(0, 10),
            4,
            TypeKind::Scalar,
            true,
            true,
            Vec::new(),
        )
        .leak();
        assert!(matches!(
            TypeRegistry::register(fake_float),
            Err(Error::DuplicateTypeId(_))
        ));
        TypeRegistry::register(TypeRegistry::descriptor::<f32>()).expect("built-in itself");
    }

    #[test]
    #[should_panic(expected = "does not match the memory size")]
    fn test_mem_size_precondition() {
        assert_mem_size::<u64>(TypeRegistry::descriptor::<u32>());
    }
}
