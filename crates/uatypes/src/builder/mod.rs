// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Derive a [`TypeDescriptor`] from field declarations of a native type.
//!
//! The builder is a typestate: `create_enum`, `create_structure` and
//! `create_union` classify it, and only classified builders can `build()`.
//! Adding a struct field to a union builder (or the reverse) does not compile.
//!
//! Field offsets are measured on a zeroed instance of `T`: the selector closure
//! receives a reference to the instance and returns a reference to the field,
//! and the distance between the two addresses is the offset.
//!
//! Layout mistakes (wrong sizes, overlaps, arrays not directly following their
//! size field) are programming errors and panic with the type and field name.


use crate::config::{
    ARRAY_MEMBER_SIZE, MAX_MEMBERS, MAX_MEM_SIZE, MAX_PADDING, POINTER_SIZE, UNION_SWITCH_SIZE,
};
use crate::descriptor::{MemberDescriptor, TypeDescriptor, TypeKind};
use crate::node_id::NodeId;
use crate::registry::{assert_alloc_align, NativeType};
use std::marker::PhantomData;
use std::mem::{size_of, MaybeUninit};

/// Builder state before `create_*`.
pub struct Unclassified;
/// Builder state of an enumeration.
pub struct EnumKind;
/// Builder state of a structure (plain, array and optional fields).
pub struct StructKind;
/// Builder state of a union.
pub struct UnionKind;

mod sealed {
    pub trait Classified {}
    impl Classified for super::EnumKind {}
    impl Classified for super::StructKind {}
    impl Classified for super::UnionKind {}
}

struct PendingMember {
    offset: usize,
    size: usize,
    member: MemberDescriptor,
}

/// Typestate builder of the descriptor of `T`.
pub struct TypeDescriptorBuilder<T, K = Unclassified> {
    descriptor: TypeDescriptor,
    pending: Vec<PendingMember>,
    union_offset: Option<usize>,
    _marker: PhantomData<(fn() -> T, K)>,
}

impl<T: NativeType> TypeDescriptorBuilder<T, Unclassified> {
    /// Describe `T` as a 32-bit enumeration.
    pub fn create_enum(
        name: impl Into<String>,
        type_id: NodeId,
        binary_encoding_id: NodeId,
    ) -> TypeDescriptorBuilder<T, EnumKind> {
        let builder = Self::classify(name.into(), type_id, binary_encoding_id, TypeKind::Enum);
        assert_eq!(
            size_of::<T>(),
            size_of::<u32>(),
            "enum `{}` must be 4 bytes wide",
            builder.descriptor.name
        );
        builder
    }

    /// Describe `T` as a structure.
    pub fn create_structure(
        name: impl Into<String>,
        type_id: NodeId,
        binary_encoding_id: NodeId,
    ) -> TypeDescriptorBuilder<T, StructKind> {
        Self::classify(name.into(), type_id, binary_encoding_id, TypeKind::Struct)
    }

    /// Describe `T` as a union: `u32` switch field, then the shared payload.
    pub fn create_union(
        name: impl Into<String>,
        type_id: NodeId,
        binary_encoding_id: NodeId,
    ) -> TypeDescriptorBuilder<T, UnionKind> {
        Self::classify(name.into(), type_id, binary_encoding_id, TypeKind::Union)
    }

    fn classify<K>(
        name: String,
        type_id: NodeId,
        binary_encoding_id: NodeId,
        type_kind: TypeKind,
    ) -> TypeDescriptorBuilder<T, K> {
        assert_alloc_align::<T>(&name);
        let mem_size = size_of::<T>();
        assert!(
            mem_size <= MAX_MEM_SIZE,
            "type `{}` is {} bytes, at most {} are supported",
            name,
            mem_size,
            MAX_MEM_SIZE
        );
        TypeDescriptorBuilder {
            descriptor: TypeDescriptor {
                name,
                type_id,
                binary_encoding_id,
                mem_size: mem_size as u16,
                type_kind,
                pointer_free: true,
                overlayable: false,
                members: Vec::new(),
            },
            pending: Vec::new(),
            union_offset: None,
            _marker: PhantomData,
        }
    }
}

impl<T: NativeType, K> TypeDescriptorBuilder<T, K> {
    fn push(&mut self, offset: usize, size: usize, member: MemberDescriptor) {
        if !member.member_type().is_pointer_free() || member.is_array() || member.is_optional() {
            self.descriptor.pointer_free = false;
        }
        self.pending.push(PendingMember {
            offset,
            size,
            member,
        });
    }

    fn assert_native_size<F>(&self, field: &str, field_type: &TypeDescriptor) {
        assert_eq!(
            size_of::<F>(),
            field_type.mem_size(),
            "field `{}.{}`: native size does not match descriptor `{}`",
            self.descriptor.name,
            field,
            field_type.name()
        );
    }

    fn offset_of<F>(&self, field: &str, selector: impl FnOnce(&T) -> &F) -> usize {
        let instance = MaybeUninit::<T>::zeroed();
        // SAFETY: NativeType guarantees the all-zero bit pattern is a valid T.
        let value = unsafe { instance.assume_init_ref() };
        let base = value as *const T as usize;
        let address = selector(value) as *const F as usize;
        assert!(
            address >= base && address + size_of::<F>() <= base + size_of::<T>(),
            "selector of `{}.{}` does not return a field of the instance",
            self.descriptor.name,
            field
        );
        address - base
    }
}

impl<T: NativeType> TypeDescriptorBuilder<T, StructKind> {
    /// Plain member whose type is bound through [`NativeType`].
    pub fn add_field<F: NativeType>(self, name: &str, selector: impl FnOnce(&T) -> &F) -> Self {
        self.add_field_with_type(name, selector, F::descriptor())
    }

    /// Plain member described by an explicit descriptor.
    pub fn add_field_with_type<F>(
        mut self,
        name: &str,
        selector: impl FnOnce(&T) -> &F,
        field_type: &'static TypeDescriptor,
    ) -> Self {
        self.assert_native_size::<F>(name, field_type);
        let offset = self.offset_of(name, selector);
        let member = MemberDescriptor::new(Some(name), field_type, 0, false, false);
        self.push(offset, size_of::<F>(), member);
        self
    }

    /// Optional member stored as `*mut F` (null when absent).
    pub fn add_optional_field<F: NativeType>(
        self,
        name: &str,
        selector: impl FnOnce(&T) -> &*mut F,
    ) -> Self {
        self.add_optional_field_with_type(name, selector, F::descriptor())
    }

    pub fn add_optional_field_with_type<F>(
        mut self,
        name: &str,
        selector: impl FnOnce(&T) -> &*mut F,
        field_type: &'static TypeDescriptor,
    ) -> Self {
        self.assert_native_size::<F>(name, field_type);
        assert_alloc_align::<F>(&format!("{}.{}", self.descriptor.name, name));
        let offset = self.offset_of(name, selector);
        self.descriptor.type_kind = TypeKind::OptionalStruct;
        let member = MemberDescriptor::new(Some(name), field_type, 0, false, true);
        self.push(offset, POINTER_SIZE, member);
        self
    }

    /// Counted array: a `usize` size field directly followed by `*mut E`.
    pub fn add_array_field<E: NativeType>(
        self,
        name: &str,
        size_selector: impl FnOnce(&T) -> &usize,
        array_selector: impl FnOnce(&T) -> &*mut E,
    ) -> Self {
        self.add_array_field_with_type(name, size_selector, array_selector, E::descriptor())
    }

    pub fn add_array_field_with_type<E>(
        mut self,
        name: &str,
        size_selector: impl FnOnce(&T) -> &usize,
        array_selector: impl FnOnce(&T) -> &*mut E,
        element_type: &'static TypeDescriptor,
    ) -> Self {
        self.assert_native_size::<E>(name, element_type);
        assert_alloc_align::<E>(&format!("{}.{}", self.descriptor.name, name));
        let size_offset = self.offset_of(name, size_selector);
        let array_offset = self.offset_of(name, array_selector);
        assert_eq!(
            array_offset,
            size_offset + size_of::<usize>(),
            "array field `{}.{}` must follow its size field with no padding",
            self.descriptor.name,
            name
        );
        let member = MemberDescriptor::new(Some(name), element_type, 0, true, false);
        self.push(size_offset, ARRAY_MEMBER_SIZE, member);
        self
    }
}

impl<T: NativeType> TypeDescriptorBuilder<T, UnionKind> {
    /// Union alternative of type `F` stored in the payload field of type `U`.
    pub fn add_union_field<F: NativeType, U>(
        self,
        name: &str,
        selector: impl FnOnce(&T) -> &U,
    ) -> Self {
        self.add_union_field_with_type::<F, U>(name, selector, F::descriptor())
    }

    pub fn add_union_field_with_type<F, U>(
        mut self,
        name: &str,
        selector: impl FnOnce(&T) -> &U,
        field_type: &'static TypeDescriptor,
    ) -> Self {
        self.assert_native_size::<F>(name, field_type);
        let offset = self.offset_of(name, selector);
        let type_name = &self.descriptor.name;
        assert!(
            offset >= UNION_SWITCH_SIZE,
            "union field `{}.{}` overlaps the switch field",
            type_name,
            name
        );
        assert!(
            size_of::<F>() <= size_of::<U>(),
            "union field `{}.{}` does not fit the payload",
            type_name,
            name
        );
        assert!(
            offset <= MAX_PADDING,
            "union field `{}.{}` payload offset {} exceeds {}",
            type_name,
            name,
            offset,
            MAX_PADDING
        );
        match self.union_offset {
            Some(expected) => assert_eq!(
                offset, expected,
                "union field `{}.{}`: all alternatives must share one payload offset",
                type_name, name
            ),
            None => self.union_offset = Some(offset),
        }
        let member = MemberDescriptor::new(Some(name), field_type, offset as u8, false, false);
        self.push(offset, size_of::<F>(), member);
        self
    }
}

impl<T: NativeType, K: sealed::Classified> TypeDescriptorBuilder<T, K> {
    /// Finish the descriptor: order members by offset and derive padding.
    pub fn build(mut self) -> TypeDescriptor {
        let name = &self.descriptor.name;
        assert!(
            self.pending.len() <= MAX_MEMBERS,
            "type `{}` has {} members, at most {} are supported",
            name,
            self.pending.len(),
            MAX_MEMBERS
        );
        self.pending.sort_by_key(|pending| pending.offset);

        if self.descriptor.type_kind.is_structure() {
            let mut end = 0;
            for pending in &mut self.pending {
                let field = pending.member.name().unwrap_or_default();
                assert!(
                    pending.offset >= end,
                    "member `{}.{}` overlaps the previous member",
                    name,
                    field
                );
                let padding = u8::try_from(pending.offset - end).unwrap_or_else(|_| {
                    panic!(
                        "member `{}.{}`: padding {} exceeds {}",
                        name,
                        field,
                        pending.offset - end,
                        MAX_PADDING
                    )
                });
                pending.member.set_padding(padding);
                end = pending.offset + pending.size;
            }
        }

        self.descriptor.members = self.pending.into_iter().map(|p| p.member).collect();
        log::debug!(
            "[TypeDescriptorBuilder] built `{}` ({:?}, {} bytes, {} members, pointer_free={})",
            self.descriptor.name,
            self.descriptor.type_kind,
            self.descriptor.mem_size,
            self.descriptor.members.len(),
            self.descriptor.pointer_free
        );
        self.descriptor
    }
}
