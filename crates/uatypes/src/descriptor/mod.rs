// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: runtime schema of a native binary layout.
//!
//! A [`TypeDescriptor`] tells the generic memory engine everything it needs to
//! allocate, clear, copy and compare values of a type it has never seen at
//! compile time: the memory size, the kind, and the ordered member list with
//! the padding between members.
//!
//! Descriptors perform no validation. Consistency is the job of
//! [`TypeDescriptorBuilder`](crate::TypeDescriptorBuilder).

mod member;

pub use member::MemberDescriptor;

use crate::node_id::NodeId;

/// Kind of a described type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Flat value without members (numbers, Guid, DateTime, ...).
    #[default]
    Scalar,
    /// 32-bit enumeration.
    Enum,
    /// Structure with plain and counted-array members.
    Struct,
    /// Structure with at least one optional (pointer) member.
    OptionalStruct,
    /// `u32` switch field followed by a payload shared by all alternatives.
    Union,
}

impl TypeKind {
    /// Struct or OptionalStruct: members are laid out one after another.
    pub fn is_structure(self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::OptionalStruct)
    }
}

/// Complete schema of a type: identity, size, kind, flags and members.
///
/// Cloning duplicates the member list; `std::mem::take` moves it out and leaves
/// an empty default descriptor behind.
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    pub(crate) name: String,
    pub(crate) type_id: NodeId,
    pub(crate) binary_encoding_id: NodeId,
    pub(crate) mem_size: u16,
    pub(crate) type_kind: TypeKind,
    pub(crate) pointer_free: bool,
    pub(crate) overlayable: bool,
    pub(crate) members: Vec<MemberDescriptor>,
}

impl TypeDescriptor {
    /// Create a descriptor from raw fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        type_id: NodeId,
        binary_encoding_id: NodeId,
        mem_size: u16,
        type_kind: TypeKind,
        pointer_free: bool,
        overlayable: bool,
        members: Vec<MemberDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            type_id,
            binary_encoding_id,
            mem_size,
            type_kind,
            pointer_free,
            overlayable,
            members,
        }
    }

    /// Diagnostic type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> &NodeId {
        &self.type_id
    }

    pub fn binary_encoding_id(&self) -> &NodeId {
        &self.binary_encoding_id
    }

    /// Size of the native value in bytes.
    pub fn mem_size(&self) -> usize {
        self.mem_size as usize
    }

    pub fn type_kind(&self) -> TypeKind {
        self.type_kind
    }

    /// No heap allocation is reachable from a value of this type.
    pub fn is_pointer_free(&self) -> bool {
        self.pointer_free
    }

    /// The native layout is byte-identical to the wire encoding.
    pub fn is_overlayable(&self) -> bool {
        self.overlayable
    }

    /// Members in ascending memory order.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name() == Some(name))
    }

    /// Member index by name.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name() == Some(name))
    }

    /// Byte offset of every member inside the value.
    ///
    /// Union alternatives all report the shared payload offset.
    pub fn member_offsets(&self) -> Vec<usize> {
        if self.type_kind == TypeKind::Union {
            return self.members.iter().map(MemberDescriptor::padding).collect();
        }
        let mut offset = 0;
        self.members
            .iter()
            .map(|m| {
                offset += m.padding();
                let current = offset;
                offset += m.mem_size();
                current
            })
            .collect()
    }

    /// Promote to a process-wide `&'static` descriptor.
    ///
    /// Intended for descriptors assembled at runtime that must be referenced
    /// from other descriptors' members. The memory is never reclaimed.
    pub fn leak(self) -> &'static TypeDescriptor {
        Box::leak(Box::new(self))
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.type_id == other.type_id
            && self.binary_encoding_id == other.binary_encoding_id
            && self.mem_size == other.mem_size
            && self.type_kind == other.type_kind
            && self.pointer_free == other.pointer_free
            && self.overlayable == other.overlayable
            && self.members == other.members
    }
}

impl Eq for TypeDescriptor {}
