// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in descriptor table and native built-in types.
//!
//! Each entry is constructed on first lookup and then shared read-only for the
//! rest of the process. Composite built-ins (String, QualifiedName, ...) are
//! produced by [`TypeDescriptorBuilder`] like any user type, so the memory
//! engine needs no special cases for them.

mod types;

pub use types::{
    UaByteString, UaDateTime, UaGuid, UaLocalizedText, UaQualifiedName, UaStatusCode, UaString,
};

use crate::builder::{StructKind, TypeDescriptorBuilder};
use crate::config::{ns0, FLOAT_OVERLAYABLE, INTEGER_OVERLAYABLE, NS0};
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::node_id::NodeId;
use crate::registry::NativeType;
use std::mem::size_of;
use std::sync::OnceLock;

/// Index into the built-in descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum TypeIndex {
    Boolean,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    Guid,
    ByteString,
    StatusCode,
    QualifiedName,
    LocalizedText,
}

impl TypeIndex {
    pub const COUNT: usize = 18;

    pub const ALL: [TypeIndex; Self::COUNT] = [
        TypeIndex::Boolean,
        TypeIndex::SByte,
        TypeIndex::Byte,
        TypeIndex::Int16,
        TypeIndex::UInt16,
        TypeIndex::Int32,
        TypeIndex::UInt32,
        TypeIndex::Int64,
        TypeIndex::UInt64,
        TypeIndex::Float,
        TypeIndex::Double,
        TypeIndex::String,
        TypeIndex::DateTime,
        TypeIndex::Guid,
        TypeIndex::ByteString,
        TypeIndex::StatusCode,
        TypeIndex::QualifiedName,
        TypeIndex::LocalizedText,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TypeIndex::Boolean => "Boolean",
            TypeIndex::SByte => "SByte",
            TypeIndex::Byte => "Byte",
            TypeIndex::Int16 => "Int16",
            TypeIndex::UInt16 => "UInt16",
            TypeIndex::Int32 => "Int32",
            TypeIndex::UInt32 => "UInt32",
            TypeIndex::Int64 => "Int64",
            TypeIndex::UInt64 => "UInt64",
            TypeIndex::Float => "Float",
            TypeIndex::Double => "Double",
            TypeIndex::String => "String",
            TypeIndex::DateTime => "DateTime",
            TypeIndex::Guid => "Guid",
            TypeIndex::ByteString => "ByteString",
            TypeIndex::StatusCode => "StatusCode",
            TypeIndex::QualifiedName => "QualifiedName",
            TypeIndex::LocalizedText => "LocalizedText",
        }
    }

    /// Numeric identifier in namespace 0.
    pub fn numeric_id(self) -> u32 {
        match self {
            TypeIndex::Boolean => ns0::BOOLEAN,
            TypeIndex::SByte => ns0::SBYTE,
            TypeIndex::Byte => ns0::BYTE,
            TypeIndex::Int16 => ns0::INT16,
            TypeIndex::UInt16 => ns0::UINT16,
            TypeIndex::Int32 => ns0::INT32,
            TypeIndex::UInt32 => ns0::UINT32,
            TypeIndex::Int64 => ns0::INT64,
            TypeIndex::UInt64 => ns0::UINT64,
            TypeIndex::Float => ns0::FLOAT,
            TypeIndex::Double => ns0::DOUBLE,
            TypeIndex::String => ns0::STRING,
            TypeIndex::DateTime => ns0::DATE_TIME,
            TypeIndex::Guid => ns0::GUID,
            TypeIndex::ByteString => ns0::BYTE_STRING,
            TypeIndex::StatusCode => ns0::STATUS_CODE,
            TypeIndex::QualifiedName => ns0::QUALIFIED_NAME,
            TypeIndex::LocalizedText => ns0::LOCALIZED_TEXT,
        }
    }

    pub fn node_id(self) -> NodeId {
        NodeId::numeric(NS0, self.numeric_id())
    }

    /// Built-in type identified by a namespace 0 numeric node id.
    pub fn from_node_id(id: &NodeId) -> Option<TypeIndex> {
        if id.namespace_index() != NS0 {
            return None;
        }
        let numeric = id.as_numeric()?;
        Self::ALL.into_iter().find(|index| index.numeric_id() == numeric)
    }
}

/// Built-in descriptor by index.
pub fn builtin(index: TypeIndex) -> &'static TypeDescriptor {
    // One cell per entry: composite built-ins look up their member types
    // while being initialised.
    static TABLE: [OnceLock<TypeDescriptor>; TypeIndex::COUNT] =
        [const { OnceLock::new() }; TypeIndex::COUNT];
    TABLE[index as usize].get_or_init(|| make_builtin(index))
}

fn scalar<T>(index: TypeIndex, overlayable: bool) -> TypeDescriptor {
    TypeDescriptor::new(
        index.name(),
        index.node_id(),
        index.node_id(),
        size_of::<T>() as u16,
        TypeKind::Scalar,
        true,
        overlayable,
        Vec::new(),
    )
}

fn structure<T: NativeType>(index: TypeIndex) -> TypeDescriptorBuilder<T, StructKind> {
    TypeDescriptorBuilder::<T>::create_structure(index.name(), index.node_id(), index.node_id())
}

fn make_builtin(index: TypeIndex) -> TypeDescriptor {
    match index {
        TypeIndex::Boolean => scalar::<bool>(index, true),
        TypeIndex::SByte => scalar::<i8>(index, true),
        TypeIndex::Byte => scalar::<u8>(index, true),
        TypeIndex::Int16 => scalar::<i16>(index, INTEGER_OVERLAYABLE),
        TypeIndex::UInt16 => scalar::<u16>(index, INTEGER_OVERLAYABLE),
        TypeIndex::Int32 => scalar::<i32>(index, INTEGER_OVERLAYABLE),
        TypeIndex::UInt32 => scalar::<u32>(index, INTEGER_OVERLAYABLE),
        TypeIndex::Int64 => scalar::<i64>(index, INTEGER_OVERLAYABLE),
        TypeIndex::UInt64 => scalar::<u64>(index, INTEGER_OVERLAYABLE),
        TypeIndex::Float => scalar::<f32>(index, FLOAT_OVERLAYABLE),
        TypeIndex::Double => scalar::<f64>(index, FLOAT_OVERLAYABLE),
        TypeIndex::DateTime => scalar::<UaDateTime>(index, INTEGER_OVERLAYABLE),
        TypeIndex::Guid => scalar::<UaGuid>(index, INTEGER_OVERLAYABLE),
        TypeIndex::StatusCode => scalar::<UaStatusCode>(index, INTEGER_OVERLAYABLE),
        TypeIndex::String => types::string_descriptor(structure::<UaString>(index)),
        TypeIndex::ByteString => types::byte_string_descriptor(structure::<UaByteString>(index)),
        TypeIndex::QualifiedName => {
            types::qualified_name_descriptor(structure::<UaQualifiedName>(index))
        }
        TypeIndex::LocalizedText => {
            types::localized_text_descriptor(structure::<UaLocalizedText>(index))
        }
    }
}

macro_rules! builtin_native_types {
    ($($ty:ty => $index:ident),* $(,)?) => {
        $(
            // SAFETY: primitive or #[repr(C)] type whose layout is described
            // by the matching table entry; all-zero is its empty value.
            unsafe impl NativeType for $ty {
                fn descriptor() -> &'static TypeDescriptor {
                    builtin(TypeIndex::$index)
                }
            }
        )*
    };
}

builtin_native_types! {
    bool => Boolean,
    i8 => SByte,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    UaString => String,
    UaDateTime => DateTime,
    UaGuid => Guid,
    UaByteString => ByteString,
    UaStatusCode => StatusCode,
    UaQualifiedName => QualifiedName,
    UaLocalizedText => LocalizedText,
}
