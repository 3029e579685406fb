// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversions between idiomatic Rust values and native representations.

use crate::builtin::{
    UaByteString, UaDateTime, UaGuid, UaLocalizedText, UaQualifiedName, UaString,
};
use crate::error::Result;
use crate::node_id::Guid;
use crate::registry::NativeType;
use crate::wrapper::{ArrayOwnershipWrapper, OwnershipWrapper};
use std::time::SystemTime;

/// Two-way conversion to an owned native value.
pub trait TypeConverter: Sized {
    type Native: NativeType;

    /// Convert a well-formed native value. Never fails.
    fn from_native(native: &Self::Native) -> Self;

    /// Allocate the native form of `self`. Fails only on allocation.
    fn to_native(&self) -> Result<OwnershipWrapper<Self::Native>>;
}

macro_rules! identity_converter {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TypeConverter for $ty {
                type Native = $ty;

                fn from_native(native: &$ty) -> Self {
                    *native
                }

                fn to_native(&self) -> Result<OwnershipWrapper<$ty>> {
                    Ok(OwnershipWrapper::from_value(*self))
                }
            }
        )*
    };
}

identity_converter!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl TypeConverter for String {
    type Native = UaString;

    /// Invalid UTF-8 is replaced, like [`String::from_utf8_lossy`].
    fn from_native(native: &UaString) -> Self {
        native.to_string_lossy()
    }

    fn to_native(&self) -> Result<OwnershipWrapper<UaString>> {
        UaString::alloc(self)
    }
}

impl TypeConverter for Vec<u8> {
    type Native = UaByteString;

    fn from_native(native: &UaByteString) -> Self {
        native.as_bytes().to_vec()
    }

    fn to_native(&self) -> Result<OwnershipWrapper<UaByteString>> {
        UaByteString::from_bytes(self)
    }
}

impl TypeConverter for SystemTime {
    type Native = UaDateTime;

    fn from_native(native: &UaDateTime) -> Self {
        native.to_system_time()
    }

    fn to_native(&self) -> Result<OwnershipWrapper<UaDateTime>> {
        Ok(OwnershipWrapper::from_value(UaDateTime::from_system_time(*self)))
    }
}

impl TypeConverter for Guid {
    type Native = UaGuid;

    fn from_native(native: &UaGuid) -> Self {
        Guid::from(*native)
    }

    fn to_native(&self) -> Result<OwnershipWrapper<UaGuid>> {
        Ok(OwnershipWrapper::from_value(UaGuid::from(*self)))
    }
}

/// Name qualified by a namespace index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub namespace_index: u16,
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }
}

impl TypeConverter for QualifiedName {
    type Native = UaQualifiedName;

    fn from_native(native: &UaQualifiedName) -> Self {
        Self::new(native.namespace_index, native.name.to_string_lossy())
    }

    fn to_native(&self) -> Result<OwnershipWrapper<UaQualifiedName>> {
        let name = UaString::alloc(&self.name)?;
        let native = UaQualifiedName {
            namespace_index: self.namespace_index,
            name: name.into_native(),
        };
        // SAFETY: the name buffer was just released by its wrapper.
        Ok(unsafe { OwnershipWrapper::adopt(native) })
    }
}

/// Human readable text with its locale (e.g. `en-US`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocalizedText {
    pub locale: String,
    pub text: String,
}

impl LocalizedText {
    pub fn new(locale: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            text: text.into(),
        }
    }
}

impl TypeConverter for LocalizedText {
    type Native = UaLocalizedText;

    fn from_native(native: &UaLocalizedText) -> Self {
        Self::new(native.locale.to_string_lossy(), native.text.to_string_lossy())
    }

    fn to_native(&self) -> Result<OwnershipWrapper<UaLocalizedText>> {
        let locale = UaString::alloc(&self.locale)?;
        let text = UaString::alloc(&self.text)?;
        let native = UaLocalizedText {
            locale: locale.into_native(),
            text: text.into_native(),
        };
        // SAFETY: both buffers were just released by their wrappers.
        Ok(unsafe { OwnershipWrapper::adopt(native) })
    }
}

/// Native array of converted values.
pub fn to_native_array<V: TypeConverter>(values: &[V]) -> Result<ArrayOwnershipWrapper<V::Native>> {
    let mut array = ArrayOwnershipWrapper::with_len(values.len())?;
    // SAFETY: slots are empty; each receives a value owned by a wrapper.
    let slots = unsafe { array.as_mut_slice() };
    for (slot, value) in slots.iter_mut().zip(values) {
        *slot = value.to_native()?.into_native();
    }
    Ok(array)
}

/// Rust values of a native array.
pub fn from_native_array<V: TypeConverter>(natives: &[V::Native]) -> Vec<V> {
    natives.iter().map(V::from_native).collect()
}
