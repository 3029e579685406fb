// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased value holder tagged with its descriptor.
//!
//! A [`Variant`] owns one scalar or one array of any described type. Typed
//! access checks the tag against the descriptor statically bound to the
//! requested type, so a mismatch surfaces as [`Error::TypeMismatch`] instead of
//! a misinterpreted buffer.

use crate::convert::{to_native_array, TypeConverter};
use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::memory;
use crate::registry::{NativeType, TypeRegistry};
use crate::wrapper::{clone_failed, ArrayOwnershipWrapper, OwnershipWrapper};
use std::fmt;

enum Storage {
    Empty,
    Scalar(*mut u8),
    Array { data: *mut u8, len: usize },
}

/// Owned scalar or array of a runtime-tagged type.
pub struct Variant {
    data_type: Option<&'static TypeDescriptor>,
    storage: Storage,
}

impl Variant {
    /// Empty variant.
    pub fn new() -> Self {
        Self {
            data_type: None,
            storage: Storage::Empty,
        }
    }

    /// Move a native scalar into the variant.
    pub fn from_scalar<T: NativeType>(value: OwnershipWrapper<T>) -> Result<Self> {
        let descriptor = TypeRegistry::descriptor::<T>();
        let block = memory::allocate(descriptor)?;
        // SAFETY: the block is sized and aligned for T; ownership moves into it.
        unsafe { block.cast::<T>().write(value.into_native()) };
        Ok(Self {
            data_type: Some(descriptor),
            storage: Storage::Scalar(block),
        })
    }

    /// Move a native array into the variant.
    pub fn from_array<T: NativeType>(array: ArrayOwnershipWrapper<T>) -> Self {
        let descriptor = TypeRegistry::descriptor::<T>();
        let (data, len) = array.into_raw_parts();
        Self {
            data_type: Some(descriptor),
            storage: Storage::Array {
                data: data.cast(),
                len,
            },
        }
    }

    /// Scalar holding the native form of `value`.
    pub fn from_value<V: TypeConverter>(value: &V) -> Result<Self> {
        Self::from_scalar(value.to_native()?)
    }

    /// Array holding the native form of `values`.
    pub fn from_values<V: TypeConverter>(values: &[V]) -> Result<Self> {
        Ok(Self::from_array(to_native_array(values)?))
    }

    /// Descriptor of the held type, `None` when empty.
    pub fn data_type(&self) -> Option<&'static TypeDescriptor> {
        self.data_type
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.storage, Storage::Empty)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.storage, Storage::Scalar(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.storage, Storage::Array { .. })
    }

    /// Element count of an array variant.
    pub fn array_len(&self) -> Option<usize> {
        match self.storage {
            Storage::Array { len, .. } => Some(len),
            _ => None,
        }
    }

    /// Holds a value (scalar or array) of type `T`.
    pub fn is_type<T: NativeType>(&self) -> bool {
        self.data_type
            .is_some_and(|actual| same_type(TypeRegistry::descriptor::<T>(), actual))
    }

    fn check_type<T: NativeType>(&self) -> Result<()> {
        let actual = self.data_type.ok_or(Error::EmptyVariant)?;
        let expected = TypeRegistry::descriptor::<T>();
        if !same_type(expected, actual) {
            return Err(Error::TypeMismatch {
                expected: expected.name().to_owned(),
                actual: actual.name().to_owned(),
            });
        }
        Ok(())
    }

    /// Scalar of type `T`.
    pub fn scalar<T: NativeType>(&self) -> Result<&T> {
        self.check_type::<T>()?;
        match self.storage {
            // SAFETY: tag checked; the block holds one valid T.
            Storage::Scalar(block) => Ok(unsafe { &*block.cast::<T>() }),
            _ => Err(Error::NotScalar),
        }
    }

    /// Array of type `T`.
    pub fn array<T: NativeType>(&self) -> Result<&[T]> {
        self.check_type::<T>()?;
        match self.storage {
            Storage::Array { len: 0, .. } => Ok(&[]),
            // SAFETY: tag checked; the block holds `len` valid values of T.
            Storage::Array { data, len } => {
                Ok(unsafe { std::slice::from_raw_parts(data.cast::<T>(), len) })
            }
            _ => Err(Error::NotArray),
        }
    }

    /// Scalar converted to its Rust form.
    pub fn to_value<V: TypeConverter>(&self) -> Result<V> {
        self.scalar::<V::Native>().map(V::from_native)
    }

    /// Array converted to its Rust form.
    pub fn to_values<V: TypeConverter>(&self) -> Result<Vec<V>> {
        self.array::<V::Native>()
            .map(|natives| natives.iter().map(V::from_native).collect())
    }

    /// Release the content; idempotent.
    pub fn clear(&mut self) {
        let storage = std::mem::replace(&mut self.storage, Storage::Empty);
        if let Some(descriptor) = self.data_type.take() {
            // SAFETY: the storage was allocated by the memory engine for
            // `descriptor` and is no longer referenced.
            unsafe {
                match storage {
                    Storage::Empty => {}
                    Storage::Scalar(block) => memory::free(block, descriptor),
                    Storage::Array { data, len } => memory::free_array(data, descriptor, len),
                }
            }
        }
    }

    /// Deep copy reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        let Some(descriptor) = self.data_type else {
            return Ok(Self::new());
        };
        // SAFETY: the storage holds valid values of `descriptor`.
        let storage = unsafe {
            match self.storage {
                Storage::Empty => Storage::Empty,
                Storage::Scalar(block) => {
                    let copy = memory::allocate(descriptor)?;
                    if let Err(e) = memory::copy(block, copy, descriptor) {
                        memory::free(copy, descriptor);
                        return Err(e);
                    }
                    Storage::Scalar(copy)
                }
                Storage::Array { data, len } => Storage::Array {
                    data: memory::copy_array(data, descriptor, len)?,
                    len,
                },
            }
        };
        Ok(Self {
            data_type: Some(descriptor),
            storage,
        })
    }
}

fn same_type(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    std::ptr::eq(a, b) || a == b
}

impl Default for Variant {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Variant {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| clone_failed(e))
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        let descriptor = match (self.data_type, other.data_type) {
            (None, None) => return true,
            (Some(a), Some(b)) if same_type(a, b) => a,
            _ => return false,
        };
        // SAFETY: both sides hold valid values of the same descriptor.
        unsafe {
            match (&self.storage, &other.storage) {
                (Storage::Scalar(a), Storage::Scalar(b)) => memory::equal(*a, *b, descriptor),
                (
                    Storage::Array { data: a, len: len_a },
                    Storage::Array { data: b, len: len_b },
                ) => {
                    let size = descriptor.mem_size();
                    len_a == len_b
                        && (0..*len_a).all(|i| {
                            memory::equal(a.add(i * size), b.add(i * size), descriptor)
                        })
                }
                (Storage::Empty, Storage::Empty) => true,
                _ => false,
            }
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.data_type.map_or("", TypeDescriptor::name);
        match self.storage {
            Storage::Empty => f.write_str("Variant(empty)"),
            Storage::Scalar(_) => write!(f, "Variant({} scalar)", name),
            Storage::Array { len, .. } => write!(f, "Variant({}[{}])", name, len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::UaString;
    use crate::convert::LocalizedText;

    #[test]
    fn test_empty_variant() {
        let v = Variant::new();
        assert!(v.is_empty());
        assert_eq!(v.data_type(), None);
        assert_eq!(v.scalar::<i32>().unwrap_err(), Error::EmptyVariant);
        assert_eq!(v.to_value::<String>().unwrap_err(), Error::EmptyVariant);
        assert_eq!(v, Variant::default());
    }

    #[test]
    fn test_scalar_round_trip() {
        let v = Variant::from_value(&String::from("hello")).expect("variant");
        assert!(v.is_scalar());
        assert!(v.is_type::<UaString>());
        assert_eq!(v.scalar::<UaString>().expect("scalar").as_bytes(), b"hello");
        assert_eq!(v.to_value::<String>().expect("value"), "hello");
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let v = Variant::from_value(&42i32).expect("variant");
        assert_eq!(
            v.to_value::<String>().unwrap_err(),
            Error::TypeMismatch {
                expected: "String".into(),
                actual: "Int32".into(),
            }
        );
        assert!(matches!(
            v.scalar::<u32>(),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(v.to_value::<i32>().expect("value"), 42);
    }

    #[test]
    fn test_shape_mismatch() {
        let scalar = Variant::from_value(&1.5f32).expect("variant");
        assert_eq!(scalar.array::<f32>().unwrap_err(), Error::NotArray);

        let array = Variant::from_values(&[1.5f32, 2.5]).expect("variant");
        assert_eq!(array.scalar::<f32>().unwrap_err(), Error::NotScalar);
        assert_eq!(array.array::<f32>().expect("array"), &[1.5, 2.5]);
        assert_eq!(array.array_len(), Some(2));
    }

    #[test]
    fn test_clone_is_deep() {
        let texts = [
            LocalizedText::new("en", "one"),
            LocalizedText::new("fr", "un"),
        ];
        let v = Variant::from_values(&texts).expect("variant");
        let mut copy = v.clone();
        assert_eq!(copy, v);

        copy.clear();
        assert!(copy.is_empty());
        assert_ne!(copy, v);
        assert_eq!(v.to_values::<LocalizedText>().expect("values"), texts);
    }

    #[test]
    fn test_equality_checks_type() {
        let a = Variant::from_value(&7u32).expect("variant");
        let b = Variant::from_value(&7i32).expect("variant");
        assert_ne!(a, b);
        assert_eq!(a, Variant::from_value(&7u32).expect("variant"));
        assert_eq!(format!("{:?}", a), "Variant(UInt32 scalar)");
    }

    #[test]
    fn test_empty_array() {
        let v = Variant::from_values::<String>(&[]).expect("variant");
        assert!(v.is_array());
        assert_eq!(v.to_values::<String>().expect("values"), Vec::<String>::new());
        assert_eq!(v.clone(), v);
    }
}
