// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Owned contiguous block of native values.

use super::clone_failed;
use crate::config::empty_array_sentinel;
use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::memory;
use crate::registry::{NativeType, TypeRegistry};
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::Index;
use std::ptr;

/// Exclusive owner of `len` contiguous native values.
///
/// The block comes from [`memory::allocate_array`]. An empty array owns no
/// block and points at the empty-array sentinel.
pub struct ArrayOwnershipWrapper<T: NativeType> {
    data: *mut T,
    len: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the block is exclusively owned, like a Vec<T>.
unsafe impl<T: NativeType + Send> Send for ArrayOwnershipWrapper<T> {}
unsafe impl<T: NativeType + Sync> Sync for ArrayOwnershipWrapper<T> {}

impl<T: NativeType> ArrayOwnershipWrapper<T> {
    /// Empty array.
    pub fn new() -> Self {
        Self::descriptor();
        Self {
            data: empty_array_sentinel().cast(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// `len` empty (zeroed) elements.
    pub fn with_len(len: usize) -> Result<Self> {
        let data = memory::allocate_array(Self::descriptor(), len)?;
        Ok(Self {
            data: data.cast(),
            len,
            _marker: PhantomData,
        })
    }

    /// Take ownership of a raw block.
    ///
    /// # Safety
    ///
    /// `data` was allocated by [`memory::allocate_array`] for `len` values of
    /// `T` (or is null / the sentinel with `len == 0`), and nothing else owns
    /// it or its heap parts.
    pub unsafe fn adopt(data: *mut T, len: usize) -> Self {
        Self::descriptor();
        Self {
            data,
            len,
            _marker: PhantomData,
        }
    }

    /// Deep copy of native values owned elsewhere.
    ///
    /// # Safety
    ///
    /// Every element of `values` is a valid value of `T`.
    pub unsafe fn copy_from_slice(values: &[T]) -> Result<Self> {
        let data = memory::copy_array(values.as_ptr().cast(), Self::descriptor(), values.len())?;
        Ok(Self::adopt(data.cast(), values.len()))
    }

    /// Deep copy reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        // SAFETY: the block holds `len` valid values.
        unsafe {
            let data = memory::copy_array(self.data.cast(), Self::descriptor(), self.len)?;
            Ok(Self::adopt(data.cast(), self.len))
        }
    }

    /// Descriptor of the element type.
    pub fn descriptor() -> &'static TypeDescriptor {
        TypeRegistry::descriptor::<T>()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: `data` holds `len` initialised values owned by self.
        unsafe { std::slice::from_raw_parts(self.data, self.len) }
    }

    /// # Safety
    ///
    /// See [`OwnershipWrapper::handle_mut`](super::OwnershipWrapper::handle_mut).
    pub unsafe fn as_mut_slice(&mut self) -> &mut [T] {
        if self.len == 0 {
            return &mut [];
        }
        std::slice::from_raw_parts_mut(self.data, self.len)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "index {} out of range for array of length {}",
            index,
            self.len
        );
    }

    /// Element at `index`; panics outside `[0, len)`.
    pub fn at(&self, index: usize) -> &T {
        self.check_index(index);
        // SAFETY: bounds checked above.
        unsafe { &*self.data.add(index) }
    }

    /// Mutable element at `index`; panics outside `[0, len)`.
    ///
    /// # Safety
    ///
    /// See [`OwnershipWrapper::handle_mut`](super::OwnershipWrapper::handle_mut).
    pub unsafe fn at_mut(&mut self, index: usize) -> &mut T {
        self.check_index(index);
        &mut *self.data.add(index)
    }

    /// Address of the element at `index`; panics outside `[0, len)`.
    pub fn ptr_at(&self, index: usize) -> *const T {
        self.check_index(index);
        // SAFETY: bounds checked above.
        unsafe { self.data.add(index) }
    }

    /// # Safety
    ///
    /// `index < len`.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        &*self.data.add(index)
    }

    pub fn as_ptr(&self) -> *const T {
        self.data
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data
    }

    /// Release ownership of the block and its length.
    pub fn into_raw_parts(self) -> (*mut T, usize) {
        let this = ManuallyDrop::new(self);
        (this.data, this.len)
    }

    /// Move the content out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.data, &mut other.data);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Release every element and the block; idempotent.
    pub fn clear(&mut self) {
        let data = std::mem::replace(&mut self.data, empty_array_sentinel().cast());
        let len = std::mem::take(&mut self.len);
        // SAFETY: the block was owned by self and is no longer referenced.
        unsafe { memory::free_array(data.cast(), Self::descriptor(), len) }
    }
}

impl<T: NativeType> Default for ArrayOwnershipWrapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeType> Drop for ArrayOwnershipWrapper<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: NativeType> Clone for ArrayOwnershipWrapper<T> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| clone_failed(e))
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        match source.try_clone() {
            Ok(copy) => *self = copy,
            Err(e) => clone_failed(e),
        }
    }
}

impl<T: NativeType> PartialEq for ArrayOwnershipWrapper<T> {
    fn eq(&self, other: &Self) -> bool {
        let descriptor = Self::descriptor();
        self.len == other.len
            && self.iter().zip(other.iter()).all(|(a, b)| {
                // SAFETY: both elements are valid.
                unsafe {
                    memory::equal(
                        ptr::from_ref(a).cast(),
                        ptr::from_ref(b).cast(),
                        descriptor,
                    )
                }
            })
    }
}

impl<T: NativeType> Index<usize> for ArrayOwnershipWrapper<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<'a, T: NativeType> IntoIterator for &'a ArrayOwnershipWrapper<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: NativeType + fmt::Debug> fmt::Debug for ArrayOwnershipWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::descriptor().name())?;
        f.debug_list().entries(self.iter()).finish()
    }
}
