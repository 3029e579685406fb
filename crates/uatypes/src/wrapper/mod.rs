// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RAII ownership of native values.
//!
//! [`OwnershipWrapper`] owns one native value, [`ArrayOwnershipWrapper`] a
//! contiguous block of them. Copy, clear and comparison are delegated to the
//! [`memory`](crate::memory) engine with the descriptor bound to `T`, so the
//! wrappers work for built-in and user-described types alike.

mod array;
#[cfg(test)]
mod tests;

pub use array::ArrayOwnershipWrapper;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::memory;
use crate::registry::{zeroed, NativeType, TypeRegistry};
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr;

/// Abort on allocation failure inside `Clone`, like std collections do.
#[cold]
pub(crate) fn clone_failed(error: Error) -> ! {
    match error {
        Error::OutOfMemory(layout) => std::alloc::handle_alloc_error(layout),
        other => panic!("clone failed: {}", other),
    }
}

/// Exclusive owner of one native `T`.
///
/// The all-zero value is the empty state: a fresh wrapper allocates nothing,
/// and dropping an empty wrapper does nothing.
///
/// ```rust
/// use uatypes::{OwnershipWrapper, UaString};
///
/// let original = UaString::alloc("temperature")?;
/// let mut copy = original.clone();
/// assert_eq!(copy, original);
///
/// copy.clear();
/// assert!(copy.is_empty());
/// assert_eq!(original.as_bytes(), b"temperature");
///
/// let moved = OwnershipWrapper::take(&mut copy);
/// assert!(moved.is_empty());
/// # Ok::<(), uatypes::Error>(())
/// ```
pub struct OwnershipWrapper<T: NativeType> {
    value: T,
}

impl<T: NativeType> OwnershipWrapper<T> {
    /// Empty wrapper.
    pub fn new() -> Self {
        Self::descriptor();
        Self { value: zeroed() }
    }

    /// Wrap a value that owns no heap memory.
    ///
    /// Panics if the descriptor of `T` is not pointer-free; use
    /// [`copy_from`](Self::copy_from) or [`adopt`](Self::adopt) instead.
    pub fn from_value(value: T) -> Self {
        let descriptor = Self::descriptor();
        assert!(
            descriptor.is_pointer_free(),
            "`{}` owns heap memory and cannot be wrapped by value",
            descriptor.name()
        );
        Self { value }
    }

    /// Take ownership of `value` without copying.
    ///
    /// # Safety
    ///
    /// Every heap block reachable from `value` was allocated by the memory
    /// engine and is not owned by anything else.
    pub unsafe fn adopt(value: T) -> Self {
        Self::descriptor();
        Self { value }
    }

    /// Deep copy of a native value owned elsewhere.
    ///
    /// # Safety
    ///
    /// `value` is a valid value of `T` as described by its descriptor.
    pub unsafe fn copy_from(value: &T) -> Result<Self> {
        let mut wrapper = Self::new();
        memory::copy(
            (value as *const T).cast(),
            wrapper.as_mut_ptr().cast(),
            Self::descriptor(),
        )?;
        Ok(wrapper)
    }

    /// Deep copy reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        // SAFETY: the wrapped value is valid by construction.
        unsafe { Self::copy_from(&self.value) }
    }

    /// Replace the content with a deep copy of `source`.
    ///
    /// The previous content is released first. On failure `self` is empty.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<()> {
        self.clear();
        // SAFETY: both values are valid; `self` was just cleared.
        unsafe {
            memory::copy(
                source.as_ptr().cast(),
                self.as_mut_ptr().cast(),
                Self::descriptor(),
            )
        }
    }

    /// Descriptor bound to `T`.
    pub fn descriptor() -> &'static TypeDescriptor {
        TypeRegistry::descriptor::<T>()
    }

    /// Shared access to the native value.
    pub fn handle(&self) -> &T {
        &self.value
    }

    /// Mutable access to the native value.
    ///
    /// # Safety
    ///
    /// Heap parts replaced through this reference must come from the memory
    /// engine; replaced parts are not released automatically.
    pub unsafe fn handle_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn as_ptr(&self) -> *const T {
        &self.value
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        &mut self.value
    }

    /// Release ownership; the caller becomes responsible for clearing.
    pub fn into_native(self) -> T {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the value is moved out once.
        unsafe { ptr::read(&this.value) }
    }

    /// Move the content out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.value, &mut other.value);
    }

    /// Release the content; idempotent.
    pub fn clear(&mut self) {
        // SAFETY: the wrapped value is valid and owned by self.
        unsafe { memory::clear(self.as_mut_ptr().cast(), Self::descriptor()) }
    }

    /// Holds the all-zero empty value.
    pub fn is_empty(&self) -> bool {
        let empty = Self::new();
        self == &empty
    }
}

impl<T: NativeType> Default for OwnershipWrapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeType> Drop for OwnershipWrapper<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: NativeType> Clone for OwnershipWrapper<T> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| clone_failed(e))
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(e) = self.try_clone_from(source) {
            clone_failed(e);
        }
    }
}

impl<T: NativeType> PartialEq for OwnershipWrapper<T> {
    fn eq(&self, other: &Self) -> bool {
        // SAFETY: both values are valid.
        unsafe {
            memory::equal(
                self.as_ptr().cast(),
                other.as_ptr().cast(),
                Self::descriptor(),
            )
        }
    }
}

impl<T: NativeType> Deref for OwnershipWrapper<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: NativeType> AsRef<T> for OwnershipWrapper<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: NativeType + fmt::Debug> fmt::Debug for OwnershipWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(Self::descriptor().name())
            .field(&self.value)
            .finish()
    }
}
