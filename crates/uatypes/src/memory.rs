// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven memory engine.
//!
//! Allocates, clears, deep-copies and compares values of any described type,
//! walking the member list of the descriptor instead of per-type code. This is
//! the only place that touches the heap parts of native values (array buffers,
//! optional members); wrappers and external codecs go through it.
//!
//! Every function taking raw pointers is `unsafe`: callers guarantee that the
//! pointer addresses a valid value of the given descriptor, and that every
//! heap block reachable from it was allocated here.

use crate::config::{empty_array_sentinel, ALLOC_ALIGN};
use crate::descriptor::{MemberDescriptor, TypeDescriptor, TypeKind};
use crate::error::{Error, Result};
use std::alloc::{self, Layout};
use std::mem::size_of;
use std::ptr;

// =======================================================================
// Allocation
// =======================================================================

fn array_layout(descriptor: &TypeDescriptor, count: usize) -> Result<Layout> {
    assert!(
        descriptor.mem_size() > 0,
        "cannot allocate values of zero-sized type `{}`",
        descriptor.name()
    );
    let size = descriptor
        .mem_size()
        .checked_mul(count)
        .ok_or(Error::CapacityOverflow)?;
    Layout::from_size_align(size, ALLOC_ALIGN).map_err(|_| Error::CapacityOverflow)
}

/// Zero-initialised heap block for one value.
pub fn allocate(descriptor: &TypeDescriptor) -> Result<*mut u8> {
    allocate_array(descriptor, 1)
}

/// Zero-initialised heap block for `count` contiguous values.
///
/// `count == 0` allocates nothing and returns the empty-array sentinel.
pub fn allocate_array(descriptor: &TypeDescriptor, count: usize) -> Result<*mut u8> {
    if count == 0 {
        return Ok(empty_array_sentinel());
    }
    let layout = array_layout(descriptor, count)?;
    // SAFETY: layout size is non-zero (mem_size > 0, count > 0).
    let block = unsafe { alloc::alloc_zeroed(layout) };
    if block.is_null() {
        log::error!(
            "[memory] failed to allocate {} x `{}` ({} bytes)",
            count,
            descriptor.name(),
            layout.size()
        );
        return Err(Error::OutOfMemory(layout));
    }
    Ok(block)
}

/// Release a block from [`allocate`] after clearing its heap parts.
///
/// # Safety
///
/// `value` is null or was returned by [`allocate`] for `descriptor`.
pub unsafe fn free(value: *mut u8, descriptor: &TypeDescriptor) {
    free_array(value, descriptor, 1);
}

/// Release a block from [`allocate_array`] after clearing every element.
///
/// Null pointers, the empty-array sentinel and `count == 0` are no-ops.
///
/// # Safety
///
/// `array` was returned by [`allocate_array`] for `descriptor` and `count`.
pub unsafe fn free_array(array: *mut u8, descriptor: &TypeDescriptor, count: usize) {
    if count == 0 || array.is_null() {
        return;
    }
    let size = descriptor.mem_size();
    if !descriptor.is_pointer_free() {
        for index in 0..count {
            clear_members(array.add(index * size), descriptor);
        }
    }
    // SAFETY: the block was allocated with exactly this layout.
    let layout = Layout::from_size_align_unchecked(size * count, ALLOC_ALIGN);
    alloc::dealloc(array, layout);
}

// =======================================================================
// Init / Clear
// =======================================================================

/// Reset `value` to the all-zero empty value without releasing anything.
///
/// # Safety
///
/// `value` is writable for `descriptor.mem_size()` bytes.
pub unsafe fn init(value: *mut u8, descriptor: &TypeDescriptor) {
    ptr::write_bytes(value, 0, descriptor.mem_size());
}

/// Release every heap part of `value` and reset it to all-zero.
///
/// Idempotent: clearing an empty value does nothing.
///
/// # Safety
///
/// See the module documentation.
pub unsafe fn clear(value: *mut u8, descriptor: &TypeDescriptor) {
    if !descriptor.is_pointer_free() {
        clear_members(value, descriptor);
    }
    init(value, descriptor);
}

/// Release heap parts without zeroing; the caller zeroes the whole value.
unsafe fn clear_members(value: *mut u8, descriptor: &TypeDescriptor) {
    match descriptor.type_kind() {
        TypeKind::Scalar | TypeKind::Enum => {}
        TypeKind::Struct | TypeKind::OptionalStruct => {
            for (offset, member) in struct_members(descriptor) {
                clear_member(value.add(offset), member);
            }
        }
        TypeKind::Union => {
            if let Some(member) = selected_alternative(value, descriptor) {
                let member_type = member.member_type();
                if !member_type.is_pointer_free() {
                    clear_members(value.add(member.padding()), member_type);
                }
            }
        }
    }
}

unsafe fn clear_member(field: *mut u8, member: &MemberDescriptor) {
    let member_type = member.member_type();
    if member.is_array() {
        let (count, data) = read_array(field);
        free_array(data, member_type, count);
    } else if member.is_optional() {
        free(read_pointer(field), member_type);
    } else if !member_type.is_pointer_free() {
        clear_members(field, member_type);
    }
}

// =======================================================================
// Copy
// =======================================================================

/// Deep copy `src` into `dst`.
///
/// `dst` is overwritten without being cleared first. On failure `dst` is left
/// empty (all-zero, nothing allocated).
///
/// # Safety
///
/// `src` is a valid value of `descriptor`; `dst` is writable for
/// `descriptor.mem_size()` bytes and does not overlap `src`.
pub unsafe fn copy(src: *const u8, dst: *mut u8, descriptor: &TypeDescriptor) -> Result<()> {
    if descriptor.is_pointer_free() {
        ptr::copy_nonoverlapping(src, dst, descriptor.mem_size());
        return Ok(());
    }
    init(dst, descriptor);
    let result = copy_members(src, dst, descriptor);
    if result.is_err() {
        clear(dst, descriptor);
    }
    result
}

unsafe fn copy_members(src: *const u8, dst: *mut u8, descriptor: &TypeDescriptor) -> Result<()> {
    match descriptor.type_kind() {
        TypeKind::Scalar | TypeKind::Enum => {
            ptr::copy_nonoverlapping(src, dst, descriptor.mem_size());
        }
        TypeKind::Struct | TypeKind::OptionalStruct => {
            for (offset, member) in struct_members(descriptor) {
                copy_member(src.add(offset), dst.add(offset), member)?;
            }
        }
        TypeKind::Union => {
            if let Some(member) = selected_alternative(src, descriptor) {
                ptr::write_unaligned(dst.cast::<u32>(), read_switch(src));
                let offset = member.padding();
                copy(src.add(offset), dst.add(offset), member.member_type())?;
            }
        }
    }
    Ok(())
}

unsafe fn copy_member(src: *const u8, dst: *mut u8, member: &MemberDescriptor) -> Result<()> {
    let member_type = member.member_type();
    if member.is_array() {
        let (count, data) = read_array(src);
        let copied = copy_array(data, member_type, count)?;
        write_array(dst, count, copied);
    } else if member.is_optional() {
        let value = read_pointer(src);
        if !value.is_null() {
            let copied = allocate(member_type)?;
            // Published before the copy so a failure is released by clear().
            write_pointer(dst, copied);
            copy(value, copied, member_type)?;
        }
    } else {
        copy(src, dst, member_type)?;
    }
    Ok(())
}

/// Deep copy of a counted array into a new block.
///
/// `count == 0` preserves the distinction between an absent (null) and an
/// empty (sentinel) array. Nothing is leaked on failure.
///
/// # Safety
///
/// `src` holds `count` valid values of `descriptor` (or is null / the
/// sentinel when `count == 0`).
pub unsafe fn copy_array(
    src: *const u8,
    descriptor: &TypeDescriptor,
    count: usize,
) -> Result<*mut u8> {
    if count == 0 {
        return Ok(if src.is_null() {
            ptr::null_mut()
        } else {
            empty_array_sentinel()
        });
    }
    log::trace!("[memory] copying {} x `{}`", count, descriptor.name());
    let dst = allocate_array(descriptor, count)?;
    let size = descriptor.mem_size();
    if descriptor.is_pointer_free() {
        ptr::copy_nonoverlapping(src, dst, size * count);
        return Ok(dst);
    }
    for index in 0..count {
        let offset = index * size;
        if let Err(e) = copy(src.add(offset), dst.add(offset), descriptor) {
            // Elements not reached yet are still zero.
            free_array(dst, descriptor, count);
            return Err(e);
        }
    }
    Ok(dst)
}

// =======================================================================
// Equality
// =======================================================================

/// Deep, descriptor-driven equality.
///
/// Scalars and enums compare bytewise. Arrays compare counts, then elements;
/// an absent array differs from an empty one. Unions compare the switch, then
/// the selected alternative; an out-of-range switch has no payload to compare.
///
/// # Safety
///
/// `a` and `b` are valid values of `descriptor`.
pub unsafe fn equal(a: *const u8, b: *const u8, descriptor: &TypeDescriptor) -> bool {
    match descriptor.type_kind() {
        TypeKind::Scalar | TypeKind::Enum => bytes_equal(a, b, descriptor.mem_size()),
        TypeKind::Struct | TypeKind::OptionalStruct => struct_members(descriptor)
            .all(|(offset, member)| member_equal(a.add(offset), b.add(offset), member)),
        TypeKind::Union => {
            if read_switch(a) != read_switch(b) {
                return false;
            }
            match selected_alternative(a, descriptor) {
                Some(member) => {
                    let offset = member.padding();
                    equal(a.add(offset), b.add(offset), member.member_type())
                }
                // Unset, or the same invalid switch on both sides.
                None => true,
            }
        }
    }
}

unsafe fn member_equal(a: *const u8, b: *const u8, member: &MemberDescriptor) -> bool {
    let member_type = member.member_type();
    if member.is_array() {
        let (count_a, data_a) = read_array(a);
        let (count_b, data_b) = read_array(b);
        if count_a != count_b {
            return false;
        }
        if count_a == 0 {
            return data_a.is_null() == data_b.is_null();
        }
        let size = member_type.mem_size();
        (0..count_a).all(|index| {
            let offset = index * size;
            equal(data_a.add(offset), data_b.add(offset), member_type)
        })
    } else if member.is_optional() {
        let (value_a, value_b) = (read_pointer(a), read_pointer(b));
        match (value_a.is_null(), value_b.is_null()) {
            (true, true) => true,
            (false, false) => equal(value_a, value_b, member_type),
            _ => false,
        }
    } else {
        equal(a, b, member_type)
    }
}

unsafe fn bytes_equal(a: *const u8, b: *const u8, len: usize) -> bool {
    std::slice::from_raw_parts(a, len) == std::slice::from_raw_parts(b, len)
}

// =======================================================================
// Layout helpers
// =======================================================================

/// `(offset, member)` pairs of a structure.
fn struct_members(
    descriptor: &TypeDescriptor,
) -> impl Iterator<Item = (usize, &MemberDescriptor)> + '_ {
    descriptor.members().iter().scan(0, |end, member| {
        let offset = *end + member.padding();
        *end = offset + member.mem_size();
        Some((offset, member))
    })
}

unsafe fn read_switch(value: *const u8) -> u32 {
    ptr::read_unaligned(value.cast::<u32>())
}

/// Alternative selected by the switch field, `None` when unset or invalid.
unsafe fn selected_alternative<'a>(
    value: *const u8,
    descriptor: &'a TypeDescriptor,
) -> Option<&'a MemberDescriptor> {
    let switch = read_switch(value) as usize;
    if switch == 0 {
        return None;
    }
    let member = descriptor.members().get(switch - 1);
    if member.is_none() {
        log::warn!(
            "[memory] union `{}` has invalid switch {} ({} alternatives)",
            descriptor.name(),
            switch,
            descriptor.members().len()
        );
    }
    member
}

unsafe fn read_array(field: *const u8) -> (usize, *mut u8) {
    let count = ptr::read_unaligned(field.cast::<usize>());
    let data = read_pointer(field.add(size_of::<usize>()));
    (count, data)
}

unsafe fn write_array(field: *mut u8, count: usize, data: *mut u8) {
    ptr::write_unaligned(field.cast::<usize>(), count);
    write_pointer(field.add(size_of::<usize>()), data);
}

unsafe fn read_pointer(field: *const u8) -> *mut u8 {
    ptr::read_unaligned(field.cast::<*mut u8>())
}

unsafe fn write_pointer(field: *mut u8, value: *mut u8) {
    ptr::write_unaligned(field.cast::<*mut u8>(), value);
}
