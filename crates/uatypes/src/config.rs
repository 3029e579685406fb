// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout constants - Single Source of Truth
//!
//! Every limit of the descriptor format and every convention of the native
//! binary layout lives here. **NEVER hardcode elsewhere!**
//!
//! The type layer performs no I/O, so there is no runtime configuration file:
//! the values below are fixed by the binary convention shared with the external
//! codec.

use std::mem::size_of;
use std::ptr::NonNull;

// =======================================================================
// Descriptor Format Limits
// =======================================================================

/// Maximum number of members of one descriptor (8-bit member count).
pub const MAX_MEMBERS: usize = u8::MAX as usize;

/// Maximum padding before a member (8-bit padding field).
///
/// For union alternatives the padding holds the payload offset, so the
/// payload of a union must also start within the first 255 bytes.
pub const MAX_PADDING: usize = u8::MAX as usize;

/// Maximum memory size of a described type (16-bit `mem_size`).
pub const MAX_MEM_SIZE: usize = u16::MAX as usize;

// =======================================================================
// Native Layout Conventions
// =======================================================================

/// Alignment of every heap block handed out by the memory engine.
///
/// Matches the fundamental alignment of `malloc` so that any descriptor can be
/// allocated without knowing the alignment of its native type.
pub const ALLOC_ALIGN: usize = 16;

/// Size of the union switch field (`u32` at offset 0).
pub const UNION_SWITCH_SIZE: usize = size_of::<u32>();

/// Size of a pointer member (optional fields).
pub const POINTER_SIZE: usize = size_of::<*mut u8>();

/// Size of a counted array member: `usize` count followed by the data pointer.
pub const ARRAY_MEMBER_SIZE: usize = size_of::<usize>() + POINTER_SIZE;

/// Pointer stored for "present but empty" arrays.
///
/// Never dereferenced and never freed: arrays with a zero count own no
/// allocation. A null pointer with a zero count means "absent".
#[inline]
pub fn empty_array_sentinel() -> *mut u8 {
    NonNull::<u8>::dangling().as_ptr()
}

// =======================================================================
// Namespace 0 Identifiers
// =======================================================================

/// Namespace index of the standard types.
pub const NS0: u16 = 0;

/// Numeric identifiers of the built-in types in namespace 0.
pub mod ns0 {
    pub const BOOLEAN: u32 = 1;
    pub const SBYTE: u32 = 2;
    pub const BYTE: u32 = 3;
    pub const INT16: u32 = 4;
    pub const UINT16: u32 = 5;
    pub const INT32: u32 = 6;
    pub const UINT32: u32 = 7;
    pub const INT64: u32 = 8;
    pub const UINT64: u32 = 9;
    pub const FLOAT: u32 = 10;
    pub const DOUBLE: u32 = 11;
    pub const STRING: u32 = 12;
    pub const DATE_TIME: u32 = 13;
    pub const GUID: u32 = 14;
    pub const BYTE_STRING: u32 = 15;
    pub const STATUS_CODE: u32 = 19;
    pub const QUALIFIED_NAME: u32 = 20;
    pub const LOCALIZED_TEXT: u32 = 21;
}

/// Integers are encoded little endian on the wire.
pub const INTEGER_OVERLAYABLE: bool = cfg!(target_endian = "little");

/// Floats are IEEE 754 little endian on the wire.
pub const FLOAT_OVERLAYABLE: bool = cfg!(target_endian = "little");
