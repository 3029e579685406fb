// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout metadata of one member of a described type.

use super::TypeDescriptor;
use crate::config::{ARRAY_MEMBER_SIZE, POINTER_SIZE};
use std::fmt;

/// One field of a [`TypeDescriptor`].
///
/// `padding` is the number of bytes between the end of the previous member and
/// this one. For union alternatives it instead holds the offset of the shared
/// payload, identical for every alternative of the union.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: Option<String>,
    member_type: &'static TypeDescriptor,
    padding: u8,
    is_array: bool,
    is_optional: bool,
}

impl MemberDescriptor {
    /// Create a member descriptor from raw fields.
    pub fn new(
        name: Option<&str>,
        member_type: &'static TypeDescriptor,
        padding: u8,
        is_array: bool,
        is_optional: bool,
    ) -> Self {
        Self {
            name: name.map(str::to_owned),
            member_type,
            padding,
            is_array,
            is_optional,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn member_type(&self) -> &'static TypeDescriptor {
        self.member_type
    }

    pub fn padding(&self) -> usize {
        self.padding as usize
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    /// Bytes this member occupies inside the containing value.
    ///
    /// Counted arrays store `(usize, *mut T)`, optional members a single
    /// pointer, plain members the value itself.
    pub fn mem_size(&self) -> usize {
        if self.is_array {
            ARRAY_MEMBER_SIZE
        } else if self.is_optional {
            POINTER_SIZE
        } else {
            self.member_type.mem_size()
        }
    }

    pub(crate) fn set_padding(&mut self, padding: u8) {
        self.padding = padding;
    }
}

impl PartialEq for MemberDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.padding == other.padding
            && self.is_array == other.is_array
            && self.is_optional == other.is_optional
            && (std::ptr::eq(self.member_type, other.member_type)
                || self.member_type == other.member_type)
    }
}

impl Eq for MemberDescriptor {}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("member_type", &self.member_type.name())
            .field("padding", &self.padding)
            .field("is_array", &self.is_array)
            .field("is_optional", &self.is_optional)
            .finish()
    }
}
