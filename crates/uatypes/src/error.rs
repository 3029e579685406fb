// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type for the runtime failures of the type layer.
//!
//! Only resource failures and runtime type-tag mismatches are reported through
//! [`Error`]. Misuse of the descriptor builder or of the ownership wrappers is a
//! bug in the type definition and panics instead.

use crate::node_id::NodeId;
use std::alloc::Layout;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime errors raised by allocation, conversion and registration.
///
/// # Example
///
/// ```rust
/// use uatypes::{Error, UaString};
///
/// match UaString::alloc("hello") {
///     Ok(s) => assert_eq!(s.as_bytes(), b"hello"),
///     Err(Error::OutOfMemory(layout)) => eprintln!("{} bytes unavailable", layout.size()),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// The allocator returned null for the given layout.
    OutOfMemory(Layout),
    /// `mem_size * count` does not fit in a valid allocation layout.
    CapacityOverflow,

    // ========================================================================
    // Type Errors
    // ========================================================================
    /// The runtime type tag of a value disagrees with the expected descriptor.
    TypeMismatch {
        /// Name of the statically expected descriptor.
        expected: String,
        /// Name of the descriptor carried by the value.
        actual: String,
    },
    /// The variant holds no value.
    EmptyVariant,
    /// A scalar was requested but the variant holds an array.
    NotScalar,
    /// An array was requested but the variant holds a scalar.
    NotArray,

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// A different descriptor is already registered under this type id.
    DuplicateTypeId(NodeId),
    /// Textual node id could not be parsed.
    InvalidNodeId(String),
}

impl Error {
    /// True for allocation failures (`OutOfMemory`, `CapacityOverflow`).
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Error::OutOfMemory(_) | Error::CapacityOverflow)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Resource
            Error::OutOfMemory(layout) => write!(
                f,
                "Out of memory allocating {} bytes (align {})",
                layout.size(),
                layout.align()
            ),
            Error::CapacityOverflow => write!(f, "Capacity overflow"),
            // Type
            Error::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, actual)
            }
            Error::EmptyVariant => write!(f, "Variant is empty"),
            Error::NotScalar => write!(f, "Variant does not hold a scalar"),
            Error::NotArray => write!(f, "Variant does not hold an array"),
            // Registry
            Error::DuplicateTypeId(id) => {
                write!(f, "Another descriptor is registered for type id {}", id)
            }
            Error::InvalidNodeId(text) => write!(f, "Invalid node id: {}", text),
        }
    }
}

impl std::error::Error for Error {}
