// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Chained collections of custom descriptors handed to an external codec.

use crate::descriptor::TypeDescriptor;
use crate::node_id::NodeId;
use std::sync::Arc;

/// Ordered set of custom descriptors, optionally chained to another set.
///
/// Lookups search this array first and then follow `next`, so an application
/// can layer its own types over a shared base set.
#[derive(Debug, Clone, Default)]
pub struct DataTypeArray {
    types: Vec<&'static TypeDescriptor>,
    next: Option<Arc<DataTypeArray>>,
}

impl DataTypeArray {
    pub fn new(types: impl IntoIterator<Item = &'static TypeDescriptor>) -> Self {
        Self {
            types: types.into_iter().collect(),
            next: None,
        }
    }

    /// Chain `next` behind this array.
    pub fn with_next(mut self, next: Arc<DataTypeArray>) -> Self {
        self.next = Some(next);
        self
    }

    pub fn next(&self) -> Option<&DataTypeArray> {
        self.next.as_deref()
    }

    /// Number of descriptors in this array (excluding the chain).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Descriptors of this array (excluding the chain).
    pub fn types(&self) -> &[&'static TypeDescriptor] {
        &self.types
    }

    /// Every descriptor, following the chain.
    pub fn iter(&self) -> impl Iterator<Item = &'static TypeDescriptor> + '_ {
        let mut current = Some(self);
        std::iter::from_fn(move || {
            let array = current?;
            current = array.next();
            Some(array.types.iter().copied())
        })
        .flatten()
    }

    /// Descriptor by type id, first match along the chain.
    pub fn find(&self, type_id: &NodeId) -> Option<&'static TypeDescriptor> {
        self.iter().find(|d| d.type_id() == type_id)
    }

    /// Descriptor by binary encoding id, first match along the chain.
    pub fn find_by_encoding_id(&self, encoding_id: &NodeId) -> Option<&'static TypeDescriptor> {
        self.iter().find(|d| d.binary_encoding_id() == encoding_id)
    }
}
