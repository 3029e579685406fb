// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protocol identifiers (`NodeId`) used as type ids and encoding ids.
//!
//! Only the identity part of a node id is modelled: a namespace index and one
//! of the four identifier kinds. The textual form follows the usual
//! `ns=<index>;<kind>=<value>` notation, with the namespace omitted for
//! namespace 0.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use std::str::FromStr;

/// 128-bit globally unique identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNodeId(s.to_string());
        let parts: Vec<&str> = s.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if parts.len() != lengths.len()
            || parts
                .iter()
                .zip(lengths)
                .any(|(part, len)| part.len() != len || !part.is_ascii())
        {
            return Err(invalid());
        }

        let data1 = u32::from_str_radix(parts[0], 16).map_err(|_| invalid())?;
        let data2 = u16::from_str_radix(parts[1], 16).map_err(|_| invalid())?;
        let data3 = u16::from_str_radix(parts[2], 16).map_err(|_| invalid())?;
        let tail = format!("{}{}", parts[3], parts[4]);
        let mut data4 = [0u8; 8];
        for (i, byte) in data4.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&tail[2 * i..2 * i + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self::new(data1, data2, data3, data4))
    }
}

/// Identifier part of a [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(u32),
    String(String),
    Guid(Guid),
    Opaque(Vec<u8>),
}

impl Default for Identifier {
    fn default() -> Self {
        Identifier::Numeric(0)
    }
}

/// Namespace index plus identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeId {
    namespace_index: u16,
    identifier: Identifier,
}

impl NodeId {
    pub fn new(namespace_index: u16, identifier: Identifier) -> Self {
        Self {
            namespace_index,
            identifier,
        }
    }

    pub const fn numeric(namespace_index: u16, id: u32) -> Self {
        Self {
            namespace_index,
            identifier: Identifier::Numeric(id),
        }
    }

    pub fn string(namespace_index: u16, id: impl Into<String>) -> Self {
        Self::new(namespace_index, Identifier::String(id.into()))
    }

    pub fn guid(namespace_index: u16, id: Guid) -> Self {
        Self::new(namespace_index, Identifier::Guid(id))
    }

    pub fn opaque(namespace_index: u16, id: impl Into<Vec<u8>>) -> Self {
        Self::new(namespace_index, Identifier::Opaque(id.into()))
    }

    pub fn namespace_index(&self) -> u16 {
        self.namespace_index
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Numeric identifier, if this is a numeric node id.
    pub fn as_numeric(&self) -> Option<u32> {
        match self.identifier {
            Identifier::Numeric(id) => Some(id),
            _ => None,
        }
    }

    /// `ns=0;i=0`, the id of "no type".
    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && self.identifier == Identifier::Numeric(0)
    }
}

impl From<(u16, u32)> for NodeId {
    fn from((namespace_index, id): (u16, u32)) -> Self {
        Self::numeric(namespace_index, id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index != 0 {
            write!(f, "ns={};", self.namespace_index)?;
        }
        match &self.identifier {
            Identifier::Numeric(id) => write!(f, "i={}", id),
            Identifier::String(id) => write!(f, "s={}", id),
            Identifier::Guid(id) => write!(f, "g={}", id),
            Identifier::Opaque(id) => write!(f, "b={}", STANDARD.encode(id)),
        }
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNodeId(s.to_string());

        let (namespace_index, rest) = match s.strip_prefix("ns=") {
            Some(tail) => {
                let (ns, rest) = tail.split_once(';').ok_or_else(invalid)?;
                (ns.parse::<u16>().map_err(|_| invalid())?, rest)
            }
            None => (0, s),
        };

        let (kind, value) = rest.split_once('=').ok_or_else(invalid)?;
        let identifier = match kind {
            "i" => Identifier::Numeric(value.parse().map_err(|_| invalid())?),
            "s" => Identifier::String(value.to_string()),
            "g" => Identifier::Guid(value.parse().map_err(|_| invalid())?),
            "b" => Identifier::Opaque(STANDARD.decode(value).map_err(|_| invalid())?),
            _ => return Err(invalid()),
        };
        Ok(Self::new(namespace_index, identifier))
    }
}
