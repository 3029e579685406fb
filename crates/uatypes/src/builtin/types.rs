// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native representations of the composite built-in types.

use crate::builder::{StructKind, TypeDescriptorBuilder};
use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::memory;
use crate::node_id::Guid;
use crate::registry::NativeType;
use crate::wrapper::OwnershipWrapper;
use std::fmt;
use std::ptr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// =======================================================================
// String / ByteString
// =======================================================================

/// Native UTF-8 string: a counted byte array.
///
/// A zero `length` with a null `data` pointer is the null string; a zero
/// `length` with the empty-array sentinel is the empty string.
#[repr(C)]
pub struct UaString {
    length: usize,
    data: *mut u8,
}

// SAFETY: the byte buffer is exclusively owned by the value.
unsafe impl Send for UaString {}
unsafe impl Sync for UaString {}

impl UaString {
    /// Owned copy of `s`.
    pub fn alloc(s: &str) -> Result<OwnershipWrapper<UaString>> {
        Self::from_bytes(s.as_bytes())
    }

    /// Owned copy of raw bytes (no UTF-8 check).
    pub fn from_bytes(bytes: &[u8]) -> Result<OwnershipWrapper<UaString>> {
        let data = memory::allocate_array(u8::descriptor(), bytes.len())?;
        if !bytes.is_empty() {
            // SAFETY: `data` holds `bytes.len()` freshly allocated bytes.
            unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), data, bytes.len()) };
        }
        let native = UaString {
            length: bytes.len(),
            data,
        };
        // SAFETY: the buffer was allocated by the memory engine for Byte.
        Ok(unsafe { OwnershipWrapper::adopt(native) })
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// No buffer, not even an empty one.
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.length == 0 || self.data.is_null() {
            return &[];
        }
        // SAFETY: `data` points to `length` initialised bytes owned by self.
        unsafe { std::slice::from_raw_parts(self.data, self.length) }
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl Default for UaString {
    fn default() -> Self {
        Self {
            length: 0,
            data: ptr::null_mut(),
        }
    }
}

impl fmt::Debug for UaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{:?}", self.to_string_lossy())
        }
    }
}

/// Native byte string; same layout as [`UaString`].
#[repr(transparent)]
#[derive(Default)]
pub struct UaByteString(UaString);

impl UaByteString {
    pub fn from_bytes(bytes: &[u8]) -> Result<OwnershipWrapper<UaByteString>> {
        let string = UaString::from_bytes(bytes)?.into_native();
        // SAFETY: same layout and allocation as the string just released.
        Ok(unsafe { OwnershipWrapper::adopt(UaByteString(string)) })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for UaByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{:02x?}", self.as_bytes())
        }
    }
}

pub(super) fn string_descriptor(
    builder: TypeDescriptorBuilder<UaString, StructKind>,
) -> TypeDescriptor {
    builder
        .add_array_field::<u8>("data", |s| &s.length, |s| &s.data)
        .build()
}

pub(super) fn byte_string_descriptor(
    builder: TypeDescriptorBuilder<UaByteString, StructKind>,
) -> TypeDescriptor {
    builder
        .add_array_field::<u8>("data", |s| &s.0.length, |s| &s.0.data)
        .build()
}

// =======================================================================
// DateTime / StatusCode / Guid
// =======================================================================

/// 100 nanosecond intervals between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Timestamp in 100 ns ticks since 1601-01-01 UTC.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UaDateTime(pub i64);

impl UaDateTime {
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Saturates outside the representable range.
    pub fn from_system_time(time: SystemTime) -> Self {
        let ticks = match time.duration_since(UNIX_EPOCH) {
            Ok(after) => duration_ticks(after).saturating_add(UNIX_EPOCH_TICKS),
            Err(before) => UNIX_EPOCH_TICKS.saturating_sub(duration_ticks(before.duration())),
        };
        Self(ticks)
    }

    pub fn to_system_time(self) -> SystemTime {
        let since_unix = self.0.saturating_sub(UNIX_EPOCH_TICKS);
        let ticks = since_unix.unsigned_abs();
        let per_second = TICKS_PER_SECOND as u64;
        let magnitude = Duration::new(ticks / per_second, ((ticks % per_second) * 100) as u32);
        if since_unix >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }
}

fn duration_ticks(d: Duration) -> i64 {
    i64::try_from(d.as_nanos() / 100).unwrap_or(i64::MAX)
}

/// Protocol status code. The two high bits carry the severity.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UaStatusCode(pub u32);

impl UaStatusCode {
    pub const GOOD: UaStatusCode = UaStatusCode(0);

    pub fn is_good(self) -> bool {
        self.0 >> 30 == 0
    }

    pub fn is_uncertain(self) -> bool {
        self.0 >> 30 == 1
    }

    pub fn is_bad(self) -> bool {
        self.0 >> 30 >= 2
    }
}

/// Native 16-byte Guid.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UaGuid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl From<Guid> for UaGuid {
    fn from(g: Guid) -> Self {
        Self {
            data1: g.data1,
            data2: g.data2,
            data3: g.data3,
            data4: g.data4,
        }
    }
}

impl From<UaGuid> for Guid {
    fn from(g: UaGuid) -> Self {
        Guid::new(g.data1, g.data2, g.data3, g.data4)
    }
}

// =======================================================================
// QualifiedName / LocalizedText
// =======================================================================

#[repr(C)]
#[derive(Debug, Default)]
pub struct UaQualifiedName {
    pub namespace_index: u16,
    pub name: UaString,
}

#[repr(C)]
#[derive(Debug, Default)]
pub struct UaLocalizedText {
    pub locale: UaString,
    pub text: UaString,
}

pub(super) fn qualified_name_descriptor(
    builder: TypeDescriptorBuilder<UaQualifiedName, StructKind>,
) -> TypeDescriptor {
    builder
        .add_field("namespaceIndex", |q| &q.namespace_index)
        .add_field("name", |q| &q.name)
        .build()
}

pub(super) fn localized_text_descriptor(
    builder: TypeDescriptorBuilder<UaLocalizedText, StructKind>,
) -> TypeDescriptor {
    builder
        .add_field("locale", |l| &l.locale)
        .add_field("text", |l| &l.text)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_alloc_and_read() {
        let s = UaString::alloc("hello").expect("alloc");
        assert_eq!(s.len(), 5);
        assert_eq!(s.as_bytes(), b"hello");
        assert_eq!(s.to_string_lossy(), "hello");
        assert!(!s.is_null());
    }

    #[test]
    fn test_empty_string_is_not_null() {
        let empty = UaString::alloc("").expect("alloc");
        assert!(empty.is_empty());
        assert!(!empty.is_null());

        let null = UaString::default();
        assert!(null.is_empty());
        assert!(null.is_null());
        assert_eq!(null.as_bytes(), b"");
    }

    #[test]
    fn test_byte_string() {
        let b = UaByteString::from_bytes(&[0xde, 0xad, 0xbe, 0xef]).expect("alloc");
        assert_eq!(b.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(format!("{:?}", *b), "[de, ad, be, ef]");
    }

    #[test]
    fn test_date_time_epochs() {
        assert_eq!(UaDateTime::from_system_time(UNIX_EPOCH).0, UNIX_EPOCH_TICKS);
        assert_eq!(
            UaDateTime::default().to_system_time(),
            UNIX_EPOCH - Duration::from_secs(11_644_473_600)
        );

        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_700);
        assert_eq!(UaDateTime::from_system_time(t).to_system_time(), t);
    }

    #[test]
    fn test_status_code_severity() {
        assert!(UaStatusCode::GOOD.is_good());
        assert!(UaStatusCode(0x4000_0000).is_uncertain());
        assert!(UaStatusCode(0x8000_0000).is_bad());
        assert!(!UaStatusCode(0x8000_0000).is_good());
    }

    #[test]
    fn test_guid_conversion() {
        let g = Guid::new(1, 2, 3, [4, 5, 6, 7, 8, 9, 10, 11]);
        let native = UaGuid::from(g);
        assert_eq!(native.data3, 3);
        assert_eq!(Guid::from(native), g);
        assert_eq!(std::mem::size_of::<UaGuid>(), 16);
    }
}
