//! Readers for guest strings.
//!
//! The guest hands text to the host in three forms: a null-terminated
//! `char*`, a pointer plus an explicit length, and a two-word string
//! view record (`{ const char *data; size_t len; }`). All three decode to
//! a [`DecodedString`] snapshot. Invalid UTF-8 is replaced with U+FFFD
//! rather than rejected, matching what a text decoder on the other side
//! of the boundary would show.

use std::fmt;

use linmem_core::{Address, MemoryError};

use crate::region::Region;

/// An immutable copy of a byte string read from the region.
///
/// Holds no reference to the region; later guest writes do not affect it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedString {
    bytes: Vec<u8>,
    ptr: Address,
    len: u32,
    text: String,
}

impl DecodedString {
    /// The empty string read from `ptr`.
    pub fn empty(ptr: Address) -> Self {
        Self {
            bytes: Vec::new(),
            ptr,
            len: 0,
            text: String::new(),
        }
    }

    fn from_bytes(ptr: Address, bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            ptr,
            len: bytes.len() as u32,
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// The raw bytes, excluding any terminator.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Where the string was read from.
    pub fn ptr(&self) -> Address {
        self.ptr
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the string has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The decoded text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the decoded text.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for DecodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Read bytes from `address` up to (not including) the first zero byte.
///
/// A null address yields the empty string. Reaching the end of the
/// region first is [`MemoryError::Unterminated`].
pub fn read_null_terminated(region: &Region, address: Address) -> Result<DecodedString, MemoryError> {
    if address.is_null() {
        return Ok(DecodedString::empty(address));
    }
    let tail = region.tail(address)?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(MemoryError::Unterminated { address })?;
    Ok(DecodedString::from_bytes(address, &tail[..len]))
}

/// Read exactly `len` bytes from `address`.
///
/// A null address or a zero length yields the empty string.
pub fn read_fixed(region: &Region, address: Address, len: u32) -> Result<DecodedString, MemoryError> {
    if address.is_null() || len == 0 {
        return Ok(DecodedString::empty(address));
    }
    let bytes = region.bytes(address, len)?;
    Ok(DecodedString::from_bytes(address, bytes))
}

/// Read a string view record at `address`: a data pointer followed by a
/// `uint32` byte count.
///
/// A null record address yields the empty string.
pub fn read_length_prefixed(region: &Region, address: Address) -> Result<DecodedString, MemoryError> {
    if address.is_null() {
        return Ok(DecodedString::empty(address));
    }
    let data = Address(region.get::<u32>(address)?);
    let len_at = address.checked_add(4).ok_or(MemoryError::OutOfBounds {
        address,
        len: 8,
        capacity: region.capacity(),
    })?;
    let len = region.get::<u32>(len_at)?;
    read_fixed(region, data, len)
}
