//! Error types shared across the bridge.
//!
//! Organised by failure class: memory access and allocation
//! ([`MemoryError`]), shape construction ([`ShapeError`]), and format
//! rendering ([`FormatError`]). Only [`MemoryError::OutOfMemory`] is
//! meant to be recovered from; everything else signals a contract
//! violation between host and guest.

use std::error::Error;
use std::fmt;

use crate::address::Address;
use crate::scalar::ScalarKind;

/// Errors from reading, writing, or allocating guest memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryError {
    /// An access through the null address.
    NullAccess {
        /// What was being accessed (e.g. `"uint32"`, `"cursor"`).
        what: &'static str,
    },
    /// An access that runs past the end of the region.
    OutOfBounds {
        /// Start of the access.
        address: Address,
        /// Number of bytes requested.
        len: u32,
        /// Current region capacity in bytes.
        capacity: usize,
    },
    /// A null-terminated scan reached the end of the region.
    Unterminated {
        /// Where the scan started.
        address: Address,
    },
    /// Reallocation of an address this allocator never handed out.
    IllegalPointer {
        /// The offending address.
        address: Address,
    },
    /// The region could not grow to satisfy an allocation.
    OutOfMemory {
        /// Rounded size of the request in bytes.
        requested: u32,
        /// Region capacity at the time of failure.
        capacity: usize,
    },
    /// The region refused to grow past its page limit.
    GrowthFailed {
        /// Pages the region would have needed in total.
        requested_pages: u64,
        /// The configured page ceiling.
        max_pages: u32,
    },
    /// A value of the wrong kind was written to or read from a typed slot.
    TypeMismatch {
        /// Kind of the slot.
        expected: ScalarKind,
        /// Kind supplied by the caller.
        found: ScalarKind,
    },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullAccess { what } => {
                write!(f, "null access: attempted to access {what} through address 0")
            }
            Self::OutOfBounds {
                address,
                len,
                capacity,
            } => write!(
                f,
                "out of bounds: {len} bytes at {address} exceeds region of {capacity} bytes"
            ),
            Self::Unterminated { address } => {
                write!(f, "string at {address} never hit a terminator")
            }
            Self::IllegalPointer { address } => write!(
                f,
                "illegal pointer: {address} was not allocated by this allocator"
            ),
            Self::OutOfMemory {
                requested,
                capacity,
            } => write!(
                f,
                "out of memory: cannot allocate {requested} bytes (region is {capacity} bytes)"
            ),
            Self::GrowthFailed {
                requested_pages,
                max_pages,
            } => write!(
                f,
                "region growth failed: {requested_pages} pages requested, limit is {max_pages}"
            ),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: slot holds {expected}, got {found}")
            }
        }
    }
}

impl Error for MemoryError {}

/// Errors detected while building a shape description.
///
/// These are programming errors in the host: they surface when a shape
/// is constructed, never when a view is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// A type tag that names no known scalar kind.
    UnknownType {
        /// The unrecognised tag.
        tag: String,
    },
    /// A field named `ptr` or `sizeof`, which collide with view accessors.
    ReservedName {
        /// The reserved name.
        name: String,
    },
    /// Two fields at the same level share a name.
    DuplicateField {
        /// The repeated name.
        name: String,
    },
    /// A shape (or nested shape) with no fields.
    EmptyShape,
    /// A view lookup for a field that does not exist.
    NoSuchField {
        /// Dotted path that failed to resolve.
        path: String,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { tag } => write!(f, "unknown field type '{tag}'"),
            Self::ReservedName { name } => write!(
                f,
                "field name '{name}' conflicts with a view accessor"
            ),
            Self::DuplicateField { name } => write!(f, "duplicate field '{name}'"),
            Self::EmptyShape => write!(f, "shape has no fields"),
            Self::NoSuchField { path } => write!(f, "no field at path '{path}'"),
        }
    }
}

impl Error for ShapeError {}

/// Errors from rendering a guest format string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// A conversion specifier the interpreter does not implement.
    Unsupported {
        /// The offending text, starting at `%`.
        specifier: String,
    },
    /// `%.*` followed by something other than `s`.
    PrecisionRequiresString {
        /// The offending text.
        specifier: String,
    },
    /// `%.<digits>` followed by something other than `f`.
    PrecisionRequiresFloat {
        /// The offending text.
        specifier: String,
    },
    /// `%.<digits>f` asking for more fractional digits than the
    /// renderer supports.
    PrecisionOutOfRange {
        /// The offending text.
        specifier: String,
        /// Largest accepted digit count.
        max: usize,
    },
    /// Reading the format string or an argument failed.
    Memory(MemoryError),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { specifier } => {
                write!(f, "unsupported flag/format: {specifier}")
            }
            Self::PrecisionRequiresString { specifier } => write!(
                f,
                "variable precision is only allowed for strings: {specifier}"
            ),
            Self::PrecisionRequiresFloat { specifier } => write!(
                f,
                "fixed precision is only allowed for floats: {specifier}"
            ),
            Self::PrecisionOutOfRange { specifier, max } => write!(
                f,
                "precision must be between 0 and {max}: {specifier}"
            ),
            Self::Memory(e) => write!(f, "memory: {e}"),
        }
    }
}

impl Error for FormatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Memory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MemoryError> for FormatError {
    fn from(e: MemoryError) -> Self {
        Self::Memory(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_names_specifier() {
        let err = FormatError::Unsupported {
            specifier: "%x".into(),
        };
        assert!(err.to_string().contains("%x"));
    }

    #[test]
    fn precision_out_of_range_names_limit() {
        let err = FormatError::PrecisionOutOfRange {
            specifier: "%.101f".into(),
            max: 100,
        };
        let text = err.to_string();
        assert!(text.contains("%.101f"));
        assert!(text.contains("100"));
    }

    #[test]
    fn format_error_chains_memory_source() {
        let err = FormatError::from(MemoryError::NullAccess { what: "cursor" });
        assert!(err.source().is_some());
    }

    #[test]
    fn illegal_pointer_mentions_address() {
        let err = MemoryError::IllegalPointer {
            address: Address(0x40),
        };
        assert!(err.to_string().contains("0x00000040"));
    }
}
