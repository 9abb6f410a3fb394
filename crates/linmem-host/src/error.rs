//! Errors raised at the host/guest boundary.

use std::error::Error;
use std::fmt;

use linmem_core::{FormatError, MemoryError};

use crate::import::ImportValue;

/// A failed guest import call.
///
/// Every variant aborts the guest's current interpretation; none is
/// translated into a sentinel return value.
#[derive(Clone, Debug, PartialEq)]
pub enum HostError {
    /// A memory access or allocator contract violation.
    Memory(MemoryError),
    /// A format string the interpreter cannot render.
    Format(FormatError),
    /// The guest called an import the host does not provide.
    Unimplemented {
        /// Import name as the guest spelled it.
        name: String,
        /// Arguments the guest passed.
        args: Vec<ImportValue>,
    },
    /// A known import called with the wrong number or types of arguments.
    BadArguments {
        /// Import name.
        name: &'static str,
        /// What was wrong.
        reason: String,
    },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(e) => write!(f, "memory: {e}"),
            Self::Format(e) => write!(f, "format: {e}"),
            Self::Unimplemented { name, args } => {
                write!(f, "unimplemented import '{name}' called with (")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::BadArguments { name, reason } => {
                write!(f, "bad arguments to '{name}': {reason}")
            }
        }
    }
}

impl Error for HostError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Memory(e) => Some(e),
            Self::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MemoryError> for HostError {
    fn from(e: MemoryError) -> Self {
        Self::Memory(e)
    }
}

impl From<FormatError> for HostError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

/// A failed submission of source text.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitError {
    /// The encoded source does not fit the staging buffer. Nothing was
    /// written and the guest was not invoked.
    SourceTooLarge {
        /// Encoded length in bytes.
        len: usize,
        /// Staging capacity in bytes.
        capacity: u32,
    },
    /// The guest trapped on a host error during interpretation.
    Guest(HostError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceTooLarge { len, capacity } => write!(
                f,
                "source of {len} bytes exceeds the {capacity}-byte staging buffer"
            ),
            Self::Guest(e) => write!(f, "guest: {e}"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Guest(e) => Some(e),
            Self::SourceTooLarge { .. } => None,
        }
    }
}

impl From<HostError> for SubmitError {
    fn from(e: HostError) -> Self {
        Self::Guest(e)
    }
}
