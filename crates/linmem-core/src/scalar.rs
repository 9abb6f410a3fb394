//! Scalar kinds, their guest layout rules, and the [`Scalar`] codec trait.
//!
//! The guest compiler pads every scalar to a fixed alignment before
//! storing it. The table below is the single source of truth for those
//! rules; the cursor and the shape engine both read it from here.
//!
//! | Kind | Storage | Alignment | Stride |
//! |------|---------|-----------|--------|
//! | `bool` | 1 | 1 | 1 |
//! | `int8`, `uint8` | 1 | 4 | 4 |
//! | `int32`, `uint32`, `float32` | 4 | 4 | 4 |
//! | `int64`, `uint64`, `float64` | 8 | 8 | 8 |
//!
//! 8-bit integers occupy a full 4-byte slot: the guest promotes them to
//! `int` when passing variadic arguments and packs record fields the
//! same way.

use std::fmt;
use std::str::FromStr;

use crate::error::ShapeError;

/// The closed set of scalar types the guest stores in linear memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// One-byte boolean (`0` or `1`).
    Bool,
    /// Signed 8-bit integer (`char`).
    Int8,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Signed 32-bit integer (`int`, enums).
    Int32,
    /// Unsigned 32-bit integer (pointers, `size_t`).
    Uint32,
    /// IEEE-754 single precision.
    Float32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    Uint64,
    /// IEEE-754 double precision.
    Float64,
}

impl ScalarKind {
    /// Every scalar kind, in declaration order.
    pub const ALL: [ScalarKind; 9] = [
        Self::Bool,
        Self::Int8,
        Self::Uint8,
        Self::Int32,
        Self::Uint32,
        Self::Float32,
        Self::Int64,
        Self::Uint64,
        Self::Float64,
    ];

    /// Required alignment in bytes.
    pub fn alignment(self) -> u32 {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::Uint8 | Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    /// Number of bytes actually read or written for a value of this kind.
    pub fn storage_size(self) -> u32 {
        match self {
            Self::Bool | Self::Int8 | Self::Uint8 => 1,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    /// Number of bytes a sequential walk advances past a value of this kind.
    pub fn stride(self) -> u32 {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::Uint8 | Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    /// Canonical tag name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float64 => "float64",
        }
    }

    /// Resolve a textual type tag, including the C spellings the guest
    /// headers use (`char`, `int`, `enum`, `size_t`, `ptr`, `float`, `double`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "bool" => Self::Bool,
            "char" | "int8" => Self::Int8,
            "uint8" => Self::Uint8,
            "int" | "enum" | "int32" => Self::Int32,
            "uint32" | "size_t" | "ptr" => Self::Uint32,
            "float" | "float32" => Self::Float32,
            "int64" => Self::Int64,
            "uint64" => Self::Uint64,
            "double" | "float64" => Self::Float64,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| ShapeError::UnknownType { tag: s.to_string() })
    }
}

/// A dynamically typed scalar read from or written to the region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// A `bool`.
    Bool(bool),
    /// An `int8`.
    Int8(i8),
    /// A `uint8`.
    Uint8(u8),
    /// An `int32`.
    Int32(i32),
    /// A `uint32`.
    Uint32(u32),
    /// A `float32`.
    Float32(f32),
    /// An `int64`.
    Int64(i64),
    /// A `uint64`.
    Uint64(u64),
    /// A `float64`.
    Float64(f64),
}

impl Value {
    /// The scalar kind carried by this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int8(_) => ScalarKind::Int8,
            Self::Uint8(_) => ScalarKind::Uint8,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Uint32(_) => ScalarKind::Uint32,
            Self::Float32(_) => ScalarKind::Float32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::Uint64(_) => ScalarKind::Uint64,
            Self::Float64(_) => ScalarKind::Float64,
        }
    }

    /// Encode into little-endian bytes; `out` must be `storage_size` long.
    pub fn encode_le(&self, out: &mut [u8]) {
        match *self {
            Self::Bool(v) => v.encode_le(out),
            Self::Int8(v) => v.encode_le(out),
            Self::Uint8(v) => v.encode_le(out),
            Self::Int32(v) => v.encode_le(out),
            Self::Uint32(v) => v.encode_le(out),
            Self::Float32(v) => v.encode_le(out),
            Self::Int64(v) => v.encode_le(out),
            Self::Uint64(v) => v.encode_le(out),
            Self::Float64(v) => v.encode_le(out),
        }
    }

    /// Decode a value of `kind` from little-endian bytes.
    pub fn decode_le(kind: ScalarKind, bytes: &[u8]) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool(bool::decode_le(bytes)),
            ScalarKind::Int8 => Self::Int8(i8::decode_le(bytes)),
            ScalarKind::Uint8 => Self::Uint8(u8::decode_le(bytes)),
            ScalarKind::Int32 => Self::Int32(i32::decode_le(bytes)),
            ScalarKind::Uint32 => Self::Uint32(u32::decode_le(bytes)),
            ScalarKind::Float32 => Self::Float32(f32::decode_le(bytes)),
            ScalarKind::Int64 => Self::Int64(i64::decode_le(bytes)),
            ScalarKind::Uint64 => Self::Uint64(u64::decode_le(bytes)),
            ScalarKind::Float64 => Self::Float64(f64::decode_le(bytes)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
        }
    }
}

/// A Rust type with a fixed little-endian encoding in guest memory.
///
/// `decode_le` and `encode_le` operate on exactly
/// `Self::KIND.storage_size()` bytes.
pub trait Scalar: Copy {
    /// The guest kind this type maps to.
    const KIND: ScalarKind;

    /// Decode from little-endian bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len()` differs from the kind's storage size.
    fn decode_le(bytes: &[u8]) -> Self;

    /// Encode into little-endian bytes.
    ///
    /// # Panics
    ///
    /// Panics if `out.len()` differs from the kind's storage size.
    fn encode_le(self, out: &mut [u8]);

    /// Wrap into a dynamically typed [`Value`].
    fn into_value(self) -> Value;

    /// Unwrap from a [`Value`] of the same kind.
    fn from_value(value: Value) -> Option<Self>;
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn decode_le(bytes: &[u8]) -> Self {
        bytes[0] == 1
    }

    fn encode_le(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, $n:literal) => {
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            fn decode_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; $n];
                buf.copy_from_slice(bytes);
                <$ty>::from_le_bytes(buf)
            }

            fn encode_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn into_value(self) -> Value {
                Value::$kind(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar!(i8, Int8, 1);
impl_scalar!(u8, Uint8, 1);
impl_scalar!(i32, Int32, 4);
impl_scalar!(u32, Uint32, 4);
impl_scalar!(f32, Float32, 4);
impl_scalar!(i64, Int64, 8);
impl_scalar!(u64, Uint64, 8);
impl_scalar!(f64, Float64, 8);
