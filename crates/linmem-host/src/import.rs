//! The guest's import surface.
//!
//! The guest module is linked against six host functions under the
//! `env` namespace. [`Import`] names them; [`ImportValue`] carries the
//! wasm-level argument and return values through
//! [`BridgeContext::dispatch`](crate::BridgeContext::dispatch).

use std::fmt;

use linmem_core::Address;

/// A host function the guest may call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Import {
    /// `web_malloc(size) -> ptr`
    Malloc,
    /// `web_mfree(ptr)`
    Free,
    /// `web_mrealloc(ptr, size) -> ptr`
    Realloc,
    /// `web_parse_number(ptr, len) -> f64`
    ParseNumber,
    /// `web_printf(fmt, args)`
    Printf,
    /// `web_printfn(fmt, args)`
    PrintfLine,
}

impl Import {
    /// Every import, in link order.
    pub const ALL: [Import; 6] = [
        Self::Malloc,
        Self::Free,
        Self::Realloc,
        Self::ParseNumber,
        Self::Printf,
        Self::PrintfLine,
    ];

    /// Symbol name in the guest's import table.
    pub fn name(self) -> &'static str {
        match self {
            Self::Malloc => "web_malloc",
            Self::Free => "web_mfree",
            Self::Realloc => "web_mrealloc",
            Self::ParseNumber => "web_parse_number",
            Self::Printf => "web_printf",
            Self::PrintfLine => "web_printfn",
        }
    }

    /// Resolve a symbol name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.name() == name)
    }

    /// Number of arguments the import takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Malloc | Self::Free => 1,
            Self::Realloc | Self::ParseNumber | Self::Printf | Self::PrintfLine => 2,
        }
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A wasm value crossing the import boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImportValue {
    /// `i32`; pointers and sizes travel as this.
    I32(i32),
    /// `i64`
    I64(i64),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
}

impl ImportValue {
    /// A pointer argument or result.
    pub fn ptr(address: Address) -> Self {
        Self::I32(address.0 as i32)
    }

    /// Reinterpret an `i32` as an unsigned 32-bit value.
    pub fn as_u32(self) -> Option<u32> {
        match self {
            Self::I32(v) => Some(v as u32),
            _ => None,
        }
    }

    /// Reinterpret an `i32` as an address.
    pub fn as_address(self) -> Option<Address> {
        self.as_u32().map(Address)
    }

    /// The `f64` payload, if any.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ImportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "i32 {v}"),
            Self::I64(v) => write!(f, "i64 {v}"),
            Self::F32(v) => write!(f, "f32 {v}"),
            Self::F64(v) => write!(f, "f64 {v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_both_ways() {
        for import in Import::ALL {
            assert_eq!(Import::from_name(import.name()), Some(import));
        }
        assert_eq!(Import::from_name("web_fopen"), None);
    }

    #[test]
    fn pointers_round_trip_through_i32() {
        let high = Address(0xFFFF_FFF8);
        assert_eq!(ImportValue::ptr(high).as_address(), Some(high));
        assert_eq!(ImportValue::F64(1.0).as_address(), None);
    }
}
