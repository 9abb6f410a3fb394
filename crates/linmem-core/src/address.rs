//! Guest addresses and alignment arithmetic.

use std::fmt;

/// A byte offset into the guest's linear memory region.
///
/// Addresses are 32-bit, matching the guest's pointer width. Address `0`
/// is reserved as the null pointer and never refers to valid data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub u32);

impl Address {
    /// The reserved null address.
    pub const NULL: Address = Address(0);

    /// Whether this is the null address.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The raw offset as a `usize` index into the region.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `self + bytes`, or `None` if the result leaves the 32-bit address space.
    pub fn checked_add(self, bytes: u32) -> Option<Address> {
        self.0.checked_add(bytes).map(Address)
    }

    /// Round this address up to `alignment`.
    pub fn align_up(self, alignment: u32) -> Option<Address> {
        align_up(self.0, alignment).map(Address)
    }

    /// Whether this address is a multiple of `alignment`.
    pub fn is_aligned(self, alignment: u32) -> bool {
        alignment != 0 && self.0 % alignment == 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for Address {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<Address> for u32 {
    fn from(a: Address) -> Self {
        a.0
    }
}

/// Round `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two. Returns `None` when the rounded
/// value does not fit in 32 bits.
pub fn align_up(value: u32, alignment: u32) -> Option<u32> {
    debug_assert!(alignment.is_power_of_two());
    let mask = alignment - 1;
    value.checked_add(mask).map(|v| v & !mask)
}
