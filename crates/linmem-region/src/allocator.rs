//! Bump allocation with block tracking.
//!
//! [`BlockAllocator`] hands out addresses by advancing a high-water mark
//! over the [`Region`]. Every outstanding allocation is recorded as a
//! `base → size` entry so that `reallocate` knows how many bytes to
//! carry over. Space is never reclaimed: `release` only drops the
//! record, and `reallocate` always moves the block to fresh space.

use indexmap::IndexMap;
use linmem_core::{align_up, Address, MemoryError};

use crate::region::Region;

/// A rewind target captured with [`BlockAllocator::save_point`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavePoint(Address);

impl SavePoint {
    /// The high-water mark at capture time.
    pub fn address(&self) -> Address {
        self.0
    }
}

/// Bump allocator over a [`Region`].
///
/// Addresses are multiples of the configured alignment and sizes are
/// rounded up to it. The allocator holds no reference to the region; each
/// operation borrows it, so one region can be shared with cursors and
/// views between calls.
#[derive(Clone, Debug)]
pub struct BlockAllocator {
    /// Next address to hand out.
    next: u32,
    alignment: u32,
    /// Outstanding blocks, keyed by base address.
    blocks: IndexMap<Address, u32>,
}

impl BlockAllocator {
    /// Create an allocator whose first block starts at `heap_base`
    /// (rounded up to `alignment`).
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two.
    pub fn new(heap_base: Address, alignment: u32) -> Self {
        assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        let next = align_up(heap_base.0, alignment).unwrap_or(u32::MAX & !(alignment - 1));
        Self {
            next,
            alignment,
            blocks: IndexMap::new(),
        }
    }

    /// Allocation granularity in bytes.
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// The next address a non-empty allocation would receive.
    pub fn high_water(&self) -> Address {
        Address(self.next)
    }

    /// Allocate `bytes` bytes, growing the region if required.
    ///
    /// Returns [`MemoryError::OutOfMemory`] if the region cannot grow far
    /// enough; in that case neither the region nor the allocator changes.
    pub fn try_allocate(&mut self, region: &mut Region, bytes: u32) -> Result<Address, MemoryError> {
        let out_of_memory = |region: &Region| MemoryError::OutOfMemory {
            requested: bytes,
            capacity: region.capacity(),
        };
        let rounded = align_up(bytes, self.alignment).ok_or_else(|| out_of_memory(region))?;
        let end = u64::from(self.next) + u64::from(rounded);
        if end > u64::from(u32::MAX) {
            return Err(out_of_memory(region));
        }
        if end > region.capacity() as u64 {
            region.ensure_capacity(end).map_err(|_| MemoryError::OutOfMemory {
                requested: rounded,
                capacity: region.capacity(),
            })?;
        }

        let address = Address(self.next);
        self.next = end as u32;
        self.blocks.insert(address, rounded);
        Ok(address)
    }

    /// Allocate `bytes` bytes, returning [`Address::NULL`] on exhaustion.
    ///
    /// This is the form exposed to the guest, which checks for null the
    /// way it would after `malloc`.
    pub fn allocate(&mut self, region: &mut Region, bytes: u32) -> Address {
        match self.try_allocate(region, bytes) {
            Ok(address) => address,
            Err(e) => {
                tracing::error!(error = %e, "guest allocation failed");
                Address::NULL
            }
        }
    }

    /// Move the block at `address` to a fresh block of `bytes` bytes.
    ///
    /// A null `address` behaves as [`try_allocate`](Self::try_allocate).
    /// The first `min(old, new)` bytes are copied and the old record is
    /// dropped. The old span is not reused.
    ///
    /// # Errors
    ///
    /// [`MemoryError::IllegalPointer`] if `address` has no record, or
    /// [`MemoryError::OutOfMemory`] if the region cannot grow; in both
    /// cases the old block stays valid.
    pub fn try_reallocate(
        &mut self,
        region: &mut Region,
        address: Address,
        bytes: u32,
    ) -> Result<Address, MemoryError> {
        if address.is_null() {
            return self.try_allocate(region, bytes);
        }
        let old_size = *self
            .blocks
            .get(&address)
            .ok_or(MemoryError::IllegalPointer { address })?;

        let new_address = self.try_allocate(region, bytes)?;
        let new_size = self.blocks.get(&new_address).copied().unwrap_or(0);
        let carried = old_size.min(new_size);
        if carried > 0 {
            region.copy_within(address, new_address, carried)?;
        }
        // A zero-sized block can be handed the same base again.
        if new_address != address {
            self.blocks.swap_remove(&address);
        }
        Ok(new_address)
    }

    /// Guest-facing reallocation: exhaustion yields [`Address::NULL`],
    /// illegal pointers are still errors.
    pub fn reallocate(
        &mut self,
        region: &mut Region,
        address: Address,
        bytes: u32,
    ) -> Result<Address, MemoryError> {
        match self.try_reallocate(region, address, bytes) {
            Ok(new_address) => Ok(new_address),
            Err(e @ MemoryError::OutOfMemory { .. }) => {
                tracing::error!(error = %e, %address, "guest reallocation failed");
                Ok(Address::NULL)
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the record for `address`. Unknown addresses are ignored.
    ///
    /// The bytes are neither zeroed nor reclaimed.
    pub fn release(&mut self, address: Address) {
        self.blocks.swap_remove(&address);
    }

    /// Size of the outstanding block at `address`, if any.
    pub fn block_size(&self, address: Address) -> Option<u32> {
        self.blocks.get(&address).copied()
    }

    /// Number of outstanding blocks.
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Total bytes across outstanding blocks.
    pub fn live_bytes(&self) -> u64 {
        self.blocks.values().map(|&size| u64::from(size)).sum()
    }

    /// Iterate outstanding blocks as `(base, size)`, in no particular order.
    pub fn blocks(&self) -> impl Iterator<Item = (Address, u32)> + '_ {
        self.blocks.iter().map(|(&address, &size)| (address, size))
    }

    /// Capture the current high-water mark.
    pub fn save_point(&self) -> SavePoint {
        SavePoint(self.high_water())
    }

    /// Reset the high-water mark to `point` and forget every block at or
    /// above it. Blocks below the save point are untouched.
    pub fn rewind(&mut self, point: SavePoint) {
        let mark = point.0;
        self.blocks.retain(|&address, _| address < mark);
        self.next = mark.0;
    }
}
