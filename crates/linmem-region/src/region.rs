//! The growable flat byte region shared between host and guest.
//!
//! A [`Region`] is a zero-initialised `Vec<u8>` that grows in whole
//! pages up to a configured ceiling and never shrinks. It offers
//! bounds-checked byte access and the non-advancing typed `get`/`set`
//! forms used when no sequential walk is needed.

use linmem_core::{Address, MemoryError, Scalar, ScalarKind, Value};

use crate::config::RegionConfig;

/// The guest's linear memory.
pub struct Region {
    /// Backing storage. Length is always a whole number of pages.
    data: Vec<u8>,
    page_size: u32,
    max_pages: u32,
}

impl Region {
    /// Create a zeroed region of `initial_pages` pages.
    ///
    /// Fails with [`MemoryError::GrowthFailed`] if `initial_pages` exceeds
    /// the configured ceiling.
    pub fn new(config: &RegionConfig, initial_pages: u32) -> Result<Self, MemoryError> {
        if initial_pages > config.max_pages {
            return Err(MemoryError::GrowthFailed {
                requested_pages: u64::from(initial_pages),
                max_pages: config.max_pages,
            });
        }
        let bytes = usize::try_from(config.pages_to_bytes(initial_pages)).map_err(|_| {
            MemoryError::GrowthFailed {
                requested_pages: u64::from(initial_pages),
                max_pages: config.max_pages,
            }
        })?;
        Ok(Self {
            data: vec![0; bytes],
            page_size: config.page_size,
            max_pages: config.max_pages,
        })
    }

    /// Current size in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Current size in pages.
    pub fn pages(&self) -> u32 {
        (self.data.len() / self.page_size as usize) as u32
    }

    /// Growth increment in bytes.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Grow by `delta` pages. Returns the previous page count.
    ///
    /// New bytes are zeroed. On failure the region is unchanged.
    pub fn grow(&mut self, delta: u32) -> Result<u32, MemoryError> {
        let old = self.pages();
        let target = u64::from(old) + u64::from(delta);
        if target > u64::from(self.max_pages) {
            return Err(MemoryError::GrowthFailed {
                requested_pages: target,
                max_pages: self.max_pages,
            });
        }
        let bytes = usize::try_from(target * u64::from(self.page_size)).map_err(|_| {
            MemoryError::GrowthFailed {
                requested_pages: target,
                max_pages: self.max_pages,
            }
        })?;
        self.data.resize(bytes, 0);
        tracing::debug!(old_pages = old, new_pages = target, "region grown");
        Ok(old)
    }

    /// Grow by as many pages as needed so that `end` bytes are addressable.
    pub fn ensure_capacity(&mut self, end: u64) -> Result<(), MemoryError> {
        let capacity = self.data.len() as u64;
        if end <= capacity {
            return Ok(());
        }
        let page = u64::from(self.page_size);
        let missing = (end - capacity).div_ceil(page);
        let delta = u32::try_from(missing).map_err(|_| MemoryError::GrowthFailed {
            requested_pages: u64::from(self.pages()) + missing,
            max_pages: self.max_pages,
        })?;
        self.grow(delta).map(|_| ())
    }

    /// The entire region as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn span(&self, address: Address, len: u32, what: &'static str) -> Result<(usize, usize), MemoryError> {
        if address.is_null() {
            return Err(MemoryError::NullAccess { what });
        }
        let start = address.index();
        let end = start
            .checked_add(len as usize)
            .filter(|&end| end <= self.data.len())
            .ok_or(MemoryError::OutOfBounds {
                address,
                len,
                capacity: self.data.len(),
            })?;
        Ok((start, end))
    }

    /// Borrow `len` bytes starting at `address`.
    pub fn bytes(&self, address: Address, len: u32) -> Result<&[u8], MemoryError> {
        let (start, end) = self.span(address, len, "bytes")?;
        Ok(&self.data[start..end])
    }

    /// Mutably borrow `len` bytes starting at `address`.
    pub fn bytes_mut(&mut self, address: Address, len: u32) -> Result<&mut [u8], MemoryError> {
        let (start, end) = self.span(address, len, "bytes")?;
        Ok(&mut self.data[start..end])
    }

    /// Everything from `address` to the end of the region.
    pub fn tail(&self, address: Address) -> Result<&[u8], MemoryError> {
        if address.is_null() {
            return Err(MemoryError::NullAccess { what: "bytes" });
        }
        self.data
            .get(address.index()..)
            .ok_or(MemoryError::OutOfBounds {
                address,
                len: 0,
                capacity: self.data.len(),
            })
    }

    /// Copy `bytes` into the region at `address`.
    pub fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let len = u32::try_from(bytes.len()).map_err(|_| MemoryError::OutOfBounds {
            address,
            len: u32::MAX,
            capacity: self.data.len(),
        })?;
        self.bytes_mut(address, len)?.copy_from_slice(bytes);
        Ok(())
    }

    /// Set `len` bytes at `address` to `value`.
    pub fn fill(&mut self, address: Address, len: u32, value: u8) -> Result<(), MemoryError> {
        self.bytes_mut(address, len)?.fill(value);
        Ok(())
    }

    /// Copy `len` bytes from `src` to `dst`. The spans may overlap.
    pub fn copy_within(&mut self, src: Address, dst: Address, len: u32) -> Result<(), MemoryError> {
        let (start, end) = self.span(src, len, "copy source")?;
        let (dst_start, _) = self.span(dst, len, "copy destination")?;
        self.data.copy_within(start..end, dst_start);
        Ok(())
    }

    /// Read a `T` at an absolute address, without alignment adjustment.
    pub fn get<T: Scalar>(&self, address: Address) -> Result<T, MemoryError> {
        let (start, end) = self.span(address, T::KIND.storage_size(), T::KIND.name())?;
        Ok(T::decode_le(&self.data[start..end]))
    }

    /// Write a `T` at an absolute address, without alignment adjustment.
    pub fn set<T: Scalar>(&mut self, address: Address, value: T) -> Result<(), MemoryError> {
        let (start, end) = self.span(address, T::KIND.storage_size(), T::KIND.name())?;
        value.encode_le(&mut self.data[start..end]);
        Ok(())
    }

    /// Read a value of `kind` at an absolute address.
    pub fn get_value(&self, kind: ScalarKind, address: Address) -> Result<Value, MemoryError> {
        let (start, end) = self.span(address, kind.storage_size(), kind.name())?;
        Ok(Value::decode_le(kind, &self.data[start..end]))
    }

    /// Write `value` at an absolute address using its own kind's encoding.
    pub fn set_value(&mut self, address: Address, value: Value) -> Result<(), MemoryError> {
        let kind = value.kind();
        let (start, end) = self.span(address, kind.storage_size(), kind.name())?;
        value.encode_le(&mut self.data[start..end]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RegionConfig {
        RegionConfig {
            page_size: 256,
            max_pages: 4,
            alignment: 8,
        }
    }

    #[test]
    fn new_region_is_zeroed() {
        let region = Region::new(&small_config(), 2).unwrap();
        assert_eq!(region.capacity(), 512);
        assert_eq!(region.pages(), 2);
        assert!(region.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn initial_pages_over_limit_fails() {
        let result = Region::new(&small_config(), 5);
        assert!(matches!(result, Err(MemoryError::GrowthFailed { .. })));
    }

    #[test]
    fn grow_adds_whole_pages() {
        let mut region = Region::new(&small_config(), 1).unwrap();
        assert_eq!(region.grow(2).unwrap(), 1);
        assert_eq!(region.capacity(), 768);
    }

    #[test]
    fn grow_past_limit_leaves_region_unchanged() {
        let mut region = Region::new(&small_config(), 3).unwrap();
        assert!(region.grow(2).is_err());
        assert_eq!(region.pages(), 3);
    }

    #[test]
    fn ensure_capacity_rounds_to_pages() {
        let mut region = Region::new(&small_config(), 1).unwrap();
        region.ensure_capacity(300).unwrap();
        assert_eq!(region.pages(), 2);
        region.ensure_capacity(10).unwrap();
        assert_eq!(region.pages(), 2);
    }

    #[test]
    fn null_reads_fail() {
        let region = Region::new(&small_config(), 1).unwrap();
        assert_eq!(
            region.get::<u32>(Address::NULL),
            Err(MemoryError::NullAccess { what: "uint32" })
        );
    }

    #[test]
    fn reads_past_end_fail() {
        let region = Region::new(&small_config(), 1).unwrap();
        assert!(matches!(
            region.get::<u64>(Address(252)),
            Err(MemoryError::OutOfBounds { .. })
        ));
        assert!(region.get::<u32>(Address(252)).is_ok());
    }

    #[test]
    fn get_set_little_endian() {
        let mut region = Region::new(&small_config(), 1).unwrap();
        region.set::<u32>(Address(8), 0x0403_0201).unwrap();
        assert_eq!(region.bytes(Address(8), 4).unwrap(), &[1, 2, 3, 4]);
        assert_eq!(region.get::<u32>(Address(8)).unwrap(), 0x0403_0201);
    }

    #[test]
    fn set_value_uses_value_kind() {
        let mut region = Region::new(&small_config(), 1).unwrap();
        region.set_value(Address(16), Value::Float64(2.5)).unwrap();
        assert_eq!(
            region.get_value(ScalarKind::Float64, Address(16)).unwrap(),
            Value::Float64(2.5)
        );
    }

    #[test]
    fn copy_within_handles_overlap() {
        let mut region = Region::new(&small_config(), 1).unwrap();
        region.write_bytes(Address(8), &[1, 2, 3, 4]).unwrap();
        region.copy_within(Address(8), Address(10), 4).unwrap();
        assert_eq!(region.bytes(Address(8), 6).unwrap(), &[1, 2, 1, 2, 3, 4]);
    }
}
