//! Alignment-aware sequential access over the region.
//!
//! A [`Cursor`] walks a run of guest values the way the guest laid them
//! out: before each access the offset is rounded up to the kind's
//! alignment, the value is decoded little-endian, and the offset moves
//! past the kind's stride. [`CursorMut`] applies the same rules for
//! writes. Alignment is relative to the cursor's base, which the guest
//! always places on an 8-byte boundary.

use linmem_core::{align_up, Address, MemoryError, Scalar, ScalarKind, Value};

use crate::region::Region;

fn null_check(base: Address) -> Result<(), MemoryError> {
    if base.is_null() {
        return Err(MemoryError::NullAccess { what: "cursor" });
    }
    Ok(())
}

/// Compute the aligned slot for `kind` at `offset` and the offset after it.
fn slot(base: Address, offset: u32, kind: ScalarKind) -> Result<(Address, u32), MemoryError> {
    let overflow = MemoryError::OutOfBounds {
        address: base,
        len: offset,
        capacity: u32::MAX as usize,
    };
    let aligned = align_up(offset, kind.alignment()).ok_or_else(|| overflow.clone())?;
    let address = base.checked_add(aligned).ok_or_else(|| overflow.clone())?;
    let next = aligned.checked_add(kind.stride()).ok_or(overflow)?;
    Ok((address, next))
}

/// Read head over the region.
pub struct Cursor<'r> {
    region: &'r Region,
    base: Address,
    offset: u32,
}

impl<'r> Cursor<'r> {
    /// Position a cursor at `base`. Fails on the null address.
    pub fn new(region: &'r Region, base: Address) -> Result<Self, MemoryError> {
        null_check(base)?;
        Ok(Self {
            region,
            base,
            offset: 0,
        })
    }

    /// The address the cursor was created at.
    pub fn base(&self) -> Address {
        self.base
    }

    /// Bytes consumed so far, relative to the base.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Absolute address of the current (unaligned) position.
    pub fn position(&self) -> Address {
        Address(self.base.0.wrapping_add(self.offset))
    }

    /// Bytes consumed so far, rounded up to a 4-byte slot.
    pub fn size_so_far(&self) -> u32 {
        align_up(self.offset, 4).unwrap_or(self.offset)
    }

    /// Rewind to the base.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Read the next `T` and advance past it.
    pub fn shift<T: Scalar>(&mut self) -> Result<T, MemoryError> {
        let (address, next) = slot(self.base, self.offset, T::KIND)?;
        let value = self.region.get::<T>(address)?;
        self.offset = next;
        Ok(value)
    }

    /// Read the next `T` without advancing.
    pub fn peek<T: Scalar>(&self) -> Result<T, MemoryError> {
        let (address, _) = slot(self.base, self.offset, T::KIND)?;
        self.region.get::<T>(address)
    }

    /// Read the next value of a runtime-chosen kind and advance past it.
    pub fn shift_value(&mut self, kind: ScalarKind) -> Result<Value, MemoryError> {
        let (address, next) = slot(self.base, self.offset, kind)?;
        let value = self.region.get_value(kind, address)?;
        self.offset = next;
        Ok(value)
    }

    /// Next `bool`.
    pub fn shift_bool(&mut self) -> Result<bool, MemoryError> {
        self.shift()
    }

    /// Next `int8`.
    pub fn shift_i8(&mut self) -> Result<i8, MemoryError> {
        self.shift()
    }

    /// Next `uint8`.
    pub fn shift_u8(&mut self) -> Result<u8, MemoryError> {
        self.shift()
    }

    /// Next `int32`.
    pub fn shift_i32(&mut self) -> Result<i32, MemoryError> {
        self.shift()
    }

    /// Next `uint32`.
    pub fn shift_u32(&mut self) -> Result<u32, MemoryError> {
        self.shift()
    }

    /// Next `float32`.
    pub fn shift_f32(&mut self) -> Result<f32, MemoryError> {
        self.shift()
    }

    /// Next `int64`.
    pub fn shift_i64(&mut self) -> Result<i64, MemoryError> {
        self.shift()
    }

    /// Next `uint64`.
    pub fn shift_u64(&mut self) -> Result<u64, MemoryError> {
        self.shift()
    }

    /// Next `float64`.
    pub fn shift_f64(&mut self) -> Result<f64, MemoryError> {
        self.shift()
    }

    /// Next pointer-sized value as an [`Address`].
    pub fn shift_ptr(&mut self) -> Result<Address, MemoryError> {
        self.shift::<u32>().map(Address)
    }
}

/// Write head over the region.
pub struct CursorMut<'r> {
    region: &'r mut Region,
    base: Address,
    offset: u32,
}

impl<'r> CursorMut<'r> {
    /// Position a writer at `base`. Fails on the null address.
    pub fn new(region: &'r mut Region, base: Address) -> Result<Self, MemoryError> {
        null_check(base)?;
        Ok(Self {
            region,
            base,
            offset: 0,
        })
    }

    /// The address the cursor was created at.
    pub fn base(&self) -> Address {
        self.base
    }

    /// Bytes written so far, relative to the base.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Write `value` at the next aligned slot and advance past it.
    /// Returns the absolute address written.
    pub fn put<T: Scalar>(&mut self, value: T) -> Result<Address, MemoryError> {
        let (address, next) = slot(self.base, self.offset, T::KIND)?;
        self.region.set(address, value)?;
        self.offset = next;
        Ok(address)
    }

    /// Write a dynamically typed value at the next aligned slot.
    pub fn put_value(&mut self, value: Value) -> Result<Address, MemoryError> {
        let (address, next) = slot(self.base, self.offset, value.kind())?;
        self.region.set_value(address, value)?;
        self.offset = next;
        Ok(address)
    }

    /// Write a pointer.
    pub fn put_ptr(&mut self, pointer: Address) -> Result<Address, MemoryError> {
        self.put(pointer.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;

    const BASE: Address = Address(64);

    fn region() -> Region {
        let config = RegionConfig {
            page_size: 1024,
            max_pages: 1,
            alignment: 8,
        };
        Region::new(&config, 1).unwrap()
    }

    #[test]
    fn null_base_is_rejected() {
        let region = region();
        assert!(matches!(
            Cursor::new(&region, Address::NULL),
            Err(MemoryError::NullAccess { .. })
        ));
    }

    #[test]
    fn shift_aligns_before_reading() {
        let mut region = region();
        region.set::<bool>(BASE, true).unwrap();
        region.set::<i32>(Address(BASE.0 + 4), -7).unwrap();
        region.set::<f64>(Address(BASE.0 + 8), 1.5).unwrap();

        let mut cursor = Cursor::new(&region, BASE).unwrap();
        assert!(cursor.shift_bool().unwrap());
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.shift_i32().unwrap(), -7);
        assert_eq!(cursor.offset(), 8);
        assert_eq!(cursor.shift_f64().unwrap(), 1.5);
        assert_eq!(cursor.offset(), 16);
    }

    #[test]
    fn int8_occupies_four_byte_slot() {
        let mut region = region();
        region.set::<i8>(BASE, -3).unwrap();
        region.set::<u8>(Address(BASE.0 + 4), 200).unwrap();
        let mut cursor = Cursor::new(&region, BASE).unwrap();
        assert_eq!(cursor.shift_i8().unwrap(), -3);
        assert_eq!(cursor.offset(), 4);
        assert_eq!(cursor.shift_u8().unwrap(), 200);
        assert_eq!(cursor.offset(), 8);
    }

    #[test]
    fn u32_then_u64_pads_to_eight() {
        let mut region = region();
        let mut writer = CursorMut::new(&mut region, BASE).unwrap();
        writer.put(5u32).unwrap();
        let at = writer.put(u64::MAX - 1).unwrap();
        assert_eq!(at, Address(BASE.0 + 8));

        let mut cursor = Cursor::new(&region, BASE).unwrap();
        assert_eq!(cursor.shift_u32().unwrap(), 5);
        assert_eq!(cursor.shift_u64().unwrap(), u64::MAX - 1);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut region = region();
        region.set::<u32>(BASE, 99).unwrap();
        let cursor = Cursor::new(&region, BASE).unwrap();
        assert_eq!(cursor.peek::<u32>().unwrap(), 99);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn shift_past_end_fails_without_advancing() {
        let region = region();
        let mut cursor = Cursor::new(&region, Address(1020)).unwrap();
        cursor.shift_u32().unwrap();
        let before = cursor.offset();
        assert!(matches!(
            cursor.shift_u32(),
            Err(MemoryError::OutOfBounds { .. })
        ));
        assert_eq!(cursor.offset(), before);
    }

    #[test]
    fn size_so_far_rounds_to_slot() {
        let mut region = region();
        region.set::<bool>(BASE, false).unwrap();
        let mut cursor = Cursor::new(&region, BASE).unwrap();
        cursor.shift_bool().unwrap();
        assert_eq!(cursor.size_so_far(), 4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                any::<bool>().prop_map(Value::Bool),
                any::<i8>().prop_map(Value::Int8),
                any::<u8>().prop_map(Value::Uint8),
                any::<i32>().prop_map(Value::Int32),
                any::<u32>().prop_map(Value::Uint32),
                any::<i64>().prop_map(Value::Int64),
                any::<u64>().prop_map(Value::Uint64),
                (-1.0e30f32..1.0e30).prop_map(Value::Float32),
                (-1.0e300f64..1.0e300).prop_map(Value::Float64),
            ]
        }

        proptest! {
            #[test]
            fn written_sequences_read_back(values in proptest::collection::vec(any_value(), 1..24)) {
                let mut region = region();
                {
                    let mut writer = CursorMut::new(&mut region, BASE).unwrap();
                    for v in &values {
                        writer.put_value(*v).unwrap();
                    }
                }
                let mut cursor = Cursor::new(&region, BASE).unwrap();
                for v in &values {
                    prop_assert_eq!(cursor.shift_value(v.kind()).unwrap(), *v);
                }
            }
        }
    }
}
