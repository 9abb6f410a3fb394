//! Test utilities and scripted guests for linmem development.
//!
//! Provides a collecting [`SharedSink`], an [`ArgsPacker`] that lays out
//! variadic argument buffers the way the guest does, a closure-driven
//! [`ScriptedGuest`], and the guest's record shapes in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod guest;

use std::cell::RefCell;
use std::rc::Rc;

use linmem_core::{Address, MemoryError, Scalar, Value};
use linmem_host::{BridgeContext, OutputSink};
use linmem_region::{BlockAllocator, CursorMut, Region, RegionConfig};

pub use guest::ScriptedGuest;

/// An [`OutputSink`] whose contents stay readable after it is boxed and
/// handed to a context.
#[derive(Clone, Debug, Default)]
pub struct SharedSink(Rc<RefCell<String>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }

    /// A boxed handle to the same buffer.
    pub fn boxed(&self) -> Box<dyn OutputSink> {
        Box::new(self.clone())
    }
}

impl OutputSink for SharedSink {
    fn write(&mut self, text: &str) {
        self.0.borrow_mut().push_str(text);
    }
}

/// Builds a guest variadic argument buffer.
///
/// Values are queued host-side, then written with the guest's slot
/// alignment by [`write`](Self::write).
#[derive(Clone, Debug, Default)]
pub struct ArgsPacker {
    values: Vec<Value>,
}

impl ArgsPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Scalar>(mut self, value: T) -> Self {
        self.values.push(value.into_value());
        self
    }

    pub fn int(self, value: i32) -> Self {
        self.push(value)
    }

    pub fn size(self, value: u32) -> Self {
        self.push(value)
    }

    pub fn ptr(self, address: Address) -> Self {
        self.push(address.0)
    }

    pub fn char(self, c: u8) -> Self {
        self.push(c as i8)
    }

    pub fn double(self, value: f64) -> Self {
        self.push(value)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Write every queued value starting at `base`. Returns the number of
    /// bytes spanned.
    pub fn write(&self, region: &mut Region, base: Address) -> Result<u32, MemoryError> {
        let mut cursor = CursorMut::new(region, base)?;
        for value in &self.values {
            cursor.put_value(*value)?;
        }
        Ok(cursor.offset())
    }

    /// Allocate a buffer for the queued values in `ctx` and write them.
    pub fn stage(&self, ctx: &mut BridgeContext) -> Result<Address, MemoryError> {
        let base = ctx.malloc(8 * self.values.len().max(1) as u32);
        if base.is_null() {
            return Err(MemoryError::NullAccess { what: "args buffer" });
        }
        self.write(ctx.region_mut(), base)?;
        Ok(base)
    }
}

/// Allocate and write a null-terminated copy of `text`.
pub fn write_cstr(
    region: &mut Region,
    allocator: &mut BlockAllocator,
    text: &str,
) -> Result<Address, MemoryError> {
    let at = allocator.try_allocate(region, text.len() as u32 + 1)?;
    region.write_bytes(at, text.as_bytes())?;
    region.set::<u8>(Address(at.0 + text.len() as u32), 0)?;
    Ok(at)
}

/// [`write_cstr`] against a context's heap.
pub fn stage_cstr(ctx: &mut BridgeContext, text: &str) -> Result<Address, MemoryError> {
    let (region, allocator) = ctx.memory_mut();
    write_cstr(region, allocator, text)
}

/// A small region config suited to unit tests: 4 KiB pages, up to 16.
pub fn small_region_config() -> RegionConfig {
    RegionConfig {
        page_size: 4096,
        max_pages: 16,
        alignment: 8,
    }
}
