//! Benchmark fixtures for the linmem host bridge.
//!
//! - [`bench_context`]: a context sized like the reference guest
//! - [`printf_fixture`]: a staged format string plus argument buffer

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use linmem_core::{Address, MemoryError};
use linmem_host::BridgeContext;
use linmem_region::{CursorMut, RegionConfig};

/// Heap base of the reference guest.
pub const HEAP_BASE: Address = Address(66_576);

/// A context with two initial 64 KiB pages and room to grow to 64.
pub fn bench_context() -> BridgeContext {
    let config = RegionConfig {
        max_pages: 64,
        ..RegionConfig::default()
    };
    match BridgeContext::new(&config, 2, HEAP_BASE) {
        Ok(ctx) => ctx,
        Err(e) => panic!("bench context: {e}"),
    }
}

/// Stage `"%d: %.*s = %.3f\0"` and a matching argument buffer.
///
/// Returns `(format, args)`.
pub fn printf_fixture(ctx: &mut BridgeContext) -> Result<(Address, Address), MemoryError> {
    const FMT: &[u8] = b"%d: %.*s = %.3f\0";
    const NAME: &[u8] = b"print_number";

    let fmt = ctx.malloc(FMT.len() as u32);
    let name = ctx.malloc(NAME.len() as u32);
    let args = ctx.malloc(32);
    let region = ctx.region_mut();
    region.write_bytes(fmt, FMT)?;
    region.write_bytes(name, NAME)?;

    let mut cursor = CursorMut::new(region, args)?;
    cursor.put(42i32)?;
    cursor.put(NAME.len() as u32)?;
    cursor.put_ptr(name)?;
    cursor.put(3.14159f64)?;
    Ok((fmt, args))
}
