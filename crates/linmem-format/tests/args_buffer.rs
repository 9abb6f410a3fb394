//! Rendering against argument buffers staged in a live context.

use linmem_core::{Address, FormatError, MemoryError};
use linmem_format::{format, format_line};
use linmem_host::BridgeContext;
use linmem_test_utils::{small_region_config, stage_cstr, ArgsPacker};

fn context() -> BridgeContext {
    BridgeContext::new(&small_region_config(), 1, Address(1024)).unwrap()
}

#[test]
fn string_view_pair_from_guest_macro() {
    let mut ctx = context();
    let fmt = stage_cstr(&mut ctx, "proc '%.*s' takes %zu inputs").unwrap();
    let name = stage_cstr(&mut ctx, "ascii_E and more").unwrap();
    let args = ArgsPacker::new().size(7).ptr(name).size(2).stage(&mut ctx).unwrap();
    assert_eq!(
        format(ctx.region(), fmt, args).unwrap(),
        "proc 'ascii_E' takes 2 inputs"
    );
}

#[test]
fn double_after_int_is_eight_byte_aligned() {
    let mut ctx = context();
    let fmt = stage_cstr(&mut ctx, "%d:%.3f").unwrap();
    let packer = ArgsPacker::new().int(-4).double(0.5);
    let args = packer.stage(&mut ctx).unwrap();
    assert_eq!(packer.write(ctx.region_mut(), args).unwrap(), 16);
    assert_eq!(format(ctx.region(), fmt, args).unwrap(), "-4:0.500");
}

#[test]
fn format_line_appends_newline() {
    let mut ctx = context();
    let fmt = stage_cstr(&mut ctx, "%c%c").unwrap();
    let args = ArgsPacker::new().char(b'h').char(b'i').stage(&mut ctx).unwrap();
    assert_eq!(format_line(ctx.region(), fmt, args).unwrap(), "hi\n");
}

#[test]
fn string_argument_past_region_end_is_reported() {
    let mut ctx = context();
    let fmt = stage_cstr(&mut ctx, "%s").unwrap();
    let capacity = ctx.region().capacity() as u32;
    let args = ArgsPacker::new().ptr(Address(capacity + 64)).stage(&mut ctx).unwrap();
    assert!(matches!(
        format(ctx.region(), fmt, args),
        Err(FormatError::Memory(MemoryError::OutOfBounds { .. }))
    ));
}

#[test]
fn null_format_renders_nothing() {
    let ctx = context();
    assert_eq!(format(ctx.region(), Address::NULL, Address::NULL).unwrap(), "");
}
