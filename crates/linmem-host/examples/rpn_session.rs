//! A toy guest that evaluates reverse-Polish arithmetic through the
//! bridge's imports, with output sent to stdout.
//!
//! Run with `RUST_LOG=linmem=debug` to see allocator and session events.

use linmem_core::Address;
use linmem_host::{
    BridgeConfig, BridgeContext, GuestLayout, GuestRuntime, HostError, Interpreter, OutputSink,
};
use linmem_region::{read_fixed, CursorMut};

struct Stdout;

impl OutputSink for Stdout {
    fn write(&mut self, text: &str) {
        print!("{text}");
    }
}

/// Tokenises with `web_parse_number` and prints with `web_printfn`,
/// keeping its stack in a guest-heap list grown with `web_mrealloc`.
struct Rpn;

impl Rpn {
    fn print(ctx: &mut BridgeContext, fmt: &str, value: f64) -> Result<(), HostError> {
        let fmt_at = ctx.malloc(fmt.len() as u32 + 1);
        let args = ctx.malloc(8);
        let region = ctx.region_mut();
        region.write_bytes(fmt_at, fmt.as_bytes())?;
        region.set::<u8>(Address(fmt_at.0 + fmt.len() as u32), 0)?;
        CursorMut::new(region, args)?.put(value)?;
        ctx.printfn(fmt_at, args)
    }
}

impl GuestRuntime for Rpn {
    fn layout(&self) -> GuestLayout {
        GuestLayout {
            initial_pages: 2,
            heap_base: Address(66_576),
            heap_end: Address(131_072),
        }
    }

    fn interpret(
        &mut self,
        ctx: &mut BridgeContext,
        buffer: Address,
        len: u32,
    ) -> Result<bool, HostError> {
        let source = read_fixed(ctx.region(), buffer, len)?.into_string();
        let mut stack = Address::NULL;
        let mut depth = 0u32;

        let mut offset = 0u32;
        for word in source.split(' ') {
            let at = Address(buffer.0 + offset);
            offset += word.len() as u32 + 1;
            if word.is_empty() {
                continue;
            }
            let value = match word {
                "+" | "-" | "*" | "/" if depth >= 2 => {
                    depth -= 2;
                    let a = ctx.region().get::<f64>(Address(stack.0 + depth * 8))?;
                    let b = ctx.region().get::<f64>(Address(stack.0 + depth * 8 + 8))?;
                    match word {
                        "+" => a + b,
                        "-" => a - b,
                        "*" => a * b,
                        _ => a / b,
                    }
                }
                _ => {
                    let n = ctx.parse_number(at, word.len() as u32)?;
                    if n.is_nan() {
                        return Ok(false);
                    }
                    n
                }
            };
            stack = ctx.realloc(stack, (depth + 1) * 8)?;
            if stack.is_null() {
                return Ok(false);
            }
            ctx.region_mut().set::<f64>(Address(stack.0 + depth * 8), value)?;
            depth += 1;
        }

        if depth == 0 {
            return Ok(false);
        }
        let top = ctx.region().get::<f64>(Address(stack.0 + (depth - 1) * 8))?;
        Self::print(ctx, "= %.4f", top)?;
        Ok(true)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut session = match Interpreter::load(Rpn, BridgeConfig::default()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("load failed: {e}");
            std::process::exit(1);
        }
    };
    session.set_output(Some(Box::new(Stdout)));

    for line in ["34 35 +", "580 160 -", "1 2 3 * +", "2 0.5 /", "ascii_E"] {
        match session.submit(line) {
            Ok(true) => {}
            Ok(false) => println!("rejected: {line}"),
            Err(e) => println!("error: {e}"),
        }
    }
}
