//! The single owned bridge context.
//!
//! [`BridgeContext`] owns the region, the allocator, and the output
//! route. Every import takes `&mut self`, so exclusive access is checked
//! by the borrow checker rather than assumed.

use linmem_core::{Address, MemoryError};
use linmem_format::{format, format_line};
use linmem_region::{read_fixed, BlockAllocator, Region, RegionConfig};
use smallvec::SmallVec;

use crate::error::HostError;
use crate::import::{Import, ImportValue};
use crate::number::parse_number;
use crate::output::{Output, OutputSink};

/// Host state shared with one guest instance.
pub struct BridgeContext {
    region: Region,
    allocator: BlockAllocator,
    output: Output,
}

impl BridgeContext {
    /// A context over a fresh region of `initial_pages` pages whose heap
    /// starts at `heap_base`.
    pub fn new(
        config: &RegionConfig,
        initial_pages: u32,
        heap_base: Address,
    ) -> Result<Self, MemoryError> {
        Ok(Self {
            region: Region::new(config, initial_pages)?,
            allocator: BlockAllocator::new(heap_base, config.alignment),
            output: Output::new(),
        })
    }

    /// The guest's memory.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Mutable access to the guest's memory.
    pub fn region_mut(&mut self) -> &mut Region {
        &mut self.region
    }

    /// The heap allocator.
    pub fn allocator(&self) -> &BlockAllocator {
        &self.allocator
    }

    /// Mutable access to the heap allocator.
    pub fn allocator_mut(&mut self) -> &mut BlockAllocator {
        &mut self.allocator
    }

    /// Region and allocator together, for callers that need both.
    pub fn memory_mut(&mut self) -> (&mut Region, &mut BlockAllocator) {
        (&mut self.region, &mut self.allocator)
    }

    /// The output route.
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Attach or detach the output sink.
    pub fn set_output(&mut self, sink: Option<Box<dyn OutputSink>>) {
        self.output.set_sink(sink);
    }

    // ── Imports ─────────────────────────────────────────────────

    /// `web_malloc`: null on exhaustion.
    pub fn malloc(&mut self, size: u32) -> Address {
        self.allocator.allocate(&mut self.region, size)
    }

    /// `web_mfree`
    pub fn free(&mut self, address: Address) {
        self.allocator.release(address);
    }

    /// `web_mrealloc`: null on exhaustion, error on an unknown pointer.
    pub fn realloc(&mut self, address: Address, size: u32) -> Result<Address, HostError> {
        Ok(self.allocator.reallocate(&mut self.region, address, size)?)
    }

    /// `web_parse_number`
    pub fn parse_number(&self, address: Address, len: u32) -> Result<f64, HostError> {
        if address.is_null() {
            return Err(MemoryError::NullAccess {
                what: "number buffer",
            }
            .into());
        }
        let text = read_fixed(&self.region, address, len)?;
        Ok(parse_number(text.as_str()))
    }

    /// `web_printf`
    pub fn printf(&mut self, fmt: Address, args: Address) -> Result<(), HostError> {
        let text = format(&self.region, fmt, args)?;
        self.output.write(&text);
        Ok(())
    }

    /// `web_printfn`
    pub fn printfn(&mut self, fmt: Address, args: Address) -> Result<(), HostError> {
        let text = format_line(&self.region, fmt, args)?;
        self.output.write(&text);
        Ok(())
    }

    /// Call an import by symbol name with raw wasm values.
    ///
    /// Unknown names are reported as [`HostError::Unimplemented`] and
    /// logged; they never return a default value.
    pub fn dispatch(
        &mut self,
        name: &str,
        args: &[ImportValue],
    ) -> Result<Option<ImportValue>, HostError> {
        let Some(import) = Import::from_name(name) else {
            tracing::error!(import = name, ?args, "guest called an unimplemented import");
            return Err(HostError::Unimplemented {
                name: name.to_string(),
                args: args.to_vec(),
            });
        };
        if args.len() != import.arity() {
            return Err(HostError::BadArguments {
                name: import.name(),
                reason: format!("expected {} arguments, got {}", import.arity(), args.len()),
            });
        }
        let words = args
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_u32().ok_or_else(|| HostError::BadArguments {
                    name: import.name(),
                    reason: format!("argument {i} must be i32, got {v}"),
                })
            })
            .collect::<Result<SmallVec<[u32; 2]>, _>>()?;

        let result = match import {
            Import::Malloc => Some(ImportValue::ptr(self.malloc(words[0]))),
            Import::Free => {
                self.free(Address(words[0]));
                None
            }
            Import::Realloc => Some(ImportValue::ptr(
                self.realloc(Address(words[0]), words[1])?,
            )),
            Import::ParseNumber => Some(ImportValue::F64(
                self.parse_number(Address(words[0]), words[1])?,
            )),
            Import::Printf => {
                self.printf(Address(words[0]), Address(words[1]))?;
                None
            }
            Import::PrintfLine => {
                self.printfn(Address(words[0]), Address(words[1]))?;
                None
            }
        };
        Ok(result)
    }
}
