//! Host side of the linmem bridge.
//!
//! Ties the lower crates together into something a guest module can be
//! linked against:
//!
//! - [`BridgeContext`] owns the region, allocator and output route and
//!   implements the six imports the guest calls (`web_malloc`,
//!   `web_mfree`, `web_mrealloc`, `web_parse_number`, `web_printf`,
//!   `web_printfn`), both as typed methods and through a by-name
//!   [`dispatch`](BridgeContext::dispatch).
//! - [`GuestRuntime`] is the seam to whatever executes the guest.
//! - [`Interpreter`] loads a guest, reserves its staging buffer, and
//!   submits source text to it.
//!
//! Nothing here is thread-safe: one context serves one guest, and
//! `&mut` access enforces a single writer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod guest;
pub mod import;
pub mod interpreter;
pub mod number;
pub mod output;

pub use config::{BridgeConfig, ConfigError, GuestLayout};
pub use context::BridgeContext;
pub use error::{HostError, SubmitError};
pub use guest::GuestRuntime;
pub use import::{Import, ImportValue};
pub use interpreter::Interpreter;
pub use number::parse_number;
pub use output::{Output, OutputSink};
