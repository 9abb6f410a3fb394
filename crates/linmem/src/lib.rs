//! linmem: the host side of a bridge to a sandboxed linear-memory guest.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all linmem sub-crates. For most users, adding `linmem` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use linmem::prelude::*;
//!
//! // A context over one 64 KiB page with the heap at 1 KiB.
//! let mut ctx = BridgeContext::new(&RegionConfig::default(), 1, Address(1024)).unwrap();
//!
//! // Lay out a string view record the way the guest would.
//! let text = ctx.malloc(5);
//! ctx.region_mut().write_bytes(text, b"hello").unwrap();
//! let shape = Shape::from_tags([("data", "ptr"), ("len", "size_t")]).unwrap();
//! let view = build_view(&shape, ctx.malloc(8));
//! view.scalar("data").unwrap().set(ctx.region_mut(), text.0).unwrap();
//! view.scalar("len").unwrap().set(ctx.region_mut(), 3u32).unwrap();
//!
//! assert_eq!(read_length_prefixed(ctx.region(), view.ptr()).unwrap().as_str(), "hel");
//!
//! // Print it through the guest's printf: `%.*s` takes the length first.
//! let fmt = ctx.malloc(8);
//! ctx.region_mut().write_bytes(fmt, b"%.*s!\0").unwrap();
//! let args = ctx.malloc(8);
//! let mut packer = CursorMut::new(ctx.region_mut(), args).unwrap();
//! packer.put(5u32).unwrap();
//! packer.put_ptr(text).unwrap();
//! let out = linmem::format::format(ctx.region(), fmt, args).unwrap();
//! assert_eq!(out, "hello!");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `linmem-core` | addresses, scalar kinds, error types |
//! | [`region`] | `linmem-region` | region, allocator, cursors, string readers |
//! | [`shape`] | `linmem-shape` | shapes, layouts, struct views |
//! | [`format`] | `linmem-format` | format string parsing and rendering |
//! | [`host`] | `linmem-host` | bridge context, imports, guest sessions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Addresses, scalar kinds, values and errors (`linmem-core`).
pub use linmem_core as types;

/// The region, its bump allocator, cursors and string readers
/// (`linmem-region`).
pub use linmem_region as region;

/// Record shapes and live struct views (`linmem-shape`).
pub use linmem_shape as shape;

/// The guest `printf` interpreter (`linmem-format`).
///
/// [`format::format`] reads a format string and argument buffer from
/// the region; [`format::render`] takes host-side format text.
pub use linmem_format as format;

/// Import dispatch, output routing and guest sessions (`linmem-host`).
pub use linmem_host as host;

/// Common imports for typical linmem usage.
///
/// ```rust
/// use linmem::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use linmem_core::{Address, Scalar, ScalarKind, Value};

    // Errors
    pub use linmem_core::{FormatError, MemoryError, ShapeError};
    pub use linmem_host::{ConfigError, HostError, SubmitError};

    // Region
    pub use linmem_region::{
        read_fixed, read_length_prefixed, read_null_terminated, BlockAllocator, Cursor,
        CursorMut, DecodedString, Region, RegionConfig,
    };

    // Shapes
    pub use linmem_shape::{build_view, Shape, ShapeLayout, StructView};

    // Host
    pub use linmem_host::{
        BridgeConfig, BridgeContext, GuestLayout, GuestRuntime, ImportValue, Interpreter,
        OutputSink,
    };
}
