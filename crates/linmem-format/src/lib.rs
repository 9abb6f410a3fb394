//! Guest `printf` emulation for the linmem host bridge.
//!
//! The guest passes a pointer to a null-terminated format string and a
//! pointer to its variadic argument buffer. [`directive::parse`] splits
//! the format text into literal runs and conversions; [`render`] walks
//! the argument buffer with a [`Cursor`](linmem_region::Cursor), pulling
//! one argument per conversion.
//!
//! Supported conversions:
//!
//! | Text | Argument(s) | Output |
//! |------|-------------|--------|
//! | `%zu` | `uint32` | decimal |
//! | `%d` | `int32` | decimal |
//! | `%s` | pointer | null-terminated string |
//! | `%c` | `int8` | one character |
//! | `%.*s` | `uint32` precision, pointer | exactly that many bytes |
//! | `%.Nf` | `float64` | `N` fractional digits, `N` at most 100, ties away from zero |
//!
//! Anything else is a [`FormatError`](linmem_core::FormatError).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod directive;
pub mod render;

pub use directive::{parse, Directive, Directives, MAX_PRECISION};
pub use render::{format, format_line, render};
