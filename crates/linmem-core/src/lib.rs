//! Core types for the linmem host bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: guest
//! addresses, the closed set of scalar kinds the guest lays out in
//! memory, and the error types for memory, shape and format failures.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod address;
pub mod error;
pub mod scalar;

pub use address::{align_up, Address};
pub use error::{FormatError, MemoryError, ShapeError};
pub use scalar::{Scalar, ScalarKind, Value};
