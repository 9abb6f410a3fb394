//! Linear memory region management for the linmem host bridge.
//!
//! Owns the guest's flat byte space and everything that touches it at
//! the byte level:
//!
//! ```text
//! Region (Vec<u8>, grows in whole pages, never shrinks)
//! ├── BlockAllocator (bump pointer + base → size table)
//! ├── Cursor / CursorMut (alignment-aware sequential access)
//! └── strings (null-terminated, fixed and length-prefixed readers)
//! ```
//!
//! All multi-byte values are little-endian. Address `0` is null and every
//! accessor rejects it with [`MemoryError::NullAccess`](linmem_core::MemoryError).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod allocator;
pub mod config;
pub mod cursor;
pub mod region;
pub mod strings;

pub use allocator::{BlockAllocator, SavePoint};
pub use config::RegionConfig;
pub use cursor::{Cursor, CursorMut};
pub use region::Region;
pub use strings::{read_fixed, read_length_prefixed, read_null_terminated, DecodedString};
