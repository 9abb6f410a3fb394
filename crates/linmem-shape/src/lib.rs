//! Record shapes and struct views for the linmem host bridge.
//!
//! A [`Shape`] is a declarative, ordered list of named fields, each a
//! scalar kind or a nested shape. Compiling it into a [`ShapeLayout`]
//! reproduces the guest compiler's padding rules and fixes every
//! field's offset; binding the layout to a base address produces a
//! [`StructView`] whose fields read and write the region live.
//!
//! ```text
//! Shape ──compile──▶ ShapeLayout ──bind(base)──▶ StructView
//!  (names, kinds)     (offsets, sizeof)           (ptr, live accessors)
//! ```
//!
//! All structural errors ([`ShapeError`](linmem_core::ShapeError)) are
//! reported when the shape is built, never when a view is read.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod layout;
pub mod shape;
pub mod view;

pub use layout::{LayoutEntry, ShapeLayout};
pub use shape::{FieldKind, FieldSpec, Shape, ShapeBuilder, RESERVED_NAMES};
pub use view::{build_view, ScalarField, StructView, ViewField};
