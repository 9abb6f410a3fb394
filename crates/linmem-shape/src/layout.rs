//! Shape compilation: field offsets and record size.
//!
//! Layout follows the guest compiler's rules:
//!
//! - each scalar is placed at the next multiple of its alignment and
//!   advances the running offset by its stride;
//! - a record's alignment is the widest alignment among its members,
//!   but never less than 4;
//! - a nested record is placed at the next multiple of its own
//!   alignment and advances the running offset by its `sizeof`;
//! - `sizeof` is the final running offset rounded up to the record's
//!   alignment.
//!
//! Offsets of a nested record's fields are relative to that record.

use indexmap::IndexMap;
use linmem_core::{Address, ScalarKind};

use crate::shape::{FieldKind, Shape};
use crate::view::{ScalarField, StructView, ViewField};

/// Minimum record alignment.
const MIN_RECORD_ALIGNMENT: u32 = 4;

fn pad(offset: u32, alignment: u32) -> u32 {
    offset.next_multiple_of(alignment)
}

/// A compiled field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutEntry {
    /// A scalar at `offset`.
    Scalar {
        /// Scalar kind.
        kind: ScalarKind,
        /// Offset relative to the enclosing record.
        offset: u32,
    },
    /// A nested record at `offset`.
    Nested {
        /// Offset relative to the enclosing record.
        offset: u32,
        /// The nested record's own layout.
        layout: ShapeLayout,
    },
}

impl LayoutEntry {
    /// Offset relative to the enclosing record.
    pub fn offset(&self) -> u32 {
        match self {
            Self::Scalar { offset, .. } | Self::Nested { offset, .. } => *offset,
        }
    }
}

/// The resolved memory layout of a [`Shape`].
///
/// Reusable: bind it to any number of base addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeLayout {
    entries: IndexMap<String, LayoutEntry>,
    sizeof: u32,
    alignment: u32,
}

impl ShapeLayout {
    /// Compute offsets for every field of `shape`, recursively.
    pub fn compile(shape: &Shape) -> ShapeLayout {
        let mut entries = IndexMap::with_capacity(shape.len());
        let mut offset = 0u32;
        let mut alignment = MIN_RECORD_ALIGNMENT;

        for field in shape.fields() {
            let entry = match &field.kind {
                FieldKind::Scalar(kind) => {
                    let at = pad(offset, kind.alignment());
                    offset = at + kind.stride();
                    alignment = alignment.max(kind.alignment());
                    LayoutEntry::Scalar {
                        kind: *kind,
                        offset: at,
                    }
                }
                FieldKind::Nested(inner) => {
                    let layout = ShapeLayout::compile(inner);
                    let at = pad(offset, layout.alignment);
                    offset = at + layout.sizeof;
                    alignment = alignment.max(layout.alignment);
                    LayoutEntry::Nested { offset: at, layout }
                }
            };
            entries.insert(field.name.clone(), entry);
        }

        ShapeLayout {
            entries,
            sizeof: pad(offset, alignment),
            alignment,
        }
    }

    /// Total aligned size in bytes.
    pub fn sizeof(&self) -> u32 {
        self.sizeof
    }

    /// Record alignment in bytes.
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// Look up a top-level entry.
    pub fn entry(&self, name: &str) -> Option<&LayoutEntry> {
        self.entries.get(name)
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &LayoutEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Produce a view of this layout rooted at `base`.
    ///
    /// Binding never touches the region; a null `base` only fails once a
    /// field is accessed.
    pub fn bind(&self, base: Address) -> StructView {
        let fields = self
            .entries
            .iter()
            .map(|(name, entry)| {
                let ptr = Address(base.0.wrapping_add(entry.offset()));
                let field = match entry {
                    LayoutEntry::Scalar { kind, offset } => {
                        ViewField::Scalar(ScalarField::new(name.clone(), *kind, *offset, ptr))
                    }
                    LayoutEntry::Nested { offset, layout } => {
                        ViewField::Nested(layout.bind(ptr).with_offset(*offset))
                    }
                };
                (name.clone(), field)
            })
            .collect();
        StructView::new(base, 0, self.sizeof, fields)
    }
}
