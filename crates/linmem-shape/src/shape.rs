//! Shape descriptions and their builder.

use indexmap::IndexSet;
use linmem_core::{ScalarKind, ShapeError};

/// Field names that would shadow the accessors every view exposes.
pub const RESERVED_NAMES: [&str; 2] = ["ptr", "sizeof"];

/// The type of one field: a scalar or a nested record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A single scalar slot.
    Scalar(ScalarKind),
    /// An inline record laid out with its own alignment.
    Nested(Shape),
}

/// A named field in a [`Shape`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unique within its shape level.
    pub name: String,
    /// Field type.
    pub kind: FieldKind,
}

/// An ordered, validated description of a guest record.
///
/// Construct with [`Shape::builder`] or [`Shape::from_tags`]. A built
/// shape is non-empty, has unique field names at every level, and uses
/// no reserved names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    fields: Vec<FieldSpec>,
}

impl Shape {
    /// Start an empty builder.
    pub fn builder() -> ShapeBuilder {
        ShapeBuilder::default()
    }

    /// Build a flat shape from `(name, tag)` pairs, where tags are
    /// resolved by [`ScalarKind::from_tag`].
    pub fn from_tags<'a, I>(fields: I) -> Result<Shape, ShapeError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        fields
            .into_iter()
            .fold(Shape::builder(), |b, (name, tag)| b.tagged(name, tag))
            .build()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a built shape.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Incremental [`Shape`] constructor.
///
/// Errors are latched: the first invalid call is remembered and
/// reported by [`build`](Self::build), so a chain of calls needs only
/// one `?`.
#[derive(Debug, Default)]
pub struct ShapeBuilder {
    fields: Vec<FieldSpec>,
    names: IndexSet<String>,
    error: Option<ShapeError>,
}

impl ShapeBuilder {
    fn push(mut self, name: &str, kind: FieldKind) -> Self {
        if self.error.is_some() {
            return self;
        }
        if RESERVED_NAMES.contains(&name) {
            self.error = Some(ShapeError::ReservedName {
                name: name.to_string(),
            });
            return self;
        }
        if !self.names.insert(name.to_string()) {
            self.error = Some(ShapeError::DuplicateField {
                name: name.to_string(),
            });
            return self;
        }
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
        });
        self
    }

    /// Append a scalar field.
    pub fn scalar(self, name: &str, kind: ScalarKind) -> Self {
        self.push(name, FieldKind::Scalar(kind))
    }

    /// Append a scalar field by textual tag (`"size_t"`, `"double"`, ...).
    pub fn tagged(mut self, name: &str, tag: &str) -> Self {
        match tag.parse::<ScalarKind>() {
            Ok(kind) => self.scalar(name, kind),
            Err(e) => {
                self.error.get_or_insert(e);
                self
            }
        }
    }

    /// Append an inline nested record.
    pub fn nested(self, name: &str, shape: Shape) -> Self {
        self.push(name, FieldKind::Nested(shape))
    }

    /// Finish the shape.
    pub fn build(self) -> Result<Shape, ShapeError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.fields.is_empty() {
            return Err(ShapeError::EmptyShape);
        }
        Ok(Shape {
            fields: self.fields,
        })
    }
}
