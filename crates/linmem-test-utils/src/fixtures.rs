//! Record shapes of the reference guest.

use linmem_core::{ScalarKind, ShapeError};
use linmem_shape::Shape;

/// `{ T *items; size_t len; size_t cap; }`
pub fn list_shape() -> Shape {
    list_shape_with(&[]).expect("list shape is valid")
}

/// A list header followed by extra scalar fields.
pub fn list_shape_with(extra: &[(&str, ScalarKind)]) -> Result<Shape, ShapeError> {
    extra
        .iter()
        .fold(
            Shape::builder()
                .tagged("items", "ptr")
                .tagged("len", "size_t")
                .tagged("cap", "size_t"),
            |b, (name, kind)| b.scalar(name, *kind),
        )
        .build()
}

/// `{ const char *data; size_t len; }`
pub fn string_view_shape() -> Shape {
    Shape::from_tags([("data", "ptr"), ("len", "size_t")]).expect("string view shape is valid")
}

/// A procedure: a token list, its name, and input and output kind lists.
pub fn proc_shape() -> Shape {
    Shape::builder()
        .tagged("items", "ptr")
        .tagged("len", "size_t")
        .tagged("cap", "size_t")
        .nested("name_sv", string_view_shape())
        .nested("inputs", list_shape())
        .nested("outputs", list_shape())
        .build()
        .expect("proc shape is valid")
}

/// A lexer token: kind, position, text, and numeric value.
pub fn token_shape() -> Shape {
    Shape::builder()
        .tagged("kind", "enum")
        .tagged("line", "size_t")
        .tagged("column", "size_t")
        .nested("string", string_view_shape())
        .tagged("number", "double")
        .build()
        .expect("token shape is valid")
}
