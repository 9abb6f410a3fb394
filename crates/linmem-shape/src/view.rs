//! Live views over records in the region.
//!
//! A [`StructView`] holds addresses, never values. Every getter opens a
//! fresh cursor at the field's address and decodes whatever is there
//! now, so a view stays correct while the guest keeps writing.

use indexmap::IndexMap;
use linmem_core::{Address, MemoryError, Scalar, ScalarKind, ShapeError, Value};
use linmem_region::{Cursor, CursorMut, Region};

use crate::layout::ShapeLayout;
use crate::shape::Shape;

/// Compile `shape` and bind it to `base` in one step.
///
/// Prefer [`ShapeLayout::compile`] + [`ShapeLayout::bind`] when the
/// same shape is viewed at many addresses.
pub fn build_view(shape: &Shape, base: Address) -> StructView {
    ShapeLayout::compile(shape).bind(base)
}

/// A scalar field bound to an absolute address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarField {
    name: String,
    kind: ScalarKind,
    offset: u32,
    ptr: Address,
}

impl ScalarField {
    pub(crate) fn new(name: String, kind: ScalarKind, offset: u32, ptr: Address) -> Self {
        Self {
            name,
            kind,
            offset,
            ptr,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar kind of the slot.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Offset relative to the enclosing record.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Absolute address.
    pub fn ptr(&self) -> Address {
        self.ptr
    }

    fn check<T: Scalar>(&self) -> Result<(), MemoryError> {
        if T::KIND != self.kind {
            return Err(MemoryError::TypeMismatch {
                expected: self.kind,
                found: T::KIND,
            });
        }
        Ok(())
    }

    /// Read the current value.
    pub fn get_value(&self, region: &Region) -> Result<Value, MemoryError> {
        Cursor::new(region, self.ptr)?.shift_value(self.kind)
    }

    /// Read the current value as `T`, which must match the slot's kind.
    pub fn get<T: Scalar>(&self, region: &Region) -> Result<T, MemoryError> {
        self.check::<T>()?;
        Cursor::new(region, self.ptr)?.shift::<T>()
    }

    /// Overwrite the slot. The value's kind must match.
    pub fn set_value(&self, region: &mut Region, value: Value) -> Result<(), MemoryError> {
        if value.kind() != self.kind {
            return Err(MemoryError::TypeMismatch {
                expected: self.kind,
                found: value.kind(),
            });
        }
        CursorMut::new(region, self.ptr)?.put_value(value).map(|_| ())
    }

    /// Overwrite the slot with a `T`, which must match the slot's kind.
    pub fn set<T: Scalar>(&self, region: &mut Region, value: T) -> Result<(), MemoryError> {
        self.check::<T>()?;
        CursorMut::new(region, self.ptr)?.put(value).map(|_| ())
    }
}

/// One member of a [`StructView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewField {
    /// A scalar slot.
    Scalar(ScalarField),
    /// An inline record.
    Nested(StructView),
}

impl ViewField {
    /// Offset relative to the enclosing record.
    pub fn offset(&self) -> u32 {
        match self {
            Self::Scalar(f) => f.offset(),
            Self::Nested(v) => v.offset,
        }
    }

    /// Absolute address.
    pub fn ptr(&self) -> Address {
        match self {
            Self::Scalar(f) => f.ptr(),
            Self::Nested(v) => v.ptr(),
        }
    }
}

/// A record bound to a base address.
///
/// The set of fields is fixed at construction. Field values are not
/// cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructView {
    ptr: Address,
    offset: u32,
    sizeof: u32,
    fields: IndexMap<String, ViewField>,
}

impl StructView {
    pub(crate) fn new(
        ptr: Address,
        offset: u32,
        sizeof: u32,
        fields: IndexMap<String, ViewField>,
    ) -> Self {
        Self {
            ptr,
            offset,
            sizeof,
            fields,
        }
    }

    pub(crate) fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Base address of the record.
    pub fn ptr(&self) -> Address {
        self.ptr
    }

    /// Total aligned size in bytes.
    pub fn sizeof(&self) -> u32 {
        self.sizeof
    }

    /// Offset within the enclosing record; `0` for a root view.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Top-level field by name.
    pub fn field(&self, name: &str) -> Option<&ViewField> {
        self.fields.get(name)
    }

    /// Top-level fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ViewField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn resolve(&self, path: &str) -> Result<&ViewField, ShapeError> {
        let missing = || ShapeError::NoSuchField {
            path: path.to_string(),
        };
        let mut segments = path.split('.');
        let first = segments.next().ok_or_else(missing)?;
        let mut current = self.fields.get(first).ok_or_else(missing)?;
        for segment in segments {
            let ViewField::Nested(view) = current else {
                return Err(missing());
            };
            current = view.fields.get(segment).ok_or_else(missing)?;
        }
        Ok(current)
    }

    /// Scalar field at a dotted path such as `"inputs.len"`.
    pub fn scalar(&self, path: &str) -> Result<&ScalarField, ShapeError> {
        match self.resolve(path)? {
            ViewField::Scalar(f) => Ok(f),
            ViewField::Nested(_) => Err(ShapeError::NoSuchField {
                path: path.to_string(),
            }),
        }
    }

    /// Nested record at a dotted path such as `"name_sv"`.
    pub fn nested(&self, path: &str) -> Result<&StructView, ShapeError> {
        match self.resolve(path)? {
            ViewField::Nested(v) => Ok(v),
            ViewField::Scalar(_) => Err(ShapeError::NoSuchField {
                path: path.to_string(),
            }),
        }
    }

    /// Read every scalar, depth first, keyed by dotted path.
    pub fn snapshot(&self, region: &Region) -> Result<Vec<(String, Value)>, MemoryError> {
        let mut out = Vec::new();
        self.collect_into("", region, &mut out)?;
        Ok(out)
    }

    fn collect_into(
        &self,
        prefix: &str,
        region: &Region,
        out: &mut Vec<(String, Value)>,
    ) -> Result<(), MemoryError> {
        for (name, field) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match field {
                ViewField::Scalar(f) => out.push((path, f.get_value(region)?)),
                ViewField::Nested(v) => v.collect_into(&path, region, out)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linmem_region::RegionConfig;

    const BASE: Address = Address(128);

    fn region() -> Region {
        let config = RegionConfig {
            page_size: 1024,
            max_pages: 1,
            alignment: 8,
        };
        Region::new(&config, 1).unwrap()
    }

    fn sample() -> Shape {
        let sv = Shape::from_tags([("data", "ptr"), ("len", "size_t")]).unwrap();
        Shape::builder()
            .tagged("a", "bool")
            .tagged("b", "int32")
            .nested("sv", sv)
            .tagged("c", "double")
            .build()
            .unwrap()
    }

    #[test]
    fn fields_report_offset_and_ptr() {
        let view = build_view(&sample(), BASE);
        assert_eq!(view.ptr(), BASE);
        let b = view.scalar("b").unwrap();
        assert_eq!(b.offset(), 4);
        assert_eq!(b.ptr(), Address(BASE.0 + 4));
        let len = view.scalar("sv.len").unwrap();
        assert_eq!(len.offset(), 4);
        assert_eq!(len.ptr(), Address(BASE.0 + 12));
        assert_eq!(view.nested("sv").unwrap().offset(), 8);
        assert_eq!(view.scalar("c").unwrap().offset(), 16);
        assert_eq!(view.sizeof(), 24);
    }

    #[test]
    fn getters_see_later_writes() {
        let mut region = region();
        let view = build_view(&sample(), BASE);
        let b = view.scalar("b").unwrap();
        assert_eq!(b.get::<i32>(&region).unwrap(), 0);
        region.set::<i32>(b.ptr(), 41).unwrap();
        assert_eq!(b.get::<i32>(&region).unwrap(), 41);
    }

    #[test]
    fn setter_writes_through() {
        let mut region = region();
        let view = build_view(&sample(), BASE);
        view.scalar("c").unwrap().set(&mut region, 2.75f64).unwrap();
        assert_eq!(region.get::<f64>(Address(BASE.0 + 16)).unwrap(), 2.75);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let mut region = region();
        let view = build_view(&sample(), BASE);
        let a = view.scalar("a").unwrap();
        assert_eq!(
            a.set_value(&mut region, Value::Int32(1)),
            Err(MemoryError::TypeMismatch {
                expected: ScalarKind::Bool,
                found: ScalarKind::Int32
            })
        );
        assert!(a.get::<u32>(&region).is_err());
    }

    #[test]
    fn null_view_fails_on_access() {
        let region = region();
        let view = build_view(&sample(), Address::NULL);
        assert!(matches!(
            view.scalar("a").unwrap().get_value(&region),
            Err(MemoryError::NullAccess { .. })
        ));
    }

    #[test]
    fn bad_paths_are_reported() {
        let view = build_view(&sample(), BASE);
        for path in ["nope", "sv.nope", "a.b", "sv", ""] {
            assert_eq!(
                view.scalar(path),
                Err(ShapeError::NoSuchField { path: path.into() })
            );
        }
        assert!(view.nested("b").is_err());
    }

    #[test]
    fn snapshot_walks_depth_first() {
        let mut region = region();
        let view = build_view(&sample(), BASE);
        view.scalar("sv.len").unwrap().set(&mut region, 7u32).unwrap();
        let snap = view.snapshot(&region).unwrap();
        let paths: Vec<_> = snap.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, ["a", "b", "sv.data", "sv.len", "c"]);
        assert_eq!(snap[3].1, Value::Uint32(7));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_kind_round_trips_through_a_view(
                i in any::<i8>(),
                u in any::<u8>(),
                big in any::<u64>(),
                neg in any::<i64>(),
                f in -1.0e6f32..1.0e6,
                flag in any::<bool>(),
                word in any::<i32>(),
                addr in any::<u32>(),
                d in any::<f64>().prop_filter("NaN never compares equal", |d| !d.is_nan()),
            ) {
                let shape = Shape::from_tags([
                    ("i", "int8"), ("u", "uint8"), ("flag", "bool"),
                    ("big", "uint64"), ("neg", "int64"), ("f", "float"),
                    ("word", "int"), ("addr", "ptr"), ("d", "double"),
                ]).unwrap();
                let mut region = region();
                let view = build_view(&shape, BASE);
                let values = [
                    ("i", Value::Int8(i)), ("u", Value::Uint8(u)), ("flag", Value::Bool(flag)),
                    ("big", Value::Uint64(big)), ("neg", Value::Int64(neg)), ("f", Value::Float32(f)),
                    ("word", Value::Int32(word)), ("addr", Value::Uint32(addr)), ("d", Value::Float64(d)),
                ];
                for (name, v) in values {
                    view.scalar(name).unwrap().set_value(&mut region, v).unwrap();
                }
                for (name, v) in values {
                    prop_assert_eq!(view.scalar(name).unwrap().get_value(&region).unwrap(), v);
                }
            }
        }
    }
}
