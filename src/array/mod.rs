// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! In-memory column batches exchanged with the table store.
//!
//! An [`ArrayImpl`] is one column of values, an [`ArrayBuilderImpl`] builds
//! one, and a [`DataChunk`] is a horizontal batch of equal-length arrays.
//! Only the five types the storage layer persists are represented here.

use serde::{Deserialize, Serialize};

use crate::types::{DataType, DataValue, F64};

mod data_chunk;
mod data_chunk_builder;
mod iterator;
mod primitive_array;
mod utf8_array;

pub use self::data_chunk::*;
pub use self::data_chunk_builder::*;
pub use self::iterator::ArrayIter;
pub use self::primitive_array::*;
pub use self::utf8_array::*;

/// A trait over all array builders.
pub trait ArrayBuilder {
    /// Corresponding array type of this builder.
    type Array: Array<Builder = Self>;

    /// Create a new builder with `capacity`.
    fn with_capacity(capacity: usize) -> Self;

    /// Append a value to the builder.
    fn push(&mut self, value: Option<&<Self::Array as Array>::Item>);

    /// Append a whole array to the builder.
    fn append(&mut self, other: &Self::Array);

    /// Finish building and return the array.
    fn finish(self) -> Self::Array;
}

/// A trait over all arrays.
pub trait Array: Sized + Send + Sync + 'static {
    /// Corresponding builder of this array.
    type Builder: ArrayBuilder<Array = Self>;

    /// Type of the elements in the array.
    type Item: ?Sized;

    /// Retrieve a reference to the value at `idx`, or `None` if it is null.
    fn get(&self, idx: usize) -> Option<&Self::Item>;

    /// Number of elements in the array.
    fn len(&self) -> usize;

    /// Whether the array is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an iterator over the array.
    fn iter(&self) -> ArrayIter<'_, Self> {
        ArrayIter::new(self)
    }
}

pub type BoolArray = PrimitiveArray<bool>;
pub type I32Array = PrimitiveArray<i32>;
pub type I64Array = PrimitiveArray<i64>;
pub type F64Array = PrimitiveArray<F64>;

pub type BoolArrayBuilder = PrimitiveArrayBuilder<bool>;
pub type I32ArrayBuilder = PrimitiveArrayBuilder<i32>;
pub type I64ArrayBuilder = PrimitiveArrayBuilder<i64>;
pub type F64ArrayBuilder = PrimitiveArrayBuilder<F64>;

/// Embeds all possible arrays in the `array` module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayImpl {
    Bool(BoolArray),
    Int32(I32Array),
    Int64(I64Array),
    Float64(F64Array),
    Utf8(Utf8Array),
}

/// Embeds all possible array builders in the `array` module.
pub enum ArrayBuilderImpl {
    Bool(BoolArrayBuilder),
    Int32(I32ArrayBuilder),
    Int64(I64ArrayBuilder),
    Float64(F64ArrayBuilder),
    Utf8(Utf8ArrayBuilder),
}

macro_rules! impl_into {
    ($x:ty, $y:ident) => {
        impl From<$x> for ArrayImpl {
            fn from(array: $x) -> Self {
                Self::$y(array)
            }
        }
    };
}

impl_into! { BoolArray, Bool }
impl_into! { I32Array, Int32 }
impl_into! { I64Array, Int64 }
impl_into! { F64Array, Float64 }
impl_into! { Utf8Array, Utf8 }

impl ArrayImpl {
    /// Number of elements in the array.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(a) => a.len(),
            Self::Int32(a) => a.len(),
            Self::Int64(a) => a.len(),
            Self::Float64(a) => a.len(),
            Self::Utf8(a) => a.len(),
        }
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type of the elements in the array.
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::String,
        }
    }

    /// Get the value at `idx` as a [`DataValue`].
    pub fn value_at(&self, idx: usize) -> DataValue {
        match self {
            Self::Bool(a) => a.get(idx).map_or(DataValue::Null, |&v| DataValue::Bool(v)),
            Self::Int32(a) => a.get(idx).map_or(DataValue::Null, |&v| DataValue::Int32(v)),
            Self::Int64(a) => a.get(idx).map_or(DataValue::Null, |&v| DataValue::Int64(v)),
            Self::Float64(a) => a
                .get(idx)
                .map_or(DataValue::Null, |&v| DataValue::Float64(v)),
            Self::Utf8(a) => a
                .get(idx)
                .map_or(DataValue::Null, |v| DataValue::String(v.into())),
        }
    }

    /// Whether the array contains any null value.
    pub fn has_null(&self) -> bool {
        match self {
            Self::Bool(a) => a.has_null(),
            Self::Int32(a) => a.has_null(),
            Self::Int64(a) => a.has_null(),
            Self::Float64(a) => a.has_null(),
            Self::Utf8(a) => a.has_null(),
        }
    }

    /// Filter elements and create a new array.
    pub fn filter(&self, visibility: impl Iterator<Item = bool>) -> Self {
        match self {
            Self::Bool(a) => Self::Bool(a.filter(visibility)),
            Self::Int32(a) => Self::Int32(a.filter(visibility)),
            Self::Int64(a) => Self::Int64(a.filter(visibility)),
            Self::Float64(a) => Self::Float64(a.filter(visibility)),
            Self::Utf8(a) => Self::Utf8(a.filter(visibility)),
        }
    }
}

impl ArrayBuilderImpl {
    /// Create a new builder for the given type.
    pub fn with_capacity(capacity: usize, ty: &DataType) -> Self {
        match ty {
            DataType::Bool => Self::Bool(BoolArrayBuilder::with_capacity(capacity)),
            DataType::Int32 => Self::Int32(I32ArrayBuilder::with_capacity(capacity)),
            DataType::Int64 => Self::Int64(I64ArrayBuilder::with_capacity(capacity)),
            DataType::Float64 => Self::Float64(F64ArrayBuilder::with_capacity(capacity)),
            DataType::String => Self::Utf8(Utf8ArrayBuilder::with_capacity(capacity)),
        }
    }

    /// Append a [`DataValue`] to the builder.
    ///
    /// The value must be null or match the builder's type.
    pub fn push(&mut self, value: &DataValue) {
        match (self, value) {
            (Self::Bool(b), DataValue::Bool(v)) => b.push(Some(v)),
            (Self::Int32(b), DataValue::Int32(v)) => b.push(Some(v)),
            (Self::Int64(b), DataValue::Int64(v)) => b.push(Some(v)),
            (Self::Float64(b), DataValue::Float64(v)) => b.push(Some(v)),
            (Self::Utf8(b), DataValue::String(v)) => b.push(Some(v.as_str())),
            (Self::Bool(b), DataValue::Null) => b.push(None),
            (Self::Int32(b), DataValue::Null) => b.push(None),
            (Self::Int64(b), DataValue::Null) => b.push(None),
            (Self::Float64(b), DataValue::Null) => b.push(None),
            (Self::Utf8(b), DataValue::Null) => b.push(None),
            (b, v) => panic!("failed to push {v:?} into {} builder", b.datatype()),
        }
    }

    /// Append a whole array of the same type.
    pub fn append(&mut self, array: &ArrayImpl) {
        match (self, array) {
            (Self::Bool(b), ArrayImpl::Bool(a)) => b.append(a),
            (Self::Int32(b), ArrayImpl::Int32(a)) => b.append(a),
            (Self::Int64(b), ArrayImpl::Int64(a)) => b.append(a),
            (Self::Float64(b), ArrayImpl::Float64(a)) => b.append(a),
            (Self::Utf8(b), ArrayImpl::Utf8(a)) => b.append(a),
            (b, a) => panic!(
                "failed to append {} array to {} builder",
                a.datatype(),
                b.datatype()
            ),
        }
    }

    /// Type of the elements accepted by the builder.
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::String,
        }
    }

    /// Finish building and return the array.
    pub fn finish(self) -> ArrayImpl {
        match self {
            Self::Bool(b) => ArrayImpl::Bool(b.finish()),
            Self::Int32(b) => ArrayImpl::Int32(b.finish()),
            Self::Int64(b) => ArrayImpl::Int64(b.finish()),
            Self::Float64(b) => ArrayImpl::Float64(b.finish()),
            Self::Utf8(b) => ArrayImpl::Utf8(b.finish()),
        }
    }
}

impl FromIterator<DataValue> for ArrayBuilderImpl {
    /// Build from a non-empty iterator of values; the first non-null value
    /// decides the type, defaulting to `Int32` if all are null.
    fn from_iter<I: IntoIterator<Item = DataValue>>(iter: I) -> Self {
        let values: Vec<DataValue> = iter.into_iter().collect();
        let ty = values
            .iter()
            .find_map(|v| v.datatype())
            .unwrap_or(DataType::Int32);
        let mut builder = Self::with_capacity(values.len(), &ty);
        for v in &values {
            builder.push(v);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_roundtrip() {
        let values = vec![
            DataValue::Int32(1),
            DataValue::Null,
            DataValue::Int32(-3),
        ];
        let array = values.iter().cloned().collect::<ArrayBuilderImpl>().finish();
        assert_eq!(array.len(), 3);
        assert!(array.has_null());
        for (i, v) in values.iter().enumerate() {
            assert_eq!(&array.value_at(i), v);
        }
    }

    #[test]
    #[should_panic]
    fn push_type_mismatch() {
        let mut builder = ArrayBuilderImpl::with_capacity(1, &DataType::Int32);
        builder.push(&DataValue::String("oops".into()));
    }
}
