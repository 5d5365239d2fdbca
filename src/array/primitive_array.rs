// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use super::{Array, ArrayBuilder};
use crate::types::NativeType;

/// A collection of primitive types, such as `i32`, `F64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveArray<T: NativeType> {
    valid: BitVec,
    data: Vec<T>,
}

// Enable `collect()` an array from an iterator of `Option<T>`.
impl<T: NativeType> FromIterator<Option<T>> for PrimitiveArray<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut builder = <Self as Array>::Builder::with_capacity(iter.size_hint().0);
        for e in iter {
            builder.push(e.as_ref());
        }
        builder.finish()
    }
}

// Enable `collect()` an array from an iterator of `T`.
impl<T: NativeType> FromIterator<T> for PrimitiveArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().map(Some).collect()
    }
}

impl<T: NativeType> Array for PrimitiveArray<T> {
    type Item = T;
    type Builder = PrimitiveArrayBuilder<T>;

    fn get(&self, idx: usize) -> Option<&T> {
        self.valid[idx].then(|| &self.data[idx])
    }

    fn len(&self) -> usize {
        self.valid.len()
    }
}

impl<T: NativeType> PrimitiveArray<T> {
    /// Whether the array contains any null value.
    pub fn has_null(&self) -> bool {
        !self.valid.all()
    }

    /// Filter elements and create a new array.
    pub fn filter(&self, visibility: impl Iterator<Item = bool>) -> Self {
        let mut builder = PrimitiveArrayBuilder::with_capacity(self.len());
        for (idx, visible) in visibility.take(self.len()).enumerate() {
            if visible {
                builder.push(self.get(idx));
            }
        }
        builder.finish()
    }
}

/// A builder that constructs a [`PrimitiveArray`] from `Option<T>`.
pub struct PrimitiveArrayBuilder<T: NativeType> {
    valid: BitVec,
    data: Vec<T>,
}

impl<T: NativeType> ArrayBuilder for PrimitiveArrayBuilder<T> {
    type Array = PrimitiveArray<T>;

    fn with_capacity(capacity: usize) -> Self {
        Self {
            valid: BitVec::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, value: Option<&T>) {
        self.valid.push(value.is_some());
        self.data.push(value.copied().unwrap_or_default());
    }

    fn append(&mut self, other: &PrimitiveArray<T>) {
        self.valid.extend_from_bitslice(&other.valid);
        self.data.extend_from_slice(&other.data);
    }

    fn finish(self) -> PrimitiveArray<T> {
        PrimitiveArray {
            valid: self.valid,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_get() {
        let array: PrimitiveArray<i32> =
            (0..1000).map(|x| if x % 2 == 0 { None } else { Some(x) }).collect();
        assert_eq!(array.len(), 1000);
        assert_eq!(array.get(0), None);
        assert_eq!(array.get(1), Some(&1));
        assert!(array.has_null());
    }

    #[test]
    fn filter() {
        let array: PrimitiveArray<i32> = (0..10).collect();
        let filtered = array.filter((0..10).map(|x| x < 3));
        assert_eq!(
            filtered.iter().map(|x| x.copied()).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(2)]
        );
    }
}
