// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use super::{Array, ArrayBuilder};

/// A collection of variable-length strings.
///
/// Values are packed back to back in `data`; `offset` has one more entry
/// than the array has elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utf8Array {
    offset: Vec<usize>,
    valid: BitVec,
    data: Vec<u8>,
}

impl Array for Utf8Array {
    type Item = str;
    type Builder = Utf8ArrayBuilder;

    fn get(&self, idx: usize) -> Option<&str> {
        if self.valid[idx] {
            let slice = &self.data[self.offset[idx]..self.offset[idx + 1]];
            // values only enter through `push(&str)`
            Some(std::str::from_utf8(slice).unwrap())
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.valid.len()
    }
}

impl Utf8Array {
    /// Whether the array contains any null value.
    pub fn has_null(&self) -> bool {
        !self.valid.all()
    }

    /// Filter elements and create a new array.
    pub fn filter(&self, visibility: impl Iterator<Item = bool>) -> Self {
        let mut builder = Utf8ArrayBuilder::with_capacity(self.len());
        for (idx, visible) in visibility.take(self.len()).enumerate() {
            if visible {
                builder.push(self.get(idx));
            }
        }
        builder.finish()
    }
}

/// A builder that constructs a [`Utf8Array`] from `Option<&str>`.
pub struct Utf8ArrayBuilder {
    offset: Vec<usize>,
    valid: BitVec,
    data: Vec<u8>,
}

impl ArrayBuilder for Utf8ArrayBuilder {
    type Array = Utf8Array;

    fn with_capacity(capacity: usize) -> Self {
        let mut offset = Vec::with_capacity(capacity + 1);
        offset.push(0);
        Self {
            offset,
            valid: BitVec::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, value: Option<&str>) {
        self.valid.push(value.is_some());
        if let Some(s) = value {
            self.data.extend_from_slice(s.as_bytes());
        }
        self.offset.push(self.data.len());
    }

    fn append(&mut self, other: &Utf8Array) {
        self.valid.extend_from_bitslice(&other.valid);
        self.data.extend_from_slice(&other.data);
        let start = *self.offset.last().unwrap();
        for other_offset in &other.offset[1..] {
            self.offset.push(other_offset + start);
        }
    }

    fn finish(self) -> Utf8Array {
        Utf8Array {
            offset: self.offset,
            valid: self.valid,
            data: self.data,
        }
    }
}

// Enable `collect()` an array from an iterator of `Option<S>`.
impl<S: AsRef<str>> FromIterator<Option<S>> for Utf8Array {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut builder = Utf8ArrayBuilder::with_capacity(iter.size_hint().0);
        for e in iter {
            builder.push(e.as_ref().map(|s| s.as_ref()));
        }
        builder.finish()
    }
}
