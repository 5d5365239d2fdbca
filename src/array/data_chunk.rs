// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ArrayImpl;
use crate::types::{DataType, Row};

/// A collection of equal-length arrays.
///
/// A chunk is a horizontal subset of table data: one array per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataChunk {
    arrays: SmallVec<[ArrayImpl; 16]>,
}

impl FromIterator<ArrayImpl> for DataChunk {
    fn from_iter<I: IntoIterator<Item = ArrayImpl>>(iter: I) -> Self {
        let arrays: SmallVec<[ArrayImpl; 16]> = iter.into_iter().collect();
        assert!(!arrays.is_empty());
        let cardinality = arrays[0].len();
        assert!(
            arrays.iter().map(|a| a.len()).all(|l| l == cardinality),
            "all arrays must have the same length"
        );
        DataChunk { arrays }
    }
}

impl DataChunk {
    /// Return the number of rows in the chunk.
    pub fn cardinality(&self) -> usize {
        self.arrays[0].len()
    }

    /// Return the number of columns in the chunk.
    pub fn column_count(&self) -> usize {
        self.arrays.len()
    }

    /// Get a reference to the array at `idx`.
    pub fn array_at(&self, idx: usize) -> &ArrayImpl {
        &self.arrays[idx]
    }

    /// Get all arrays.
    pub fn arrays(&self) -> &[ArrayImpl] {
        &self.arrays
    }

    /// The element types of the arrays, in column order.
    pub fn datatypes(&self) -> Vec<DataType> {
        self.arrays.iter().map(|a| a.datatype()).collect()
    }

    /// Materialize the row at `idx` as a vector of values.
    pub fn row_at(&self, idx: usize) -> Row {
        self.arrays.iter().map(|a| a.value_at(idx)).collect()
    }

    /// Filter rows and create a new chunk.
    pub fn filter(&self, visibility: impl Iterator<Item = bool> + Clone) -> Self {
        let arrays = self
            .arrays
            .iter()
            .map(|a| a.filter(visibility.clone()))
            .collect();
        DataChunk { arrays }
    }
}

pub type DataChunkRef = Arc<DataChunk>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::I32Array;
    use crate::types::DataValue;

    #[test]
    fn rows_and_filter() {
        let chunk: DataChunk = [
            ArrayImpl::Int32((0..4).collect::<I32Array>()),
            ArrayImpl::Int32((4..8).collect::<I32Array>()),
        ]
        .into_iter()
        .collect();
        assert_eq!(chunk.cardinality(), 4);
        assert_eq!(
            chunk.row_at(1),
            vec![DataValue::Int32(1), DataValue::Int32(5)]
        );
        let filtered = chunk.filter([true, false, false, true].into_iter());
        assert_eq!(filtered.cardinality(), 2);
        assert_eq!(filtered.array_at(0).value_at(1), DataValue::Int32(3));
    }
}
