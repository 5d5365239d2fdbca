// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use serde::{Deserialize, Serialize};

use crate::array::ArrayImpl;
use crate::types::DataValue;

/// Append-only per-column statistics, folded in at write time.
///
/// Updates and deletes do not revise min/max, so the bounds are an
/// over-approximation of the live data, which is the useful direction for
/// pruning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    row_count: usize,
    null_count: usize,
    min: DataValue,
    max: DataValue,
}

impl ColumnStatistics {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Minimum non-null value seen, or null if none yet.
    pub fn min(&self) -> &DataValue {
        &self.min
    }

    /// Maximum non-null value seen, or null if none yet.
    pub fn max(&self) -> &DataValue {
        &self.max
    }

    /// Fold one written batch into the statistics.
    pub fn update(&mut self, array: &ArrayImpl) {
        self.row_count += array.len();
        for i in 0..array.len() {
            let value = array.value_at(i);
            if value.is_null() {
                self.null_count += 1;
                continue;
            }
            if self.min.is_null() || value < self.min {
                self.min = value.clone();
            }
            if self.max.is_null() || value > self.max {
                self.max = value;
            }
        }
    }
}
