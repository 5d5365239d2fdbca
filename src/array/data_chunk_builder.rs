// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use itertools::Itertools;

use super::{ArrayBuilderImpl, DataChunk};
use crate::types::{DataType, DataValue};

/// A builder that collects rows into a [`DataChunk`].
pub struct DataChunkBuilder {
    array_builders: Vec<ArrayBuilderImpl>,
    size: usize,
}

impl DataChunkBuilder {
    pub fn new<'a>(data_types: impl IntoIterator<Item = &'a DataType>, capacity: usize) -> Self {
        let array_builders = data_types
            .into_iter()
            .map(|ty| ArrayBuilderImpl::with_capacity(capacity, ty))
            .collect();
        DataChunkBuilder {
            array_builders,
            size: 0,
        }
    }

    /// Push a row into the builder.
    ///
    /// The row must contain one value per column.
    pub fn push_row(&mut self, row: impl IntoIterator<Item = DataValue>) {
        self.array_builders
            .iter_mut()
            .zip_eq(row)
            .for_each(|(builder, v)| builder.push(&v));
        self.size += 1;
    }

    /// Number of rows pushed so far.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Generate a [`DataChunk`] with the pushed rows.
    ///
    /// Returns `None` if no row was pushed.
    #[must_use]
    pub fn finish(self) -> Option<DataChunk> {
        if self.size == 0 {
            return None;
        }
        Some(self.array_builders.into_iter().map(|b| b.finish()).collect())
    }
}
