// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Chunk-at-a-time table scans.

use std::sync::Arc;

use super::chunk::{RowChunk, RowVersion};
use super::table::TableStore;
use super::{StorageError, StorageResult, SCAN_BATCH_SIZE};
use crate::array::{DataChunk, DataChunkBuilder};
use crate::transaction::{Transaction, TXN_ID_START};
use crate::types::{DataValue, RowId};

/// Cursor over a table's chunks.
///
/// The chunk list and the tail chunk's row count are captured at
/// initialization, so rows placed afterwards are outside the scan even if
/// the scan is still running when they land.
pub struct TableScanState {
    chunks: Vec<Arc<RowChunk>>,
    last_chunk_count: usize,
    chunk_idx: usize,
    offset: usize,
}

impl TableStore {
    pub fn init_scan(&self) -> TableScanState {
        let chunks = self.inner.chunks.lock().clone();
        let last_chunk_count = chunks.last().map_or(0, |c| c.inner.read().count);
        TableScanState {
            chunks,
            last_chunk_count,
            chunk_idx: 0,
            offset: 0,
        }
    }

    /// Produce the next batch of at most [`SCAN_BATCH_SIZE`] visible rows,
    /// or `None` when the scan is exhausted. Rows whose visible version is
    /// an older image are re-materialized into the output.
    pub fn scan(
        &self,
        txn: &Transaction,
        state: &mut TableScanState,
        column_ids: &[usize],
    ) -> StorageResult<Option<DataChunk>> {
        Ok(self
            .scan_inner(txn.id(), txn.snapshot(), state, column_ids)?
            .map(|(chunk, _)| chunk))
    }

    /// Scan the latest committed version of every row, regardless of any
    /// snapshot. Returns all batches with their row ids; used to populate a
    /// newly attached index.
    pub(crate) fn scan_committed(&self) -> StorageResult<Vec<(DataChunk, Vec<RowId>)>> {
        let column_ids: Vec<usize> = (0..self.catalog().column_count()).collect();
        let mut state = self.init_scan();
        let mut batches = Vec::new();
        while let Some(batch) = self.scan_inner(0, TXN_ID_START - 1, &mut state, &column_ids)? {
            batches.push(batch);
        }
        Ok(batches)
    }

    fn scan_inner(
        &self,
        txn_id: u64,
        snapshot: u64,
        state: &mut TableScanState,
        column_ids: &[usize],
    ) -> StorageResult<Option<(DataChunk, Vec<RowId>)>> {
        let datatypes = self.catalog().datatypes();
        for &col in column_ids {
            if col >= datatypes.len() {
                return Err(StorageError::InvalidColumn(col).into());
            }
        }
        loop {
            let Some(chunk) = state.chunks.get(state.chunk_idx).cloned() else {
                return Ok(None);
            };
            let guard = chunk.inner.read();
            let bound = if state.chunk_idx == state.chunks.len() - 1 {
                state.last_chunk_count
            } else {
                guard.count
            };
            if state.offset >= bound {
                drop(guard);
                state.chunk_idx += 1;
                state.offset = 0;
                continue;
            }
            let n = (bound - state.offset).min(SCAN_BATCH_SIZE);

            // One pass per column first, so each segment store lock is
            // taken once per batch.
            let mut columns_data: Vec<Vec<DataValue>> = Vec::with_capacity(column_ids.len());
            for &col in column_ids {
                let ty = datatypes[col];
                let store = self.inner.columns[col].read();
                let mut values = Vec::with_capacity(n);
                store.read_from(guard.columns[col], state.offset, n, |bytes| {
                    values.push(Self::decode_stored(ty, bytes, &guard.string_heap));
                });
                columns_data.push(values);
            }

            let mut builder =
                DataChunkBuilder::new(column_ids.iter().map(|&col| &datatypes[col]), n);
            let mut row_ids = Vec::with_capacity(n);
            for i in 0..n {
                let row = state.offset + i;
                match guard.resolve(row, txn_id, snapshot) {
                    RowVersion::Current => {
                        builder.push_row(columns_data.iter().map(|values| values[i].clone()));
                    }
                    RowVersion::Image(image) => {
                        builder.push_row(column_ids.iter().map(|&col| image[col].clone()));
                    }
                    RowVersion::Invisible => continue,
                }
                row_ids.push(chunk.start() + row as RowId);
            }
            state.offset += n;
            // All rows of the window may be invisible; move on to the next
            // window rather than ending the scan.
            if let Some(chunk) = builder.finish() {
                return Ok(Some((chunk, row_ids)));
            }
        }
    }
}
