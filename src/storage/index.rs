// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use crate::array::DataChunk;
use crate::types::RowId;

/// A secondary index maintained alongside the row store.
///
/// Index maintenance is eager: appends and updates notify every registered
/// index while table locks are held, so an index observes row placements in
/// order. Implementations must be internally synchronized.
pub trait Index: Send + Sync {
    /// Insert the given rows. Returns `false` if the insertion violates the
    /// index's own constraint (e.g. a unique index), in which case the
    /// caller undoes prior index insertions and fails the write.
    fn append(&self, chunk: &DataChunk, row_ids: &[RowId]) -> bool;

    /// Remove previously inserted rows. Used both to back out a failed
    /// append and to replace old entries during an update.
    fn delete(&self, chunk: &DataChunk, row_ids: &[RowId]);

    /// Whether an update touching the given column positions affects this
    /// index.
    fn is_affected(&self, column_ids: &[usize]) -> bool;
}
