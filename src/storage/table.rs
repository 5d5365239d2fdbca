// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! The chunked, versioned store behind one table.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use parking_lot::{Mutex, RwLock};

use super::chunk::{RowChunk, RowChunkInner, RowVersion, StagedStrings, StringHeap};
use super::index::Index;
use super::segment::{
    decode_element, encode_element, encode_string_handle, ColumnSegmentStore, StoredValue,
    NULL_STRING_HANDLE,
};
use super::statistics::ColumnStatistics;
use super::undo::{UndoEntry, UndoKind};
use super::{StorageError, StorageOptions, StorageResult, TracedStorageError};
use crate::array::{ArrayBuilderImpl, ArrayImpl, DataChunk};
use crate::catalog::{Constraint, TableCatalog};
use crate::transaction::Transaction;
use crate::types::{DataType, DataValue, Row, RowId, TableId};

pub(crate) struct TableInfo {
    catalog: TableCatalog,
    options: StorageOptions,
}

/// A table's row store. Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct TableStore {
    pub(crate) info: Arc<TableInfo>,
    pub(crate) inner: Arc<TableStoreInner>,
}

pub(crate) struct TableStoreInner {
    /// The chunk sequence. This lock is the tree lock: append holds it for
    /// the whole placement so row id assignment and chunk creation are
    /// serialized.
    pub chunks: Mutex<Vec<Arc<RowChunk>>>,
    /// One segment store per column, each individually locked. Always
    /// acquired after any chunk lock, never before.
    pub columns: Vec<RwLock<ColumnSegmentStore>>,
    statistics: RwLock<Vec<ColumnStatistics>>,
    indexes: RwLock<Vec<Arc<dyn Index>>>,
    /// Table-wide string handle allocator.
    next_string_id: AtomicU64,
    /// Chunk resolutions performed on behalf of point operations; fetch
    /// takes exactly one chunk lock per resolution.
    #[cfg(test)]
    chunk_lookups: AtomicU64,
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore").finish_non_exhaustive()
    }
}

impl TableStore {
    pub(crate) fn new(catalog: TableCatalog, options: StorageOptions) -> Self {
        let columns = catalog
            .datatypes()
            .iter()
            .map(|ty| RwLock::new(ColumnSegmentStore::new(*ty, options.block_size)))
            .collect();
        let statistics = catalog
            .columns()
            .iter()
            .map(|_| ColumnStatistics::default())
            .collect();
        let table = TableStore {
            info: Arc::new(TableInfo { catalog, options }),
            inner: Arc::new(TableStoreInner {
                chunks: Mutex::new(Vec::new()),
                columns,
                statistics: RwLock::new(statistics),
                indexes: RwLock::new(Vec::new()),
                next_string_id: AtomicU64::new(0),
                #[cfg(test)]
                chunk_lookups: AtomicU64::new(0),
            }),
        };
        let mut chunks = table.inner.chunks.lock();
        table.append_row_chunk(&mut chunks, 0);
        drop(chunks);
        table
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.info.catalog
    }

    pub fn id(&self) -> TableId {
        self.info.catalog.id()
    }

    pub fn name(&self) -> &str {
        self.info.catalog.name()
    }

    /// Total number of rows placed, live or not.
    pub fn row_count(&self) -> usize {
        let chunks = self.inner.chunks.lock();
        chunks.iter().map(|c| c.inner.read().count).sum()
    }

    /// Row count of each chunk in sequence order.
    pub fn chunk_sizes(&self) -> Vec<usize> {
        let chunks = self.inner.chunks.lock();
        chunks.iter().map(|c| c.inner.read().count).collect()
    }

    pub fn statistics(&self) -> Vec<ColumnStatistics> {
        self.inner.statistics.read().clone()
    }

    /// Attach a secondary index, populating it from the latest committed
    /// version of every row. Concurrent DDL is the caller's problem.
    pub fn add_index(&self, index: Arc<dyn Index>) -> StorageResult<()> {
        let batches = self.scan_committed()?;
        for (i, (chunk, row_ids)) in batches.iter().enumerate() {
            if !index.append(chunk, row_ids) {
                for (chunk, row_ids) in &batches[..i] {
                    index.delete(chunk, row_ids);
                }
                return Err(TracedStorageError::constraint_violation(
                    "existing data violates the new index's constraint",
                ));
            }
        }
        self.inner.indexes.write().push(index);
        Ok(())
    }

    /// Append a batch of rows.
    ///
    /// Row ids are assigned contiguously from the current tail. The batch
    /// spills over chunk boundaries: the tail chunk is filled to capacity
    /// and new chunks are opened for the remainder.
    pub fn append(&self, txn: &mut Transaction, chunk: DataChunk) -> StorageResult<()> {
        if chunk.column_count() != self.info.catalog.column_count()
            || chunk.datatypes() != self.info.catalog.datatypes()
        {
            return Err(StorageError::SchemaMismatch.into());
        }
        let cardinality = chunk.cardinality();
        if cardinality == 0 {
            return Ok(());
        }
        self.verify_append_constraints(&chunk)?;
        let mut staged = self.stage_strings(&chunk);

        let mut chunks = self.inner.chunks.lock();
        let mut tail = chunks.last().unwrap().clone();
        let mut guard = tail.inner.write();
        let row_start = tail.start() + guard.count as RowId;

        // Index maintenance comes first so a failure leaves the column
        // storage untouched.
        let row_ids: Vec<RowId> = (row_start..row_start + cardinality as RowId).collect();
        let indexes = self.inner.indexes.read();
        for (i, index) in indexes.iter().enumerate() {
            if !index.append(&chunk, &row_ids) {
                for earlier in &indexes[..i] {
                    earlier.delete(&chunk, &row_ids);
                }
                return Err(TracedStorageError::constraint_violation(
                    "index constraint violated on append",
                ));
            }
        }
        drop(indexes);

        let mut statistics = self.inner.statistics.write();
        for (stat, array) in statistics.iter_mut().zip_eq(chunk.arrays()) {
            stat.update(array);
        }
        drop(statistics);

        let capacity = self.info.options.chunk_capacity;
        let datatypes = self.info.catalog.datatypes();
        let mut offset = 0;
        while offset < cardinality {
            let to_copy = (capacity - guard.count).min(cardinality - offset);
            if to_copy == 0 {
                drop(guard);
                let start = tail.start() + capacity as RowId;
                tail = self.append_row_chunk(&mut chunks, start);
                guard = tail.inner.write();
                continue;
            }
            for r in 0..to_copy {
                let row = guard.count + r;
                let entry = guard.push_entry(row, txn.id(), None);
                txn.undo_mut().push(UndoEntry {
                    kind: UndoKind::Insert,
                    table: self.clone(),
                    chunk: tail.clone(),
                    row,
                    entry,
                });
            }
            for (idx, array) in chunk.arrays().iter().enumerate() {
                let ty = datatypes[idx];
                let mut buf = Vec::with_capacity(to_copy * ty.data_len());
                match &staged.handles[idx] {
                    Some(handles) => {
                        for handle in &handles[offset..offset + to_copy] {
                            encode_string_handle(&mut buf, *handle);
                        }
                    }
                    None => {
                        for r in offset..offset + to_copy {
                            encode_element(&mut buf, ty, &array.value_at(r));
                        }
                    }
                }
                self.inner.columns[idx].write().append(&buf);
            }
            staged.adopt_rows(&mut guard.string_heap, offset..offset + to_copy);
            guard.count += to_copy;
            offset += to_copy;
        }
        Ok(())
    }

    /// Delete rows by id. All ids must address the chunk of the first id.
    ///
    /// The delete applies to the newest committed state, not the caller's
    /// snapshot: after the conflict check it goes through even when a newer
    /// committed version postdates the snapshot. Rows whose deletion flag
    /// is already set are skipped.
    pub fn delete(&self, txn: &mut Transaction, row_ids: &[RowId]) -> StorageResult<()> {
        if row_ids.is_empty() {
            return Ok(());
        }
        let chunk = self.chunk_for_row(row_ids[0])?;
        let mut guard = chunk.inner.write();
        let rows = Self::local_rows(&chunk, &guard, row_ids)?;

        // Conflict pre-pass: no flag is set until every row is clear.
        for &row in &rows {
            if guard.write_conflict(row, txn.id()) {
                return Err(TracedStorageError::conflict("delete"));
            }
        }
        for row in rows {
            if guard.is_deleted(row) {
                continue;
            }
            let image = self.read_row(&guard, chunk.start() + row as RowId);
            let entry = guard.push_entry(row, txn.id(), Some(image));
            guard.set_deleted(row, true);
            txn.undo_mut().push(UndoEntry {
                kind: UndoKind::Delete,
                table: self.clone(),
                chunk: chunk.clone(),
                row,
                entry,
            });
        }
        Ok(())
    }

    /// Update the given columns of the given rows in place. All ids must
    /// address the chunk of the first id; `updates` holds one array per
    /// entry of `column_ids`, with one row per entry of `row_ids`.
    pub fn update(
        &self,
        txn: &mut Transaction,
        row_ids: &[RowId],
        column_ids: &[usize],
        updates: &DataChunk,
    ) -> StorageResult<()> {
        if updates.column_count() != column_ids.len()
            || updates.cardinality() != row_ids.len()
            || column_ids.iter().duplicates().next().is_some()
        {
            return Err(StorageError::SchemaMismatch.into());
        }
        let datatypes = self.info.catalog.datatypes();
        for (&col, array) in column_ids.iter().zip_eq(updates.arrays()) {
            if col >= datatypes.len() {
                return Err(StorageError::InvalidColumn(col).into());
            }
            if array.datatype() != datatypes[col] {
                return Err(StorageError::SchemaMismatch.into());
            }
        }
        if row_ids.is_empty() {
            return Ok(());
        }
        self.verify_update_constraints(column_ids, updates)?;
        let mut staged = self.stage_strings(updates);

        let chunk = self.chunk_for_row(row_ids[0])?;
        let mut guard = chunk.inner.write();
        let rows = Self::local_rows(&chunk, &guard, row_ids)?;

        for &row in &rows {
            if guard.write_conflict(row, txn.id()) {
                return Err(TracedStorageError::conflict("update"));
            }
        }
        let old_rows: Vec<Row> = rows
            .iter()
            .map(|&row| self.read_row(&guard, chunk.start() + row as RowId))
            .collect();

        // Affected indexes see the update before any column is mutated, so
        // a constraint failure can still back out cleanly.
        self.update_indexes(column_ids, updates, row_ids, &old_rows)?;

        for (i, &row) in rows.iter().enumerate() {
            let entry = guard.push_entry(row, txn.id(), Some(old_rows[i].clone()));
            txn.undo_mut().push(UndoEntry {
                kind: UndoKind::Update,
                table: self.clone(),
                chunk: chunk.clone(),
                row,
                entry,
            });
        }

        let mut buf = Vec::new();
        for (pos, &col) in column_ids.iter().enumerate() {
            let ty = datatypes[col];
            let array = updates.array_at(pos);
            let mut store = self.inner.columns[col].write();
            for (i, &row) in rows.iter().enumerate() {
                buf.clear();
                match &staged.handles[pos] {
                    Some(handles) => encode_string_handle(&mut buf, handles[i]),
                    None => encode_element(&mut buf, ty, &array.value_at(i)),
                }
                store
                    .element_mut(chunk.start() + row as RowId)
                    .copy_from_slice(&buf);
            }
        }

        let mut statistics = self.inner.statistics.write();
        for (pos, &col) in column_ids.iter().enumerate() {
            statistics[col].update(updates.array_at(pos));
        }
        drop(statistics);

        staged.adopt_rows(&mut guard.string_heap, 0..row_ids.len());
        Ok(())
    }

    /// Fetch rows by id, in input order. Ids are argsorted first so each
    /// chunk's shared lock is taken once per contiguous group; rows not
    /// visible to the transaction are dropped from the result.
    pub fn fetch(
        &self,
        txn: &Transaction,
        row_ids: &[RowId],
        column_ids: &[usize],
    ) -> StorageResult<Vec<(RowId, Row)>> {
        for &col in column_ids {
            if col >= self.info.catalog.column_count() {
                return Err(StorageError::InvalidColumn(col).into());
            }
        }
        let mut order: Vec<usize> = (0..row_ids.len()).collect();
        order.sort_by_key(|&i| row_ids[i]);

        let mut fetched: Vec<Option<Row>> = vec![None; row_ids.len()];
        let mut pos = 0;
        while pos < order.len() {
            let chunk = self.chunk_for_row(row_ids[order[pos]])?;
            let guard = chunk.inner.read();
            let end = chunk.start() + guard.count as RowId;
            if row_ids[order[pos]] >= end {
                return Err(TracedStorageError::not_found("row", row_ids[order[pos]]));
            }
            while pos < order.len() && row_ids[order[pos]] < end {
                let slot = order[pos];
                let row = (row_ids[slot] - chunk.start()) as usize;
                match guard.resolve(row, txn.id(), txn.snapshot()) {
                    RowVersion::Current => {
                        fetched[slot] = Some(
                            column_ids
                                .iter()
                                .map(|&col| self.read_value(&guard, row_ids[slot], col))
                                .collect(),
                        );
                    }
                    RowVersion::Image(image) => {
                        fetched[slot] =
                            Some(column_ids.iter().map(|&col| image[col].clone()).collect());
                    }
                    RowVersion::Invisible => {}
                }
                pos += 1;
            }
        }
        Ok(row_ids
            .iter()
            .zip_eq(fetched)
            .filter_map(|(&id, row)| row.map(|row| (id, row)))
            .collect())
    }

    fn verify_append_constraints(&self, chunk: &DataChunk) -> StorageResult<()> {
        for constraint in self.info.catalog.constraints() {
            match constraint {
                Constraint::NotNull { column_index } => {
                    if chunk.array_at(*column_index).has_null() {
                        return Err(self.not_null_violation(*column_index));
                    }
                }
                Constraint::Check { expr, .. } => {
                    Self::verify_check(expr.as_ref(), chunk)?;
                }
                Constraint::Unique { keys } => {
                    let key = Self::single_unique_key(keys)?;
                    self.verify_unique_batch(chunk.array_at(key), key)?;
                }
                Constraint::ForeignKey { .. } => {
                    return Err(TracedStorageError::unsupported_constraint("FOREIGN KEY"));
                }
            }
        }
        Ok(())
    }

    /// Verify constraints restricted to the columns an update touches. The
    /// check batch is widened to full table shape with null-filled columns
    /// so expressions can address columns by position.
    fn verify_update_constraints(
        &self,
        column_ids: &[usize],
        updates: &DataChunk,
    ) -> StorageResult<()> {
        let touched: HashSet<usize> = column_ids.iter().copied().collect();
        for constraint in self.info.catalog.constraints() {
            match constraint {
                Constraint::NotNull { column_index } if touched.contains(column_index) => {
                    let pos = column_ids.iter().position(|c| c == column_index).unwrap();
                    if updates.array_at(pos).has_null() {
                        return Err(self.not_null_violation(*column_index));
                    }
                }
                Constraint::Check { expr, columns } => {
                    if columns.is_disjoint(&touched) {
                        continue;
                    }
                    if !columns.is_subset(&touched) {
                        return Err(TracedStorageError::unsupported_constraint(
                            "CHECK over columns not present in the update",
                        ));
                    }
                    let mock = self.mock_full_width(column_ids, updates);
                    Self::verify_check(expr.as_ref(), &mock)?;
                }
                Constraint::Unique { keys } => {
                    let key = Self::single_unique_key(keys)?;
                    if touched.contains(&key) {
                        let pos = column_ids.iter().position(|&c| c == key).unwrap();
                        self.verify_unique_batch(updates.array_at(pos), key)?;
                    }
                }
                Constraint::ForeignKey { .. } => {
                    return Err(TracedStorageError::unsupported_constraint("FOREIGN KEY"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn verify_check(expr: &dyn crate::expr::Expression, chunk: &DataChunk) -> StorageResult<()> {
        let result = expr
            .evaluate(chunk)
            .map_err(TracedStorageError::constraint_violation)?;
        if result.datatype() != DataType::Bool {
            return Err(TracedStorageError::constraint_violation(
                "CHECK expression is not boolean",
            ));
        }
        for i in 0..result.len() {
            // NULL passes, per SQL semantics.
            if result.value_at(i) == DataValue::Bool(false) {
                return Err(TracedStorageError::constraint_violation(
                    "CHECK constraint failed",
                ));
            }
        }
        Ok(())
    }

    fn verify_unique_batch(&self, array: &ArrayImpl, key: usize) -> StorageResult<()> {
        let mut seen = HashSet::new();
        for i in 0..array.len() {
            let value = array.value_at(i);
            if value.is_null() {
                continue;
            }
            if !seen.insert(value) {
                return Err(TracedStorageError::constraint_violation(format!(
                    "UNIQUE constraint failed: {}",
                    self.info.catalog.columns()[key].name()
                )));
            }
        }
        Ok(())
    }

    fn single_unique_key(keys: &HashSet<usize>) -> StorageResult<usize> {
        if keys.len() != 1 {
            return Err(TracedStorageError::unsupported_constraint(
                "multi-column UNIQUE",
            ));
        }
        Ok(*keys.iter().next().unwrap())
    }

    fn not_null_violation(&self, column_index: usize) -> TracedStorageError {
        TracedStorageError::constraint_violation(format!(
            "NOT NULL constraint failed: {}",
            self.info.catalog.columns()[column_index].name()
        ))
    }

    /// Widen an update batch to full table shape, null-filling untouched
    /// columns.
    fn mock_full_width(&self, column_ids: &[usize], updates: &DataChunk) -> DataChunk {
        let cardinality = updates.cardinality();
        self.info
            .catalog
            .datatypes()
            .iter()
            .enumerate()
            .map(|(idx, ty)| match column_ids.iter().position(|&c| c == idx) {
                Some(pos) => updates.array_at(pos).clone(),
                None => {
                    let mut builder = ArrayBuilderImpl::with_capacity(cardinality, ty);
                    for _ in 0..cardinality {
                        builder.push(&DataValue::Null);
                    }
                    builder.finish()
                }
            })
            .collect()
    }

    fn update_indexes(
        &self,
        column_ids: &[usize],
        updates: &DataChunk,
        row_ids: &[RowId],
        old_rows: &[Row],
    ) -> StorageResult<()> {
        let indexes = self.inner.indexes.read();
        let affected: Vec<_> = indexes
            .iter()
            .filter(|index| index.is_affected(column_ids))
            .collect();
        if affected.is_empty() {
            return Ok(());
        }
        let datatypes = self.info.catalog.datatypes();
        let old_chunk: DataChunk = {
            let mut builder = crate::array::DataChunkBuilder::new(datatypes.iter(), old_rows.len());
            for row in old_rows {
                builder.push_row(row.iter().cloned());
            }
            builder.finish().unwrap()
        };
        let new_chunk: DataChunk = {
            let mut builder = crate::array::DataChunkBuilder::new(datatypes.iter(), old_rows.len());
            for (i, row) in old_rows.iter().enumerate() {
                builder.push_row(row.iter().enumerate().map(|(col, value)| {
                    match column_ids.iter().position(|&c| c == col) {
                        Some(pos) => updates.array_at(pos).value_at(i),
                        None => value.clone(),
                    }
                }));
            }
            builder.finish().unwrap()
        };
        for (i, index) in affected.iter().enumerate() {
            index.delete(&old_chunk, row_ids);
            if !index.append(&new_chunk, row_ids) {
                // Back out: this index and every earlier one return to the
                // old entries. Re-adding entries the index held a moment
                // ago must succeed; warn if one misbehaves.
                if !index.append(&old_chunk, row_ids) {
                    tracing::warn!(table = self.name(), "index rejected its previous entries during update back-out");
                }
                for earlier in &affected[..i] {
                    earlier.delete(&new_chunk, row_ids);
                    if !earlier.append(&old_chunk, row_ids) {
                        tracing::warn!(table = self.name(), "index rejected its previous entries during update back-out");
                    }
                }
                return Err(TracedStorageError::constraint_violation(
                    "index constraint violated on update",
                ));
            }
        }
        Ok(())
    }

    /// Allocate string handles for a batch and park the values in a staged
    /// heap, to be adopted by destination chunks after placement.
    fn stage_strings(&self, chunk: &DataChunk) -> StagedStrings {
        let mut heap = StringHeap::default();
        let handles = chunk
            .arrays()
            .iter()
            .map(|array| match array {
                ArrayImpl::Utf8(_) => Some(
                    (0..array.len())
                        .map(|i| match array.value_at(i) {
                            DataValue::Null => NULL_STRING_HANDLE,
                            DataValue::String(s) => {
                                let handle =
                                    self.inner.next_string_id.fetch_add(1, Ordering::Relaxed);
                                heap.insert(handle, s);
                                handle
                            }
                            _ => unreachable!("non-string value in string array"),
                        })
                        .collect(),
                ),
                _ => None,
            })
            .collect();
        StagedStrings { heap, handles }
    }

    #[cfg(test)]
    pub(crate) fn chunk_lookups(&self) -> u64 {
        self.inner.chunk_lookups.load(Ordering::Relaxed)
    }

    /// The chunk containing `row`, or `NotFound` past the tail.
    pub(crate) fn chunk_for_row(&self, row: RowId) -> StorageResult<Arc<RowChunk>> {
        #[cfg(test)]
        self.inner.chunk_lookups.fetch_add(1, Ordering::Relaxed);
        let chunks = self.inner.chunks.lock();
        let idx = chunks.partition_point(|c| c.start() <= row);
        if idx == 0 {
            return Err(TracedStorageError::not_found("row", row));
        }
        Ok(chunks[idx - 1].clone())
    }

    /// Map row ids to offsets within `chunk`, verifying they are all placed
    /// rows of that chunk.
    fn local_rows(
        chunk: &RowChunk,
        inner: &RowChunkInner,
        row_ids: &[RowId],
    ) -> StorageResult<Vec<usize>> {
        let end = chunk.start() + inner.count as RowId;
        row_ids
            .iter()
            .map(|&id| {
                if id < chunk.start() || id >= end {
                    return Err(TracedStorageError::not_found("row", id));
                }
                Ok((id - chunk.start()) as usize)
            })
            .collect()
    }

    /// Read the current storage value of one column of a row. The caller
    /// holds the owning chunk's lock.
    pub(crate) fn read_value(&self, inner: &RowChunkInner, row: RowId, col: usize) -> DataValue {
        let ty = self.info.catalog.columns()[col].datatype();
        let store = self.inner.columns[col].read();
        Self::decode_stored(ty, store.element(row), &inner.string_heap)
    }

    /// Materialize the full current row out of column storage.
    pub(crate) fn read_row(&self, inner: &RowChunkInner, row: RowId) -> Row {
        (0..self.info.catalog.column_count())
            .map(|col| self.read_value(inner, row, col))
            .collect()
    }

    pub(crate) fn decode_stored(ty: DataType, bytes: &[u8], heap: &StringHeap) -> DataValue {
        match decode_element(ty, bytes) {
            StoredValue::Value(value) => value,
            StoredValue::StringHandle(NULL_STRING_HANDLE) => DataValue::Null,
            StoredValue::StringHandle(handle) => {
                DataValue::String(heap.get(handle).unwrap().to_string())
            }
        }
    }

    fn append_row_chunk(&self, chunks: &mut Vec<Arc<RowChunk>>, start: RowId) -> Arc<RowChunk> {
        let pointers = self
            .inner
            .columns
            .iter()
            .map(|store| store.read().tail_pos())
            .collect();
        let chunk = Arc::new(RowChunk::new(
            start,
            pointers,
            self.info.options.chunk_capacity,
        ));
        chunks.push(chunk.clone());
        chunk
    }

    /// Stamp a version entry with its commit sequence number.
    pub(crate) fn commit_entry(&self, entry: &UndoEntry, commit_id: u64) {
        let mut guard = entry.chunk.inner.write();
        guard.entry_mut(entry.entry).version_number = commit_id;
    }

    /// Undo one operation, newest first.
    pub(crate) fn rollback_entry(&self, entry: &UndoEntry) {
        let mut guard = entry.chunk.inner.write();
        match entry.kind {
            UndoKind::Insert => {
                // A row with no version entry is visible unless flagged,
                // so a rolled-back insert keeps its flag set forever.
                guard.set_deleted(entry.row, true);
            }
            UndoKind::Delete => {
                guard.set_deleted(entry.row, false);
            }
            UndoKind::Update => {
                let image = guard
                    .entry(entry.entry)
                    .row
                    .clone()
                    .expect("update entry has a pre-image");
                self.restore_row(&mut guard, entry.chunk.start() + entry.row as RowId, &image);
            }
        }
        guard.unlink(entry.row, entry.entry);
    }

    /// Write a materialized row back into column storage. String values get
    /// fresh handles; stale heap entries are left behind.
    fn restore_row(&self, inner: &mut RowChunkInner, row: RowId, values: &Row) {
        let mut buf = Vec::new();
        for (col, (ty, value)) in self
            .info
            .catalog
            .datatypes()
            .iter()
            .zip_eq(values)
            .enumerate()
        {
            buf.clear();
            if *ty == DataType::String {
                let handle = match value {
                    DataValue::Null => NULL_STRING_HANDLE,
                    DataValue::String(s) => {
                        let handle = self.inner.next_string_id.fetch_add(1, Ordering::Relaxed);
                        inner.string_heap.insert(handle, s.clone());
                        handle
                    }
                    _ => unreachable!("non-string value in string column"),
                };
                encode_string_handle(&mut buf, handle);
            } else {
                encode_element(&mut buf, *ty, value);
            }
            self.inner.columns[col].write().element_mut(row).copy_from_slice(&buf);
        }
    }
}
