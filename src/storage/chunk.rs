// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Row chunks: fixed-capacity windows over all columns, with per-row MVCC
//! version chains, deletion flags and an exclusive string heap.

use std::collections::HashMap;
use std::ops::Range;

use bitvec::vec::BitVec;
use parking_lot::RwLock;

use super::segment::{ColumnPointer, NULL_STRING_HANDLE};
use crate::transaction::TXN_ID_START;
use crate::types::{Row, RowId};

/// Per-chunk arena of variable-length values.
///
/// Handles are allocated table-wide, so a staged heap built outside the
/// chunk lock can be merged in after data placement without rewriting the
/// handles already stored in column segments.
#[derive(Default)]
pub(crate) struct StringHeap {
    entries: HashMap<u64, String>,
}

impl StringHeap {
    pub fn insert(&mut self, handle: u64, value: String) {
        debug_assert_ne!(handle, NULL_STRING_HANDLE);
        self.entries.insert(handle, value);
    }

    pub fn get(&self, handle: u64) -> Option<&str> {
        self.entries.get(&handle).map(|s| s.as_str())
    }

    fn remove(&mut self, handle: u64) -> Option<String> {
        self.entries.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Move the given handles out of `staged` into this heap.
    pub fn adopt(&mut self, staged: &mut StringHeap, handles: impl Iterator<Item = u64>) {
        for handle in handles {
            if handle == NULL_STRING_HANDLE {
                continue;
            }
            if let Some(value) = staged.remove(handle) {
                self.entries.insert(handle, value);
            }
        }
    }
}

/// One entry of a row's version chain.
///
/// `version_number` is either an uncommitted transaction id (at or above
/// `TXN_ID_START`) or a commit sequence number. `row` is the pre-image of
/// the row before the owning transaction touched it; `None` marks an insert
/// entry, i.e. the row did not exist before.
pub(crate) struct VersionEntry {
    pub version_number: u64,
    pub prev: Option<u32>,
    pub row: Option<Row>,
}

/// How a row resolves for a reader at a given snapshot.
pub(crate) enum RowVersion<'a> {
    /// Current column storage is the visible version.
    Current,
    /// A reconstructed older image is visible.
    Image(&'a Row),
    Invisible,
}

/// A fixed-capacity window of contiguous logical rows over all columns.
///
/// All mutable state lives behind the reader/writer lock: writers
/// (append/update/delete) take it exclusively, scans and fetches take it
/// shared. The chunk itself is immutable once full, except for version
/// chains and deletion flags.
pub struct RowChunk {
    start: RowId,
    pub(crate) inner: RwLock<RowChunkInner>,
}

pub(crate) struct RowChunkInner {
    /// Number of rows placed in this chunk so far.
    pub count: usize,
    /// Per column, where this chunk's data begins in the segment store.
    pub columns: Vec<ColumnPointer>,
    pub string_heap: StringHeap,
    /// Head of each row's version chain, as an index into `arena`.
    version: Vec<Option<u32>>,
    /// Version entries of all rows in this chunk. Entries are unlinked on
    /// rollback, never removed, so indices stay stable.
    arena: Vec<VersionEntry>,
    /// Current deletion flag per row.
    deleted: BitVec,
}

impl RowChunk {
    pub(crate) fn new(start: RowId, columns: Vec<ColumnPointer>, capacity: usize) -> Self {
        RowChunk {
            start,
            inner: RwLock::new(RowChunkInner {
                count: 0,
                columns,
                string_heap: StringHeap::default(),
                version: vec![None; capacity],
                arena: Vec::new(),
                deleted: BitVec::repeat(false, capacity),
            }),
        }
    }

    /// Row id of the first row in this chunk.
    pub fn start(&self) -> RowId {
        self.start
    }
}

impl RowChunkInner {
    /// Whether the row's newest version entry belongs to an in-flight
    /// transaction other than `txn_id`.
    pub fn write_conflict(&self, row: usize, txn_id: u64) -> bool {
        match self.version[row] {
            Some(idx) => {
                let version = self.arena[idx as usize].version_number;
                version >= TXN_ID_START && version != txn_id
            }
            None => false,
        }
    }

    /// Link a new version entry as the head of the row's chain.
    pub fn push_entry(&mut self, row: usize, version_number: u64, pre_image: Option<Row>) -> u32 {
        let idx = self.arena.len() as u32;
        self.arena.push(VersionEntry {
            version_number,
            prev: self.version[row],
            row: pre_image,
        });
        self.version[row] = Some(idx);
        idx
    }

    pub fn entry(&self, idx: u32) -> &VersionEntry {
        &self.arena[idx as usize]
    }

    pub fn entry_mut(&mut self, idx: u32) -> &mut VersionEntry {
        &mut self.arena[idx as usize]
    }

    /// Unlink the row's head entry, which must be `idx`, restoring its
    /// predecessor as the head.
    pub fn unlink(&mut self, row: usize, idx: u32) {
        debug_assert_eq!(self.version[row], Some(idx));
        self.version[row] = self.arena[idx as usize].prev;
    }

    pub fn set_deleted(&mut self, row: usize, deleted: bool) {
        self.deleted.set(row, deleted);
    }

    pub fn is_deleted(&self, row: usize) -> bool {
        self.deleted[row]
    }

    /// Resolve the version of `row` visible to a reader owning `txn_id`
    /// with snapshot `snapshot`.
    ///
    /// Walking newest to oldest: if the head entry (or absence of one) is
    /// visible, current storage is the answer, subject to the deletion
    /// flag. Otherwise the reader sees the pre-image of the oldest
    /// non-visible entry; an absent pre-image means the row had not been
    /// inserted yet.
    pub fn resolve(&self, row: usize, txn_id: u64, snapshot: u64) -> RowVersion<'_> {
        let mut idx = self.version[row];
        let mut image: Option<&Row> = None;
        let mut skipped = false;
        while let Some(i) = idx {
            let entry = &self.arena[i as usize];
            let visible = entry.version_number == txn_id
                || (entry.version_number < TXN_ID_START && entry.version_number <= snapshot);
            if visible {
                break;
            }
            skipped = true;
            image = entry.row.as_ref();
            idx = entry.prev;
        }
        if !skipped {
            if self.deleted[row] {
                RowVersion::Invisible
            } else {
                RowVersion::Current
            }
        } else {
            match image {
                Some(row) => RowVersion::Image(row),
                None => RowVersion::Invisible,
            }
        }
    }
}

/// Strings staged for placement, owned by the writer until they are adopted
/// into the destination chunks' heaps.
pub(crate) struct StagedStrings {
    pub heap: StringHeap,
    /// Per batch column: one handle per row for string columns, `None` for
    /// fixed-width columns.
    pub handles: Vec<Option<Vec<u64>>>,
}

impl StagedStrings {
    /// Adopt into `dst` the strings referenced by the given batch rows.
    pub fn adopt_rows(&mut self, dst: &mut StringHeap, rows: Range<usize>) {
        for handles in self.handles.iter().flatten() {
            dst.adopt(&mut self.heap, handles[rows.clone()].iter().copied());
        }
    }
}
