// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Per-transaction undo log.
//!
//! Each entry pins the chunk it touched and the arena index of the version
//! entry it created, so commit can stamp commit ids and rollback can restore
//! pre-images without any lookup.

use std::sync::Arc;

use super::chunk::RowChunk;
use super::table::TableStore;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum UndoKind {
    Insert,
    Delete,
    Update,
}

pub(crate) struct UndoEntry {
    pub kind: UndoKind,
    pub table: TableStore,
    pub chunk: Arc<RowChunk>,
    /// Row offset within the chunk.
    pub row: usize,
    /// Arena index of the version entry this operation pushed.
    pub entry: u32,
}

#[derive(Default)]
pub(crate) struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain entries oldest first, for commit.
    pub fn drain(&mut self) -> impl Iterator<Item = UndoEntry> + '_ {
        self.entries.drain(..)
    }

    /// Drain entries newest first, for rollback.
    pub fn drain_rev(&mut self) -> impl Iterator<Item = UndoEntry> + '_ {
        self.entries.drain(..).rev()
    }
}
