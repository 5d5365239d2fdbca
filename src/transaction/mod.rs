// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Transactions and their lifecycle.
//!
//! Version numbers share one 64-bit space: values at or above
//! [`TXN_ID_START`] are transaction ids and mark uncommitted changes;
//! values below it are commit sequence numbers. Committing a transaction
//! rewrites every version entry it owns from the former to the latter.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::storage::undo::UndoLog;

/// First transaction id. Everything below is a commit sequence number.
pub const TXN_ID_START: u64 = 1 << 62;

/// Hands out transaction ids and commit sequence numbers, and tracks the
/// newest published commit for snapshots.
pub struct TransactionManager {
    next_txn_id: AtomicU64,
    next_commit_id: AtomicU64,
    last_commit_id: AtomicU64,
}

impl TransactionManager {
    pub fn new() -> Self {
        TransactionManager {
            next_txn_id: AtomicU64::new(TXN_ID_START),
            next_commit_id: AtomicU64::new(1),
            last_commit_id: AtomicU64::new(0),
        }
    }

    pub fn start_transaction(self: &Arc<Self>) -> Transaction {
        Transaction {
            txn_id: self.next_txn_id.fetch_add(1, Ordering::Relaxed),
            snapshot: self.last_commit_id.load(Ordering::Acquire),
            undo: UndoLog::default(),
            manager: self.clone(),
            finished: false,
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-flight transaction.
///
/// A transaction belongs to one worker; its undo log needs no lock, only
/// the tables it writes to are shared. Dropping a transaction without calling
/// [`commit`](Self::commit) or [`abort`](Self::abort) rolls it back.
pub struct Transaction {
    txn_id: u64,
    snapshot: u64,
    undo: UndoLog,
    manager: Arc<TransactionManager>,
    finished: bool,
}

impl Transaction {
    pub fn id(&self) -> u64 {
        self.txn_id
    }

    /// The newest commit sequence number visible to this transaction.
    pub fn snapshot(&self) -> u64 {
        self.snapshot
    }

    pub(crate) fn undo_mut(&mut self) -> &mut UndoLog {
        &mut self.undo
    }

    /// Make all changes durable under a fresh commit sequence number.
    pub fn commit(mut self) {
        self.finished = true;
        if self.undo.is_empty() {
            return;
        }
        let commit_id = self.manager.next_commit_id.fetch_add(1, Ordering::Relaxed);
        let mut undo = mem::take(&mut self.undo);
        for entry in undo.drain() {
            entry.table.commit_entry(&entry, commit_id);
        }
        // Publish only after every entry carries the commit id.
        self.manager.last_commit_id.fetch_max(commit_id, Ordering::Release);
    }

    /// Undo all changes, newest first.
    pub fn abort(mut self) {
        self.finished = true;
        self.rollback();
    }

    fn rollback(&mut self) {
        let mut undo = mem::take(&mut self.undo);
        for entry in undo.drain_rev() {
            entry.table.rollback_entry(&entry);
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.finished {
            if !self.undo.is_empty() {
                tracing::warn!(txn_id = self.txn_id, "transaction dropped without commit or abort, rolling back");
            }
            self.rollback();
        }
    }
}
