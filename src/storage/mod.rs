// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Transactional, chunked row storage.
//!
//! Tables store rows column-wise in fixed-width segments, windowed into
//! fixed-capacity row chunks. Writes are versioned per row, readers resolve
//! each row against their snapshot, and rollback restores pre-images from
//! the transaction's undo log.

mod chunk;
mod error;
mod index;
mod scan;
mod segment;
mod statistics;
mod table;
pub(crate) mod undo;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

pub use self::error::{StorageError, StorageResult, TracedStorageError};
pub use self::index::Index;
pub use self::scan::TableScanState;
pub use self::statistics::ColumnStatistics;
pub use self::table::TableStore;
use crate::catalog::{ColumnCatalog, Constraint, TableCatalog};
use crate::transaction::{Transaction, TransactionManager};

/// Maximum number of rows in one scan output batch.
pub const SCAN_BATCH_SIZE: usize = 1024;

#[derive(Clone, Copy, Debug)]
pub struct StorageOptions {
    /// Number of rows per row chunk.
    pub chunk_capacity: usize,
    /// Bytes per column segment.
    pub block_size: usize,
}

impl Default for StorageOptions {
    fn default() -> Self {
        StorageOptions {
            chunk_capacity: 10240,
            block_size: 256 * 1024,
        }
    }
}

/// The storage manager: a registry of tables sharing one transaction
/// manager.
pub struct RowStorage {
    tables: Mutex<HashMap<String, TableStore>>,
    transaction_manager: Arc<TransactionManager>,
    options: StorageOptions,
    next_table_id: AtomicU32,
}

impl RowStorage {
    pub fn new() -> Self {
        Self::with_options(StorageOptions::default())
    }

    pub fn with_options(options: StorageOptions) -> Self {
        RowStorage {
            tables: Mutex::new(HashMap::new()),
            transaction_manager: Arc::new(TransactionManager::new()),
            options,
            next_table_id: AtomicU32::new(0),
        }
    }

    pub fn create_table(
        &self,
        name: &str,
        columns: Vec<ColumnCatalog>,
        constraints: Vec<Constraint>,
    ) -> StorageResult<TableStore> {
        let mut tables = self.tables.lock();
        if tables.contains_key(name) {
            return Err(TracedStorageError::duplicated("table", name));
        }
        let id = self.next_table_id.fetch_add(1, Ordering::Relaxed);
        let catalog = TableCatalog::new(id, name, columns, constraints);
        let table = TableStore::new(catalog, self.options);
        tables.insert(name.into(), table.clone());
        Ok(table)
    }

    pub fn get_table(&self, name: &str) -> StorageResult<TableStore> {
        self.tables
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| TracedStorageError::not_found("table", name))
    }

    /// Unregister a table. Clones of its [`TableStore`] stay usable until
    /// dropped.
    pub fn drop_table(&self, name: &str) -> StorageResult<()> {
        self.tables
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TracedStorageError::not_found("table", name))
    }

    pub fn start_transaction(&self) -> Transaction {
        self.transaction_manager.start_transaction()
    }
}

impl Default for RowStorage {
    fn default() -> Self {
        Self::new()
    }
}
