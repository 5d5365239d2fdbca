// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::array::{ArrayImpl, BoolArray, DataChunk, DataChunkBuilder, I32Array, Utf8Array};
use crate::catalog::{ColumnCatalog, ColumnDesc, Constraint};
use crate::expr::{EvalError, Expression};
use crate::transaction::Transaction;
use crate::types::{DataType, DataValue, RowId};

fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();
}

fn small_storage() -> RowStorage {
    RowStorage::with_options(StorageOptions {
        chunk_capacity: 2,
        block_size: 64,
    })
}

fn columns(specs: &[(&str, DataType, bool)]) -> Vec<ColumnCatalog> {
    specs
        .iter()
        .enumerate()
        .map(|(id, (name, ty, nullable))| {
            ColumnCatalog::new(id as u32, *name, ColumnDesc::new(*ty, *nullable))
        })
        .collect()
}

fn three_int_table(storage: &RowStorage) -> TableStore {
    storage
        .create_table(
            "t",
            columns(&[
                ("a", DataType::Int32, true),
                ("b", DataType::Int32, true),
                ("c", DataType::Int32, true),
            ]),
            vec![],
        )
        .unwrap()
}

/// One row per value: `(v, v * 10, v * 100)`.
fn three_int_chunk(values: &[i32]) -> DataChunk {
    let mut builder = DataChunkBuilder::new(&[DataType::Int32; 3], values.len());
    for &v in values {
        builder.push_row([
            DataValue::Int32(v),
            DataValue::Int32(v * 10),
            DataValue::Int32(v * 100),
        ]);
    }
    builder.finish().unwrap()
}

fn int_updates(values: &[Option<i32>]) -> DataChunk {
    [ArrayImpl::from(values.iter().copied().collect::<I32Array>())]
        .into_iter()
        .collect()
}

fn scan_ints(table: &TableStore, txn: &Transaction, col: usize) -> Vec<i32> {
    let mut state = table.init_scan();
    let mut out = vec![];
    while let Some(chunk) = table.scan(txn, &mut state, &[col]).unwrap() {
        for i in 0..chunk.cardinality() {
            match chunk.array_at(0).value_at(i) {
                DataValue::Int32(v) => out.push(v),
                v => panic!("unexpected value {v:?}"),
            }
        }
    }
    out
}

/// An index over one int column that rejects a configured value.
struct TestIndex {
    column: usize,
    reject: i32,
    entries: Mutex<HashMap<RowId, DataValue>>,
}

impl TestIndex {
    fn new(column: usize, reject: i32) -> Arc<Self> {
        Arc::new(TestIndex {
            column,
            reject,
            entries: Mutex::new(HashMap::new()),
        })
    }

    fn snapshot(&self) -> HashMap<RowId, DataValue> {
        self.entries.lock().clone()
    }
}

impl Index for TestIndex {
    fn append(&self, chunk: &DataChunk, row_ids: &[RowId]) -> bool {
        let array = chunk.array_at(self.column);
        for i in 0..array.len() {
            if array.value_at(i) == DataValue::Int32(self.reject) {
                return false;
            }
        }
        let mut entries = self.entries.lock();
        for (i, &id) in row_ids.iter().enumerate() {
            entries.insert(id, array.value_at(i));
        }
        true
    }

    fn delete(&self, _chunk: &DataChunk, row_ids: &[RowId]) {
        let mut entries = self.entries.lock();
        for id in row_ids {
            entries.remove(id);
        }
    }

    fn is_affected(&self, column_ids: &[usize]) -> bool {
        column_ids.contains(&self.column)
    }
}

/// `column > 0`, with SQL null semantics.
struct Positive {
    column: usize,
}

impl Expression for Positive {
    fn evaluate(&self, chunk: &DataChunk) -> Result<ArrayImpl, EvalError> {
        let array = chunk.array_at(self.column);
        let result: BoolArray = (0..array.len())
            .map(|i| match array.value_at(i) {
                DataValue::Null => None,
                DataValue::Int32(v) => Some(v > 0),
                _ => panic!("unexpected type"),
            })
            .collect();
        Ok(result.into())
    }
}

#[test]
fn append_spills_over_chunks_and_delete_hides_row() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3, 4, 5])).unwrap();
    txn.commit();
    assert_eq!(table.chunk_sizes(), vec![2, 2, 1]);
    assert_eq!(table.row_count(), 5);

    // delete the row holding 3 (row id 2)
    let mut txn = storage.start_transaction();
    table.delete(&mut txn, &[2]).unwrap();
    txn.commit();

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), vec![1, 2, 4, 5]);
    assert_eq!(scan_ints(&table, &txn, 2), vec![100, 200, 400, 500]);
}

#[test]
fn delete_invisible_to_new_snapshots_only() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3])).unwrap();
    txn.commit();

    let before = storage.start_transaction();
    let mut deleter = storage.start_transaction();
    table.delete(&mut deleter, &[1]).unwrap();
    // uncommitted: other snapshots still see the row
    assert_eq!(scan_ints(&table, &before, 0), vec![1, 2, 3]);
    deleter.commit();

    // a snapshot taken before the commit keeps seeing the pre-image
    assert_eq!(scan_ints(&table, &before, 0), vec![1, 2, 3]);
    let after = storage.start_transaction();
    assert_eq!(scan_ints(&table, &after, 0), vec![1, 3]);
}

#[test]
fn delete_applies_over_newer_committed_update() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1])).unwrap();
    txn.commit();

    // the deleter's snapshot predates the update's commit
    let mut deleter = storage.start_transaction();
    let mut updater = storage.start_transaction();
    table
        .update(&mut updater, &[0], &[0], &int_updates(&[Some(10)]))
        .unwrap();
    updater.commit();
    table.delete(&mut deleter, &[0]).unwrap();
    deleter.commit();

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), Vec::<i32>::new());
}

#[test]
fn aborted_repeat_delete_does_not_resurrect() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2])).unwrap();
    txn.commit();
    let mut txn = storage.start_transaction();
    table.delete(&mut txn, &[0]).unwrap();
    txn.commit();

    // the row is already flagged: this delete is a no-op, so its abort has
    // nothing to restore
    let mut txn = storage.start_transaction();
    table.delete(&mut txn, &[0]).unwrap();
    txn.abort();

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), vec![2]);
}

#[test]
fn concurrent_update_conflicts() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2])).unwrap();
    txn.commit();

    let mut first = storage.start_transaction();
    let mut second = storage.start_transaction();
    table
        .update(&mut first, &[0], &[0], &int_updates(&[Some(10)]))
        .unwrap();
    let err = table
        .update(&mut second, &[0], &[0], &int_updates(&[Some(20)]))
        .unwrap_err();
    assert!(matches!(err.kind(), StorageError::TransactionConflict(_)));
    // the loser's delete conflicts too
    let err = table.delete(&mut second, &[0]).unwrap_err();
    assert!(matches!(err.kind(), StorageError::TransactionConflict(_)));
    first.commit();

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), vec![10, 2]);
}

#[test]
fn update_in_place_keeps_other_columns() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3])).unwrap();
    table
        .update(&mut txn, &[0, 1], &[1], &int_updates(&[Some(7), Some(8)]))
        .unwrap();
    txn.commit();

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 1), vec![7, 8, 30]);
    assert_eq!(scan_ints(&table, &txn, 0), vec![1, 2, 3]);
}

#[test]
fn rollback_restores_all_mutations() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3])).unwrap();
    txn.commit();

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[4])).unwrap();
    table.delete(&mut txn, &[0]).unwrap();
    table
        .update(&mut txn, &[1], &[0], &int_updates(&[Some(99)]))
        .unwrap();
    assert_eq!(scan_ints(&table, &txn, 0), vec![99, 3, 4]);
    txn.abort();

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), vec![1, 2, 3]);
    // the rolled back insert never becomes visible, not even to a scan that
    // reads the slot's chunk
    assert_eq!(table.row_count(), 4);
}

#[test]
fn dropped_transaction_rolls_back() {
    init_logger();
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1])).unwrap();
    drop(txn);

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), Vec::<i32>::new());
}

#[test]
fn fetch_returns_input_order() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3, 4, 5])).unwrap();
    txn.commit();

    let txn = storage.start_transaction();
    let rows = table.fetch(&txn, &[4, 0, 3], &[0, 2]).unwrap();
    assert_eq!(
        rows,
        vec![
            (4, vec![DataValue::Int32(5), DataValue::Int32(500)]),
            (0, vec![DataValue::Int32(1), DataValue::Int32(100)]),
            (3, vec![DataValue::Int32(4), DataValue::Int32(400)]),
        ]
    );
}

#[test]
fn fetch_locks_once_per_chunk_group() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3, 4, 5])).unwrap();
    txn.commit();
    assert_eq!(table.chunk_sizes(), vec![2, 2, 1]);

    let txn = storage.start_transaction();
    let before = table.chunk_lookups();
    // unsorted ids spanning all three chunks
    let rows = table.fetch(&txn, &[4, 0, 3, 1], &[0]).unwrap();
    assert_eq!(
        rows.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
        vec![4, 0, 3, 1]
    );
    // argsort groups [0, 1] / [3] / [4]: one chunk resolution (and one
    // shared lock) per group
    assert_eq!(table.chunk_lookups() - before, 3);
}

#[test]
fn fetch_skips_invisible_rows() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3])).unwrap();
    txn.commit();
    let mut txn = storage.start_transaction();
    table.delete(&mut txn, &[1]).unwrap();
    txn.commit();

    let txn = storage.start_transaction();
    let rows = table.fetch(&txn, &[0, 1, 2], &[0]).unwrap();
    assert_eq!(
        rows,
        vec![
            (0, vec![DataValue::Int32(1)]),
            (2, vec![DataValue::Int32(3)]),
        ]
    );
}

#[test]
fn constraint_violation_mutates_nothing() {
    let storage = small_storage();
    let table = storage
        .create_table(
            "t",
            columns(&[
                ("a", DataType::Int32, false),
                ("b", DataType::Int32, true),
            ]),
            vec![Constraint::NotNull { column_index: 0 }],
        )
        .unwrap();
    let index = TestIndex::new(0, i32::MIN);
    table.add_index(index.clone()).unwrap();

    let chunk: DataChunk = [
        ArrayImpl::from([Some(1), None].into_iter().collect::<I32Array>()),
        ArrayImpl::from([Some(2), Some(3)].into_iter().collect::<I32Array>()),
    ]
    .into_iter()
    .collect();
    let mut txn = storage.start_transaction();
    let err = table.append(&mut txn, chunk).unwrap_err();
    assert!(matches!(err.kind(), StorageError::ConstraintViolation(_)));
    txn.commit();

    assert_eq!(table.row_count(), 0);
    assert_eq!(table.statistics(), vec![Default::default(), Default::default()]);
    assert!(index.snapshot().is_empty());
}

#[test]
fn check_constraint_with_null_passes() {
    let storage = small_storage();
    let table = storage
        .create_table(
            "t",
            columns(&[("a", DataType::Int32, true), ("b", DataType::Int32, true)]),
            vec![Constraint::Check {
                expr: Arc::new(Positive { column: 0 }),
                columns: [0].into_iter().collect(),
            }],
        )
        .unwrap();

    let mut txn = storage.start_transaction();
    let ok: DataChunk = [
        ArrayImpl::from([Some(1), None].into_iter().collect::<I32Array>()),
        ArrayImpl::from([Some(2), Some(3)].into_iter().collect::<I32Array>()),
    ]
    .into_iter()
    .collect();
    table.append(&mut txn, ok).unwrap();

    let bad: DataChunk = [
        ArrayImpl::from([Some(-1)].into_iter().collect::<I32Array>()),
        ArrayImpl::from([Some(2)].into_iter().collect::<I32Array>()),
    ]
    .into_iter()
    .collect();
    let err = table.append(&mut txn, bad).unwrap_err();
    assert!(matches!(err.kind(), StorageError::ConstraintViolation(_)));

    // updating only column 1 never evaluates the check; updating column 0
    // does
    table
        .update(&mut txn, &[0], &[1], &int_updates(&[Some(-5)]))
        .unwrap();
    let err = table
        .update(&mut txn, &[0], &[0], &int_updates(&[Some(-5)]))
        .unwrap_err();
    assert!(matches!(err.kind(), StorageError::ConstraintViolation(_)));
}

#[test]
fn unsupported_constraints_are_reported() {
    let storage = small_storage();
    let table = storage
        .create_table(
            "t",
            columns(&[("a", DataType::Int32, true), ("b", DataType::Int32, true)]),
            vec![Constraint::ForeignKey {
                columns: [0].into_iter().collect(),
            }],
        )
        .unwrap();
    let mut txn = storage.start_transaction();
    let err = table.append(&mut txn, three_int_chunk(&[1])).unwrap_err();
    // a three column batch against a two column table
    assert!(matches!(err.kind(), StorageError::SchemaMismatch));
    let chunk: DataChunk = [
        ArrayImpl::from([Some(1)].into_iter().collect::<I32Array>()),
        ArrayImpl::from([Some(2)].into_iter().collect::<I32Array>()),
    ]
    .into_iter()
    .collect();
    let err = table.append(&mut txn, chunk).unwrap_err();
    assert!(matches!(err.kind(), StorageError::UnsupportedConstraint(_)));

    let table = storage
        .create_table(
            "u",
            columns(&[("a", DataType::Int32, true), ("b", DataType::Int32, true)]),
            vec![Constraint::Unique {
                keys: [0, 1].into_iter().collect(),
            }],
        )
        .unwrap();
    let chunk: DataChunk = [
        ArrayImpl::from([Some(1)].into_iter().collect::<I32Array>()),
        ArrayImpl::from([Some(2)].into_iter().collect::<I32Array>()),
    ]
    .into_iter()
    .collect();
    let err = table.append(&mut txn, chunk).unwrap_err();
    assert!(matches!(err.kind(), StorageError::UnsupportedConstraint(_)));
}

#[test]
fn unique_rejects_batch_duplicates() {
    let storage = small_storage();
    let table = storage
        .create_table(
            "t",
            columns(&[("a", DataType::Int32, true)]),
            vec![Constraint::Unique {
                keys: [0].into_iter().collect(),
            }],
        )
        .unwrap();
    let mut txn = storage.start_transaction();
    let chunk: DataChunk = [ArrayImpl::from(
        [Some(1), None, None, Some(1)].into_iter().collect::<I32Array>(),
    )]
    .into_iter()
    .collect();
    let err = table.append(&mut txn, chunk).unwrap_err();
    assert!(matches!(err.kind(), StorageError::ConstraintViolation(_)));
}

#[test]
fn index_failure_on_update_leaves_no_trace() {
    let storage = small_storage();
    let table = three_int_table(&storage);
    let index = TestIndex::new(0, 99);
    table.add_index(index.clone()).unwrap();

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2, 3])).unwrap();
    txn.commit();
    let before = index.snapshot();
    assert_eq!(before.len(), 3);

    let mut txn = storage.start_transaction();
    let err = table
        .update(&mut txn, &[1], &[0], &int_updates(&[Some(99)]))
        .unwrap_err();
    assert!(matches!(err.kind(), StorageError::ConstraintViolation(_)));
    txn.commit();

    assert_eq!(index.snapshot(), before);
    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), vec![1, 2, 3]);
}

/// An index that can be switched to reject every insertion, including the
/// restore of entries it just held.
struct RevokingIndex {
    reject_all: std::sync::atomic::AtomicBool,
}

impl Index for RevokingIndex {
    fn append(&self, _chunk: &DataChunk, _row_ids: &[RowId]) -> bool {
        !self.reject_all.load(std::sync::atomic::Ordering::Relaxed)
    }

    fn delete(&self, _chunk: &DataChunk, _row_ids: &[RowId]) {}

    fn is_affected(&self, _column_ids: &[usize]) -> bool {
        true
    }
}

#[test]
fn misbehaving_index_fails_update_without_panic() {
    init_logger();
    let storage = small_storage();
    let table = three_int_table(&storage);
    let index = Arc::new(RevokingIndex {
        reject_all: std::sync::atomic::AtomicBool::new(false),
    });
    table.add_index(index.clone()).unwrap();

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2])).unwrap();
    txn.commit();

    index
        .reject_all
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let mut txn = storage.start_transaction();
    let err = table
        .update(&mut txn, &[0], &[0], &int_updates(&[Some(9)]))
        .unwrap_err();
    assert!(matches!(err.kind(), StorageError::ConstraintViolation(_)));
    txn.commit();

    let txn = storage.start_transaction();
    assert_eq!(scan_ints(&table, &txn, 0), vec![1, 2]);
}

#[test]
fn update_maintains_affected_indexes() {
    let storage = small_storage();
    let table = three_int_table(&storage);
    let index = TestIndex::new(0, i32::MIN);
    table.add_index(index.clone()).unwrap();

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[1, 2])).unwrap();
    table
        .update(&mut txn, &[0], &[0], &int_updates(&[Some(7)]))
        .unwrap();
    // untouched index column: no index churn either way
    table
        .update(&mut txn, &[1], &[1], &int_updates(&[Some(8)]))
        .unwrap();
    txn.commit();

    assert_eq!(index.snapshot()[&0], DataValue::Int32(7));
    assert_eq!(index.snapshot()[&1], DataValue::Int32(2));
}

#[test]
fn add_index_backfills_committed_rows_only() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut committed = storage.start_transaction();
    table.append(&mut committed, three_int_chunk(&[1, 2, 3])).unwrap();
    committed.commit();
    let mut pending = storage.start_transaction();
    table.append(&mut pending, three_int_chunk(&[4])).unwrap();

    let index = TestIndex::new(0, i32::MIN);
    table.add_index(index.clone()).unwrap();
    assert_eq!(index.snapshot().len(), 3);

    let rejecting = TestIndex::new(0, 2);
    let err = table.add_index(rejecting.clone()).unwrap_err();
    assert!(matches!(err.kind(), StorageError::ConstraintViolation(_)));
    assert!(rejecting.snapshot().is_empty());
    pending.abort();
}

#[test]
fn string_columns_roundtrip_across_chunks() {
    let storage = small_storage();
    let table = storage
        .create_table(
            "t",
            columns(&[("id", DataType::Int32, true), ("s", DataType::String, true)]),
            vec![],
        )
        .unwrap();

    let mut txn = storage.start_transaction();
    let chunk: DataChunk = [
        ArrayImpl::from((0..5).map(Some).collect::<I32Array>()),
        ArrayImpl::from(
            [Some("zero"), Some("one"), None, Some("three"), Some("four")]
                .into_iter()
                .collect::<Utf8Array>(),
        ),
    ]
    .into_iter()
    .collect();
    table.append(&mut txn, chunk).unwrap();
    txn.commit();
    assert_eq!(table.chunk_sizes(), vec![2, 2, 1]);

    let mut txn = storage.start_transaction();
    let updates: DataChunk = [ArrayImpl::from(
        [Some("THREE")].into_iter().collect::<Utf8Array>(),
    )]
    .into_iter()
    .collect();
    table.update(&mut txn, &[3], &[1], &updates).unwrap();
    txn.commit();

    let txn = storage.start_transaction();
    let rows = table.fetch(&txn, &[0, 2, 3], &[1]).unwrap();
    assert_eq!(
        rows,
        vec![
            (0, vec![DataValue::String("zero".into())]),
            (2, vec![DataValue::Null]),
            (3, vec![DataValue::String("THREE".into())]),
        ]
    );
}

#[test]
fn statistics_track_appends_and_updates() {
    let storage = small_storage();
    let table = three_int_table(&storage);

    let mut txn = storage.start_transaction();
    table.append(&mut txn, three_int_chunk(&[3, 1])).unwrap();
    table
        .update(&mut txn, &[0], &[0], &int_updates(&[Some(9)]))
        .unwrap();
    txn.commit();

    let stats = table.statistics();
    assert_eq!(stats[0].row_count(), 3);
    assert_eq!(stats[0].min(), &DataValue::Int32(1));
    assert_eq!(stats[0].max(), &DataValue::Int32(9));
    assert_eq!(stats[1].row_count(), 2);
}

#[test]
fn storage_registry() {
    let storage = RowStorage::new();
    let cols = columns(&[("a", DataType::Int32, true)]);
    storage.create_table("t", cols.clone(), vec![]).unwrap();
    let err = storage.create_table("t", cols.clone(), vec![]).unwrap_err();
    assert!(matches!(err.kind(), StorageError::Duplicated(..)));
    storage.get_table("t").unwrap();
    storage.drop_table("t").unwrap();
    let err = storage.get_table("t").unwrap_err();
    assert!(matches!(err.kind(), StorageError::NotFound(..)));
}

#[test]
fn concurrent_appends_stay_contiguous() {
    let storage = Arc::new(RowStorage::with_options(StorageOptions {
        chunk_capacity: 16,
        block_size: 256,
    }));
    let table = three_int_table(&storage);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let storage = storage.clone();
            let table = table.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    let mut txn = storage.start_transaction();
                    table.append(&mut txn, three_int_chunk(&[t * 100 + i])).unwrap();
                    txn.commit();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(table.row_count(), 100);
    let sizes = table.chunk_sizes();
    // all chunks but the tail are full
    for size in &sizes[..sizes.len() - 1] {
        assert_eq!(*size, 16);
    }
    let txn = storage.start_transaction();
    let mut values = scan_ints(&table, &txn, 0);
    values.sort_unstable();
    let mut expected: Vec<i32> = (0..4).flat_map(|t| (0..25).map(move |i| t * 100 + i)).collect();
    expected.sort_unstable();
    assert_eq!(values, expected);
}
