// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! LightStore is the transactional row-storage core of an embedded
//! analytical database.
//!
//! Table data is stored in fixed-size column segments grouped into row
//! chunks. The [`storage::TableStore`] provides MVCC append, update, delete
//! and scan over that storage, keeps attached secondary indexes consistent,
//! and records per-transaction undo logs for rollback and write-conflict
//! detection.

#![deny(unused_must_use)]

pub mod array;
pub mod catalog;
pub mod expr;
pub mod storage;
pub mod transaction;
pub mod types;
