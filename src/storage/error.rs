// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::backtrace::Backtrace;

use thiserror::Error;

/// The error type of storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The shape of a row batch does not match the table. Caller bug, never
    /// retried.
    #[error("mismatch in column count for write")]
    SchemaMismatch,
    /// A NOT NULL, CHECK or UNIQUE constraint failed. No mutation has
    /// happened when this is returned.
    #[error("{0}")]
    ConstraintViolation(String),
    /// A concurrent uncommitted transaction owns the row. The caller may
    /// abort and retry the transaction.
    #[error("write-write conflict on {0}")]
    TransactionConflict(&'static str),
    /// A constraint kind the row storage core does not enforce.
    #[error("constraint not supported: {0}")]
    UnsupportedConstraint(&'static str),
    #[error("{0}({1}) not found")]
    NotFound(&'static str, String),
    #[error("duplicated {0}: {1}")]
    Duplicated(&'static str, String),
    #[error("invalid column index: {0}")]
    InvalidColumn(usize),
}

/// [`StorageError`] with backtrace.
///
/// The impls are written out by hand: capturing the backtrace in `From`
/// keeps the struct plain data and builds on stable.
pub struct TracedStorageError {
    source: StorageError,
    backtrace: Backtrace,
}

impl From<StorageError> for TracedStorageError {
    fn from(source: StorageError) -> Self {
        TracedStorageError {
            source,
            backtrace: Backtrace::capture(),
        }
    }
}

impl std::fmt::Display for TracedStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}\n{}", self.source, self.backtrace)
    }
}

impl std::fmt::Debug for TracedStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl std::error::Error for TracedStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl TracedStorageError {
    /// The underlying error kind.
    pub fn kind(&self) -> &StorageError {
        &self.source
    }

    pub fn constraint_violation(message: impl ToString) -> Self {
        StorageError::ConstraintViolation(message.to_string()).into()
    }

    pub fn conflict(operation: &'static str) -> Self {
        StorageError::TransactionConflict(operation).into()
    }

    pub fn unsupported_constraint(kind: &'static str) -> Self {
        StorageError::UnsupportedConstraint(kind).into()
    }

    pub fn not_found(ty: &'static str, item: impl ToString) -> Self {
        StorageError::NotFound(ty, item.to_string()).into()
    }

    pub fn duplicated(ty: &'static str, item: impl ToString) -> Self {
        StorageError::Duplicated(ty, item.to_string()).into()
    }
}

pub type StorageResult<T> = std::result::Result<T, TracedStorageError>;
