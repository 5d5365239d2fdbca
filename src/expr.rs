// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! The expression-evaluation capability consumed by CHECK constraints.
//!
//! Expression compilation and execution live in the query layer; the
//! storage core only needs "evaluate this expression over a row batch and
//! give me a boolean column".

use crate::array::{ArrayImpl, DataChunk};

/// The error type of expression evaluation.
///
/// The table store maps it to a constraint violation.
#[derive(thiserror::Error, Debug)]
#[error("evaluation error: {0}")]
pub struct EvalError(pub String);

/// A bound expression that can be evaluated over a [`DataChunk`].
///
/// A CHECK constraint holds one of these; `evaluate` must return a
/// [`ArrayImpl::Bool`] with one entry per input row.
pub trait Expression: Send + Sync {
    fn evaluate(&self, chunk: &DataChunk) -> Result<ArrayImpl, EvalError>;
}
