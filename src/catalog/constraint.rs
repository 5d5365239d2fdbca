// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashSet;
use std::sync::Arc;

use crate::expr::Expression;

/// A table constraint, bound to column positions within the table.
///
/// Each variant carries only the fields its kind needs; the table store
/// dispatches on the variant when verifying a batch.
#[derive(Clone)]
pub enum Constraint {
    /// The column at `column_index` must not contain nulls.
    NotNull { column_index: usize },
    /// `expr` must not evaluate to `false` on any row. `columns` lists the
    /// column positions the expression reads, so updates can skip the check
    /// when none of them is touched.
    Check {
        expr: Arc<dyn Expression>,
        columns: HashSet<usize>,
    },
    /// The key columns must be unique within the table.
    Unique { keys: HashSet<usize> },
    /// Not enforced by the row storage core.
    ForeignKey { columns: HashSet<usize> },
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotNull { column_index } => {
                f.debug_struct("NotNull").field("column_index", column_index).finish()
            }
            Self::Check { columns, .. } => {
                f.debug_struct("Check").field("columns", columns).finish()
            }
            Self::Unique { keys } => f.debug_struct("Unique").field("keys", keys).finish(),
            Self::ForeignKey { columns } => {
                f.debug_struct("ForeignKey").field("columns", columns).finish()
            }
        }
    }
}
