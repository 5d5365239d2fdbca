// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::{ColumnCatalog, Constraint};
use crate::types::{DataType, TableId};

/// The catalog of a table: its columns and bound constraints.
#[derive(Debug, Clone)]
pub struct TableCatalog {
    id: TableId,
    name: String,
    columns: Vec<ColumnCatalog>,
    constraints: Vec<Constraint>,
}

impl TableCatalog {
    pub fn new(
        id: TableId,
        name: impl Into<String>,
        columns: Vec<ColumnCatalog>,
        constraints: Vec<Constraint>,
    ) -> Self {
        TableCatalog {
            id,
            name: name.into(),
            columns,
            constraints,
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnCatalog] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The element types of the columns, in table order.
    pub fn datatypes(&self) -> Vec<DataType> {
        self.columns.iter().map(|c| c.datatype()).collect()
    }
}
