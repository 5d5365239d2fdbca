// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use crate::types::{ColumnId, DataType};

/// The type and nullability of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDesc {
    datatype: DataType,
    nullable: bool,
}

impl ColumnDesc {
    pub fn new(datatype: DataType, nullable: bool) -> Self {
        ColumnDesc { datatype, nullable }
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// The catalog of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCatalog {
    id: ColumnId,
    name: String,
    desc: ColumnDesc,
}

impl ColumnCatalog {
    pub fn new(id: ColumnId, name: impl Into<String>, desc: ColumnDesc) -> Self {
        ColumnCatalog {
            id,
            name: name.into(),
            desc,
        }
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &ColumnDesc {
        &self.desc
    }

    pub fn datatype(&self) -> DataType {
        self.desc.datatype
    }

    pub fn is_nullable(&self) -> bool {
        self.desc.nullable
    }
}
