// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use serde::{Deserialize, Serialize};

mod native;
mod value;

pub use self::native::*;
pub use self::value::*;

pub type TableId = u32;
pub type ColumnId = u32;

/// A globally unique, monotonically assigned row identifier.
pub type RowId = u64;

/// Physical data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int32,
    Int64,
    Float64,
    String,
}

impl DataType {
    /// Width in bytes of one element in column-segment storage.
    ///
    /// Strings are stored as 8-byte handles into the owning row chunk's
    /// string heap, so every type has a fixed storage width.
    pub const fn data_len(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int32 => 4,
            Self::Int64 => 8,
            Self::Float64 => 8,
            Self::String => 8,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bool => "BOOLEAN",
            Self::Int32 => "INTEGER",
            Self::Int64 => "BIGINT",
            Self::Float64 => "DOUBLE",
            Self::String => "VARCHAR",
        };
        write!(f, "{name}")
    }
}
