// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::DataType;

/// A wrapper around `f64` providing `Eq`, `Ord` and `Hash`.
pub type F64 = OrderedFloat<f64>;

/// Primitive SQL value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataValue {
    // NOTE: Null comes first.
    // => NULL is less than any non-NULL values
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(F64),
    String(String),
}

/// A row materialized out of column storage, e.g. an undo pre-image.
pub type Row = Vec<DataValue>;

impl DataValue {
    /// Returns `true` if the value is null.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the type of the value, or `None` for null.
    pub const fn datatype(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(DataType::Bool),
            Self::Int32(_) => Some(DataType::Int32),
            Self::Int64(_) => Some(DataType::Int64),
            Self::Float64(_) => Some(DataType::Float64),
            Self::String(_) => Some(DataType::String),
        }
    }
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        Self::Float64(v.into())
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}
