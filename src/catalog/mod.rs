// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Table and column metadata consumed by the table store.

mod column;
mod constraint;
mod table;

pub use self::column::*;
pub use self::constraint::*;
pub use self::table::*;
