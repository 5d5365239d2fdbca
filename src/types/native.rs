// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt::Debug;

use super::F64;

/// Primitive types that can live in a [`PrimitiveArray`].
///
/// Serialization bounds are left to the derives on the array types.
///
/// [`PrimitiveArray`]: crate::array::PrimitiveArray
pub trait NativeType:
    PartialOrd + PartialEq + Copy + Default + Debug + Send + Sync + 'static
{
}

impl NativeType for bool {}
impl NativeType for i32 {}
impl NativeType for i64 {}
impl NativeType for F64 {}
