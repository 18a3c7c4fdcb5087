// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use num_traits::{Float, FromPrimitive, ToPrimitive};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::{Debug, Display};

/// An alias for float types (`f32`, `f64`) which combines the commonly
/// needed traits from `num_traits`, `std::fmt` and `serde`. It is
/// automatically implemented for all types which fulfill the trait bounds.
pub trait LassoFloat:
    'static + Float + FromPrimitive + ToPrimitive + Debug + Display + Serialize + DeserializeOwned
{
}

/// `LassoFloat` is automatically implemented for all types which fulfill the
/// trait bounds.
impl<I> LassoFloat for I where
    I: 'static
        + Float
        + FromPrimitive
        + ToPrimitive
        + Debug
        + Display
        + Serialize
        + DeserializeOwned
{
}
