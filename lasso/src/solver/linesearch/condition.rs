// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # References:
//!
//! \[0\] Jorge Nocedal and Stephen J. Wright (2006). Numerical Optimization.
//! Springer. ISBN 0-387-30303-0.

use crate::core::{Error, LassoFloat};
use serde::{Deserialize, Serialize};

/// Armijo (sufficient decrease) condition.
///
/// Accepts a step of length `alpha` when
/// `cost <= init_cost + c * alpha * dir_deriv`. The directional derivative
/// is supplied by the caller: under L1 regularization it is taken against
/// the pseudo-gradient, not the plain gradient.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ArmijoCondition<F> {
    c: F,
}

impl<F: LassoFloat> ArmijoCondition<F> {
    /// Constructor
    pub fn new(c: F) -> Result<Self, Error> {
        if c <= float!(0.0) || c >= float!(1.0) {
            return Err(lasso_error!(
                InvalidParameter,
                "ArmijoCondition: Parameter c must be in (0, 1)"
            ));
        }
        Ok(ArmijoCondition { c })
    }

    /// Evaluate the condition
    pub fn eval(&self, cur_cost: F, init_cost: F, dir_deriv: F, alpha: F) -> bool {
        cur_cost <= init_cost + self.c * alpha * dir_deriv
    }
}
