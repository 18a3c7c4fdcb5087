// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::LassoFloat;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Declares convergence from the average improvement of the objective value
/// over the recent iterations.
///
/// The filter keeps a window of up to twice
/// [`NUM_ITERATIONS_TO_AVERAGE`](`ImprovementFilter::NUM_ITERATIONS_TO_AVERAGE`)
/// recent values. Until more than `NUM_ITERATIONS_TO_AVERAGE` values have
/// been seen, [`get_improvement`](`ImprovementFilter::get_improvement`)
/// returns infinity, so early iterations can never satisfy a convergence
/// tolerance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementFilter<F> {
    value_history: VecDeque<F>,
}

impl<F: LassoFloat> ImprovementFilter<F> {
    /// Number of iterations the improvement is averaged over.
    pub const NUM_ITERATIONS_TO_AVERAGE: usize = 5;

    /// An empty filter.
    pub fn new() -> Self {
        ImprovementFilter {
            value_history: VecDeque::new(),
        }
    }

    /// Relative average improvement of `new_value` over the oldest value in
    /// the window, or infinity while the window is still filling up. The
    /// value is appended to the window in either case; the oldest value is
    /// dropped once the window holds `2 * NUM_ITERATIONS_TO_AVERAGE` values.
    pub fn get_improvement(&mut self, new_value: F) -> F {
        let mut ret = F::infinity();

        if self.value_history.len() > Self::NUM_ITERATIONS_TO_AVERAGE {
            if let Some(&previous_value) = self.value_history.front() {
                if self.value_history.len() == 2 * Self::NUM_ITERATIONS_TO_AVERAGE {
                    self.value_history.pop_front();
                }
                let len = float!(self.value_history.len() as f64);
                let average_improvement = (previous_value - new_value) / len;
                ret = average_improvement / new_value.abs();
            }
        }

        self.value_history.push_back(new_value);

        ret
    }

    /// The window contents, oldest first.
    pub fn values(&self) -> Vec<F> {
        self.value_history.iter().copied().collect()
    }

    /// Rebuild a filter from a serialized window.
    pub fn from_values(values: Vec<F>) -> Self {
        ImprovementFilter {
            value_history: values.into(),
        }
    }
}

impl<F: LassoFloat> fmt::Display for ImprovementFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.value_history.iter().enumerate() {
            write!(f, "{}:{} ", i, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const W: usize = ImprovementFilter::<f64>::NUM_ITERATIONS_TO_AVERAGE;

    #[test]
    fn test_infinite_while_filling() {
        let mut filter = ImprovementFilter::new();
        // The first W + 1 calls see a window of at most W values.
        for i in 0..=W {
            assert!(filter.get_improvement(100.0 - i as f64).is_infinite());
        }
        assert!(filter.get_improvement(90.0).is_finite());
    }

    #[test]
    fn test_average_improvement() {
        let mut filter = ImprovementFilter::new();
        for v in [100.0, 90.0, 80.0, 70.0, 60.0, 50.0] {
            filter.get_improvement(v);
        }
        // Window is [100, 90, ..., 50]; the next reading improves on the
        // front value 100 by 60 over 6 window entries.
        let ret = filter.get_improvement(40.0);
        assert_relative_eq!(ret, (100.0 - 40.0) / 6.0 / 40.0);
    }

    #[test]
    fn test_window_never_exceeds_twice_the_average_length() {
        let mut filter = ImprovementFilter::new();
        for i in 0..100 {
            filter.get_improvement(1000.0 - i as f64);
            assert!(filter.values().len() <= 2 * W);
        }
        assert_eq!(filter.values().len(), 2 * W);
    }

    #[test]
    fn test_full_window_pops_front_before_averaging() {
        let mut filter = ImprovementFilter::from_values((0..2 * W).map(|i| 100.0 - i as f64).collect());
        // Front is 100; after the pop the divisor is 2W - 1, not 2W.
        let ret = filter.get_improvement(80.0);
        assert_relative_eq!(ret, (100.0 - 80.0) / (2 * W - 1) as f64 / 80.0);
    }

    #[test]
    fn test_round_trip_values() {
        let filter = ImprovementFilter::from_values(vec![1111.0, 2222.0]);
        assert_eq!(filter.values(), vec![1111.0, 2222.0]);
        assert_eq!(format!("{}", filter), "0:1111 1:2222 ");
    }
}
