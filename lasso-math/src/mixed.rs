// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Mixed-shape operations: a sparse operand against a dense one.
//!
//! These cover the evaluator's hot path, where per-instance feature vectors
//! are sparse and the model vector may be dense. The sparse side drives the
//! loop; the dense side is random-access.

use crate::{AddScaled, DenseVector, DotProduct, SparseVector};
use num_traits::Float;

impl<F: Float> DotProduct<DenseVector<F>, F> for SparseVector<F> {
    /// Indices beyond the dense operand's length contribute zero. Keys are
    /// visited in ascending order, so the walk stops at the first
    /// out-of-range index.
    fn dot(&self, other: &DenseVector<F>) -> F {
        let mut ret = F::zero();
        for (&k, &v) in self.iter() {
            if k < other.len() {
                ret = ret + other[k] * v;
            } else {
                break;
            }
        }
        ret
    }
}

impl<F: Float> AddScaled<SparseVector<F>, F> for DenseVector<F> {
    /// The dense receiver is grown with zeros to fit the sparse operand's
    /// largest index. Callers that pre-size their dense vectors never
    /// trigger the growth.
    fn add_scaled(&mut self, v: &SparseVector<F>, c: F) {
        if let Some(max_index) = v.max_index() {
            self.grow(max_index + 1);
        }
        for (&k, &x) in v.iter() {
            self[k] = self[k] + x * c;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sparse_dense_dot() {
        let sv: SparseVector<f64> = [(0, 2.0), (2, 3.0)].into_iter().collect();
        let dv = DenseVector::from(vec![1.0, 10.0, 4.0]);
        assert_relative_eq!(sv.dot(&dv), 14.0);
    }

    #[test]
    fn test_sparse_dense_dot_out_of_range_contributes_zero() {
        let sv: SparseVector<f64> = [(1, 2.0), (9, 100.0)].into_iter().collect();
        let dv = DenseVector::from(vec![1.0, 3.0]);
        assert_relative_eq!(sv.dot(&dv), 6.0);
    }

    #[test]
    fn test_dense_add_scaled_sparse() {
        let mut dv = DenseVector::from(vec![1.0, 1.0, 1.0]);
        let sv: SparseVector<f64> = [(0, 2.0), (2, 4.0)].into_iter().collect();
        dv.add_scaled(&sv, 0.5);
        assert_eq!(dv.len(), 3);
        assert_relative_eq!(dv[0], 2.0);
        assert_relative_eq!(dv[1], 1.0);
        assert_relative_eq!(dv[2], 3.0);
    }

    #[test]
    fn test_dense_add_scaled_sparse_grows_receiver() {
        let mut dv = DenseVector::from(vec![1.0]);
        let sv: SparseVector<f64> = [(3, 2.0)].into_iter().collect();
        dv.add_scaled(&sv, 1.0);
        assert_eq!(dv.len(), 4);
        assert_relative_eq!(dv[0], 1.0);
        assert_relative_eq!(dv[1], 0.0);
        assert_relative_eq!(dv[2], 0.0);
        assert_relative_eq!(dv[3], 2.0);
    }
}
