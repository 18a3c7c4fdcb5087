// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Sparse realizations of the OWL-QN kernels.
//!
//! Each kernel is a key-ordered walk over two sparse operands. An index
//! absent from a vector is an implicit zero, so every walk has three cases:
//! the index is in both vectors, only in the left one, or only in the
//! right one. Indices absent from both carry no information and are never
//! visited.

use crate::core::LassoFloat;
use crate::solver::owlqn::OwlqnParam;
use lasso_math::SparseVector;

impl<F: LassoFloat> OwlqnParam<F> for SparseVector<F> {
    fn steepest_desc_dir(dir: &mut Self, x: &Self, grad: &Self, l1weight: F) {
        dir.clear();

        let mut ix = x.iter().peekable();
        let mut ig = grad.iter().peekable();

        while let (Some(&(&kx, &vx)), Some(&(&kg, &vg))) = (ix.peek(), ig.peek()) {
            if kx <= kg {
                // x[i] != 0, grad[i] may or may not be 0.
                if vx < F::zero() {
                    dir.set(kx, -grad.get(kx) + l1weight);
                } else if vx > F::zero() {
                    dir.set(kx, -grad.get(kx) - l1weight);
                }
                if kg == kx {
                    ig.next();
                }
                ix.next();
            } else {
                // x[i] == 0 && grad[i] != 0
                if vg < -l1weight {
                    dir.set(kg, -vg - l1weight);
                } else if vg > l1weight {
                    dir.set(kg, -vg + l1weight);
                }
                ig.next();
            }
        }

        for (&kx, &vx) in ix {
            // x[i] != 0 && grad[i] == 0
            if vx < F::zero() {
                dir.set(kx, l1weight);
            } else if vx > F::zero() {
                dir.set(kx, -l1weight);
            }
        }

        for (&kg, &vg) in ig {
            // x[i] == 0 && grad[i] != 0
            if vg < -l1weight {
                dir.set(kg, -vg - l1weight);
            } else if vg > l1weight {
                dir.set(kg, -vg + l1weight);
            }
        }
    }

    fn fix_dir_signs(dir: &mut Self, steepest_dir: &Self) {
        // An entry of dir with no matching steepest entry has product zero
        // and is erased along with the genuinely disagreeing ones.
        dir.retain(|k, v| v * steepest_dir.get(k) > F::zero());
    }

    fn dir_deriv(dir: &Self, x: &Self, grad: &Self, l1weight: F) -> F {
        let mut ret = F::zero();

        let mut i_dir = dir.iter().peekable();
        let mut i_x = x.iter().peekable();

        while let (Some(&(&kd, &vd)), Some(&(&kx, &vx))) = (i_dir.peek(), i_x.peek()) {
            if kd == kx {
                // dir[i] != 0 && x[i] != 0
                if vx < F::zero() {
                    ret = ret + vd * (grad.get(kd) - l1weight);
                } else if vx > F::zero() {
                    ret = ret + vd * (grad.get(kd) + l1weight);
                }
                i_dir.next();
                i_x.next();
            } else if kd < kx {
                // dir[i] != 0 && x[i] == 0
                if vd < F::zero() {
                    ret = ret + vd * (grad.get(kd) - l1weight);
                } else if vd > F::zero() {
                    ret = ret + vd * (grad.get(kd) + l1weight);
                }
                i_dir.next();
            } else {
                // dir[i] == 0 && x[i] != 0
                i_x.next();
            }
        }

        for (&kd, &vd) in i_dir {
            // dir[i] != 0 && x[i] == 0
            if vd < F::zero() {
                ret = ret + vd * (grad.get(kd) - l1weight);
            } else if vd > F::zero() {
                ret = ret + vd * (grad.get(kd) + l1weight);
            }
        }

        ret
    }

    fn project_orthant(new_x: &mut Self, x: &Self) {
        // Only indices present in both vectors can have a strictly negative
        // product; an implicit zero on either side never crosses.
        let crossings: Vec<usize> = new_x
            .iter()
            .filter(|&(&k, &v)| x.get(k) * v < F::zero())
            .map(|(&k, _)| k)
            .collect();
        for k in crossings {
            new_x.set(k, F::zero());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lasso_math::DenseVector;

    // The same nine-coordinate fixture as the dense tests; here the zeros
    // are simply absent. Each sparse kernel must agree with its dense
    // counterpart index by index.
    fn fixture_x() -> SparseVector<f64> {
        [(1, 1.0), (2, 1.0), (3, -1.0), (4, -1.0), (7, 1.0), (8, -1.0)]
            .into_iter()
            .collect()
    }

    fn fixture_grad() -> SparseVector<f64> {
        [(1, 3.0), (2, -3.0), (3, 3.0), (4, -3.0), (5, 3.0), (6, -3.0)]
            .into_iter()
            .collect()
    }

    fn dense_of(sv: &SparseVector<f64>, dim: usize) -> DenseVector<f64> {
        let mut dv = DenseVector::zeros(dim);
        for (&k, &v) in sv.iter() {
            dv[k] = v;
        }
        dv
    }

    #[test]
    fn test_steepest_desc_dir_matches_dense() {
        let x = fixture_x();
        let grad = fixture_grad();
        let mut dir = SparseVector::new();
        SparseVector::steepest_desc_dir(&mut dir, &x, &grad, 2.0);

        let mut dense_dir = DenseVector::zeros(9);
        DenseVector::steepest_desc_dir(&mut dense_dir, &dense_of(&x, 9), &dense_of(&grad, 9), 2.0);

        for i in 0..9 {
            assert_relative_eq!(dir.get(i), dense_dir[i]);
        }
    }

    #[test]
    fn test_steepest_desc_dir_x_longer_than_grad() {
        // The tail of x extends past the last gradient entry.
        let x: SparseVector<f64> = [(1, 1.0), (9, -1.0), (12, 1.0)].into_iter().collect();
        let grad: SparseVector<f64> = [(1, 3.0)].into_iter().collect();
        let mut dir = SparseVector::new();
        SparseVector::steepest_desc_dir(&mut dir, &x, &grad, 2.0);
        assert_relative_eq!(dir.get(1), -5.0);
        assert_relative_eq!(dir.get(9), 2.0);
        assert_relative_eq!(dir.get(12), -2.0);
    }

    #[test]
    fn test_steepest_desc_dir_grad_longer_than_x() {
        let x: SparseVector<f64> = [(1, 1.0)].into_iter().collect();
        let grad: SparseVector<f64> = [(1, 3.0), (9, 3.0), (12, -1.0)].into_iter().collect();
        let mut dir = SparseVector::new();
        SparseVector::steepest_desc_dir(&mut dir, &x, &grad, 2.0);
        assert_relative_eq!(dir.get(1), -5.0);
        assert_relative_eq!(dir.get(9), -1.0);
        // |grad| inside the subdifferential: the coordinate stays put.
        assert!(!dir.has(12));
    }

    #[test]
    fn test_dir_deriv_matches_dense() {
        let x = fixture_x();
        let grad = fixture_grad();
        let dir = fixture_grad();

        let sparse = SparseVector::dir_deriv(&dir, &x, &grad, 2.0);
        let dense = DenseVector::dir_deriv(
            &dense_of(&dir, 9),
            &dense_of(&x, 9),
            &dense_of(&grad, 9),
            2.0,
        );
        assert_relative_eq!(sparse, dense);
        assert_relative_eq!(sparse, 66.0);
    }

    #[test]
    fn test_dir_deriv_dir_longer_than_x() {
        let x: SparseVector<f64> = [(1, 1.0)].into_iter().collect();
        let grad: SparseVector<f64> = [(1, 3.0), (9, 3.0)].into_iter().collect();
        let dir: SparseVector<f64> = [(1, 3.0), (9, 3.0), (12, -2.0)].into_iter().collect();

        let sparse = SparseVector::dir_deriv(&dir, &x, &grad, 2.0);
        let dense = DenseVector::dir_deriv(
            &dense_of(&dir, 13),
            &dense_of(&x, 13),
            &dense_of(&grad, 13),
            2.0,
        );
        assert_relative_eq!(sparse, dense);
    }

    #[test]
    fn test_fix_dir_signs_matches_dense() {
        let mut dir: SparseVector<f64> =
            [(1, 3.0), (2, -3.0), (3, 3.0), (4, -3.0), (7, 3.0), (8, -3.0)]
                .into_iter()
                .collect();
        let steepest: SparseVector<f64> =
            [(1, 1.0), (2, 1.0), (3, -1.0), (4, -1.0), (5, 1.0), (6, -1.0)]
                .into_iter()
                .collect();
        SparseVector::fix_dir_signs(&mut dir, &steepest);

        assert_relative_eq!(dir.get(1), 3.0);
        assert!(!dir.has(2));
        assert_relative_eq!(dir.get(3), -3.0);
        assert!(!dir.has(4));
        assert!(!dir.has(7));
        assert!(!dir.has(8));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_project_orthant() {
        let x: SparseVector<f64> = [(0, 1.0), (1, -1.0), (2, 1.0)].into_iter().collect();
        let dir: SparseVector<f64> = [(0, -3.0), (1, 3.0), (2, -3.0), (3, 3.0)]
            .into_iter()
            .collect();
        let mut new_x = SparseVector::new();
        use lasso_math::AddScaledInto;
        new_x.add_scaled_into(&x, &dir, 0.5);
        assert_relative_eq!(new_x.get(0), -0.5);
        assert_relative_eq!(new_x.get(1), 0.5);
        assert_relative_eq!(new_x.get(2), -0.5);
        assert_relative_eq!(new_x.get(3), 1.5);

        SparseVector::project_orthant(&mut new_x, &x);
        assert!(!new_x.has(0));
        assert!(!new_x.has(1));
        assert!(!new_x.has(2));
        assert_relative_eq!(new_x.get(3), 1.5);
    }
}
