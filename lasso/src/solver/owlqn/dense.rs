// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::LassoFloat;
use crate::solver::owlqn::OwlqnParam;
use lasso_math::DenseVector;

impl<F: LassoFloat> OwlqnParam<F> for DenseVector<F> {
    fn steepest_desc_dir(dir: &mut Self, x: &Self, grad: &Self, l1weight: F) {
        assert_eq!(x.len(), dir.len());
        assert_eq!(grad.len(), dir.len());
        for i in 0..dir.len() {
            dir[i] = if x[i] < F::zero() {
                -grad[i] + l1weight
            } else if x[i] > F::zero() {
                -grad[i] - l1weight
            } else if grad[i] < -l1weight {
                -grad[i] - l1weight
            } else if grad[i] > l1weight {
                -grad[i] + l1weight
            } else {
                F::zero()
            };
        }
    }

    fn fix_dir_signs(dir: &mut Self, steepest_dir: &Self) {
        assert_eq!(dir.len(), steepest_dir.len());
        for i in 0..dir.len() {
            if dir[i] * steepest_dir[i] <= F::zero() {
                dir[i] = F::zero();
            }
        }
    }

    fn dir_deriv(dir: &Self, x: &Self, grad: &Self, l1weight: F) -> F {
        let mut ret = F::zero();
        for i in 0..dir.len() {
            if !dir[i].is_zero() {
                if x[i] < F::zero() {
                    ret = ret + dir[i] * (grad[i] - l1weight);
                } else if x[i] > F::zero() {
                    ret = ret + dir[i] * (grad[i] + l1weight);
                } else if dir[i] < F::zero() {
                    ret = ret + dir[i] * (grad[i] - l1weight);
                } else {
                    ret = ret + dir[i] * (grad[i] + l1weight);
                }
            }
        }
        ret
    }

    fn project_orthant(new_x: &mut Self, x: &Self) {
        for i in 0..x.len() {
            if x[i] * new_x[i] < F::zero() {
                new_x[i] = F::zero();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // The nine-coordinate fixture covers every sign combination of x and
    // grad: both zero, both nonzero with either sign, and one of them zero.
    fn fixture_x() -> DenseVector<f64> {
        DenseVector::from(vec![0.0, 1.0, 1.0, -1.0, -1.0, 0.0, 0.0, 1.0, -1.0])
    }

    fn fixture_grad() -> DenseVector<f64> {
        DenseVector::from(vec![0.0, 3.0, -3.0, 3.0, -3.0, 3.0, -3.0, 0.0, 0.0])
    }

    #[test]
    fn test_steepest_desc_dir() {
        let x = fixture_x();
        let grad = fixture_grad();
        let mut dir = DenseVector::zeros(9);
        DenseVector::steepest_desc_dir(&mut dir, &x, &grad, 2.0);
        assert_eq!(*dir, vec![0.0, -5.0, 1.0, -1.0, 5.0, -1.0, 1.0, -2.0, 2.0]);
    }

    #[test]
    fn test_dir_deriv() {
        let x = fixture_x();
        let grad = fixture_grad();
        let dir = fixture_grad();
        assert_relative_eq!(DenseVector::dir_deriv(&dir, &x, &grad, 2.0), 66.0);
    }

    #[test]
    fn test_fix_dir_signs() {
        let mut dir =
            DenseVector::from(vec![0.0, 3.0, -3.0, 3.0, -3.0, 0.0, 0.0, 3.0, -3.0]);
        let steepest =
            DenseVector::from(vec![0.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 0.0, 0.0]);
        DenseVector::fix_dir_signs(&mut dir, &steepest);
        assert_eq!(*dir, vec![0.0, 3.0, 0.0, -3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_project_orthant() {
        let x = DenseVector::from(vec![1.0, -1.0, 1.0, 0.0]);
        let dir = DenseVector::from(vec![-3.0, 3.0, -3.0, 3.0]);
        let mut new_x = DenseVector::zeros(4);
        use lasso_math::AddScaledInto;
        new_x.add_scaled_into(&x, &dir, 0.5);
        assert_eq!(*new_x, vec![-0.5, 0.5, -0.5, 1.5]);
        DenseVector::project_orthant(&mut new_x, &x);
        assert_eq!(*new_x, vec![0.0, 0.0, 0.0, 1.5]);
    }
}
