// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The logistic-regression objective.
//!
//! Training data comes as grouped instances: a feature vector together with
//! the number of times it was observed with a positive and with any label.
//! The objective is the negative log-likelihood of the grouped
//! observations; the L1 term is *not* part of it — the optimizer applies
//! L1 regularization through its pseudo-gradient, and the driving harness
//! adds the λ·‖x‖₁ penalty to the reported value.

use crate::core::{CostFunction, Error, Gradient, LassoFloat};
use lasso_math::{AddScaled, DenseVector, DotProduct, SparseVector, ZeroLike};
use std::marker::PhantomData;

/// A grouped training instance: `num_positives` of the `num_appearances`
/// observations of `features` carried a positive label.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance<F> {
    /// Positive observations of this feature vector.
    pub num_positives: F,
    /// Total observations of this feature vector.
    pub num_appearances: F,
    /// The feature vector; per-instance features are always sparse.
    pub features: SparseVector<F>,
}

/// A model vector a [`LogisticRegression`] objective can score against.
///
/// Per-instance feature vectors are sparse; the model may be dense or
/// sparse. The sparse side drives both the scoring dot product and the
/// gradient accumulation.
pub trait ModelVector<F>: ZeroLike {
    /// `dot(features, self)`.
    fn feature_dot(&self, features: &SparseVector<F>) -> F;

    /// `self <- self + c * features`.
    fn add_scaled_features(&mut self, features: &SparseVector<F>, c: F);
}

impl<F: LassoFloat> ModelVector<F> for DenseVector<F> {
    fn feature_dot(&self, features: &SparseVector<F>) -> F {
        features.dot(self)
    }

    fn add_scaled_features(&mut self, features: &SparseVector<F>, c: F) {
        self.add_scaled(features, c);
    }
}

impl<F: LassoFloat> ModelVector<F> for SparseVector<F> {
    fn feature_dot(&self, features: &SparseVector<F>) -> F {
        features.dot(self)
    }

    fn add_scaled_features(&mut self, features: &SparseVector<F>, c: F) {
        self.add_scaled(features, c);
    }
}

/// The grouped log-loss objective over a set of training instances.
///
/// `P` picks the model shape (dense or sparse); it is inferred from the
/// optimizer the objective is trained with.
#[derive(Clone, Debug)]
pub struct LogisticRegression<P, F> {
    instances: Vec<Instance<F>>,
    shape: PhantomData<P>,
}

impl<P, F: LassoFloat> LogisticRegression<P, F> {
    /// An objective over already-parsed instances.
    pub fn new(instances: Vec<Instance<F>>) -> Self {
        LogisticRegression {
            instances,
            shape: PhantomData,
        }
    }

    /// Parse the whitespace text instance format: one instance per line,
    /// `num_positives num_appearances` followed by `feature_id value`
    /// pairs.
    ///
    /// A negative `num_positives` marks an unlabeled instance; unlabeled
    /// instances and instances with more positives than appearances are
    /// skipped. Malformed numbers are an error.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        let mut instances = Vec::new();
        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let Some(first) = tokens.next() else { continue };
            let num_positives = parse_float::<F>(first)?;
            let num_appearances = parse_float::<F>(
                tokens
                    .next()
                    .ok_or_else(|| -> Error { lasso_error!(InvalidParameter, "truncated instance line") })?,
            )?;

            let mut features = SparseVector::new();
            loop {
                let Some(id) = tokens.next() else { break };
                let value = tokens.next().ok_or_else(|| -> Error {
                    lasso_error!(InvalidParameter, "feature id without a value")
                })?;
                let id: usize = id.parse().map_err(|_| -> Error {
                    lasso_error!(InvalidParameter, format!("bad feature id {:?}", id))
                })?;
                features.set(id, parse_float::<F>(value)?);
            }

            if num_positives < F::zero() {
                // Unlabeled instance.
                continue;
            }
            if num_positives > num_appearances {
                // More positives than observations is nonsense; drop it.
                continue;
            }

            instances.push(Instance {
                num_positives,
                num_appearances,
                features,
            });
        }
        Ok(LogisticRegression::new(instances))
    }

    /// The parsed instances.
    pub fn instances(&self) -> &[Instance<F>] {
        &self.instances
    }
}

fn parse_float<F: LassoFloat>(token: &str) -> Result<F, Error> {
    let value: f64 = token
        .parse()
        .map_err(|_| -> Error { lasso_error!(InvalidParameter, format!("bad number {:?}", token)) })?;
    F::from_f64(value)
        .ok_or_else(|| -> Error { lasso_error!(InvalidParameter, format!("unrepresentable number {:?}", token)) })
}

/// `ln(1 + exp(-score))`, clamped so extreme scores neither overflow nor
/// underflow.
fn loss_term<F: LassoFloat>(score: F) -> F {
    if score < float!(-30.0) {
        -score
    } else if score > float!(30.0) {
        F::zero()
    } else {
        (F::one() + (-score).exp()).ln()
    }
}

/// `P(positive | score)`, with the same clamp as [`loss_term`].
fn prob<F: LassoFloat>(score: F) -> F {
    if score < float!(-30.0) {
        F::zero()
    } else if score > float!(30.0) {
        F::one()
    } else {
        F::one() / (F::one() + (-score).exp())
    }
}

impl<P, F> CostFunction for LogisticRegression<P, F>
where
    P: ModelVector<F>,
    F: LassoFloat,
{
    type Param = P;
    type Output = F;

    fn cost(&self, param: &P) -> Result<F, Error> {
        let mut loss = F::zero();
        for instance in &self.instances {
            let score = param.feature_dot(&instance.features);
            let num_negatives = instance.num_appearances - instance.num_positives;
            if instance.num_positives > F::zero() {
                loss = loss + loss_term(score) * instance.num_positives;
            }
            if num_negatives > F::zero() {
                loss = loss + loss_term(-score) * num_negatives;
            }
        }
        Ok(loss)
    }
}

impl<P, F> Gradient for LogisticRegression<P, F>
where
    P: ModelVector<F>,
    F: LassoFloat,
{
    type Param = P;
    type Gradient = P;

    fn gradient(&self, param: &P) -> Result<P, Error> {
        let mut grad = param.zero_like();
        for instance in &self.instances {
            let score = param.feature_dot(&instance.features);
            let num_negatives = instance.num_appearances - instance.num_positives;
            if instance.num_positives > F::zero() {
                grad.add_scaled_features(
                    &instance.features,
                    -instance.num_positives * (F::one() - prob(score)),
                );
            }
            if num_negatives > F::zero() {
                grad.add_scaled_features(
                    &instance.features,
                    num_negatives * (F::one() - prob(-score)),
                );
            }
        }
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_text() {
        let problem: LogisticRegression<DenseVector<f64>, f64> =
            LogisticRegression::from_text("3 4 0 1 2 0.5\n\n0 2 1 1\n").unwrap();
        let instances = problem.instances();
        assert_eq!(instances.len(), 2);
        assert_relative_eq!(instances[0].num_positives, 3.0);
        assert_relative_eq!(instances[0].num_appearances, 4.0);
        assert_relative_eq!(instances[0].features.get(0), 1.0);
        assert_relative_eq!(instances[0].features.get(2), 0.5);
        assert_relative_eq!(instances[1].num_positives, 0.0);
    }

    #[test]
    fn test_from_text_skips_unlabeled_and_invalid() {
        let problem: LogisticRegression<DenseVector<f64>, f64> =
            LogisticRegression::from_text("-1 4 0 1\n5 4 0 1\n2 4 0 1\n").unwrap();
        // The unlabeled (-1) and the 5-of-4 instance are dropped.
        assert_eq!(problem.instances().len(), 1);
        assert_relative_eq!(problem.instances()[0].num_positives, 2.0);
    }

    #[test]
    fn test_from_text_rejects_malformed_lines() {
        assert!(LogisticRegression::<DenseVector<f64>, f64>::from_text("1\n").is_err());
        assert!(LogisticRegression::<DenseVector<f64>, f64>::from_text("1 2 0\n").is_err());
        assert!(LogisticRegression::<DenseVector<f64>, f64>::from_text("one 2\n").is_err());
    }

    #[test]
    fn test_cost_at_zero_weights_is_ln2_per_observation() {
        let problem: LogisticRegression<DenseVector<f64>, f64> =
            LogisticRegression::from_text("3 4 0 1\n").unwrap();
        let cost = problem.cost(&DenseVector::zeros(1)).unwrap();
        assert_relative_eq!(cost, 4.0 * 2f64.ln());
    }

    #[test]
    fn test_gradient_at_zero_weights() {
        let problem: LogisticRegression<DenseVector<f64>, f64> =
            LogisticRegression::from_text("3 4 0 1\n").unwrap();
        let grad = problem.gradient(&DenseVector::zeros(1)).unwrap();
        // At score 0 the model is indifferent: -3·(1-½) from the positives
        // plus 1·(1-½) from the negative.
        assert_relative_eq!(grad[0], -1.0);
    }

    #[test]
    fn test_dense_and_sparse_models_agree() {
        let text = "3 4 0 1 1 2\n0 2 1 1\n1 1 0 2\n";
        let dense: LogisticRegression<DenseVector<f64>, f64> =
            LogisticRegression::from_text(text).unwrap();
        let sparse: LogisticRegression<SparseVector<f64>, f64> =
            LogisticRegression::from_text(text).unwrap();

        let dense_model = DenseVector::from(vec![0.5, -0.25]);
        let sparse_model: SparseVector<f64> = [(0, 0.5), (1, -0.25)].into_iter().collect();

        let dense_cost = dense.cost(&dense_model).unwrap();
        let sparse_cost = sparse.cost(&sparse_model).unwrap();
        assert_relative_eq!(dense_cost, sparse_cost);

        let dense_grad = dense.gradient(&dense_model).unwrap();
        let sparse_grad = sparse.gradient(&sparse_model).unwrap();
        for i in 0..2 {
            assert_relative_eq!(dense_grad[i], sparse_grad.get(i));
        }
    }

    #[test]
    fn test_extreme_scores_are_clamped() {
        let problem: LogisticRegression<DenseVector<f64>, f64> =
            LogisticRegression::from_text("1 1 0 1\n").unwrap();
        let cost = problem.cost(&DenseVector::from(vec![-100.0])).unwrap();
        assert_relative_eq!(cost, 100.0);
        let cost = problem.cost(&DenseVector::from(vec![100.0])).unwrap();
        assert_relative_eq!(cost, 0.0);
    }
}
