// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Constructors of non-trivial fixtures shared by the serialization tests.

use crate::core::{ImprovementFilter, LearnerState};
use lasso_math::{DenseVector, SparseVector};
use std::collections::VecDeque;

/// The canonical three-element test vector in its dense shape.
pub(crate) fn dense_vector() -> DenseVector<f64> {
    DenseVector::from(vec![10.0, 0.0, 30.0])
}

/// The canonical test vector in its sparse shape: the same nonzeros as
/// [`dense_vector`].
pub(crate) fn sparse_vector() -> SparseVector<f64> {
    let mut v = SparseVector::new();
    v.set(1, 10.0);
    v.set(3, 30.0);
    v
}

/// A history list with one occupied slot surrounded by absent ones.
fn vector_list<P>(make: fn() -> P) -> VecDeque<Option<P>> {
    VecDeque::from([None, Some(make()), None])
}

/// A learner state with every field set to a distinctive value, including
/// absent history slots. Exercised by the round-trip tests.
pub(crate) fn learner_state<P>(make: fn() -> P) -> LearnerState<P, f64> {
    LearnerState {
        x: make(),
        new_x: make(),
        grad: make(),
        new_grad: make(),
        dir: make(),
        s_list: vector_list(make),
        y_list: vector_list(make),
        ro_list: VecDeque::from([333.0, 444.0]),
        alphas: vec![555.0, 666.0],
        value: 777.0,
        old_value: 77.5,
        dir_deriv: -7.25,
        step_fraction: 0.125,
        degrade_factor: 0.5,
        iteration: 888,
        max_iterations: 1200,
        line_search_step: 3,
        max_line_search_steps: 20,
        convergence_tolerance: 1e-4,
        memory_size: 999,
        l1weight: 1000.0,
        improvement_filter: ImprovementFilter::from_values(vec![1111.0, 2222.0]),
    }
}
