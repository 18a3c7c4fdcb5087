// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Orthant-Wise Limited-memory Quasi-Newton method
//!
//! OWL-QN extends L-BFGS to objectives with an L1 regularization term. The
//! L1 term is not differentiable at zero, so the method substitutes a
//! pseudo-gradient for the gradient, restricts each search direction to the
//! orthant of the steepest descent direction, and projects every
//! line-search step back onto the orthant of the current iterate.
//!
//! The engine is a resumable state machine rather than a closed loop: the
//! evaluator calls [`Owlqn::set_objective_and_gradient`] with the value and
//! gradient at the trial iterate, then [`Owlqn::initialize`] (first cycle)
//! or [`Owlqn::gradient_descent`] (every later cycle). Each call either
//! emits the next trial iterate to probe or reaches a terminal state, which
//! is both returned as a typed [`OwlqnStatus`] and materialized as a
//! termination flag file for external drivers.
//!
//! # References:
//!
//! \[0\] Galen Andrew and Jianfeng Gao (2007). Scalable Training of
//! L1-Regularized Log-Linear Models. ICML.
//!
//! \[1\] Jorge Nocedal and Stephen J. Wright (2006). Numerical Optimization.
//! Springer. ISBN 0-387-30303-0.

mod dense;
mod param;
mod sparse;

pub use param::OwlqnParam;

use crate::core::{Error, LassoFloat, LearnerState, TerminationFlag, TerminationReason};
use crate::solver::linesearch::ArmijoCondition;
use lasso_math::{AddScaled, AddScaledInto, DotProduct, Scale, ScaleInto, ZeroLike};
use std::mem;

/// Outcome of one engine invocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OwlqnStatus {
    /// A new trial iterate awaits evaluation.
    Probing,
    /// Training is over; the flag file has been written.
    Terminated(TerminationReason),
}

impl OwlqnStatus {
    /// The termination reason, if the engine reached a terminal state.
    pub fn reason(&self) -> Option<TerminationReason> {
        match *self {
            OwlqnStatus::Probing => None,
            OwlqnStatus::Terminated(reason) => Some(reason),
        }
    }
}

/// The OWL-QN optimizer engine.
///
/// Owns a [`LearnerState`] and advances it one evaluator observation at a
/// time. The engine is strictly sequential: every method runs to completion
/// and the state never observably holds a partial update.
#[derive(Clone, Debug)]
pub struct Owlqn<P, F> {
    state: LearnerState<P, F>,
    condition: ArmijoCondition<F>,
}

/// The Armijo constant of the line-search acceptance test.
const C1: f64 = 1e-4;

impl<P, F> Owlqn<P, F>
where
    P: OwlqnParam<F>,
    F: LassoFloat,
{
    /// Seed a fresh optimizer at the iterate `initial_x`.
    ///
    /// `memory_size` caps the limited-memory history, `l1weight` is the L1
    /// regularization strength (zero disables the orthant machinery), and
    /// `max_feature_number` pre-sizes dense working vectors (zero skips
    /// pre-sizing).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initial_x: P,
        memory_size: usize,
        l1weight: F,
        max_line_search_steps: usize,
        max_iterations: usize,
        convergence_tolerance: F,
        max_feature_number: usize,
    ) -> Result<Self, Error> {
        let state = LearnerState::new(
            initial_x,
            memory_size,
            l1weight,
            max_line_search_steps,
            max_iterations,
            convergence_tolerance,
            max_feature_number,
        )?;
        Self::from_state(state)
    }

    /// Resume an optimizer from a reloaded state.
    pub fn from_state(state: LearnerState<P, F>) -> Result<Self, Error> {
        Ok(Owlqn {
            state,
            condition: ArmijoCondition::new(float!(C1))?,
        })
    }

    /// The engine's state.
    pub fn state(&self) -> &LearnerState<P, F> {
        &self.state
    }

    /// Surrender the engine's state, e.g. to publish the final iterates.
    pub fn into_state(self) -> LearnerState<P, F> {
        self.state
    }

    /// Record the objective value and gradient the evaluator computed at
    /// the trial iterate. Takes ownership of the gradient buffer.
    pub fn set_objective_and_gradient(&mut self, value: F, gradient: P) {
        self.state.value = value;
        self.state.new_grad = gradient;
    }

    /// Start the first line search. Expects one preceding
    /// [`set_objective_and_gradient`](`Owlqn::set_objective_and_gradient`)
    /// call with the value and gradient at the seed iterate.
    ///
    /// The first iteration uses a conservative step policy: a unit-norm
    /// step with a sharp backoff, because no curvature information exists
    /// yet to scale the direction.
    pub fn initialize(&mut self, flag: &TerminationFlag) -> Result<OwlqnStatus, Error> {
        self.state.grad = self.state.new_grad.clone();
        let value = self.state.value;
        self.state.improvement_filter.get_improvement(value);

        self.update_dir();
        self.state.dir_deriv = self.dir_deriv();
        if self.state.dir_deriv >= F::zero() {
            return self.terminate(flag, TerminationReason::NonDescentDirection);
        }

        debug_assert_eq!(self.state.iteration, 0);
        debug_assert_eq!(self.state.line_search_step, 0);
        let norm_dir = self.state.dir.dot(&self.state.dir).sqrt();
        self.state.step_fraction = F::one() / norm_dir;
        self.state.degrade_factor = float!(0.1);

        self.state.old_value = self.state.value;
        self.next_point(self.state.step_fraction);
        Ok(OwlqnStatus::Probing)
    }

    /// Consume one line-search observation: accept the probe and advance to
    /// the next iteration, or back off the step and probe again. Expects
    /// one preceding
    /// [`set_objective_and_gradient`](`Owlqn::set_objective_and_gradient`)
    /// call with the value and gradient at the current trial iterate.
    pub fn gradient_descent(&mut self, flag: &TerminationFlag) -> Result<OwlqnStatus, Error> {
        let accepted = self.condition.eval(
            self.state.value,
            self.state.old_value,
            self.state.dir_deriv,
            self.state.step_fraction,
        );

        if accepted {
            // The line search succeeded and a new iteration may start.
            let improvement = self.state.improvement_filter.get_improvement(self.state.value);
            if improvement < self.state.convergence_tolerance {
                return self.terminate(flag, TerminationReason::Converged);
            }

            self.shift()?;

            if self.state.iteration > self.state.max_iterations {
                return self.terminate(flag, TerminationReason::MaxIterationsReached);
            }

            self.update_dir();
            self.state.dir_deriv = self.dir_deriv();
            if self.state.dir_deriv >= F::zero() {
                return self.terminate(flag, TerminationReason::NonDescentDirection);
            }

            // Past the first iteration a plain unit step with halving
            // backoff suffices; the two-loop recursion already scales the
            // direction.
            if self.state.iteration > 0 {
                self.state.step_fraction = F::one();
                self.state.degrade_factor = float!(0.5);
            }

            self.state.old_value = self.state.value;
            self.next_point(self.state.step_fraction);
        } else {
            // Keep searching along the current direction.
            self.state.line_search_step += 1;
            if self.state.line_search_step > self.state.max_line_search_steps {
                return self.terminate(flag, TerminationReason::LineSearchExhausted);
            }
            self.state.step_fraction = self.state.step_fraction * self.state.degrade_factor;
            self.next_point(self.state.step_fraction);
        }

        Ok(OwlqnStatus::Probing)
    }

    fn terminate(
        &mut self,
        flag: &TerminationFlag,
        reason: TerminationReason,
    ) -> Result<OwlqnStatus, Error> {
        flag.set(reason, &self.state)?;
        Ok(OwlqnStatus::Terminated(reason))
    }

    fn update_dir(&mut self) {
        self.make_steepest_desc_dir();
        self.map_dir_by_inverse_hessian();
        self.fix_dir_signs();
    }

    /// Compute the steepest descent direction of the regularized objective
    /// and mirror it into `new_grad`, where
    /// [`fix_dir_signs`](`Owlqn::fix_dir_signs`) finds it after the
    /// inverse-Hessian mapping has overwritten `dir`.
    fn make_steepest_desc_dir(&mut self) {
        let state = &mut self.state;
        if state.l1weight.is_zero() {
            state.dir.scale_into(&state.grad, float!(-1.0));
        } else {
            P::steepest_desc_dir(&mut state.dir, &state.x, &state.grad, state.l1weight);
        }
        state.new_grad = state.dir.clone();
    }

    /// The standard L-BFGS two-loop recursion over the (s, y, ro) history.
    /// With an empty history the direction passes through unchanged.
    fn map_dir_by_inverse_hessian(&mut self) {
        let state = &mut self.state;
        let count = state.s_list.len();
        if count == 0 {
            return;
        }

        for i in (0..count).rev() {
            if let (Some(s), Some(y)) = (&state.s_list[i], &state.y_list[i]) {
                let alpha = -s.dot(&state.dir) / state.ro_list[i];
                state.alphas[i] = alpha;
                state.dir.add_scaled(y, alpha);
            }
        }

        if let Some(last_y) = state.y_list[count - 1].as_ref() {
            let y_dot_y = last_y.dot(last_y);
            let scalar = state.ro_list[count - 1] / y_dot_y;
            state.dir.scale(scalar);
        }

        for i in 0..count {
            if let (Some(s), Some(y)) = (&state.s_list[i], &state.y_list[i]) {
                let beta = y.dot(&state.dir) / state.ro_list[i];
                state.dir.add_scaled(s, -state.alphas[i] - beta);
            }
        }
    }

    /// Constrain the mapped direction to the orthant of the steepest
    /// descent direction. Without regularization there is no orthant to
    /// respect.
    fn fix_dir_signs(&mut self) {
        let state = &mut self.state;
        if state.l1weight > F::zero() {
            P::fix_dir_signs(&mut state.dir, &state.new_grad);
        }
    }

    /// Directional derivative of the regularized objective along `dir`,
    /// taken against the pseudo-gradient when the L1 term is active.
    fn dir_deriv(&self) -> F {
        let state = &self.state;
        if state.l1weight.is_zero() {
            state.dir.dot(&state.grad)
        } else {
            P::dir_deriv(&state.dir, &state.x, &state.grad, state.l1weight)
        }
    }

    /// Emit the trial iterate `x + alpha * dir`, projected back onto the
    /// orthant of `x` when the L1 term is active.
    fn next_point(&mut self, alpha: F) {
        let state = &mut self.state;
        state.new_x.add_scaled_into(&state.x, &state.dir, alpha);
        if state.l1weight > F::zero() {
            P::project_orthant(&mut state.new_x, &state.x);
        }
    }

    /// Commit the accepted trial point and push the step into the history
    /// ring.
    ///
    /// When the history is below its cap a fresh pair of buffers is
    /// allocated; if that allocation fails, the cap is silently lowered to
    /// the current history length and the oldest buffers are recycled
    /// instead. Only an optimizer with no history at all treats allocation
    /// failure as fatal.
    fn shift(&mut self) -> Result<(), Error> {
        let state = &mut self.state;

        let mut next_pair = if state.s_list.len() < state.memory_size {
            match (state.x.try_zero_like(), state.x.try_zero_like()) {
                (Some(s), Some(y)) => Some((s, y)),
                _ => {
                    state.memory_size = state.s_list.len();
                    None
                }
            }
        } else {
            None
        };

        if next_pair.is_none() {
            if state.s_list.is_empty() {
                return Err(lasso_error!(
                    OutOfMemory,
                    "cannot allocate history buffers and there is no history to recycle"
                ));
            }
            let s = state.s_list.pop_front().and_then(|slot| slot);
            let y = state.y_list.pop_front().and_then(|slot| slot);
            state.ro_list.pop_front();
            next_pair = match (s, y) {
                (Some(s), Some(y)) => Some((s, y)),
                // The recycled slot was recorded as absent; fall back to a
                // fresh allocation.
                _ => match (state.x.try_zero_like(), state.x.try_zero_like()) {
                    (Some(s), Some(y)) => Some((s, y)),
                    _ => None,
                },
            };
        }

        let Some((mut next_s, mut next_y)) = next_pair else {
            return Err(lasso_error!(
                OutOfMemory,
                "cannot allocate history buffers to replace an absent slot"
            ));
        };

        next_s.add_scaled_into(&state.new_x, &state.x, float!(-1.0));
        next_y.add_scaled_into(&state.new_grad, &state.grad, float!(-1.0));
        let ro = next_s.dot(&next_y);

        state.s_list.push_back(Some(next_s));
        state.y_list.push_back(Some(next_y));
        state.ro_list.push_back(ro);

        mem::swap(&mut state.x, &mut state.new_x);
        mem::swap(&mut state.grad, &mut state.new_grad);

        state.line_search_step = 0;
        state.iteration += 1;
        Ok(())
    }
}
