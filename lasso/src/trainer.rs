// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A single-process harness that drives the optimizer the same way a
//! distributed reduce worker does: evaluate the objective at the trial
//! iterate, feed the engine, checkpoint, repeat until a flag is raised.

use crate::core::{
    CostFunction, Error, Gradient, LassoFloat, StateCheckpoint, TerminationFlag, TerminationReason,
};
use crate::solver::owlqn::{Owlqn, OwlqnParam, OwlqnStatus};
use lasso_math::L1Norm;
use num_traits::ToPrimitive;
use slog::{info, o, Drain};
use slog_async::OverflowStrategy;

/// Drives an [`Owlqn`] engine against an objective until termination.
///
/// Each cycle evaluates the cost and gradient at the engine's trial
/// iterate, adds the L1 regularization term to the cost (the gradient stays
/// that of the smooth loss; the engine handles the L1 term through its
/// pseudo-gradient), feeds both to the engine, and persists the engine
/// state. With [`checkpointing`](`Trainer::checkpointing`) enabled the
/// engine is rebuilt from the latest checkpoint at the top of every cycle —
/// the exact discipline of the distributed reducer, which makes local and
/// distributed runs produce the same iterates.
pub struct Trainer<O, P, F> {
    problem: O,
    learner: Option<Owlqn<P, F>>,
    checkpoint: Option<StateCheckpoint>,
    flag: TerminationFlag,
    logger: slog::Logger,
    initialized: bool,
}

/// The outcome of a training run.
#[derive(Clone, Debug)]
pub struct TrainingResult<P, F> {
    /// Why training stopped.
    pub reason: TerminationReason,
    /// The committed iterate.
    pub x: P,
    /// The trial iterate; on convergence this is the model to publish.
    pub new_x: P,
    /// The last objective value reported by the evaluator.
    pub value: F,
    /// Completed outer iterations.
    pub iterations: usize,
    /// Evaluator cycles driven, line-search probes included.
    pub cycles: u64,
}

impl<O, P, F> Trainer<O, P, F>
where
    O: CostFunction<Param = P, Output = F> + Gradient<Param = P, Gradient = P>,
    P: OwlqnParam<F>,
    F: LassoFloat,
{
    /// A trainer for `problem`, starting from a freshly seeded (or
    /// previously restored) engine.
    pub fn new(problem: O, learner: Owlqn<P, F>, flag: TerminationFlag) -> Self {
        Trainer {
            problem,
            learner: Some(learner),
            checkpoint: None,
            flag,
            logger: slog::Logger::root(slog::Discard, o!()),
            initialized: false,
        }
    }

    /// Log one record per evaluator cycle through `logger`.
    #[must_use]
    pub fn logger(mut self, logger: slog::Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Persist the engine state after every cycle and rebuild the engine
    /// from the latest checkpoint at the top of the next one. A checkpoint
    /// left behind by an earlier run resumes training where it stopped.
    #[must_use]
    pub fn checkpointing(mut self, checkpoint: StateCheckpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Run evaluator cycles until the engine reaches a terminal state.
    pub fn run(mut self) -> Result<TrainingResult<P, F>, Error> {
        if let Some(reason) = self.flag.read_reason()? {
            return Err(lasso_error!(
                InvalidParameter,
                format!(
                    "termination flag {:?} already exists ({}); remove it to train again",
                    self.flag.path(),
                    reason
                )
            ));
        }

        let mut cycles = 0u64;
        loop {
            let (mut learner, first) = self.obtain_learner()?;

            let new_x = learner.state().new_x().clone();
            let mut value = self.problem.cost(&new_x)?;
            let l1weight = learner.state().l1weight();
            if l1weight > F::zero() {
                value = value + l1weight * new_x.l1_norm();
            }
            let gradient = self.problem.gradient(&new_x)?;
            learner.set_objective_and_gradient(value, gradient);

            let status = if first {
                learner.initialize(&self.flag)?
            } else {
                learner.gradient_descent(&self.flag)?
            };
            self.initialized = true;
            cycles += 1;

            if let Some(checkpoint) = &self.checkpoint {
                let path = checkpoint.save(learner.state())?;
                info!(self.logger, "checkpoint written";
                      "path" => %path.display());
            }

            info!(self.logger, "evaluator cycle done";
                  "cycle" => cycles,
                  "iteration" => learner.state().iteration() as u64,
                  "line_search_step" => learner.state().line_search_step() as u64,
                  "value" => value.to_f64().unwrap_or(f64::NAN),
                  "step_fraction" => learner.state().step_fraction().to_f64().unwrap_or(f64::NAN));

            match status {
                OwlqnStatus::Probing => {
                    self.learner = Some(learner);
                }
                OwlqnStatus::Terminated(reason) => {
                    info!(self.logger, "training terminated"; "reason" => %reason);
                    let state = learner.into_state();
                    return Ok(TrainingResult {
                        reason,
                        x: state.x().clone(),
                        new_x: state.new_x().clone(),
                        value: state.value(),
                        iterations: state.iteration(),
                        cycles,
                    });
                }
            }
        }
    }

    /// The engine for the next cycle: reloaded from the latest checkpoint
    /// when checkpointing is on, otherwise the live in-memory engine. The
    /// returned bool says whether this is the very first cycle of the
    /// training run.
    fn obtain_learner(&mut self) -> Result<(Owlqn<P, F>, bool), Error> {
        match &self.checkpoint {
            Some(checkpoint) => match checkpoint.load()? {
                Some(state) => Ok((Owlqn::from_state(state)?, false)),
                None => {
                    let learner = self.learner.take().ok_or_else(|| -> Error {
                        lasso_error!(NotInitialized, "no checkpoint found and no seeded engine")
                    })?;
                    Ok((learner, true))
                }
            },
            None => {
                let learner = self.learner.take().ok_or_else(|| -> Error {
                    lasso_error!(NotInitialized, "the engine was consumed by a previous run")
                })?;
                Ok((learner, !self.initialized))
            }
        }
    }
}

/// A terminal logger in the crate's house format, for binaries and
/// examples that want cycle-by-cycle progress on screen.
pub fn term_logger() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator)
        .use_original_order()
        .build()
        .fuse();
    let drain = slog_async::Async::new(drain)
        .overflow_strategy(OverflowStrategy::Block)
        .build()
        .fuse();
    slog::Logger::root(drain, o!())
}
