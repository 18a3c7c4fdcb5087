// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! lasso trains L1-regularized logistic regression at scale with the
//! Orthant-Wise Limited-memory Quasi-Newton method (OWL-QN).
//!
//! The heart of the crate is a resumable optimizer: the OWL-QN state machine
//! in [`solver::owlqn::Owlqn`] consumes one `(value, gradient)` observation
//! per call, advances its line search or its outer iteration, and carries its
//! complete internal state in a [`core::LearnerState`] which serializes to a
//! record file after every step. An evaluator — a single process or a fleet
//! of map/reduce workers — computes the objective value and gradient at the
//! trial point, feeds the optimizer, writes the next checkpoint and repeats
//! until the optimizer declares a terminal state through a termination flag
//! file.
//!
//! Because the entire optimizer state round-trips through the checkpoint,
//! the iterates are identical whether the optimizer is driven in-process or
//! one evaluator cycle at a time from durable storage.
//!
//! Model vectors may be dense or sparse; see the `lasso-math` crate. The
//! engine is generic over the shape through
//! [`solver::owlqn::OwlqnParam`].
//!
//! # Pieces
//!
//! - [`solver::owlqn::Owlqn`] — the optimizer engine
//! - [`core::LearnerState`] — the durable optimizer state
//! - [`core::StateCheckpoint`] — numbered checkpoint files
//! - [`core::TerminationFlag`] — the out-of-band termination signal
//! - [`trainer::Trainer`] — a single-process driving harness
//! - [`logistic::LogisticRegression`] — the log-loss objective
//!
//! # Example
//!
//! ```
//! use lasso::core::TerminationFlag;
//! use lasso::logistic::LogisticRegression;
//! use lasso::solver::owlqn::Owlqn;
//! use lasso::trainer::Trainer;
//! use lasso_math::DenseVector;
//!
//! # fn run() -> Result<(), lasso::core::Error> {
//! let problem = LogisticRegression::from_text("3 4 0 1 2 1\n0 4 1 1 2 1\n")?;
//! let learner = Owlqn::new(DenseVector::zeros(3), 10, 1.0, 20, 120, 1e-4, 0)?;
//! let result = Trainer::new(problem, learner, TerminationFlag::new("train.flag")).run()?;
//! println!("{}: {}", result.reason, result.new_x);
//! # Ok(())
//! # }
//! ```

#[macro_use]
pub mod core;

pub mod logistic;
pub mod solver;
pub mod trainer;
