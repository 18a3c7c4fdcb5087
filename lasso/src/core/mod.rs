// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Lasso optimizer core
//!
//! This module contains the durable optimizer state, its record-file
//! serialization, checkpointing, termination signalling and the evaluator
//! contract. The optimization algorithm itself lives in
//! [`crate::solver::owlqn`].

/// Macros
#[macro_use]
pub mod macros;
/// Checkpoint files
mod checkpoint;
/// Error handling
mod errors;
/// Convergence test over a window of recent objective values
mod filter;
/// Trait alias for float types
mod float;
/// Traits for defining optimization problems
mod problem;
/// Record streams and chunked vector records
mod recordio;
/// The durable optimizer state
mod state;
/// Definition of termination reasons and the termination flag file
mod termination;

#[cfg(test)]
pub(crate) mod test_utils;

pub use anyhow::Error;
pub use checkpoint::StateCheckpoint;
pub use errors::LassoError;
pub use filter::ImprovementFilter;
pub use float::LassoFloat;
pub use problem::{CostFunction, Gradient};
pub use recordio::{RecordReader, RecordWriter, VectorRecord, MAX_RECORD_SIZE, MESSAGE_SIZE};
pub use state::LearnerState;
pub use termination::{TerminationFlag, TerminationReason};
