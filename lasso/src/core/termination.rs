// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, LassoFloat, LearnerState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reasons for the optimizer to stop
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The chosen search direction does not descend; almost always a bug in
    /// the evaluator's gradient computation
    NonDescentDirection,
    /// A single line search exceeded its probe bound
    LineSearchExhausted,
    /// Reached maximum number of iterations
    MaxIterationsReached,
    /// The relative average improvement fell below the tolerance
    Converged,
}

impl TerminationReason {
    /// Returns `true` for the successful outcome.
    pub fn succeeded(self) -> bool {
        matches!(self, TerminationReason::Converged)
    }

    /// The reason line written to the termination flag file. External
    /// drivers match on these strings, so they are part of the interface.
    pub fn text(&self) -> &str {
        match *self {
            TerminationReason::NonDescentDirection => {
                "ERROR: UpdateDir chose a non-descent direction,  \
                 the line search will break, so we stop here. The \
                 likely reason is bug in gradient computation."
            }
            TerminationReason::LineSearchExhausted => {
                "WARNING: We have done enough number of steps in \
                 line search, and have to stop."
            }
            TerminationReason::MaxIterationsReached => {
                "WARNING: We have done enough number of iterations."
            }
            TerminationReason::Converged => "SUCCEEDED: We have converged.",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// A text file on the local filesystem whose presence tells the outer
/// driver that training is over.
///
/// The first line names the reason; the committed iterate and the trial
/// iterate follow, so the final model can be consumed straight from the
/// flag file even in error states. The file is created atomically (written
/// to a temporary and renamed into place), so a watcher never observes a
/// partial flag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TerminationFlag {
    path: PathBuf,
}

impl TerminationFlag {
    /// Wrap a flag file path. Nothing is created until
    /// [`set`](`TerminationFlag::set`) is called.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        TerminationFlag { path: path.into() }
    }

    /// The flag file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the flag file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The reason line of an existing flag file, or `None` when no flag has
    /// been raised.
    pub fn read_reason(&self) -> Result<Option<String>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut reason = String::new();
        BufReader::new(fs::File::open(&self.path)?).read_line(&mut reason)?;
        Ok(Some(reason.trim_end().to_string()))
    }

    /// Materialize the flag: the reason line followed by a dump of the
    /// committed and the trial iterate.
    pub fn set<P, F>(
        &self,
        reason: TerminationReason,
        states: &LearnerState<P, F>,
    ) -> Result<(), Error>
    where
        P: fmt::Display,
        F: LassoFloat,
    {
        let contents = format!(
            "{}\nx = {}\nnew_x = {}\n",
            reason.text(),
            states.x(),
            states.new_x()
        );

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| -> Error { lasso_error!(InvalidParameter, "flag path has no file name") })?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
