// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Errors

use thiserror::Error;

/// Lasso error type
#[derive(Debug, Error)]
pub enum LassoError {
    /// Indicates an invalid parameter
    #[error("Invalid parameter: {text:?}")]
    InvalidParameter {
        /// Text
        text: String,
    },

    /// Indicates that a component is not initialized
    #[error("Not initialized: {text:?}")]
    NotInitialized {
        /// Text
        text: String,
    },

    /// Checkpoint was not found
    #[error("Checkpoint not found: {text:?}")]
    CheckpointNotFound {
        /// Text
        text: String,
    },

    /// A record stream produced a key other than the expected one
    #[error("Record key mismatch: expected {expected:?}, found {found:?}")]
    RecordKeyMismatch {
        /// The key the reader expected next
        expected: String,
        /// The key actually present in the stream
        found: String,
    },

    /// A single record exceeded the framing limit
    #[error("Record of {size} bytes exceeds the limit of {limit} bytes")]
    RecordTooLarge {
        /// Encoded record size
        size: usize,
        /// Framing limit
        limit: usize,
    },

    /// Backing storage could not be allocated
    #[error("Out of memory: {text:?}")]
    OutOfMemory {
        /// Text
        text: String,
    },

    /// For errors which are likely bugs.
    #[error("Potential bug: {text:?}")]
    PotentialBug {
        /// Text
        text: String,
    },
}
