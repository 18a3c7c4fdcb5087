// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Dump a learner-states checkpoint file in human-readable form.
//!
//! ```text
//! cargo run --example dump_states -- [--sparse] [--model-only] <states-file>
//! ```

use lasso::core::{Error, LearnerState, RecordReader};
use lasso::lasso_error;
use lasso_math::{DenseVector, SparseVector};
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<(), Error> {
    let mut path = None;
    let mut sparse = false;
    let mut model_only = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--sparse" => sparse = true,
            "--model-only" => model_only = true,
            other => path = Some(other.to_string()),
        }
    }
    let path = path.ok_or_else(|| -> Error {
        lasso_error!(
            InvalidParameter,
            "usage: dump_states [--sparse] [--model-only] <states-file>"
        )
    })?;

    let mut reader = RecordReader::new(BufReader::new(File::open(&path)?));
    if sparse {
        let states: LearnerState<SparseVector<f64>, f64> =
            LearnerState::load_from_record_file(&mut reader)?;
        if model_only {
            println!("{}", states.new_x());
        } else {
            print!("{}", states);
        }
    } else {
        let states: LearnerState<DenseVector<f64>, f64> =
            LearnerState::load_from_record_file(&mut reader)?;
        if model_only {
            println!("{}", states.new_x());
        } else {
            print!("{}", states);
        }
    }
    Ok(())
}
