// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{
    Error, ImprovementFilter, LassoFloat, RecordReader, RecordWriter, VectorRecord,
};
use lasso_math::{Grow, ZeroLike};
use std::collections::VecDeque;
use std::fmt;
use std::io::{Read, Write};

/// Everything the optimizer needs to persist for pausing and resuming a
/// long-running training process.
///
/// The optimizer engine ([`crate::solver::owlqn::Owlqn`]) owns and mutates a
/// `LearnerState`; the evaluator never touches it. Between evaluator cycles
/// the state is written to a record file with
/// [`save_into_record_file`](`LearnerState::save_into_record_file`) and read
/// back with [`load_from_record_file`](`LearnerState::load_from_record_file`)
/// — the round trip reproduces every field, so the optimizer produces
/// identical iterates whether it is kept in memory or rebuilt from durable
/// storage at each cycle.
///
/// The parameter type `P` may be a dense or a sparse vector.
#[derive(Clone, Debug, PartialEq)]
pub struct LearnerState<P, F> {
    /// Model parameters.
    pub(crate) x: P,
    /// Model parameters under trial in line search.
    pub(crate) new_x: P,
    /// The gradient at `x`.
    pub(crate) grad: P,
    /// The gradient at `new_x`; transiently carries the steepest descent
    /// direction while a search direction is being fixed up.
    pub(crate) new_grad: P,
    /// The update direction of model parameters.
    pub(crate) dir: P,

    /// Recent `new_x - x` steps, oldest first. A slot may be absent when a
    /// checkpoint recorded it that way.
    pub(crate) s_list: VecDeque<Option<P>>,
    /// Recent `new_grad - grad` differences, aligned with `s_list`.
    pub(crate) y_list: VecDeque<Option<P>>,
    /// `ro[k] = dot(s[k], y[k])`, captured when the pair was inserted.
    pub(crate) ro_list: VecDeque<F>,
    /// Scratch for the two-loop recursion; has `memory_size` slots.
    pub(crate) alphas: Vec<F>,

    /// The value of the objective function at `new_x`.
    pub(crate) value: F,
    /// Value before the line search of the current iteration.
    pub(crate) old_value: F,
    /// The directional derivative of `dir` before the line search.
    pub(crate) dir_deriv: F,
    /// The fraction of a step in line search.
    pub(crate) step_fraction: F,
    /// The degradation of the step fraction per failed probe.
    pub(crate) degrade_factor: F,
    /// Incremented when an iteration completes.
    pub(crate) iteration: usize,
    /// Stop learning once this many iterations were done.
    pub(crate) max_iterations: usize,
    /// Incremented per line-search probe, cleared when an iteration
    /// completes.
    pub(crate) line_search_step: usize,
    /// Give up when a single line search exceeds this many probes.
    pub(crate) max_line_search_steps: usize,
    /// Threshold on the relative average improvement.
    pub(crate) convergence_tolerance: F,
    /// The memory length of the limited-memory Hessian approximation.
    pub(crate) memory_size: usize,
    /// The weight of the L1 regularization term.
    pub(crate) l1weight: F,
    pub(crate) improvement_filter: ImprovementFilter<F>,
}

impl<P, F> LearnerState<P, F>
where
    P: Clone + ZeroLike + Grow,
    F: LassoFloat,
{
    /// Seed a fresh state at the iterate `initial_x`.
    ///
    /// `max_feature_number` pre-sizes the working vectors; pass 0 to skip
    /// pre-sizing (sparse models never need it).
    pub fn new(
        initial_x: P,
        memory_size: usize,
        l1weight: F,
        max_line_search_steps: usize,
        max_iterations: usize,
        convergence_tolerance: F,
        max_feature_number: usize,
    ) -> Result<Self, Error> {
        if memory_size == 0 {
            return Err(lasso_error!(InvalidParameter, "memory_size must be > 0"));
        }
        if l1weight < F::zero() {
            return Err(lasso_error!(InvalidParameter, "l1weight must be >= 0"));
        }
        if max_line_search_steps <= 1 {
            return Err(lasso_error!(
                InvalidParameter,
                "max_line_search_steps must be > 1"
            ));
        }
        if max_iterations <= 1 {
            return Err(lasso_error!(InvalidParameter, "max_iterations must be > 1"));
        }
        if convergence_tolerance <= F::zero() {
            return Err(lasso_error!(
                InvalidParameter,
                "convergence_tolerance must be > 0"
            ));
        }

        let mut x = initial_x;
        let mut grad = x.zero_like();
        let mut new_grad = x.zero_like();
        let mut dir = x.zero_like();
        if max_feature_number > 0 {
            x.grow(max_feature_number);
            grad.grow(max_feature_number);
            new_grad.grow(max_feature_number);
            dir.grow(max_feature_number);
        }
        let new_x = x.clone();

        Ok(LearnerState {
            x,
            new_x,
            grad,
            new_grad,
            dir,
            s_list: VecDeque::new(),
            y_list: VecDeque::new(),
            ro_list: VecDeque::new(),
            alphas: vec![F::zero(); memory_size],
            value: F::zero(),
            old_value: F::zero(),
            dir_deriv: F::zero(),
            step_fraction: F::one(),
            degrade_factor: float!(0.5),
            iteration: 0,
            max_iterations,
            line_search_step: 0,
            max_line_search_steps,
            convergence_tolerance,
            memory_size,
            l1weight,
            improvement_filter: ImprovementFilter::new(),
        })
    }
}

impl<P, F: LassoFloat> LearnerState<P, F> {
    /// The committed iterate.
    pub fn x(&self) -> &P {
        &self.x
    }

    /// The trial iterate probed by line search. This is the vector an
    /// evaluator computes the objective and gradient at, and the vector
    /// published as the model when training succeeds.
    pub fn new_x(&self) -> &P {
        &self.new_x
    }

    /// The gradient at [`x`](`LearnerState::x`).
    pub fn grad(&self) -> &P {
        &self.grad
    }

    /// The gradient at [`new_x`](`LearnerState::new_x`).
    pub fn new_grad(&self) -> &P {
        &self.new_grad
    }

    /// The current search direction.
    pub fn dir(&self) -> &P {
        &self.dir
    }

    /// The objective value last reported by the evaluator.
    pub fn value(&self) -> F {
        self.value
    }

    /// Completed outer iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The L1 regularization strength.
    pub fn l1weight(&self) -> F {
        self.l1weight
    }

    /// Probes attempted in the current line search.
    pub fn line_search_step(&self) -> usize {
        self.line_search_step
    }

    /// The line-search probe bound.
    pub fn max_line_search_steps(&self) -> usize {
        self.max_line_search_steps
    }

    /// The iteration bound.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The current line-search step size.
    pub fn step_fraction(&self) -> F {
        self.step_fraction
    }
}

impl<P, F> LearnerState<P, F>
where
    P: VectorRecord,
    F: LassoFloat,
{
    /// Serialize every field as a sequence of named records.
    ///
    /// The reader consumes the records in exactly this order, asserting each
    /// key, so writer and reader cannot silently drift apart.
    pub fn save_into_record_file<W: Write>(
        &self,
        writer: &mut RecordWriter<W>,
    ) -> Result<(), Error> {
        self.x.write_records(writer, "x_")?;
        self.new_x.write_records(writer, "new_x_")?;
        self.grad.write_records(writer, "grad_")?;
        self.new_grad.write_records(writer, "new_grad_")?;
        self.dir.write_records(writer, "dir_")?;
        write_vector_list(writer, "s_list_", &self.s_list)?;
        write_vector_list(writer, "y_list_", &self.y_list)?;
        writer.write("ro_list_", &self.ro_list.iter().copied().collect::<Vec<F>>())?;
        writer.write("alphas_", &self.alphas)?;
        writer.write("value_", &self.value)?;
        writer.write("old_value_", &self.old_value)?;
        writer.write("dir_deriv_", &self.dir_deriv)?;
        writer.write("step_fraction_", &self.step_fraction)?;
        writer.write("degrade_factor_", &self.degrade_factor)?;
        writer.write("l1weight_", &self.l1weight)?;
        writer.write("convergence_tolerance_", &self.convergence_tolerance)?;
        writer.write("iteration_", &(self.iteration as u64))?;
        writer.write("line_search_step_", &(self.line_search_step as u64))?;
        writer.write("max_line_search_steps_", &(self.max_line_search_steps as u64))?;
        writer.write("max_iterations_", &(self.max_iterations as u64))?;
        writer.write("memory_size_", &(self.memory_size as u64))?;
        writer.write("improvement_filter_", &self.improvement_filter.values())?;
        Ok(())
    }

    /// Reconstruct a state saved by
    /// [`save_into_record_file`](`LearnerState::save_into_record_file`).
    pub fn load_from_record_file<R: Read>(reader: &mut RecordReader<R>) -> Result<Self, Error> {
        let (x, _) = P::read_records(reader, "x_")?;
        let (new_x, _) = P::read_records(reader, "new_x_")?;
        let (grad, _) = P::read_records(reader, "grad_")?;
        let (new_grad, _) = P::read_records(reader, "new_grad_")?;
        let (dir, _) = P::read_records(reader, "dir_")?;
        let s_list = read_vector_list(reader, "s_list_")?;
        let y_list = read_vector_list(reader, "y_list_")?;
        let ro_list: Vec<F> = reader.read("ro_list_")?;
        let alphas: Vec<F> = reader.read("alphas_")?;
        let value: F = reader.read("value_")?;
        let old_value: F = reader.read("old_value_")?;
        let dir_deriv: F = reader.read("dir_deriv_")?;
        let step_fraction: F = reader.read("step_fraction_")?;
        let degrade_factor: F = reader.read("degrade_factor_")?;
        let l1weight: F = reader.read("l1weight_")?;
        let convergence_tolerance: F = reader.read("convergence_tolerance_")?;
        let iteration: u64 = reader.read("iteration_")?;
        let line_search_step: u64 = reader.read("line_search_step_")?;
        let max_line_search_steps: u64 = reader.read("max_line_search_steps_")?;
        let max_iterations: u64 = reader.read("max_iterations_")?;
        let memory_size: u64 = reader.read("memory_size_")?;
        let improvement_filter = ImprovementFilter::from_values(reader.read("improvement_filter_")?);

        Ok(LearnerState {
            x,
            new_x,
            grad,
            new_grad,
            dir,
            s_list,
            y_list,
            ro_list: ro_list.into(),
            alphas,
            value,
            old_value,
            dir_deriv,
            step_fraction,
            degrade_factor,
            iteration: iteration as usize,
            max_iterations: max_iterations as usize,
            line_search_step: line_search_step as usize,
            max_line_search_steps: max_line_search_steps as usize,
            convergence_tolerance,
            memory_size: memory_size as usize,
            l1weight,
            improvement_filter,
        })
    }
}

fn write_vector_list<P: VectorRecord, W: Write>(
    writer: &mut RecordWriter<W>,
    key_base: &str,
    list: &VecDeque<Option<P>>,
) -> Result<(), Error> {
    writer.write(&format!("{}.size", key_base), &(list.len() as u64))?;
    for (i, slot) in list.iter().enumerate() {
        let key = format!("{}{}", key_base, i);
        match slot {
            Some(v) => v.write_records(writer, &key)?,
            // An absent slot writes the empty-vector sentinel: stored
            // vectors always have at least one nonzero, so size 0 is free
            // to mean "no vector here".
            None => P::write_empty_records(writer, &key)?,
        }
    }
    Ok(())
}

fn read_vector_list<P: VectorRecord, R: Read>(
    reader: &mut RecordReader<R>,
    key_base: &str,
) -> Result<VecDeque<Option<P>>, Error> {
    let len: u64 = reader.read(&format!("{}.size", key_base))?;
    let mut list = VecDeque::with_capacity(len as usize);
    for i in 0..len {
        let key = format!("{}{}", key_base, i);
        let (v, size) = P::read_records(reader, &key)?;
        list.push_back(if size > 0 { Some(v) } else { None });
    }
    Ok(list)
}

impl<P, F> fmt::Display for LearnerState<P, F>
where
    P: fmt::Display,
    F: LassoFloat,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "x : {}", self.x)?;
        writeln!(f, "new_x : {}", self.new_x)?;
        writeln!(f, "grad : {}", self.grad)?;
        writeln!(f, "new_grad : {}", self.new_grad)?;
        writeln!(f, "dir : {}", self.dir)?;
        write!(f, "s_list : ")?;
        fmt_vector_list(f, &self.s_list)?;
        write!(f, "\ny_list : ")?;
        fmt_vector_list(f, &self.y_list)?;
        write!(f, "\nro_list : ")?;
        for (i, v) in self.ro_list.iter().enumerate() {
            write!(f, "{}:{} ", i, v)?;
        }
        write!(f, "\nalphas : ")?;
        for (i, v) in self.alphas.iter().enumerate() {
            write!(f, "{}:{} ", i, v)?;
        }
        writeln!(f)?;
        writeln!(f, "value : {}", self.value)?;
        writeln!(f, "old_value : {}", self.old_value)?;
        writeln!(f, "dir_deriv : {}", self.dir_deriv)?;
        writeln!(f, "step_fraction : {}", self.step_fraction)?;
        writeln!(f, "degrade_factor : {}", self.degrade_factor)?;
        writeln!(f, "l1weight : {}", self.l1weight)?;
        writeln!(f, "convergence_tolerance : {}", self.convergence_tolerance)?;
        writeln!(f, "iteration : {}", self.iteration)?;
        writeln!(f, "line_search_step : {}", self.line_search_step)?;
        writeln!(f, "max_line_search_steps : {}", self.max_line_search_steps)?;
        writeln!(f, "max_iterations : {}", self.max_iterations)?;
        writeln!(f, "memory_size : {}", self.memory_size)?;
        writeln!(f, "improvement_filter : {}", self.improvement_filter)
    }
}

fn fmt_vector_list<P: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    list: &VecDeque<Option<P>>,
) -> fmt::Result {
    for (i, slot) in list.iter().enumerate() {
        if let Some(v) = slot {
            write!(f, "{}:{}\t", i, v)?;
        }
    }
    Ok(())
}
