// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # lasso-math
//!
//! Real-vector abstractions for the `lasso` trainer. A model vector may be
//! realized either as a [`DenseVector`] (contiguous values indexed from 0) or
//! as a [`SparseVector`] (a key-ordered map which never stores an explicit
//! zero). Both realizations implement the same set of operation traits, so
//! the optimizer can be written once and instantiated over either shape.
//!
//! The sparse operations are key-ordered merge-walks; this is what makes
//! dot products and merges linear in the number of nonzeros. A small set of
//! mixed-shape operations ([`DotProduct`] of a sparse vector with a dense
//! one, [`AddScaled`] of a sparse vector onto a dense one) covers the
//! evaluator's hot path, where per-instance feature vectors are sparse while
//! the model may be dense.

mod dense;
mod mixed;
mod sparse;

pub use crate::dense::DenseVector;
pub use crate::sparse::SparseVector;

/// Dot/scalar product of `T` and `self`
pub trait DotProduct<T, U> {
    /// Dot/scalar product of `T` and `self`
    fn dot(&self, other: &T) -> U;
}

/// Scale `self` by a factor in place: `self <- self * c`
pub trait Scale<U> {
    /// Scale `self` by `c` in place
    fn scale(&mut self, c: U);
}

/// Overwrite `self` with a scaled copy of `v`: `self <- v * c`
///
/// Sparse receivers are cleared first; dense receivers must already have the
/// size of `v`.
pub trait ScaleInto<T, U> {
    /// Overwrite `self` with `v * c`
    fn scale_into(&mut self, v: &T, c: U);
}

/// Add a scaled `T` to `self` in place: `self <- self + v * c`
pub trait AddScaled<T, U> {
    /// Add `v * c` to `self`
    fn add_scaled(&mut self, v: &T, c: U);
}

/// Overwrite `self` with the sum of `u` and a scaled `v`: `self <- u + v * c`
///
/// Sparse receivers are cleared first; dense receivers must already have the
/// size of `u` and `v`.
pub trait AddScaledInto<T, U> {
    /// Overwrite `self` with `u + v * c`
    fn add_scaled_into(&mut self, u: &T, v: &T, c: U);
}

/// Compute the l1-norm (`U`) of `self`
pub trait L1Norm<U> {
    /// Compute the l1-norm (`U`) of `self`
    fn l1_norm(&self) -> U;
}

/// Pre-size a vector so that indices `0..len` are addressable
///
/// Dense vectors are resized up with zeros; sparse vectors need no
/// pre-allocation, so their impl does nothing. Shrinking never happens.
pub trait Grow {
    /// Make indices `0..len` addressable
    fn grow(&mut self, len: usize);
}

/// Create an all-zero vector of the same shape as `self`
pub trait ZeroLike: Sized {
    /// Return zero(s) of the same shape as `self`
    fn zero_like(&self) -> Self;

    /// Fallible variant of [`zero_like`](`ZeroLike::zero_like`)
    ///
    /// Returns `None` when the backing storage cannot be allocated. Callers
    /// that keep rings of history buffers use this to shrink their history
    /// instead of aborting.
    fn try_zero_like(&self) -> Option<Self>;
}
