//! Filter State Types
//!
//! Shared traits for the filter states in this crate.

use std::fmt::Debug;

/// Integer sample types accepted by the filters.
///
/// Samples are widened to `i128` for arithmetic and narrowed back afterwards.
/// Narrowing never fails for averages, since a mean of values of `T` lies in
/// the range of `T`. Should it fail anyway the filter yields `T::default()`.
pub trait Sample: Copy + Default + Debug + Into<i128> + TryFrom<i128> {}

impl<T> Sample for T where T: Copy + Default + Debug + Into<i128> + TryFrom<i128> {}

/// Filter trait for common filter operations.
///
/// All filters implement this trait for consistent interface.
pub trait FilterState: Clone + Debug {
    /// Reset the filter state to initial values.
    fn reset(&mut self);
}

pub(crate) fn narrow<T: Sample>(value: i128) -> T {
    T::try_from(value).unwrap_or_default()
}
