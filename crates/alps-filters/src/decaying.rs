//! Decaying average and its inverse
//!
//! The decaying average is a first-order IIR low-pass:
//!
//! ```text
//! y[n] = x[n] * N1 / D + y[n-1] * N2 / D
//! ```
//!
//! and [`UndecayAverage`] undoes it with the same coefficients:
//!
//! ```text
//! x[n] = y[n] * D / N1 - y[n-1] * N2 / N1
//! ```
//!
//! Each division truncates separately, so the round trip is exact only when
//! the coefficients divide the samples evenly. With `(1, 1, 2)` and two even
//! inputs `x0, x1`, undecaying `decay(x0), decay(x1)` yields `x0, x1` exactly.

use crate::state::{FilterState, Sample, narrow};

/// Decaying (exponential) average with integer coefficients.
///
/// The first sample passes through unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecayingAverage<T, const N1: i64, const N2: i64, const D: i64> {
    last: T,
    last_valid: bool,
}

impl<T: Sample, const N1: i64, const N2: i64, const D: i64> DecayingAverage<T, N1, N2, D> {
    /// Create a filter with no history.
    pub fn new() -> Self {
        const { assert!(D != 0, "decay denominator must be non-zero") };
        Self {
            last: T::default(),
            last_valid: false,
        }
    }

    /// Feed a sample and return the filtered value.
    pub fn filter(&mut self, sample: T) -> T {
        let mut result: i128 = sample.into();
        if self.last_valid {
            let last: i128 = self.last.into();
            result = result * i128::from(N1) / i128::from(D) + last * i128::from(N2) / i128::from(D);
        }
        self.last = narrow(result);
        self.last_valid = true;
        self.last
    }

    /// The last filtered value, if any sample has been seen.
    pub fn last(&self) -> Option<T> {
        self.last_valid.then_some(self.last)
    }
}

impl<T: Sample, const N1: i64, const N2: i64, const D: i64> Default
    for DecayingAverage<T, N1, N2, D>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample, const N1: i64, const N2: i64, const D: i64> FilterState
    for DecayingAverage<T, N1, N2, D>
{
    fn reset(&mut self) {
        self.last_valid = false;
        self.last = T::default();
    }
}

/// Inverse of [`DecayingAverage`] for the same coefficients.
///
/// Unlike the forward filter, the history is the previous *input* (the
/// previous decayed value), not the previous output.
///
/// # Example
///
/// ```
/// use alps_filters::{DecayingAverage, UndecayAverage};
///
/// let mut decay: DecayingAverage<i32, 1, 1, 2> = DecayingAverage::new();
/// let mut undecay: UndecayAverage<i32, 1, 1, 2> = UndecayAverage::new();
///
/// assert_eq!(undecay.filter(decay.filter(40)), 40);
/// assert_eq!(undecay.filter(decay.filter(-12)), -12);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UndecayAverage<T, const N1: i64, const N2: i64, const D: i64> {
    last: T,
    last_valid: bool,
}

impl<T: Sample, const N1: i64, const N2: i64, const D: i64> UndecayAverage<T, N1, N2, D> {
    /// Create a filter with no history.
    pub fn new() -> Self {
        const { assert!(N1 != 0, "undecay numerator must be non-zero") };
        Self {
            last: T::default(),
            last_valid: false,
        }
    }

    /// Feed a decayed sample and return the reconstructed input.
    pub fn filter(&mut self, sample: T) -> T {
        let mut result: i128 = sample.into();
        if self.last_valid {
            let last: i128 = self.last.into();
            result = result * i128::from(D) / i128::from(N1) - last * i128::from(N2) / i128::from(N1);
        }
        self.last = sample;
        self.last_valid = true;
        narrow(result)
    }
}

impl<T: Sample, const N1: i64, const N2: i64, const D: i64> Default
    for UndecayAverage<T, N1, N2, D>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample, const N1: i64, const N2: i64, const D: i64> FilterState
    for UndecayAverage<T, N1, N2, D>
{
    fn reset(&mut self) {
        self.last_valid = false;
        self.last = T::default();
    }
}
