//! Fixed-window moving average
//!
//! A circular buffer of the last `N` samples with a running sum. Used by the
//! virtual finger tracker to smooth reported coordinates.

use crate::state::{FilterState, Sample, narrow};

/// Moving average over the last `N` samples.
///
/// `filter` returns the truncated mean of the samples seen so far, up to `N`
/// of them. An empty filter averages to zero.
///
/// # RT Safety
///
/// - No heap allocations
/// - O(1) time complexity
///
/// # Example
///
/// ```
/// use alps_filters::MovingAverage;
///
/// let mut avg: MovingAverage<i32, 2> = MovingAverage::new();
/// assert_eq!(avg.average(), 0);
/// assert_eq!(avg.filter(10), 10);
/// assert_eq!(avg.filter(15), 12);
/// assert_eq!(avg.filter(20), 17);
/// assert_eq!(avg.newest(), 20);
/// assert_eq!(avg.oldest(), 15);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MovingAverage<T, const N: usize> {
    buffer: [T; N],
    index: usize,
    count: usize,
    sum: i128,
}

impl<T: Sample, const N: usize> MovingAverage<T, N> {
    /// Create an empty moving average.
    pub fn new() -> Self {
        Self {
            buffer: [T::default(); N],
            index: 0,
            count: 0,
            sum: 0,
        }
    }

    /// Push a sample and return the mean of the buffered samples.
    ///
    /// A zero-sized window passes samples through unchanged.
    pub fn filter(&mut self, sample: T) -> T {
        if N == 0 {
            return sample;
        }
        if self.count == N {
            self.sum -= self.buffer[self.index].into();
        } else {
            self.count += 1;
        }
        self.buffer[self.index] = sample;
        self.sum += sample.into();
        self.index = (self.index + 1) % N;
        self.average()
    }

    /// Mean of the buffered samples without pushing a new one.
    pub fn average(&self) -> T {
        if self.count == 0 {
            return T::default();
        }
        narrow(self.sum / self.count as i128)
    }

    /// The oldest buffered sample, or zero when empty.
    pub fn oldest(&self) -> T {
        if N == 0 {
            return T::default();
        }
        if self.count < N {
            self.buffer[0]
        } else {
            self.buffer[self.index]
        }
    }

    /// The most recently pushed sample, or zero when empty.
    pub fn newest(&self) -> T {
        if self.count == 0 {
            return T::default();
        }
        let newest = if self.index == 0 { N - 1 } else { self.index - 1 };
        self.buffer[newest]
    }

    /// Number of buffered samples (at most `N`).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running sum of the buffered samples.
    pub fn sum(&self) -> i128 {
        self.sum
    }

    /// Whether the window is full.
    pub fn is_full(&self) -> bool {
        N > 0 && self.count == N
    }

    /// Window size.
    pub const fn window(&self) -> usize {
        N
    }
}

impl<T: Sample, const N: usize> Default for MovingAverage<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample, const N: usize> FilterState for MovingAverage<T, N> {
    fn reset(&mut self) {
        *self = Self::new();
    }
}
