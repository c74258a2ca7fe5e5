//! Prelude for the filters crate.
//!
//! # Example
//!
//! ```
//! use alps_filters::prelude::*;
//!
//! let mut decay: DecayingAverage<i32, 1, 1, 2> = DecayingAverage::new();
//! assert_eq!(decay.filter(10), 10);
//! assert_eq!(decay.filter(20), 15);
//! ```

pub use crate::decaying::{DecayingAverage, UndecayAverage};
pub use crate::moving_average::MovingAverage;
pub use crate::state::{FilterState, Sample};
