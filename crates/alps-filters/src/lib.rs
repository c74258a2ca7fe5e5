//! Integer smoothing filters for touchpad coordinates
//!
//! This crate provides the small fixed-size filters used by the virtual finger
//! tracker and by consumers of decoded touchpad frames.
//!
//! # Overview
//!
//! - **Moving average**: mean of the last `N` samples, window fixed at compile time
//! - **Decaying average**: first-order IIR low-pass, `x*N1/D + last*N2/D`
//! - **Undecay**: the algebraic inverse of the decaying average
//!
//! # Arithmetic
//!
//! All filters use integer arithmetic with truncating division, widened to
//! `i128` internally so that no intermediate product overflows for any sample
//! type that converts into `i128`. Results are exact under the filters' own
//! truncation rules, which the round-trip properties depend on.
//!
//! # Example
//!
//! ```
//! use alps_filters::prelude::*;
//!
//! let mut avg: MovingAverage<i32, 3> = MovingAverage::new();
//! assert_eq!(avg.filter(3), 3);
//! assert_eq!(avg.filter(6), 4);
//! assert_eq!(avg.filter(9), 6);
//! assert_eq!(avg.filter(12), 9);
//! assert_eq!(avg.oldest(), 6);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod decaying;
pub mod moving_average;
pub mod prelude;
pub mod state;

pub use decaying::{DecayingAverage, UndecayAverage};
pub use moving_average::MovingAverage;
pub use state::{FilterState, Sample};
