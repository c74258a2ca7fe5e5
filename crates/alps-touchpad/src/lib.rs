//! ALPS touchpad device sessions.
//!
//! [`AlpsTouchpad`] ties together the pieces one device needs: the
//! [`PacketFramer`](alps_protocol::PacketFramer) that cuts the PS/2 byte
//! stream into packets, the [`DecodeContext`](alps_protocol::DecodeContext)
//! that decodes them, and the [`Tracker`](alps_tracker::Tracker) that turns
//! contact slots into stable virtual fingers.
//!
//! # Example
//!
//! ```
//! use alps_touchpad::prelude::*;
//!
//! let mut pad = AlpsTouchpad::from_reports([0x33, 0x02, 0x0a], [0, 0, 0], TouchpadConfig::default())?;
//!
//! let mut report = None;
//! for byte in [0x88, 0x64, 0x00, 0x01, 0x48, 0x30] {
//!     report = pad.process_byte(byte)?;
//! }
//! let Some(Report::Touch(touch)) = report else {
//!     return Err("expected a touch".into());
//! };
//! assert_eq!(touch.frame.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(static_mut_refs)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod prelude;
pub mod session;

pub use config::TouchpadConfig;
pub use session::{AlpsTouchpad, Report, SessionStats, TouchReport};
