//! Centralized error types for the ALPS touchpad decode stack
//!
//! Every crate in the workspace reports failures through the types defined
//! here, so that a device session can classify and recover from them in one
//! place.
//!
//! # Architecture
//!
//! - [`common`]: Top-level [`AlpsError`], categories and severities
//! - [`decode`]: Per-packet decode failures ([`DecodeError`])
//! - [`identify`]: Identification failures ([`IdentifyError`])
//! - [`tracking`]: Virtual finger tracker conditions ([`TrackingError`])
//!
//! # Recovery model
//!
//! Decode and tracking errors are frame-level: the session resets its decode
//! context and continues with the next packet. Identification errors are
//! fatal for the device instance and are never retried.
//!
//! # Example
//!
//! ```
//! use alps_errors::prelude::*;
//!
//! fn check_first_byte(byte: u8, byte0: u8, mask0: u8) -> DecodeResult<()> {
//!     if byte & mask0 != byte0 {
//!         return Err(DecodeError::resync(0, byte));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_first_byte(0x8f, 0x8f, 0x8f).is_ok());
//! assert!(check_first_byte(0x00, 0x8f, 0x8f).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod decode;
pub mod identify;
pub mod prelude;
pub mod tracking;

pub use common::{AlpsError, ErrorCategory, ErrorSeverity};
pub use decode::DecodeError;
pub use identify::IdentifyError;
pub use tracking::TrackingError;

/// A specialized `Result` type for ALPS operations.
pub type Result<T> = std::result::Result<T, AlpsError>;

/// A specialized `Result` type for the per-packet decode path.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
