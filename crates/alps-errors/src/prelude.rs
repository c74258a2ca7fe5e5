//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use alps_errors::prelude::*;
//!
//! fn open_device(e7: [u8; 3], ec: [u8; 3]) -> Result<()> {
//!     if e7 == [0, 0, 0] {
//!         return Err(IdentifyError::unsupported_signature(e7, ec).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(open_device([0, 0, 0], [0, 0, 0]).is_err());
//! ```

pub use crate::{
    DecodeResult, Result,
    common::{AlpsError, ErrorCategory, ErrorSeverity},
    decode::DecodeError,
    identify::IdentifyError,
    tracking::TrackingError,
};

/// Return early with a [`DecodeError::Resync`] when a byte fails a
/// synchronisation check.
///
/// # Example
///
/// ```
/// use alps_errors::prelude::*;
/// use alps_errors::ensure_sync;
///
/// fn check(packet: &[u8; 6]) -> DecodeResult<()> {
///     ensure_sync!(packet[1] & 0x80 == 0, 1, packet[1]);
///     Ok(())
/// }
///
/// assert!(check(&[0x8f, 0x12, 0, 0, 0, 0]).is_ok());
/// assert!(check(&[0x8f, 0x92, 0, 0, 0, 0]).is_err());
/// ```
#[macro_export]
macro_rules! ensure_sync {
    ($condition:expr, $index:expr, $value:expr) => {
        if !$condition {
            return Err($crate::DecodeError::resync($index, $value));
        }
    };
}
