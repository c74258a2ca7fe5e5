//! Common error types and utilities used across all ALPS crates.
//!
//! This module provides the top-level error enum that wraps all sub-errors,
//! along with error classification and severity levels.

use crate::{DecodeError, IdentifyError, TrackingError};

/// Top-level error type that can wrap all ALPS sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum AlpsError {
    /// Per-packet decode errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Device identification errors
    #[error("Identify error: {0}")]
    Identify(#[from] IdentifyError),

    /// Virtual finger tracking conditions
    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AlpsError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AlpsError::Decode(_) => ErrorCategory::Decode,
            AlpsError::Identify(_) => ErrorCategory::Identify,
            AlpsError::Tracking(_) => ErrorCategory::Tracking,
            AlpsError::Io(_) => ErrorCategory::IO,
            AlpsError::Config(_) => ErrorCategory::Config,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AlpsError::Decode(e) => e.severity(),
            AlpsError::Identify(e) => e.severity(),
            AlpsError::Tracking(e) => e.severity(),
            AlpsError::Io(_) => ErrorSeverity::Error,
            AlpsError::Config(_) => ErrorSeverity::Error,
        }
    }

    /// Check if the device session can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        AlpsError::Config(msg.into())
    }
}

impl From<std::io::Error> for AlpsError {
    fn from(e: std::io::Error) -> Self {
        AlpsError::Io(e)
    }
}

/// Which layer an [`AlpsError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Per-packet decode errors
    Decode,
    /// Identification errors
    Identify,
    /// Tracker errors
    Tracking,
    /// Configuration errors
    Config,
    /// I/O errors
    IO,
}

/// How badly an error affects the device session, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// No action required
    Info,
    /// Frame dropped, the session continues
    Warning,
    /// Operation failed
    Error,
    /// The device session cannot continue
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alps_error_category() {
        let err: AlpsError = DecodeError::OutOfSequence.into();
        assert_eq!(err.category(), ErrorCategory::Decode);

        let err = AlpsError::config("bad grace frames");
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_identify_errors_are_not_recoverable() {
        let err: AlpsError = IdentifyError::unsupported_signature([0, 0, 0], [0, 0, 0]).into();
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
