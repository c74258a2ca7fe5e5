//! Error types for alpsctl

use alps_errors::{AlpsError, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Invalid capture at token {index}: {token:?}")]
    InvalidCapture { index: usize, token: String },

    #[error(transparent)]
    Alps(#[from] AlpsError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Alps(e) => match e.category() {
                ErrorCategory::Identify => 2,
                ErrorCategory::Config => 4,
                _ => 1,
            },
            CliError::InvalidReport(_) | CliError::InvalidCapture { .. } => 4,
            CliError::IoError(_) => 1,
        }
    }
}
