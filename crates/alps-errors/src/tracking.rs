//! Virtual finger tracker conditions.

use crate::common::ErrorSeverity;

/// Conditions raised by the virtual finger tracker.
///
/// These never abort a frame. The tracker records them in the frame's
/// diagnostics and keeps reporting the contacts it could place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TrackingError {
    /// More contacts than free finger slots
    #[error("{dropped} contact(s) dropped, finger pool capacity is {capacity}")]
    CapacityExceeded {
        /// Contacts that could not be assigned a finger
        dropped: usize,
        /// Size of the finger pool
        capacity: usize,
    },
}

impl TrackingError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackingError::CapacityExceeded { .. } => ErrorSeverity::Warning,
        }
    }
}
