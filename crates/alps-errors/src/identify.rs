//! Device identification errors.
//!
//! Identification happens once per device instance. A failure here means no
//! decoder is available and the device session cannot start.

use crate::common::ErrorSeverity;

/// Identification errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum IdentifyError {
    /// The E7/EC signature matches no known ALPS device
    #[error(
        "Unsupported signature: E7={:02x} {:02x} {:02x}, EC={:02x} {:02x} {:02x}",
        e7[0], e7[1], e7[2], ec[0], ec[1], ec[2]
    )]
    UnsupportedSignature {
        /// E7 report bytes
        e7: [u8; 3],
        /// EC report bytes
        ec: [u8; 3],
    },

    /// The protocol is recognised but no decoder exists for it
    #[error("Unsupported protocol version {version:#06x}")]
    UnsupportedProtocol {
        /// Protocol version tag
        version: u16,
    },
}

impl IdentifyError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }

    /// Create an unsupported signature error.
    pub fn unsupported_signature(e7: [u8; 3], ec: [u8; 3]) -> Self {
        IdentifyError::UnsupportedSignature { e7, ec }
    }

    /// Create an unsupported protocol error.
    pub fn unsupported_protocol(version: u16) -> Self {
        IdentifyError::UnsupportedProtocol { version }
    }
}
