//! Per-packet decode errors.
//!
//! These errors travel on the packet path and follow the same rules as the
//! decoders themselves:
//! - `Copy` semantics (no heap allocations)
//! - Numeric codes for compact logging
//! - Every variant is recoverable at frame level

use crate::common::ErrorSeverity;

/// Errors produced while validating, reassembling or decoding a packet.
///
/// # Examples
///
/// ```
/// use alps_errors::{DecodeError, ErrorSeverity};
///
/// let err = DecodeError::resync(0, 0x12);
/// assert_eq!(err.code(), 1);
/// assert!(err.requires_resync());
/// assert_eq!(err.severity(), ErrorSeverity::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum DecodeError {
    /// A byte failed the stream synchronisation checks. The caller must drop
    /// buffered bytes and realign on the transport.
    #[error("refusing packet[{index}] = {value:#04x}, stream out of sync")]
    Resync {
        /// Position of the offending byte within the packet
        index: usize,
        /// The offending byte
        value: u8,
    },

    /// A multi-packet continuation arrived without a valid opener.
    #[error("multi-packet continuation without an opening packet")]
    OutOfSequence,

    /// The packet classifier could not categorise the packet.
    #[error("unknown {family} packet classification")]
    UnknownPacketClassification {
        /// Protocol family whose classifier rejected the packet
        family: &'static str,
    },

    /// The packet is shorter than the protocol's packet length.
    #[error("packet too short: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Protocol packet length
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// A trackstick packet was received from a device without a trackstick.
    #[error("rejected trackstick packet from non DualPoint device")]
    RejectedTrackstick,
}

impl DecodeError {
    /// Create a resync error for the byte at `index`.
    pub fn resync(index: usize, value: u8) -> Self {
        DecodeError::Resync { index, value }
    }

    /// Create an unknown-classification error for a protocol family.
    pub fn unknown_packet(family: &'static str) -> Self {
        DecodeError::UnknownPacketClassification { family }
    }

    /// Get the numeric error code.
    pub fn code(self) -> u8 {
        match self {
            DecodeError::Resync { .. } => 1,
            DecodeError::OutOfSequence => 2,
            DecodeError::UnknownPacketClassification { .. } => 3,
            DecodeError::InvalidLength { .. } => 4,
            DecodeError::RejectedTrackstick => 5,
        }
    }

    /// Get the error severity.
    pub fn severity(self) -> ErrorSeverity {
        match self {
            DecodeError::Resync { .. } => ErrorSeverity::Warning,
            DecodeError::OutOfSequence => ErrorSeverity::Warning,
            DecodeError::UnknownPacketClassification { .. } => ErrorSeverity::Warning,
            DecodeError::InvalidLength { .. } => ErrorSeverity::Error,
            DecodeError::RejectedTrackstick => ErrorSeverity::Info,
        }
    }

    /// Check if the transport must discard buffered bytes and realign.
    pub fn requires_resync(self) -> bool {
        matches!(self, DecodeError::Resync { .. })
    }

    /// Check if the frame should be reported to the host as idle.
    pub fn treat_as_idle(self) -> bool {
        matches!(self, DecodeError::UnknownPacketClassification { .. })
    }
}
