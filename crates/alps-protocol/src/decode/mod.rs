//! Packet decoders, one module per protocol family.
//!
//! [`decode`] is the single entry point. It checks the packet length and the
//! byte-0 sync pattern, then dispatches on [`ProtocolFamily`]. Each family
//! module is a set of pure bit-extraction functions plus the small amount of
//! reassembly logic its protocol needs.
//!
//! # Error handling
//!
//! A [`DecodeError::Resync`] leaves the context untouched: the caller drops
//! bytes until the stream realigns and carries on. Every other error resets
//! the context's inter-packet state before it is returned.

#![deny(static_mut_refs)]

mod ss4;
mod v1_v2;
mod v3;
mod v4;
mod v6;
mod v7;

use alps_errors::{DecodeError, DecodeResult, ensure_sync};
use tracing::debug;

use crate::context::{DecodeContext, ProtocolFamily};
use crate::fields::{Decoded, DecodedFields};
use crate::ids::MAX_TOUCHES;

pub use ss4::{Ss4PacketId, ss4_packet_id};
pub use v7::{V7PacketId, v7_packet_id};

/// Decode one packet.
///
/// `packet` must hold at least the protocol's packet length; extra bytes are
/// ignored.
///
/// # Errors
///
/// - [`DecodeError::InvalidLength`] if the packet is too short
/// - [`DecodeError::Resync`] if byte 0 fails the descriptor's sync pattern
/// - [`DecodeError::OutOfSequence`] for a continuation packet without an opener
/// - [`DecodeError::UnknownPacketClassification`] if a V7 packet cannot be
///   classified
/// - [`DecodeError::RejectedTrackstick`] for trackstick data from a device
///   without a trackstick
///
/// # Example
///
/// ```
/// use alps_protocol::prelude::*;
///
/// let id = identify([0x33, 0x02, 0x0a], [0, 0, 0])?;
/// let mut ctx = DecodeContext::new(id)?;
///
/// // V1: X = 100, Y = 200, Z = 48
/// let Decoded::Touch(fields) = decode(&[0x88, 0x64, 0x00, 0x01, 0x48, 0x30], &mut ctx)? else {
///     return Err("expected a touch".into());
/// };
/// assert_eq!((fields.st.x, fields.st.y, fields.pressure), (100, 200, 48));
///
/// // bad sync byte
/// assert!(decode(&[0x00, 0x64, 0x00, 0x01, 0x48, 0x30], &mut ctx).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode(packet: &[u8], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    let result = dispatch(packet, ctx);
    if let Err(err) = result {
        if err.requires_resync() {
            debug!("ALPS {}: {}", ctx.family().name(), err);
        } else {
            debug!(
                "ALPS {}: {}, resetting decode context",
                ctx.family().name(),
                err
            );
            ctx.reset();
        }
    }
    result
}

fn dispatch(packet: &[u8], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    let expected = ctx.packet_len();
    let first = match packet.first() {
        Some(&b) if packet.len() >= expected => b,
        _ => {
            return Err(DecodeError::InvalidLength {
                expected,
                actual: packet.len(),
            });
        }
    };
    ensure_sync!(ctx.descriptor().is_valid_first_byte(first), 0, first);

    match ctx.family() {
        ProtocolFamily::V1V2 => Ok(v1_v2::process(fixed(packet)?, ctx)),
        ProtocolFamily::V3Pinnacle | ProtocolFamily::V3Rushmore => v3::process(fixed(packet)?, ctx),
        ProtocolFamily::V5Dolphin => v3::process_touchpad(fixed(packet)?, ctx),
        ProtocolFamily::V4 => Ok(v4::process(fixed(packet)?, ctx)),
        ProtocolFamily::V6 => v6::process(fixed(packet)?, ctx),
        ProtocolFamily::V7 => v7::process(fixed(packet)?, ctx),
        ProtocolFamily::Ss4 | ProtocolFamily::Ss4Plus => ss4::process(fixed(packet)?, ctx),
    }
}

fn fixed<const N: usize>(packet: &[u8]) -> DecodeResult<&[u8; N]> {
    packet
        .get(..N)
        .and_then(|p| <&[u8; N]>::try_from(p).ok())
        .ok_or(DecodeError::InvalidLength {
            expected: N,
            actual: packet.len(),
        })
}

/// Report the semi-MT view of a bitmap protocol frame.
///
/// With fewer than two fingers the single-touch position is the only contact
/// and the second-touch corner latch is released.
pub(crate) fn semi_mt(mut f: DecodedFields, fingers: usize, ctx: &mut DecodeContext) -> DecodedFields {
    let fingers = if fingers < 2 {
        f.mt[0] = f.st;
        ctx.second_touch = None;
        usize::from(f.pressure > 0)
    } else {
        fingers.min(MAX_TOUCHES)
    };
    f.fingers = fingers;
    f.mt_count = fingers.min(2);
    f
}

/// Sign-extend an 8-bit two's complement value.
pub(crate) fn signed(v: u8) -> i32 {
    i32::from(i8::from_ne_bytes([v]))
}
