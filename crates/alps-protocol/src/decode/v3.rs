//! V3 (Pinnacle, Rushmore) and V5 (Dolphin) position/bitmap packets.
//!
//! Touchpad data comes in two packet types. A position packet carries the
//! single-touch position, pressure and buttons. When more than one finger is
//! down, a position packet with the "first multi-packet" bit set is followed
//! by a bitmap packet carrying the X and Y electrode maps and a finger count.
//! Nothing in a packet says which type it is; a bitmap packet is recognised
//! only because it follows a flagged position packet.
//!
//! V3 devices with a trackstick also send stick packets, marked by `0x3f` in
//! byte 5. That value never occurs in the other two types.

use alps_errors::{DecodeError, DecodeResult};
use tracing::{debug, warn};

use crate::bitmap::process_bitmap;
use crate::context::{DecodeContext, ProtocolFamily};
use crate::fields::{Decoded, DecodedFields, DropReason, MtPos, TrackstickReport};
use crate::geometry::SensorGeometry;
use crate::registry::ProtocolFlags;

use super::{semi_mt, signed};

const TRACKSTICK_MARKER: u8 = 0x3f;

/// Touchpad and stick buttons shared by all three layouts.
fn decode_buttons(f: &mut DecodedFields, p: &[u8; 6]) {
    f.left = p[3] & 0x01 != 0;
    f.right = p[3] & 0x02 != 0;
    f.middle = p[3] & 0x04 != 0;

    f.ts_left = p[3] & 0x10 != 0;
    f.ts_right = p[3] & 0x20 != 0;
    f.ts_middle = p[3] & 0x40 != 0;
}

fn decode_position_v3(f: &mut DecodedFields, p: &[u8; 6]) {
    f.st = MtPos::new(
        (u32::from(p[1] & 0x7f) << 4) | (u32::from(p[4] & 0x30) >> 2) | (u32::from(p[0] & 0x30) >> 4),
        (u32::from(p[2] & 0x7f) << 4) | u32::from(p[4] & 0x0f),
    );
    f.pressure = i32::from(p[5] & 0x7f);
    decode_buttons(f, p);
}

/// Pinnacle layout.
pub(crate) fn decode_pinnacle(p: &[u8; 6]) -> DecodedFields {
    let mut f = DecodedFields {
        first_mp: p[4] & 0x40 != 0,
        is_mp: p[0] & 0x40 != 0,
        ..Default::default()
    };

    if f.is_mp {
        f.fingers = usize::from(p[5] & 0x03) + 1;
        f.x_map = (u32::from(p[4] & 0x7e) << 8) | (u32::from(p[1] & 0x7f) << 2) | (u32::from(p[0] & 0x30) >> 4);
        f.y_map = (u32::from(p[3] & 0x70) << 4) | (u32::from(p[2] & 0x7f) << 1) | u32::from(p[4] & 0x01);
    } else {
        decode_position_v3(&mut f, p);
    }
    f
}

/// Rushmore layout: Pinnacle with one more bit per bitmap and the bitmap
/// flag moved to byte 5.
pub(crate) fn decode_rushmore(p: &[u8; 6]) -> DecodedFields {
    let mut f = DecodedFields {
        first_mp: p[4] & 0x40 != 0,
        is_mp: p[5] & 0x40 != 0,
        ..Default::default()
    };

    if f.is_mp {
        f.fingers = usize::from((p[5] & 0x03).max((p[5] >> 2) & 0x03)) + 1;
        f.x_map = (u32::from(p[5] & 0x10) << 11)
            | (u32::from(p[4] & 0x7e) << 8)
            | (u32::from(p[1] & 0x7f) << 2)
            | (u32::from(p[0] & 0x30) >> 4);
        f.y_map = (u32::from(p[5] & 0x20) << 6)
            | (u32::from(p[3] & 0x70) << 4)
            | (u32::from(p[2] & 0x7f) << 1)
            | u32::from(p[4] & 0x01);
    } else {
        decode_position_v3(&mut f, p);
    }
    f
}

/// Dolphin layout.
///
/// The bitmap packet carries a 35-bit palm profile: the Y map in the low
/// `y_bits` bits, the X map in the next `x_bits` bits.
pub(crate) fn decode_dolphin(p: &[u8; 6], geometry: &SensorGeometry) -> DecodedFields {
    let mut f = DecodedFields {
        first_mp: p[0] & 0x02 != 0,
        is_mp: p[0] & 0x20 != 0,
        ..Default::default()
    };

    if f.is_mp {
        f.fingers = usize::from(((p[0] & 0x06) >> 1) | ((p[0] & 0x10) >> 2));

        let palm = u64::from(p[1] & 0x7f)
            | (u64::from(p[2] & 0x7f) << 7)
            | (u64::from(p[4] & 0x7f) << 14)
            | (u64::from(p[5] & 0x7f) << 21)
            | (u64::from(p[3] & 0x07) << 28)
            | (u64::from(p[3] & 0x70) << 29)
            | (u64::from(p[0] & 0x01) << 34);

        f.y_map = profile(palm, 0, geometry.y_bits);
        f.x_map = profile(palm, geometry.y_bits, geometry.x_bits);
    } else {
        f.st = MtPos::new(
            u32::from(p[1] & 0x7f) | (u32::from(p[4] & 0x0f) << 7),
            u32::from(p[2] & 0x7f) | (u32::from(p[4] & 0xf0) << 3),
        );
        f.pressure = if p[0] & 0x04 != 0 { 0 } else { i32::from(p[5] & 0x7f) };
        decode_buttons(&mut f, p);
    }
    f
}

/// `bits` bits of `palm` starting at `shift`.
fn profile(palm: u64, shift: u32, bits: u32) -> u32 {
    let mask = (1u64 << bits.min(32)) - 1;
    let v = palm.checked_shr(shift).unwrap_or(0) & mask;
    u32::try_from(v).unwrap_or(u32::MAX)
}

fn decode_fields(p: &[u8; 6], ctx: &DecodeContext) -> DecodedFields {
    match ctx.family() {
        ProtocolFamily::V3Rushmore => decode_rushmore(p),
        ProtocolFamily::V5Dolphin => decode_dolphin(p, &ctx.geometry),
        _ => decode_pinnacle(p),
    }
}

/// V3 and Rushmore: route stick packets, everything else is touchpad data.
pub(super) fn process(p: &[u8; 6], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    if p[5] == TRACKSTICK_MARKER {
        return process_trackstick(p, ctx);
    }
    process_touchpad(p, ctx)
}

fn process_trackstick(p: &[u8; 6], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    if !ctx.has(ProtocolFlags::DUALPOINT) {
        warn!("Rejected trackstick packet from non DualPoint device");
        return Err(DecodeError::RejectedTrackstick);
    }

    if p[0] & 0x40 == 0 {
        debug!("Bad trackstick packet, discarding");
        return Ok(Decoded::Dropped(DropReason::BadTrackstick));
    }

    // marks the end of a burst of stick data
    if p[1] == 0x7f && p[2] == 0x7f && p[4] == 0x7f {
        return Ok(Decoded::Dropped(DropReason::TrackstickEndOfStream));
    }

    // raw deltas are large, scale them down
    let x = signed(((p[0] & 0x20) << 2) | (p[1] & 0x7f)) / 8;
    let y = signed(((p[0] & 0x10) << 3) | (p[2] & 0x7f)) / 8;
    let z = i32::from(p[4] & 0x7f);

    // Most models carry the stick buttons in touchpad packets, a few here.
    // There is no way to tell upfront, so the first press seen here switches
    // reporting over for good.
    let buttons = p[3] & 0x07;
    if buttons != 0 {
        ctx.latch_trackstick_buttons_quirk();
    }

    Ok(Decoded::Trackstick(TrackstickReport {
        dx: x,
        dy: -y,
        pressure: Some(z),
        buttons: ctx.trackstick_buttons_quirk().then_some(buttons),
    }))
}

/// Position/bitmap reassembly shared by V3, Rushmore and Dolphin.
pub(super) fn process_touchpad(p: &[u8; 6], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    let mut f = decode_fields(p, ctx);
    let mut fingers = 0;

    if ctx.multi_packet != 0 {
        // A flagged position packet is sometimes followed by another
        // position packet; only a bitmap packet completes the pair.
        if f.is_mp {
            fingers = f.fingers;
            let bitmap = f;
            let buffered = ctx.multi_data;
            f = decode_fields(&buffered, ctx);
            f.x_map = bitmap.x_map;
            f.y_map = bitmap.y_map;
            f.fingers = bitmap.fingers;
            if process_bitmap(&mut f, ctx) == 0 {
                fingers = 0;
            }
        } else {
            ctx.multi_packet = 0;
        }
    }

    // The bitmap flag is only seen outside a pair when the data is suspect,
    // e.g. a palm lying flat.
    if f.is_mp {
        return Err(DecodeError::OutOfSequence);
    }

    if ctx.multi_packet == 0 && f.first_mp {
        ctx.multi_packet = 1;
        ctx.multi_data = *p;
        return Ok(Decoded::Pending);
    }

    ctx.multi_packet = 0;

    // Real releases zero x, y and z together; a lone z = 0 mid-stream is noise.
    if f.st.x != 0 && f.st.y != 0 && f.pressure == 0 {
        return Ok(Decoded::Dropped(DropReason::ZeroPressureFluke));
    }

    let mut f = semi_mt(f, fingers, ctx);

    if !ctx.has(ProtocolFlags::DUALPOINT) || ctx.trackstick_buttons_quirk() {
        f.clear_ts_buttons();
    }

    Ok(Decoded::Touch(f))
}
