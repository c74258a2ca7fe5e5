//! V1 and V2 single-touch packets.
//!
//! ```text
//!        bit 7  6  5  4  3  2  1  0
//! V1 b0      1  ?  ?  ?  1 x9 x8 x7
//!    b1      x6 x5 x4 x3 x2 x1 x0 (x low 8 bits)
//!    b2      ?  ?  ?  L  R  ?  F  G     F = finger, G = gesture
//!    b3      ?  ?  ?  ?  ?  y9 y8 y7
//!    b4      y low 8 bits
//!    b5      z
//!
//! V2 b0      ?  ?  ?  ?  ?  ?  ?  ?    sync pattern from the model table
//!    b1      x low 7 bits
//!    b2      ?  x10 x9 x8 x7 ?  F  G
//!    b3      ?  y9 y8 y7 ?  M  R  L
//!    b4      y low 7 bits
//!    b5      z
//! ```

use crate::context::DecodeContext;
use crate::fields::{Decoded, DecodedFields, LegacyExtras, MtPos, TrackstickReport};
use crate::ids::touch_threshold;
use crate::registry::{ProtocolFlags, ProtocolVersion};

/// Pressure value that marks a V2 DualPoint packet as trackstick data.
const TRACKSTICK_Z: i32 = 127;

/// Absolute position and pressure.
pub(crate) fn position(p: &[u8; 6], version: ProtocolVersion) -> (u32, u32, i32) {
    let (x, y) = if version == ProtocolVersion::V1 {
        (
            u32::from(p[1]) | (u32::from(p[0] & 0x07) << 7),
            u32::from(p[4]) | (u32::from(p[3] & 0x07) << 7),
        )
    } else {
        (
            u32::from(p[1]) | (u32::from(p[2] & 0x78) << 4),
            u32::from(p[4]) | (u32::from(p[3] & 0x70) << 3),
        )
    };
    (x, y, i32::from(p[5]))
}

/// Left, right and middle buttons.
pub(crate) fn buttons(p: &[u8; 6], version: ProtocolVersion) -> (bool, bool, bool) {
    if version == ProtocolVersion::V1 {
        (p[2] & 0x10 != 0, p[2] & 0x08 != 0, false)
    } else {
        (p[3] & 0x01 != 0, p[3] & 0x02 != 0, p[3] & 0x04 != 0)
    }
}

fn wheel(p: &[u8; 6]) -> i32 {
    i32::from((p[2] << 1) & 0x08) - i32::from((p[0] >> 4) & 0x07)
}

fn four_buttons(p: &[u8; 6]) -> u8 {
    u8::from(p[2] & 0x04 != 0)
        | u8::from(p[0] & 0x10 != 0) << 1
        | u8::from(p[3] & 0x04 != 0) << 2
        | u8::from(p[0] & 0x20 != 0) << 3
}

/// Fold a 10-bit DualPoint stick value into a signed delta.
fn stick_delta(v: u32, wrap_above: u32, span: i32) -> i32 {
    let v = i32::try_from(v).unwrap_or(i32::MAX);
    if v > i32::try_from(wrap_above).unwrap_or(i32::MAX) {
        v - span
    } else {
        v
    }
}

pub(super) fn process(p: &[u8; 6], ctx: &mut DecodeContext) -> Decoded {
    let version = ctx.version();
    let (x, y, mut z) = position(p, version);
    let (mut left, mut right, mut middle) = buttons(p, version);
    let mut legacy = LegacyExtras::default();

    if ctx.has(ProtocolFlags::FW_BK_1) {
        legacy.back = p[0] & 0x10 != 0;
        legacy.forward = p[2] & 0x04 != 0;
    }

    if ctx.has(ProtocolFlags::FW_BK_2) {
        legacy.back = p[3] & 0x04 != 0;
        legacy.forward = p[2] & 0x04 != 0;
        // both pressed together is the middle button
        middle = legacy.forward && legacy.back;
        if middle {
            legacy.forward = false;
            legacy.back = false;
        }
    }

    let gesture = p[2] & 0x01 != 0;
    let finger = p[2] & 0x02 != 0;

    if ctx.has(ProtocolFlags::DUALPOINT) && z == TRACKSTICK_Z {
        return Decoded::Trackstick(TrackstickReport {
            dx: stick_delta(x, 383, 768),
            dy: -stick_delta(y, 255, 512),
            pressure: None,
            buttons: Some(u8::from(left) | u8::from(right) << 1 | u8::from(middle) << 2),
        });
    }

    if ctx.has(ProtocolFlags::STICK_BITS) {
        left |= p[0] & 0x01 != 0;
        right |= p[0] & 0x02 != 0;
        middle |= p[0] & 0x04 != 0;
    }

    // hardware tap
    if gesture && !finger {
        z = touch_threshold::TAP_PRESSURE;
    }

    // tap-and-drag arrives as (!fin && ges) then (fin && ges); the consumer
    // must insert a lift between the two
    legacy.drag_release = gesture && finger && !ctx.prev_fin;
    ctx.prev_fin = finger;

    if z > touch_threshold::PRESS {
        ctx.touch_down = true;
    } else if z < touch_threshold::RELEASE {
        ctx.touch_down = false;
    }
    legacy.touching = ctx.touch_down;

    if ctx.has(ProtocolFlags::WHEEL) {
        legacy.wheel = wheel(p);
    }
    if ctx.has(ProtocolFlags::FOUR_BUTTONS) {
        legacy.extra_buttons = four_buttons(p);
    }

    let st = MtPos::new(x, y);
    let fingers = usize::from(z > 0);
    let mut f = DecodedFields {
        fingers,
        pressure: z,
        st,
        mt_count: fingers,
        left,
        right,
        middle,
        legacy,
        ..Default::default()
    };
    f.mt[0] = st;
    Decoded::Touch(f)
}
