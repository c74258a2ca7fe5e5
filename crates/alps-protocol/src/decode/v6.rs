//! V6 touchpad and trackpoint packets.
//!
//! Byte 5 tells them apart: `0x7f` is a trackpoint packet, anything lower is
//! touchpad pressure.

use alps_errors::{DecodeError, DecodeResult};
use tracing::warn;

use crate::context::DecodeContext;
use crate::fields::{Decoded, DecodedFields, MtPos, TrackstickReport};
use crate::ids::touch_threshold;
use crate::registry::ProtocolFlags;

use super::signed;

const TRACKPOINT_MARKER: u8 = 0x7f;

pub(super) fn process(p: &[u8; 6], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    if p[5] == TRACKPOINT_MARKER {
        return process_trackpoint(p, ctx);
    }

    let x = u32::from(p[1]) | (u32::from(p[3] & 0x78) << 4);
    let y = u32::from(p[2]) | (u32::from(p[4] & 0x78) << 4);
    let z = i32::from(p[5]);

    if z > touch_threshold::PRESS {
        ctx.touch_down = true;
    } else if z < touch_threshold::RELEASE {
        ctx.touch_down = false;
    }

    let st = MtPos::new(x, y);
    let fingers = usize::from(z > 0);
    let mut f = DecodedFields {
        fingers,
        pressure: z,
        st,
        mt_count: fingers,
        // no middle button on V6 pads
        left: p[3] & 0x01 != 0,
        right: p[3] & 0x02 != 0,
        ..Default::default()
    };
    f.mt[0] = st;
    f.legacy.touching = ctx.touch_down;
    Ok(Decoded::Touch(f))
}

fn process_trackpoint(p: &[u8; 6], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    if !ctx.has(ProtocolFlags::DUALPOINT) {
        warn!("Rejected trackstick packet from non DualPoint device");
        return Err(DecodeError::RejectedTrackstick);
    }

    let mut x = p[1] | ((p[3] & 0x20) << 2);
    let mut y = p[2] | ((p[3] & 0x40) << 1);
    let mut z = p[4];

    // sent when the finger lifts; reporting it would jump the cursor
    if x == 0x7f && y == 0x7f && z == 0x7f {
        x = 0;
        y = 0;
        z = 0;
    }

    let divisor = ctx.trackpoint_divisor.max(1);
    Ok(Decoded::Trackstick(TrackstickReport {
        dx: signed(x) / divisor,
        dy: -(signed(y) / divisor),
        pressure: Some(i32::from(z)),
        buttons: Some(p[3] & 0x07),
    }))
}
