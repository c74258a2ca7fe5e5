//! V4 8-byte packets.
//!
//! Every packet carries the single-touch position. Bytes 6 and 7 carry a
//! third of a 6-byte bitmap record; bit 6 of byte 6 marks the first third.
//! When the third segment arrives the bitmaps are decoded and the finger
//! count and second contact are refreshed. The last bitmap result is kept in
//! the context and reused until the next record completes; the first contact
//! always follows the current single-touch position.

use crate::bitmap::process_bitmap;
use crate::context::DecodeContext;
use crate::fields::{Decoded, DecodedFields, MtPos};

use super::semi_mt;

const SEGMENTS: u8 = 3;

/// X and Y electrode maps from a complete bitmap record.
pub(crate) fn bitmaps(d: &[u8; 6]) -> (u32, u32) {
    let x_map = (u32::from(d[2] & 0x1f) << 10)
        | (u32::from(d[3] & 0x60) << 3)
        | (u32::from(d[0] & 0x3f) << 2)
        | (u32::from(d[1] & 0x60) >> 5);
    let y_map = (u32::from(d[5] & 0x01) << 10) | (u32::from(d[3] & 0x1f) << 5) | u32::from(d[1] & 0x1f);
    (x_map, y_map)
}

pub(super) fn process(p: &[u8; 8], ctx: &mut DecodeContext) -> Decoded {
    if p[6] & 0x40 != 0 {
        ctx.multi_packet = 0;
    }

    let segment = usize::from(ctx.multi_packet.min(SEGMENTS - 1));
    let offset = 2 * segment;
    ctx.multi_data[offset] = p[6];
    ctx.multi_data[offset + 1] = p[7];

    let mut f: DecodedFields = ctx.retained;
    f.left = p[4] & 0x01 != 0;
    f.right = p[4] & 0x02 != 0;
    f.st = MtPos::new(
        (u32::from(p[1] & 0x7f) << 4) | (u32::from(p[3] & 0x30) >> 2) | (u32::from(p[0] & 0x30) >> 4),
        (u32::from(p[2] & 0x7f) << 4) | u32::from(p[3] & 0x0f),
    );
    f.pressure = i32::from(p[5] & 0x7f);
    f.mt[0] = f.st;

    ctx.multi_packet += 1;
    if ctx.multi_packet >= SEGMENTS {
        ctx.multi_packet = 0;
        let (x_map, y_map) = bitmaps(&ctx.multi_data);
        f.x_map = x_map;
        f.y_map = y_map;
        f.fingers = process_bitmap(&mut f, ctx);
    }

    ctx.retained = f;
    Decoded::Touch(semi_mt(f, f.fingers, ctx))
}
