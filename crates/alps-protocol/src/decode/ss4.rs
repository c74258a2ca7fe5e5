//! SS4 and SS4-Plus (V8) packets.
//!
//! Bits 4-5 of byte 3 select the packet type. Two-finger packets carry
//! slots 0 and 1; when three or more fingers are down the two-finger packet
//! sets a continuation bit and a multi-finger packet with slots 2 and 3
//! follows. The first packet is buffered in the context until its partner
//! arrives.
//!
//! Buttonless pads and SS4-Plus devices each move one or two coordinate bits,
//! so the multi-finger X/Y extraction depends on both.

use alps_errors::{DecodeError, DecodeResult};
use tracing::{trace, warn};

use crate::context::{DecodeContext, ProtocolFamily};
use crate::fields::{Decoded, DecodedFields, MtPos, TrackstickReport};
use crate::ids::{ss4, ss4_plus};
use crate::registry::ProtocolFlags;

use super::signed;

/// SS4 packet classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ss4PacketId {
    /// No fingers and no buttons
    Idle,
    /// One finger
    One,
    /// Two fingers, or the first half of a three-plus finger report
    Two,
    /// Second half of a three-plus finger report
    Multi,
    /// Trackstick
    Stick,
}

fn is_idle(p: &[u8; 6]) -> bool {
    p[0] == 0x18 && p[1] == 0x10 && p[2] == 0x00 && p[3] & 0x88 == 0x08 && p[4] == 0x10 && p[5] == 0x00
}

/// Classify an SS4 packet.
pub fn ss4_packet_id(p: &[u8; 6]) -> Ss4PacketId {
    match p[3] & 0x30 {
        0x00 if is_idle(p) => Ss4PacketId::Idle,
        0x00 => Ss4PacketId::One,
        0x10 => Ss4PacketId::Two,
        0x20 => Ss4PacketId::Stick,
        _ => Ss4PacketId::Multi,
    }
}

/// Bit layout variant of the multi-finger slots.
#[derive(Debug, Clone, Copy)]
struct Layout {
    buttonless: bool,
    plus: bool,
}

impl Layout {
    fn of(ctx: &DecodeContext) -> Self {
        Self {
            buttonless: ctx.has(ProtocolFlags::BUTTONPAD),
            plus: ctx.family() == ProtocolFamily::Ss4Plus,
        }
    }

    fn slot(self, p: &[u8; 6], i: usize) -> MtPos {
        let b = |n: usize| u32::from(p[n + 3 * i]);

        let mut x = if self.plus {
            ((b(0) << 4) & 0x0070) | ((b(1) << 4) & 0x0f80)
        } else {
            ((b(0) << 5) & 0x00e0) | ((b(1) << 5) & 0x1f00)
        };
        let mut y = ((b(1) << 3) & 0x0010) | ((b(2) << 5) & 0x01e0) | ((b(2) << 4) & 0x0e00);

        if self.buttonless {
            x |= if self.plus {
                (b(0) >> 4) & 0x0008
            } else {
                (b(0) >> 3) & 0x0010
            };
            y |= (b(0) >> 3) & 0x0008;
        }
        MtPos::new(x, y)
    }

    /// Position the firmware sends for an empty fourth slot.
    fn empty_slot(self) -> MtPos {
        let x = match (self.plus, self.buttonless) {
            (true, true) => ss4_plus::MFPACKET_NO_AX_BL,
            (true, false) => ss4_plus::MFPACKET_NO_AX,
            (false, true) => ss4::MFPACKET_NO_AX_BL,
            (false, false) => ss4::MFPACKET_NO_AX,
        };
        let y = if self.buttonless {
            ss4::MFPACKET_NO_AY_BL
        } else {
            ss4::MFPACKET_NO_AY
        };
        MtPos::new(x, y)
    }
}

fn slot_pressed(p: &[u8; 6], i: usize) -> bool {
    let b = p[1 + 3 * i];
    (b & 0x01) | ((b >> 1) & 0x02) != 0
}

fn has_follow_up(p: &[u8; 6]) -> bool {
    p[2] & 0x10 != 0
}

fn btn(p: &[u8; 6]) -> u8 {
    (p[0] >> 5) & ss4::MASK_NORMAL_BUTTONS
}

/// Decode one packet on top of `f`.
fn decode_into(f: &mut DecodedFields, p: &[u8; 6], ctx: &DecodeContext) {
    let layout = Layout::of(ctx);
    let id = ss4_packet_id(p);

    match id {
        Ss4PacketId::One => {
            let x = u32::from(p[0] & 0x07)
                | ((u32::from(p[1]) << 3) & 0x0078)
                | ((u32::from(p[1]) << 2) & 0x0380)
                | ((u32::from(p[2]) << 5) & 0x1c00);
            let y = u32::from(p[2] & 0x0f)
                | ((u32::from(p[3]) >> 2) & 0x0030)
                | ((u32::from(p[4]) << 6) & 0x03c0)
                | ((u32::from(p[4]) << 5) & 0x0c00);
            let z = (p[5] & 0x0f) | ((p[5] >> 1) & 0x70) | (p[4] & 0x80);

            f.mt[0] = MtPos::new(x, y);
            f.st = f.mt[0];
            f.pressure = (i32::from(z) * 2) & 0x7f;
            f.fingers = usize::from(f.pressure > 0);
            f.first_mp = false;
            f.is_mp = false;
        }
        Ss4PacketId::Two => {
            f.mt[0] = layout.slot(p, 0);
            f.mt[1] = layout.slot(p, 1);
            f.st = f.mt[0];
            f.pressure = if slot_pressed(p, 0) { 0x30 } else { 0 };
            if has_follow_up(p) {
                // the count arrives with the multi-finger packet
                f.first_mp = true;
            } else {
                f.fingers = 2;
                f.first_mp = false;
            }
            f.is_mp = false;
        }
        Ss4PacketId::Multi => {
            f.mt[2] = layout.slot(p, 0);
            f.mt[3] = layout.slot(p, 1);
            f.first_mp = false;
            f.is_mp = true;

            // the five-finger bit shares its position with the continuation bit
            if has_follow_up(p) {
                f.fingers = 5;
            } else if f.mt[3] == layout.empty_slot() {
                f.mt[3] = MtPos::default();
                f.fingers = 3;
            } else {
                f.fingers = 4;
            }
        }
        Ss4PacketId::Stick => {
            f.first_mp = false;
            f.is_mp = false;
        }
        Ss4PacketId::Idle => {
            *f = DecodedFields::default();
        }
    }

    let buttons = btn(p);
    if id == Ss4PacketId::Stick {
        f.ts_left = buttons & 0x01 != 0;
        f.ts_right = buttons & 0x02 != 0;
        f.ts_middle = buttons & 0x04 != 0;
    } else {
        f.left = buttons & 0x01 != 0;
        if !layout.buttonless {
            f.right = buttons & 0x02 != 0;
            f.middle = buttons & 0x04 != 0;
        }
    }
}

pub(super) fn process(p: &[u8; 6], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    let mut f = DecodedFields::default();
    decode_into(&mut f, p, ctx);

    if ctx.multi_packet != 0 {
        if f.is_mp {
            let first = ctx.multi_data;
            decode_into(&mut f, &first, ctx);
        } else {
            ctx.multi_packet = 0;
        }
    }

    if f.is_mp {
        return Err(DecodeError::OutOfSequence);
    }

    if ctx.multi_packet == 0 && f.first_mp {
        trace!("ss4 first multi-finger packet buffered");
        ctx.multi_packet = 1;
        ctx.multi_data = *p;
        return Ok(Decoded::Pending);
    }
    ctx.multi_packet = 0;

    match ss4_packet_id(p) {
        Ss4PacketId::Stick => process_stick(p, &f, ctx),
        Ss4PacketId::Idle => Ok(Decoded::Idle),
        Ss4PacketId::One | Ss4PacketId::Two | Ss4PacketId::Multi => {
            f.mt_count = f.fingers.min(4);
            Ok(Decoded::Touch(f))
        }
    }
}

fn process_stick(p: &[u8; 6], f: &DecodedFields, ctx: &DecodeContext) -> DecodeResult<Decoded> {
    if !ctx.has(ProtocolFlags::DUALPOINT) {
        warn!("Rejected trackstick packet from non DualPoint device");
        return Err(DecodeError::RejectedTrackstick);
    }

    let x = ((p[0] & 0x01) << 7) | (p[1] & 0x7f);
    let y = ((p[3] & 0x01) << 7) | (p[2] & 0x7f);

    Ok(Decoded::Trackstick(TrackstickReport {
        dx: signed(x),
        dy: -signed(y),
        pressure: Some(i32::from(p[4] & 0x7f)),
        buttons: Some(f.ts_buttons()),
    }))
}
