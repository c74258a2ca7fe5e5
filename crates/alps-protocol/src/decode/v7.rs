//! V7 packets.
//!
//! A V7 packet carries up to two contact slots. A classifier on bytes 0, 1
//! and 4 tells apart idle packets, one/two-finger packets, three-plus finger
//! packets and "new" packets. New packets mark a discontinuity in slot
//! assignment (a finger moved between slots); they lack a usable finger count
//! and button state and their second X is off by up to 16 units, so they are
//! dropped.

use alps_errors::{DecodeError, DecodeResult};
use tracing::trace;

use crate::context::DecodeContext;
use crate::fields::{Decoded, DecodedFields, DropReason, MtPos, TrackstickReport};
use crate::ids::MAX_TOUCHES;
use crate::registry::ProtocolFlags;

use super::signed;

/// Largest Y coordinate; V7 Y is reported inverted.
const Y_MAX: u32 = 0x7ff;

/// V7 packet classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V7PacketId {
    /// No fingers and no buttons
    Idle,
    /// One or two fingers
    Two,
    /// Three or more fingers
    Multi,
    /// Slot discontinuity
    New,
    /// Not classifiable
    Unknown,
}

/// Classify a V7 packet.
pub fn v7_packet_id(p: &[u8; 6]) -> V7PacketId {
    if p[4] & 0x40 != 0 {
        V7PacketId::Two
    } else if p[4] & 0x01 != 0 {
        V7PacketId::Multi
    } else if p[0] & 0x10 != 0 && p[4] & 0x43 == 0 {
        V7PacketId::New
    } else if p[1] == 0x00 && p[4] == 0x00 {
        V7PacketId::Idle
    } else {
        V7PacketId::Unknown
    }
}

fn is_trackstick(p: &[u8; 6]) -> bool {
    p[0] == 0x48 && p[4] & 0x47 == 0x06
}

/// Contact positions of slots 0 and 1.
pub(crate) fn coordinates(p: &[u8; 6], id: V7PacketId) -> [MtPos; 2] {
    let b = |i: usize| u32::from(p[i]);

    let mut mt0 = MtPos::new(
        ((b(2) & 0x80) << 4) | ((b(2) & 0x3f) << 5) | ((b(3) & 0x30) >> 1) | (b(3) & 0x07),
        (b(1) << 3) | (b(0) & 0x07),
    );
    let mut mt1 = MtPos::new(
        ((b(3) & 0x80) << 4) | ((b(4) & 0x80) << 3) | ((b(4) & 0x3f) << 4),
        ((b(5) & 0x80) << 3) | ((b(5) & 0x3f) << 4),
    );

    match id {
        V7PacketId::Two => {
            mt1.x &= !0x000f;
            mt1.y |= 0x000f;
            // both at maximum is a phantom touch
            if mt1.y == 0x7ff && mt1.x == 0xff0 {
                mt1.x = 0;
            }
        }
        V7PacketId::Multi => {
            mt1.x &= !0x003f;
            mt1.y &= !0x0020;
            mt1.y |= (b(4) & 0x02) << 4;
            mt1.y |= 0x001f;
        }
        V7PacketId::New => {
            mt1.x &= !0x003f;
            mt1.x |= b(0) & 0x20;
            mt1.y |= 0x000f;
        }
        V7PacketId::Idle | V7PacketId::Unknown => {}
    }

    mt0.y = Y_MAX.saturating_sub(mt0.y);
    mt1.y = Y_MAX.saturating_sub(mt1.y);
    [mt0, mt1]
}

pub(super) fn process(p: &[u8; 6], ctx: &mut DecodeContext) -> DecodeResult<Decoded> {
    if ctx.has(ProtocolFlags::DUALPOINT) && is_trackstick(p) {
        return Ok(process_trackstick(p));
    }

    let id = v7_packet_id(p);
    trace!("v7 packet {:02x?}: {:?}", p, id);
    match id {
        V7PacketId::Idle => return Ok(Decoded::Idle),
        V7PacketId::Unknown => return Err(DecodeError::unknown_packet("v7")),
        V7PacketId::New => return Ok(Decoded::Dropped(DropReason::SlotDiscontinuity)),
        V7PacketId::Two | V7PacketId::Multi => {}
    }

    let [mt0, mt1] = coordinates(p, id);
    let mut f = DecodedFields::default();
    f.mt[0] = mt0;
    f.mt[1] = mt1;

    f.fingers = if id == V7PacketId::Two {
        f.nonzero_mt_count()
    } else {
        3 + usize::from(p[5] & 0x03)
    };

    f.left = p[0] & 0x80 != 0;
    if ctx.has(ProtocolFlags::BUTTONPAD) {
        // clickpads reuse the right/middle bits as extra finger counts
        f.fingers += usize::from(p[0] & 0x20 != 0) + usize::from(p[0] & 0x10 != 0);
    } else {
        f.right = p[0] & 0x20 != 0;
        f.middle = p[0] & 0x10 != 0;
    }
    f.fingers = f.fingers.min(MAX_TOUCHES);

    // a lone touch is sometimes reported in slot 1
    if f.fingers == 1 && f.mt[0].is_zero() {
        f.mt[0] = f.mt[1];
        f.mt[1] = MtPos::default();
    }

    // empty slots are zero; keep the populated ones in front
    if f.mt[0].is_zero() && !f.mt[1].is_zero() {
        f.mt.swap(0, 1);
    }
    f.mt_count = f.nonzero_mt_count();
    f.st = f.mt[0];

    Ok(Decoded::Touch(f))
}

fn process_trackstick(p: &[u8; 6]) -> Decoded {
    let x = (p[2] & 0xbf) | ((p[3] & 0x10) << 2);
    let y = (p[3] & 0x07) | (p[4] & 0xb8) | ((p[3] & 0x20) << 1);
    let z = (p[5] & 0x3f) | ((p[3] & 0x80) >> 1);

    Decoded::Trackstick(TrackstickReport {
        dx: signed(x),
        dy: -signed(y),
        pressure: Some(i32::from(z)),
        buttons: Some(p[1] & 0x07),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::identify;

    fn v7(fw: u8) -> Result<DecodeContext, Box<dyn std::error::Error>> {
        Ok(DecodeContext::new(identify([0x73, 0x03, 0x0a], [0x88, fw, 0x00])?)?)
    }

    #[test]
    fn test_classifier() {
        assert_eq!(v7_packet_id(&[0x48, 0x00, 0x00, 0x48, 0x40, 0x00]), V7PacketId::Two);
        assert_eq!(v7_packet_id(&[0x48, 0x00, 0x00, 0x48, 0x01, 0x00]), V7PacketId::Multi);
        assert_eq!(v7_packet_id(&[0x58, 0x00, 0x00, 0x48, 0x00, 0x00]), V7PacketId::New);
        assert_eq!(v7_packet_id(&[0x48, 0x00, 0x00, 0x48, 0x00, 0x00]), V7PacketId::Idle);
        assert_eq!(v7_packet_id(&[0x48, 0x01, 0x00, 0x48, 0x00, 0x00]), V7PacketId::Unknown);
    }

    #[test]
    fn test_two_finger_packet() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctx = v7(0xba)?;
        // slot 0: x = 0x3f << 5 | 0x07 = 0x7e7, y = 0x7ff - (0x10 << 3 | 0) = 0x77f
        // slot 1: x = 0x05 << 4 = 0x50, y = 0x7ff - (0x02 << 4 | 0xf) = 0x7d0
        let p = [0x48, 0x10, 0x3f, 0x4f, 0x45, 0x02];
        let Decoded::Touch(f) = process(&p, &mut ctx)? else {
            return Err("expected touch".into());
        };
        assert_eq!(f.mt[0], MtPos::new(0x7e7, 0x77f));
        assert_eq!(f.mt[1], MtPos::new(0x50, 0x7d0));
        assert_eq!(f.fingers, 2);
        assert_eq!(f.mt_count, 2);
        Ok(())
    }

    #[test]
    fn test_phantom_second_touch() {
        // slot 1 at x = 0xff0, y = 0x7ff before inversion
        let p = [0x48, 0x00, 0x00, 0xc8, 0xff, 0xbf];
        let [_, mt1] = coordinates(&p, V7PacketId::Two);
        assert!(mt1.is_zero());
    }

    #[test]
    fn test_lone_touch_moves_to_slot_zero() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctx = v7(0xba)?;
        // slot 0 empty: y = 0x7ff - 0x7ff needs b1 = 0xff, b0 & 7 = 7
        let p = [0x4f, 0xff, 0x00, 0x48, 0x45, 0x02];
        let Decoded::Touch(f) = process(&p, &mut ctx)? else {
            return Err("expected touch".into());
        };
        assert_eq!(f.fingers, 1);
        assert_eq!(f.contacts(), &[MtPos::new(0x50, 0x7d0)]);
        Ok(())
    }

    #[test]
    fn test_buttonpad_counts_fingers() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctx = v7(0xb3)?;
        assert!(ctx.has(ProtocolFlags::BUTTONPAD));
        let p = [0xe8, 0x10, 0x3f, 0x4f, 0x45, 0x02];
        let Decoded::Touch(f) = process(&p, &mut ctx)? else {
            return Err("expected touch".into());
        };
        assert!(f.left);
        assert!(!f.right);
        assert_eq!(f.fingers, 3);
        Ok(())
    }

    #[test]
    fn test_idle_unknown_new() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctx = v7(0xba)?;
        assert_eq!(process(&[0x48, 0x00, 0x00, 0x48, 0x00, 0x00], &mut ctx)?, Decoded::Idle);
        assert_eq!(
            process(&[0x58, 0x00, 0x00, 0x48, 0x00, 0x00], &mut ctx)?,
            Decoded::Dropped(DropReason::SlotDiscontinuity)
        );
        assert_eq!(
            process(&[0x48, 0x01, 0x00, 0x48, 0x00, 0x00], &mut ctx),
            Err(DecodeError::unknown_packet("v7"))
        );
        Ok(())
    }

    #[test]
    fn test_trackstick_packet() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctx = v7(0xba)?;
        // x = 0x85 & 0xbf = 0x05, y = 0x02 | 0x80 -> -126 after sign, z = 0x12
        let p = [0x48, 0x02, 0x85, 0x4a, 0x86, 0x12];
        assert_eq!(
            process(&p, &mut ctx)?,
            Decoded::Trackstick(TrackstickReport {
                dx: 5,
                dy: 126,
                pressure: Some(0x12),
                buttons: Some(0b010),
            })
        );
        Ok(())
    }
}
