//! Decoded packet types.
//!
//! Everything here is `Copy` and fixed-size so a decode pass never allocates.

use crate::ids::MAX_TOUCHES;

/// A contact position in device units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MtPos {
    /// X in device units
    pub x: u32,
    /// Y in device units
    pub y: u32,
}

impl MtPos {
    /// Create a position.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// A zero position marks an empty slot on protocols that report slots.
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Extra inputs of the V1/V2 single-touch protocols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyExtras {
    /// Forward button (FW_BK_1 / FW_BK_2 models)
    pub forward: bool,
    /// Back button (FW_BK_1 / FW_BK_2 models)
    pub back: bool,
    /// Scroll wheel delta (WHEEL models)
    pub wheel: i32,
    /// Extra buttons 0-3 as a bitmask (FOUR_BUTTONS models)
    pub extra_buttons: u8,
    /// A tap-and-drag transition: the consumer must report a lift at `st`
    /// before this frame.
    pub drag_release: bool,
    /// Finger presence with the press/release hysteresis applied
    pub touching: bool,
}

/// Normalized output of a single decode pass.
///
/// Invariant: `fingers <= MAX_TOUCHES` and `mt_count <= MAX_TOUCHES`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodedFields {
    /// Bitmap of active X electrodes (bitmap protocols)
    pub x_map: u32,
    /// Bitmap of active Y electrodes (bitmap protocols)
    pub y_map: u32,
    /// Finger count reported by the hardware
    pub fingers: usize,
    /// Contact pressure
    pub pressure: i32,
    /// Single-touch position
    pub st: MtPos,
    /// Multi-touch positions
    pub mt: [MtPos; MAX_TOUCHES],
    /// Number of valid entries in `mt`
    pub mt_count: usize,
    /// First packet of a multi-packet group
    pub first_mp: bool,
    /// Continuation packet of a multi-packet group
    pub is_mp: bool,
    /// Touchpad left button
    pub left: bool,
    /// Touchpad right button
    pub right: bool,
    /// Touchpad middle button
    pub middle: bool,
    /// Trackstick left button
    pub ts_left: bool,
    /// Trackstick right button
    pub ts_right: bool,
    /// Trackstick middle button
    pub ts_middle: bool,
    /// V1/V2 extras
    pub legacy: LegacyExtras,
}

impl DecodedFields {
    /// The populated multi-touch positions.
    pub fn contacts(&self) -> &[MtPos] {
        &self.mt[..self.mt_count.min(MAX_TOUCHES)]
    }

    /// Touchpad buttons as a bitmask (bit 0 left, bit 1 right, bit 2 middle).
    pub fn buttons(&self) -> u8 {
        u8::from(self.left) | u8::from(self.right) << 1 | u8::from(self.middle) << 2
    }

    /// Trackstick buttons as a bitmask (bit 0 left, bit 1 right, bit 2 middle).
    pub fn ts_buttons(&self) -> u8 {
        u8::from(self.ts_left) | u8::from(self.ts_right) << 1 | u8::from(self.ts_middle) << 2
    }

    /// Count of non-zero positions in `mt`.
    pub fn nonzero_mt_count(&self) -> usize {
        self.mt.iter().filter(|p| !p.is_zero()).count()
    }

    pub(crate) fn clear_ts_buttons(&mut self) {
        self.ts_left = false;
        self.ts_right = false;
        self.ts_middle = false;
    }
}

/// Relative trackstick movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackstickReport {
    /// Horizontal delta, positive to the right
    pub dx: i32,
    /// Vertical delta, positive downwards
    pub dy: i32,
    /// Pressure, when the stick reports it
    pub pressure: Option<i32>,
    /// Stick buttons (bit 0 left, bit 1 right, bit 2 middle), when this
    /// packet carries them
    pub buttons: Option<u8>,
}

/// Relative motion from a bare PS/2 mouse packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ps2Packet {
    /// Horizontal delta
    pub dx: i32,
    /// Vertical delta, positive downwards
    pub dy: i32,
    /// Buttons (bit 0 left, bit 1 right, bit 2 middle)
    pub buttons: u8,
}

impl Ps2Packet {
    /// Decode a 3-byte PS/2 packet.
    pub fn decode(packet: [u8; 3]) -> Self {
        let [p0, p1, p2] = packet;
        let dx = if p1 != 0 {
            i32::from(p1) - ((i32::from(p0) << 4) & 0x100)
        } else {
            0
        };
        let dy = if p2 != 0 {
            ((i32::from(p0) << 3) & 0x100) - i32::from(p2)
        } else {
            0
        };
        Self {
            dx,
            dy,
            buttons: p0 & 0x07,
        }
    }
}

/// Why a well-formed packet produced no report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Position packet with zero pressure in the middle of a stream
    ZeroPressureFluke,
    /// The end-of-stream marker of a V3 trackstick burst
    TrackstickEndOfStream,
    /// V3 trackstick packet without its sanity bit
    BadTrackstick,
    /// V7 slot discontinuity packet
    SlotDiscontinuity,
}

/// Result of decoding one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A touchpad frame
    Touch(DecodedFields),
    /// Trackstick movement and buttons
    Trackstick(TrackstickReport),
    /// Buffered as the first packet of a multi-packet group
    Pending,
    /// No fingers and no buttons
    Idle,
    /// Well formed, but carries nothing to report
    Dropped(DropReason),
}
