//! ALPS protocol constants.
//!
//! Values are hardware-defined. They are cross-referenced against the Linux
//! `drivers/input/mouse/alps.h` header and the VoodooPS2 ALPS port, which
//! carry identical tables.

#![deny(static_mut_refs)]

/// Maximum number of simultaneous contacts any ALPS protocol reports.
pub const MAX_TOUCHES: usize = 5;

/// Raw protocol version tags as used by the firmware identification tables.
pub mod versions {
    /// V1: 6-byte absolute, oldest GlidePoint pads
    pub const V1: u16 = 0x100;
    /// V2: 6-byte absolute with optional DualPoint stick
    pub const V2: u16 = 0x200;
    /// V3 "Pinnacle": position and bitmap packets
    pub const V3: u16 = 0x300;
    /// V3 "Rushmore": V3 layout with wider bitmaps
    pub const V3_RUSHMORE: u16 = 0x310;
    /// V4: 8-byte packets, bitmap split over three packets
    pub const V4: u16 = 0x400;
    /// V5 "Dolphin": V3-style with a 35-bit palm profile
    pub const V5: u16 = 0x500;
    /// V6: 6-byte touchpad and trackpoint
    pub const V6: u16 = 0x600;
    /// V7: t3btl, t4s
    pub const V7: u16 = 0x700;
    /// V8: SS4btl, SS4s, SS4-Plus
    pub const V8: u16 = 0x800;
    /// V9: ss3btl (recognised, not decoded)
    pub const V9: u16 = 0x900;
}

/// Device quirks latched at runtime.
pub mod quirks {
    /// Trackstick buttons arrive in trackstick packets rather than pad packets.
    pub const TRACKSTICK_BUTTONS: u8 = 1;
}

/// Packet lengths.
pub mod packet_len {
    /// Bare PS/2 mouse packet
    pub const PS2: usize = 3;
    /// Standard ALPS packet
    pub const STANDARD: usize = 6;
    /// V4 packet
    pub const V4: usize = 8;
    /// Largest packet of any protocol
    pub const MAX: usize = V4;
}

/// Dolphin (V5) sensor profile constants.
pub mod dolphin {
    /// Coordinate units per electrode
    pub const COUNT_PER_ELECTRODE: i32 = 64;
    /// X electrode count offset
    pub const PROFILE_XOFFSET: i32 = 8;
    /// Y electrode count offset
    pub const PROFILE_YOFFSET: i32 = 1;
}

/// SS4 (V8) sensor constants.
pub mod ss4 {
    /// Coordinate units per electrode
    pub const COUNT_PER_ELECTRODE: i32 = 256;
    /// X electrode count offset
    pub const NUMSENSOR_XOFFSET: i32 = 7;
    /// Y electrode count offset
    pub const NUMSENSOR_YOFFSET: i32 = 7;
    /// Minimum electrode pitch in 0.1 mm
    pub const MIN_PITCH_MM: i32 = 50;
    /// Mask of the three normal buttons in byte 0 (after shifting)
    pub const MASK_NORMAL_BUTTONS: u8 = 0x07;

    /// X value of an empty fourth-finger slot
    pub const MFPACKET_NO_AX: u32 = 8160;
    /// Y value of an empty fourth-finger slot
    pub const MFPACKET_NO_AY: u32 = 4080;
    /// X value of an empty fourth-finger slot, buttonless pads
    pub const MFPACKET_NO_AX_BL: u32 = 8176;
    /// Y value of an empty fourth-finger slot, buttonless pads
    pub const MFPACKET_NO_AY_BL: u32 = 4088;
}

/// SS4-Plus (V8, `73 03 28`) sensor constants.
pub mod ss4_plus {
    /// Coordinate units per electrode
    pub const COUNT_PER_ELECTRODE: i32 = 128;
    /// X electrode count offset
    pub const NUMSENSOR_XOFFSET: i32 = 16;
    /// Y electrode count offset
    pub const NUMSENSOR_YOFFSET: i32 = 5;
    /// Minimum electrode pitch in 0.1 mm
    pub const MIN_PITCH_MM: i32 = 37;

    /// X value of an empty fourth-finger slot
    pub const MFPACKET_NO_AX: u32 = 4080;
    /// X value of an empty fourth-finger slot, buttonless pads
    pub const MFPACKET_NO_AX_BL: u32 = 4088;

    /// E7 signature identifying an SS4-Plus device
    pub const DEV_ID: [u8; 3] = [0x73, 0x03, 0x28];
}

/// Nominal absolute ranges of the legacy single-touch protocols.
pub mod bounds {
    /// Minimum X
    pub const XMIN: i32 = 0;
    /// Maximum X
    pub const XMAX: i32 = 6143;
    /// Minimum Y
    pub const YMIN: i32 = 0;
    /// Maximum Y
    pub const YMAX: i32 = 6143;
    /// Typical minimum X reached by a finger
    pub const XMIN_NOMINAL: i32 = 1472;
    /// Typical maximum X reached by a finger
    pub const XMAX_NOMINAL: i32 = 5472;
    /// Typical minimum Y reached by a finger
    pub const YMIN_NOMINAL: i32 = 1408;
    /// Typical maximum Y reached by a finger
    pub const YMAX_NOMINAL: i32 = 4448;
    /// Absolute position bit width
    pub const ABS_POS_BITS: u32 = 13;
    /// Largest positive X before sign wrap
    pub const X_MAX_POSITIVE: i32 = 8176;
    /// Largest positive Y before sign wrap
    pub const Y_MAX_POSITIVE: i32 = 8176;
}

/// Touch hysteresis of the single-touch protocols (V1, V2, V6).
pub mod touch_threshold {
    /// Pressure above which a finger is considered down
    pub const PRESS: i32 = 30;
    /// Pressure below which a finger is considered lifted
    pub const RELEASE: i32 = 25;
    /// Pressure substituted for a hardware tap gesture (V1/V2)
    pub const TAP_PRESSURE: i32 = 40;
}

/// Returns true if the E7 signature identifies an SS4-Plus device.
pub fn is_ss4_plus(dev_id: &[u8; 3]) -> bool {
    *dev_id == ss4_plus::DEV_ID
}
