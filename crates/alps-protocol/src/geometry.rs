//! Sensor geometry: coordinate ranges, bitmap widths and resolution.
//!
//! Defaults depend on the protocol version. Dolphin and SS4 devices refine
//! them from one-time-programmable (OTP) bytes, and V3/V7 devices from two
//! pitch registers. Reading those bytes is the transport's job; the helpers
//! here only interpret them.

use serde::{Deserialize, Serialize};

use crate::ids::{dolphin, ss4, ss4_plus};
use crate::registry::ProtocolVersion;

/// Coordinate space of a touchpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorGeometry {
    /// Largest X coordinate
    pub x_max: i32,
    /// Largest Y coordinate
    pub y_max: i32,
    /// Number of X bitmap bits (electrodes)
    pub x_bits: u32,
    /// Number of Y bitmap bits (electrodes)
    pub y_bits: u32,
    /// X resolution in units per mm, if known
    #[serde(default)]
    pub x_res: Option<u32>,
    /// Y resolution in units per mm, if known
    #[serde(default)]
    pub y_res: Option<u32>,
}

impl Default for SensorGeometry {
    fn default() -> Self {
        Self {
            x_max: 2000,
            y_max: 1400,
            x_bits: 15,
            y_bits: 11,
            x_res: None,
            y_res: None,
        }
    }
}

impl SensorGeometry {
    /// Default geometry for a protocol version.
    pub fn for_version(version: ProtocolVersion) -> Self {
        let base = Self::default();
        match version {
            ProtocolVersion::V1 | ProtocolVersion::V2 => Self {
                x_max: 1023,
                y_max: 767,
                ..base
            },
            ProtocolVersion::V3Rushmore => Self {
                x_bits: 16,
                y_bits: 12,
                ..base
            },
            ProtocolVersion::V5 => Self {
                x_bits: 23,
                y_bits: 12,
                ..base
            },
            ProtocolVersion::V6 => Self {
                x_max: 2047,
                y_max: 1535,
                ..base
            },
            ProtocolVersion::V7 => Self {
                x_max: 0xfff,
                y_max: 0x7ff,
                ..base
            },
            ProtocolVersion::V3 | ProtocolVersion::V4 | ProtocolVersion::V8 | ProtocolVersion::V9 => {
                base
            }
        }
    }

    /// Dolphin device area from the OTP report.
    ///
    /// Byte 2 carries the X electrode count (low nibble) and the Y electrode
    /// count (high nibble) relative to the profile offsets.
    pub fn dolphin(otp: [u8; 3]) -> Self {
        let num_x = dolphin::PROFILE_XOFFSET + i32::from(otp[2] & 0x0f);
        let num_y = dolphin::PROFILE_YOFFSET + i32::from((otp[2] >> 4) & 0x0f);
        Self {
            x_max: (num_x - 1) * dolphin::COUNT_PER_ELECTRODE,
            y_max: (num_y - 1) * dolphin::COUNT_PER_ELECTRODE,
            x_bits: num_x.unsigned_abs(),
            y_bits: num_y.unsigned_abs(),
            x_res: None,
            y_res: None,
        }
    }

    /// SS4 / SS4-Plus device area from the two OTP pages.
    pub fn ss4(otp: &Ss4Otp, plus: bool) -> Self {
        let (num_x, num_y, count, x_pitch, y_pitch) = if plus {
            let p = otp.pages[0];
            (
                ss4_plus::NUMSENSOR_XOFFSET + i32::from(p[2] & 0x0f),
                ss4_plus::NUMSENSOR_YOFFSET + i32::from((p[2] >> 4) & 0x0f),
                ss4_plus::COUNT_PER_ELECTRODE,
                i32::from(p[1] & 0x0f) + ss4_plus::MIN_PITCH_MM,
                i32::from((p[1] >> 4) & 0x0f) + ss4_plus::MIN_PITCH_MM,
            )
        } else {
            let p = otp.pages[1];
            (
                ss4::NUMSENSOR_XOFFSET + i32::from(p[0] & 0x0f),
                ss4::NUMSENSOR_YOFFSET + i32::from((p[0] >> 4) & 0x0f),
                ss4::COUNT_PER_ELECTRODE,
                i32::from((p[2] >> 2) & 0x07) + ss4::MIN_PITCH_MM,
                i32::from((p[2] >> 5) & 0x07) + ss4::MIN_PITCH_MM,
            )
        };

        // physical size in 0.1 mm
        let x_phys = x_pitch * (num_x - 1);
        let y_phys = y_pitch * (num_y - 1);

        Self {
            x_max: (num_x - 1) * count,
            y_max: (num_y - 1) * count,
            ..Self::default()
        }
        .with_resolution(x_phys, y_phys)
    }

    /// Apply the V3/V7 pitch and electrode registers.
    ///
    /// Both registers hold two signed nibbles: X in the low nibble, Y in the
    /// high nibble.
    pub fn with_v3_v7_pitch(self, pitch_reg: u8, electrode_reg: u8) -> Self {
        let x_pitch = 50 + 2 * i32::from(low_nibble_signed(pitch_reg));
        let y_pitch = 36 + 2 * i32::from(high_nibble_signed(pitch_reg));
        let x_electrode = 17 + i32::from(low_nibble_signed(electrode_reg));
        let y_electrode = 13 + i32::from(high_nibble_signed(electrode_reg));

        self.with_resolution(x_pitch * (x_electrode - 1), y_pitch * (y_electrode - 1))
    }

    fn with_resolution(self, x_phys: i32, y_phys: i32) -> Self {
        let res = |max: i32, phys: i32| {
            if phys > 0 && max >= 0 {
                u32::try_from(i64::from(max) * 10 / i64::from(phys)).ok()
            } else {
                None
            }
        };
        Self {
            x_res: res(self.x_max, x_phys),
            y_res: res(self.y_max, y_phys),
            ..self
        }
    }
}

fn low_nibble_signed(reg: u8) -> i8 {
    i8::from_ne_bytes([reg << 4]) >> 4
}

fn high_nibble_signed(reg: u8) -> i8 {
    i8::from_ne_bytes([reg]) >> 4
}

/// The two OTP pages read from an SS4 device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ss4Otp {
    /// Page 0 and page 1, four bytes each
    pub pages: [[u8; 4]; 2],
}

impl Ss4Otp {
    /// Whether the pad is buttonless (a clickpad).
    pub fn is_buttonless(&self, plus: bool) -> bool {
        if plus {
            (self.pages[1][0] >> 1) & 0x01 != 0
        } else {
            (self.pages[1][1] >> 3) & 0x01 != 0
        }
    }

    /// Whether the device has a trackstick. Only SS4-Plus reports this in OTP.
    pub fn is_dual(&self, plus: bool) -> bool {
        plus && (self.pages[0][0] >> 4) & 0x01 != 0
    }
}
