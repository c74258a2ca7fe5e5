//! Protocol registry: E7/EC signature to protocol descriptor.
//!
//! The registry is consulted once per device, after the transport has read
//! the E6, E7 and EC identification reports. Matching on the model table is
//! exact on all three E7 bytes. When the table has no entry, a fixed set of
//! EC-report rules selects the newer protocols.
//!
//! ## Verification sources
//!
//! The model table and EC rules match `alps_model_data[]`,
//! `alps_match_table()` and `alps_identify()` in the Linux
//! `drivers/input/mouse/alps.c`, which the VoodooPS2 port carries verbatim.

#![deny(static_mut_refs)]

use core::fmt;

use alps_errors::IdentifyError;
use bitflags::bitflags;
use tracing::{debug, warn};

use crate::ids::{is_ss4_plus, versions};

/// ALPS wire protocol generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum ProtocolVersion {
    /// 6-byte absolute, oldest GlidePoint pads
    V1 = versions::V1,
    /// 6-byte absolute with optional DualPoint stick
    V2 = versions::V2,
    /// "Pinnacle" position/bitmap packets
    V3 = versions::V3,
    /// "Rushmore" position/bitmap packets
    V3Rushmore = versions::V3_RUSHMORE,
    /// 8-byte packets, bitmap over three packets
    V4 = versions::V4,
    /// "Dolphin"
    V5 = versions::V5,
    /// Touchpad plus trackpoint, 6-byte packets
    V6 = versions::V6,
    /// t3btl / t4s
    V7 = versions::V7,
    /// SS4 and SS4-Plus
    V8 = versions::V8,
    /// ss3btl, recognised but not decoded
    V9 = versions::V9,
}

impl ProtocolVersion {
    /// Parse a raw version tag.
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            versions::V1 => Some(Self::V1),
            versions::V2 => Some(Self::V2),
            versions::V3 => Some(Self::V3),
            versions::V3_RUSHMORE => Some(Self::V3Rushmore),
            versions::V4 => Some(Self::V4),
            versions::V5 => Some(Self::V5),
            versions::V6 => Some(Self::V6),
            versions::V7 => Some(Self::V7),
            versions::V8 => Some(Self::V8),
            versions::V9 => Some(Self::V9),
            _ => None,
        }
    }

    /// Raw version tag.
    pub fn raw(self) -> u16 {
        self as u16
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::V1 => "V1",
            Self::V2 => "V2",
            Self::V3 => "V3",
            Self::V3Rushmore => "V3 Rushmore",
            Self::V4 => "V4",
            Self::V5 => "V5 Dolphin",
            Self::V6 => "V6",
            Self::V7 => "V7",
            Self::V8 => "V8 SS4",
            Self::V9 => "V9",
        }
    }

    /// Length of one packet in bytes.
    pub fn packet_len(self) -> usize {
        match self {
            Self::V4 => crate::ids::packet_len::V4,
            _ => crate::ids::packet_len::STANDARD,
        }
    }

    /// Whether a packet decoder exists for this version.
    pub fn has_decoder(self) -> bool {
        self != Self::V9
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Device capability flags.
    ///
    /// Bit values match the firmware tables so that descriptors can be
    /// compared against published dumps.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProtocolFlags: u16 {
        /// Has a trackstick
        const DUALPOINT               = 0x0002;
        /// Supports passthrough mode
        const PASS                    = 0x0004;
        /// Has a scroll wheel
        const WHEEL                   = 0x0008;
        /// Forward/back buttons, first layout
        const FW_BK_1                 = 0x0010;
        /// Forward/back buttons, second layout
        const FW_BK_2                 = 0x0020;
        /// Four extra buttons
        const FOUR_BUTTONS            = 0x0040;
        /// Interleaved PS/2 packets from an external port
        const PS2_INTERLEAVED         = 0x0080;
        /// Separate stick button bits in pad packets
        const STICK_BITS              = 0x0100;
        /// Clickpad without physical right/middle buttons
        const BUTTONPAD               = 0x0200;
        /// Trackstick reports pressure
        const DUALPOINT_WITH_PRESSURE = 0x0400;
    }
}

/// Protocol descriptor selected at identification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolDescriptor {
    /// Protocol version
    pub version: ProtocolVersion,
    /// Expected value of byte 0 after masking
    pub byte0: u8,
    /// Mask applied to byte 0
    pub mask0: u8,
    /// Capability flags
    pub flags: ProtocolFlags,
}

impl ProtocolDescriptor {
    const fn new(version: ProtocolVersion, byte0: u8, mask0: u8, flags: ProtocolFlags) -> Self {
        Self {
            version,
            byte0,
            mask0,
            flags,
        }
    }

    /// Check byte 0 of a packet against the descriptor's sync pattern.
    pub fn is_valid_first_byte(&self, byte: u8) -> bool {
        byte & self.mask0 == self.byte0
    }
}

/// One row of the E7 model table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// E7 report
    pub signature: [u8; 3],
    /// Descriptor for that signature
    pub protocol: ProtocolDescriptor,
}

const fn model(signature: [u8; 3], protocol: ProtocolDescriptor) -> ModelInfo {
    ModelInfo {
        signature,
        protocol,
    }
}

use ProtocolFlags as F;
use ProtocolVersion as V;

const NONE: ProtocolFlags = ProtocolFlags::empty();
const PASS_DUALPOINT: ProtocolFlags = F::PASS.union(F::DUALPOINT);
const DUALPOINT_PRESSURE: ProtocolFlags = F::DUALPOINT.union(F::DUALPOINT_WITH_PRESSURE);

/// Known E7 signatures.
pub const MODEL_TABLE: [ModelInfo; 17] = [
    model([0x32, 0x02, 0x14], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, PASS_DUALPOINT)),
    model([0x33, 0x02, 0x0a], ProtocolDescriptor::new(V::V1, 0x88, 0xf8, NONE)),
    model([0x53, 0x02, 0x0a], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, NONE)),
    model([0x53, 0x02, 0x14], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, NONE)),
    model([0x60, 0x03, 0xc8], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, NONE)),
    model([0x63, 0x02, 0x0a], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, NONE)),
    model([0x63, 0x02, 0x14], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, NONE)),
    model([0x63, 0x02, 0x28], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, F::FW_BK_2)),
    model([0x63, 0x02, 0x3c], ProtocolDescriptor::new(V::V2, 0x8f, 0x8f, F::WHEEL)),
    model([0x63, 0x02, 0x50], ProtocolDescriptor::new(V::V2, 0xef, 0xef, F::FW_BK_1)),
    model([0x63, 0x02, 0x64], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, NONE)),
    model([0x63, 0x03, 0xc8], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, PASS_DUALPOINT)),
    model([0x73, 0x00, 0x0a], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, F::DUALPOINT)),
    model([0x73, 0x00, 0x14], ProtocolDescriptor::new(V::V6, 0xff, 0xff, F::DUALPOINT)),
    model([0x73, 0x02, 0x0a], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, NONE)),
    model([0x73, 0x02, 0x14], ProtocolDescriptor::new(V::V2, 0xf8, 0xf8, F::FW_BK_2)),
    model([0x73, 0x02, 0x50], ProtocolDescriptor::new(V::V2, 0xcf, 0xcf, F::FOUR_BUTTONS)),
];

/// Descriptors selected by the EC-report rules.
pub mod protocol_data {
    use super::*;

    /// V3 Pinnacle
    pub const V3: ProtocolDescriptor = ProtocolDescriptor::new(V::V3, 0x8f, 0x8f, DUALPOINT_PRESSURE);
    /// V3 Rushmore
    pub const V3_RUSHMORE: ProtocolDescriptor =
        ProtocolDescriptor::new(V::V3Rushmore, 0x8f, 0x8f, DUALPOINT_PRESSURE);
    /// V4
    pub const V4: ProtocolDescriptor = ProtocolDescriptor::new(V::V4, 0x8f, 0x8f, NONE);
    /// V5 Dolphin
    pub const V5: ProtocolDescriptor = ProtocolDescriptor::new(V::V5, 0xc8, 0xd8, NONE);
    /// V7
    pub const V7: ProtocolDescriptor = ProtocolDescriptor::new(V::V7, 0x48, 0x48, DUALPOINT_PRESSURE);
    /// V8 SS4
    pub const V8: ProtocolDescriptor = ProtocolDescriptor::new(V::V8, 0x18, 0x18, NONE);
    /// V9
    pub const V9: ProtocolDescriptor = ProtocolDescriptor::new(V::V9, 0xc8, 0xc8, NONE);
}

/// Look up an E7 signature in the model table.
///
/// Matching is exact on all three bytes.
///
/// # Example
///
/// ```
/// use alps_protocol::registry::{lookup, ProtocolVersion};
///
/// let desc = lookup([0x73, 0x00, 0x14]).ok_or("missing")?;
/// assert_eq!(desc.version, ProtocolVersion::V6);
/// assert!(lookup([0x73, 0x00, 0x15]).is_none());
/// # Ok::<(), &'static str>(())
/// ```
pub fn lookup(signature: [u8; 3]) -> Option<ProtocolDescriptor> {
    MODEL_TABLE
        .iter()
        .find(|m| m.signature == signature)
        .map(|m| m.protocol)
}

/// Check an E6 report for the ALPS pattern.
///
/// ALPS devices answer `0,0,10` or `0,0,100`; bits 0-2 of the first byte
/// carry button state.
pub fn is_alps_e6_report(e6: [u8; 3]) -> bool {
    e6[0] & 0xf8 == 0 && e6[1] == 0 && (e6[2] == 10 || e6[2] == 100)
}

/// Result of identification: the descriptor and the raw reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Selected protocol
    pub descriptor: ProtocolDescriptor,
    /// E7 report (device ID)
    pub dev_id: [u8; 3],
    /// EC report (firmware version)
    pub fw_ver: [u8; 3],
}

impl Identity {
    /// Whether this device is an SS4-Plus.
    pub fn is_ss4_plus(&self) -> bool {
        self.descriptor.version == ProtocolVersion::V8 && is_ss4_plus(&self.dev_id)
    }
}

/// Identify a device from its E7 and EC reports.
///
/// The model table is tried first, then the EC-report rules in order.
///
/// # Errors
///
/// Returns [`IdentifyError::UnsupportedSignature`] if no rule matches.
pub fn identify(e7: [u8; 3], ec: [u8; 3]) -> Result<Identity, IdentifyError> {
    let descriptor = match lookup(e7) {
        Some(desc) => desc,
        None => match_ec_rules(e7, ec)
            .ok_or_else(|| IdentifyError::unsupported_signature(e7, ec))
            .inspect_err(|_| debug!("Likely not an ALPS touchpad: E7={e7:02x?}, EC={ec:02x?}"))?,
    };

    if !descriptor.version.has_decoder() {
        warn!(
            "Unsupported ALPS {} touchpad: E7={:02x?}, EC={:02x?}",
            descriptor.version, e7, ec
        );
    }

    Ok(Identity {
        descriptor,
        dev_id: e7,
        fw_ver: ec,
    })
}

fn match_ec_rules(e7: [u8; 3], ec: [u8; 3]) -> Option<ProtocolDescriptor> {
    let desc = if e7 == [0x73, 0x02, 0x64] && ec[2] == 0x8a {
        protocol_data::V4
    } else if e7 == [0x73, 0x03, 0x50] && ec[0] == 0x73 && matches!(ec[1], 0x01 | 0x02) {
        protocol_data::V5
    } else if ec[0] == 0x88 && matches!(ec[1] & 0xf0, 0xb0 | 0xc0) {
        protocol_data::V7
    } else if ec[0] == 0x88 && ec[1] == 0x08 {
        protocol_data::V3_RUSHMORE
    } else if ec[0] == 0x88 && ec[1] == 0x07 && (0x90..=0x9d).contains(&ec[2]) {
        protocol_data::V3
    } else if e7[0] == 0x73 && e7[1] == 0x03 && matches!(e7[2], 0x14 | 0x28) {
        protocol_data::V8
    } else if e7 == [0x73, 0x03, 0xc8] {
        protocol_data::V9
    } else {
        return None;
    };
    Some(desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_table_signatures_unique() {
        for (i, a) in MODEL_TABLE.iter().enumerate() {
            for b in MODEL_TABLE.iter().skip(i + 1) {
                assert_ne!(a.signature, b.signature);
            }
        }
    }

    #[test]
    fn test_lookup_every_table_row() -> Result<(), Box<dyn std::error::Error>> {
        for m in &MODEL_TABLE {
            let desc = lookup(m.signature).ok_or("table row not found")?;
            assert_eq!(desc, m.protocol);
        }
        Ok(())
    }

    #[test]
    fn test_v1_descriptor() -> Result<(), Box<dyn std::error::Error>> {
        let desc = lookup([0x33, 0x02, 0x0a]).ok_or("missing V1 row")?;
        assert_eq!(desc.version, ProtocolVersion::V1);
        assert_eq!(desc.byte0, 0x88);
        assert_eq!(desc.mask0, 0xf8);
        assert!(desc.flags.is_empty());
        Ok(())
    }

    #[test]
    fn test_identify_v4_by_ec() -> Result<(), Box<dyn std::error::Error>> {
        let id = identify([0x73, 0x02, 0x64], [0x00, 0x00, 0x8a])?;
        assert_eq!(id.descriptor.version, ProtocolVersion::V4);
        Ok(())
    }

    #[test]
    fn test_table_wins_over_ec_rules() -> Result<(), Box<dyn std::error::Error>> {
        // 63 02 64 is a table row even though the EC looks like V7
        let id = identify([0x63, 0x02, 0x64], [0x88, 0xb3, 0x00])?;
        assert_eq!(id.descriptor.version, ProtocolVersion::V2);
        Ok(())
    }

    #[test]
    fn test_identify_dolphin() -> Result<(), Box<dyn std::error::Error>> {
        let id = identify([0x73, 0x03, 0x50], [0x73, 0x02, 0x00])?;
        assert_eq!(id.descriptor, protocol_data::V5);
        assert!(matches!(identify([0x73, 0x03, 0x50], [0x73, 0x03, 0x00]), Err(_)));
        Ok(())
    }

    #[test]
    fn test_identify_v7_rushmore_v3() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(
            identify([0x73, 0x03, 0x0a], [0x88, 0xc2, 0x00])?.descriptor.version,
            ProtocolVersion::V7
        );
        assert_eq!(
            identify([0x73, 0x03, 0x0a], [0x88, 0x08, 0x1d])?.descriptor.version,
            ProtocolVersion::V3Rushmore
        );
        assert_eq!(
            identify([0x73, 0x03, 0x0a], [0x88, 0x07, 0x9d])?.descriptor.version,
            ProtocolVersion::V3
        );
        assert!(matches!(identify([0x73, 0x03, 0x0a], [0x88, 0x07, 0x9e]), Err(_)));
        Ok(())
    }

    #[test]
    fn test_identify_ss4_and_plus() -> Result<(), Box<dyn std::error::Error>> {
        let ss4 = identify([0x73, 0x03, 0x14], [0x00, 0x00, 0x00])?;
        assert_eq!(ss4.descriptor.version, ProtocolVersion::V8);
        assert!(!ss4.is_ss4_plus());

        let plus = identify([0x73, 0x03, 0x28], [0x00, 0x00, 0x00])?;
        assert!(plus.is_ss4_plus());
        Ok(())
    }

    #[test]
    fn test_identify_v9_is_recognised() -> Result<(), Box<dyn std::error::Error>> {
        let id = identify([0x73, 0x03, 0xc8], [0x00, 0x00, 0x00])?;
        assert_eq!(id.descriptor.version, ProtocolVersion::V9);
        assert!(!id.descriptor.version.has_decoder());
        Ok(())
    }

    #[test]
    fn test_identify_unknown() {
        let err = identify([0x00, 0x00, 0x64], [0x00, 0x00, 0x00]);
        assert_eq!(
            err,
            Err(IdentifyError::unsupported_signature(
                [0x00, 0x00, 0x64],
                [0x00, 0x00, 0x00]
            ))
        );
    }

    #[test]
    fn test_e6_report() {
        assert!(is_alps_e6_report([0x00, 0x00, 0x0a]));
        assert!(is_alps_e6_report([0x07, 0x00, 0x64]));
        assert!(!is_alps_e6_report([0x08, 0x00, 0x64]));
        assert!(!is_alps_e6_report([0x00, 0x00, 0x0b]));
    }

    #[test]
    fn test_version_round_trip() {
        for raw in [0x100, 0x200, 0x300, 0x310, 0x400, 0x500, 0x600, 0x700, 0x800, 0x900] {
            assert_eq!(ProtocolVersion::from_raw(raw).map(ProtocolVersion::raw), Some(raw));
        }
        assert_eq!(ProtocolVersion::from_raw(0x320), None);
    }
}
