//! Per-device decode context.
//!
//! The context is owned by one device session and mutated only by the decode
//! step for that device. It carries multi-packet reassembly state between
//! packets together with the device's identity, geometry and quirks.

use alps_errors::IdentifyError;
use tracing::debug;

use crate::fields::DecodedFields;
use crate::geometry::{SensorGeometry, Ss4Otp};
use crate::ids::{is_ss4_plus, quirks};
use crate::registry::{Identity, ProtocolDescriptor, ProtocolFlags, ProtocolVersion};

/// Decoder selected for a device.
///
/// This is the closed set of packet layouts; dispatch is a `match` on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    /// V1 and V2 single-touch packets
    V1V2,
    /// V3 Pinnacle position/bitmap packets
    V3Pinnacle,
    /// V3 Rushmore position/bitmap packets
    V3Rushmore,
    /// V4 8-byte packets
    V4,
    /// V5 Dolphin position/bitmap packets
    V5Dolphin,
    /// V6 touchpad/trackpoint packets
    V6,
    /// V7 slot packets
    V7,
    /// V8 SS4 packets
    Ss4,
    /// V8 SS4-Plus packets
    Ss4Plus,
}

impl ProtocolFamily {
    /// Select the decoder for an identified device.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifyError::UnsupportedProtocol`] for versions without a
    /// decoder.
    pub fn for_identity(identity: &Identity) -> Result<Self, IdentifyError> {
        let family = match identity.descriptor.version {
            ProtocolVersion::V1 | ProtocolVersion::V2 => Self::V1V2,
            ProtocolVersion::V3 => Self::V3Pinnacle,
            ProtocolVersion::V3Rushmore => Self::V3Rushmore,
            ProtocolVersion::V4 => Self::V4,
            ProtocolVersion::V5 => Self::V5Dolphin,
            ProtocolVersion::V6 => Self::V6,
            ProtocolVersion::V7 => Self::V7,
            ProtocolVersion::V8 if is_ss4_plus(&identity.dev_id) => Self::Ss4Plus,
            ProtocolVersion::V8 => Self::Ss4,
            v @ ProtocolVersion::V9 => {
                return Err(IdentifyError::unsupported_protocol(v.raw()));
            }
        };
        Ok(family)
    }

    /// Short name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::V1V2 => "v1/v2",
            Self::V3Pinnacle => "v3",
            Self::V3Rushmore => "v3-rushmore",
            Self::V4 => "v4",
            Self::V5Dolphin => "v5-dolphin",
            Self::V6 => "v6",
            Self::V7 => "v7",
            Self::Ss4 => "ss4",
            Self::Ss4Plus => "ss4-plus",
        }
    }
}

/// Mutable decode state of one device.
#[derive(Debug, Clone)]
pub struct DecodeContext {
    descriptor: ProtocolDescriptor,
    family: ProtocolFamily,
    /// E7 report
    pub dev_id: [u8; 3],
    /// EC report
    pub fw_ver: [u8; 3],
    /// Effective capability flags (descriptor flags plus init-time findings)
    pub flags: ProtocolFlags,
    /// Sensor geometry
    pub geometry: SensorGeometry,
    /// Divisor applied to V6 trackpoint deltas
    pub trackpoint_divisor: i32,
    quirks: u8,
    pub(crate) prev_fin: bool,
    pub(crate) touch_down: bool,
    pub(crate) multi_packet: u8,
    pub(crate) multi_data: [u8; 6],
    pub(crate) second_touch: Option<usize>,
    pub(crate) retained: DecodedFields,
}

impl DecodeContext {
    /// Create the context for an identified device with default geometry.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifyError::UnsupportedProtocol`] if the protocol has no
    /// decoder.
    pub fn new(identity: Identity) -> Result<Self, IdentifyError> {
        let family = ProtocolFamily::for_identity(&identity)?;
        let version = identity.descriptor.version;
        let mut flags = identity.descriptor.flags;

        if version == ProtocolVersion::V7 && identity.fw_ver[1] != 0xba {
            flags |= ProtocolFlags::BUTTONPAD;
        }

        Ok(Self {
            descriptor: identity.descriptor,
            family,
            dev_id: identity.dev_id,
            fw_ver: identity.fw_ver,
            flags,
            geometry: SensorGeometry::for_version(version),
            trackpoint_divisor: 4,
            quirks: 0,
            prev_fin: false,
            touch_down: false,
            multi_packet: 0,
            multi_data: [0; 6],
            second_touch: None,
            retained: DecodedFields::default(),
        })
    }

    /// Replace the sensor geometry.
    pub fn with_geometry(mut self, geometry: SensorGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Apply a Dolphin OTP report. Ignored on other protocols.
    pub fn apply_dolphin_otp(&mut self, otp: [u8; 3]) {
        if self.family == ProtocolFamily::V5Dolphin {
            self.geometry = SensorGeometry::dolphin(otp);
        }
    }

    /// Apply the SS4 OTP pages: device area, buttonless and trackstick bits.
    /// Ignored on other protocols.
    pub fn apply_ss4_otp(&mut self, otp: &Ss4Otp) {
        let plus = match self.family {
            ProtocolFamily::Ss4 => false,
            ProtocolFamily::Ss4Plus => true,
            _ => return,
        };
        self.geometry = SensorGeometry::ss4(otp, plus);
        if otp.is_buttonless(plus) {
            self.flags |= ProtocolFlags::BUTTONPAD;
        }
        if otp.is_dual(plus) {
            self.flags |= ProtocolFlags::DUALPOINT | ProtocolFlags::DUALPOINT_WITH_PRESSURE;
        }
    }

    /// Protocol descriptor.
    pub fn descriptor(&self) -> &ProtocolDescriptor {
        &self.descriptor
    }

    /// Protocol version.
    pub fn version(&self) -> ProtocolVersion {
        self.descriptor.version
    }

    /// Selected decoder.
    pub fn family(&self) -> ProtocolFamily {
        self.family
    }

    /// Packet length of this protocol.
    pub fn packet_len(&self) -> usize {
        self.descriptor.version.packet_len()
    }

    /// Check a capability flag.
    pub fn has(&self, flag: ProtocolFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Latched quirks.
    pub fn quirks(&self) -> u8 {
        self.quirks
    }

    /// Whether trackstick buttons are reported in trackstick packets.
    pub fn trackstick_buttons_quirk(&self) -> bool {
        self.quirks & quirks::TRACKSTICK_BUTTONS != 0
    }

    pub(crate) fn latch_trackstick_buttons_quirk(&mut self) {
        if !self.trackstick_buttons_quirk() {
            debug!("trackstick buttons reported in trackstick packets, latching quirk");
            self.quirks |= quirks::TRACKSTICK_BUTTONS;
        }
    }

    /// Whether a multi-packet group is in progress.
    pub fn in_multi_packet(&self) -> bool {
        self.multi_packet != 0
    }

    /// Buffered multi-packet bytes.
    pub fn multi_data(&self) -> &[u8; 6] {
        &self.multi_data
    }

    /// Drop all inter-packet decode state.
    ///
    /// Identity, geometry, flags and latched quirks survive.
    pub fn reset(&mut self) {
        self.prev_fin = false;
        self.touch_down = false;
        self.multi_packet = 0;
        self.multi_data = [0; 6];
        self.second_touch = None;
        self.retained = DecodedFields::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::identify;

    #[test]
    fn test_v7_buttonpad_from_firmware() -> Result<(), Box<dyn std::error::Error>> {
        let ctx = DecodeContext::new(identify([0x73, 0x03, 0x0a], [0x88, 0xb3, 0x00])?)?;
        assert!(ctx.has(ProtocolFlags::BUTTONPAD));

        let ctx = DecodeContext::new(identify([0x73, 0x03, 0x0a], [0x88, 0xba, 0x00])?)?;
        assert!(!ctx.has(ProtocolFlags::BUTTONPAD));
        Ok(())
    }

    #[test]
    fn test_v9_has_no_decoder() -> Result<(), Box<dyn std::error::Error>> {
        let id = identify([0x73, 0x03, 0xc8], [0, 0, 0])?;
        assert_eq!(
            DecodeContext::new(id).err(),
            Some(IdentifyError::unsupported_protocol(0x900))
        );
        Ok(())
    }

    #[test]
    fn test_ss4_plus_family() -> Result<(), Box<dyn std::error::Error>> {
        let ctx = DecodeContext::new(identify([0x73, 0x03, 0x28], [0, 0, 0])?)?;
        assert_eq!(ctx.family(), ProtocolFamily::Ss4Plus);
        Ok(())
    }

    #[test]
    fn test_reset_keeps_quirks() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctx = DecodeContext::new(identify([0x73, 0x03, 0x0a], [0x88, 0x07, 0x9d])?)?;
        ctx.latch_trackstick_buttons_quirk();
        ctx.multi_packet = 1;
        ctx.reset();
        assert!(ctx.trackstick_buttons_quirk());
        assert!(!ctx.in_multi_packet());
        Ok(())
    }

    #[test]
    fn test_ss4_otp_sets_flags() -> Result<(), Box<dyn std::error::Error>> {
        let mut ctx = DecodeContext::new(identify([0x73, 0x03, 0x28], [0, 0, 0])?)?;
        ctx.apply_ss4_otp(&Ss4Otp {
            pages: [[0x10, 0x00, 0x00, 0x00], [0x02, 0x00, 0x00, 0x00]],
        });
        assert!(ctx.has(ProtocolFlags::BUTTONPAD));
        assert!(ctx.has(ProtocolFlags::DUALPOINT));
        assert_eq!(ctx.geometry.x_max, 15 * 128);
        Ok(())
    }
}
