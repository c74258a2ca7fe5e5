//! Byte-stream packet framing.
//!
//! [`PacketFramer`] accumulates bytes from the PS/2 stream and hands back
//! complete packets. Each byte is validated as it arrives; a byte that
//! cannot belong to a well-formed packet discards the partial packet and
//! bumps the out-of-sync counter. Bare 3-byte PS/2 packets, which some pads
//! emit for trackstick motion, are recognised by their first byte while the
//! stream is in sync.

use alps_errors::{DecodeError, DecodeResult};
use tracing::{debug, trace};

use crate::fields::Ps2Packet;
use crate::ids::{packet_len, versions};
use crate::registry::{ProtocolDescriptor, ProtocolVersion};

/// A complete protocol packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPacket {
    bytes: [u8; packet_len::MAX],
    len: usize,
}

impl RawPacket {
    /// The packet bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.get(..self.len).unwrap_or(&self.bytes)
    }

    /// Packet length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a framed packet is never empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Output of the framer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framed {
    /// A full protocol packet, ready for [`decode`](crate::decode::decode)
    Packet(RawPacket),
    /// A bare PS/2 relative packet
    Ps2(Ps2Packet),
    /// A full packet the firmware marks as unusable; nothing to decode
    Skipped,
}

/// Per-device framing state.
#[derive(Debug, Clone)]
pub struct PacketFramer {
    descriptor: ProtocolDescriptor,
    packet_len: usize,
    buf: [u8; packet_len::MAX],
    len: usize,
    out_of_sync: u32,
}

impl PacketFramer {
    /// Create a framer for a protocol.
    pub fn new(descriptor: ProtocolDescriptor) -> Self {
        Self {
            descriptor,
            packet_len: descriptor.version.packet_len(),
            buf: [0; packet_len::MAX],
            len: 0,
            out_of_sync: 0,
        }
    }

    /// Bytes buffered towards the current packet.
    pub fn pending(&self) -> usize {
        self.len
    }

    /// Consecutive bad packets since the last good one.
    pub fn out_of_sync(&self) -> u32 {
        self.out_of_sync
    }

    /// Drop any partial packet.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(None)` while a packet is incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Resync`] when the byte cannot continue the
    /// current packet. The partial packet is discarded.
    pub fn push(&mut self, byte: u8) -> DecodeResult<Option<Framed>> {
        let index = self.len;
        let Some(slot) = self.buf.get_mut(index) else {
            // unreachable while packet_len <= MAX; recover by starting over
            self.len = 0;
            return self.bad(index, byte);
        };
        *slot = byte;
        self.len += 1;

        let version = self.descriptor.version;
        let first = self.buf[0];

        if version != ProtocolVersion::V8 && self.out_of_sync == 0 && first & 0xc8 == 0x08 {
            if self.len == packet_len::PS2 {
                self.len = 0;
                let [a, b, c, ..] = self.buf;
                return Ok(Some(Framed::Ps2(Ps2Packet::decode([a, b, c]))));
            }
            return Ok(None);
        }

        if !self.descriptor.is_valid_first_byte(first) {
            trace!(
                "refusing packet[0] = {:#04x} (mask0 = {:#04x}, byte0 = {:#04x})",
                first, self.descriptor.mask0, self.descriptor.byte0
            );
            return self.bad(0, first);
        }

        if version.raw() < versions::V5 && index >= 1 && byte & 0x80 != 0 {
            if version == ProtocolVersion::V3Rushmore && self.len == self.packet_len {
                // Rushmore sets bit 7 on the last byte of packets it wants ignored
                self.len = 0;
                self.out_of_sync = 0;
                return Ok(Some(Framed::Skipped));
            }
            return self.bad(index, byte);
        }

        let valid = match version {
            ProtocolVersion::V7 => match index {
                2 => byte & 0x40 == 0x40,
                3 => byte & 0x48 == 0x48,
                5 => byte & 0x40 == 0x00,
                _ => true,
            },
            ProtocolVersion::V8 => match index {
                3 => byte & 0x08 == 0x08,
                5 => byte & 0x10 == 0x00,
                _ => true,
            },
            _ => true,
        };
        if !valid {
            return self.bad(index, byte);
        }

        if self.len < self.packet_len {
            return Ok(None);
        }

        let packet = RawPacket {
            bytes: self.buf,
            len: self.len,
        };
        self.len = 0;
        self.out_of_sync = 0;
        Ok(Some(Framed::Packet(packet)))
    }

    fn bad(&mut self, index: usize, value: u8) -> DecodeResult<Option<Framed>> {
        self.len = 0;
        self.out_of_sync = self.out_of_sync.saturating_add(1);
        debug!(
            "{} discard byte {} ({:#04x}), {} bad packets in a row",
            self.descriptor.version, index, value, self.out_of_sync
        );
        Err(DecodeError::resync(index, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{lookup, protocol_data};

    fn feed(framer: &mut PacketFramer, bytes: &[u8]) -> Vec<DecodeResult<Option<Framed>>> {
        bytes.iter().map(|&b| framer.push(b)).collect()
    }

    #[test]
    fn test_frames_v2_packet() -> Result<(), Box<dyn std::error::Error>> {
        let mut framer = PacketFramer::new(lookup([0x53, 0x02, 0x0a]).ok_or("missing")?);
        let out = feed(&mut framer, &[0xf8, 0x10, 0x00, 0x00, 0x10, 0x30]);
        assert_eq!(&out[..5], &[Ok(None), Ok(None), Ok(None), Ok(None), Ok(None)]);
        let Some(Ok(Some(Framed::Packet(p)))) = out.last().copied() else {
            return Err("expected packet".into());
        };
        assert_eq!(p.as_bytes(), &[0xf8, 0x10, 0x00, 0x00, 0x10, 0x30]);
        assert_eq!(framer.pending(), 0);
        Ok(())
    }

    #[test]
    fn test_bad_first_byte_resyncs() -> Result<(), Box<dyn std::error::Error>> {
        let mut framer = PacketFramer::new(lookup([0x53, 0x02, 0x0a]).ok_or("missing")?);
        assert_eq!(framer.push(0x00), Err(DecodeError::resync(0, 0x00)));
        assert_eq!(framer.out_of_sync(), 1);
        assert_eq!(framer.pending(), 0);
        Ok(())
    }

    #[test]
    fn test_high_bit_in_body_resyncs() -> Result<(), Box<dyn std::error::Error>> {
        let mut framer = PacketFramer::new(protocol_data::V4);
        framer.push(0x8f)?;
        framer.push(0x10)?;
        assert_eq!(framer.push(0x90), Err(DecodeError::resync(2, 0x90)));
        assert_eq!(framer.pending(), 0);

        // a full packet clears the counter
        let out = feed(&mut framer, &[0x8f, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(out.last(), Some(Ok(Some(Framed::Packet(_))))));
        assert_eq!(framer.out_of_sync(), 0);
        Ok(())
    }

    #[test]
    fn test_rushmore_skip_marker() -> Result<(), Box<dyn std::error::Error>> {
        let mut framer = PacketFramer::new(protocol_data::V3_RUSHMORE);
        let out = feed(&mut framer, &[0x8f, 0, 0, 0, 0, 0x80]);
        assert_eq!(out.last().copied(), Some(Ok(Some(Framed::Skipped))));
        Ok(())
    }

    #[test]
    fn test_bare_ps2_while_in_sync() -> Result<(), Box<dyn std::error::Error>> {
        let mut framer = PacketFramer::new(protocol_data::V3);
        let out = feed(&mut framer, &[0x09, 0x05, 0x03]);
        assert_eq!(
            out.last().copied(),
            Some(Ok(Some(Framed::Ps2(Ps2Packet {
                dx: 5,
                dy: -3,
                buttons: 1
            }))))
        );

        // not recognised once out of sync
        framer.push(0x00).err().ok_or("expected resync")?;
        assert_eq!(framer.push(0x08), Err(DecodeError::resync(0, 0x08)));
        Ok(())
    }

    #[test]
    fn test_v7_body_checks() {
        let mut framer = PacketFramer::new(protocol_data::V7);
        let out = feed(&mut framer, &[0x48, 0x00, 0x00]);
        assert_eq!(out.last().copied(), Some(Err(DecodeError::resync(2, 0x00))));

        let out = feed(&mut framer, &[0x48, 0x00, 0x40, 0x48, 0x00, 0x00]);
        assert!(matches!(out.last(), Some(Ok(Some(Framed::Packet(_))))));
    }

    #[test]
    fn test_ss4_body_checks() {
        let mut framer = PacketFramer::new(protocol_data::V8);
        let out = feed(&mut framer, &[0x18, 0x10, 0x00, 0x00]);
        assert_eq!(out.last().copied(), Some(Err(DecodeError::resync(3, 0x00))));

        // no bare PS/2 detection on SS4
        let out = feed(&mut framer, &[0x18, 0x10, 0x00, 0x08, 0x10, 0x00]);
        assert!(matches!(out.last(), Some(Ok(Some(Framed::Packet(_))))));
    }
}
