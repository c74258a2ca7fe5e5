//! Per-device session: framer, decode context and tracker.

use alps_errors::{AlpsError, DecodeError, DecodeResult};
use alps_protocol::{
    Decoded, DecodeContext, DecodedFields, Framed, Identity, LegacyExtras, PacketFramer,
    MAX_TOUCHES, ProtocolFamily, Ps2Packet, SensorGeometry, Ss4Otp, TrackstickReport, decode,
    identify,
};
use alps_tracker::{PhysicalContact, TouchFrame, Tracker};
use tracing::{debug, trace, warn};

use crate::config::TouchpadConfig;

/// Touchpad output of one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchReport {
    /// Tracked fingers
    pub frame: TouchFrame,
    /// Finger count reported by the hardware
    pub fingers: usize,
    /// Touchpad buttons (bit 0 left, bit 1 right, bit 2 middle)
    pub buttons: u8,
    /// Trackstick buttons carried in touchpad packets
    pub ts_buttons: u8,
    /// V1/V2 extras
    pub legacy: LegacyExtras,
}

/// A report produced by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Touchpad frame
    Touch(TouchReport),
    /// Trackstick movement
    Trackstick(TrackstickReport),
    /// Bare PS/2 mouse packet
    Mouse(Ps2Packet),
}

/// Session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Packets handed to the decoder
    pub packets: u64,
    /// Reports returned
    pub reports: u64,
    /// Resync errors from the framer or decoder
    pub resyncs: u64,
    /// Other decode errors
    pub errors: u64,
    /// Well-formed packets that carried nothing to report
    pub dropped: u64,
    /// Repeated empty frames not reported
    pub suppressed: u64,
    /// Frames where the tracker ran out of fingers
    pub capacity_exceeded: u64,
}

/// One ALPS device.
///
/// Owns everything the device needs between packets. Not `Sync`-shared:
/// callers serialize access.
#[derive(Debug, Clone)]
pub struct AlpsTouchpad {
    ctx: DecodeContext,
    framer: PacketFramer,
    tracker: Tracker,
    config: TouchpadConfig,
    last_empty_buttons: Option<u8>,
    stats: SessionStats,
}

impl AlpsTouchpad {
    /// Create a session for an identified device.
    ///
    /// # Errors
    ///
    /// Returns [`AlpsError::Config`] for an invalid configuration and
    /// [`AlpsError::Identify`] if the protocol has no decoder.
    pub fn new(identity: Identity, config: TouchpadConfig) -> Result<Self, AlpsError> {
        config.validate()?;
        let mut ctx = DecodeContext::new(identity)?;
        if let Some(geometry) = config.geometry {
            ctx.geometry = geometry;
        }
        if let Some(divisor) = config.trackpoint_divisor {
            ctx.trackpoint_divisor = divisor;
        }
        debug!(
            "ALPS {} session, E7={:02x?} EC={:02x?} flags={:?}",
            ctx.family().name(),
            ctx.dev_id,
            ctx.fw_ver,
            ctx.flags
        );

        Ok(Self {
            framer: PacketFramer::new(*ctx.descriptor()),
            tracker: Tracker::new(config.tracker),
            ctx,
            config,
            last_empty_buttons: None,
            stats: SessionStats::default(),
        })
    }

    /// Identify a device from its E7 and EC reports and create a session.
    ///
    /// # Errors
    ///
    /// As [`identify`] and [`new`](Self::new).
    pub fn from_reports(e7: [u8; 3], ec: [u8; 3], config: TouchpadConfig) -> Result<Self, AlpsError> {
        Self::new(identify(e7, ec)?, config)
    }

    /// Decode context.
    pub fn context(&self) -> &DecodeContext {
        &self.ctx
    }

    /// Selected decoder.
    pub fn family(&self) -> ProtocolFamily {
        self.ctx.family()
    }

    /// Sensor geometry in effect.
    pub fn geometry(&self) -> &SensorGeometry {
        &self.ctx.geometry
    }

    /// Session configuration.
    pub fn config(&self) -> &TouchpadConfig {
        &self.config
    }

    /// Virtual finger tracker.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Session counters.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Apply a Dolphin OTP report.
    pub fn apply_dolphin_otp(&mut self, otp: [u8; 3]) {
        self.ctx.apply_dolphin_otp(otp);
    }

    /// Apply the SS4 OTP pages.
    pub fn apply_ss4_otp(&mut self, otp: &Ss4Otp) {
        self.ctx.apply_ss4_otp(otp);
    }

    /// Apply the V3/V7 pitch and electrode registers.
    pub fn apply_pitch_registers(&mut self, pitch_reg: u8, electrode_reg: u8) {
        self.ctx.geometry = self.ctx.geometry.with_v3_v7_pitch(pitch_reg, electrode_reg);
    }

    /// Drop all in-flight state: partial packets, reassembly and fingers.
    pub fn reset(&mut self) {
        self.framer.reset();
        self.ctx.reset();
        self.tracker.reset();
        self.last_empty_buttons = None;
    }

    /// Feed one byte of the PS/2 stream.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Resync`] when the byte breaks framing, otherwise
    /// as [`process_packet`](Self::process_packet).
    pub fn process_byte(&mut self, byte: u8) -> DecodeResult<Option<Report>> {
        let framed = match self.framer.push(byte) {
            Ok(framed) => framed,
            Err(err) => return Err(self.record_error(err)),
        };
        match framed {
            None => Ok(None),
            Some(Framed::Packet(packet)) => self.process_packet(packet.as_bytes()),
            Some(Framed::Ps2(mouse)) => Ok(Some(self.emit(Report::Mouse(mouse)))),
            Some(Framed::Skipped) => {
                self.stats.dropped = self.stats.dropped.saturating_add(1);
                Ok(None)
            }
        }
    }

    /// Decode one complete packet.
    ///
    /// Returns `Ok(None)` when the packet was buffered, dropped, or repeats
    /// an empty frame.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`] of [`decode`]. The session stays usable.
    /// A packet that cannot be classified still counts as an empty frame for
    /// the tracker, so fingers are released once their grace runs out.
    pub fn process_packet(&mut self, packet: &[u8]) -> DecodeResult<Option<Report>> {
        self.stats.packets = self.stats.packets.saturating_add(1);
        let decoded = match decode(packet, &mut self.ctx) {
            Ok(decoded) => decoded,
            Err(err) => {
                if err.treat_as_idle() {
                    // fingers age as on an empty frame; the report is withheld
                    let frame = self.tracker.process(&[], false);
                    trace!("unclassified packet, {} fingers left", frame.len());
                }
                return Err(self.record_error(err));
            }
        };
        trace!("decoded {:?}", decoded);

        let report = match decoded {
            Decoded::Touch(fields) => self.touch(&fields),
            Decoded::Idle => self.touch(&DecodedFields::default()),
            Decoded::Trackstick(stick) => Some(Report::Trackstick(stick)),
            Decoded::Pending => None,
            Decoded::Dropped(reason) => {
                trace!("dropped packet: {:?}", reason);
                self.stats.dropped = self.stats.dropped.saturating_add(1);
                None
            }
        };
        Ok(report.map(|r| self.emit(r)))
    }

    fn touch(&mut self, fields: &DecodedFields) -> Option<Report> {
        if fields.legacy.drag_release {
            debug!("tap-and-drag, releasing fingers");
            self.tracker.reset();
        }

        let mut contacts = [PhysicalContact::default(); MAX_TOUCHES];
        let count = self.contacts(fields, &mut contacts);
        let buttons = fields.buttons();
        let frame = self
            .tracker
            .process(contacts.get(..count).unwrap_or(&[]), buttons != 0);
        if frame.diagnostics.capacity.is_some() {
            self.stats.capacity_exceeded = self.stats.capacity_exceeded.saturating_add(1);
        }

        if frame.is_empty() {
            if self.last_empty_buttons == Some(buttons) {
                self.stats.suppressed = self.stats.suppressed.saturating_add(1);
                return None;
            }
            self.last_empty_buttons = Some(buttons);
        } else {
            self.last_empty_buttons = None;
        }

        Some(Report::Touch(TouchReport {
            frame,
            fingers: fields.fingers,
            buttons,
            ts_buttons: fields.ts_buttons(),
            legacy: fields.legacy,
        }))
    }

    fn contacts(&self, fields: &DecodedFields, out: &mut [PhysicalContact; MAX_TOUCHES]) -> usize {
        // single-touch protocols report position below the press threshold
        let hysteresis = matches!(self.ctx.family(), ProtocolFamily::V1V2 | ProtocolFamily::V6);
        if hysteresis && !fields.legacy.touching {
            return 0;
        }
        let mut count = 0;
        for ((slot, pos), entry) in fields.contacts().iter().enumerate().zip(out.iter_mut()) {
            *entry = PhysicalContact::new(
                i32::try_from(pos.x).unwrap_or(i32::MAX),
                i32::try_from(pos.y).unwrap_or(i32::MAX),
                fields.pressure,
                slot,
            );
            count = slot + 1;
        }
        count
    }

    fn emit(&mut self, report: Report) -> Report {
        self.stats.reports = self.stats.reports.saturating_add(1);
        report
    }

    fn record_error(&mut self, err: DecodeError) -> DecodeError {
        if err.requires_resync() {
            self.stats.resyncs = self.stats.resyncs.saturating_add(1);
        } else {
            warn!("ALPS {}: {}", self.ctx.family().name(), err);
            self.stats.errors = self.stats.errors.saturating_add(1);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: [u8; 3] = [0x33, 0x02, 0x0a];
    const V7: [u8; 3] = [0x73, 0x03, 0x0a];

    fn touch(report: Option<Report>) -> Result<TouchReport, Box<dyn std::error::Error>> {
        match report {
            Some(Report::Touch(t)) => Ok(t),
            other => Err(format!("expected touch, got {other:?}").into()),
        }
    }

    #[test]
    fn test_config_applied() -> Result<(), Box<dyn std::error::Error>> {
        let config = TouchpadConfig {
            trackpoint_divisor: Some(2),
            geometry: Some(SensorGeometry {
                x_max: 4095,
                ..SensorGeometry::default()
            }),
            ..TouchpadConfig::default()
        };
        let pad = AlpsTouchpad::from_reports([0x73, 0x00, 0x14], [0, 0, 0], config)?;
        assert_eq!(pad.context().trackpoint_divisor, 2);
        assert_eq!(pad.geometry().x_max, 4095);
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TouchpadConfig {
            trackpoint_divisor: Some(0),
            ..TouchpadConfig::default()
        };
        let err = AlpsTouchpad::from_reports(V1, [0, 0, 0], config);
        assert!(matches!(err, Err(AlpsError::Config(_))));
    }

    #[test]
    fn test_v9_rejected() {
        let err = AlpsTouchpad::from_reports([0x73, 0x03, 0xc8], [0, 0, 0], TouchpadConfig::default());
        assert!(matches!(err, Err(AlpsError::Identify(_))));
    }

    #[test]
    fn test_single_touch_tracked() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V1, [0, 0, 0], TouchpadConfig::default())?;
        let t = touch(pad.process_packet(&[0x88, 0x64, 0x00, 0x01, 0x48, 0x30])?)?;
        assert_eq!(t.fingers, 1);
        let c = t.frame.contacts().next().ok_or("no contact")?;
        assert_eq!((c.x, c.y, c.pressure, c.slot), (100, 200, 48, Some(0)));
        Ok(())
    }

    #[test]
    fn test_below_press_threshold_is_not_a_contact() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V1, [0, 0, 0], TouchpadConfig::default())?;
        // z = 20
        let t = touch(pad.process_packet(&[0x88, 0x64, 0x00, 0x01, 0x48, 0x14])?)?;
        assert_eq!(t.fingers, 1);
        assert!(t.frame.is_empty());
        Ok(())
    }

    #[test]
    fn test_idle_frames_suppressed() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V7, [0x88, 0xba, 0x00], TouchpadConfig::default())?;
        let t = touch(pad.process_packet(&[0x48, 0x10, 0x3f, 0x4f, 0x45, 0x02])?)?;
        assert_eq!(t.frame.len(), 2);

        let idle = [0x48, 0x00, 0x00, 0x48, 0x00, 0x00];
        // grace frame keeps both fingers
        let t = touch(pad.process_packet(&idle)?)?;
        assert_eq!(t.frame.len(), 2);
        assert!(t.frame.contacts().all(|c| c.slot.is_none()));
        // release
        let t = touch(pad.process_packet(&idle)?)?;
        assert!(t.frame.is_empty());
        // nothing new to say
        assert_eq!(pad.process_packet(&idle)?, None);
        assert_eq!(pad.stats().suppressed, 1);
        assert_eq!(pad.stats().reports, 3);
        Ok(())
    }

    #[test]
    fn test_dropped_packet_counted() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V7, [0x88, 0xba, 0x00], TouchpadConfig::default())?;
        assert_eq!(pad.process_packet(&[0x58, 0x00, 0x00, 0x48, 0x00, 0x00])?, None);
        assert_eq!(pad.stats().dropped, 1);
        Ok(())
    }

    #[test]
    fn test_errors_counted() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V7, [0x88, 0xba, 0x00], TouchpadConfig::default())?;
        assert_eq!(
            pad.process_packet(&[0x48, 0x01, 0x00, 0x48, 0x00, 0x00]),
            Err(DecodeError::unknown_packet("v7"))
        );
        assert_eq!(
            pad.process_packet(&[0x00; 6]),
            Err(DecodeError::resync(0, 0x00))
        );
        assert_eq!(pad.stats().errors, 1);
        assert_eq!(pad.stats().resyncs, 1);
        Ok(())
    }

    #[test]
    fn test_unclassified_packets_release_fingers() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V7, [0x88, 0xba, 0x00], TouchpadConfig::default())?;
        pad.process_packet(&[0x48, 0x10, 0x3f, 0x4f, 0x45, 0x02])?;
        assert_eq!(pad.tracker().active(), 2);

        let unknown = [0x48, 0x01, 0x00, 0x48, 0x00, 0x00];
        // grace frame
        assert!(matches!(
            pad.process_packet(&unknown),
            Err(DecodeError::UnknownPacketClassification { .. })
        ));
        assert_eq!(pad.tracker().active(), 2);
        assert!(matches!(pad.process_packet(&unknown), Err(_)));
        assert_eq!(pad.tracker().active(), 0);
        assert_eq!(pad.stats().errors, 2);

        // the release reaches the host with the next idle packet
        let t = touch(pad.process_packet(&[0x48, 0x00, 0x00, 0x48, 0x00, 0x00])?)?;
        assert!(t.frame.is_empty());
        Ok(())
    }

    #[test]
    fn test_byte_stream() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V1, [0, 0, 0], TouchpadConfig::default())?;
        assert_eq!(pad.process_byte(0x00), Err(DecodeError::resync(0, 0x00)));

        let mut last = None;
        for b in [0x88, 0x64, 0x00, 0x01, 0x48, 0x30] {
            last = pad.process_byte(b)?;
        }
        let t = touch(last)?;
        assert_eq!(t.frame.len(), 1);
        assert_eq!(pad.stats().packets, 1);
        assert_eq!(pad.stats().resyncs, 1);
        Ok(())
    }

    #[test]
    fn test_drag_release_restarts_finger() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports([0x53, 0x02, 0x0a], [0, 0, 0], TouchpadConfig::default())?;
        // finger down
        let t = touch(pad.process_packet(&[0xf8, 0x10, 0x02, 0x00, 0x10, 0x30])?)?;
        assert_eq!(t.frame.len(), 1);
        // tap, finger bit clear
        pad.process_packet(&[0xf8, 0x10, 0x01, 0x00, 0x10, 0x00])?;
        // drag: finger and gesture after no finger
        let t = touch(pad.process_packet(&[0xf8, 0x20, 0x03, 0x00, 0x10, 0x30])?)?;
        assert!(t.legacy.drag_release);
        let c = t.frame.contacts().next().ok_or("no contact")?;
        // fresh binding, not averaged with the old position
        assert_eq!(c.x, 0x20);
        Ok(())
    }

    #[test]
    fn test_trackstick_passthrough() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports([0x73, 0x00, 0x14], [0, 0, 0], TouchpadConfig::default())?;
        let report = pad.process_packet(&[0xff, 0x7f, 0x7f, 0x00, 0x7f, 0x7f])?;
        assert!(matches!(report, Some(Report::Trackstick(TrackstickReport { dx: 0, dy: 0, .. }))));
        Ok(())
    }

    #[test]
    fn test_reset_clears_fingers() -> Result<(), Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports(V1, [0, 0, 0], TouchpadConfig::default())?;
        pad.process_packet(&[0x88, 0x64, 0x00, 0x01, 0x48, 0x30])?;
        assert_eq!(pad.tracker().active(), 1);
        pad.reset();
        assert_eq!(pad.tracker().active(), 0);
        Ok(())
    }
}
