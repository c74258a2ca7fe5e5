//! The virtual finger state machine.
//!
//! Each frame runs three steps over the pool of [`MAX_TOUCHES`] fingers:
//!
//! 1. Touching fingers are matched to contacts by repeatedly taking the
//!    globally closest (finger, contact) pair. Distance is squared Euclidean
//!    from the finger's newest raw sample. Equal distances go to the lower
//!    hardware slot, then the lower finger tag.
//! 2. Leftover contacts take the free finger with the lowest tag. With no
//!    free finger left the contact is dropped and the frame carries a
//!    [`TrackingError::CapacityExceeded`].
//! 3. Touching fingers left unmatched count a missed frame and are released
//!    once they have missed more than `grace_frames` in a row. Until then
//!    they are reported at their last smoothed position.

use alps_errors::TrackingError;
use alps_protocol::MAX_TOUCHES;
use tracing::{debug, trace, warn};

use crate::config::TrackerConfig;
use crate::finger::{FingerType, PhysicalContact, TouchFrame, VirtualFinger};

/// Sort key of a candidate match: distance, slot, finger index, contact index.
type MatchKey = (i64, usize, usize, usize);

fn distance_sq(from: (i32, i32), to: &PhysicalContact) -> i64 {
    let dx = i64::from(to.x) - i64::from(from.0);
    let dy = i64::from(to.y) - i64::from(from.1);
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}

/// Assigns stable finger identities to per-frame contact lists.
///
/// # Example
///
/// ```
/// use alps_tracker::prelude::*;
///
/// let mut tracker = Tracker::new(TrackerConfig::default());
/// let frame = tracker.process(&[PhysicalContact::new(100, 200, 40, 0)], false);
/// let first = frame.contacts().next().ok_or("no contact")?;
/// assert_eq!(first.finger, FingerType::Index);
/// assert_eq!((first.x, first.y), (100, 200));
/// # Ok::<(), &'static str>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tracker {
    config: TrackerConfig,
    pool: [VirtualFinger; MAX_TOUCHES],
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    /// Create a tracker with an empty pool.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            pool: FingerType::ALL.map(VirtualFinger::new),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The finger pool, in tag order.
    pub fn fingers(&self) -> &[VirtualFinger] {
        &self.pool
    }

    /// Number of touching fingers.
    pub fn active(&self) -> usize {
        self.pool.iter().filter(|f| f.in_use()).count()
    }

    /// Release every finger.
    pub fn reset(&mut self) {
        for finger in &mut self.pool {
            finger.release();
        }
    }

    /// Run one frame.
    ///
    /// `contacts` is the hardware's contact list for this frame, in slot
    /// order. `button` is the pad's primary button and is passed through to
    /// every finger matched this frame.
    pub fn process(&mut self, contacts: &[PhysicalContact], button: bool) -> TouchFrame {
        let mut frame = TouchFrame::new(button);
        // bound[i] is the contact index bound to pool entry i this frame
        let mut bound: [Option<usize>; MAX_TOUCHES] = [None; MAX_TOUCHES];

        self.match_touching(contacts, &mut bound);

        let mut dropped = 0usize;
        for (ci, contact) in contacts.iter().enumerate() {
            if bound.contains(&Some(ci)) {
                continue;
            }
            let free = self
                .pool
                .iter()
                .zip(bound.iter())
                .position(|(f, b)| !f.in_use() && b.is_none());
            match free {
                Some(fi) => {
                    if let Some(b) = bound.get_mut(fi) {
                        *b = Some(ci);
                    }
                    frame.diagnostics.allocated += 1;
                    trace!("contact in slot {} allocated finger {}", contact.slot, fi + 1);
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            let err = TrackingError::CapacityExceeded {
                dropped,
                capacity: MAX_TOUCHES,
            };
            warn!("{}", err);
            frame.diagnostics.capacity = Some(err);
        }

        let grace = self.config.grace_frames;
        for (finger, slot) in self.pool.iter_mut().zip(bound) {
            match slot.and_then(|ci| contacts.get(ci)) {
                Some(contact) => finger.bind(contact, button),
                None if finger.in_use() => {
                    finger.missed = finger.missed.saturating_add(1);
                    finger.slot = None;
                    if finger.missed > grace {
                        debug!(
                            "finger {:?} released after {} missed frames",
                            finger.finger, finger.missed
                        );
                        finger.release();
                        frame.diagnostics.released += 1;
                    }
                }
                None => {}
            }
        }

        for (i, finger) in self.pool.iter().enumerate() {
            if finger.in_use() {
                frame.set(i, finger.report());
            }
        }
        frame
    }

    /// Greedy global nearest-neighbour matching of touching fingers.
    fn match_touching(&self, contacts: &[PhysicalContact], bound: &mut [Option<usize>; MAX_TOUCHES]) {
        loop {
            let mut best: Option<MatchKey> = None;
            for (fi, finger) in self.pool.iter().enumerate() {
                if !finger.in_use() || bound.get(fi).is_some_and(Option::is_some) {
                    continue;
                }
                let from = finger.raw_position();
                for (ci, contact) in contacts.iter().enumerate() {
                    if bound.contains(&Some(ci)) {
                        continue;
                    }
                    let key = (distance_sq(from, contact), contact.slot, fi, ci);
                    if best.is_none_or(|b| key < b) {
                        best = Some(key);
                    }
                }
            }

            let Some((_, slot, fi, ci)) = best else {
                break;
            };
            trace!("finger {} matched slot {}", fi + 1, slot);
            if let Some(b) = bound.get_mut(fi) {
                *b = Some(ci);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finger::TrackedContact;

    fn c(x: i32, y: i32, slot: usize) -> PhysicalContact {
        PhysicalContact::new(x, y, 40, slot)
    }

    fn tags(frame: &TouchFrame) -> Vec<(FingerType, i32, i32)> {
        frame.contacts().map(|t| (t.finger, t.x, t.y)).collect()
    }

    #[test]
    fn test_identity_survives_one_frame_gap() {
        let mut tracker = Tracker::default();
        for _ in 0..3 {
            let frame = tracker.process(&[c(10, 10, 0)], false);
            assert_eq!(tags(&frame), [(FingerType::Index, 10, 10)]);
        }

        let gap = tracker.process(&[], false);
        assert_eq!(tags(&gap), [(FingerType::Index, 10, 10)]);
        assert_eq!(gap.contacts().next().and_then(|t| t.slot), None);

        let frame = tracker.process(&[c(12, 11, 0)], false);
        let contact: Vec<&TrackedContact> = frame.contacts().collect();
        assert_eq!(contact.len(), 1);
        assert_eq!(contact[0].finger, FingerType::Index);
        // (10 * 3 + 12) / 4, (10 * 3 + 11) / 4
        assert_eq!((contact[0].x, contact[0].y), (10, 10));
    }

    #[test]
    fn test_release_after_grace() {
        let mut tracker = Tracker::default();
        tracker.process(&[c(10, 10, 0)], false);
        assert_eq!(tracker.process(&[], false).len(), 1);
        let frame = tracker.process(&[], false);
        assert!(frame.is_empty());
        assert_eq!(frame.diagnostics.released, 1);
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn test_zero_grace_releases_immediately() {
        let mut tracker = Tracker::new(TrackerConfig { grace_frames: 0 });
        tracker.process(&[c(10, 10, 0)], false);
        assert!(tracker.process(&[], false).is_empty());
    }

    #[test]
    fn test_slot_swap_keeps_identities() {
        let mut tracker = Tracker::default();
        let frame = tracker.process(&[c(100, 100, 0), c(900, 500, 1)], false);
        assert_eq!(
            tags(&frame),
            [(FingerType::Index, 100, 100), (FingerType::Middle, 900, 500)]
        );

        // hardware swaps slot order
        let frame = tracker.process(&[c(902, 502, 0), c(101, 99, 1)], false);
        let index = frame.finger(FingerType::Index).map(|t| t.slot);
        let middle = frame.finger(FingerType::Middle).map(|t| t.slot);
        assert_eq!(index, Some(Some(1)));
        assert_eq!(middle, Some(Some(0)));
    }

    #[test]
    fn test_lowest_free_tag_is_reused() {
        let mut tracker = Tracker::new(TrackerConfig { grace_frames: 0 });
        tracker.process(&[c(100, 100, 0), c(500, 500, 1)], false);
        // Index lifts
        let frame = tracker.process(&[c(500, 500, 0)], false);
        assert_eq!(tags(&frame), [(FingerType::Middle, 500, 500)]);
        // new finger takes Index again
        let frame = tracker.process(&[c(500, 500, 0), c(50, 50, 1)], false);
        assert_eq!(frame.finger(FingerType::Index).map(|t| (t.x, t.y)), Some((50, 50)));
        assert_eq!(frame.diagnostics.allocated, 1);
    }

    #[test]
    fn test_equal_distance_prefers_lower_slot() {
        let mut tracker = Tracker::default();
        tracker.process(&[c(100, 100, 0)], false);
        let frame = tracker.process(&[c(110, 100, 1), c(90, 100, 0)], false);
        let index = frame.finger(FingerType::Index).and_then(|t| t.slot);
        assert_eq!(index, Some(0));
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut tracker = Tracker::default();
        let contacts: Vec<PhysicalContact> = (0..7usize)
            .zip((0..).step_by(100))
            .map(|(slot, x)| c(x, 0, slot))
            .collect();
        let frame = tracker.process(&contacts, false);
        assert_eq!(frame.len(), MAX_TOUCHES);
        assert_eq!(
            frame.diagnostics.capacity,
            Some(TrackingError::CapacityExceeded {
                dropped: 2,
                capacity: MAX_TOUCHES
            })
        );
    }

    #[test]
    fn test_pressure_and_button_pass_through() {
        let mut tracker = Tracker::default();
        tracker.process(&[PhysicalContact::new(0, 0, 10, 0)], false);
        let frame = tracker.process(&[PhysicalContact::new(10, 10, 90, 0)], true);
        let t = frame.contacts().next().copied();
        assert_eq!(t.map(|t| (t.x, t.y, t.pressure, t.button)), Some((5, 5, 90, true)));
        assert!(frame.button);
    }

    #[test]
    fn test_reset_frees_pool() {
        let mut tracker = Tracker::default();
        tracker.process(&[c(1, 1, 0), c(2, 2, 1)], false);
        tracker.reset();
        assert_eq!(tracker.active(), 0);
    }
}
