//! Property-based tests for the virtual finger tracker.

use alps_protocol::MAX_TOUCHES;
use alps_tracker::prelude::*;
use proptest::prelude::*;

fn contact_list() -> impl Strategy<Value = Vec<PhysicalContact>> {
    proptest::collection::vec((0i32..4096, 0i32..4096, 0i32..128), 0..=7).prop_map(|v| {
        v.into_iter()
            .enumerate()
            .map(|(slot, (x, y, z))| PhysicalContact::new(x, y, z, slot))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_tags_unique_and_bounded(
        frames in proptest::collection::vec(contact_list(), 1..30),
        grace in 0u32..4,
    ) {
        let mut tracker = Tracker::new(TrackerConfig { grace_frames: grace });
        for contacts in &frames {
            let frame = tracker.process(contacts, false);
            let tags: Vec<FingerType> = frame.contacts().map(|c| c.finger).collect();
            prop_assert!(tags.len() <= MAX_TOUCHES);
            prop_assert!(tags.windows(2).all(|w| w[0] < w[1]), "tags out of order: {:?}", tags);
            prop_assert!(frame.len() >= contacts.len().min(MAX_TOUCHES));
            prop_assert_eq!(frame.diagnostics.capacity.is_some(), contacts.len() > MAX_TOUCHES);
        }
    }

    #[test]
    fn prop_deterministic(frames in proptest::collection::vec(contact_list(), 1..20)) {
        let mut a = Tracker::default();
        let mut b = Tracker::default();
        for contacts in &frames {
            prop_assert_eq!(a.process(contacts, true), b.process(contacts, true));
        }
    }

    #[test]
    fn prop_stationary_contacts_keep_tags(
        points in proptest::collection::hash_set((0i32..4096, 0i32..4096), 1..=MAX_TOUCHES),
        repeats in 2usize..8,
    ) {
        let contacts: Vec<PhysicalContact> = points
            .iter()
            .enumerate()
            .map(|(slot, &(x, y))| PhysicalContact::new(x, y, 50, slot))
            .collect();
        let mut tracker = Tracker::default();
        let first: Vec<(FingerType, i32, i32)> = tracker
            .process(&contacts, false)
            .contacts()
            .map(|c| (c.finger, c.x, c.y))
            .collect();
        for _ in 0..repeats {
            let mut reversed = contacts.clone();
            reversed.reverse();
            let again: Vec<(FingerType, i32, i32)> = tracker
                .process(&reversed, false)
                .contacts()
                .map(|c| (c.finger, c.x, c.y))
                .collect();
            prop_assert_eq!(&first, &again);
        }
    }

    #[test]
    fn prop_smoothed_within_raw_bounds(
        xs in proptest::collection::vec(0i32..4096, 1..20),
    ) {
        let mut tracker = Tracker::default();
        let lo = xs.iter().copied().min().unwrap_or_default();
        let hi = xs.iter().copied().max().unwrap_or_default();
        for &x in &xs {
            let frame = tracker.process(&[PhysicalContact::new(x, 0, 50, 0)], false);
            for c in frame.contacts() {
                prop_assert!(c.x >= lo && c.x <= hi);
            }
        }
    }
}
