//! Fuzzes the virtual finger tracker with arbitrary contact lists.
//!
//! Each frame is a length byte followed by up to seven 4-byte contacts, so
//! the tracker also sees lists longer than its finger pool.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_tracker

#![no_main]

use alps_tracker::{PhysicalContact, Tracker, TrackerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&grace, mut rest)) = data.split_first() else {
        return;
    };
    let config = TrackerConfig {
        grace_frames: u32::from(grace % 4),
    };
    let mut tracker = Tracker::new(config);

    while let Some((&len, tail)) = rest.split_first() {
        let count = usize::from(len % 8).min(tail.len() / 4);
        let (body, next) = tail.split_at(count * 4);
        let contacts: Vec<PhysicalContact> = body
            .chunks_exact(4)
            .enumerate()
            .map(|(slot, c)| {
                PhysicalContact::new(
                    i32::from(u16::from_le_bytes([c[0], c[1] & 0x1f])),
                    i32::from(u16::from_le_bytes([c[2], c[3] & 0x0f])),
                    i32::from(c[3] >> 4),
                    slot,
                )
            })
            .collect();

        let frame = tracker.process(&contacts, len & 0x80 != 0);
        assert!(frame.len() <= 5);
        assert!(tracker.active() <= 5);
        rest = next;
    }
});
