//! Fuzzes a full touchpad session fed one byte at a time.
//!
//! The first byte selects the device; the rest is the PS/2 stream. Framing,
//! decoding and tracking must never panic, and finger tags in a frame must
//! be unique.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_byte_stream

#![no_main]

use alps_touchpad::{AlpsTouchpad, Report, TouchpadConfig};
use libfuzzer_sys::fuzz_target;

const DEVICES: &[([u8; 3], [u8; 3])] = &[
    ([0x33, 0x02, 0x0a], [0, 0, 0]),
    ([0x53, 0x02, 0x0a], [0, 0, 0]),
    ([0x73, 0x03, 0x0a], [0x88, 0x07, 0x9d]),
    ([0x73, 0x02, 0x64], [0x00, 0x00, 0x8a]),
    ([0x73, 0x03, 0x50], [0x73, 0x02, 0x00]),
    ([0x73, 0x00, 0x14], [0, 0, 0]),
    ([0x73, 0x03, 0x0a], [0x88, 0xba, 0x00]),
    ([0x73, 0x03, 0x14], [0, 0, 0]),
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, stream)) = data.split_first() else {
        return;
    };
    let (e7, ec) = DEVICES[usize::from(selector) % DEVICES.len()];
    let Ok(mut pad) = AlpsTouchpad::from_reports(e7, ec, TouchpadConfig::default()) else {
        return;
    };

    for &byte in stream {
        if let Ok(Some(Report::Touch(touch))) = pad.process_byte(byte) {
            let mut seen = 0u8;
            for contact in touch.frame.contacts() {
                let bit = 1u8 << contact.finger.tag();
                assert_eq!(seen & bit, 0, "duplicate finger tag");
                seen |= bit;
            }
        }
    }
});
