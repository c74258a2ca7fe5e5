//! Fuzzes `decode` for every decoder family.
//!
//! The input is cut into packets of each protocol's length and fed to one
//! context per device, so multi-packet reassembly sees arbitrary sequences.
//! Decoding must never panic and every touch frame must respect the
//! `MAX_TOUCHES` bound.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_decode

#![no_main]

use alps_protocol::{Decoded, DecodeContext, MAX_TOUCHES, decode, identify};
use libfuzzer_sys::fuzz_target;

/// One E7/EC pair per decoder family.
const DEVICES: &[([u8; 3], [u8; 3])] = &[
    ([0x33, 0x02, 0x0a], [0, 0, 0]),
    ([0x32, 0x02, 0x14], [0, 0, 0]),
    ([0x63, 0x02, 0x3c], [0, 0, 0]),
    ([0x73, 0x02, 0x50], [0, 0, 0]),
    ([0x73, 0x03, 0x0a], [0x88, 0x07, 0x9d]),
    ([0x73, 0x03, 0x0a], [0x88, 0x08, 0x1d]),
    ([0x73, 0x02, 0x64], [0x00, 0x00, 0x8a]),
    ([0x73, 0x03, 0x50], [0x73, 0x02, 0x00]),
    ([0x73, 0x00, 0x14], [0, 0, 0]),
    ([0x73, 0x03, 0x0a], [0x88, 0xb3, 0x00]),
    ([0x73, 0x03, 0x14], [0, 0, 0]),
    ([0x73, 0x03, 0x28], [0, 0, 0]),
];

fuzz_target!(|data: &[u8]| {
    for &(e7, ec) in DEVICES {
        let Ok(identity) = identify(e7, ec) else {
            continue;
        };
        let Ok(mut ctx) = DecodeContext::new(identity) else {
            continue;
        };
        for packet in data.chunks(ctx.packet_len()) {
            if let Ok(Decoded::Touch(fields)) = decode(packet, &mut ctx) {
                assert!(fields.fingers <= MAX_TOUCHES);
                assert!(fields.contacts().len() <= MAX_TOUCHES);
            }
        }
    }
});
