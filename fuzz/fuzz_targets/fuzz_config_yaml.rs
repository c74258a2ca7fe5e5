//! Fuzzes YAML parsing of the touchpad configuration.
//!
//! Any configuration that parses must also validate and start a session.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_config_yaml

#![no_main]

use alps_touchpad::{AlpsTouchpad, TouchpadConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = TouchpadConfig::from_yaml_str(text) {
        assert!(config.validate().is_ok());
        let session = AlpsTouchpad::from_reports([0x73, 0x00, 0x14], [0, 0, 0], config);
        assert!(session.is_ok());
    }
});
