//! Capture replay through a touchpad session

use std::fs;

use alps_touchpad::{AlpsTouchpad, Report, TouchpadConfig};
use anyhow::Result;
use tracing::{debug, info};

use crate::commands::ReplayArgs;
use crate::error::CliError;
use crate::hexdump::parse_capture;
use crate::output;

/// Execute replay command
pub fn execute(args: &ReplayArgs, json: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => TouchpadConfig::load(path).map_err(CliError::from)?,
        None => TouchpadConfig::default(),
    }
    .with_env_overrides();

    let text = fs::read_to_string(&args.file).map_err(CliError::from)?;
    let bytes = parse_capture(&text)?;
    info!("replaying {} bytes from {}", bytes.len(), args.file.display());

    let identity = alps_protocol::identify(args.e7, args.ec).map_err(|e| CliError::Alps(e.into()))?;
    let mut pad = AlpsTouchpad::new(identity, config).map_err(CliError::from)?;

    let reports = replay(&mut pad, &bytes);
    output::print_replay(&identity, &reports, pad.stats(), json);
    Ok(())
}

/// Feed a byte stream through a session, keeping each report with the offset
/// of the byte that completed it.
pub fn replay(pad: &mut AlpsTouchpad, bytes: &[u8]) -> Vec<(usize, Report)> {
    let mut reports = Vec::new();
    for (offset, &byte) in bytes.iter().enumerate() {
        match pad.process_byte(byte) {
            Ok(Some(report)) => reports.push((offset, report)),
            Ok(None) => {}
            Err(e) => debug!("byte {}: {}", offset, e),
        }
    }
    reports
}
