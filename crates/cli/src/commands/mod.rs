//! Command implementations for alpsctl

pub mod identify;
pub mod replay;

use std::path::PathBuf;

use clap::Args;

use crate::hexdump::parse_report;

pub(crate) fn report_arg(s: &str) -> Result<[u8; 3], String> {
    parse_report(s).map_err(|e| e.to_string())
}

#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// E7 report, e.g. 73:03:0a
    #[arg(value_parser = report_arg)]
    pub e7: [u8; 3],

    /// EC report, e.g. 88:ba:00
    #[arg(value_parser = report_arg, default_value = "00:00:00")]
    pub ec: [u8; 3],
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// E7 report of the device that produced the capture
    #[arg(long, value_parser = report_arg)]
    pub e7: [u8; 3],

    /// EC report of the device that produced the capture
    #[arg(long, value_parser = report_arg, default_value = "00:00:00")]
    pub ec: [u8; 3],

    /// Touchpad configuration (YAML)
    #[arg(short, long, env = "ALPSCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Capture file: whitespace-separated hex bytes, `#` comments
    pub file: PathBuf,
}
