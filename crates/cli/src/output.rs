//! Output formatting for CLI responses

use alps_protocol::{Identity, ProtocolFamily};
use alps_touchpad::{Report, SessionStats};
use anyhow::Error;
use colored::*;
use serde_json::{Value, json};

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

pub fn hex_report(bytes: [u8; 3]) -> String {
    format!("{:02x}:{:02x}:{:02x}", bytes[0], bytes[1], bytes[2])
}

fn flag_names(identity: &Identity) -> Vec<&'static str> {
    identity
        .descriptor
        .flags
        .iter_names()
        .map(|(name, _)| name)
        .collect()
}

/// Identification result as JSON.
pub fn identity_json(identity: &Identity) -> Value {
    let d = &identity.descriptor;
    json!({
        "e7": hex_report(identity.dev_id),
        "ec": hex_report(identity.fw_ver),
        "version": d.version.name(),
        "version_raw": format!("{:#05x}", d.version.raw()),
        "decoder": ProtocolFamily::for_identity(identity).ok().map(ProtocolFamily::name),
        "byte0": format!("{:#04x}", d.byte0),
        "mask0": format!("{:#04x}", d.mask0),
        "packet_len": d.version.packet_len(),
        "flags": flag_names(identity),
    })
}

/// Print an identification result.
pub fn print_identity(identity: &Identity, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "device": identity_json(identity),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format device as JSON: {e}"),
        }
        return;
    }

    let d = &identity.descriptor;
    println!(
        "{} {} (E7={} EC={})",
        "ALPS".bold(),
        d.version.name().bold(),
        hex_report(identity.dev_id),
        hex_report(identity.fw_ver)
    );
    match ProtocolFamily::for_identity(identity) {
        Ok(family) => println!("    Decoder: {}", family.name().green()),
        Err(e) => println!("    Decoder: {} ({e})", "none".red()),
    }
    println!("    Packet: {} bytes, byte0 {:#04x} mask {:#04x}", d.version.packet_len(), d.byte0, d.mask0);
    let flags = flag_names(identity);
    if flags.is_empty() {
        println!("    Flags: {}", "none".dimmed());
    } else {
        println!("    Flags: {}", flags.join(", "));
    }
}

/// One report as JSON.
pub fn report_json(offset: usize, report: &Report) -> Value {
    match report {
        Report::Touch(t) => json!({
            "offset": offset,
            "type": "touch",
            "fingers": t.fingers,
            "buttons": t.buttons,
            "contacts": t.frame.contacts().collect::<Vec<_>>(),
            "drag_release": t.legacy.drag_release,
        }),
        Report::Trackstick(s) => json!({
            "offset": offset,
            "type": "trackstick",
            "dx": s.dx,
            "dy": s.dy,
            "pressure": s.pressure,
            "buttons": s.buttons,
        }),
        Report::Mouse(m) => json!({
            "offset": offset,
            "type": "mouse",
            "dx": m.dx,
            "dy": m.dy,
            "buttons": m.buttons,
        }),
    }
}

/// One report as a line of text.
pub fn report_human(offset: usize, report: &Report) -> String {
    match report {
        Report::Touch(t) => {
            let contacts: Vec<String> = t
                .frame
                .contacts()
                .map(|c| {
                    let slot = c.slot.map_or_else(|| "-".to_string(), |s| s.to_string());
                    format!("{:?}@{} ({},{}) z={}", c.finger, slot, c.x, c.y, c.pressure)
                })
                .collect();
            let mut line = format!(
                "{offset:>6} touch  fingers={} buttons={:03b}",
                t.fingers, t.buttons
            );
            if !contacts.is_empty() {
                line.push(' ');
                line.push_str(&contacts.join(" "));
            }
            if t.legacy.drag_release {
                line.push_str(" drag-release");
            }
            line
        }
        Report::Trackstick(s) => format!(
            "{offset:>6} stick  dx={} dy={} buttons={}",
            s.dx,
            s.dy,
            s.buttons.map_or_else(|| "-".to_string(), |b| format!("{b:03b}"))
        ),
        Report::Mouse(m) => format!(
            "{offset:>6} mouse  dx={} dy={} buttons={:03b}",
            m.dx, m.dy, m.buttons
        ),
    }
}

fn stats_json(stats: &SessionStats) -> Value {
    json!({
        "packets": stats.packets,
        "reports": stats.reports,
        "resyncs": stats.resyncs,
        "errors": stats.errors,
        "dropped": stats.dropped,
        "suppressed": stats.suppressed,
        "capacity_exceeded": stats.capacity_exceeded,
    })
}

/// Print the result of a replay.
pub fn print_replay(identity: &Identity, reports: &[(usize, Report)], stats: &SessionStats, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "device": identity_json(identity),
            "reports": reports.iter().map(|(o, r)| report_json(*o, r)).collect::<Vec<_>>(),
            "stats": stats_json(stats),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format replay as JSON: {e}"),
        }
        return;
    }

    for (offset, report) in reports {
        println!("{}", report_human(*offset, report));
    }
    let summary = format!(
        "{} packets, {} reports, {} resyncs, {} errors, {} dropped, {} suppressed",
        stats.packets, stats.reports, stats.resyncs, stats.errors, stats.dropped, stats.suppressed
    );
    if stats.errors > 0 || stats.resyncs > 0 {
        println!("{}", summary.yellow());
    } else {
        println!("{}", summary.green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alps_touchpad::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn v1_touch() -> Result<Report, Box<dyn std::error::Error>> {
        let mut pad = AlpsTouchpad::from_reports([0x33, 0x02, 0x0a], [0, 0, 0], TouchpadConfig::default())?;
        pad.process_packet(&[0x88, 0x64, 0x00, 0x01, 0x48, 0x30])?
            .ok_or_else(|| "no report".into())
    }

    #[test]
    fn human_touch_line() -> TestResult {
        insta::assert_snapshot!(
            report_human(6, &v1_touch()?),
            @"     6 touch  fingers=1 buttons=000 Index@0 (100,200) z=48"
        );
        Ok(())
    }

    #[test]
    fn json_touch_report() -> TestResult {
        insta::assert_json_snapshot!(report_json(6, &v1_touch()?), @r#"
        {
          "buttons": 0,
          "contacts": [
            {
              "button": false,
              "finger": "Index",
              "pressure": 48,
              "slot": 0,
              "x": 100,
              "y": 200
            }
          ],
          "drag_release": false,
          "fingers": 1,
          "offset": 6,
          "type": "touch"
        }
        "#);
        Ok(())
    }

    #[test]
    fn identity_flags_listed() -> TestResult {
        let identity = alps_protocol::identify([0x32, 0x02, 0x14], [0, 0, 0])?;
        let value = identity_json(&identity);
        assert_eq!(value["flags"], json!(["DUALPOINT", "PASS"]));
        assert_eq!(value["decoder"], json!("v1/v2"));
        assert_eq!(value["byte0"], json!("0xf8"));
        Ok(())
    }

    #[test]
    fn identity_without_decoder() -> TestResult {
        let identity = alps_protocol::identify([0x73, 0x03, 0xc8], [0, 0, 0])?;
        assert_eq!(identity_json(&identity)["decoder"], Value::Null);
        Ok(())
    }
}
