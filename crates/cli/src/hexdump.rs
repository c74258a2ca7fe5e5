//! Parsing of 3-byte PS/2 reports and whitespace-separated hex captures.

use crate::error::CliError;

/// Parse a 3-byte report such as `73:03:0a`, `73,03,0a` or `73030a`.
pub fn parse_report(s: &str) -> Result<[u8; 3], CliError> {
    let invalid = || CliError::InvalidReport(s.to_string());
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);

    let parts: Vec<&str> = if digits.contains([':', ',', '-', ' ']) {
        digits
            .split([':', ',', '-', ' '])
            .filter(|p| !p.is_empty())
            .collect()
    } else if digits.len() == 6 && digits.is_ascii() {
        vec![&digits[..2], &digits[2..4], &digits[4..]]
    } else {
        return Err(invalid());
    };

    let [a, b, c] = parts.as_slice() else {
        return Err(invalid());
    };
    Ok([byte(a).ok_or_else(invalid)?, byte(b).ok_or_else(invalid)?, byte(c).ok_or_else(invalid)?])
}

/// Parse a capture: hex bytes separated by whitespace, `#` starts a comment.
pub fn parse_capture(text: &str) -> Result<Vec<u8>, CliError> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .enumerate()
        .map(|(index, token)| {
            byte(token).ok_or_else(|| CliError::InvalidCapture {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

fn byte(token: &str) -> Option<u8> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}
