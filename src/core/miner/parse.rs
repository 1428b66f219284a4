//! Hashrate extraction from xmrig console output.
//!
//! xmrig prints a periodic report such as
//! `[2024-01-01 12:00:00.000]  miner    speed 10s/60s/15m 1234.5 1300.0 n/a H/s max 1400.0 H/s`.
//! Only the 10 second sample is used.

use once_cell::sync::Lazy;
use regex::Regex;

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ANSI escape regex"));

const SPEED_MARKER: &str = "speed";
const WINDOW_MARKER: &str = "10s/60s/15m";

/// Remove ANSI colour and cursor escape sequences.
pub fn strip_ansi(line: &str) -> std::borrow::Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}

/// Parse the 10s hashrate from a single output line, normalised to H/s.
///
/// The window token may carry a trailing colon (`10s/60s/15m:`).
/// The unit is read from the last token of the line only when it ends in `h/s`;
/// otherwise the value is taken as already being in H/s.
pub fn parse_hashrate(line: &str) -> Option<f64> {
    let line = strip_ansi(line);
    if !line.to_ascii_lowercase().contains(SPEED_MARKER) {
        return None;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let position = fields.windows(3).position(|window| {
        window[0].eq_ignore_ascii_case(SPEED_MARKER)
            && window[1]
                .strip_suffix(':')
                .unwrap_or(window[1])
                .eq_ignore_ascii_case(WINDOW_MARKER)
    })?;

    let value: f64 = fields[position + 2].parse().ok()?;

    let unit = fields
        .last()
        .filter(|last| last.to_ascii_lowercase().ends_with("h/s"))
        .copied()
        .unwrap_or("");

    Some(scale_hashrate(value, unit))
}

/// Convert a value reported in `unit` into H/s. Unknown units scale by one.
pub fn scale_hashrate(value: f64, unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "kh/s" => value * 1e3,
        "mh/s" => value * 1e6,
        "gh/s" => value * 1e9,
        "th/s" => value * 1e12,
        _ => value,
    }
}
