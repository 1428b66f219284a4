use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Assumed package power of the mining rig, in watts.
const RIG_WATTS: f64 = 200.0;
/// Electricity price in CAD per kWh.
const RATE_PER_KWH: f64 = 0.10652;

static CORE_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+\s*-?\s*cores?(?:\s+processor)?\b").expect("valid core info regex")
});

/// Format a hashrate in H/s as `H/s`, `KH/s` or `MH/s` with two decimals
pub fn format_hashrate(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2} MH/s", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2} KH/s", value / 1_000.0)
    } else {
        format!("{:.2} H/s", value)
    }
}

/// Format an elapsed duration as whole hours and minutes
pub fn format_uptime(elapsed: Duration) -> String {
    let total_minutes = elapsed.as_secs() / 60;
    if total_minutes == 0 {
        return "less than a minute".to_string();
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    match (hours, minutes) {
        (0, minutes) => format!("{} minutes", minutes),
        (hours, 0) => format!("{} hours", hours),
        (hours, minutes) => format!("{} hours {} minutes", hours, minutes),
    }
}

pub fn format_duration_seconds(seconds: i64) -> String {
    if seconds <= 0 {
        return "less than a minute".to_string();
    }
    format_uptime(Duration::from_secs(seconds as u64))
}

/// Electricity cost of running the rig for `seconds`
pub fn format_power_cost(seconds: i64) -> String {
    if seconds <= 0 {
        return "CAD 0.00".to_string();
    }
    let hours = seconds as f64 / 3600.0;
    let kwh = (RIG_WATTS / 1000.0) * hours;
    format!("CAD {:.2}", kwh * RATE_PER_KWH)
}

/// Drop "8-Core Processor"-style suffixes from a CPU brand string
pub fn strip_core_info(model: &str) -> String {
    let cleaned = CORE_INFO.replace_all(model, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
