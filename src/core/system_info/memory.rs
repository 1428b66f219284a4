use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use super::dmidecode;

const EDAC_MC_DIR: &str = "/sys/devices/system/edac/mc";

/// Installed RAM, from DMI module sizes when readable, otherwise the kernel's total.
pub fn read_ram() -> String {
    if let Some(total) = dmidecode("memory", &["Memory Device", "Physical Memory Array"])
        .and_then(|out| parse_dmi_capacity_kb(&out))
    {
        return format_mem_kb(total);
    }

    let refresh = RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram());
    let sys = System::new_with_specifics(refresh);
    let total_bytes = sys.total_memory();
    if total_bytes == 0 {
        return String::new();
    }
    format_mem_kb(total_bytes as f64 / 1024.0)
}

/// Distinct DIMM speeds, e.g. `3200 MHz`, or `unknown`.
pub fn read_ram_speed() -> String {
    let mut speeds = read_edac_speeds();
    if speeds.is_empty() {
        if let Some(out) = dmidecode("memory", &["Memory Device", "Physical Memory Array"]) {
            speeds = parse_dmi_speeds(&out);
        }
    }
    if speeds.is_empty() {
        return "unknown".to_string();
    }

    speeds
        .into_iter()
        .map(|value| match value.parse::<u32>() {
            Ok(mhz) if mhz > 0 => format!("{} MHz", mhz),
            _ => value,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_edac_speeds() -> BTreeSet<String> {
    let mut speeds = BTreeSet::new();
    let Ok(controllers) = fs::read_dir(EDAC_MC_DIR) else {
        return speeds;
    };

    for controller in controllers.flatten() {
        let Ok(dimms) = fs::read_dir(controller.path()) else {
            continue;
        };
        for dimm in dimms.flatten() {
            if !dimm.file_name().to_string_lossy().starts_with("dimm") {
                continue;
            }
            if let Some(value) = read_trimmed(&dimm.path().join("dimm_speed")) {
                if !value.eq_ignore_ascii_case("unknown") {
                    speeds.insert(value);
                }
            }
        }
    }
    speeds
}

fn read_trimmed(path: &Path) -> Option<String> {
    let value = fs::read_to_string(path).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Sum of `Size:` entries in `dmidecode -t memory` output, in KB.
pub fn parse_dmi_capacity_kb(output: &str) -> Option<f64> {
    let total: f64 = output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Size:"))
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("no module installed"))
        .filter_map(|value| {
            let mut fields = value.split_whitespace();
            let amount: f64 = fields.next()?.parse().ok()?;
            let multiplier = match fields.next()?.to_ascii_lowercase().as_str() {
                "kb" => 1.0,
                "mb" => 1024.0,
                "gb" => 1024.0 * 1024.0,
                _ => return None,
            };
            Some(amount * multiplier)
        })
        .sum();

    (total > 0.0).then_some(total)
}

/// Distinct module speeds from `Speed:` lines. `Configured Memory Speed` lines are skipped.
pub fn parse_dmi_speeds(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Speed:"))
        .map(str::trim)
        .filter(|value| {
            !value.is_empty() && !value.eq_ignore_ascii_case("unknown") && !value.contains("No Module")
        })
        .map(normalize_speed)
        .collect()
}

fn normalize_speed(value: &str) -> String {
    let fields: Vec<&str> = value.split_whitespace().collect();
    match fields.as_slice() {
        [number, "MT/s" | "MHz", ..] => format!("{} MHz", number),
        _ => value.to_string(),
    }
}

pub fn format_mem_kb(kb: f64) -> String {
    const KB_PER_MB: f64 = 1024.0;
    const KB_PER_GB: f64 = 1024.0 * 1024.0;

    if kb >= KB_PER_GB {
        let gb = kb / KB_PER_GB;
        if gb >= 16.0 {
            return format!("{:.0} GB", gb.round());
        }
        return format!("{:.1} GB", gb);
    }
    if kb >= KB_PER_MB {
        return format!("{:.0} MB", kb / KB_PER_MB);
    }
    format!("{:.0} KB", kb)
}
