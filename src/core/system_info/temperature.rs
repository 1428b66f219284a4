use std::fs;
use sysinfo::Components;

const THERMAL_ZONE_DIR: &str = "/sys/class/thermal";
const CPU_LABEL_HINTS: &[&str] = &["temp", "tctl", "package", "cpu", "core"];

/// Hottest CPU sensor formatted as `61.2 C`, or empty when no sensor is readable.
pub fn read_cpu_temp() -> String {
    let components = Components::new_with_refreshed_list();
    let readings: Vec<(String, f64)> = components
        .iter()
        .filter_map(|component| {
            component
                .temperature()
                .map(|celsius| (component.label().to_string(), f64::from(celsius)))
        })
        .collect();

    hottest_cpu_reading(&readings)
        .or_else(read_thermal_zones)
        .map(|celsius| format!("{:.1} C", celsius))
        .unwrap_or_default()
}

/// Highest CPU-labelled reading, falling back to the highest reading of any kind.
pub fn hottest_cpu_reading(readings: &[(String, f64)]) -> Option<f64> {
    let hottest = |cpu_only: bool| {
        readings
            .iter()
            .filter(|(label, _)| {
                let lower = label.to_lowercase();
                !cpu_only || CPU_LABEL_HINTS.iter().any(|hint| lower.contains(hint))
            })
            .map(|(_, value)| normalize_temp(*value))
            .filter(|value| value.is_finite())
            .fold(None, |best: Option<f64>, value| {
                Some(best.map_or(value, |best| best.max(value)))
            })
    };
    hottest(true).or_else(|| hottest(false))
}

fn read_thermal_zones() -> Option<f64> {
    let zones = fs::read_dir(THERMAL_ZONE_DIR).ok()?;
    zones
        .flatten()
        .filter(|zone| zone.file_name().to_string_lossy().starts_with("thermal_zone"))
        .filter_map(|zone| fs::read_to_string(zone.path().join("temp")).ok())
        .filter_map(|raw| raw.trim().parse::<f64>().ok())
        .map(normalize_temp)
        .fold(None, |best: Option<f64>, value| {
            Some(best.map_or(value, |best| best.max(value)))
        })
}

/// Sysfs reports milli-degrees; some drivers double-scale.
pub fn normalize_temp(mut value: f64) -> f64 {
    if value > 1000.0 {
        value /= 1000.0;
    }
    if value > 200.0 {
        value /= 1000.0;
    }
    value
}
