use std::process::Command;

/// Package power draw from `turbostat`, e.g. `65.3 W`, or empty when unavailable.
///
/// turbostat needs root, so it is invoked through non-interactive sudo.
pub fn read_cpu_wattage() -> String {
    if which::which("turbostat").is_err() {
        return String::new();
    }

    let output = Command::new("sudo")
        .args([
            "-n",
            "turbostat",
            "--Summary",
            "--quiet",
            "--show",
            "PkgWatt",
            "-n",
            "1",
        ])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            match parse_turbostat_pkg_watt(&String::from_utf8_lossy(&output.stdout)) {
                Some(watts) if watts > 0.0 => format!("{:.1} W", watts),
                _ => String::new(),
            }
        }
        _ => String::new(),
    }
}

/// Value under the `PkgWatt` column, or a lone number when no header is printed.
pub fn parse_turbostat_pkg_watt(output: &str) -> Option<f64> {
    let mut column: Option<usize> = None;

    for line in output.lines().map(str::trim) {
        if line.is_empty() || line.contains("turbostat") || line.contains("Kernel") {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();

        if column.is_none() && line.contains("PkgWatt") {
            column = fields.iter().position(|field| *field == "PkgWatt");
            continue;
        }

        match column {
            Some(index) => {
                if let Some(value) = fields.get(index).and_then(|v| v.parse::<f64>().ok()) {
                    return Some(value);
                }
            }
            None if fields.len() == 1 => {
                if let Some(value) = leading_number(fields[0]) {
                    return Some(value);
                }
            }
            None => {}
        }
    }
    None
}

/// First decimal number embedded in `text`.
pub(crate) fn leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit() || c == '-' || c == '+')?;
    let rest = &text[start..];
    let end = rest
        .char_indices()
        .skip(1)
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
