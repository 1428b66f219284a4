use std::fs;

use super::dmidecode;

const BOARD_VENDOR: &str = "/sys/devices/virtual/dmi/id/board_vendor";
const BOARD_NAME: &str = "/sys/devices/virtual/dmi/id/board_name";

/// Board vendor and model, e.g. `ASUSTeK COMPUTER INC. PRIME B550-PLUS`.
pub fn read_motherboard() -> String {
    let vendor = read_dmi_file(BOARD_VENDOR);
    let name = read_dmi_file(BOARD_NAME);
    if is_useful_dmi_value(&vendor) || is_useful_dmi_value(&name) {
        return join_words(&vendor, &name);
    }

    match dmidecode("baseboard", &["Base Board Information", "Baseboard"]) {
        Some(output) => {
            let (manufacturer, product) = parse_baseboard(&output);
            join_words(&manufacturer, &product)
        }
        None => String::new(),
    }
}

fn read_dmi_file(path: &str) -> String {
    fs::read_to_string(path)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Firmware placeholders such as "Default string" carry no information.
pub fn is_useful_dmi_value(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let lower = value.to_lowercase();
    lower != "unknown" && lower != "default string" && !lower.contains("to be filled")
}

/// Manufacturer and product name from `dmidecode -t baseboard` output.
pub fn parse_baseboard(output: &str) -> (String, String) {
    let mut manufacturer = String::new();
    let mut product = String::new();
    for line in output.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Manufacturer:") {
            manufacturer = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Product Name:") {
            product = value.trim().to_string();
        }
    }
    (manufacturer, product)
}

fn join_words(first: &str, second: &str) -> String {
    first
        .split_whitespace()
        .chain(second.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
