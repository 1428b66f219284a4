// Console message helpers

use colored::Colorize;

/// Display a warning message
pub fn warn(message: &str) {
    println!("{}", format!("Warning: {}", message).yellow().bold());
}

/// Display an info message
pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{}", message.green().bold());
}

/// Display a `label: value` pair, dimming unknown values
pub fn field(label: &str, value: &str) {
    let value = if value.is_empty() {
        "unknown".dimmed().to_string()
    } else {
        value.white().bold().to_string()
    };
    println!("  {:<14} {}", format!("{}:", label).cyan(), value);
}
