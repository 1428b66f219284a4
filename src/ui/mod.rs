// UI and formatting module

pub mod formatters;
pub mod messages;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_duration_seconds, format_hashrate, format_power_cost, format_uptime, strip_core_info,
};
pub use messages::{field, info, success, warn};
