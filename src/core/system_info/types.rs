use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static description of the mining host. Empty strings mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specs {
    pub model: String,
    pub cores: usize,
    pub threads: usize,
    pub motherboard: String,
    pub cpu_temp: String,
    pub cpu_wattage: String,
    pub ram: String,
    pub ram_speed: String,
}

/// Sensor readings that change while the miner runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub cpu_temp: String,
    pub cpu_wattage: String,
    pub time: DateTime<Utc>,
}
