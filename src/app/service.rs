use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ports::{MinerMonitor, SpecsReader};
use crate::core::miner::{LogEntry, RunStatus};
use crate::core::system_info::{Metrics, Specs};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    pub status: String,
    pub time: DateTime<Utc>,
}

/// Read-only facade over the specs reader and the miner monitor.
#[derive(Clone)]
pub struct Service {
    specs_reader: Arc<dyn SpecsReader>,
    miner_monitor: Option<Arc<dyn MinerMonitor>>,
}

impl Service {
    pub fn new(
        specs_reader: Arc<dyn SpecsReader>,
        miner_monitor: Option<Arc<dyn MinerMonitor>>,
    ) -> Self {
        Self {
            specs_reader,
            miner_monitor,
        }
    }

    pub fn health(&self) -> Health {
        Health {
            status: "ok".to_string(),
            time: Utc::now(),
        }
    }

    pub fn specs(&self) -> Result<Specs> {
        self.specs_reader.read_specs()
    }

    pub fn metrics(&self) -> Result<Metrics> {
        self.specs_reader.read_metrics()
    }

    /// Current miner status; all fields unset when no miner is attached.
    pub fn miner_status(&self) -> RunStatus {
        match &self.miner_monitor {
            Some(monitor) => monitor.status(),
            None => RunStatus::default(),
        }
    }

    pub fn miner_logs(&self, n: i64) -> Vec<LogEntry> {
        match &self.miner_monitor {
            Some(monitor) => monitor.logs(n),
            None => Vec::new(),
        }
    }
}
