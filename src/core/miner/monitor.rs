use std::sync::Arc;

use super::log_ring::{LogEntry, MAX_LOGS};
use super::status::{MinerState, RunStatus};

/// Read side of the miner state, as consumed by the HTTP API and the notifier.
pub trait MinerMonitor: Send + Sync {
    fn status(&self) -> RunStatus;

    /// Up to `n` most recent output lines, oldest first.
    fn logs(&self, n: i64) -> Vec<LogEntry>;
}

/// Cloneable handle onto a supervisor's state.
#[derive(Debug, Clone)]
pub struct MinerHandle {
    state: Arc<MinerState>,
}

impl MinerHandle {
    pub fn new(state: Arc<MinerState>) -> Self {
        Self { state }
    }
}

impl MinerMonitor for MinerHandle {
    fn status(&self) -> RunStatus {
        self.state.status()
    }

    fn logs(&self, n: i64) -> Vec<LogEntry> {
        self.state.logs(normalize_log_count(n))
    }
}

/// Clamp a requested log count into `0..=MAX_LOGS`.
pub fn normalize_log_count(count: i64) -> usize {
    if count <= 0 {
        0
    } else {
        usize::try_from(count).map_or(MAX_LOGS, |count| count.min(MAX_LOGS))
    }
}
