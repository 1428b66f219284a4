//! Shared run state of the supervised miner.
//!
//! The supervisor is the only writer. HTTP handlers and the notifier read
//! snapshots through [`MinerState::status`] and [`MinerState::logs`].

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::log_ring::{LogEntry, LogRing, MAX_LOGS};

/// Point-in-time copy of the miner's run state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub running: bool,
    /// Last reported 10s hashrate in H/s, zero while not running.
    pub hashrate_hs: f64,
    pub last_log_time: Option<DateTime<Utc>>,
    pub last_start_time: Option<DateTime<Utc>>,
    pub last_exit_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    status: RunStatus,
    logs: LogRing,
}

/// Run status and log ring behind a single reader-writer lock.
///
/// A line's log entry and its status update are applied in one critical section,
/// so readers never see one without the other.
#[derive(Debug, Default)]
pub struct MinerState {
    inner: RwLock<Inner>,
}

impl MinerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_start(&self, at: DateTime<Utc>) {
        let mut inner = self.inner.write();
        inner.status.running = true;
        inner.status.last_start_time = Some(at);
        inner.status.last_error = None;
    }

    /// Mark the miner as stopped. `error` replaces the last error, `None` clears it.
    pub fn record_exit(&self, at: DateTime<Utc>, error: Option<String>) {
        let mut inner = self.inner.write();
        inner.status.running = false;
        inner.status.last_exit_time = Some(at);
        inner.status.hashrate_hs = 0.0;
        inner.status.last_error = error;
    }

    /// Store an output line and, when one was parsed from it, the new hashrate.
    pub fn record_line(&self, line: &str, at: DateTime<Utc>, hashrate: Option<f64>) {
        let mut inner = self.inner.write();
        inner.status.last_log_time = Some(at);
        inner.logs.record(line, at);
        if let Some(value) = hashrate {
            inner.status.hashrate_hs = value;
        }
    }

    pub fn status(&self) -> RunStatus {
        self.inner.read().status.clone()
    }

    /// The most recent `count` log lines, oldest first. `count` is clamped to the ring size.
    pub fn logs(&self, count: usize) -> Vec<LogEntry> {
        self.inner.read().logs.snapshot(count.min(MAX_LOGS))
    }
}
