//! Miner process supervision and telemetry.
//!
//! This module owns the xmrig child process, parses hashrate reports from its
//! output and keeps a bounded history of recent log lines.

mod config;
mod log_ring;
mod monitor;
mod parse;
mod status;
mod supervisor;

pub use config::{default_args, SupervisorConfig, DEFAULT_PROGRAM, DEFAULT_RESTART_DELAY};
pub use log_ring::{LogEntry, LogRing, MAX_LOGS};
pub use monitor::{normalize_log_count, MinerHandle, MinerMonitor};
pub use parse::{parse_hashrate, scale_hashrate, strip_ansi};
pub use status::{MinerState, RunStatus};
pub use supervisor::{LogSink, Supervisor};
