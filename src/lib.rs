// grid-node library - Public API

// Re-export error types
pub mod error;
pub use error::{GridError, Result};

// Module declarations
pub mod api;
pub mod app;
pub mod commands;
pub mod core;
pub mod notify;
pub mod observability;
pub mod ui;

// Re-export commonly used types
pub use crate::core::miner::{MinerHandle, MinerMonitor, Supervisor, SupervisorConfig};
pub use crate::core::shutdown::ShutdownToken;

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
