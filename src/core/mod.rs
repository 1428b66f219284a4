// Core runtime: configuration, miner supervision and host inspection

pub mod config;
pub mod miner;
pub mod shutdown;
pub mod system_info;

pub use config::RuntimeConfig;
pub use shutdown::ShutdownToken;
