use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::miner::SupervisorConfig;
use crate::error::{GridError, Result};
use crate::notify::{NotifierConfig, StateStore};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Everything `grid-node run` needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listen_addr: SocketAddr,
    /// Discord webhook URL. No URL means no notifier.
    pub webhook_url: Option<String>,
    pub state_file: PathBuf,
    pub notifier: NotifierConfig,
    pub supervisor: SupervisorConfig,
}

impl RuntimeConfig {
    pub fn new(listen: &str, supervisor: SupervisorConfig) -> Result<Self> {
        let listen_addr = parse_listen_addr(listen)?;
        let state_file = StateStore::default_path()?;

        Ok(Self {
            listen_addr,
            webhook_url: None,
            state_file,
            notifier: NotifierConfig::default(),
            supervisor,
        })
    }

    pub fn with_webhook(mut self, url: Option<String>) -> Self {
        self.webhook_url = url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    pub fn with_notify_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.notifier.interval = interval;
        }
        self
    }
}

pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr> {
    let raw = raw.trim();
    let raw = if raw.is_empty() { DEFAULT_LISTEN_ADDR } else { raw };
    raw.parse()
        .map_err(|_| GridError::invalid_input(format!("invalid listen address: {}", raw)))
}
