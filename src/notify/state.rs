use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GridError, Result};

/// Counters that survive restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub best_hashrate: f64,
    #[serde(default)]
    pub last_hashrate: f64,
    #[serde(default)]
    pub total_runtime_seconds: i64,
}

/// JSON file holding a [`StoredState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/grid/state.json`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GridError::other("Could not determine config directory"))?;
        Ok(config_dir.join("grid").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored state. A missing or empty file yields the default state.
    pub fn load(&self) -> Result<StoredState> {
        if !self.path.exists() {
            return Ok(StoredState::default());
        }

        let data = fs::read(&self.path)?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(StoredState::default());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save(&self, state: &StoredState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(state)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
