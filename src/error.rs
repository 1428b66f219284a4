use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for grid-node
#[derive(Error, Debug)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("executable not found: {name}: {source}")]
    ExecutableNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to start {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to capture miner output: {0}")]
    Pipe(String),

    #[error("{0}")]
    Exited(String),

    #[error("Invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Specs error: {0}")]
    Specs(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for grid-node
pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    pub fn launch(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GridError::Launch {
            path: path.into(),
            source,
        }
    }

    pub fn pipe<S: Into<String>>(msg: S) -> Self {
        GridError::Pipe(msg.into())
    }

    /// Create an error describing an unsuccessful child exit
    pub fn exited<S: Into<String>>(msg: S) -> Self {
        GridError::Exited(msg.into())
    }

    pub fn invalid_webhook_url<S: Into<String>>(msg: S) -> Self {
        GridError::InvalidWebhookUrl(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        GridError::InvalidInput(msg.into())
    }

    pub fn specs<S: Into<String>>(msg: S) -> Self {
        GridError::Specs(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        GridError::Other(msg.into())
    }
}
