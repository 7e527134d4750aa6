use bars_providers::RuntimeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BarsError {
    /// The system prompt asset is required at startup.
    #[error("{} not found: {source}", .path.display())]
    MissingPrompt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save memory to {}: {source}", .path.display())]
    SaveMemory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode memory: {0}")]
    EncodeMemory(#[from] serde_json::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl BarsError {
    /// Whether the failure means the model runtime cannot be used at all.
    pub fn is_runtime_unavailable(&self) -> bool {
        matches!(self, BarsError::Runtime(_))
    }
}

pub type Result<T> = std::result::Result<T, BarsError>;
