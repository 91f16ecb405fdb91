//! Error types for the survival-ml crate.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for metric, registry and pipeline operations.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Empty batch: at least one example is required")]
    EmptyBatch,

    #[error("Invalid label {value} in {field}: expected 0 or 1")]
    InvalidLabel { field: &'static str, value: u8 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact not found: model_id {0}")]
    ArtifactNotFound(u64),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Model encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl MlError {
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}

impl From<figment::Error> for MlError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}
