//! Error types for promptix-nn.

use thiserror::Error;

/// Prompting error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Graph container or task error.
    #[error("graph error: {0}")]
    Graph(#[from] promptix_core::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid configuration (e.g. an unsupported init method).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Task type without an implementation.
    #[error("task type {0:?} is not implemented")]
    UnsupportedTask(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
