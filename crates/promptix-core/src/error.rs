//! Error types for promptix-core.

use thiserror::Error;

/// Errors raised by graph construction, sampling and task file I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Task file could not be encoded or decoded.
    #[error("task file encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// JSON configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Array shape error from ndarray.
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Invalid configuration (unknown operator name, inverted size bounds, ...).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An edge references a node outside the feature matrix.
    #[error("edge ({src}, {dst}) out of range for a graph with {num_nodes} nodes")]
    InvalidEdge {
        src: usize,
        dst: usize,
        num_nodes: usize,
    },

    /// Array lengths that must agree do not.
    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A class has no labelled nodes to seed subgraphs from.
    #[error("class {0} has no labelled nodes")]
    EmptyClass(usize),

    /// The same-label pool cannot pad a subgraph up to the minimum size.
    #[error("class {class}: need {needed} padding nodes, only {available} candidates")]
    InsufficientCandidates {
        class: usize,
        needed: usize,
        available: usize,
    },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
