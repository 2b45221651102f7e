//! Error types for ssao-core.

use thiserror::Error;

/// The main error type for ssao-core operations.
#[derive(Error, Debug)]
pub enum SsaoError {
    /// A framebuffer layout failed its completeness check.
    #[error("framebuffer '{label}' incomplete: {reason}")]
    IncompleteFramebuffer { label: String, reason: String },

    /// A framebuffer does not provide the inputs a pass expects.
    #[error("framebuffer '{label}' does not match pass inputs: expected {expected:?}, got {actual:?}")]
    InputMismatch {
        label: String,
        expected: Vec<u32>,
        actual: Vec<u32>,
    },

    /// Mesh data is malformed.
    #[error("invalid mesh '{name}': {reason}")]
    InvalidMesh { name: String, reason: String },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for ssao-core operations.
pub type Result<T> = std::result::Result<T, SsaoError>;
