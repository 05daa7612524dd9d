//! Error types for metric decoding.

use thiserror::Error;

/// Errors produced while decoding metrics command output.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid metrics output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("metrics output is empty")]
    Empty,
}
