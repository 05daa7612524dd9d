//! Egress error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the egress side of the pipeline.
#[derive(Debug, Error)]
pub enum EgressError {
    /// Reported by `EgressClient::emit`; never fatal.
    #[error("You must set a source ID")]
    MissingSourceId,

    #[error("failed to load TLS material from {}: {reason}", path.display())]
    Tls { path: PathBuf, reason: String },

    #[error("ingress transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}
