//! Collection cycle error types.

use std::process::ExitStatus;

use service_metrics_core::DecodeError;
use thiserror::Error;

/// Fatal outcomes of a collection cycle. Any of these ends the process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The command could not be started, or its output could not be read.
    #[error("failed to run metrics command {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited nonzero with a status other than "not ready".
    #[error("metrics command failed with {status}")]
    CommandFailed { status: ExitStatus, output: String },

    #[error("failed to parse metrics output: {0}")]
    Decode(#[from] DecodeError),
}

pub type ProcessResult<T> = Result<T, ProcessError>;
