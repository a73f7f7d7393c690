//! Error types for printability analysis.

use thiserror::Error;

/// Result type for printability operations.
pub type PrintabilityResult<T> = Result<T, PrintabilityError>;

/// Errors that can occur during printability analysis.
#[derive(Debug, Error)]
pub enum PrintabilityError {
    /// Overhang threshold is not a number.
    #[error("invalid overhang threshold: {value}")]
    InvalidThreshold {
        /// The rejected value.
        value: f64,
    },

    /// Payload could not be encoded or decoded at the worker boundary.
    #[error("worker payload codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// The worker thread could not be started, died, or stopped answering.
    #[error("overhang worker failed: {message}")]
    Worker {
        /// Description of the failure.
        message: String,
    },
}

impl PrintabilityError {
    /// Create a `Worker` error with the given message.
    #[must_use]
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}
