//! Error types for slicer runs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running or reading the slicer.
///
/// None of these reach quoting callers: [`SlicingEstimator::estimate`]
/// turns every one of them into fallback metrics.
///
/// [`SlicingEstimator::estimate`]: crate::SlicingEstimator::estimate
#[derive(Debug, Error)]
pub enum SliceError {
    /// Slice settings out of range.
    #[error("Invalid slice settings: {message}")]
    InvalidSettings {
        /// Description of the problem.
        message: String,
    },

    /// Mesh file handed to the slicer does not exist.
    #[error("Mesh file not found: {path}")]
    MeshNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Slicer executable could not be started.
    #[error("Failed to start slicer {executable}: {source}")]
    Spawn {
        /// Executable that was run.
        executable: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Slicer exited unsuccessfully.
    #[error("Slicer exited with {}: {stderr}", code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    SlicerFailed {
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Tail of the slicer's stderr.
        stderr: String,
    },

    /// Slicer did not finish within the configured timeout.
    #[error("Slicer timed out after {seconds:.1}s")]
    Timeout {
        /// The timeout that expired.
        seconds: f64,
    },

    /// Slicer output lacked a time or material figure.
    #[error("Slicer output has no {missing} estimate")]
    UnparseableOutput {
        /// Which figure was missing.
        missing: &'static str,
    },

    /// IO error on scratch or toolpath files.
    #[error("Failed to access {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SliceError {
    /// Create an `InvalidSettings` error with the given message.
    #[must_use]
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for slicer runs.
pub type SliceResult<T> = std::result::Result<T, SliceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SliceError::SlicerFailed {
            code: Some(2),
            stderr: "unknown option".into(),
        };
        assert_eq!(format!("{err}"), "Slicer exited with status 2: unknown option");

        let err = SliceError::SlicerFailed {
            code: None,
            stderr: String::new(),
        };
        assert!(format!("{err}").contains("a signal"));

        let err = SliceError::Timeout { seconds: 120.0 };
        assert_eq!(format!("{err}"), "Slicer timed out after 120.0s");
    }
}
