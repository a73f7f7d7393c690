//! Error types for model loading.

use thiserror::Error;

/// Result type for model loading.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while turning an upload into a mesh.
///
/// Only [`IoError::UnsupportedModel`] reaches callers of
/// [`load_model`](crate::load_model); the format-specific variants are folded
/// into it with their message as the reason.
#[derive(Debug, Error)]
pub enum IoError {
    /// The upload is not a usable STL or 3MF model.
    #[error("unsupported model: {reason}")]
    UnsupportedModel {
        /// Why the upload was rejected.
        reason: String,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// Binary STL payload shorter than its declared triangle count.
    #[error("truncated STL: header declares {declared} triangles, payload holds {available}")]
    Truncated {
        /// Triangle count from the header.
        declared: u32,
        /// Whole triangles actually present.
        available: usize,
    },

    /// A 3MF triangle references a vertex that does not exist.
    #[error("triangle references vertex {index} but the object has {count} vertices")]
    VertexIndexOutOfRange {
        /// Offending index (object-local).
        index: usize,
        /// Vertices declared by the object.
        count: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Create an `UnsupportedModel` error with the given reason.
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            reason: reason.into(),
        }
    }

    /// Fold any error into `UnsupportedModel`, keeping its message.
    #[must_use]
    pub fn into_unsupported(self) -> Self {
        match self {
            unsupported @ Self::UnsupportedModel { .. } => unsupported,
            other => Self::UnsupportedModel {
                reason: other.to_string(),
            },
        }
    }
}
