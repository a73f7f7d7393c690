//! Error types for orientation operations.

use thiserror::Error;

/// Result type for orientation operations.
pub type OrientResult<T> = Result<T, OrientError>;

/// Errors that can occur while picking or orienting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrientError {
    /// Ray direction has zero length or non-finite components.
    #[error("invalid ray direction [{x}, {y}, {z}]")]
    InvalidRayDirection {
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
        /// Z component.
        z: f64,
    },

    /// Ray origin has non-finite components.
    #[error("ray origin is not finite")]
    InvalidRayOrigin,

    /// Empty mesh.
    #[error("mesh is empty")]
    EmptyMesh,
}
