//! Pipeline errors.

use thiserror::Error;

/// Errors a quote request can end with.
///
/// Slicer failures are absent: they degrade to fallback estimates inside
/// the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Upload could not be read as a mesh.
    #[error(transparent)]
    Load(#[from] mesh_io::IoError),

    /// Overhang analysis failed.
    #[error(transparent)]
    Overhang(#[from] mesh_printability::PrintabilityError),

    /// Order could not be priced.
    #[error(transparent)]
    Pricing(#[from] quote_pricing::PricingError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
