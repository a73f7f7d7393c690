//! Upload decoding for the print quoting pipeline.
//!
//! Turns the raw bytes of an uploaded model plus its declared filename into a
//! [`TriangleMesh`]:
//!
//! - **STL** (Stereolithography) - Binary and ASCII
//! - **3MF** (3D Manufacturing Format) - ZIP-based XML format
//!
//! Loading is a pure transform: no files are touched and nothing is cached.
//!
//! # Example
//!
//! ```
//! use mesh_io::{load_model, save_stl_binary, IoError};
//! use mesh_types::{Point3, TriangleMesh};
//!
//! let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(20.0, 20.0, 20.0));
//! let upload = save_stl_binary(&cube);
//!
//! let mesh = load_model(&upload, "bracket.stl").unwrap();
//! assert_eq!(mesh.facet_count(), 12);
//!
//! let err = load_model(b"not a mesh", "notes.txt").unwrap_err();
//! assert!(matches!(err, IoError::UnsupportedModel { .. }));
//! ```
//!
//! # Format Detection
//!
//! The declared extension wins when it names a supported format. Otherwise
//! the leading bytes decide: a ZIP signature means 3MF, anything else is
//! tried as STL.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod stl;
mod threemf;

pub use error::{IoError, IoResult};
pub use stl::save_stl_binary;
pub use threemf::save_3mf;

use std::path::Path;

use mesh_types::TriangleMesh;
use tracing::{debug, info};

/// ZIP local file header signature; every 3MF archive starts with it.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// STL (Stereolithography) format.
    /// Supports binary and ASCII variants.
    Stl,
    /// 3MF (3D Manufacturing Format).
    /// ZIP-based XML format for 3D printing.
    ThreeMf,
}

impl MeshFormat {
    /// Detect format from a declared filename's extension.
    ///
    /// Returns `None` if the extension is missing or not recognized.
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "3mf" => Some(Self::ThreeMf),
            _ => None,
        }
    }

    /// Guess the format from leading bytes.
    ///
    /// Anything that is not a ZIP archive is assumed to be STL and left to the
    /// STL parser to accept or reject.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::ThreeMf
        } else {
            Self::Stl
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::ThreeMf => "3mf",
        }
    }
}

/// Decode an uploaded model.
///
/// Degenerate facets are kept so facet indices match the file.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedModel`] when the payload is empty or corrupt,
/// matches neither format, or yields zero triangles.
pub fn load_model(bytes: &[u8], declared_filename: &str) -> IoResult<TriangleMesh> {
    if bytes.is_empty() {
        return Err(IoError::unsupported(format!(
            "{declared_filename} is empty"
        )));
    }

    let declared = MeshFormat::from_filename(declared_filename);
    let format = declared.unwrap_or_else(|| MeshFormat::sniff(bytes));
    debug!(
        filename = declared_filename,
        ?format,
        sniffed = declared.is_none(),
        "detected upload format"
    );

    let parsed = match format {
        MeshFormat::Stl => stl::parse_stl(bytes),
        MeshFormat::ThreeMf => threemf::parse_3mf(bytes),
    };
    let mesh = parsed.map_err(IoError::into_unsupported)?;

    if mesh.is_empty() {
        return Err(IoError::unsupported(format!(
            "{declared_filename} contains no triangles"
        )));
    }

    info!(
        filename = declared_filename,
        facets = mesh.facet_count(),
        degenerate = mesh.degenerate_count(),
        "loaded model"
    );
    Ok(mesh)
}
