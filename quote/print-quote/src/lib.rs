//! Upload-to-quote pipeline for 3D print orders.
//!
//! Wires the mesh crates and pricing together: an upload is parsed, placed
//! in a build orientation, checked for overhangs, sliced for time and
//! material, and priced.
//!
//! # Example
//!
//! ```
//! use mesh_slice::{SliceSettings, SlicerConfig};
//! use print_quote::{PipelineConfig, QuotePipeline};
//! use mesh_types::{Point3, TriangleMesh};
//!
//! let config = PipelineConfig::default().with_slicer(SlicerConfig::new("/nonexistent/slicer"));
//! let pipeline = QuotePipeline::new(config);
//!
//! let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(20.0, 20.0, 20.0));
//! let bytes = mesh_io::save_stl_binary(&cube);
//! let assessment = pipeline
//!     .assess_upload("upload-1", &bytes, "cube.stl", &SliceSettings::default())
//!     .unwrap();
//!
//! assert!(assessment.overhangs.is_support_free());
//! assert!(assessment.metrics.fallback);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{Assessment, QuotePipeline};
