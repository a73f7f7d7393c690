//! Print time and material estimates from an external slicer.
//!
//! This crate runs a PrusaSlicer-compatible command-line slicer on a mesh
//! file and reads the estimated print time and filament mass from its
//! output. The slicer is treated as unreliable: when it is missing, fails,
//! hangs past its timeout, or prints nothing usable, the estimate falls
//! back to fixed stand-in values flagged with `fallback = true`.
//!
//! # Features
//!
//! - **Slice settings**: Layer height, infill, and support options as slicer arguments
//! - **Bounded runs**: Each invocation is killed if it outlives its timeout
//! - **Output parsing**: PrusaSlicer and Cura style time/material figures
//! - **Toolpaths**: G-code from successful runs is kept and referenced
//!
//! # Example
//!
//! ```no_run
//! use mesh_slice::{SliceSettings, SlicerConfig, SlicingEstimator};
//! use std::path::Path;
//!
//! let estimator = SlicingEstimator::new(SlicerConfig::new("prusa-slicer").with_timeout_secs(60.0));
//! let settings = SliceSettings::default().with_supports(Some("snug"), Some(45.0));
//!
//! let metrics = estimator.estimate(Path::new("bracket.stl"), &settings);
//! if metrics.fallback {
//!     println!("slicer unavailable, quoting with defaults");
//! }
//! println!("{} and {:.1} g", metrics.formatted_time(), metrics.material_grams);
//! ```
//!
//! # Coordinate System
//!
//! Slicers treat +Z as the print direction. Meshes oriented in the Y-up
//! quoting frame should go through `mesh_orient::to_slicer_frame` first.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod config;
mod error;
mod estimator;
mod metrics;
mod parse;
mod runner;
mod settings;

pub use config::{SlicerConfig, DEFAULT_SLICER, DEFAULT_TIMEOUT_SECS};
pub use error::{SliceError, SliceResult};
pub use estimator::SlicingEstimator;
pub use metrics::{SliceMetrics, FALLBACK_MATERIAL_GRAMS, FALLBACK_TIME_SECONDS};
pub use parse::{parse_slicer_output, ParsedOutput};
pub use settings::SliceSettings;
