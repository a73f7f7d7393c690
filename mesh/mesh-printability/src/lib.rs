//! Overhang and support analysis for 3D print quoting.
//!
//! Given a mesh and a build orientation, this crate decides which facets
//! need support, and estimates how much support material they will cost.
//!
//! # Features
//!
//! - **Overhang classification**: Facets facing too far downward
//! - **Support estimation**: Volume, weight, and contact area
//! - **Worker offload**: Run the analysis on a disposable thread
//! - **Auto-orientation**: Search for the orientation needing least support
//!
//! # Example
//!
//! ```
//! use mesh_printability::{analyze_overhangs, DEFAULT_OVERHANG_THRESHOLD};
//! use mesh_types::{Orientation, Point3, TriangleMesh, Vector3};
//!
//! let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(20.0, 20.0, 20.0));
//!
//! // Tipped 30° the underside faces mostly down and needs support.
//! let tipped = Orientation::from_axis_angle(&Vector3::z(), std::f64::consts::FRAC_PI_6);
//! let result = analyze_overhangs(&cube, &tipped, DEFAULT_OVERHANG_THRESHOLD).unwrap();
//!
//! println!("{}", result.summary());
//! assert!(result.support_weight > 0.0);
//! ```
//!
//! # Threshold
//!
//! The overhang threshold is the steepest angle from vertical that prints
//! without support. FDM printers typically manage 45°; a higher threshold
//! means a more capable printer and never more support.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod orientation;
mod overhang;
mod worker;

pub use error::{PrintabilityError, PrintabilityResult};
pub use orientation::{orientation_score, suggest_orientation, OrientationSuggestion};
pub use overhang::{
    analyze_overhangs, OverhangResult, DEFAULT_OVERHANG_THRESHOLD, SUPPORT_DENSITY_G_PER_MM3,
};
pub use worker::{spawn_overhang_job, OverhangJob, OverhangTask};
