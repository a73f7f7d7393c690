//! Build orientation solving.
//!
//! This crate provides tools for:
//! - Turning a picked face so it lies flat on the build plate
//! - Picking the face under a viewer ray (Möller–Trumbore)
//! - Baking an orientation into geometry for the slicer
//!
//! Every function is pure: orientations are composed into new values and
//! meshes are copied, never edited.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Example
//!
//! ```
//! use mesh_orient::{align_face_to_plate, pick_face};
//! use mesh_types::{down, Orientation, Point3, TriangleMesh, Vector3};
//!
//! let part = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(30.0, 10.0, 10.0));
//!
//! // The user clicks the +X end of the part.
//! let hit = pick_face(&part, &Point3::new(100.0, 5.0, 5.0), &Vector3::new(-1.0, 0.0, 0.0))
//!     .unwrap();
//!
//! let orientation = align_face_to_plate(&hit.normal, &Orientation::identity());
//! let world = orientation.rotate_vector(&hit.normal);
//! assert!((world - down()).norm() < 1e-12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod align;
mod error;
mod pick;
mod place;

pub use align::{align_face_to_plate, MIN_NORMAL_LENGTH};
pub use error::{OrientError, OrientResult};
pub use pick::{pick_face, pick_face_checked, FacePick};
pub use place::{apply_orientation, oriented_for_printing, place_on_build_plate, to_slicer_frame};
