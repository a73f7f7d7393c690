//! Core geometry types for the print quoting pipeline.
//!
//! This crate provides the values every later stage passes around:
//!
//! - [`Facet`] - One triangle with its three corner positions and unit normal
//! - [`TriangleMesh`] - A flat, append-only buffer of facets indexed by number
//! - [`Orientation`] - A build orientation (unit quaternion)
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Layer 0 Crate
//!
//! No I/O, no threads, no global state. Everything here is a plain value
//! owned by the request that created it.
//!
//! # Units
//!
//! Coordinates are `f64` millimeters.
//!
//! # Coordinate System
//!
//! World space is **Y-up**:
//! - X: width
//! - Y: height above the build plate
//! - Z: depth
//!
//! "Down" is `(0, -1, 0)` and is exposed as [`down`]. Facet winding is
//! counter-clockwise when viewed from outside, so normals point outward by
//! the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Orientation, Point3, TriangleMesh};
//!
//! let mut mesh = TriangleMesh::new();
//! mesh.push_triangle(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, -1.0),
//! );
//!
//! assert_eq!(mesh.facet_count(), 1);
//! let world = Orientation::identity().rotate_vector(&mesh.facets[0].normal);
//! assert!((world.y - 1.0).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod bounds;
mod facet;
mod mesh;
mod orientation;

pub use bounds::Aabb;
pub use facet::Facet;
pub use mesh::TriangleMesh;
pub use orientation::{Orientation, OrientationError};

pub use nalgebra::{Point3, UnitQuaternion, Vector3};

/// World-space "down": the direction gravity pulls printed material.
#[inline]
#[must_use]
pub fn down() -> Vector3<f64> {
    Vector3::new(0.0, -1.0, 0.0)
}

/// Squared-length cutoff below which a normal is treated as zero.
pub const DEGENERATE_NORMAL_EPSILON: f64 = 1e-18;
