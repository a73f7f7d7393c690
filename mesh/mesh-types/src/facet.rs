//! Single triangle of a [`TriangleMesh`](crate::TriangleMesh).

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::DEGENERATE_NORMAL_EPSILON;

/// Tolerance used when deciding whether a supplied normal can be trusted.
const SUPPLIED_NORMAL_TOLERANCE: f64 = 1e-3;

/// A triangle with concrete corner positions and a unit face normal.
///
/// The normal always agrees with the counter-clockwise winding of
/// `vertices`. Degenerate triangles (collinear or coincident corners) keep a
/// zero normal rather than being dropped, so facet indices stay stable.
///
/// # Example
///
/// ```
/// use mesh_types::{Facet, Point3};
///
/// let facet = Facet::new([
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(3.0, 0.0, 0.0),
///     Point3::new(0.0, 4.0, 0.0),
/// ]);
///
/// assert!((facet.area() - 6.0).abs() < 1e-10);
/// assert!((facet.normal.z - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Facet {
    /// Corner positions in winding order.
    pub vertices: [Point3<f64>; 3],
    /// Unit face normal, or zero for a degenerate facet.
    pub normal: Vector3<f64>,
}

impl Facet {
    /// Build a facet, computing its normal from the winding.
    #[must_use]
    pub fn new(vertices: [Point3<f64>; 3]) -> Self {
        let normal = unit_normal(&vertices).unwrap_or_else(Vector3::zeros);
        Self { vertices, normal }
    }

    /// Build a facet from a normal stored alongside the corners in a file.
    ///
    /// File formats often carry stale or zeroed normals. The supplied normal
    /// is kept only when it is unit length and points the same way as the
    /// winding; otherwise it is recomputed.
    #[must_use]
    pub fn with_supplied_normal(vertices: [Point3<f64>; 3], supplied: Vector3<f64>) -> Self {
        let Some(computed) = unit_normal(&vertices) else {
            return Self {
                vertices,
                normal: Vector3::zeros(),
            };
        };

        let trusted = (supplied.norm() - 1.0).abs() < SUPPLIED_NORMAL_TOLERANCE
            && supplied.dot(&computed) > 1.0 - SUPPLIED_NORMAL_TOLERANCE;

        Self {
            vertices,
            normal: if trusted { supplied } else { computed },
        }
    }

    /// Cross product of the two edges leaving the first corner.
    ///
    /// Its magnitude is twice the facet area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Check whether the facet has no usable normal.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.normal.norm_squared() < DEGENERATE_NORMAL_EPSILON
    }

    /// Area of the facet.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Centroid of the three corners.
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        let [v0, v1, v2] = self.vertices;
        Point3::from((v0.coords + v1.coords + v2.coords) / 3.0)
    }
}

fn unit_normal(vertices: &[Point3<f64>; 3]) -> Option<Vector3<f64>> {
    let [v0, v1, v2] = vertices;
    let n = (v1 - v0).cross(&(v2 - v0));
    let len_sq = n.norm_squared();
    if len_sq > DEGENERATE_NORMAL_EPSILON {
        Some(n / len_sq.sqrt())
    } else {
        None
    }
}
