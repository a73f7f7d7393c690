//! Face picking by ray cast.

use mesh_types::{Facet, Point3, TriangleMesh, Vector3};
use tracing::debug;

use crate::error::{OrientError, OrientResult};

/// Parallel-ray and self-hit tolerance for intersection tests.
const RAY_EPSILON: f64 = 1e-12;

/// The facet nearest to a ray origin along the ray.
///
/// All quantities are in the mesh's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePick {
    /// Index of the hit facet.
    pub facet: usize,
    /// Stored normal of the hit facet.
    pub normal: Vector3<f64>,
    /// Hit position.
    pub point: Point3<f64>,
    /// Distance along the (normalized) ray.
    pub distance: f64,
}

/// Find the first facet hit by a ray.
///
/// Facets are hit from either side so a click on an inward-wound face still
/// resolves. Degenerate facets are never hit. Returns `None` when nothing is
/// hit or the ray direction is unusable.
///
/// # Example
///
/// ```
/// use mesh_orient::pick_face;
/// use mesh_types::{Point3, TriangleMesh, Vector3};
///
/// let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
///
/// // Looking down at the top face.
/// let hit = pick_face(&cube, &Point3::new(5.0, 50.0, 5.0), &Vector3::new(0.0, -1.0, 0.0))
///     .unwrap();
///
/// assert!((hit.normal.y - 1.0).abs() < 1e-12);
/// assert!((hit.distance - 40.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn pick_face(
    mesh: &TriangleMesh,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Option<FacePick> {
    pick_face_checked(mesh, origin, direction).ok().flatten()
}

/// Like [`pick_face`], but reports why a ray could not be cast.
///
/// # Errors
///
/// Returns an error for a zero or non-finite direction, a non-finite origin,
/// or an empty mesh.
pub fn pick_face_checked(
    mesh: &TriangleMesh,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> OrientResult<Option<FacePick>> {
    if mesh.is_empty() {
        return Err(OrientError::EmptyMesh);
    }
    if !origin.iter().all(|c| c.is_finite()) {
        return Err(OrientError::InvalidRayOrigin);
    }
    let length = direction.norm();
    if !length.is_finite() || length < RAY_EPSILON {
        return Err(OrientError::InvalidRayDirection {
            x: direction.x,
            y: direction.y,
            z: direction.z,
        });
    }
    let dir = direction / length;

    let nearest = mesh
        .facets
        .iter()
        .enumerate()
        .filter(|(_, facet)| !facet.is_degenerate())
        .filter_map(|(i, facet)| ray_facet_distance(origin, &dir, facet).map(|t| (i, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let pick = nearest.map(|(facet, distance)| FacePick {
        facet,
        normal: mesh.facets[facet].normal,
        point: origin + dir * distance,
        distance,
    });

    debug!(hit = pick.map(|p| p.facet), "face pick");
    Ok(pick)
}

/// Möller–Trumbore ray-triangle intersection algorithm.
#[allow(clippy::many_single_char_names)]
fn ray_facet_distance(origin: &Point3<f64>, direction: &Vector3<f64>, facet: &Facet) -> Option<f64> {
    let [v0, v1, v2] = facet.vertices;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Ray is parallel to triangle
    if a.abs() < RAY_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);

    if t > RAY_EPSILON { Some(t) } else { None }
}
