//! Bake an orientation into geometry for downstream tools.

use mesh_types::{Facet, Orientation, TriangleMesh, Vector3};
use tracing::debug;

/// Rotated copy of `mesh` in world space.
///
/// Vertices and stored normals are both rotated, so facet indices and
/// normals stay consistent with the source.
#[must_use]
pub fn apply_orientation(mesh: &TriangleMesh, orientation: &Orientation) -> TriangleMesh {
    TriangleMesh::from_facets(
        mesh.facets
            .iter()
            .map(|facet| Facet {
                vertices: facet.vertices.map(|v| orientation.rotate_point(&v)),
                normal: orientation.rotate_vector(&facet.normal),
            })
            .collect(),
    )
}

/// Translate `mesh` so its lowest point sits at `y = 0`.
///
/// X and Z are left alone; slicers re-center parts on their own bed.
/// An empty mesh is returned unchanged.
#[must_use]
pub fn place_on_build_plate(mesh: &TriangleMesh) -> TriangleMesh {
    let bounds = mesh.bounds();
    if bounds.is_empty() {
        return mesh.clone();
    }

    let lift = Vector3::new(0.0, -bounds.min.y, 0.0);
    debug!(lift = lift.y, "placing mesh on build plate");

    TriangleMesh::from_facets(
        mesh.facets
            .iter()
            .map(|facet| Facet {
                vertices: facet.vertices.map(|v| v + lift),
                normal: facet.normal,
            })
            .collect(),
    )
}

/// Rotate then drop onto the plate, still in the Y-up world frame.
#[must_use]
pub fn oriented_for_printing(mesh: &TriangleMesh, orientation: &Orientation) -> TriangleMesh {
    place_on_build_plate(&apply_orientation(mesh, orientation))
}

/// Re-express a Y-up mesh in the Z-up frame slicers use.
///
/// A quarter turn about X: world height becomes Z, and a mesh resting at
/// `y = 0` rests at `z = 0` afterwards.
#[must_use]
pub fn to_slicer_frame(mesh: &TriangleMesh) -> TriangleMesh {
    let quarter_turn = Orientation::from_axis_angle(&Vector3::x(), std::f64::consts::FRAC_PI_2);
    apply_orientation(mesh, &quarter_turn)
}
