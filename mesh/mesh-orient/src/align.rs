//! Rotate a picked face flat onto the build plate.

use mesh_types::{down, Orientation, UnitQuaternion, Vector3};
use nalgebra::Unit;
use std::f64::consts::PI;
use tracing::debug;

/// World-space normals shorter than this are treated as missing.
pub const MIN_NORMAL_LENGTH: f64 = 1e-9;

/// Compose a rotation onto `current` so the face with `local_normal` points
/// straight down.
///
/// The local normal is taken into world space by `current`. The shortest-arc
/// rotation from that direction onto `(0, -1, 0)` is left-multiplied onto
/// `current` and the result re-normalized. A face pointing straight up gets
/// a half turn about an axis perpendicular to its normal.
///
/// A normal whose world length is below [`MIN_NORMAL_LENGTH`] (a degenerate
/// facet) leaves `current` unchanged.
///
/// # Example
///
/// ```
/// use mesh_orient::align_face_to_plate;
/// use mesh_types::{Orientation, Vector3};
///
/// let side = Vector3::new(1.0, 0.0, 0.0);
/// let placed = align_face_to_plate(&side, &Orientation::identity());
///
/// let world = placed.rotate_vector(&side);
/// assert!((world.y + 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn align_face_to_plate(local_normal: &Vector3<f64>, current: &Orientation) -> Orientation {
    let world = current.rotate_vector(local_normal);
    let Some(world) = Unit::try_new(world, MIN_NORMAL_LENGTH) else {
        debug!("picked face has no usable normal; orientation unchanged");
        return *current;
    };

    let target = down();
    let step = UnitQuaternion::rotation_between(world.as_ref(), &target)
        .unwrap_or_else(|| half_turn_about_perpendicular(&world));

    debug!(
        step_degrees = step.angle().to_degrees(),
        "aligned face to build plate"
    );
    current.then(&step)
}

/// Rotation by π about some axis perpendicular to `n`.
fn half_turn_about_perpendicular(n: &Unit<Vector3<f64>>) -> UnitQuaternion<f64> {
    // Cross with whichever basis vector is least aligned with n.
    let basis = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::z()
    };
    let axis = Unit::new_normalize(n.cross(&basis));
    UnitQuaternion::from_axis_angle(&axis, PI)
}
