//! Build orientation as a unit quaternion.

use nalgebra::{Point3, Quaternion, Unit, UnitQuaternion, Vector3};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Components whose norm is this close to one are kept as given.
const UNIT_TOLERANCE: f64 = 1e-12;

/// Errors raised when constructing an [`Orientation`] from raw components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrientationError {
    /// The four components have (near) zero length or are not finite.
    #[error("quaternion [{w}, {x}, {y}, {z}] cannot be normalized")]
    NotNormalizable {
        /// Scalar part.
        w: f64,
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
        /// Z component.
        z: f64,
    },
}

/// A rotation applied to a mesh's local coordinates before "down" is
/// evaluated.
///
/// Orientations are composed, never edited: every operation returns a new
/// value. Serialized as `[w, x, y, z]`.
///
/// # Example
///
/// ```
/// use mesh_types::{Orientation, Vector3};
///
/// let quarter_turn = Orientation::from_axis_angle(&Vector3::x(), std::f64::consts::FRAC_PI_2);
/// let up = quarter_turn.rotate_vector(&Vector3::y());
/// assert!((up.z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "[f64; 4]", try_from = "[f64; 4]")
)]
pub struct Orientation(UnitQuaternion<f64>);

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    /// The orientation that leaves the mesh as uploaded.
    #[must_use]
    pub fn identity() -> Self {
        Self(UnitQuaternion::identity())
    }

    /// Wrap an existing unit quaternion, re-normalizing it.
    #[must_use]
    pub fn from_quaternion(rotation: UnitQuaternion<f64>) -> Self {
        let mut rotation = rotation;
        rotation.renormalize();
        Self(rotation)
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// A zero axis yields the identity.
    #[must_use]
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Self {
        Unit::try_new(*axis, f64::EPSILON)
            .map_or_else(Self::identity, |axis| {
                Self(UnitQuaternion::from_axis_angle(&axis, angle))
            })
    }

    /// Build from `[w, x, y, z]` components, normalizing them unless they
    /// are already unit length.
    pub fn from_wxyz(components: [f64; 4]) -> Result<Self, OrientationError> {
        let [w, x, y, z] = components;
        let q = Quaternion::new(w, x, y, z);
        let norm = q.norm();
        if !norm.is_finite() || norm < f64::EPSILON {
            return Err(OrientationError::NotNormalizable { w, x, y, z });
        }
        // Leave already-unit input bit-exact so serialized orientations
        // round-trip unchanged.
        if (norm - 1.0).abs() <= UNIT_TOLERANCE {
            return Ok(Self(UnitQuaternion::new_unchecked(q)));
        }
        Ok(Self(UnitQuaternion::from_quaternion(q)))
    }

    /// Components as `[w, x, y, z]`.
    #[must_use]
    pub fn to_wxyz(&self) -> [f64; 4] {
        let q = self.0.quaternion();
        [q.w, q.i, q.j, q.k]
    }

    /// The underlying unit quaternion.
    #[inline]
    #[must_use]
    pub const fn as_quaternion(&self) -> &UnitQuaternion<f64> {
        &self.0
    }

    /// Rotate a local-space direction into world space.
    #[inline]
    #[must_use]
    pub fn rotate_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    /// Rotate a local-space position into world space (about the origin).
    #[inline]
    #[must_use]
    pub fn rotate_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.0 * p
    }

    /// Apply `next` after this orientation.
    ///
    /// The result is `next * self`, re-normalized so repeated composition
    /// does not drift away from unit length.
    #[must_use]
    pub fn then(&self, next: &UnitQuaternion<f64>) -> Self {
        Self::from_quaternion(next * self.0)
    }

    /// Angle of the rotation in radians, in `[0, π]`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.0.angle()
    }
}

impl From<Orientation> for [f64; 4] {
    fn from(orientation: Orientation) -> Self {
        orientation.to_wxyz()
    }
}

impl TryFrom<[f64; 4]> for Orientation {
    type Error = OrientationError;

    fn try_from(components: [f64; 4]) -> Result<Self, Self::Error> {
        Self::from_wxyz(components)
    }
}
