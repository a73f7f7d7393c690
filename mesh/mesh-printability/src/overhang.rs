//! Overhang classification and support estimation.

use mesh_types::{down, Facet, Orientation, TriangleMesh};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PrintabilityError, PrintabilityResult};

/// Default maximum self-supporting angle, in degrees from vertical.
pub const DEFAULT_OVERHANG_THRESHOLD: f64 = 45.0;

/// Density used to turn support volume into grams (g/mm³).
pub const SUPPORT_DENSITY_G_PER_MM3: f64 = 0.00124;

/// Facets with every corner this close to the plate rest on it.
const PLATE_CONTACT_TOLERANCE: f64 = 1e-6;

/// World normals shorter than this are skipped.
const MIN_NORMAL_LENGTH: f64 = 1e-9;

/// Overhang assessment of one mesh in one orientation.
///
/// Recomputed whenever the orientation or threshold changes; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverhangResult {
    /// Indices of overhang facets, ascending.
    pub overhang_facets: Vec<usize>,

    /// Estimated support volume (mm³).
    pub support_volume: f64,

    /// Estimated support mass (g).
    pub support_weight: f64,

    /// Total area of overhang facets (mm²).
    pub contact_area: f64,

    /// Threshold the facets were classified with, after clamping.
    pub threshold_degrees: f64,
}

impl OverhangResult {
    fn empty(threshold_degrees: f64) -> Self {
        Self {
            overhang_facets: Vec::new(),
            support_volume: 0.0,
            support_weight: 0.0,
            contact_area: 0.0,
            threshold_degrees,
        }
    }

    /// Number of overhang facets.
    #[must_use]
    pub fn overhang_count(&self) -> usize {
        self.overhang_facets.len()
    }

    /// True when the part prints without supports.
    #[must_use]
    pub fn is_support_free(&self) -> bool {
        self.overhang_facets.is_empty()
    }

    /// One-line description for logs and staff notes.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_support_free() {
            return format!(
                "No overhangs at {:.0}° - no supports needed",
                self.threshold_degrees
            );
        }
        format!(
            "{} overhang facets at {:.0}°: {:.1} mm² contact, {:.1} mm³ support ({:.2} g)",
            self.overhang_count(),
            self.threshold_degrees,
            self.contact_area,
            self.support_volume,
            self.support_weight
        )
    }
}

/// Per-facet contribution, gathered in index order.
struct Contribution {
    index: usize,
    area: f64,
    volume: f64,
}

/// Classify overhang facets and estimate support material.
///
/// `threshold_degrees` is the steepest overhang that still prints without
/// support, measured from vertical. A facet is an overhang when its world
/// normal is within `90° - threshold` of straight down, so at 45° a facet
/// must face more than 45° downward. Raising the threshold never adds
/// facets. Values outside `[0, 90]` are clamped.
///
/// Facets resting on the build plate are never overhangs. Each overhang
/// facet adds its footprint on the plate times its mean corner height to
/// the support volume, and its area to the contact area.
///
/// # Errors
///
/// Returns [`PrintabilityError::InvalidThreshold`] for a NaN threshold.
///
/// # Example
///
/// ```
/// use mesh_printability::{analyze_overhangs, DEFAULT_OVERHANG_THRESHOLD};
/// use mesh_types::{Orientation, Point3, TriangleMesh};
///
/// let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
/// let result =
///     analyze_overhangs(&cube, &Orientation::identity(), DEFAULT_OVERHANG_THRESHOLD).unwrap();
///
/// assert!(result.is_support_free());
/// ```
pub fn analyze_overhangs(
    mesh: &TriangleMesh,
    orientation: &Orientation,
    threshold_degrees: f64,
) -> PrintabilityResult<OverhangResult> {
    let threshold = clamp_threshold(threshold_degrees)?;

    info!(
        facets = mesh.facet_count(),
        threshold, "analyzing overhangs"
    );

    let plate_y = mesh.oriented_bounds(orientation).min.y;
    if !plate_y.is_finite() {
        return Ok(OverhangResult::empty(threshold));
    }

    let limit = (90.0 - threshold).to_radians();
    let contributions: Vec<Contribution> = mesh
        .facets
        .par_iter()
        .enumerate()
        .filter_map(|(index, facet)| classify(index, facet, orientation, plate_y, limit))
        .collect();

    let mut result = OverhangResult::empty(threshold);
    result.overhang_facets.reserve(contributions.len());
    for c in &contributions {
        result.overhang_facets.push(c.index);
        result.contact_area += c.area;
        result.support_volume += c.volume;
    }
    result.support_weight = result.support_volume * SUPPORT_DENSITY_G_PER_MM3;

    debug!(
        overhangs = result.overhang_count(),
        plate_y, "classified facets"
    );
    info!(
        support_volume = result.support_volume,
        support_weight = result.support_weight,
        "overhang analysis complete"
    );

    Ok(result)
}

/// Validate and clamp a threshold to `[0, 90]`.
pub(crate) fn clamp_threshold(threshold_degrees: f64) -> PrintabilityResult<f64> {
    if threshold_degrees.is_nan() {
        return Err(PrintabilityError::InvalidThreshold {
            value: threshold_degrees,
        });
    }
    Ok(threshold_degrees.clamp(0.0, 90.0))
}

fn classify(
    index: usize,
    facet: &Facet,
    orientation: &Orientation,
    plate_y: f64,
    limit: f64,
) -> Option<Contribution> {
    let world = orientation.rotate_vector(&facet.normal);
    let length = world.norm();
    if length < MIN_NORMAL_LENGTH {
        return None;
    }

    let cos_to_down = (world.dot(&down()) / length).clamp(-1.0, 1.0);
    if cos_to_down.acos() >= limit {
        return None;
    }

    let heights = facet
        .vertices
        .map(|v| orientation.rotate_point(&v).y - plate_y);
    if heights.iter().all(|h| *h <= PLATE_CONTACT_TOLERANCE) {
        return None;
    }

    let area = facet.area();
    let footprint = area * cos_to_down.abs();
    let mean_height = heights.iter().sum::<f64>() / 3.0;

    Some(Contribution {
        index,
        area,
        volume: footprint * mean_height,
    })
}
