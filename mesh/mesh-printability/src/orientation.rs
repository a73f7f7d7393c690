//! Suggest a build orientation that needs the least support.
//!
//! Candidates are the six axis-aligned placements, every large face laid on
//! the plate, and a handful of diagonal turns. Each candidate is scored by
//! a full overhang analysis.

use mesh_orient::align_face_to_plate;
use mesh_types::{Orientation, TriangleMesh, Vector3};
use nalgebra::Unit;
use rayon::prelude::*;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use tracing::{debug, info};

use crate::error::PrintabilityResult;
use crate::overhang::{analyze_overhangs, OverhangResult};

/// Weight of contact area against support volume when scoring.
///
/// Contact area leaves support scars on the finished part, so it is counted
/// even when the volume underneath is small.
const CONTACT_AREA_WEIGHT: f64 = 0.1;

/// Normals closer than this (cosine) are treated as the same face direction.
const SAME_DIRECTION_COS: f64 = 0.9999;

/// Best orientation found and what it costs.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationSuggestion {
    /// Recommended orientation.
    pub orientation: Orientation,

    /// Overhang assessment in that orientation.
    pub overhangs: OverhangResult,

    /// Score (lower is better).
    pub score: f64,

    /// Number of candidates evaluated.
    pub candidates: usize,
}

/// Score an assessment: support volume plus weighted contact area.
#[must_use]
pub fn orientation_score(overhangs: &OverhangResult) -> f64 {
    overhangs.support_volume + overhangs.contact_area * CONTACT_AREA_WEIGHT
}

/// Find the candidate orientation that needs the least support.
///
/// `face_candidates` caps how many distinct face directions (largest total
/// area first) are tried face-down. The identity orientation is always
/// evaluated first and wins ties.
///
/// # Errors
///
/// Returns [`PrintabilityError::InvalidThreshold`](crate::PrintabilityError)
/// for a NaN threshold.
pub fn suggest_orientation(
    mesh: &TriangleMesh,
    threshold_degrees: f64,
    face_candidates: usize,
) -> PrintabilityResult<OrientationSuggestion> {
    let candidates = candidate_orientations(mesh, face_candidates);
    info!(
        facets = mesh.facet_count(),
        candidates = candidates.len(),
        "searching build orientations"
    );

    let evaluated: Vec<(Orientation, OverhangResult)> = candidates
        .par_iter()
        .map(|o| analyze_overhangs(mesh, o, threshold_degrees).map(|r| (*o, r)))
        .collect::<PrintabilityResult<_>>()?;

    let best = evaluated
        .into_iter()
        .map(|(orientation, overhangs)| {
            let score = orientation_score(&overhangs);
            debug!(angle = orientation.angle().to_degrees(), score, "candidate");
            (score, orientation, overhangs)
        })
        // First minimum wins, so identity is kept on ties.
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let Some((score, orientation, overhangs)) = best else {
        return Ok(OrientationSuggestion {
            orientation: Orientation::identity(),
            overhangs: analyze_overhangs(mesh, &Orientation::identity(), threshold_degrees)?,
            score: 0.0,
            candidates: 0,
        });
    };

    let suggestion = OrientationSuggestion {
        orientation,
        overhangs,
        score,
        candidates: candidates.len(),
    };

    info!(
        score = suggestion.score,
        overhangs = suggestion.overhangs.overhang_count(),
        "suggested orientation"
    );
    Ok(suggestion)
}

fn candidate_orientations(mesh: &TriangleMesh, face_candidates: usize) -> Vec<Orientation> {
    let mut out = vec![Orientation::identity()];

    // Quarter and half turns about X and Z cover all six axis placements.
    for (axis, angle) in [
        (Vector3::x(), FRAC_PI_2),
        (Vector3::x(), PI),
        (Vector3::x(), -FRAC_PI_2),
        (Vector3::z(), FRAC_PI_2),
        (Vector3::z(), -FRAC_PI_2),
    ] {
        out.push(Orientation::from_axis_angle(&axis, angle));
    }

    for direction in dominant_face_directions(mesh, face_candidates) {
        out.push(align_face_to_plate(&direction, &Orientation::identity()));
    }

    // Diagonal turns catch parts that print best on an edge.
    for axis in [Vector3::x(), Vector3::z()] {
        for angle in [FRAC_PI_4, -FRAC_PI_4, 3.0 * FRAC_PI_4, -3.0 * FRAC_PI_4] {
            out.push(Orientation::from_axis_angle(&axis, angle));
        }
    }

    out
}

/// Face directions with the largest total area, merged when nearly equal.
fn dominant_face_directions(mesh: &TriangleMesh, limit: usize) -> Vec<Vector3<f64>> {
    let mut groups: Vec<(Unit<Vector3<f64>>, f64)> = Vec::new();
    for facet in mesh.facets.iter().filter(|f| !f.is_degenerate()) {
        let normal = Unit::new_normalize(facet.normal);
        let area = facet.area();
        match groups
            .iter_mut()
            .find(|(n, _)| n.dot(&normal) > SAME_DIRECTION_COS)
        {
            Some((_, total)) => *total += area,
            None => groups.push((normal, area)),
        }
    }

    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups
        .into_iter()
        .take(limit)
        .map(|(n, _)| n.into_inner())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::Point3;

    /// A T-shape standing on its stem: the bar overhangs.
    fn tee() -> TriangleMesh {
        let mut mesh =
            TriangleMesh::axis_aligned_box(Point3::new(8.0, 0.0, 0.0), Point3::new(12.0, 16.0, 4.0));
        let bar =
            TriangleMesh::axis_aligned_box(Point3::new(0.0, 16.0, 0.0), Point3::new(20.0, 20.0, 4.0));
        mesh.facets.extend(bar.facets);
        mesh
    }

    #[test]
    fn flat_box_keeps_identity() {
        let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
        let suggestion = suggest_orientation(&cube, 45.0, 6).unwrap();
        assert!(suggestion.overhangs.is_support_free());
        assert_eq!(suggestion.orientation, Orientation::identity());
    }

    #[test]
    fn upside_down_tee_is_improved() {
        let mesh = tee();
        let standing = analyze_overhangs(&mesh, &Orientation::identity(), 45.0).unwrap();
        assert!(!standing.is_support_free());

        let suggestion = suggest_orientation(&mesh, 45.0, 6).unwrap();
        assert!(suggestion.score < orientation_score(&standing));
        // Lying on its 4 mm face the tee is a flat extrusion.
        assert!(suggestion.overhangs.is_support_free());
    }

    #[test]
    fn dominant_directions_merge_coplanar_facets() {
        let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
        let directions = dominant_face_directions(&cube, 10);
        assert_eq!(directions.len(), 6);
    }

    #[test]
    fn candidate_count_is_reported() {
        let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let suggestion = suggest_orientation(&cube, 45.0, 2).unwrap();
        assert_eq!(suggestion.candidates, 1 + 5 + 2 + 8);
    }
}
