//! Upload to priced quote.

use mesh_orient::{oriented_for_printing, to_slicer_frame};
use mesh_printability::{
    spawn_overhang_job, suggest_orientation, OverhangJob, OverhangResult,
};
use mesh_slice::{SliceMetrics, SliceSettings, SlicingEstimator};
use mesh_types::{Orientation, TriangleMesh};
use quote_pricing::{PricedQuote, QuickOrderItem, QuickOrderPricer, QuoteRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// What the shop knows about one model before pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Opaque id of the upload.
    pub mesh_id: String,

    /// Triangle count.
    pub facet_count: usize,

    /// Build orientation used.
    pub orientation: Orientation,

    /// Overhangs in that orientation.
    pub overhangs: OverhangResult,

    /// Settings the model was sliced with.
    pub settings: SliceSettings,

    /// Slicer estimate.
    pub metrics: SliceMetrics,
}

impl Assessment {
    /// Support mass per copy (g) billed on top of the slicer figure.
    ///
    /// Zero when supports are off. Also zero when the slicer really ran
    /// with supports, since its filament figure already includes them;
    /// the overhang estimate is billed only alongside fallback metrics.
    #[must_use]
    pub fn support_grams(&self) -> f64 {
        if self.settings.supports_enabled && self.metrics.fallback {
            self.overhangs.support_weight
        } else {
            0.0
        }
    }

    /// Order line for this model.
    #[must_use]
    pub fn to_item(&self, material: &str, support_material: Option<&str>, quantity: u32) -> QuickOrderItem {
        let item = QuickOrderItem::new(self.mesh_id.clone(), material, self.metrics.clone())
            .with_settings(self.settings.clone())
            .with_support_grams(self.support_grams())
            .with_quantity(quantity);
        match support_material {
            Some(id) => item.with_support_material(id),
            None => item,
        }
    }
}

/// Load, orient, analyze, slice, and price.
///
/// Holds configuration only; every call works on its own values.
#[derive(Debug, Clone, Default)]
pub struct QuotePipeline {
    config: PipelineConfig,
    estimator: SlicingEstimator,
}

impl QuotePipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let estimator = SlicingEstimator::new(config.slicer.clone());
        Self { config, estimator }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse an upload.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Load`](crate::PipelineError::Load) when the
    /// bytes are not a usable STL or 3MF model.
    pub fn load(&self, bytes: &[u8], filename: &str) -> PipelineResult<TriangleMesh> {
        Ok(mesh_io::load_model(bytes, filename)?)
    }

    /// Assess a model for printing.
    ///
    /// With no `orientation` the model is auto-oriented when configured,
    /// otherwise printed as uploaded. Overhang analysis runs on a worker
    /// thread; the slicer sees the placed model in its Z-up frame.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Overhang`](crate::PipelineError::Overhang)
    /// for a NaN threshold or a failed worker. Slicer failures produce
    /// fallback metrics instead.
    pub fn assess(
        &self,
        mesh_id: &str,
        mesh: &TriangleMesh,
        orientation: Option<Orientation>,
        settings: &SliceSettings,
    ) -> PipelineResult<Assessment> {
        let threshold = self.config.overhang_threshold;
        info!(mesh = mesh_id, facets = mesh.facet_count(), "assessing model");

        let (orientation, overhangs) = match orientation {
            Some(orientation) => {
                let job = OverhangJob::new(mesh, orientation, threshold);
                (orientation, spawn_overhang_job(&job)?.wait()?)
            }
            None if self.config.auto_orient => {
                let suggestion =
                    suggest_orientation(mesh, threshold, self.config.face_candidates)?;
                (suggestion.orientation, suggestion.overhangs)
            }
            None => {
                let job = OverhangJob::new(mesh, Orientation::identity(), threshold);
                (Orientation::identity(), spawn_overhang_job(&job)?.wait()?)
            }
        };
        debug!(summary = %overhangs.summary(), "overhangs");

        let mut settings = settings.clone();
        if self.config.auto_supports && !overhangs.is_support_free() && !settings.supports_enabled {
            debug!("enabling slicer supports for overhangs");
            settings.supports_enabled = true;
            settings.support_angle = settings.support_angle.or(Some(overhangs.threshold_degrees));
        }

        let placed = to_slicer_frame(&oriented_for_printing(mesh, &orientation));
        let metrics = self.estimator.estimate_mesh(&placed, &settings);

        info!(
            mesh = mesh_id,
            time_seconds = metrics.time_seconds,
            material_grams = metrics.material_grams,
            fallback = metrics.fallback,
            support_grams = overhangs.support_weight,
            "model assessed"
        );

        Ok(Assessment {
            mesh_id: mesh_id.to_string(),
            facet_count: mesh.facet_count(),
            orientation,
            overhangs,
            settings,
            metrics,
        })
    }

    /// Load and assess an upload in one step.
    ///
    /// # Errors
    ///
    /// As for [`load`](Self::load) and [`assess`](Self::assess).
    pub fn assess_upload(
        &self,
        mesh_id: &str,
        bytes: &[u8],
        filename: &str,
        settings: &SliceSettings,
    ) -> PipelineResult<Assessment> {
        let mesh = self.load(bytes, filename)?;
        self.assess(mesh_id, &mesh, None, settings)
    }

    /// Price a request with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Pricing`](crate::PipelineError::Pricing) for
    /// an empty order, an unknown material, or an invalid item.
    pub fn quote(&self, request: &QuoteRequest) -> PipelineResult<PricedQuote> {
        Ok(QuickOrderPricer::new(&self.config.pricing).price_request(request)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_slice::SlicerConfig;
    use mesh_types::{Point3, Vector3};

    fn offline() -> QuotePipeline {
        QuotePipeline::new(
            PipelineConfig::default().with_slicer(SlicerConfig::new("/nonexistent/slicer")),
        )
    }

    fn cube() -> TriangleMesh {
        TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(10.0, 10.0, 10.0))
    }

    #[test]
    fn test_flat_cube_needs_no_supports() {
        let assessment = offline()
            .assess("cube", &cube(), None, &SliceSettings::default())
            .unwrap();
        assert!(assessment.overhangs.is_support_free());
        assert!(!assessment.settings.supports_enabled);
        assert!(assessment.metrics.fallback);
        assert_eq!(assessment.facet_count, 12);
    }

    #[test]
    fn test_overhangs_enable_supports() {
        let tipped = Orientation::from_axis_angle(&Vector3::z(), 30f64.to_radians());
        let assessment = offline()
            .assess("cube", &cube(), Some(tipped), &SliceSettings::default())
            .unwrap();
        assert!(!assessment.overhangs.is_support_free());
        assert!(assessment.settings.supports_enabled);
        assert_eq!(assessment.settings.support_angle, Some(45.0));
        assert!(assessment.support_grams() > 0.0);
    }

    #[test]
    fn test_item_carries_support_grams() {
        let tipped = Orientation::from_axis_angle(&Vector3::z(), 30f64.to_radians());
        let assessment = offline()
            .assess("cube", &cube(), Some(tipped), &SliceSettings::default())
            .unwrap();
        let item = assessment.to_item("pla", Some("pva"), 2);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.support_material.as_deref(), Some("pva"));
        assert!((item.support_grams - assessment.overhangs.support_weight).abs() < 1e-12);
    }

    #[test]
    fn test_sliced_supports_are_not_billed_twice() {
        let tipped = Orientation::from_axis_angle(&Vector3::z(), 30f64.to_radians());
        let mut assessment = offline()
            .assess("cube", &cube(), Some(tipped), &SliceSettings::default())
            .unwrap();
        assert!(assessment.overhangs.support_weight > 0.0);

        assessment.metrics = SliceMetrics::sliced(3600.0, 30.0, None);
        assert!(assessment.support_grams().abs() < f64::EPSILON);
        let item = assessment.to_item("pla", Some("pva"), 1);
        assert!(item.support_grams.abs() < f64::EPSILON);
        assert!((item.metrics.material_grams - 30.0).abs() < 1e-12);
    }
}
