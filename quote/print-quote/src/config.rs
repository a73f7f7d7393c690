//! Pipeline configuration.

use mesh_printability::DEFAULT_OVERHANG_THRESHOLD;
use mesh_slice::SlicerConfig;
use quote_pricing::PricingSettings;
use serde::{Deserialize, Serialize};

/// Everything a shop configures, loadable from one JSON document.
///
/// ```json
/// {
///   "pricing": { "hourly_rate": "4.50", "materials": { "pla": "0.03" } },
///   "slicer": { "executable": "prusa-slicer", "timeout_secs": 60 },
///   "overhang_threshold": 50
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rates, shipping, and materials.
    pub pricing: PricingSettings,

    /// External slicer.
    pub slicer: SlicerConfig,

    /// Steepest self-supporting angle from vertical (degrees).
    pub overhang_threshold: f64,

    /// Pick the orientation needing least support when none is given.
    pub auto_orient: bool,

    /// Face directions tried by auto-orientation.
    pub face_candidates: usize,

    /// Turn on slicer supports when overhangs are found.
    pub auto_supports: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pricing: PricingSettings::default(),
            slicer: SlicerConfig::default(),
            overhang_threshold: DEFAULT_OVERHANG_THRESHOLD,
            auto_orient: false,
            face_candidates: 6,
            auto_supports: true,
        }
    }
}

impl PipelineConfig {
    /// Set the pricing settings.
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingSettings) -> Self {
        self.pricing = pricing;
        self
    }

    /// Set the slicer configuration.
    #[must_use]
    pub fn with_slicer(mut self, slicer: SlicerConfig) -> Self {
        self.slicer = slicer;
        self
    }

    /// Set the overhang threshold.
    #[must_use]
    pub const fn with_overhang_threshold(mut self, degrees: f64) -> Self {
        self.overhang_threshold = degrees;
        self
    }

    /// Enable or disable auto-orientation.
    #[must_use]
    pub const fn with_auto_orient(mut self, enabled: bool) -> Self {
        self.auto_orient = enabled;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!((config.overhang_threshold - 45.0).abs() < 1e-12);
        assert!(!config.auto_orient);
        assert!(config.auto_supports);
    }

    #[test]
    fn test_partial_json() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"slicer": {"timeout_secs": 30}, "overhang_threshold": 55, "auto_orient": true}"#,
        )
        .unwrap();
        assert!(config.auto_orient);
        assert!((config.overhang_threshold - 55.0).abs() < 1e-12);
        assert_eq!(config.slicer.executable.to_str(), Some("prusa-slicer"));
        assert!(config.pricing.materials.is_empty());
    }
}
