//! Slice settings and presets.

use serde::{Deserialize, Serialize};

use crate::error::{SliceError, SliceResult};

/// Per-item settings handed to the slicer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSettings {
    /// Layer height in mm.
    pub layer_height: f64,

    /// Infill density (0-100).
    pub infill_percent: u8,

    /// Generate support material.
    pub supports_enabled: bool,

    /// Slicer support pattern name (e.g. `rectilinear`, `honeycomb`).
    pub support_pattern: Option<String>,

    /// Overhang threshold for supports, in degrees.
    pub support_angle: Option<f64>,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            infill_percent: 20,
            supports_enabled: false,
            support_pattern: None,
            support_angle: None,
        }
    }
}

impl SliceSettings {
    /// Settings for fine detail.
    ///
    /// Uses 0.1mm layers and denser infill.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            layer_height: 0.1,
            infill_percent: 30,
            ..Default::default()
        }
    }

    /// Settings for fast drafts.
    ///
    /// Uses 0.3mm layers and sparse infill.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            layer_height: 0.3,
            infill_percent: 10,
            ..Default::default()
        }
    }

    /// Set layer height.
    #[must_use]
    pub const fn with_layer_height(mut self, height: f64) -> Self {
        self.layer_height = height;
        self
    }

    /// Set infill percentage.
    #[must_use]
    pub const fn with_infill(mut self, percent: u8) -> Self {
        self.infill_percent = percent;
        self
    }

    /// Enable supports with an optional pattern and threshold angle.
    #[must_use]
    pub fn with_supports(mut self, pattern: Option<&str>, angle: Option<f64>) -> Self {
        self.supports_enabled = true;
        self.support_pattern = pattern.map(str::to_owned);
        self.support_angle = angle;
        self
    }

    /// Check the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidSettings`] for a non-positive layer
    /// height, infill above 100%, or a support angle outside `[0, 90]`.
    pub fn validate(&self) -> SliceResult<()> {
        if !(self.layer_height.is_finite() && self.layer_height > 0.0) {
            return Err(SliceError::invalid_settings(format!(
                "layer height must be positive, got {}",
                self.layer_height
            )));
        }
        if self.infill_percent > 100 {
            return Err(SliceError::invalid_settings(format!(
                "infill must be at most 100%, got {}%",
                self.infill_percent
            )));
        }
        if let Some(angle) = self.support_angle {
            if !(0.0..=90.0).contains(&angle) {
                return Err(SliceError::invalid_settings(format!(
                    "support angle must be within 0-90°, got {angle}"
                )));
            }
        }
        if self
            .support_pattern
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(SliceError::invalid_settings("support pattern is empty"));
        }
        Ok(())
    }

    /// Slicer command-line arguments for these settings.
    ///
    /// Support options are only emitted when supports are enabled.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--export-gcode".to_string(),
            "--layer-height".to_string(),
            format_number(self.layer_height),
            "--fill-density".to_string(),
            format!("{}%", self.infill_percent),
        ];

        if self.supports_enabled {
            args.push("--support-material".to_string());
            if let Some(pattern) = &self.support_pattern {
                args.push("--support-material-pattern".to_string());
                args.push(pattern.trim().to_string());
            }
            if let Some(angle) = self.support_angle {
                args.push("--support-material-threshold".to_string());
                args.push(format_number(angle));
            }
        }

        args
    }
}

/// Shortest decimal form, so `0.2` stays `0.2` rather than `0.200000`.
fn format_number(value: f64) -> String {
    format!("{value}")
}
