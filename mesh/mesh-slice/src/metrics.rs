//! Slicer estimates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Print time used when the slicer gives no answer (seconds).
pub const FALLBACK_TIME_SECONDS: f64 = 3600.0;

/// Material used when the slicer gives no answer (grams).
pub const FALLBACK_MATERIAL_GRAMS: f64 = 80.0;

/// Time and material estimate for one mesh with one set of settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceMetrics {
    /// Estimated print time (s).
    pub time_seconds: f64,

    /// Estimated filament mass (g).
    pub material_grams: f64,

    /// Generated G-code, when the slicer succeeded.
    pub toolpath: Option<PathBuf>,

    /// True when these are stand-in values rather than slicer output.
    pub fallback: bool,
}

impl SliceMetrics {
    /// Metrics from a successful slicer run.
    #[must_use]
    pub const fn sliced(time_seconds: f64, material_grams: f64, toolpath: Option<PathBuf>) -> Self {
        Self {
            time_seconds,
            material_grams,
            toolpath,
            fallback: false,
        }
    }

    /// Default stand-in values (one hour, 80 g).
    #[must_use]
    pub const fn fallback() -> Self {
        Self::fallback_with(FALLBACK_TIME_SECONDS, FALLBACK_MATERIAL_GRAMS)
    }

    /// Stand-in values with custom figures.
    #[must_use]
    pub const fn fallback_with(time_seconds: f64, material_grams: f64) -> Self {
        Self {
            time_seconds,
            material_grams,
            toolpath: None,
            fallback: true,
        }
    }

    /// Print time in hours.
    #[must_use]
    pub fn hours(&self) -> f64 {
        self.time_seconds / 3600.0
    }

    /// Human-readable print time, e.g. `1d 2h 3m`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn formatted_time(&self) -> String {
        let total = self.time_seconds.max(0.0).round() as u64;
        let (days, rem) = (total / 86_400, total % 86_400);
        let (hours, rem) = (rem / 3600, rem % 3600);
        let (minutes, seconds) = (rem / 60, rem % 60);

        if days > 0 {
            format!("{days}d {hours}h {minutes}m")
        } else if hours > 0 {
            format!("{hours}h {minutes}m")
        } else if minutes > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{seconds}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fallback_values() {
        let metrics = SliceMetrics::fallback();
        assert!(metrics.fallback);
        assert!(metrics.toolpath.is_none());
        assert_relative_eq!(metrics.time_seconds, 3600.0);
        assert_relative_eq!(metrics.material_grams, 80.0);
        assert_relative_eq!(metrics.hours(), 1.0);
    }

    #[test]
    fn test_sliced_is_not_fallback() {
        let metrics = SliceMetrics::sliced(90.0, 2.5, None);
        assert!(!metrics.fallback);
    }

    #[test]
    fn test_formatted_time() {
        assert_eq!(SliceMetrics::sliced(93_784.0, 0.0, None).formatted_time(), "1d 2h 3m");
        assert_eq!(SliceMetrics::sliced(3_723.0, 0.0, None).formatted_time(), "1h 2m");
        assert_eq!(SliceMetrics::sliced(125.0, 0.0, None).formatted_time(), "2m 5s");
        assert_eq!(SliceMetrics::sliced(7.0, 0.0, None).formatted_time(), "7s");
    }
}
