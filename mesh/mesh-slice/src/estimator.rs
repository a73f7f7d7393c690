//! Slicer-backed print estimates with a fixed fallback.

use std::fs;
use std::path::{Path, PathBuf};

use mesh_types::TriangleMesh;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::SlicerConfig;
use crate::error::{SliceError, SliceResult};
use crate::metrics::SliceMetrics;
use crate::parse::parse_slicer_output;
use crate::runner::run_slicer;
use crate::settings::SliceSettings;

/// Runs the external slicer and turns its output into [`SliceMetrics`].
///
/// Every call is independent: a fresh output file, one slicer process, no
/// retries. Failures never reach the caller of [`estimate`](Self::estimate);
/// they become fallback metrics flagged with `fallback = true`.
#[derive(Debug, Clone, Default)]
pub struct SlicingEstimator {
    config: SlicerConfig,
}

impl SlicingEstimator {
    /// Create an estimator with the given slicer configuration.
    #[must_use]
    pub const fn new(config: SlicerConfig) -> Self {
        Self { config }
    }

    /// The slicer configuration.
    #[must_use]
    pub const fn config(&self) -> &SlicerConfig {
        &self.config
    }

    /// Fallback metrics for this configuration.
    #[must_use]
    pub const fn fallback(&self) -> SliceMetrics {
        SliceMetrics::fallback_with(self.config.fallback_time_seconds, self.config.fallback_grams)
    }

    /// Estimate print time and material for a mesh file.
    ///
    /// Spawn failures, non-zero exits, timeouts and unparseable output all
    /// produce [`fallback`](Self::fallback) metrics, logged at `warn`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_slice::{SliceSettings, SlicerConfig, SlicingEstimator};
    /// use std::path::Path;
    ///
    /// let estimator = SlicingEstimator::new(SlicerConfig::new("/nonexistent/slicer"));
    /// let metrics = estimator.estimate(Path::new("part.stl"), &SliceSettings::default());
    ///
    /// assert!(metrics.fallback);
    /// assert_eq!(metrics.time_seconds, 3600.0);
    /// ```
    #[must_use]
    pub fn estimate(&self, mesh_path: &Path, settings: &SliceSettings) -> SliceMetrics {
        match self.try_estimate(mesh_path, settings) {
            Ok(metrics) => metrics,
            Err(error) => {
                warn!(
                    mesh = %mesh_path.display(),
                    error = %error,
                    "slicing failed, using fallback estimate"
                );
                self.fallback()
            }
        }
    }

    /// Estimate for an in-memory mesh.
    ///
    /// The mesh is written as binary STL into a scratch directory that is
    /// removed when the call returns.
    #[must_use]
    pub fn estimate_mesh(&self, mesh: &TriangleMesh, settings: &SliceSettings) -> SliceMetrics {
        match self.try_estimate_mesh(mesh, settings) {
            Ok(metrics) => metrics,
            Err(error) => {
                warn!(
                    facets = mesh.facet_count(),
                    error = %error,
                    "slicing failed, using fallback estimate"
                );
                self.fallback()
            }
        }
    }

    /// Like [`estimate_mesh`](Self::estimate_mesh) but reports failures.
    pub fn try_estimate_mesh(
        &self,
        mesh: &TriangleMesh,
        settings: &SliceSettings,
    ) -> SliceResult<SliceMetrics> {
        let scratch = tempfile::Builder::new()
            .prefix("slice-")
            .tempdir()
            .map_err(|e| SliceError::io(std::env::temp_dir(), e))?;
        let mesh_path = scratch.path().join("model.stl");
        fs::write(&mesh_path, mesh_io::save_stl_binary(mesh))
            .map_err(|e| SliceError::io(&mesh_path, e))?;

        self.try_estimate(&mesh_path, settings)
    }

    /// Run the slicer once and report any failure.
    ///
    /// # Errors
    ///
    /// Returns the [`SliceError`] that [`estimate`](Self::estimate) would
    /// have replaced with fallback metrics.
    pub fn try_estimate(
        &self,
        mesh_path: &Path,
        settings: &SliceSettings,
    ) -> SliceResult<SliceMetrics> {
        settings.validate()?;
        if !mesh_path.is_file() {
            return Err(SliceError::MeshNotFound {
                path: mesh_path.to_path_buf(),
            });
        }

        info!(
            mesh = %mesh_path.display(),
            layer_height = settings.layer_height,
            infill = settings.infill_percent,
            supports = settings.supports_enabled,
            "slicing"
        );

        let dir = self.config.toolpath_dir();
        fs::create_dir_all(&dir).map_err(|e| SliceError::io(&dir, e))?;
        let gcode = tempfile::Builder::new()
            .prefix("toolpath-")
            .suffix(".gcode")
            .tempfile_in(&dir)
            .map_err(|e| SliceError::io(&dir, e))?;

        let args = self.arguments(mesh_path, settings, gcode.path());
        let run = run_slicer(&self.config.executable, &args, self.config.timeout())?;

        let footer = read_gcode(&gcode);
        let parsed = parse_slicer_output(&footer)
            .or(parse_slicer_output(&run.stdout))
            .or(parse_slicer_output(&run.stderr));
        let (time_seconds, material_grams) = parsed.complete()?;

        let toolpath = if footer.is_empty() {
            None
        } else {
            Some(keep(gcode)?)
        };

        info!(
            time_seconds,
            material_grams,
            elapsed_ms = run.elapsed.as_millis(),
            "slicing complete"
        );
        Ok(SliceMetrics::sliced(time_seconds, material_grams, toolpath))
    }

    fn arguments(&self, mesh_path: &Path, settings: &SliceSettings, output: &Path) -> Vec<String> {
        let mut args = self.config.extra_args.clone();
        args.extend(settings.to_args());
        args.push("--output".to_string());
        args.push(output.display().to_string());
        args.push(mesh_path.display().to_string());
        args
    }
}

fn read_gcode(gcode: &NamedTempFile) -> String {
    match fs::read(gcode.path()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            debug!(error = %e, "no G-code written");
            String::new()
        }
    }
}

fn keep(gcode: NamedTempFile) -> SliceResult<PathBuf> {
    gcode
        .into_temp_path()
        .keep()
        .map_err(|e| SliceError::io(e.path.to_path_buf(), e.error))
}
