//! Slicer process configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metrics::{FALLBACK_MATERIAL_GRAMS, FALLBACK_TIME_SECONDS};

/// Default slicer executable, looked up on `PATH`.
pub const DEFAULT_SLICER: &str = "prusa-slicer";

/// Default time limit for one slicer run (s).
pub const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// How the slicer is run and what to report when it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    /// Slicer executable (name on `PATH` or absolute path).
    pub executable: PathBuf,

    /// Extra arguments placed before the settings arguments
    /// (e.g. `--load printer.ini`).
    pub extra_args: Vec<String>,

    /// Time limit for one run (s).
    pub timeout_secs: f64,

    /// Where successful G-code is kept. Defaults to the system temp dir.
    pub toolpath_dir: Option<PathBuf>,

    /// Time reported when slicing fails (s).
    pub fallback_time_seconds: f64,

    /// Material reported when slicing fails (g).
    pub fallback_grams: f64,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_SLICER),
            extra_args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            toolpath_dir: None,
            fallback_time_seconds: FALLBACK_TIME_SECONDS,
            fallback_grams: FALLBACK_MATERIAL_GRAMS,
        }
    }
}

impl SlicerConfig {
    /// Configuration for a specific executable.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            ..Default::default()
        }
    }

    /// Set the time limit.
    #[must_use]
    pub const fn with_timeout_secs(mut self, seconds: f64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Keep G-code in this directory.
    #[must_use]
    pub fn with_toolpath_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.toolpath_dir = Some(dir.into());
        self
    }

    /// Append an extra argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Time limit as a `Duration`.
    ///
    /// Non-finite or negative values fall back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    /// Toolpath directory, or the system temp dir.
    #[must_use]
    pub fn toolpath_dir(&self) -> PathBuf {
        self.toolpath_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
