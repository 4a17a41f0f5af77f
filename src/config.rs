//! Settings for the three stages and the on-disk layout they share.
//!
//! Every stage takes its settings explicitly. Defaults reproduce the reference sweep
//! (16..500000 keys, 3 repeats) and can be overridden with a JSON file, e.g.
//!
//! ```json
//! { "runner": { "repeats": 2 }, "plot": { "plot_min": false } }
//! ```

use crate::utilities::binning::SizeBins;
use crate::utilities::json::{read_commented, JsonError};
use crate::utilities::stats::SummaryField;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    Load(#[from] JsonError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings of every stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub runner: RunnerConfig,
    pub analysis: AnalysisConfig,
    pub plot: PlotConfig,
}

/// Controls the parameter sweep of the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Operations per measurement.
    ///
    /// Keep this small: a measurement is only usable when all of its repeats hit or all
    /// miss, and that becomes rare as the batch grows.
    pub repeats: u64,

    /// Smallest key range swept.
    pub nmax_min: u64,

    /// Largest key range swept.
    pub nmax_max: u64,

    /// Number of log-spaced key ranges between [`Self::nmax_min`] and [`Self::nmax_max`].
    pub nmax_points: usize,

    /// Number of log-spaced measurement counts tried per key range.
    pub count_points: usize,
}

/// Controls binning and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum number of samples a bin needs before it is reported.
    pub min_count: usize,

    /// Lower edge of the first size bin.
    pub size_min: u64,

    /// Upper (exclusive) edge of the last size bin.
    pub size_max: u64,

    /// Number of log-spaced bin edges, before duplicates are merged.
    pub num_bins: usize,
}

/// Controls chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Plot the per-bin minimum instead of the mean.
    pub plot_min: bool,

    /// Subtract the RNG overhead of the method's language from every value.
    pub subtract_rng: bool,

    /// Draw SDOM bands around the mean. Ignored when [`Self::plot_min`] is set.
    pub err_bars: bool,

    /// Use a logarithmic time axis.
    pub log_y: bool,

    /// Which RNG overhead statistic is subtracted or drawn.
    pub rng_field: SummaryField,

    /// Chart size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            repeats: 3,
            nmax_min: 16,
            nmax_max: 500_000,
            nmax_points: 100,
            count_points: 4,
        }
    }
}

impl RunnerConfig {
    /// Sanitizes settings to acceptable values if they are out of range.
    pub fn sanitize(&mut self) {
        self.repeats = self.repeats.max(1);
        self.nmax_min = self.nmax_min.max(1);
        if self.nmax_max < self.nmax_min {
            self.nmax_max = self.nmax_min;
        }
        self.nmax_points = self.nmax_points.max(1);
        self.count_points = self.count_points.max(1);
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_count: 8,
            size_min: 8,
            size_max: 500_000,
            num_bins: 100,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_min == 0 || self.size_max <= self.size_min {
            return Err(ConfigError::Invalid(format!(
                "size range {}..{} must be positive and non-empty",
                self.size_min, self.size_max
            )));
        }
        if self.num_bins < 2 {
            return Err(ConfigError::Invalid(
                "num_bins must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    pub fn size_bins(&self) -> SizeBins {
        SizeBins::log_spaced(self.size_min, self.size_max, self.num_bins)
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            plot_min: true,
            subtract_rng: true,
            err_bars: true,
            log_y: false,
            rng_field: SummaryField::Mean,
            width: 1200,
            height: 800,
        }
    }
}

impl PlotConfig {
    /// Error bands are only meaningful around the mean.
    pub fn draws_err_bars(&self) -> bool {
        self.err_bars && !self.plot_min
    }
}

impl HarnessConfig {
    /// Loads settings from a JSON file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: HarnessConfig = read_commented(path)?;
        config.runner.sanitize();
        config.analysis.validate()?;
        Ok(config)
    }
}

/// Directory layout shared by all stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one JSON file per benchmark invocation.
    pub fn raw_data_dir(&self) -> PathBuf {
        self.root.join("raw_data")
    }

    pub fn analysis_file(&self) -> PathBuf {
        self.root.join("analysis.json")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.root.join("plots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            "// overrides\n{ \"runner\": { \"repeats\": 2 }, \"plot\": { \"rng_field\": \"min\" } }",
        )
        .unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.runner.repeats, 2);
        assert_eq!(config.runner.nmax_max, 500_000);
        assert_eq!(config.plot.rng_field, SummaryField::Min);
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn sanitize_fixes_degenerate_runner_settings() {
        let mut runner = RunnerConfig {
            repeats: 0,
            nmax_min: 0,
            nmax_max: 0,
            nmax_points: 0,
            count_points: 0,
        };
        runner.sanitize();
        assert_eq!(runner.repeats, 1);
        assert_eq!(runner.nmax_min, 1);
        assert_eq!(runner.nmax_max, 1);
        assert_eq!(runner.nmax_points, 1);
        assert_eq!(runner.count_points, 1);
    }

    #[test]
    fn rejects_empty_size_range() {
        let analysis = AnalysisConfig {
            size_min: 100,
            size_max: 100,
            ..AnalysisConfig::default()
        };
        assert!(matches!(analysis.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn err_bars_are_disabled_when_plotting_minimum() {
        let plot = PlotConfig::default();
        assert!(plot.plot_min);
        assert!(!plot.draws_err_bars());

        let plot = PlotConfig {
            plot_min: false,
            ..PlotConfig::default()
        };
        assert!(plot.draws_err_bars());
    }

    #[test]
    fn workspace_layout() {
        let workspace = Workspace::new("/data/run");
        assert_eq!(workspace.raw_data_dir(), Path::new("/data/run/raw_data"));
        assert_eq!(workspace.analysis_file(), Path::new("/data/run/analysis.json"));
        assert_eq!(workspace.plots_dir(), Path::new("/data/run/plots"));
    }
}
