//! Folds raw results into `analysis.json`.

use super::accumulate::{BinAccumulator, RngPool};
use crate::config::{AnalysisConfig, ConfigError, Workspace};
use crate::model::analysis_file::AnalysisFile;
use crate::model::method::{Method, Operation};
use crate::model::raw_result::RawResult;
use crate::utilities::atomic_write::write_atomically;
use crate::utilities::json::{read_commented, JsonError};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to list raw results in {path}: {source}")]
    ListDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: JsonError,
    },

    #[error("{source_name}: {method} {operation} measurement {index} mixes hits and misses")]
    AmbiguousSample {
        source_name: String,
        method: Method,
        operation: Operation,
        index: usize,
    },

    #[error("{source_name}: {method} {operation} columns have different lengths")]
    InconsistentSeries {
        source_name: String,
        method: Method,
        operation: Operation,
    },

    #[error("{0}: repeats is zero")]
    ZeroRepeats(String),

    #[error("{0}: no language recorded and no methods to infer it from")]
    UnknownLang(String),

    #[error("Refusing to write non-finite value at {0}")]
    NonFinite(String),

    #[error("Failed to serialize analysis: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write analysis: {0}")]
    FileWrite(#[from] std::io::Error),
}

type Result<T> = core::result::Result<T, AnalyzeError>;

/// Accumulates raw results for a single analysis pass.
pub struct Analyzer {
    min_count: usize,
    accumulator: BinAccumulator,
    rng: RngPool,
    out_of_range: usize,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            min_count: config.min_count,
            accumulator: BinAccumulator::new(config.size_bins()),
            rng: RngPool::default(),
            out_of_range: 0,
        })
    }

    /// Adds every measurement of `result`.
    ///
    /// `source_name` identifies the result in errors. A measurement that is not purely hits
    /// or purely misses is rejected, since the runner never writes one.
    pub fn add_result(&mut self, source_name: &str, result: &RawResult) -> Result<()> {
        let lang = result
            .lang()
            .ok_or_else(|| AnalyzeError::UnknownLang(source_name.to_string()))?;
        if result.repeats == 0 {
            return Err(AnalyzeError::ZeroRepeats(source_name.to_string()));
        }
        self.rng.extend(lang, &result.rng_times, result.repeats);

        for (&method, by_operation) in &result.times {
            for (&operation, series) in by_operation {
                if !series.is_consistent() {
                    return Err(AnalyzeError::InconsistentSeries {
                        source_name: source_name.to_string(),
                        method,
                        operation,
                    });
                }

                for (index, measurement) in series.measurements().enumerate() {
                    let sample =
                        measurement
                            .classify()
                            .ok_or_else(|| AnalyzeError::AmbiguousSample {
                                source_name: source_name.to_string(),
                                method,
                                operation,
                                index,
                            })?;
                    if !self.accumulator.add(operation, method, sample) {
                        self.out_of_range += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of samples whose size fell outside every bin.
    pub fn out_of_range(&self) -> usize {
        self.out_of_range
    }

    /// Aggregates everything added so far.
    pub fn finish(self) -> AnalysisFile {
        let t_rng = self.rng.summarize();
        AnalysisFile {
            data: self
                .accumulator
                .into_records(self.min_count)
                .into_iter()
                .collect(),
            t_rng,
        }
    }
}

/// All `*.json` files in `raw_data_dir`, sorted by path.
///
/// A missing directory yields no files.
pub fn raw_result_files(raw_data_dir: &Path) -> Result<Vec<PathBuf>> {
    let list_error = |source| AnalyzeError::ListDir {
        path: raw_data_dir.display().to_string(),
        source,
    };

    if !raw_data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(raw_data_dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads every raw result in the workspace and aggregates them.
pub fn analyze_workspace(config: &AnalysisConfig, workspace: &Workspace) -> Result<AnalysisFile> {
    let files = raw_result_files(&workspace.raw_data_dir())?;
    if files.is_empty() {
        warn!(
            "No raw results found in {}",
            workspace.raw_data_dir().display()
        );
    }

    let mut analyzer = Analyzer::new(config)?;
    for path in &files {
        let name = path.display().to_string();
        let result: RawResult = read_commented(path).map_err(|source| AnalyzeError::Load {
            path: name.clone(),
            source,
        })?;
        debug!("Loaded {} (nmax={}, count={})", name, result.nmax, result.count);
        analyzer.add_result(&name, &result)?;
    }

    if analyzer.out_of_range() > 0 {
        debug!(
            "{} samples fell outside the size bins",
            analyzer.out_of_range()
        );
    }

    let analysis = analyzer.finish();
    info!(
        "Aggregated {} raw results into {} records",
        files.len(),
        analysis.data.len()
    );
    Ok(analysis)
}

/// Serializes `analysis`, refusing NaN and infinite values.
pub fn write_analysis(path: &Path, analysis: &AnalysisFile) -> Result<()> {
    if let Some(location) = analysis.first_non_finite() {
        return Err(AnalyzeError::NonFinite(location));
    }
    let bytes = serde_json::to_vec(analysis)?;
    write_atomically(path, &bytes)?;
    Ok(())
}

/// Runs the analysis stage: `raw_data/*.json` to `analysis.json`.
pub fn run_analysis(config: &AnalysisConfig, workspace: &Workspace) -> Result<AnalysisFile> {
    let analysis = analyze_workspace(config, workspace)?;
    let path = workspace.analysis_file();
    write_analysis(&path, &analysis)?;
    info!("Wrote {}", path.display());
    Ok(analysis)
}
