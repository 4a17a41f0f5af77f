use super::bench::{bench, BenchError};
use super::store::{store_result, StoreError};
use super::sweep::{sweep, BenchParams};
use crate::config::{RunnerConfig, Workspace};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during a benchmark sweep
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Benchmark nmax={nmax} repeats={repeats} count={count} failed: {source}")]
    Bench {
        nmax: u64,
        repeats: u64,
        count: u64,
        #[source]
        source: BenchError,
    },

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Runs the whole sweep sequentially, publishing one raw result file per invocation.
///
/// The first failing invocation aborts the sweep; files written before it are kept.
///
/// # Arguments
/// * `program` - Benchmark executable, invoked as `<program> <nmax> <repeats> <count>`
/// * `config` - Sweep ranges and repeats
/// * `workspace` - Results are written into its `raw_data/` directory
///
/// # Returns
/// The paths of the written files, in sweep order.
pub fn run_sweep(
    program: &Path,
    config: &RunnerConfig,
    workspace: &Workspace,
) -> Result<Vec<PathBuf>, RunError> {
    let params = sweep(config);
    let raw_data_dir = workspace.raw_data_dir();
    info!(
        "Running {} benchmark invocations of {} into {}",
        params.len(),
        program.display(),
        raw_data_dir.display()
    );

    let progress = ProgressBar::new(params.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut written = Vec::with_capacity(params.len());
    for param in params {
        progress.set_message(format!("nmax={} count={}", param.nmax, param.count));
        let path = run_one(program, param, &raw_data_dir)?;
        debug!("Wrote {}", path.display());
        written.push(path);
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!("Wrote {} raw results", written.len());
    Ok(written)
}

/// Runs a single invocation and publishes its result.
pub fn run_one(
    program: &Path,
    params: BenchParams,
    raw_data_dir: &Path,
) -> Result<PathBuf, RunError> {
    let result = bench(program, params).map_err(|source| RunError::Bench {
        nmax: params.nmax,
        repeats: params.repeats,
        count: params.count,
        source,
    })?;
    Ok(store_result(raw_data_dir, &result)?)
}
