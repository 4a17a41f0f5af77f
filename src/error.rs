use crate::analysis::analyze::AnalyzeError;
use crate::config::ConfigError;
use crate::plot::render::PlotError;
use crate::runner::run::RunError;
use thiserror::Error;

/// Errors that can occur in any stage of the harness
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Benchmark error: {0}")]
    Run(#[from] RunError),

    #[error("Analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),
}
