//! # map-bench-harness
//! Drives an external map benchmark across a parameter sweep, bins the raw timings by
//! container size and renders per-operation comparison plots.
//!
//! The three stages communicate only through files inside a [`config::Workspace`]:
//!
//! - [`runner`] writes content-addressed raw results into `raw_data/`.
//! - [`analysis`] folds every raw result into `analysis.json`.
//! - [`plot`] renders `plots/plot-<operation>.svg` from `analysis.json`.

pub mod config;
pub mod error;

/// Shared data types for the files exchanged between stages.
pub mod model {
    /// Container implementations, their languages and the measured operations.
    pub mod method;

    /// The persisted output of a single benchmark invocation.
    pub mod raw_result;

    /// The consolidated `analysis.json` document.
    pub mod analysis_file;
}

/// Drives the external benchmark program.
pub mod runner {
    /// Logarithmic `(nmax, count)` parameter grid.
    pub mod sweep;

    /// Invokes the program and converts its output into a [`crate::model::raw_result::RawResult`].
    pub mod bench;

    /// Atomic, content-addressed publication of raw results.
    pub mod store;

    pub mod run;
}

/// Turns raw results into binned aggregate statistics.
pub mod analysis {
    pub mod sample;

    /// Per-bin hit/miss accumulation and reduction into records.
    pub mod accumulate;

    pub mod analyze;
}

/// Chart rendering for `analysis.json`.
pub mod plot {
    pub mod rng_table;
    pub mod render;
}

pub mod utilities {
    pub mod binning;
    pub mod json;
    pub mod math;
    pub mod stats;
    pub mod atomic_write;
}

pub use config::{HarnessConfig, Workspace};
pub use error::HarnessError;
