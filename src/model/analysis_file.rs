//! The `analysis.json` document.
//!
//! Aggregate records are stored column-wise (`data.operation[i]`, `data.size[i]`, ...) so the
//! file stays compact and is directly loadable as a table by external tooling.

use super::method::{Lang, Method, Operation};
use crate::utilities::stats::Summary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics of one (operation, method, size bin, outcome) group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRecord {
    pub operation: Operation,
    pub method: Method,
    /// Midpoint of the size bin
    pub size: u64,
    pub is_hit: bool,
    /// Per-operation time statistics, in seconds
    pub stats: Summary,
}

/// Column-wise storage of [`AggregateRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTable {
    pub operation: Vec<Operation>,
    pub method: Vec<Method>,
    pub size: Vec<u64>,
    pub is_hit: Vec<bool>,
    pub time: Vec<f64>,
    pub time_min: Vec<f64>,
    pub time_stdev: Vec<f64>,
    pub time_sdom: Vec<f64>,
}

impl AnalysisTable {
    pub fn push(&mut self, record: AggregateRecord) {
        self.operation.push(record.operation);
        self.method.push(record.method);
        self.size.push(record.size);
        self.is_hit.push(record.is_hit);
        self.time.push(record.stats.mean);
        self.time_min.push(record.stats.min);
        self.time_stdev.push(record.stats.stdev);
        self.time_sdom.push(record.stats.sdom);
    }

    pub fn len(&self) -> usize {
        self.operation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operation.is_empty()
    }

    /// True when every column has the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.operation.len();
        [
            self.method.len(),
            self.size.len(),
            self.is_hit.len(),
            self.time.len(),
            self.time_min.len(),
            self.time_stdev.len(),
            self.time_sdom.len(),
        ]
        .iter()
        .all(|&len| len == n)
    }

    pub fn record(&self, index: usize) -> AggregateRecord {
        AggregateRecord {
            operation: self.operation[index],
            method: self.method[index],
            size: self.size[index],
            is_hit: self.is_hit[index],
            stats: Summary {
                mean: self.time[index],
                min: self.time_min[index],
                stdev: self.time_stdev[index],
                sdom: self.time_sdom[index],
            },
        }
    }

    pub fn records(&self) -> impl Iterator<Item = AggregateRecord> + '_ {
        (0..self.len()).map(|index| self.record(index))
    }
}

impl FromIterator<AggregateRecord> for AnalysisTable {
    fn from_iter<I: IntoIterator<Item = AggregateRecord>>(iter: I) -> Self {
        let mut table = AnalysisTable::default();
        for record in iter {
            table.push(record);
        }
        table
    }
}

/// Contents of `analysis.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFile {
    pub data: AnalysisTable,
    /// RNG overhead per generated key, by language, in seconds
    pub t_rng: BTreeMap<Lang, Summary>,
}

impl AnalysisFile {
    /// Finds the first column holding a NaN or infinity, if any.
    ///
    /// JSON has no representation for these values and `serde_json` would silently write
    /// `null`, so callers check this before serializing.
    pub fn first_non_finite(&self) -> Option<String> {
        let columns = [
            ("time", &self.data.time),
            ("time_min", &self.data.time_min),
            ("time_stdev", &self.data.time_stdev),
            ("time_sdom", &self.data.time_sdom),
        ];
        for (name, column) in columns {
            if let Some(index) = column.iter().position(|value| !value.is_finite()) {
                return Some(format!("data.{}[{}]", name, index));
            }
        }

        self.t_rng
            .iter()
            .find(|(_, summary)| !summary.is_finite())
            .map(|(lang, _)| format!("t_rng.{}", lang))
    }
}
