use super::sample::{Outcome, Sample};
use crate::model::analysis_file::AggregateRecord;
use crate::model::method::{Lang, Method, Operation};
use crate::utilities::binning::SizeBins;
use crate::utilities::stats::Summary;
use std::collections::BTreeMap;

/// Per-operation times collected for one size bin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinnedTimes {
    pub time_hit: Vec<f64>,
    pub time_miss: Vec<f64>,
}

impl BinnedTimes {
    pub fn times(&self, outcome: Outcome) -> &[f64] {
        match outcome {
            Outcome::Hit => &self.time_hit,
            Outcome::Miss => &self.time_miss,
        }
    }

    fn times_mut(&mut self, outcome: Outcome) -> &mut Vec<f64> {
        match outcome {
            Outcome::Hit => &mut self.time_hit,
            Outcome::Miss => &mut self.time_miss,
        }
    }
}

/// Collects samples into size bins, grouped by operation and method.
#[derive(Debug, Clone)]
pub struct BinAccumulator {
    bins: SizeBins,
    groups: BTreeMap<(Operation, Method), Vec<BinnedTimes>>,
}

impl BinAccumulator {
    pub fn new(bins: SizeBins) -> Self {
        Self {
            bins,
            groups: BTreeMap::new(),
        }
    }

    /// Files `sample` into the bin matching its size.
    ///
    /// Returns `false` when the size lies outside every bin and the sample was dropped.
    pub fn add(&mut self, operation: Operation, method: Method, sample: Sample) -> bool {
        let Some(bin) = self.bins.bin_of(sample.size) else {
            return false;
        };

        let num_bins = self.bins.len();
        let binned = self
            .groups
            .entry((operation, method))
            .or_insert_with(|| vec![BinnedTimes::default(); num_bins]);
        binned[bin].times_mut(sample.outcome).push(sample.time);
        true
    }

    pub fn binned(&self, operation: Operation, method: Method) -> Option<&[BinnedTimes]> {
        self.groups
            .get(&(operation, method))
            .map(|binned| binned.as_slice())
    }

    /// Reduces every group holding at least `min_count` samples to an aggregate record.
    ///
    /// Records are ordered by operation, method and size, with hits before misses.
    /// Groups below the threshold are dropped.
    pub fn into_records(self, min_count: usize) -> Vec<AggregateRecord> {
        let mut records = Vec::new();
        for ((operation, method), binned) in &self.groups {
            for (index, times) in binned.iter().enumerate() {
                let size = self.bins.midpoint(index);
                for outcome in [Outcome::Hit, Outcome::Miss] {
                    let samples = times.times(outcome);
                    if samples.len() < min_count {
                        continue;
                    }
                    let Some(stats) = Summary::from_samples(samples) else {
                        continue;
                    };
                    records.push(AggregateRecord {
                        operation: *operation,
                        method: *method,
                        size,
                        is_hit: outcome.is_hit(),
                        stats,
                    });
                }
            }
        }
        records
    }
}

/// RNG overhead per generated key, pooled by language.
#[derive(Debug, Clone, Default)]
pub struct RngPool {
    times: BTreeMap<Lang, Vec<f64>>,
}

impl RngPool {
    /// Adds the timings of one result, each covering `repeats` key generations.
    ///
    /// `repeats` must be nonzero.
    pub fn extend(&mut self, lang: Lang, rng_times: &[f64], repeats: u64) {
        let per_key = repeats as f64;
        self.times
            .entry(lang)
            .or_default()
            .extend(rng_times.iter().map(|time| time / per_key));
    }

    /// Summary per language; languages without samples are omitted.
    pub fn summarize(&self) -> BTreeMap<Lang, Summary> {
        self.times
            .iter()
            .filter_map(|(lang, times)| Summary::from_samples(times).map(|s| (*lang, s)))
            .collect()
    }
}
