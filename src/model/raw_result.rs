use super::method::{Lang, Method, Operation};
use crate::analysis::sample::Measurement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measurements of one operation, stored as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSeries {
    /// Container size at which each measurement was taken
    pub size: Vec<u64>,
    /// Number of repeats that hit an existing key
    pub hits: Vec<u64>,
    /// Number of repeats that missed
    pub misses: Vec<u64>,
    /// Elapsed seconds for all repeats of the measurement
    pub time: Vec<f64>,
}

impl OperationSeries {
    pub fn push(&mut self, measurement: Measurement) {
        self.size.push(measurement.size);
        self.hits.push(measurement.hits);
        self.misses.push(measurement.misses);
        self.time.push(measurement.time);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// True when all four arrays have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.time.len();
        self.size.len() == n && self.hits.len() == n && self.misses.len() == n
    }

    pub fn measurements(&self) -> impl Iterator<Item = Measurement> + '_ {
        self.size
            .iter()
            .zip(&self.hits)
            .zip(&self.misses)
            .zip(&self.time)
            .map(|(((&size, &hits), &misses), &time)| Measurement {
                size,
                hits,
                misses,
                time,
            })
    }
}

/// Contents of a `raw_data/<nmax>_<repeats>_<count>_<hash>.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// Language of the benchmark program; older files may omit it
    #[serde(default)]
    pub lang: Option<Lang>,
    /// Upper bound of the random key range
    pub nmax: u64,
    /// Operations performed per measurement
    pub repeats: u64,
    /// Seconds spent generating `repeats` random keys, one entry per measurement
    pub rng_times: Vec<f64>,
    /// Number of measurements per operation
    pub count: u64,
    pub times: BTreeMap<Method, BTreeMap<Operation, OperationSeries>>,
}

impl RawResult {
    /// Language of the result, falling back to the language of its methods.
    pub fn lang(&self) -> Option<Lang> {
        self.lang
            .or_else(|| self.times.keys().next().map(|method| method.lang()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(size: u64, hits: u64, misses: u64, time: f64) -> Measurement {
        Measurement {
            size,
            hits,
            misses,
            time,
        }
    }

    #[test]
    fn series_round_trips_measurements() {
        let mut series = OperationSeries::default();
        series.push(measurement(10, 3, 0, 1e-6));
        series.push(measurement(20, 0, 3, 2e-6));

        assert_eq!(series.len(), 2);
        assert!(series.is_consistent());
        let all: Vec<_> = series.measurements().collect();
        assert_eq!(all[1], measurement(20, 0, 3, 2e-6));
    }

    #[test]
    fn mismatched_arrays_are_inconsistent() {
        let series = OperationSeries {
            size: vec![1, 2],
            hits: vec![0],
            misses: vec![1],
            time: vec![1.0],
        };
        assert!(!series.is_consistent());
    }

    #[test]
    fn missing_lang_is_inferred_from_methods() {
        let json = r#"{
            "nmax": 16, "repeats": 3, "rng_times": [], "count": 2,
            "times": { "map": { "insert": { "size": [], "hits": [], "misses": [], "time": [] } } }
        }"#;
        let result: RawResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.lang, None);
        assert_eq!(result.lang(), Some(Lang::Cpp));
    }

    #[test]
    fn unknown_method_in_file_is_rejected() {
        let json = r#"{
            "lang": "rs", "nmax": 16, "repeats": 3, "rng_times": [], "count": 2,
            "times": { "Vec": {} }
        }"#;
        assert!(serde_json::from_str::<RawResult>(json).is_err());
    }
}
