//! Classification of raw measurements into hit or miss samples.
//!
//! A measurement times `hits + misses` operations at once. Only measurements where every
//! operation had the same outcome can be attributed; mixed ones are discarded.

use derive_new::new;

/// One timed batch of operations, as recorded by the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Measurement {
    /// Container size at which the batch ran
    pub size: u64,
    pub hits: u64,
    pub misses: u64,
    /// Elapsed seconds for the whole batch
    pub time: f64,
}

/// Whether the operations of a sample found their key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Hit,
    Miss,
}

/// A measurement attributed to a single outcome, normalized to one operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub size: u64,
    pub outcome: Outcome,
    /// Elapsed seconds per operation
    pub time: f64,
}

impl Outcome {
    pub fn is_hit(self) -> bool {
        self == Outcome::Hit
    }
}

impl Measurement {
    /// True when exactly one of `hits` and `misses` is nonzero.
    pub fn is_unambiguous(&self) -> bool {
        (self.hits == 0) != (self.misses == 0)
    }

    /// Attributes the measurement to its single outcome and divides the elapsed time by
    /// the number of operations.
    ///
    /// Returns [`None`] for mixed measurements and for measurements with no operations.
    pub fn classify(&self) -> Option<Sample> {
        let (outcome, operations) = match (self.hits, self.misses) {
            (0, 0) => return None,
            (hits, 0) => (Outcome::Hit, hits),
            (0, misses) => (Outcome::Miss, misses),
            _ => return None,
        };

        Some(Sample {
            size: self.size,
            outcome,
            time: self.time / operations as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest(hits, misses, case(1, 1), case(2, 1), case(1, 4), case(0, 0))]
    fn rejects_ambiguous_measurements(hits: u64, misses: u64) {
        let measurement = Measurement::new(100, hits, misses, 1.0);
        assert!(!measurement.is_unambiguous());
        assert_eq!(measurement.classify(), None);
    }

    #[test]
    fn normalizes_hits() {
        let sample = Measurement::new(64, 4, 0, 2.0).classify().unwrap();
        assert_eq!(sample.outcome, Outcome::Hit);
        assert_eq!(sample.time, 0.5);
        assert_eq!(sample.size, 64);
    }

    #[test]
    fn normalizes_misses() {
        let sample = Measurement::new(7, 0, 5, 150.0).classify().unwrap();
        assert_eq!(sample.outcome, Outcome::Miss);
        assert_eq!(sample.time, 30.0);
        assert!(!sample.outcome.is_hit());
    }
}
