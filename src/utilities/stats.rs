//! Descriptive statistics over timing samples.

use serde::{Deserialize, Serialize};

/// Mean, minimum, population standard deviation and standard deviation of the mean
/// of a sample list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub stdev: f64,
    pub sdom: f64,
}

impl Summary {
    /// Summarizes `samples`, or returns [`None`] if there are none.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let stdev = variance.sqrt();

        Some(Self {
            mean,
            min,
            stdev,
            sdom: stdev / n.sqrt(),
        })
    }

    /// Picks one of the summarized quantities.
    pub fn field(&self, field: SummaryField) -> f64 {
        match field {
            SummaryField::Mean => self.mean,
            SummaryField::Min => self.min,
            SummaryField::Stdev => self.stdev,
            SummaryField::Sdom => self.sdom,
        }
    }

    /// Returns a copy with every quantity multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            mean: self.mean * factor,
            min: self.min * factor,
            stdev: self.stdev * factor,
            sdom: self.sdom * factor,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.mean.is_finite()
            && self.min.is_finite()
            && self.stdev.is_finite()
            && self.sdom.is_finite()
    }
}

/// Selects a quantity from a [`Summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryField {
    #[default]
    Mean,
    Min,
    Stdev,
    Sdom,
}

/// Quantile `q` (0..=1) with linear interpolation between the closest ranks.
///
/// Returns [`None`] for an empty slice. Non-finite inputs are not filtered.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
