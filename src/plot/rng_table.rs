//! ASCII table of the measured RNG overhead, using the [`tabled`] crate.

use crate::model::method::Lang;
use crate::utilities::stats::Summary;
use std::collections::BTreeMap;
use tabled::{Table, Tabled};

/// Nanoseconds per second; timings are stored in seconds.
pub const NS_PER_S: f64 = 1e9;

/// One language's RNG overhead, formatted in nanoseconds.
#[derive(Debug, Clone, Tabled)]
pub struct RngRow {
    #[tabled(rename = "Language")]
    pub lang: String,
    #[tabled(rename = "Mean (ns)")]
    pub mean: String,
    #[tabled(rename = "SDOM (ns)")]
    pub sdom: String,
    #[tabled(rename = "Stdev (ns)")]
    pub stdev: String,
    #[tabled(rename = "Min (ns)")]
    pub min: String,
}

impl RngRow {
    pub fn new(lang: Lang, summary: &Summary) -> Self {
        let ns = summary.scaled(NS_PER_S);
        Self {
            lang: lang.to_string(),
            mean: format!("{:.3}", ns.mean),
            sdom: format!("{:.3}", ns.sdom),
            stdev: format!("{:.3}", ns.stdev),
            min: format!("{:.3}", ns.min),
        }
    }
}

/// Formats the per-language RNG overhead as an ASCII table.
pub fn format_rng_table(t_rng: &BTreeMap<Lang, Summary>) -> String {
    if t_rng.is_empty() {
        return "No RNG overhead measured".to_string();
    }

    let rows: Vec<RngRow> = t_rng
        .iter()
        .map(|(lang, summary)| RngRow::new(*lang, summary))
        .collect();
    let title = "RNG overhead per key";
    format!(
        "{}\n{}\n{}",
        title,
        "=".repeat(title.len()),
        Table::new(rows)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_nanoseconds() {
        let mut t_rng = BTreeMap::new();
        t_rng.insert(
            Lang::Rs,
            Summary {
                mean: 2.5e-9,
                min: 2e-9,
                stdev: 1e-10,
                sdom: 1e-11,
            },
        );

        let table = format_rng_table(&t_rng);
        assert!(table.contains("RNG overhead per key"));
        assert!(table.contains("Language"));
        assert!(table.contains("rs"));
        assert!(table.contains("2.500"));
        assert!(table.contains("0.010"));
    }

    #[test]
    fn empty_table_has_placeholder() {
        assert_eq!(format_rng_table(&BTreeMap::new()), "No RNG overhead measured");
    }
}
