//! Invocation of the external benchmark program and conversion of its output.
//!
//! The program prints one JSON document:
//!
//! ```text
//! { "_lang": "rs",
//!   "BTreeMap": {
//!     "insert": [ ["iter", "size", "time"], [3, 3, 1.2e-7], ... ],
//!     "lookup": [ ["iter", "misses", "time"], [3, 1, 9.1e-8], ... ],
//!     "rng":    [ ["time"], [2.0e-8], ... ] },
//!   ... }
//! //ignore this: 42
//! ```
//!
//! The first row of every table is a header. Lines starting with `//` are ignored.

use super::sweep::BenchParams;
use crate::analysis::sample::Measurement;
use crate::model::method::{Lang, Method, Operation, UnknownName};
use crate::model::raw_result::{OperationSeries, RawResult};
use crate::utilities::json::{parse_commented, JsonError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Errors that can occur while running the benchmark program
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Benchmark exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Benchmark output is not valid UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to parse benchmark output: {0}")]
    Json(#[from] JsonError),

    #[error("Benchmark output is not a JSON object")]
    NotAnObject,

    #[error("Benchmark output is missing '{0}'")]
    MissingField(String),

    #[error("{0}")]
    UnknownName(#[from] UnknownName),

    #[error("Malformed row {row} in '{table}' of {method}")]
    MalformedRow {
        method: Method,
        table: &'static str,
        row: usize,
    },
}

type Result<T> = core::result::Result<T, BenchError>;

/// Runs `<program> <nmax> <repeats> <count>` and returns its standard output.
pub fn run_program(program: &Path, params: BenchParams) -> Result<String> {
    let output = Command::new(program)
        .arg(params.nmax.to_string())
        .arg(params.repeats.to_string())
        .arg(params.count.to_string())
        .output()
        .map_err(|source| BenchError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(BenchError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8(output.stdout)?)
}

/// Runs the benchmark once and converts its output.
pub fn bench(program: &Path, params: BenchParams) -> Result<RawResult> {
    let stdout = run_program(program, params)?;
    parse_output(&stdout, params)
}

/// Parses benchmark output, keeping only measurements where all repeats hit or all missed.
pub fn parse_output(text: &str, params: BenchParams) -> Result<RawResult> {
    let document: Value = parse_commented(text)?;
    let object = document.as_object().ok_or(BenchError::NotAnObject)?;

    let lang: Lang = object
        .get("_lang")
        .and_then(Value::as_str)
        .ok_or_else(|| BenchError::MissingField("_lang".to_string()))?
        .parse()?;

    let mut rng_times = Vec::new();
    let mut times = BTreeMap::new();
    for (name, tables) in object {
        if name.starts_with('_') {
            continue;
        }

        let method: Method = name.parse()?;
        let tables = tables
            .as_object()
            .ok_or_else(|| BenchError::MissingField(format!("{} tables", name)))?;

        rng_times.extend(rng_rows(method, tables)?);

        let insert = insert_series(method, tables, params.repeats)?;
        let final_size = insert.last_size;
        let lookup = lookup_series(method, tables, params.repeats, final_size)?;

        let mut by_operation = BTreeMap::new();
        by_operation.insert(Operation::Insert, insert.series);
        by_operation.insert(Operation::Lookup, lookup);
        times.insert(method, by_operation);
    }

    Ok(RawResult {
        lang: Some(lang),
        nmax: params.nmax,
        repeats: params.repeats,
        rng_times,
        count: params.count,
        times,
    })
}

struct InsertSeries {
    series: OperationSeries,
    /// Container size after the last insert
    last_size: u64,
}

/// Insert rows are `[iter, size, time]`.
///
/// Every repeat that grew the map inserted a new key (a miss); the rest hit an existing one.
/// The measurement is attributed to the average size over the batch.
fn insert_series(
    method: Method,
    tables: &Map<String, Value>,
    repeats: u64,
) -> Result<InsertSeries> {
    let mut series = OperationSeries::default();
    let mut last_size = 0u64;
    for (row, values) in data_rows(method, tables, "insert")? {
        let size = cell_u64(values, 1).ok_or(malformed(method, "insert", row))?;
        let time = cell_f64(values, 2).ok_or(malformed(method, "insert", row))?;

        let counts = size
            .checked_sub(last_size)
            .and_then(|misses| Some((repeats.checked_sub(misses)?, misses)));
        let average_size = (size + last_size) / 2;
        last_size = size;

        // A shrinking map or more new keys than repeats cannot be attributed.
        let Some((hits, misses)) = counts else {
            continue;
        };
        let measurement = Measurement::new(average_size, hits, misses, time);
        if measurement.is_unambiguous() {
            series.push(measurement);
        }
    }
    Ok(InsertSeries { series, last_size })
}

/// Lookup rows are `[iter, misses, time]`, taken against the fully populated map.
fn lookup_series(
    method: Method,
    tables: &Map<String, Value>,
    repeats: u64,
    size: u64,
) -> Result<OperationSeries> {
    let mut series = OperationSeries::default();
    for (row, values) in data_rows(method, tables, "lookup")? {
        let misses = cell_u64(values, 1).ok_or(malformed(method, "lookup", row))?;
        let time = cell_f64(values, 2).ok_or(malformed(method, "lookup", row))?;

        let Some(hits) = repeats.checked_sub(misses) else {
            continue;
        };
        let measurement = Measurement::new(size, hits, misses, time);
        if measurement.is_unambiguous() {
            series.push(measurement);
        }
    }
    Ok(series)
}

/// RNG rows are `[time]`.
fn rng_rows(method: Method, tables: &Map<String, Value>) -> Result<Vec<f64>> {
    data_rows(method, tables, "rng")?
        .map(|(row, values)| cell_f64(values, 0).ok_or(malformed(method, "rng", row)))
        .collect()
}

/// Rows of `table` after the header, with their index in the table.
fn data_rows<'a>(
    method: Method,
    tables: &'a Map<String, Value>,
    table: &'static str,
) -> Result<impl Iterator<Item = (usize, &'a [Value])>> {
    let rows = tables
        .get(table)
        .and_then(Value::as_array)
        .ok_or_else(|| BenchError::MissingField(format!("{}.{}", method, table)))?;

    Ok(rows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(index, row)| (index, row.as_array().map(Vec::as_slice).unwrap_or(&[]))))
}

fn cell_f64(values: &[Value], index: usize) -> Option<f64> {
    values.get(index).and_then(Value::as_f64)
}

/// Integer cell; integral floats such as `5.0` are accepted.
fn cell_u64(values: &[Value], index: usize) -> Option<u64> {
    let value = values.get(index)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|x| *x >= 0.0 && x.fract() == 0.0)
            .map(|x| x as u64)
    })
}

fn malformed(method: Method, table: &'static str, row: usize) -> BenchError {
    BenchError::MalformedRow { method, table, row }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PARAMS: BenchParams = BenchParams {
        nmax: 10,
        repeats: 5,
        count: 2,
    };

    fn output(insert: &str, lookup: &str, rng: &str) -> String {
        format!(
            "{{ \"_lang\": \"rs\", \"HashMap\":\n{{ \"insert\":\n[ [\"iter\", \"size\", \"time\"]{}]\n, \"lookup\":\n[ [\"iter\", \"misses\", \"time\"]{}]\n, \"rng\":\n[ [\"time\"]{}]\n}}\n}}\n//ignore this: 12\n",
            insert, lookup, rng
        )
    }

    #[test]
    fn insert_rows_become_all_miss_samples() {
        let text = output(", [\"x\", 5, 100]\n, [\"x\", 10, 150]\n", "", "");
        let result = parse_output(&text, PARAMS).unwrap();

        let insert = &result.times[&Method::HashMap][&Operation::Insert];
        assert_eq!(insert.size, vec![2, 7]);
        assert_eq!(insert.hits, vec![0, 0]);
        assert_eq!(insert.misses, vec![5, 5]);
        assert_eq!(insert.time, vec![100.0, 150.0]);

        let sample = insert.measurements().nth(1).unwrap().classify().unwrap();
        assert_eq!(sample.time, 30.0);
    }

    #[test]
    fn mixed_rows_are_skipped() {
        // Second batch grows the map by 2 of 5 repeats: 2 misses, 3 hits.
        let text = output(
            ", [5, 5, 1.0]\n, [10, 7, 2.0]\n, [15, 7, 3.0]\n",
            ", [5, 0, 1.0]\n, [10, 2, 2.0]\n, [15, 5, 3.0]\n",
            "",
        );
        let result = parse_output(&text, PARAMS).unwrap();

        let insert = &result.times[&Method::HashMap][&Operation::Insert];
        assert_eq!(insert.time, vec![1.0, 3.0]);
        assert_eq!(insert.hits, vec![0, 5]);
        assert_eq!(insert.size, vec![2, 7]);

        let lookup = &result.times[&Method::HashMap][&Operation::Lookup];
        assert_eq!(lookup.time, vec![1.0, 3.0]);
        assert_eq!(lookup.hits, vec![5, 0]);
        assert_eq!(lookup.misses, vec![0, 5]);
        assert_eq!(lookup.size, vec![7, 7]);
    }

    #[rstest(
        rows,
        expected_size,
        expected_time,
        // Grows by 7 keys with only 5 repeats.
        case(", [0, 7, 1.0]\n, [1, 12, 2.0]\n", vec![9], vec![2.0]),
        // Shrinks from 5 to 3 keys.
        case(", [0, 5, 1.0]\n, [1, 3, 2.0]\n, [2, 8, 3.0]\n", vec![2, 5], vec![1.0, 3.0])
    )]
    fn impossible_insert_rows_are_skipped(
        rows: &str,
        expected_size: Vec<u64>,
        expected_time: Vec<f64>,
    ) {
        let result = parse_output(&output(rows, "", ""), PARAMS).unwrap();
        let insert = &result.times[&Method::HashMap][&Operation::Insert];
        assert_eq!(insert.size, expected_size);
        assert_eq!(insert.time, expected_time);
        assert!(insert.misses.iter().all(|&misses| misses <= PARAMS.repeats));
    }

    #[rstest(
        rows,
        expected_misses,
        case(", [0, 7, 1.0]\n", vec![]),
        case(", [0, 7, 1.0]\n, [1, 5, 2.0]\n, [2, 6, 3.0]\n", vec![5])
    )]
    fn lookup_rows_with_too_many_misses_are_skipped(rows: &str, expected_misses: Vec<u64>) {
        let result = parse_output(&output("", rows, ""), PARAMS).unwrap();
        let lookup = &result.times[&Method::HashMap][&Operation::Lookup];
        assert_eq!(lookup.misses, expected_misses);
        assert_eq!(lookup.hits, vec![0; expected_misses.len()]);
    }

    #[test]
    fn collects_rng_times_and_metadata() {
        let text = output("", "", ", [1e-7]\n, [2e-7]\n");
        let result = parse_output(&text, PARAMS).unwrap();
        assert_eq!(result.lang, Some(Lang::Rs));
        assert_eq!(result.rng_times, vec![1e-7, 2e-7]);
        assert_eq!((result.nmax, result.repeats, result.count), (10, 5, 2));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let text = "{ \"_lang\": \"rs\", \"Vec\": {} }";
        assert!(matches!(
            parse_output(text, PARAMS),
            Err(BenchError::UnknownName(_))
        ));
    }

    #[test]
    fn missing_table_is_reported() {
        let text = "{ \"_lang\": \"cpp\", \"map\": { \"rng\": [[\"time\"]] } }";
        let err = parse_output(text, PARAMS).unwrap_err();
        assert!(matches!(err, BenchError::MissingField(ref field) if field == "map.insert"));
    }

    #[test]
    fn malformed_row_is_reported() {
        let text = output(", [1, \"five\", 0.1]\n", "", "");
        let err = parse_output(&text, PARAMS).unwrap_err();
        assert!(matches!(
            err,
            BenchError::MalformedRow {
                table: "insert",
                row: 1,
                ..
            }
        ));
    }
}
