use crate::model::raw_result::RawResult;
use crate::utilities::atomic_write::write_atomically;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_128;

/// Errors that can occur while storing raw results
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to serialize raw result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write raw result: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Hex encoded XXH3-128 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:032x}", xxh3_128(bytes))
}

/// File name of a stored result: `<nmax>_<repeats>_<count>_<hash>.json`.
pub fn result_file_name(result: &RawResult, hash: &str) -> String {
    format!(
        "{}_{}_{}_{}.json",
        result.nmax, result.repeats, result.count, hash
    )
}

/// Publishes `result` into `raw_data_dir` under a name derived from its contents.
///
/// The file is written to a temporary name first and renamed into place, so an
/// interrupted run never leaves a truncated result for the analyzer to pick up.
/// Storing an identical result twice yields the same file.
///
/// # Arguments
/// * `raw_data_dir` - Destination directory, created if missing
/// * `result` - Converted output of one benchmark invocation
///
/// # Returns
/// The path of the published file.
pub fn store_result(raw_data_dir: &Path, result: &RawResult) -> Result<PathBuf, StoreError> {
    // Struct fields serialize in declaration order and maps are BTreeMaps,
    // so equal results always produce equal bytes.
    let bytes = serde_json::to_vec(result)?;
    let hash = content_hash(&bytes);
    let path = raw_data_dir.join(result_file_name(result, &hash));
    write_atomically(&path, &bytes)?;
    Ok(path)
}
