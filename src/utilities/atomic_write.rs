use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, PersistError};

/// Writes `contents` to `destination` so that readers observe either the old file or the
/// complete new one, never a partial write.
///
/// The data goes to a temporary `.tmp` file inside the destination's directory, which is
/// then renamed over the destination. The parent directory is created when missing.
pub fn write_atomically(destination: &Path, contents: &[u8]) -> std::io::Result<()> {
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)?;

    let mut temp = tempfile::Builder::new()
        .suffix(".tmp")
        .tempfile_in(directory)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    persist(temp, destination)
}

fn persist(temp: NamedTempFile, destination: &Path) -> std::io::Result<()> {
    temp.persist(destination)
        .map(|_| ())
        .map_err(|PersistError { error, .. }| error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_parent_and_writes_contents() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("nested").join("out.json");

        write_atomically(&destination, b"{}").unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"{}");
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("out.json");
        fs::write(&destination, b"old").unwrap();

        write_atomically(&destination, b"new").unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"new");
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
