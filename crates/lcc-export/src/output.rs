//! Writing exports to disk.

use lcc_core::{PgnExport, RawFile};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing export files.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Writes the merged PGN into `dir` and returns the path written.
///
/// An existing file of the same name is not overwritten; a `-2`, `-3`, ...
/// suffix is added instead.
pub fn write_pgn(dir: &Path, export: &PgnExport) -> Result<PathBuf, ExportError> {
    ensure_dir(dir)?;
    let path = unique_path(dir, &export.file_name());
    write_file(&path, &export.text)?;
    Ok(path)
}

/// Writes every raw capture into `dir`, in capture order.
///
/// Several captures share a file name (every round has a `game-1.json`), so
/// later ones get a numeric suffix.
pub fn write_raw(dir: &Path, files: &[RawFile]) -> Result<Vec<PathBuf>, ExportError> {
    ensure_dir(dir)?;
    files
        .iter()
        .map(|file| {
            let path = unique_path(dir, &file.filename);
            write_file(&path, &file.contents)?;
            Ok(path)
        })
        .collect()
}

fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    tracing::debug!(path = %path.display(), bytes = contents.len(), "Writing export");
    std::fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// First of `name`, `stem-2.ext`, `stem-3.ext`, ... that does not exist in `dir`.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    (2u32..)
        .map(|n| match extension {
            Some(ext) => dir.join(format!("{}-{}.{}", stem, n, ext)),
            None => dir.join(format!("{}-{}", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
