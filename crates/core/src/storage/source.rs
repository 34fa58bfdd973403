//! Document sources: where bulk ingestion gets file content from.

use crate::config::INDEXABLE_EXTENSION;
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supplies the text of a document given its path.
///
/// Shared across ingestion workers, so implementations must be `Sync`.
pub trait DocumentSource: Sync {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads documents from the local filesystem. Bytes that are not valid UTF-8
/// are replaced rather than rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DocumentSource for FsSource {
    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

/// Recursively list the regular files under `dir` with the indexable
/// extension, sorted by path.
///
/// Fails if `dir` itself cannot be read; unreadable entries below it are
/// logged and skipped.
pub fn collect_indexable_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let extension = OsStr::new(INDEXABLE_EXTENSION);
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(Error::io(dir, e.into())),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {:?}: {}", dir, e);
                continue;
            }
        };
        if entry.file_type().is_file() && entry.path().extension() == Some(extension) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::debug!("Found {} indexable files under {:?}", files.len(), dir);
    Ok(files)
}
