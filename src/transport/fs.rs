use chrono::{DateTime, Utc};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::constants::layers::LAYER_EXTENSION;

/// True if the path has exactly the layer-file extension.
///
/// Matching is case-sensitive so every listed file is also the file a store
/// resolves for the same name.
pub fn is_layer_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(LAYER_EXTENSION)
}

/// Layer files directly under `root`, sorted by path.
///
/// Subdirectories are not searched; a missing root yields an empty list.
pub fn list_layer_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_layer_file(path))
        .collect();
    files.sort();
    files
}

/// Best-effort file modified time.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Write `contents` to `path` through a sibling temp file and a rename.
///
/// With `overwrite == false` the rename refuses to replace an existing file
/// and fails with `io::ErrorKind::AlreadyExists`. The temp file is removed on
/// every error path, so `path` is either untouched or fully written.
pub fn write_atomic(path: &Path, contents: &[u8], overwrite: bool) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    if overwrite {
        tmp.persist(path).map_err(|err| err.error)?;
    } else {
        tmp.persist_noclobber(path).map_err(|err| err.error)?;
    }
    Ok(())
}
