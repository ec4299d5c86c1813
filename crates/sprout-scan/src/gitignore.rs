//! Finding the `.gitignore` files that apply to a directory.

use crate::error::{Result, ScanError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Name of the ignore files we read.
pub const GITIGNORE: &str = ".gitignore";

/// Collects every `.gitignore` from `dir` up to the filesystem root.
///
/// The result is closest-first. The walk stops once a directory is its
/// own parent, which covers `/` as well as drive roots like `C:\`.
pub fn gitignore_chain(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut current = absolute_normalized(dir)?;
    let mut found = Vec::new();

    loop {
        if let Some(file) = ignore_file_in(&current)? {
            found.push(file);
        }

        let parent = current.parent().unwrap_or(&current).to_path_buf();
        if parent == current {
            break;
        }
        current = parent;
    }

    Ok(found)
}

/// The `.gitignore` directly inside `dir`, if there is one.
///
/// Only a missing file counts as absent. Any other stat failure is an
/// error, since skipping the file would drop its rules.
pub fn ignore_file_in(dir: &Path) -> Result<Option<PathBuf>> {
    let candidate = dir.join(GITIGNORE);
    match fs::metadata(&candidate) {
        Ok(meta) if meta.is_file() => {
            debug!("Found {}", candidate.display());
            Ok(Some(candidate))
        }
        Ok(_) => Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ScanError::io(candidate, e)),
    }
}

/// Makes `path` absolute and removes `.` and `..` lexically.
///
/// Symlinks are left alone so reported paths keep the form the caller
/// gave us.
pub fn absolute_normalized(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| ScanError::io(path, e))?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
