//! Creating the picked file or folder.

use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, info};

/// A path ending in a separator names a folder.
pub fn is_folder_descriptor(path: &Path) -> bool {
    let text = path.as_os_str().to_string_lossy();
    text.ends_with('/') || text.ends_with(MAIN_SEPARATOR)
}

/// Joins user input under a base directory.
///
/// The input is always relative to `base`, even when it starts with a
/// separator. A trailing separator is preserved.
pub fn resolve_target(base: &Path, input: &str) -> PathBuf {
    let trimmed = input.trim_start_matches(['/', MAIN_SEPARATOR]);
    base.join(trimmed)
}

/// Creates `path` and any missing parents.
///
/// A folder descriptor creates a folder; anything else an empty file.
/// Nothing that already exists is touched. Returns `path` unchanged.
pub fn create_file_or_folder(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        debug!("{} already exists, leaving it alone", path.display());
        return Ok(path.to_path_buf());
    }

    if is_folder_descriptor(path) {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        info!("Created folder {}", path.display());
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        info!("Created file {}", path.display());
    }

    Ok(path.to_path_buf())
}
