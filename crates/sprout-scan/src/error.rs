//! Scan errors.
//!
//! A scan either produces the complete filtered list or fails. There is
//! no partial result: a missing ignore file rule could surface
//! directories the user asked to hide.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan root doesn't exist.
    #[error("scan root '{0}' does not exist")]
    RootNotFound(PathBuf),

    /// The scan root exists but is a file.
    #[error("scan root '{0}' is not a directory")]
    NotADirectory(PathBuf),

    /// An ignore file was found but couldn't be read.
    #[error("failed to read ignore file '{path}': {source}")]
    ReadIgnoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A translated pattern isn't a valid glob.
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The directory walk hit an error other than a vanished entry.
    #[error("failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A stat or existence check failed.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
