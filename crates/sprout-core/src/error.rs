//! Error types shared by the core crate.
//!
//! Each variant names the path or key it failed on, so the CLI can print
//! it as-is without extra context.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for fallible core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Things that can go wrong outside of a directory scan.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing something on disk failed.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings file exists but isn't valid JSON for our schema.
    #[error("invalid settings in '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value couldn't be converted to or from JSON.
    #[error("failed to encode value: {0}")]
    Encode(String),
}

impl Error {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
