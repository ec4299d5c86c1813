//! Sprout Core - workspace types, settings and selection memory
//!
//! This crate holds everything Sprout needs besides the directory scan
//! itself: the location types the scanner produces, layered settings,
//! the per-workspace memo of past picks, the convenience entries of the
//! pick list, and creation of the final file or folder.
//!
//! # Example
//!
//! ```no_run
//! use sprout_core::{create_file_or_folder, resolve_target};
//! use std::path::Path;
//!
//! let target = resolve_target(Path::new("/work/app/src"), "handlers/mod.rs");
//! create_file_or_folder(&target).unwrap();
//! ```

pub mod create;
pub mod error;
pub mod location;
pub mod memo;
pub mod options;
pub mod settings;

pub use create::{create_file_or_folder, is_folder_descriptor, resolve_target};
pub use error::{Error, Result};
pub use location::{DirectoryOption, FsLocation, PickItem, WorkspaceRoot};
pub use memo::{FileStore, MemoStore, MemoryStore};
pub use settings::{ConvenienceOption, ExcludeSetting, NegationMode, Settings};
