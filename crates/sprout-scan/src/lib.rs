//! Sprout Scan - gitignore-aware directory discovery
//!
//! This crate handles the file system side of things:
//! - Finding every `.gitignore` that applies to a root
//! - Translating ignore lines and exclusion settings into globs
//! - Walking the root and keeping the directories no rule excludes
//!
//! Every call is a fresh, independent pass. Nothing is cached between
//! scans.

mod error;
mod gitignore;
mod patterns;
mod rules;
mod scanner;

pub use error::{Result, ScanError};
pub use gitignore::{absolute_normalized, gitignore_chain, ignore_file_in, GITIGNORE};
pub use patterns::{patterns_from_file, patterns_from_str, GlobPattern};
pub use rules::{ExclusionSet, RuleSet, RuleSource, Verdict};
pub use scanner::{directories, directories_sync, scan, ScanOptions, ScanReport};
