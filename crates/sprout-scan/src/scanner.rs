//! Directory scanning.
//!
//! Walks a root and returns every directory below it that no ignore
//! rule excludes. An excluded directory is pruned, so nothing beneath
//! it is visited or returned.

use crate::error::{Result, ScanError};
use crate::gitignore::{absolute_normalized, ignore_file_in};
use crate::rules::{ExclusionSet, RuleSet};
use sprout_core::{FsLocation, NegationMode, Settings};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Options for a directory scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Read `.gitignore` files from the root up to the filesystem root.
    pub use_gitignore: bool,

    /// Merged `{pattern: exclude?}` settings. Only `true` entries count.
    pub exclude: BTreeMap<String, bool>,

    /// Put the root itself first in the result, as `/`.
    pub include_root: bool,

    /// List directories whose name starts with a dot.
    pub include_hidden: bool,

    /// Descend into symlinked directories.
    pub follow_symlinks: bool,

    /// Also read `.gitignore` files found below the root, each applying
    /// to its own subtree.
    pub nested_gitignores: bool,

    pub negation: NegationMode,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            exclude: BTreeMap::new(),
            include_root: false,
            include_hidden: false,
            follow_symlinks: false,
            nested_gitignores: true,
            negation: NegationMode::Strip,
        }
    }
}

impl ScanOptions {
    /// Scan options for the given settings. The root is not included.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            use_gitignore: settings.use_gitignore,
            exclude: settings.exclude_map(),
            include_root: false,
            include_hidden: settings.include_hidden,
            follow_symlinks: settings.follow_symlinks,
            nested_gitignores: settings.nested_gitignores,
            negation: settings.negation,
        }
    }
}

/// Result of scanning a root.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// The root that was scanned, absolute.
    pub root: PathBuf,

    /// Surviving directories, in walk order.
    pub directories: Vec<FsLocation>,

    /// Number of directories pruned by ignore rules.
    pub excluded: usize,

    /// Number of patterns the exclusion set started with.
    pub patterns: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Scans `root` and returns the directories that survive the rules.
///
/// The order is a file-name sorted depth-first walk, so it is stable
/// for an unchanged tree.
///
/// # Example
///
/// ```no_run
/// use sprout_scan::{directories_sync, ScanOptions};
/// use std::path::Path;
///
/// let dirs = directories_sync(Path::new("."), &ScanOptions::default()).unwrap();
/// for dir in dirs {
///     println!("{}", dir.relative);
/// }
/// ```
pub fn directories_sync(root: &Path, options: &ScanOptions) -> Result<Vec<FsLocation>> {
    scan(root, options).map(|report| report.directories)
}

/// Async entry point for [`directories_sync`].
///
/// Yields to the runtime once before walking, so a caller can show a
/// loading state first. The walk itself is synchronous.
pub async fn directories(root: &Path, options: &ScanOptions) -> Result<Vec<FsLocation>> {
    tokio::task::yield_now().await;
    directories_sync(root, options)
}

/// Scans `root` and reports what was kept and how much was pruned.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    let start = Instant::now();
    let root = absolute_normalized(root)?;

    match fs::metadata(&root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ScanError::NotADirectory(root)),
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ScanError::RootNotFound(root)),
        Err(e) => return Err(ScanError::io(root, e)),
    }

    info!("Starting scan of {}", root.display());

    let mut rules = ExclusionSet::build(
        &root,
        options.use_gitignore,
        &options.exclude,
        options.negation,
    )?;
    let patterns = rules.pattern_count();

    let mut directories = Vec::new();
    let mut excluded = 0;

    if options.include_root {
        directories.push(FsLocation::root(&root));
    }

    let mut walker = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter();

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                skip_walk_error(err, &root)?;
                continue;
            }
        };
        let path = entry.path();
        let descends = entry.file_type().is_dir();

        if !options.include_hidden && is_hidden(&entry) {
            if descends {
                walker.skip_current_dir();
            }
            continue;
        }

        match is_directory(&entry)? {
            Some(true) => {}
            Some(false) => continue,
            None => {
                debug!("{} vanished during scan", path.display());
                continue;
            }
        }

        rules.retain_ancestors_of(path);
        if rules.is_excluded(path) {
            debug!("Excluded {}", path.display());
            excluded += 1;
            if descends {
                walker.skip_current_dir();
            }
            continue;
        }

        let relative = path.strip_prefix(&root).unwrap_or(path);
        directories.push(FsLocation::under(&root, relative));

        if descends && options.use_gitignore && options.nested_gitignores {
            if let Some(file) = ignore_file_in(path)? {
                rules.push_ignore_file(RuleSet::from_ignore_file(&file)?);
            }
        }
    }

    let duration = start.elapsed();
    info!(
        "Found {} directories ({} excluded) in {:?}",
        directories.len(),
        excluded,
        duration
    );

    Ok(ScanReport {
        root,
        directories,
        excluded,
        patterns,
        duration_ms: duration.as_millis() as u64,
    })
}

/// Decides whether a walk error ends the scan.
///
/// Entries that vanished, symlink loops and unreadable directories are
/// skipped; anything else is returned as an error.
fn skip_walk_error(err: walkdir::Error, root: &Path) -> Result<()> {
    if err.loop_ancestor().is_some() {
        warn!("Skipping symlink loop at {:?}", err.path());
        return Ok(());
    }

    match err.io_error().map(std::io::Error::kind) {
        Some(ErrorKind::NotFound) => {
            debug!("{:?} vanished during scan", err.path());
            Ok(())
        }
        Some(ErrorKind::PermissionDenied) => {
            warn!("Skipping unreadable {:?}", err.path());
            Ok(())
        }
        _ => Err(ScanError::Walk {
            path: err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source: err,
        }),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Stats an entry. `None` means it no longer exists.
fn is_directory(entry: &DirEntry) -> Result<Option<bool>> {
    if !entry.path_is_symlink() {
        return Ok(Some(entry.file_type().is_dir()));
    }

    match fs::metadata(entry.path()) {
        Ok(meta) => Ok(Some(meta.is_dir())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ScanError::io(entry.path(), e)),
    }
}
