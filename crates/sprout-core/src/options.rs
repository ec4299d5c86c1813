//! Building the rows of the directory pick list.
//!
//! The list starts with a few convenience entries (last pick, the
//! current file's directory, the roots), followed by every scanned
//! directory of every root.

use crate::error::Result;
use crate::location::{DirectoryOption, FsLocation, PickItem, WorkspaceRoot};
use crate::memo::{last_selection, MemoStore};
use crate::settings::ConvenienceOption;
use std::path::Path;

/// One option per root, pointing at the root itself.
pub fn root_options(roots: &[WorkspaceRoot]) -> Vec<DirectoryOption> {
    roots
        .iter()
        .map(|root| {
            let location = FsLocation::root(&root.root_path);
            DirectoryOption {
                display_text: root.display_text(&location),
                location,
            }
        })
        .collect()
}

/// The directory holding `current_file`, if it lives under a root.
pub fn current_file_option(
    roots: &[WorkspaceRoot],
    current_file: Option<&Path>,
) -> Option<DirectoryOption> {
    let dir = current_file?.parent()?;
    let root = roots.iter().find(|r| dir.starts_with(&r.root_path))?;
    let relative = dir.strip_prefix(&root.root_path).ok()?;

    let location = FsLocation::under(&root.root_path, relative);
    Some(DirectoryOption {
        display_text: root.display_text(&location),
        location,
    })
}

/// Wraps scanned locations of one root as options.
pub fn subdir_options(root: &WorkspaceRoot, dirs: Vec<FsLocation>) -> Vec<DirectoryOption> {
    dirs.into_iter()
        .map(|location| DirectoryOption {
            display_text: root.display_text(&location),
            location,
        })
        .collect()
}

/// The convenience rows, in the configured order.
///
/// Entries that don't apply right now (nothing remembered, no current
/// file) are left out.
pub fn convenience_options(
    wanted: &[ConvenienceOption],
    roots: &[WorkspaceRoot],
    store: &mut dyn MemoStore,
    current_file: Option<&Path>,
) -> Result<Vec<PickItem>> {
    let mut items = Vec::new();

    for kind in wanted {
        match kind {
            ConvenienceOption::Last => {
                if let Some(option) = last_selection(store)? {
                    items.push(PickItem::new(option, Some("- last selection")));
                }
            }
            ConvenienceOption::Current => {
                if let Some(option) = current_file_option(roots, current_file) {
                    items.push(PickItem::new(option, Some("- current file")));
                }
            }
            ConvenienceOption::Root => {
                items.extend(
                    root_options(roots)
                        .into_iter()
                        .map(|o| PickItem::new(o, Some("- workspace root"))),
                );
            }
        }
    }

    Ok(items)
}
