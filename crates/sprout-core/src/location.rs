//! Workspace and location types.
//!
//! These are the plain values that flow between the scanner, the
//! option builders and whatever front end is asking the user to pick.
//! Nothing in here touches the filesystem.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

/// A directory position under a scan root.
///
/// `relative` always starts with a single separator; the scan root
/// itself is just the separator. Joining the root with `relative`
/// gives back `absolute`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FsLocation {
    /// Position under the root, e.g. `/src/bin`.
    pub relative: String,

    /// Resolved filesystem path.
    pub absolute: PathBuf,
}

impl FsLocation {
    /// The location of the root itself.
    pub fn root(root: &Path) -> Self {
        Self {
            relative: MAIN_SEPARATOR_STR.to_string(),
            absolute: root.to_path_buf(),
        }
    }

    /// Builds a location from a path relative to `root`.
    ///
    /// `relative` may or may not carry a leading separator already.
    pub fn under(root: &Path, relative: &Path) -> Self {
        let stripped: PathBuf = relative
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();

        if stripped.as_os_str().is_empty() {
            return Self::root(root);
        }

        Self {
            relative: format!("{}{}", MAIN_SEPARATOR, stripped.display()),
            absolute: root.join(&stripped),
        }
    }

    /// True for the `/` entry.
    pub fn is_root(&self) -> bool {
        self.relative == MAIN_SEPARATOR_STR
    }
}

/// One top-level folder the user is working in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRoot {
    pub root_path: PathBuf,
    pub base_name: String,
    pub is_part_of_multi_root: bool,
}

impl WorkspaceRoot {
    /// Builds the root list for a session from the folder paths.
    ///
    /// Every root is flagged multi-root when more than one is open.
    pub fn from_paths<I, P>(paths: I) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        let multi = paths.len() > 1;

        paths
            .into_iter()
            .map(|root_path| {
                let base_name = root_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root_path.display().to_string());
                Self {
                    root_path,
                    base_name,
                    is_part_of_multi_root: multi,
                }
            })
            .collect()
    }

    /// Display text for a location under this root.
    ///
    /// In a multi-root session the base name is prefixed so two roots
    /// with a `/src` each stay distinguishable.
    pub fn display_text(&self, location: &FsLocation) -> String {
        if !self.is_part_of_multi_root {
            return location.relative.clone();
        }
        if location.is_root() {
            format!("{}{}", MAIN_SEPARATOR, self.base_name)
        } else {
            format!("{}{}{}", MAIN_SEPARATOR, self.base_name, location.relative)
        }
    }
}

/// A directory the user can pick as the base for a new path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryOption {
    pub display_text: String,
    pub location: FsLocation,
}

/// One row in a pick list.
///
/// An item without an option stands for "create exactly what I typed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: Option<String>,
    pub option: Option<DirectoryOption>,
}

impl PickItem {
    pub fn new(option: DirectoryOption, description: Option<&str>) -> Self {
        Self {
            label: option.display_text.clone(),
            description: description.map(str::to_string),
            option: Some(option),
        }
    }
}
