//! Layered settings.
//!
//! Settings come from three JSON layers, each overriding the one before:
//! built-in defaults, the user file under the platform config dir, and
//! the workspace file at `<root>/.sprout/config.json`. Objects are merged
//! key by key, so a workspace can add one exclude without restating the
//! user's list.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name for per-workspace state.
pub const WORKSPACE_DIR: &str = ".sprout";

/// File name of a settings layer.
pub const CONFIG_FILE: &str = "config.json";

/// An exclusion setting: either a `{pattern: bool}` map or a plain list.
///
/// A list is shorthand for a map where every entry is `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeSetting {
    Map(BTreeMap<String, bool>),
    List(Vec<String>),
}

impl Default for ExcludeSetting {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl ExcludeSetting {
    /// Normalises to the map form.
    pub fn to_map(&self) -> BTreeMap<String, bool> {
        match self {
            Self::Map(map) => map.clone(),
            Self::List(list) => list.iter().map(|p| (p.clone(), true)).collect(),
        }
    }
}

/// Extra entries shown above the scanned directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvenienceOption {
    /// The directory picked last time in this workspace.
    Last,
    /// The directory of the file the user is working on.
    Current,
    /// Each workspace root.
    Root,
}

/// How `!pattern` lines in ignore files are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NegationMode {
    /// Drop the `!` and exclude the pattern like any other.
    #[default]
    Strip,
    /// gitignore semantics: the last matching pattern decides, and a
    /// negated one re-includes.
    Honor,
}

/// Effective settings for one workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Sprout's own exclusions.
    pub exclude: ExcludeSetting,

    /// Editor-wide file exclusions. Wins over `exclude` on a shared key.
    pub files_exclude: ExcludeSetting,

    /// Read `.gitignore` files when scanning.
    pub use_gitignore: bool,

    /// Which convenience entries to show, in order.
    pub convenience_options: Vec<ConvenienceOption>,

    /// Report created folders.
    pub show_information_messages: bool,

    pub negation: NegationMode,

    /// List dot-directories too.
    pub include_hidden: bool,

    pub follow_symlinks: bool,

    /// Honour `.gitignore` files found below the scan root.
    pub nested_gitignores: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exclude: ExcludeSetting::default(),
            files_exclude: ExcludeSetting::default(),
            use_gitignore: true,
            convenience_options: vec![
                ConvenienceOption::Last,
                ConvenienceOption::Current,
                ConvenienceOption::Root,
            ],
            show_information_messages: true,
            negation: NegationMode::Strip,
            include_hidden: false,
            follow_symlinks: false,
            nested_gitignores: true,
        }
    }
}

impl Settings {
    /// Loads the effective settings for a workspace root.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(user) = user_config_path() {
            layers.push(user);
        }
        layers.push(workspace_config_path(workspace_root));
        Self::from_layers(&layers)
    }

    /// Merges the given files over the defaults. Missing files are skipped.
    pub fn from_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = serde_json::to_value(Self::default())
            .map_err(|e| Error::Encode(e.to_string()))?;

        for path in paths {
            let contents = match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io(path, e)),
            };
            debug!("Loading settings layer {}", path.display());
            let layer: Value = serde_json::from_str(&contents).map_err(|source| Error::Config {
                path: path.clone(),
                source,
            })?;
            merge_json(&mut merged, layer);
        }

        serde_json::from_value(merged).map_err(|source| Error::Config {
            path: paths.last().cloned().unwrap_or_default(),
            source,
        })
    }

    /// The merged `{pattern: bool}` exclusion map.
    ///
    /// `files_exclude` is applied after `exclude`, so it decides on any
    /// pattern both mention.
    pub fn exclude_map(&self) -> BTreeMap<String, bool> {
        let mut map = self.exclude.to_map();
        map.extend(self.files_exclude.to_map());
        map
    }

    /// Writes a starter workspace config. Returns `false` if one exists.
    pub fn write_default(workspace_root: &Path) -> Result<bool> {
        let path = workspace_config_path(workspace_root);
        if path.exists() {
            return Ok(false);
        }
        let dir = workspace_root.join(WORKSPACE_DIR);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let starter = serde_json::json!({
            "exclude": {
                "**/node_modules": true,
                "**/target": true,
            },
            "useGitignore": true,
            "convenienceOptions": ["last", "current", "root"],
        });
        let text = serde_json::to_string_pretty(&starter).map_err(|e| Error::Encode(e.to_string()))?;
        fs::write(&path, text).map_err(|e| Error::io(&path, e))?;
        Ok(true)
    }
}

/// `<root>/.sprout/config.json`
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_DIR).join(CONFIG_FILE)
}

/// `<config_dir>/sprout/config.json`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sprout").join(CONFIG_FILE))
}

/// Deep-merges `overlay` into `base`. Non-object values replace.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
