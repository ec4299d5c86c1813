//! Selection memory.
//!
//! A tiny key-value store scoped to one workspace, used to remember the
//! last picked directory and which roots were used most recently. The
//! store is a trait so the flow can run against an in-memory map in
//! tests and a JSON file on disk for real sessions.

use crate::error::{Error, Result};
use crate::location::{DirectoryOption, WorkspaceRoot};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LAST_KEY: &str = "last";
const RECENT_ROOTS_KEY: &str = "recentRoots";

/// Key-value persistence for one workspace.
pub trait MemoStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&mut self, key: &str, value: Value) -> Result<()>;
    fn has(&self, key: &str) -> bool;
    fn forget(&mut self, key: &str) -> Result<()>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn forget(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON file shared by all workspaces.
///
/// The file holds one object per workspace key; only this store's
/// namespace is read or rewritten.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    namespace: String,
    values: Map<String, Value>,
}

impl FileStore {
    /// Opens the namespace in the given file, creating nothing until the
    /// first write. A corrupt file is treated as empty.
    pub fn open(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let namespace = namespace.into();

        let values = match read_document(&path)? {
            Some(mut doc) => match doc.remove(&namespace) {
                Some(Value::Object(values)) => values,
                _ => Map::new(),
            },
            None => Map::new(),
        };

        debug!("Opened memo '{}' in {}", namespace, path.display());
        Ok(Self {
            path,
            namespace,
            values,
        })
    }

    /// `<data_dir>/sprout/memo.json`, if the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("sprout").join("memo.json"))
    }

    fn flush(&self) -> Result<()> {
        let mut doc = read_document(&self.path)?.unwrap_or_default();
        doc.insert(self.namespace.clone(), Value::Object(self.values.clone()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let text = serde_json::to_string_pretty(&Value::Object(doc))
            .map_err(|e| Error::Encode(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| Error::io(&self.path, e))
    }
}

fn read_document(path: &Path) -> Result<Option<Map<String, Value>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    match serde_json::from_str(&text) {
        Ok(Value::Object(doc)) => Ok(Some(doc)),
        _ => {
            warn!("Ignoring unreadable memo file {}", path.display());
            Ok(None)
        }
    }
}

impl MemoStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn forget(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Namespace for a set of roots: `workspace:<root1>;<root2>`.
pub fn workspace_key(roots: &[WorkspaceRoot]) -> String {
    let joined = roots
        .iter()
        .map(|r| r.root_path.display().to_string())
        .collect::<Vec<_>>()
        .join(";");
    format!("workspace:{}", joined)
}

/// The last picked directory, if one was remembered.
///
/// A value that no longer decodes is dropped from the store.
pub fn last_selection(store: &mut dyn MemoStore) -> Result<Option<DirectoryOption>> {
    let Some(value) = store.get(LAST_KEY) else {
        return Ok(None);
    };

    match serde_json::from_value(value) {
        Ok(option) => Ok(Some(option)),
        Err(e) => {
            debug!("Forgetting malformed last selection: {}", e);
            store.forget(LAST_KEY)?;
            Ok(None)
        }
    }
}

/// Root paths in most-recently-used order.
pub fn recent_roots(store: &dyn MemoStore) -> Vec<PathBuf> {
    store
        .get(RECENT_ROOTS_KEY)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Remembers a pick and moves its root to the front of the recent list.
pub fn cache_selection(
    store: &mut dyn MemoStore,
    dir: &DirectoryOption,
    root: &WorkspaceRoot,
) -> Result<()> {
    let value = serde_json::to_value(dir).map_err(|e| Error::Encode(e.to_string()))?;
    store.put(LAST_KEY, value)?;

    let mut recent = recent_roots(store);
    recent.retain(|p| p != &root.root_path);
    recent.insert(0, root.root_path.clone());

    let value = serde_json::to_value(&recent).map_err(|e| Error::Encode(e.to_string()))?;
    store.put(RECENT_ROOTS_KEY, value)
}

/// Orders roots by `desired`, keeping unknown roots last in their
/// original order.
pub fn sort_roots(roots: &[WorkspaceRoot], desired: &[PathBuf]) -> Vec<WorkspaceRoot> {
    let mut sorted = roots.to_vec();
    sorted.sort_by_key(|root| {
        desired
            .iter()
            .position(|p| p == &root.root_path)
            .unwrap_or(roots.len())
    });
    sorted
}

/// The root a picked directory lives under.
pub fn root_for_dir<'a>(
    roots: &'a [WorkspaceRoot],
    dir: &DirectoryOption,
) -> Option<&'a WorkspaceRoot> {
    roots
        .iter()
        .find(|r| dir.location.absolute.starts_with(&r.root_path))
}
