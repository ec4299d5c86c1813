//! The pick → input → create sequence.

use crate::prompt::Prompter;
use sprout_core::memo::{cache_selection, recent_roots, root_for_dir, sort_roots};
use sprout_core::options::{convenience_options, subdir_options};
use sprout_core::{
    create_file_or_folder, is_folder_descriptor, resolve_target, DirectoryOption, MemoStore,
    PickItem, Settings, WorkspaceRoot,
};
use sprout_scan::{directories, ScanError, ScanOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const PICK_PLACEHOLDER: &str =
    "First, select an existing path to create relative to (larger projects may take a moment to load)";
const INPUT_PLACEHOLDER: &str = "Filename or relative path to file";

#[derive(Error, Debug)]
pub enum FlowError {
    #[error(
        "It doesn't look like you have a folder opened in your workspace. Try opening a folder first."
    )]
    NoWorkspace,

    #[error("no directory matches '{0}'")]
    UnknownDirectory(String),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Core(#[from] sprout_core::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Everything the flow needs to know about the session.
#[derive(Debug, Clone)]
pub struct Session {
    pub roots: Vec<WorkspaceRoot>,
    pub settings: Settings,
    /// The file the user is working on, if any.
    pub current_file: Option<PathBuf>,
}

/// Answers given up front on the command line.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    /// Label or relative path of the base directory.
    pub from: Option<String>,
    /// Path to create under the base directory.
    pub target: Option<String>,
}

/// What the flow produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub path: PathBuf,
    pub is_folder: bool,
}

/// Runs the flow. `Ok(None)` means the user backed out at some step.
pub async fn run(
    session: &Session,
    store: &mut dyn MemoStore,
    prompter: &mut dyn Prompter,
    preset: &Preset,
) -> Result<Option<Created>, FlowError> {
    if session.roots.is_empty() {
        return Err(FlowError::NoWorkspace);
    }

    let sorted = sort_roots(&session.roots, &recent_roots(store));

    prompter.loading(Some("Scanning directories..."));
    let items = pick_items(&sorted, &session.settings, store, session.current_file.as_deref()).await;
    prompter.loading(None);
    let items = items?;

    let Some(dir) = choose_directory(&items, preset.from.as_deref(), prompter)? else {
        debug!("No directory selected");
        return Ok(None);
    };

    if let Some(root) = root_for_dir(&session.roots, &dir) {
        cache_selection(store, &dir, root)?;
    }

    let input = match &preset.target {
        Some(target) => Some(target.clone()),
        None => prompter.input(&format!("Relative to {}", dir.display_text), INPUT_PLACEHOLDER)?,
    };
    let Some(input) = input.filter(|i| !i.trim().is_empty()) else {
        debug!("No path entered");
        return Ok(None);
    };

    let target = resolve_target(&dir.location.absolute, input.trim());
    let is_folder = is_folder_descriptor(&target);
    let path = create_file_or_folder(&target)?;

    Ok(Some(Created { path, is_folder }))
}

/// Convenience rows followed by every scanned directory of every root.
pub async fn pick_items(
    roots: &[WorkspaceRoot],
    settings: &Settings,
    store: &mut dyn MemoStore,
    current_file: Option<&Path>,
) -> Result<Vec<PickItem>, FlowError> {
    let mut items = convenience_options(&settings.convenience_options, roots, store, current_file)?;

    let options = ScanOptions::from_settings(settings);
    for root in roots {
        let dirs = directories(&root.root_path, &options).await?;
        items.extend(
            subdir_options(root, dirs)
                .into_iter()
                .map(|option| PickItem::new(option, None)),
        );
    }

    Ok(items)
}

fn choose_directory(
    items: &[PickItem],
    preset: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Option<DirectoryOption>, FlowError> {
    let index = match preset {
        Some(wanted) => Some(
            items
                .iter()
                .position(|i| i.label == wanted || matches_relative(i, wanted))
                .ok_or_else(|| FlowError::UnknownDirectory(wanted.to_string()))?,
        ),
        None => prompter.pick(PICK_PLACEHOLDER, items)?,
    };

    Ok(index.and_then(|i| items.get(i)).and_then(|i| i.option.clone()))
}

fn matches_relative(item: &PickItem, wanted: &str) -> bool {
    item.option
        .as_ref()
        .is_some_and(|o| o.location.relative == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::MemoryStore;
    use std::collections::VecDeque;
    use std::fs;
    use std::io;
    use std::path::MAIN_SEPARATOR;
    use tempfile::tempdir;

    /// Answers from a script; records what it was asked.
    #[derive(Default)]
    struct Scripted {
        picks: VecDeque<Option<String>>,
        inputs: VecDeque<Option<String>>,
        prompts: Vec<String>,
        seen_labels: Vec<String>,
    }

    impl Prompter for Scripted {
        fn loading(&mut self, _message: Option<&str>) {}

        fn pick(&mut self, _placeholder: &str, items: &[PickItem]) -> io::Result<Option<usize>> {
            self.seen_labels = items.iter().map(|i| i.label.clone()).collect();
            let answer = self.picks.pop_front().flatten();
            Ok(answer.and_then(|label| items.iter().position(|i| i.label == label)))
        }

        fn input(&mut self, prompt: &str, _placeholder: &str) -> io::Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.inputs.pop_front().flatten())
        }
    }

    fn session(root: &Path) -> Session {
        Session {
            roots: WorkspaceRoot::from_paths([root]),
            settings: Settings {
                use_gitignore: false,
                ..Settings::default()
            },
            current_file: None,
        }
    }

    fn sep(rel: &str) -> String {
        format!("{}{}", MAIN_SEPARATOR, rel)
    }

    #[tokio::test]
    async fn test_creates_file_under_picked_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        let session = session(dir.path());
        let mut store = MemoryStore::new();
        let mut prompter = Scripted {
            picks: VecDeque::from([Some(sep("src"))]),
            inputs: VecDeque::from([Some("handlers/mod.rs".to_string())]),
            ..Scripted::default()
        };

        let created = run(&session, &mut store, &mut prompter, &Preset::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.path, dir.path().join("src").join("handlers/mod.rs"));
        assert!(!created.is_folder);
        assert!(created.path.is_file());
        assert_eq!(prompter.prompts, [format!("Relative to {}", sep("src"))]);
    }

    #[tokio::test]
    async fn test_remembers_last_selection() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        let session = session(dir.path());
        let mut store = MemoryStore::new();

        let preset = Preset {
            from: Some(sep("src")),
            target: Some("new-folder/".to_string()),
        };
        let mut prompter = Scripted::default();
        let created = run(&session, &mut store, &mut prompter, &preset)
            .await
            .unwrap()
            .unwrap();
        assert!(created.is_folder);
        assert!(dir.path().join("src/new-folder").is_dir());

        let mut prompter = Scripted::default();
        run(&session, &mut store, &mut prompter, &Preset::default())
            .await
            .unwrap();
        assert_eq!(prompter.seen_labels[0], sep("src"));
    }

    #[tokio::test]
    async fn test_no_selection_short_circuits() {
        let dir = tempdir().unwrap();
        let session = session(dir.path());
        let mut store = MemoryStore::new();
        let mut prompter = Scripted::default();

        let outcome = run(&session, &mut store, &mut prompter, &Preset::default())
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert!(prompter.prompts.is_empty());
        assert!(!store.has("last"));
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        let dir = tempdir().unwrap();
        let session = session(dir.path());
        let mut store = MemoryStore::new();
        let mut prompter = Scripted {
            picks: VecDeque::from([Some(sep(""))]),
            inputs: VecDeque::from([Some("   ".to_string())]),
            ..Scripted::default()
        };

        let outcome = run(&session, &mut store, &mut prompter, &Preset::default())
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_no_roots_is_an_error() {
        let session = Session {
            roots: Vec::new(),
            settings: Settings::default(),
            current_file: None,
        };
        let mut store = MemoryStore::new();
        let mut prompter = Scripted::default();

        let err = run(&session, &mut store, &mut prompter, &Preset::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::NoWorkspace));
    }

    #[tokio::test]
    async fn test_unknown_preset_directory() {
        let dir = tempdir().unwrap();
        let session = session(dir.path());
        let mut store = MemoryStore::new();
        let preset = Preset {
            from: Some(sep("missing")),
            target: None,
        };

        let err = run(&session, &mut store, &mut Scripted::default(), &preset)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::UnknownDirectory(_)));
    }

    #[tokio::test]
    async fn test_items_put_convenience_rows_first() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/bin")).unwrap();
        let session = session(dir.path());
        let mut store = MemoryStore::new();

        let items = pick_items(&session.roots, &session.settings, &mut store, None)
            .await
            .unwrap();
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();

        assert_eq!(labels[0], sep(""));
        assert_eq!(items[0].description.as_deref(), Some("- workspace root"));
        assert!(labels.contains(&sep("src").as_str()));
        assert!(labels.contains(&format!("{0}src{0}bin", MAIN_SEPARATOR).as_str()));
    }
}
