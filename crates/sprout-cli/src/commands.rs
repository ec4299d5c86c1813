//! CLI command implementations.

use crate::flow::{self, Created, FlowError, Preset, Session};
use crate::prompt::{start_spinner, TerminalPrompter};
use colored::Colorize;
use sprout_core::memo::workspace_key;
use sprout_core::options::subdir_options;
use sprout_core::settings::{workspace_config_path, WORKSPACE_DIR};
use sprout_core::{FileStore, Settings, WorkspaceRoot};
use sprout_scan::{absolute_normalized, scan, ScanOptions};
use std::path::{Path, PathBuf};
use std::process::Command;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const MEMO_FILE: &str = "memo.json";

/// Write a starter config into a workspace.
pub fn init(path: &Path) -> Result<()> {
    if !Settings::write_default(path)? {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    println!(
        "{} Wrote {}",
        "✓".green(),
        workspace_config_path(path).display()
    );
    println!("  Run {} to see what Sprout will offer", "sprout dirs".cyan());
    Ok(())
}

/// Scan roots and list the directories.
pub fn dirs(paths: &[PathBuf], include_root: bool, json: bool) -> Result<()> {
    let roots = workspace_roots(paths)?;
    let mut listed = Vec::new();

    for root in &roots {
        let settings = Settings::load(&root.root_path)?;
        let options = ScanOptions {
            include_root,
            ..ScanOptions::from_settings(&settings)
        };

        let spinner = (!json).then(|| start_spinner(&format!("Scanning {}...", root.base_name)));
        let report = scan(&root.root_path, &options)?;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if !json {
            println!(
                "{} {} directories in {} ({} excluded, {}ms)",
                "✓".green(),
                report.directories.len().to_string().cyan(),
                root.root_path.display(),
                report.excluded,
                report.duration_ms
            );
        }
        listed.extend(subdir_options(root, report.directories));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else {
        for option in &listed {
            println!("  {}", option.display_text);
        }
    }

    Ok(())
}

/// Print the effective settings for a root.
pub fn config(path: &Path) -> Result<()> {
    let root = absolute_normalized(path)?;
    let settings = Settings::load(&root)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Options for the `new` command.
pub struct NewArgs {
    pub roots: Vec<PathBuf>,
    pub from: Option<String>,
    pub target: Option<String>,
    pub current: Option<PathBuf>,
    pub open: bool,
}

/// Pick a directory, enter a path, create it.
pub async fn new(args: NewArgs) -> Result<()> {
    let roots = workspace_roots(&args.roots)?;
    let Some(first) = roots.first() else {
        return Err(FlowError::NoWorkspace.into());
    };
    let settings = Settings::load(&first.root_path)?;
    let memo_path = FileStore::default_path()
        .unwrap_or_else(|| first.root_path.join(WORKSPACE_DIR).join(MEMO_FILE));

    let current_file = args
        .current
        .as_deref()
        .map(absolute_normalized)
        .transpose()?;

    let mut store = FileStore::open(memo_path, workspace_key(&roots))?;

    let session = Session {
        roots,
        settings,
        current_file,
    };
    let preset = Preset {
        from: args.from,
        target: args.target,
    };

    let mut prompter = TerminalPrompter::stdio();
    let Some(created) = flow::run(&session, &mut store, &mut prompter, &preset).await? else {
        eprintln!("{}", "No selection".dimmed());
        return Ok(());
    };

    report_created(&created, &session.settings, args.open)
}

fn report_created(created: &Created, settings: &Settings, open: bool) -> Result<()> {
    if created.is_folder {
        if settings.show_information_messages {
            println!("{} Folder created: {}", "✓".green(), created.path.display());
        }
        return Ok(());
    }

    if open {
        open_in_editor(&created.path)?;
    } else {
        println!("{}", created.path.display());
    }
    Ok(())
}

/// Opens a file with `$VISUAL` or `$EDITOR`.
fn open_in_editor(path: &Path) -> Result<()> {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .map_err(|_| "Could not open document: neither $VISUAL nor $EDITOR is set")?;

    let status = Command::new(&editor).arg(path).status()?;
    if !status.success() {
        return Err(format!("Could not open document: {} exited with {}", editor, status).into());
    }
    Ok(())
}

/// Roots from the command line, defaulting to the current directory.
fn workspace_roots(paths: &[PathBuf]) -> Result<Vec<WorkspaceRoot>> {
    let paths = if paths.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        paths.to_vec()
    };

    let absolute = paths
        .iter()
        .map(PathBuf::as_path)
        .map(absolute_normalized)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(WorkspaceRoot::from_paths(absolute))
}
