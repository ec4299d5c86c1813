//! Sprout CLI - create files and folders relative to any directory in a workspace
//!
//! Directories come from a gitignore-aware scan of each workspace root.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod flow;
mod prompt;

#[derive(Parser)]
#[command(name = "sprout")]
#[command(author = "Sprout Contributors")]
#[command(version)]
#[command(about = "Create files anywhere in your workspace", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter .sprout/config.json
    Init {
        /// Workspace root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List the directories a workspace offers
    Dirs {
        /// Workspace roots (defaults to current directory)
        roots: Vec<PathBuf>,

        /// Include each root itself in the listing
        #[arg(long)]
        include_root: bool,

        /// Print directory options as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick a directory and create a file or folder under it
    New {
        /// Path to create; a trailing slash makes a folder
        target: Option<String>,

        /// Workspace root, repeat for a multi-root workspace
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Base directory label or relative path, skips the picker
        #[arg(short, long)]
        from: Option<String>,

        /// File currently being edited
        #[arg(short, long)]
        current: Option<PathBuf>,

        /// Open the new file in $VISUAL or $EDITOR
        #[arg(short, long)]
        open: bool,
    },

    /// Show the effective settings for a workspace
    Config {
        /// Workspace root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Dirs {
            roots,
            include_root,
            json,
        } => commands::dirs(&roots, include_root, json),
        Commands::New {
            target,
            roots,
            from,
            current,
            open,
        } => {
            commands::new(commands::NewArgs {
                roots,
                from,
                target,
                current,
                open,
            })
            .await
        }
        Commands::Config { path } => commands::config(&path),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
