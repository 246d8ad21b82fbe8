//! Command-line interface for taskheap
//!
//! This module defines the CLI structure using clap derive macros.
//! Task commands live in `task`, the interactive menu in `shell`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::lock::FileLock;
use crate::persist::FileSnapshotStore;
use crate::scheduler::{GatingMode, Scheduler};
use crate::storage::{self, Storage, DATA_DIR_ENV};

mod shell;
mod task;

/// taskheap - priority task scheduler
///
/// Keeps pending tasks ordered by priority then due date, and hands out the
/// most urgent one whose dependencies are complete.
#[derive(Parser, Debug)]
#[command(name = "taskheap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the snapshot and config (defaults to the platform data dir)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to <data-dir>/taskheap.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Drop blocked tasks when looking for the next one (legacy behaviour)
    #[arg(long, global = true)]
    pub legacy_discard: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a pending task
    Add {
        /// Task name
        name: String,

        /// Priority; lower numbers are more urgent
        #[arg(short, long, allow_hyphen_values = true)]
        priority: String,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: String,

        /// Task that must complete first (repeatable)
        #[arg(long = "dep")]
        dep: Vec<String>,

        /// Comma separated dependencies
        #[arg(long)]
        deps: Option<String>,
    },

    /// List pending tasks, most urgent first
    List,

    /// Mark a task as complete and remove it from the pending set
    Complete {
        /// Task name
        name: String,

        /// Fail (exit 3) when no pending task has this name
        #[arg(long)]
        strict: bool,
    },

    /// Show the most urgent task whose dependencies are complete
    Next,

    /// Interactive menu
    Shell,
}

/// Where state lives and how the scheduler behaves.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub legacy_discard: bool,
}

pub(crate) struct Context {
    pub scheduler: Scheduler<FileSnapshotStore>,
    pub data_dir: PathBuf,
    _session: FileLock,
}

/// Resolve data dir and config, then open the scheduler over the file store.
///
/// The returned context holds the data directory's session lock until it is
/// dropped, so concurrent invocations never interleave load and save.
pub(crate) fn load_context(options: ContextOptions) -> Result<Context> {
    let data_dir = match options.data_dir {
        Some(dir) => dir,
        None => storage::default_data_dir()?,
    };

    let config = match options.config {
        Some(path) => Config::load(&path)?,
        None => Config::load_or_default(&data_dir.join(crate::config::CONFIG_FILE)),
    };

    let mut scheduler_options = config.scheduler.options()?;
    if options.legacy_discard {
        scheduler_options.gating = GatingMode::Discard;
    }

    let storage = Storage::new(data_dir.clone(), config.storage);
    storage.init()?;
    let session = FileLock::acquire(storage.session_lock_file(), storage.lock_timeout_ms())?;
    tracing::debug!(data_dir = %data_dir.display(), "opening scheduler");

    let scheduler = Scheduler::open(FileSnapshotStore::new(storage), scheduler_options)?;
    Ok(Context {
        scheduler,
        data_dir,
        _session: session,
    })
}

impl Cli {
    fn context_options(&self) -> ContextOptions {
        ContextOptions {
            data_dir: self.data_dir.clone(),
            config: self.config.clone(),
            legacy_discard: self.legacy_discard,
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let context = self.context_options();
        match self.command {
            Commands::Add {
                name,
                priority,
                due,
                dep,
                deps,
            } => {
                let mut dependencies = dep;
                if let Some(list) = deps {
                    dependencies.extend(crate::task::split_dependency_list(&list));
                }
                task::run_add(task::AddOptions {
                    name,
                    priority,
                    due,
                    dependencies,
                    context,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
            Commands::List => task::run_list(task::ListOptions {
                context,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Complete { name, strict } => task::run_complete(task::CompleteOptions {
                name,
                strict,
                context,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Next => task::run_next(task::NextOptions {
                context,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Shell => shell::run(shell::ShellOptions { context }),
        }
    }
}
