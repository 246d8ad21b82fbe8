//! taskheap - priority task scheduler library
//!
//! Keeps pending tasks in a min-heap ordered by `(priority, due_date)`,
//! tracks completed task names, and hands out the most urgent task whose
//! dependencies have all completed. State is saved after every mutation.
//!
//! # Core Concepts
//!
//! - **Task records**: name, integer priority (lower is more urgent), due date, dependencies
//! - **Completion ledger**: names known to be done; only ever grows
//! - **Gating**: a task is ready once every dependency is in the ledger
//! - **Snapshots**: the pending set as a JSON array of `[priority, due, name, deps]`
//!
//! # Module Organization
//!
//! - `task`: Task records, due dates and input validation
//! - `ledger`: Completion ledger
//! - `heap`: Priority store (binary min-heap with stable ties)
//! - `scheduler`: Add / list / complete / next-ready operations
//! - `shared`: Thread-safe scheduler handle
//! - `persist`: Snapshot store trait with file and memory backends
//! - `storage`: Data directory layout and JSON helpers
//! - `lock`: File locking and atomic writes
//! - `config`: Configuration loading from `taskheap.toml`
//! - `output`: Human and JSON command output
//! - `cli`: Command-line interface using clap
//! - `error`: Error types and result aliases

pub mod cli;
pub mod config;
pub mod error;
pub mod heap;
pub mod ledger;
pub mod lock;
pub mod output;
pub mod persist;
pub mod scheduler;
pub mod shared;
pub mod storage;
pub mod task;

pub use error::{Error, Result};
pub use scheduler::{Completion, GatingMode, Scheduler, SchedulerOptions};
pub use task::{TaskDraft, TaskRecord};
