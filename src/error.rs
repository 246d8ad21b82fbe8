//! Error types for taskheap
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad task input, bad config)
//! - 3: No result (empty store, nothing ready, strict completion miss)
//! - 4: Operation failed (persistence, IO, locking)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskheap CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const NO_RESULT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskheap operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid task name: {0}")]
    InvalidName(String),

    #[error("Invalid priority '{0}': expected an integer")]
    InvalidPriority(String),

    #[error("Invalid due date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Task already pending: {0}")]
    DuplicateTask(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Negative results (exit code 3)
    #[error("No pending tasks")]
    EmptyStore,

    #[error("No ready task: every pending task is waiting on a dependency")]
    NoReadyTask,

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // Operation failures (exit code 4)
    #[error("Persistence failed during {operation}; in-memory state may be ahead of durable state: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Wrap a storage failure that happened after an in-memory mutation.
    pub fn persistence(operation: &'static str, source: Error) -> Self {
        Error::Persistence {
            operation,
            source: Box::new(source),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidName(_)
            | Error::InvalidPriority(_)
            | Error::InvalidDate(_)
            | Error::DuplicateTask(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Negative results
            Error::EmptyStore | Error::NoReadyTask | Error::TaskNotFound(_) => {
                exit_codes::NO_RESULT
            }

            // Operation failures
            Error::Persistence { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Persistence { operation, .. } => Some(serde_json::json!({
                "operation": operation,
                "in_memory_ahead": true,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "lock_path": path.display().to_string(),
            })),
            Error::TaskNotFound(name) | Error::DuplicateTask(name) => {
                Some(serde_json::json!({ "task": name }))
            }
            _ => None,
        }
    }
}

/// Result type alias for taskheap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
