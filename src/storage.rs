//! Storage layer for taskheap
//!
//! All durable state lives in one data directory:
//!
//! ```text
//! <data-dir>/
//!   taskheap.toml          # Optional configuration
//!   tasks.json             # Pending-task snapshot (array of 4-element arrays)
//!   tasks.json.lock        # fs2 lock guarding snapshot reads/writes
//!   completed.json         # Completed names (only with scheduler.persist_completed)
//!   completed.json.lock
//!   taskheap.lock          # Held by a CLI process for its whole command
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::lock;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TASKHEAP_DIR";

const SESSION_LOCK_FILE: &str = "taskheap.lock";

/// Platform default data directory (e.g. `~/.local/share/taskheap`).
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "taskheap")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "cannot determine a data directory; pass --data-dir or set {DATA_DIR_ENV}"
            ))
        })
}

/// Storage manager for taskheap state
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
    config: StorageConfig,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>, config: StorageConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
        }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.data_dir.join(self.config.snapshot_file.trim())
    }

    pub fn completed_file(&self) -> PathBuf {
        self.data_dir.join(self.config.completed_file.trim())
    }

    /// Lock serializing whole load-modify-save cycles across processes.
    pub fn session_lock_file(&self) -> PathBuf {
        self.data_dir.join(SESSION_LOCK_FILE)
    }

    pub fn lock_timeout_ms(&self) -> u64 {
        self.config.lock_timeout_ms
    }

    /// Create the data directory if needed
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    // =========================================================================
    // File I/O helpers (locked, atomic)
    // =========================================================================

    /// Write JSON atomically while holding the file's lock.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic_locked(path, json.as_bytes(), self.lock_timeout_ms())
    }

    /// Read JSON while holding the file's lock; `None` if the file is absent.
    pub fn read_json_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let Some(data) = lock::read_locked_optional(path, self.lock_timeout_ms())? else {
            return Ok(None);
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&data)?))
    }
}
