//! Configuration loading and management
//!
//! Handles parsing of `taskheap.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::scheduler::{GatingMode, SchedulerOptions};

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = "taskheap.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scheduling behaviour
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file name, relative to the data directory
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// Completed-task ledger file name (only used when persisted)
    #[serde(default = "default_completed_file")]
    pub completed_file: String,

    /// How long to wait for the snapshot lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_snapshot_file() -> String {
    "tasks.json".to_string()
}

fn default_completed_file() -> String {
    "completed.json".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            completed_file: default_completed_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How blocked tasks are handled by `next`: "requeue" or "discard"
    #[serde(default = "default_gating")]
    pub gating: String,

    /// Persist the completed-task ledger next to the snapshot
    #[serde(default)]
    pub persist_completed: bool,

    /// Save the snapshot after discard-mode gating drops tasks
    #[serde(default = "default_true")]
    pub persist_after_discard: bool,

    /// Refuse to add a task whose name is already pending
    #[serde(default)]
    pub reject_duplicates: bool,
}

fn default_gating() -> String {
    "requeue".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            gating: default_gating(),
            persist_completed: false,
            persist_after_discard: true,
            reject_duplicates: false,
        }
    }
}

impl SchedulerConfig {
    /// Convert into runtime options.
    pub fn options(&self) -> crate::error::Result<SchedulerOptions> {
        Ok(SchedulerOptions {
            gating: self.gating.parse::<GatingMode>().map_err(|_| {
                crate::error::Error::InvalidConfig(format!(
                    "scheduler.gating: invalid mode '{}' (expected requeue|discard)",
                    self.gating
                ))
            })?,
            persist_completed: self.persist_completed,
            persist_after_discard: self.persist_after_discard,
            reject_duplicates: self.reject_duplicates,
        })
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        validate_file_name(&self.snapshot_file, "storage.snapshot_file")?;
        validate_file_name(&self.completed_file, "storage.completed_file")?;
        if self.snapshot_file.trim() == self.completed_file.trim() {
            return Err(crate::error::Error::InvalidConfig(
                "storage.completed_file must differ from storage.snapshot_file".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_file_name(name: &str, field: &str) -> crate::error::Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field}: file name cannot be empty"
        )));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed == "." || trimmed == ".." {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field}: '{trimmed}' must be a plain file name"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a `taskheap.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults when it is
    /// missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file, replacing it atomically
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        crate::lock::write_atomic(path, content.as_bytes())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()?;
        self.scheduler.options()?;
        Ok(())
    }
}
