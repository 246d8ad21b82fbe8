//! Snapshot persistence.
//!
//! The scheduler does not know where its state goes. It talks to a
//! [`SnapshotStore`]: `load` once at startup, `save` after every mutation.
//!
//! # Implementations
//! - **FileSnapshotStore**: JSON files in the data directory (locked, atomic)
//! - **MemorySnapshotStore**: in-process store for tests and embedding

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::task::TaskRecord;

/// Load/save capability for the pending-task snapshot.
///
/// A missing snapshot is `Ok(None)`, never an error.
pub trait SnapshotStore {
    /// Read the persisted pending tasks.
    fn load(&self) -> Result<Option<Vec<TaskRecord>>>;

    /// Durably replace the persisted pending tasks.
    fn save(&self, tasks: &[TaskRecord]) -> Result<()>;

    /// Read persisted completed names. Stores that do not keep a ledger
    /// report nothing.
    fn load_completed(&self) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    /// Durably replace the completed names.
    fn save_completed(&self, _names: &[String]) -> Result<()> {
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&self) -> Result<Option<Vec<TaskRecord>>> {
        (**self).load()
    }

    fn save(&self, tasks: &[TaskRecord]) -> Result<()> {
        (**self).save(tasks)
    }

    fn load_completed(&self) -> Result<Option<Vec<String>>> {
        (**self).load_completed()
    }

    fn save_completed(&self, names: &[String]) -> Result<()> {
        (**self).save_completed(names)
    }
}

/// File-backed snapshot store.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    storage: Storage,
}

impl FileSnapshotStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Vec<TaskRecord>>> {
        let path = self.storage.snapshot_file();
        let tasks: Option<Vec<TaskRecord>> = self.storage.read_json_optional(&path)?;
        match &tasks {
            Some(tasks) => {
                tracing::debug!(path = %path.display(), count = tasks.len(), "loaded snapshot")
            }
            None => tracing::debug!(path = %path.display(), "no snapshot; starting empty"),
        }
        Ok(tasks)
    }

    fn save(&self, tasks: &[TaskRecord]) -> Result<()> {
        let path = self.storage.snapshot_file();
        self.storage.write_json(&path, tasks)?;
        tracing::debug!(path = %path.display(), count = tasks.len(), "saved snapshot");
        Ok(())
    }

    fn load_completed(&self) -> Result<Option<Vec<String>>> {
        self.storage
            .read_json_optional(&self.storage.completed_file())
    }

    fn save_completed(&self, names: &[String]) -> Result<()> {
        self.storage
            .write_json(&self.storage.completed_file(), names)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Option<Vec<TaskRecord>>,
    completed: Option<Vec<String>>,
    saves: usize,
    fail_saves: bool,
}

/// In-memory snapshot store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot.
    pub fn with_tasks(tasks: Vec<TaskRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.tasks = Some(tasks);
        }
        store
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_saves = fail;
        }
    }

    /// Last saved snapshot, if any.
    pub fn tasks(&self) -> Option<Vec<TaskRecord>> {
        self.state.lock().ok().and_then(|state| state.tasks.clone())
    }

    /// Last saved completed names, if any.
    pub fn completed(&self) -> Option<Vec<String>> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.completed.clone())
    }

    /// Number of successful snapshot saves.
    pub fn save_count(&self) -> usize {
        self.state.lock().map(|state| state.saves).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::OperationFailed("memory snapshot store poisoned".to_string()))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Vec<TaskRecord>>> {
        Ok(self.lock()?.tasks.clone())
    }

    fn save(&self, tasks: &[TaskRecord]) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_saves {
            return Err(Error::OperationFailed("snapshot save rejected".to_string()));
        }
        state.tasks = Some(tasks.to_vec());
        state.saves += 1;
        Ok(())
    }

    fn load_completed(&self) -> Result<Option<Vec<String>>> {
        Ok(self.lock()?.completed.clone())
    }

    fn save_completed(&self, names: &[String]) -> Result<()> {
        let mut state = self.lock()?;
        if state.fail_saves {
            return Err(Error::OperationFailed("ledger save rejected".to_string()));
        }
        state.completed = Some(names.to_vec());
        Ok(())
    }
}
