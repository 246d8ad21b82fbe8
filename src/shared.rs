//! Thread-safe scheduler handle.
//!
//! Each operation takes the mutex for its whole duration, including the
//! snapshot save, so operations are atomic with respect to each other.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::persist::SnapshotStore;
use crate::scheduler::{Completion, Scheduler};
use crate::task::{TaskDraft, TaskRecord};

/// Cloneable handle to one [`Scheduler`] shared between threads.
pub struct SharedScheduler<S> {
    inner: Arc<Mutex<Scheduler<S>>>,
}

impl<S> Clone for SharedScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SnapshotStore> SharedScheduler<S> {
    pub fn new(scheduler: Scheduler<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    pub fn add_task(&self, draft: TaskDraft) -> Result<TaskRecord> {
        self.lock()?.add_task(draft)
    }

    pub fn list_pending(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.lock()?.list_pending())
    }

    pub fn complete_task(&self, name: &str) -> Result<Completion> {
        self.lock()?.complete_task(name)
    }

    pub fn next_ready_task(&self) -> Result<TaskRecord> {
        self.lock()?.next_ready_task()
    }

    pub fn is_complete(&self, name: &str) -> Result<bool> {
        Ok(self.lock()?.is_complete(name))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Scheduler<S>>> {
        self.inner
            .lock()
            .map_err(|_| Error::OperationFailed("scheduler lock poisoned".to_string()))
    }
}
