//! Scheduler: pending tasks, completion ledger and dependency gating.
//!
//! The scheduler owns the [`PriorityStore`] and the [`CompletionLedger`] and
//! is the only thing that mutates them. Every mutation is followed by a
//! snapshot save through the injected [`SnapshotStore`] before the call
//! returns.
//!
//! Failure ordering:
//! - Validation errors are raised before anything changes.
//! - A failed save is reported as [`Error::Persistence`] after the in-memory
//!   change has already happened; nothing is rolled back.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::heap::{HeapEntry, PriorityStore};
use crate::ledger::CompletionLedger;
use crate::persist::SnapshotStore;
use crate::task::{TaskDraft, TaskRecord};

/// How `next_ready_task` treats a minimum task whose dependencies are unmet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingMode {
    /// Set blocked tasks aside, then put them back. Nothing is lost.
    #[default]
    Requeue,

    /// Legacy behaviour: blocked tasks are dropped from the store for good.
    Discard,
}

impl FromStr for GatingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requeue" => Ok(GatingMode::Requeue),
            "discard" => Ok(GatingMode::Discard),
            other => Err(Error::InvalidArgument(format!(
                "unknown gating mode '{other}' (expected requeue|discard)"
            ))),
        }
    }
}

impl fmt::Display for GatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatingMode::Requeue => f.write_str("requeue"),
            GatingMode::Discard => f.write_str("discard"),
        }
    }
}

/// Runtime switches for a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub gating: GatingMode,
    /// Keep the completion ledger in durable storage too.
    pub persist_completed: bool,
    /// Save after discard-mode gating removed tasks.
    pub persist_after_discard: bool,
    /// Reject `add_task` when the name is already pending.
    pub reject_duplicates: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            gating: GatingMode::Requeue,
            persist_completed: false,
            persist_after_discard: true,
            reject_duplicates: false,
        }
    }
}

/// Result of [`Scheduler::complete_task`]. A miss is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Completion {
    /// The task was pending; `removed` counts records sharing the name.
    Completed { removed: usize },
    /// No pending task had that name.
    NotFound,
}

impl Completion {
    pub fn is_completed(&self) -> bool {
        matches!(self, Completion::Completed { .. })
    }
}

/// Priority scheduler over an injected snapshot store.
pub struct Scheduler<S> {
    store: PriorityStore,
    ledger: CompletionLedger,
    persistence: S,
    options: SchedulerOptions,
}

impl<S: SnapshotStore> Scheduler<S> {
    /// Restore state from `persistence`. A missing snapshot starts empty.
    pub fn open(persistence: S, options: SchedulerOptions) -> Result<Self> {
        let tasks = persistence.load()?.unwrap_or_default();
        let ledger = if options.persist_completed {
            persistence
                .load_completed()?
                .unwrap_or_default()
                .into_iter()
                .collect()
        } else {
            CompletionLedger::new()
        };

        tracing::debug!(
            pending = tasks.len(),
            completed = ledger.len(),
            gating = %options.gating,
            "scheduler opened"
        );

        Ok(Self {
            store: PriorityStore::from_records(tasks),
            ledger,
            persistence,
            options,
        })
    }

    pub fn options(&self) -> SchedulerOptions {
        self.options
    }

    pub fn persistence(&self) -> &S {
        &self.persistence
    }

    pub fn pending_len(&self) -> usize {
        self.store.len()
    }

    pub fn completed(&self) -> &CompletionLedger {
        &self.ledger
    }

    pub fn is_complete(&self, name: &str) -> bool {
        self.ledger.is_complete(name.trim())
    }

    /// Validate `draft`, add it as a pending task and save.
    ///
    /// Dependencies are not checked for existence; they may name tasks that
    /// do not exist yet.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<TaskRecord> {
        let record = draft.validate()?;
        if self.options.reject_duplicates && self.store.contains(record.name()) {
            return Err(Error::DuplicateTask(record.name().to_string()));
        }

        self.store.insert(record.clone());
        tracing::debug!(
            task = record.name(),
            priority = record.priority(),
            due = %record.due_date(),
            deps = record.dependencies().len(),
            "task added"
        );

        self.persist("add_task", false)?;
        Ok(record)
    }

    /// Pending tasks sorted by `(priority, due_date)`, ties in insertion order.
    pub fn list_pending(&self) -> Vec<TaskRecord> {
        self.store.ordered_list()
    }

    /// Remove every pending task called `name` and record it as complete.
    ///
    /// A miss returns [`Completion::NotFound`] and saves nothing.
    pub fn complete_task(&mut self, name: &str) -> Result<Completion> {
        let name = name.trim();
        let removed = self.store.remove_named(name);
        if removed.is_empty() {
            tracing::debug!(task = name, "complete: not pending");
            return Ok(Completion::NotFound);
        }

        self.ledger.mark_complete(name);
        tracing::debug!(task = name, removed = removed.len(), "task completed");

        self.persist("complete_task", true)?;
        Ok(Completion::Completed {
            removed: removed.len(),
        })
    }

    /// The most urgent task whose dependencies have all completed. The task
    /// stays pending.
    ///
    /// Blocked tasks met on the way are handled per [`GatingMode`].
    pub fn next_ready_task(&mut self) -> Result<TaskRecord> {
        match self.options.gating {
            GatingMode::Requeue => self.next_ready_requeue(),
            GatingMode::Discard => self.next_ready_discard(),
        }
    }

    fn next_ready_requeue(&mut self) -> Result<TaskRecord> {
        let mut blocked: Vec<HeapEntry> = Vec::new();
        let mut ready = None;

        while let Some(entry) = self.store.pop_entry() {
            if self.ledger.all_complete(entry.record().dependencies()) {
                ready = Some(entry.record().clone());
                blocked.push(entry);
                break;
            }
            tracing::debug!(
                task = entry.record().name(),
                waiting_on = ?self.ledger.missing(entry.record().dependencies()),
                "skipping blocked task"
            );
            blocked.push(entry);
        }

        self.store.restore(blocked);
        ready.ok_or(Error::NoReadyTask)
    }

    fn next_ready_discard(&mut self) -> Result<TaskRecord> {
        let mut discarded = 0usize;
        let mut ready = None;

        while let Ok(candidate) = self.store.peek_min() {
            if self.ledger.all_complete(candidate.dependencies()) {
                ready = Some(candidate.clone());
                break;
            }
            let dropped = self.store.pop_min()?;
            tracing::warn!(
                task = dropped.name(),
                waiting_on = ?self.ledger.missing(dropped.dependencies()),
                "discarding blocked task"
            );
            discarded += 1;
        }

        if discarded > 0 && self.options.persist_after_discard {
            self.persist("next_ready_task", false)?;
        }
        ready.ok_or(Error::NoReadyTask)
    }

    fn persist(&self, operation: &'static str, ledger_changed: bool) -> Result<()> {
        let tasks = self.store.ordered_list();
        let mut result = self.persistence.save(&tasks);
        if result.is_ok() && ledger_changed && self.options.persist_completed {
            result = self.persistence.save_completed(&self.ledger.names());
        }

        result.map_err(|err| {
            tracing::warn!(operation, error = %err, "snapshot save failed");
            Error::persistence(operation, err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemorySnapshotStore;

    fn scheduler(options: SchedulerOptions) -> Scheduler<MemorySnapshotStore> {
        Scheduler::open(MemorySnapshotStore::new(), options).expect("open")
    }

    fn discard_mode() -> SchedulerOptions {
        SchedulerOptions {
            gating: GatingMode::Discard,
            ..SchedulerOptions::default()
        }
    }

    fn names(records: &[TaskRecord]) -> Vec<&str> {
        records.iter().map(TaskRecord::name).collect()
    }

    #[test]
    fn add_task_validates_before_mutating() {
        let mut sched = scheduler(SchedulerOptions::default());

        let err = sched.add_task(TaskDraft::new("", 1, "2025-01-01")).unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
        let err = sched.add_task(TaskDraft::from_input("x", "1.5", "2025-01-01")).unwrap_err();
        assert!(matches!(err, Error::InvalidPriority(_)));
        let err = sched.add_task(TaskDraft::from_input("x", "1.0", "2025-01-01")).unwrap_err();
        assert!(matches!(err, Error::InvalidPriority(_)));
        let err = sched.add_task(TaskDraft::new("x", 1, "not-a-date")).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
        let err = sched.add_task(TaskDraft::new("x", 1, "2025-01-01T13:45:00")).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));

        assert_eq!(sched.pending_len(), 0);
        assert_eq!(sched.persistence().save_count(), 0);
    }

    #[test]
    fn add_task_saves_every_time() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.add_task(TaskDraft::new("a", 2, "2025-01-01")).unwrap();
        sched.add_task(TaskDraft::new("b", 1, "2025-01-01")).unwrap();

        assert_eq!(sched.persistence().save_count(), 2);
        let saved = sched.persistence().tasks().unwrap();
        assert_eq!(names(&saved), vec!["b", "a"]);
    }

    #[test]
    fn list_pending_sorted_and_stable() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.add_task(TaskDraft::new("p2-late", 2, "2025-03-01")).unwrap();
        sched.add_task(TaskDraft::new("p1-a", 1, "2025-05-01")).unwrap();
        sched.add_task(TaskDraft::new("p2-early", 2, "2025-01-01")).unwrap();
        sched.add_task(TaskDraft::new("p1-b", 1, "2025-05-01")).unwrap();

        assert_eq!(
            names(&sched.list_pending()),
            vec!["p1-a", "p1-b", "p2-early", "p2-late"]
        );
    }

    #[test]
    fn duplicates_accepted_unless_rejected() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.add_task(TaskDraft::new("dup", 1, "2025-01-01")).unwrap();
        sched.add_task(TaskDraft::new("dup", 2, "2025-01-01")).unwrap();
        assert_eq!(sched.pending_len(), 2);

        let mut strict = scheduler(SchedulerOptions {
            reject_duplicates: true,
            ..SchedulerOptions::default()
        });
        strict.add_task(TaskDraft::new("dup", 1, "2025-01-01")).unwrap();
        let err = strict.add_task(TaskDraft::new("dup", 2, "2025-01-01")).unwrap_err();
        assert!(matches!(err, Error::DuplicateTask(name) if name == "dup"));
        assert_eq!(strict.pending_len(), 1);
    }

    #[test]
    fn complete_task_twice_reports_not_found() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.add_task(TaskDraft::new("a", 1, "2025-01-01")).unwrap();
        sched.add_task(TaskDraft::new("b", 1, "2025-01-01")).unwrap();

        assert_eq!(
            sched.complete_task("a").unwrap(),
            Completion::Completed { removed: 1 }
        );
        assert_eq!(sched.complete_task("a").unwrap(), Completion::NotFound);
        assert!(sched.is_complete("a"));
        assert_eq!(names(&sched.list_pending()), vec!["b"]);
        // add + add + one successful completion
        assert_eq!(sched.persistence().save_count(), 3);
    }

    #[test]
    fn complete_task_removes_all_duplicates() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.add_task(TaskDraft::new("dup", 1, "2025-01-01")).unwrap();
        sched.add_task(TaskDraft::new("other", 1, "2025-01-01")).unwrap();
        sched.add_task(TaskDraft::new("dup", 3, "2025-01-01")).unwrap();

        assert_eq!(
            sched.complete_task(" dup ").unwrap(),
            Completion::Completed { removed: 2 }
        );
        assert_eq!(names(&sched.list_pending()), vec!["other"]);
    }

    #[test]
    fn next_ready_on_empty_store() {
        let mut sched = scheduler(SchedulerOptions::default());
        assert!(matches!(sched.next_ready_task(), Err(Error::NoReadyTask)));
    }

    #[test]
    fn next_ready_is_a_peek() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.add_task(TaskDraft::new("a", 1, "2025-01-01")).unwrap();

        assert_eq!(sched.next_ready_task().unwrap().name(), "a");
        assert_eq!(sched.next_ready_task().unwrap().name(), "a");
        assert_eq!(sched.pending_len(), 1);
    }

    #[test]
    fn requeue_mode_keeps_blocked_tasks() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.add_task(TaskDraft::new("A", 2, "2025-06-01")).unwrap();
        sched
            .add_task(TaskDraft::new("B", 1, "2025-05-01").depends_on(["A"]))
            .unwrap();
        let saves = sched.persistence().save_count();

        assert_eq!(sched.next_ready_task().unwrap().name(), "A");
        assert_eq!(names(&sched.list_pending()), vec!["B", "A"]);
        assert_eq!(sched.persistence().save_count(), saves);

        sched.complete_task("A").unwrap();
        assert_eq!(sched.next_ready_task().unwrap().name(), "B");
    }

    #[test]
    fn requeue_mode_all_blocked() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched
            .add_task(TaskDraft::new("x", 1, "2025-01-01").depends_on(["ghost"]))
            .unwrap();
        sched
            .add_task(TaskDraft::new("y", 2, "2025-01-01").depends_on(["x"]))
            .unwrap();

        assert!(matches!(sched.next_ready_task(), Err(Error::NoReadyTask)));
        assert_eq!(names(&sched.list_pending()), vec!["x", "y"]);
    }

    #[test]
    fn discard_mode_drops_blocked_tasks() {
        let mut sched = scheduler(discard_mode());
        sched.add_task(TaskDraft::new("A", 2, "2025-06-01")).unwrap();
        sched
            .add_task(TaskDraft::new("B", 1, "2025-05-01").depends_on(["A"]))
            .unwrap();

        assert_eq!(sched.next_ready_task().unwrap().name(), "A");
        assert_eq!(names(&sched.list_pending()), vec!["A"]);
        assert_eq!(names(&sched.persistence().tasks().unwrap()), vec!["A"]);

        sched.complete_task("A").unwrap();
        assert!(matches!(sched.next_ready_task(), Err(Error::NoReadyTask)));

        sched
            .add_task(TaskDraft::new("B", 1, "2025-05-01").depends_on(["A"]))
            .unwrap();
        assert_eq!(sched.next_ready_task().unwrap().name(), "B");
    }

    #[test]
    fn discard_mode_without_persisting_diverges_from_snapshot() {
        let mut sched = scheduler(SchedulerOptions {
            persist_after_discard: false,
            ..discard_mode()
        });
        sched
            .add_task(TaskDraft::new("blocked", 1, "2025-01-01").depends_on(["never"]))
            .unwrap();

        assert!(matches!(sched.next_ready_task(), Err(Error::NoReadyTask)));
        assert_eq!(sched.pending_len(), 0);
        assert_eq!(sched.persistence().tasks().unwrap().len(), 1);
    }

    #[test]
    fn never_returns_task_with_unmet_dependency() {
        for options in [SchedulerOptions::default(), discard_mode()] {
            let mut sched = scheduler(options);
            sched
                .add_task(TaskDraft::new("c", 0, "2025-01-01").depends_on(["a", "b"]))
                .unwrap();
            sched.add_task(TaskDraft::new("a", 5, "2025-01-01")).unwrap();
            sched.add_task(TaskDraft::new("b", 6, "2025-01-01")).unwrap();
            sched.complete_task("a").unwrap();

            let next = sched.next_ready_task().unwrap();
            assert_eq!(next.name(), "b", "{:?}", options.gating);
            assert!(sched.completed().all_complete(next.dependencies()));
        }
    }

    #[test]
    fn save_failure_is_reported_after_mutation() {
        let mut sched = scheduler(SchedulerOptions::default());
        sched.persistence().set_fail_saves(true);

        let err = sched.add_task(TaskDraft::new("a", 1, "2025-01-01")).unwrap_err();
        assert!(matches!(err, Error::Persistence { operation: "add_task", .. }));
        assert_eq!(sched.pending_len(), 1);

        let err = sched.complete_task("a").unwrap_err();
        assert!(matches!(err, Error::Persistence { operation: "complete_task", .. }));
        assert!(sched.is_complete("a"));
        assert_eq!(sched.pending_len(), 0);
    }

    #[test]
    fn discard_save_failure_leaves_memory_ahead_of_snapshot() {
        let mut sched = scheduler(discard_mode());
        sched
            .add_task(TaskDraft::new("blocked", 0, "2025-01-01").depends_on(["never"]))
            .unwrap();
        sched.add_task(TaskDraft::new("ready", 1, "2025-01-01")).unwrap();
        sched.persistence().set_fail_saves(true);

        let err = sched.next_ready_task().unwrap_err();
        assert!(matches!(err, Error::Persistence { operation: "next_ready_task", .. }));
        assert_eq!(names(&sched.list_pending()), vec!["ready"]);

        let saved = sched.persistence().tasks().unwrap();
        assert!(saved.iter().any(|task| task.name() == "blocked"));
        assert_eq!(saved.len(), 2);
    }

    #[test]
    fn open_rebuilds_from_existing_snapshot() {
        let tasks = vec![
            TaskDraft::new("second", 1, "2025-01-01").validate().unwrap(),
            TaskDraft::new("first", 0, "2025-01-01").validate().unwrap(),
            TaskDraft::new("third", 1, "2025-01-01").validate().unwrap(),
        ];
        let sched = Scheduler::open(
            MemorySnapshotStore::with_tasks(tasks),
            SchedulerOptions::default(),
        )
        .unwrap();

        assert_eq!(names(&sched.list_pending()), vec!["first", "second", "third"]);
        assert_eq!(sched.persistence().save_count(), 0);
    }

    #[test]
    fn reopen_restores_pending_but_not_ledger_by_default() {
        let store = MemorySnapshotStore::new();
        {
            let mut sched = Scheduler::open(store.clone(), SchedulerOptions::default()).unwrap();
            sched.add_task(TaskDraft::new("a", 1, "2025-01-01")).unwrap();
            sched.add_task(TaskDraft::new("b", 2, "2025-01-01")).unwrap();
            sched.complete_task("a").unwrap();
        }

        let reopened = Scheduler::open(store, SchedulerOptions::default()).unwrap();
        assert_eq!(names(&reopened.list_pending()), vec!["b"]);
        assert!(!reopened.is_complete("a"));
    }

    #[test]
    fn persisted_ledger_survives_reopen() {
        let options = SchedulerOptions {
            persist_completed: true,
            ..SchedulerOptions::default()
        };
        let store = MemorySnapshotStore::new();
        {
            let mut sched = Scheduler::open(store.clone(), options).unwrap();
            sched.add_task(TaskDraft::new("a", 1, "2025-01-01")).unwrap();
            sched
                .add_task(TaskDraft::new("b", 2, "2025-01-01").depends_on(["a"]))
                .unwrap();
            sched.complete_task("a").unwrap();
        }
        assert_eq!(store.completed(), Some(vec!["a".to_string()]));

        let mut reopened = Scheduler::open(store, options).unwrap();
        assert!(reopened.is_complete("a"));
        assert_eq!(reopened.next_ready_task().unwrap().name(), "b");
    }

    #[test]
    fn gating_mode_parses() {
        assert_eq!("Requeue".parse::<GatingMode>().unwrap(), GatingMode::Requeue);
        assert_eq!(" discard ".parse::<GatingMode>().unwrap(), GatingMode::Discard);
        assert!("skip".parse::<GatingMode>().is_err());
        assert_eq!(GatingMode::Discard.to_string(), "discard");
    }
}
