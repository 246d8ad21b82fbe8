//! Priority store for pending tasks.
//!
//! A binary min-heap keyed by `(priority, due_date)`. Each entry also carries
//! the sequence number it was inserted with, so equal keys resolve in
//! insertion order both when peeking and when listing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::task::TaskRecord;

/// Heap entry for the priority queue.
///
/// We use reversed ordering so BinaryHeap acts as a min-heap (smallest key first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeapEntry {
    seq: u64,
    record: TaskRecord,
}

impl HeapEntry {
    pub(crate) fn record(&self) -> &TaskRecord {
        &self.record
    }

    pub(crate) fn into_record(self) -> TaskRecord {
        self.record
    }

    fn rank(&self, other: &Self) -> Ordering {
        self.record
            .cmp_key(&other.record)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: smaller keys have higher priority
        other.rank(self)
    }
}

/// Pending tasks ordered by `(priority, due_date)`.
#[derive(Debug, Clone, Default)]
pub struct PriorityStore {
    heap: BinaryHeap<HeapEntry>,
    next_seq: u64,
}

impl PriorityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records; earlier records win ties.
    pub fn from_records(records: Vec<TaskRecord>) -> Self {
        let mut store = Self::new();
        store.rebuild(records);
        store
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Add a record. Names are not checked for uniqueness here.
    pub fn insert(&mut self, record: TaskRecord) {
        let entry = self.entry(record);
        self.heap.push(entry);
    }

    /// Smallest record, left in place.
    pub fn peek_min(&self) -> Result<&TaskRecord> {
        self.heap
            .peek()
            .map(HeapEntry::record)
            .ok_or(Error::EmptyStore)
    }

    /// Remove and return the smallest record.
    pub fn pop_min(&mut self) -> Result<TaskRecord> {
        self.heap
            .pop()
            .map(HeapEntry::into_record)
            .ok_or(Error::EmptyStore)
    }

    /// Replace the whole working set. Insertion order for tie-breaking
    /// follows the order of `records`.
    pub fn rebuild(&mut self, records: Vec<TaskRecord>) {
        self.next_seq = 0;
        let entries: Vec<HeapEntry> = records
            .into_iter()
            .map(|record| self.entry(record))
            .collect();
        self.heap = BinaryHeap::from(entries);
    }

    /// Pending records in heap array order (not sorted).
    pub fn snapshot_list(&self) -> Vec<TaskRecord> {
        self.heap
            .as_slice()
            .iter()
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Pending records sorted by `(priority, due_date)`, ties in insertion order.
    pub fn ordered_list(&self) -> Vec<TaskRecord> {
        let mut entries: Vec<&HeapEntry> = self.heap.iter().collect();
        entries.sort_by(|left, right| left.rank(right));
        entries
            .into_iter()
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// True if any pending record carries `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.heap.iter().any(|entry| entry.record.name() == name)
    }

    /// Remove every record named `name` in one pass and rebuild the heap from
    /// the rest. Surviving records keep their tie-break order.
    pub fn remove_named(&mut self, name: &str) -> Vec<TaskRecord> {
        let entries = std::mem::take(&mut self.heap).into_vec();
        let (removed, kept): (Vec<HeapEntry>, Vec<HeapEntry>) = entries
            .into_iter()
            .partition(|entry| entry.record.name() == name);
        self.heap = BinaryHeap::from(kept);
        removed.into_iter().map(HeapEntry::into_record).collect()
    }

    /// Pop the smallest entry, keeping its sequence number for `restore`.
    pub(crate) fn pop_entry(&mut self) -> Option<HeapEntry> {
        self.heap.pop()
    }

    /// Push previously popped entries back without renumbering them.
    pub(crate) fn restore(&mut self, entries: Vec<HeapEntry>) {
        self.heap.extend(entries);
    }

    fn entry(&mut self, record: TaskRecord) -> HeapEntry {
        let seq = self.next_seq;
        self.next_seq += 1;
        HeapEntry { seq, record }
    }
}
