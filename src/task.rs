//! Task records for taskheap.
//!
//! A task is keyed by its name and ranked by `(priority, due_date)`: a lower
//! priority number and an earlier due date sort first. Records are validated
//! once, at creation, and never change afterwards.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
const DATE_CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A calendar due date, rendered in canonical ISO-8601 form
/// (`YYYY-MM-DDT00:00:00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DueDate(NaiveDate);

impl DueDate {
    /// Parse caller input. Only a plain `YYYY-MM-DD` calendar date is accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        NaiveDate::parse_from_str(raw.trim(), DATE_INPUT_FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidDate(raw.to_string()))
    }

    /// Parse a date read back from a snapshot: a plain date or the canonical
    /// midnight form. Any other time of day is rejected.
    pub fn from_snapshot(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT) {
            return Ok(Self(date));
        }
        match NaiveDateTime::parse_from_str(trimmed, DATE_CANONICAL_FORMAT) {
            Ok(datetime) if datetime.num_seconds_from_midnight() == 0 => {
                Ok(Self(datetime.date()))
            }
            _ => Err(Error::InvalidDate(raw.to_string())),
        }
    }

    pub fn to_iso(&self) -> String {
        self.0
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.format(DATE_CANONICAL_FORMAT).to_string())
            .unwrap_or_else(|| self.0.format(DATE_INPUT_FORMAT).to_string())
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl FromStr for DueDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DueDate::from_snapshot(&raw).map_err(serde::de::Error::custom)
    }
}

/// Validate and normalize a task name.
pub fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidName("name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Parse a priority from caller input. Only whole integers are accepted.
pub fn parse_priority(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidPriority(raw.to_string()))
}

/// Trim dependency names and drop blank entries, keeping the given order.
pub fn normalize_dependencies<I, S>(dependencies: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dependencies
        .into_iter()
        .map(|dep| dep.as_ref().trim().to_string())
        .filter(|dep| !dep.is_empty())
        .collect()
}

/// Split a comma separated dependency list (`"a, b,,c"` -> `[a, b, c]`).
pub fn split_dependency_list(raw: &str) -> Vec<String> {
    normalize_dependencies(raw.split(','))
}

/// One pending task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    name: String,
    priority: i64,
    due_date: DueDate,
    dependencies: Vec<String>,
}

impl TaskRecord {
    /// Build a record from already-typed parts. The name is still validated.
    pub fn new(
        name: impl AsRef<str>,
        priority: i64,
        due_date: DueDate,
        dependencies: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            name: normalize_name(name.as_ref())?,
            priority,
            due_date,
            dependencies: normalize_dependencies(dependencies),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn due_date(&self) -> DueDate {
        self.due_date
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Ordering key: `(priority, due_date)` ascending.
    pub fn sort_key(&self) -> (i64, DueDate) {
        (self.priority, self.due_date)
    }

    pub fn cmp_key(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (priority {}, due {})",
            self.name, self.priority, self.due_date
        )?;
        if !self.dependencies.is_empty() {
            write!(f, " after [{}]", self.dependencies.join(", "))?;
        }
        Ok(())
    }
}

/// Snapshot form: `[priority, due_date, name, dependencies]`.
#[derive(Serialize, Deserialize)]
struct SnapshotEntry(i64, DueDate, String, Vec<String>);

impl Serialize for TaskRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SnapshotEntry(
            self.priority,
            self.due_date,
            self.name.clone(),
            self.dependencies.clone(),
        )
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let SnapshotEntry(priority, due_date, name, dependencies) =
            SnapshotEntry::deserialize(deserializer)?;
        TaskRecord::new(name, priority, due_date, dependencies).map_err(serde::de::Error::custom)
    }
}

/// Unvalidated caller input for a new task.
///
/// Every field is kept as the caller supplied it; `validate` turns the draft
/// into a [`TaskRecord`] or reports the first problem found.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub priority: String,
    pub due_date: String,
    pub dependencies: Vec<String>,
}

impl TaskDraft {
    /// Draft with an already-typed priority.
    pub fn new(name: impl Into<String>, priority: i64, due_date: impl Into<String>) -> Self {
        Self::from_input(name, priority.to_string(), due_date)
    }

    /// Draft from raw text, as typed at the CLI or the shell prompt.
    pub fn from_input(
        name: impl Into<String>,
        priority: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            priority: priority.into(),
            due_date: due_date.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Check name, then priority, then date.
    pub fn validate(self) -> Result<TaskRecord> {
        let name = normalize_name(&self.name)?;
        let priority = parse_priority(&self.priority)?;
        let due_date = DueDate::parse(&self.due_date)?;
        TaskRecord::new(name, priority, due_date, self.dependencies)
    }
}
