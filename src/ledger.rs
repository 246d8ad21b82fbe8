//! Completion ledger: names of tasks known to be done.
//!
//! The ledger only grows. There is no way to un-complete a task.

use std::collections::HashSet;

/// Set of completed task names.
#[derive(Debug, Clone, Default)]
pub struct CompletionLedger {
    names: HashSet<String>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as complete. Returns `false` if it was already recorded.
    pub fn mark_complete(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn is_complete(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// True when every listed dependency has completed (vacuously true for none).
    pub fn all_complete(&self, dependencies: &[String]) -> bool {
        dependencies.iter().all(|dep| self.is_complete(dep))
    }

    /// Dependencies still outstanding, in the order given.
    pub fn missing<'a>(&self, dependencies: &'a [String]) -> Vec<&'a str> {
        dependencies
            .iter()
            .filter(|dep| !self.is_complete(dep))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Completed names, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort();
        names
    }
}

impl<S: Into<String>> FromIterator<S> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_complete_is_idempotent() {
        let mut ledger = CompletionLedger::new();
        assert!(ledger.mark_complete("a"));
        assert!(!ledger.mark_complete("a"));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_complete("a"));
        assert!(!ledger.is_complete("b"));
    }

    #[test]
    fn all_complete_checks_every_dependency() {
        let ledger: CompletionLedger = ["a", "b"].into_iter().collect();
        assert!(ledger.all_complete(&[]));
        assert!(ledger.all_complete(&["a".to_string(), "b".to_string()]));
        assert!(!ledger.all_complete(&["a".to_string(), "c".to_string()]));
    }

    #[test]
    fn missing_keeps_dependency_order() {
        let ledger: CompletionLedger = ["b"].into_iter().collect();
        let deps = vec!["c".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(ledger.missing(&deps), vec!["c", "a"]);
    }

    #[test]
    fn names_are_sorted() {
        let ledger: CompletionLedger = ["zeta", "alpha", "mid"].into_iter().collect();
        assert_eq!(ledger.names(), vec!["alpha", "mid", "zeta"]);
    }
}
