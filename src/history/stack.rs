//! History stack strategies.
//!
//! # Responsibilities
//! - Define the stack interface the controller is written against
//! - Provide the standalone in-memory implementation
//!
//! # Design Decisions
//! - The strategy is picked once, when the controller is built
//! - A stack is never empty; it always holds the current entry
//! - Traversal outside the stack is a no-op that reports `false`

use std::fmt;

use crate::history::host::{HostChange, SharedHandle};
use crate::history::HistoryEntry;

/// Which strategy backs the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    /// A host keeps its own native stack; the engine mirrors it.
    HostBacked,
    /// No host; the engine owns the only stack.
    Standalone,
}

/// Storage for history entries and the current position.
pub trait HistoryStack: fmt::Debug {
    fn mode(&self) -> StackMode;

    /// Entry at the current position.
    fn current(&self) -> HistoryEntry;

    /// Current position, 0-based.
    fn index(&self) -> usize;

    /// All entries the stack knows, including entries ahead of the position.
    fn entries(&self) -> Vec<HistoryEntry>;

    /// Append after the current position, discarding entries ahead of it.
    fn push(&mut self, entry: HistoryEntry);

    /// Overwrite the current slot.
    fn replace(&mut self, entry: HistoryEntry);

    /// Move the position by `delta`. Returns `false` and does nothing when the
    /// target is out of range or `delta` is zero.
    fn traverse(&mut self, delta: isize) -> bool;

    /// Remove the current entry and step back onto the previous one.
    fn pop_top(&mut self) -> Option<HistoryEntry>;

    /// Pick up changes made on the host side since the last call.
    fn reconcile(&mut self) -> Option<HostChange> {
        None
    }

    /// The shared host handle, for host-backed stacks.
    fn host_handle(&self) -> Option<SharedHandle> {
        None
    }
}

/// Standalone stack with browser semantics.
#[derive(Debug, Clone)]
pub struct InMemoryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl InMemoryStack {
    pub fn new(initial: HistoryEntry) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }
}

impl HistoryStack for InMemoryStack {
    fn mode(&self) -> StackMode {
        StackMode::Standalone
    }

    fn current(&self) -> HistoryEntry {
        self.entries[self.index].clone()
    }

    fn index(&self) -> usize {
        self.index
    }

    fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.clone()
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, entry: HistoryEntry) {
        self.entries[self.index] = entry;
    }

    fn traverse(&mut self, delta: isize) -> bool {
        let Some(target) = self.index.checked_add_signed(delta) else {
            return false;
        };
        if delta == 0 || target >= self.entries.len() {
            return false;
        }
        self.index = target;
        true
    }

    fn pop_top(&mut self) -> Option<HistoryEntry> {
        if self.index == 0 {
            return None;
        }
        self.entries.truncate(self.index + 1);
        self.index -= 1;
        self.entries.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn stack() -> InMemoryStack {
        InMemoryStack::new(HistoryEntry::new("/", Value::Null))
    }

    #[test]
    fn test_push_and_traverse() {
        let mut s = stack();
        s.push(HistoryEntry::new("/a", json!(1)));
        s.push(HistoryEntry::new("/b", json!(2)));
        assert_eq!(s.index(), 2);

        assert!(s.traverse(-2));
        assert_eq!(s.current().path(), "/");
        assert!(s.traverse(1));
        assert_eq!(s.current().path(), "/a");
        assert_eq!(s.entries().len(), 3);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut s = stack();
        s.push(HistoryEntry::new("/a", Value::Null));
        assert!(!s.traverse(-2));
        assert!(!s.traverse(1));
        assert!(!s.traverse(0));
        assert_eq!(s.index(), 1);
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let mut s = stack();
        s.push(HistoryEntry::new("/a", Value::Null));
        s.push(HistoryEntry::new("/b", Value::Null));
        s.traverse(-1);
        s.push(HistoryEntry::new("/c", Value::Null));

        let paths: Vec<_> = s.entries().iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, ["/", "/a", "/c"]);
    }

    #[test]
    fn test_replace_in_place() {
        let mut s = stack();
        let key = s.current().key().to_string();
        let next = s.current().replaced("/", json!({"name": 0}));
        s.replace(next);
        assert_eq!(s.current().key(), key);
        assert_eq!(s.current().state(), &json!({"name": 0}));
        assert_eq!(s.entries().len(), 1);
    }

    #[test]
    fn test_pop_top() {
        let mut s = stack();
        assert!(s.pop_top().is_none());
        s.push(HistoryEntry::new("/a", Value::Null));
        let popped = s.pop_top().unwrap();
        assert_eq!(popped.path(), "/a");
        assert_eq!(s.current().path(), "/");
        assert_eq!(s.entries().len(), 1);
    }
}
