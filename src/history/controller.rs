//! The `history`/`location` surface.
//!
//! # Responsibilities
//! - Create and replace entries for `pushState`/`replaceState`
//! - Move the position for `back`/`forward`/`go`
//! - Expose the current `state` and `location`
//!
//! # Design Decisions
//! - One owned instance per engine; no global history
//! - Never dispatches events; the coordinator decides what to emit
//! - A malformed host handle falls back to the standalone stack

use serde_json::Value;
use url::Url;

use crate::history::entry::resolve_url;
use crate::history::host::{HostBackedStack, HostChange, HybridHistoryHandle, SharedHandle};
use crate::history::stack::{HistoryStack, InMemoryStack, StackMode};
use crate::history::{HistoryEntry, HistoryResult, Location};

#[derive(Debug)]
pub struct HistoryController {
    origin: Url,
    stack: Box<dyn HistoryStack>,
}

impl HistoryController {
    /// Standalone history starting at `initial_path` with a `null` state.
    pub fn standalone(origin: Url, initial_path: &str) -> Self {
        Self {
            origin,
            stack: Box::new(InMemoryStack::new(HistoryEntry::new(initial_path, Value::Null))),
        }
    }

    /// History mirrored onto a host stack.
    pub fn host_backed(origin: Url, handle: SharedHandle) -> Self {
        Self {
            origin,
            stack: Box::new(HostBackedStack::new(handle)),
        }
    }

    /// Pick the strategy from a raw host object, if any.
    pub fn detect(origin: Url, initial_path: &str, host: Option<&Value>) -> Self {
        match host.map(HybridHistoryHandle::from_value) {
            Some(Ok(handle)) => {
                tracing::debug!(path = %handle.path, "Host history detected");
                Self::host_backed(origin, handle.shared())
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Malformed host history handle, using in-memory stack");
                Self::standalone(origin, initial_path)
            }
            None => Self::standalone(origin, initial_path),
        }
    }

    pub fn mode(&self) -> StackMode {
        self.stack.mode()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// The entry at the current position.
    pub fn current(&self) -> HistoryEntry {
        self.stack.current()
    }

    /// `history.state`.
    pub fn state(&self) -> Value {
        self.stack.current().state().clone()
    }

    /// `location`.
    pub fn location(&self) -> Location {
        Location::of_entry(&self.origin, self.stack.current().path())
    }

    pub fn index(&self) -> usize {
        self.stack.index()
    }

    /// `history.length`.
    pub fn length(&self) -> usize {
        self.stack.entries().len()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.stack.entries()
    }

    pub fn host_handle(&self) -> Option<SharedHandle> {
        self.stack.host_handle()
    }

    fn target_path(&self, url: Option<&str>) -> HistoryResult<String> {
        let current = self.stack.current();
        match url {
            Some(url) => resolve_url(&self.origin, current.path(), url),
            None => Ok(current.path().to_string()),
        }
    }

    /// `history.pushState(state, title, url)`. The title is ignored.
    pub fn push_state(
        &mut self,
        state: Value,
        title: &str,
        url: Option<&str>,
    ) -> HistoryResult<HistoryEntry> {
        let path = self.target_path(url)?;
        let entry = HistoryEntry::new(path, state);
        tracing::debug!(path = %entry.path(), key = %entry.key(), title, "pushState");
        self.stack.push(entry.clone());
        Ok(entry)
    }

    /// `history.replaceState(state, title, url)`. Keeps the entry key.
    pub fn replace_state(
        &mut self,
        state: Value,
        title: &str,
        url: Option<&str>,
    ) -> HistoryResult<HistoryEntry> {
        let path = self.target_path(url)?;
        let entry = self.stack.current().replaced(path, state);
        tracing::debug!(path = %entry.path(), key = %entry.key(), title, "replaceState");
        self.stack.replace(entry.clone());
        Ok(entry)
    }

    /// Pop the current entry, then push a new one in its place.
    ///
    /// The URL is resolved before anything is popped.
    pub fn pop_and_push(&mut self, state: Value, url: &str) -> HistoryResult<HistoryEntry> {
        let path = self.target_path(Some(url))?;
        if let Some(popped) = self.stack.pop_top() {
            tracing::debug!(path = %popped.path(), "Popped before push");
        }
        let entry = HistoryEntry::new(path, state);
        self.stack.push(entry.clone());
        Ok(entry)
    }

    pub fn back(&mut self) -> bool {
        self.go(-1)
    }

    pub fn forward(&mut self) -> bool {
        self.go(1)
    }

    /// Move by `delta`. Returns `false` when out of range.
    pub fn go(&mut self, delta: isize) -> bool {
        let moved = self.stack.traverse(delta);
        if !moved {
            tracing::debug!(delta, index = self.stack.index(), "Traversal out of range");
        }
        moved
    }

    /// Whether there is an entry behind the current one.
    pub fn can_go_back(&self) -> bool {
        self.stack.index() > 0
    }

    /// Pick up changes the host made on its own.
    pub fn sync_from_host(&mut self) -> Option<HostChange> {
        self.stack.reconcile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn origin() -> Url {
        Url::parse("http://localhost").unwrap()
    }

    #[test]
    fn test_push_updates_location() {
        let mut history = HistoryController::standalone(origin(), "/");
        history.push_state(json!({"name": 1}), "", Some("/sample")).unwrap();
        assert_eq!(history.location().pathname, "/sample");
        assert_eq!(history.state(), json!({"name": 1}));
        assert_eq!(history.length(), 2);
    }

    #[test]
    fn test_replace_without_url_keeps_path() {
        let mut history = HistoryController::standalone(origin(), "/start");
        let key = history.current().key().to_string();
        history.replace_state(json!({"name": 0}), "", None).unwrap();
        assert_eq!(history.location().pathname, "/start");
        assert_eq!(history.current().key(), key);
        assert_eq!(history.length(), 1);
    }

    #[test]
    fn test_back_restores_initial_null_state() {
        let mut history = HistoryController::standalone(origin(), "/");
        history.push_state(json!({"name": 1}), "", Some("/sample")).unwrap();
        assert!(history.back());
        assert_eq!(history.state(), Value::Null);
        assert_eq!(history.location().pathname, "/");
        assert!(!history.back());
    }

    #[test]
    fn test_cross_origin_rejected() {
        let mut history = HistoryController::standalone(origin(), "/");
        assert!(history
            .push_state(Value::Null, "", Some("https://evil.example/"))
            .is_err());
        assert_eq!(history.length(), 1);
    }

    #[test]
    fn test_detect_modes() {
        let host = json!({"path": "/home", "state": null, "buildContextStack": []});
        let history = HistoryController::detect(origin(), "/", Some(&host));
        assert_eq!(history.mode(), StackMode::HostBacked);
        assert_eq!(history.location().pathname, "/home");

        let malformed = json!({"path": 42});
        let history = HistoryController::detect(origin(), "/", Some(&malformed));
        assert_eq!(history.mode(), StackMode::Standalone);

        let history = HistoryController::detect(origin(), "/", None);
        assert_eq!(history.mode(), StackMode::Standalone);
        assert!(history.host_handle().is_none());
    }

    #[test]
    fn test_host_top_agrees_after_push() {
        let handle = HybridHistoryHandle::new("/", Value::Null).shared();
        let mut history = HistoryController::host_backed(origin(), handle.clone());
        let entry = history
            .push_state(json!({"k": "v"}), "", Some("/next"))
            .unwrap();

        let h = handle.borrow();
        let top = h.build_context_stack.last().unwrap();
        assert_eq!(top.path(), entry.path());
        assert_eq!(top.state(), entry.state());
    }

    #[test]
    fn test_pop_and_push() {
        let mut history = HistoryController::standalone(origin(), "/");
        history.push_state(Value::Null, "", Some("/a")).unwrap();
        history.pop_and_push(json!(1), "/b").unwrap();
        let paths: Vec<_> = history.entries().iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, ["/", "/b"]);
    }
}
