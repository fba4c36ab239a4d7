//! Host-backed history.
//!
//! # Responsibilities
//! - Describe the host handle (`path`, `state`, `buildContextStack`)
//! - Mirror the host's native stack and forward pushes/replaces/pops to it
//! - Detect changes the host made on its own (native back, deep links)
//!
//! # Design Decisions
//! - The host owns pointer movement: its stack top is always the current entry
//! - The engine owns entry content: after push/replace, the host top equals
//!   the local entry
//! - Entries popped by a traversal are kept locally so `forward` can re-push them

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::history::stack::{HistoryStack, StackMode};
use crate::history::HistoryEntry;

/// Host navigation state as exposed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridHistoryHandle {
    pub path: String,
    #[serde(default)]
    pub state: Value,
    pub build_context_stack: Vec<HistoryEntry>,
}

impl HybridHistoryHandle {
    pub fn new(path: impl Into<String>, state: Value) -> Self {
        Self {
            path: path.into(),
            state,
            build_context_stack: Vec::new(),
        }
    }

    /// Read a handle from the raw host object.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Wrap for sharing between the host and the engine.
    pub fn shared(self) -> SharedHandle {
        Rc::new(RefCell::new(self))
    }

    fn sync_top(&mut self) {
        if let Some(top) = self.build_context_stack.last() {
            self.path = top.path().to_string();
            self.state = top.state().clone();
        }
    }

    fn seed_if_empty(&mut self) {
        if self.build_context_stack.is_empty() {
            let path = if self.path.is_empty() { "/" } else { self.path.as_str() };
            let entry = HistoryEntry::new(path, self.state.clone());
            self.build_context_stack.push(entry);
        }
        self.sync_top();
    }
}

/// Handle shared between the host side and the engine (single-threaded).
pub type SharedHandle = Rc<RefCell<HybridHistoryHandle>>;

/// What the host did to its stack since the engine last looked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostChange {
    /// Host removed this many entries from the top (native back).
    Popped(usize),
    /// Host appended this many entries (native push, deep link).
    Pushed(usize),
    /// Host rewrote the stack in some other way.
    Rewritten,
}

/// Stack strategy that keeps the host's native stack authoritative.
#[derive(Debug)]
pub struct HostBackedStack {
    handle: SharedHandle,
    mirror: Vec<HistoryEntry>,
    forward: Vec<HistoryEntry>,
}

impl HostBackedStack {
    pub fn new(handle: SharedHandle) -> Self {
        let mirror = {
            let mut h = handle.borrow_mut();
            h.seed_if_empty();
            h.build_context_stack.clone()
        };
        Self {
            handle,
            mirror,
            forward: Vec::new(),
        }
    }

    fn refresh_mirror(&mut self) {
        let mut h = self.handle.borrow_mut();
        h.sync_top();
        self.mirror = h.build_context_stack.clone();
    }
}

impl HistoryStack for HostBackedStack {
    fn mode(&self) -> StackMode {
        StackMode::HostBacked
    }

    fn current(&self) -> HistoryEntry {
        let h = self.handle.borrow();
        match h.build_context_stack.last() {
            Some(top) => top.clone(),
            None => HistoryEntry::new(h.path.clone(), h.state.clone()),
        }
    }

    fn index(&self) -> usize {
        self.handle.borrow().build_context_stack.len().saturating_sub(1)
    }

    fn entries(&self) -> Vec<HistoryEntry> {
        let h = self.handle.borrow();
        h.build_context_stack
            .iter()
            .chain(self.forward.iter().rev())
            .cloned()
            .collect()
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.handle.borrow_mut().build_context_stack.push(entry);
        self.forward.clear();
        self.refresh_mirror();
    }

    fn replace(&mut self, entry: HistoryEntry) {
        {
            let mut h = self.handle.borrow_mut();
            match h.build_context_stack.last_mut() {
                Some(top) => *top = entry,
                None => h.build_context_stack.push(entry),
            }
        }
        self.refresh_mirror();
    }

    fn traverse(&mut self, delta: isize) -> bool {
        let steps = delta.unsigned_abs();
        {
            let mut h = self.handle.borrow_mut();
            let stack = &mut h.build_context_stack;

            if delta == 0 {
                return false;
            } else if delta < 0 {
                if steps >= stack.len() {
                    return false;
                }
                for _ in 0..steps {
                    if let Some(entry) = stack.pop() {
                        self.forward.push(entry);
                    }
                }
            } else {
                if steps > self.forward.len() {
                    return false;
                }
                for _ in 0..steps {
                    if let Some(entry) = self.forward.pop() {
                        stack.push(entry);
                    }
                }
            }
        }
        self.refresh_mirror();
        true
    }

    fn pop_top(&mut self) -> Option<HistoryEntry> {
        let popped = {
            let mut h = self.handle.borrow_mut();
            if h.build_context_stack.len() <= 1 {
                return None;
            }
            h.build_context_stack.pop()
        };
        self.forward.clear();
        self.refresh_mirror();
        popped
    }

    fn reconcile(&mut self) -> Option<HostChange> {
        let change = {
            let mut h = self.handle.borrow_mut();
            let host = &h.build_context_stack;

            if *host == self.mirror {
                None
            } else if !host.is_empty()
                && host.len() < self.mirror.len()
                && self.mirror[..host.len()] == host[..]
            {
                let popped = self.mirror.len() - host.len();
                self.forward
                    .extend(self.mirror.drain(host.len()..).rev());
                Some(HostChange::Popped(popped))
            } else if host.len() > self.mirror.len() && host[..self.mirror.len()] == self.mirror[..] {
                self.forward.clear();
                Some(HostChange::Pushed(host.len() - self.mirror.len()))
            } else {
                self.forward.clear();
                h.seed_if_empty();
                Some(HostChange::Rewritten)
            }
        };

        if change.is_some() {
            self.refresh_mirror();
        }
        change
    }

    fn host_handle(&self) -> Option<SharedHandle> {
        Some(Rc::clone(&self.handle))
    }
}
