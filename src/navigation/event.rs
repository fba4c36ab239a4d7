//! Navigation triggers, emitted events and listener registries.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::routing::{merge_params, Params, RouteMatch};

/// Identifier of one navigation request.
pub type NavigationId = u64;

/// What started a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTrigger {
    /// First resolution at startup.
    Initial,
    Push,
    Replace,
    /// `back`/`forward`/`go`.
    Traverse { delta: isize },
    /// Host popped entries natively.
    HostPop { count: usize },
    /// Host pushed entries natively.
    HostPush { count: usize },
    /// Host rewrote its stack.
    HostRewrite,
}

impl NavigationTrigger {
    /// Only history traversals fire `popstate`.
    pub fn dispatches_popstate(self) -> bool {
        matches!(self, Self::Traverse { .. } | Self::HostPop { .. })
    }

    pub fn change_kind(self) -> RouteChangeKind {
        match self {
            Self::Initial => RouteChangeKind::Initial,
            Self::Push | Self::HostPush { .. } => RouteChangeKind::DidPush,
            Self::Replace | Self::HostRewrite => RouteChangeKind::DidReplace,
            Self::Traverse { delta } if delta > 0 => RouteChangeKind::DidPush,
            Self::Traverse { .. } | Self::HostPop { .. } => RouteChangeKind::DidPop,
        }
    }

    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Push => "push",
            Self::Replace => "replace",
            Self::Traverse { .. } => "traverse",
            Self::HostPop { .. } => "host_pop",
            Self::HostPush { .. } => "host_push",
            Self::HostRewrite => "host_rewrite",
        }
    }
}

impl fmt::Display for NavigationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The consumer-visible view of the last committed navigation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NavigationContext {
    /// Committed pathname.
    pub path: String,
    /// Union of the chain's params; deeper levels win.
    pub params: Params,
    /// Root → leaf chain; empty when nothing matched.
    pub matches: Vec<RouteMatch>,
}

impl NavigationContext {
    pub fn new(path: impl Into<String>, matches: Vec<RouteMatch>) -> Self {
        Self {
            path: path.into(),
            params: merge_params(&matches),
            matches,
        }
    }

    /// No route matched the path.
    pub fn is_not_found(&self) -> bool {
        self.matches.is_empty()
    }

    /// Deepest match.
    pub fn leaf(&self) -> Option<&RouteMatch> {
        self.matches.last()
    }
}

/// `popstate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopStateEvent {
    /// State of the entry that is now current.
    pub state: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteChangeKind {
    Initial,
    DidPush,
    DidReplace,
    DidPop,
}

/// Emitted on every commit (`hybridrouterchange`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteChangeEvent {
    pub id: NavigationId,
    pub kind: RouteChangeKind,
    /// Entry path, query and fragment included.
    pub path: String,
    pub state: Value,
    /// Value passed to `maybe_pop`, if this commit came from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Handle returned by `Listeners::add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered listener registry for one event type.
pub struct Listeners<E> {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn FnMut(&E)>)>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    /// Call every listener in registration order.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
