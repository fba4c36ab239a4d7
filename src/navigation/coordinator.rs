//! Navigation state machine.
//!
//! # Responsibilities
//! - Sequence every navigation: history change → resolve → prerender → commit
//! - Keep one route boundary per history entry
//! - Dispatch `popstate` for traversals and a route-change event for every commit
//! - Cancel a pending commit when a newer navigation arrives
//!
//! # Design Decisions
//! - The URL moves first; only the consumer-visible context waits for readiness
//! - Last navigation wins: superseding drops the pending readiness channel
//! - Out-of-range traversals never enter the state machine
//! - Listeners are plain closures; the coordinator never re-enters itself

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;
use url::Url;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, NavConfig, ValidationError};
use crate::history::{HistoryController, HistoryEntry, HistoryResult, HostChange, Location};
use crate::navigation::event::{
    ListenerId, Listeners, NavigationContext, NavigationId, NavigationTrigger, PopStateEvent,
    RouteChangeEvent,
};
use crate::observability::metrics;
use crate::prerender::{PrerenderScheduler, Readiness, ReadinessDetail, RouteBoundary};
use crate::routing::{RouteMatch, RouteTable, RouteTree};

/// Where the coordinator is in the navigation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    /// A matched target is waiting for its readiness signal.
    Prerendering,
    Committed,
}

/// What happened to a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The context now reflects the request.
    Committed(NavigationId),
    /// History moved; the commit waits for `prerendering`.
    Pending(NavigationId),
    /// Nothing to do (traversal out of range, nothing to pop).
    Ignored,
}

impl NavigationOutcome {
    pub fn id(self) -> Option<NavigationId> {
        match self {
            Self::Committed(id) | Self::Pending(id) => Some(id),
            Self::Ignored => None,
        }
    }

    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// A resolved navigation that has not been committed yet.
#[derive(Debug)]
struct PendingNavigation {
    id: NavigationId,
    trigger: NavigationTrigger,
    context: NavigationContext,
    entry: HistoryEntry,
    result: Option<Value>,
}

#[derive(Debug)]
pub struct NavigationCoordinator {
    routes: Arc<RouteTable>,
    history: HistoryController,
    scheduler: PrerenderScheduler,
    boundaries: Vec<RouteBoundary>,
    context: NavigationContext,
    phase: Phase,
    pending: Option<PendingNavigation>,
    next_id: NavigationId,
    popstate: Listeners<PopStateEvent>,
    route_change: Listeners<RouteChangeEvent>,
}

impl NavigationCoordinator {
    /// Build a coordinator and commit the current entry synchronously.
    ///
    /// The initial boundary is mounted right away, even under a host.
    pub fn new(routes: Arc<RouteTable>, history: HistoryController) -> Self {
        let mut coordinator = Self {
            routes,
            scheduler: PrerenderScheduler::new(history.mode()),
            history,
            boundaries: Vec::new(),
            context: NavigationContext::default(),
            phase: Phase::Idle,
            pending: None,
            next_id: 1,
            popstate: Listeners::new(),
            route_change: Listeners::new(),
        };
        coordinator.start();
        coordinator
    }

    /// Build from configuration. `host` is the raw host handle, if any.
    pub fn from_config(config: &NavConfig, host: Option<&Value>) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let tree = RouteTree::from_config(&config.routes).map_err(ValidationError::from)?;
        let origin = Url::parse(&config.history.origin).map_err(|e| {
            ValidationError::InvalidOrigin {
                origin: config.history.origin.clone(),
                reason: e.to_string(),
            }
        })?;

        let history = HistoryController::detect(origin, &config.history.initial_path, host);
        Ok(Self::new(Arc::new(RouteTable::new(tree)), history))
    }

    fn start(&mut self) {
        let id = self.allocate_id();
        let trigger = NavigationTrigger::Initial;
        metrics::record_navigation(trigger);

        let entry = self.history.current();
        let pathname = self.history.location().pathname;
        let matches = self.routes.resolve(&pathname);
        if matches.is_empty() {
            metrics::record_route_miss();
        }

        let boundary = ensure_boundary(&mut self.boundaries, &entry, &pathname, &matches, false);
        boundary.mount();

        self.commit(PendingNavigation {
            id,
            trigger,
            context: NavigationContext::new(pathname, matches),
            entry,
            result: None,
        });
    }

    fn allocate_id(&mut self) -> NavigationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn set_phase(&mut self, phase: Phase, id: NavigationId) {
        tracing::debug!(id, from = ?self.phase, to = ?phase, "Navigation phase");
        self.phase = phase;
    }

    /// Run the state machine for a history change that already happened.
    fn begin(&mut self, trigger: NavigationTrigger, result: Option<Value>) -> NavigationOutcome {
        let id = self.allocate_id();
        metrics::record_navigation(trigger);

        if let Some(previous) = self.pending.take() {
            self.scheduler.discard();
            metrics::record_superseded();
            tracing::debug!(
                id,
                superseded = previous.id,
                path = %previous.context.path,
                "Pending navigation superseded"
            );
        }

        self.set_phase(Phase::Resolving, id);

        let entry = self.history.current();
        let pathname = self.history.location().pathname;
        let matches = self.routes.resolve(&pathname);
        if matches.is_empty() {
            metrics::record_route_miss();
            tracing::debug!(id, path = %pathname, "No route matched");
        }

        let prerender = requires_prerender(&self.context.matches, &matches);
        self.prune_boundaries();

        let boundary = ensure_boundary(&mut self.boundaries, &entry, &pathname, &matches, prerender);
        let readiness = self.scheduler.register(id, boundary);

        let navigation = PendingNavigation {
            id,
            trigger,
            context: NavigationContext::new(pathname, matches),
            entry,
            result,
        };

        match readiness {
            Readiness::Ready => {
                self.commit(navigation);
                NavigationOutcome::Committed(id)
            }
            Readiness::Deferred => {
                metrics::record_deferred();
                self.pending = Some(navigation);
                self.set_phase(Phase::Prerendering, id);
                NavigationOutcome::Pending(id)
            }
        }
    }

    fn commit(&mut self, navigation: PendingNavigation) {
        let PendingNavigation {
            id,
            trigger,
            context,
            entry,
            result,
        } = navigation;

        tracing::info!(
            id,
            trigger = %trigger,
            path = %context.path,
            matches = context.matches.len(),
            "Navigation committed"
        );
        metrics::record_commit(trigger);

        self.context = context;
        self.set_phase(Phase::Committed, id);

        if trigger.dispatches_popstate() {
            metrics::record_popstate();
            self.popstate.emit(&PopStateEvent {
                state: entry.state().clone(),
            });
        }

        self.route_change.emit(&RouteChangeEvent {
            id,
            kind: trigger.change_kind(),
            path: entry.path().to_string(),
            state: entry.state().clone(),
            result,
        });

        self.set_phase(Phase::Idle, id);
    }

    /// Drop boundaries whose entries left the stack, and pre-mounted ones
    /// whose path no longer resolves.
    fn prune_boundaries(&mut self) {
        let live: HashSet<String> = self
            .history
            .entries()
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        let routes = &self.routes;
        self.boundaries.retain(|boundary| match boundary.key() {
            Some(key) => live.contains(key),
            None => !routes.resolve(boundary.path()).is_empty(),
        });
    }

    /// Make sure a boundary exists for `path` before anything navigates to it.
    ///
    /// Returns `None` when no route matches. Otherwise the receiver resolves
    /// once the boundary exists; the next navigation to `path` adopts it.
    pub fn ensure_mounted(&mut self, path: &str) -> Option<oneshot::Receiver<()>> {
        let pathname = Location::of_entry(self.history.origin(), path).pathname;
        let matches = self.routes.resolve(&pathname);
        if matches.is_empty() {
            tracing::debug!(path = %pathname, "Nothing to pre-mount");
            return None;
        }

        if !self.boundaries.iter().any(|b| b.path() == pathname) {
            let prerender = matches.iter().any(|m| m.node.prerender());
            let pattern = matches.last().map(|m| m.node.path().to_string());
            tracing::debug!(path = %pathname, prerender, "Boundary pre-mounted");
            self.boundaries
                .push(RouteBoundary::premounted(pathname, pattern, prerender));
        }

        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        Some(rx)
    }

    /// `history.pushState(state, title, url)`.
    pub fn push_state(
        &mut self,
        state: Value,
        title: &str,
        url: Option<&str>,
    ) -> HistoryResult<NavigationOutcome> {
        self.history.push_state(state, title, url)?;
        Ok(self.begin(NavigationTrigger::Push, None))
    }

    /// `history.replaceState(state, title, url)`.
    pub fn replace_state(
        &mut self,
        state: Value,
        title: &str,
        url: Option<&str>,
    ) -> HistoryResult<NavigationOutcome> {
        self.history.replace_state(state, title, url)?;
        Ok(self.begin(NavigationTrigger::Replace, None))
    }

    pub fn back(&mut self) -> NavigationOutcome {
        self.go(-1)
    }

    pub fn forward(&mut self) -> NavigationOutcome {
        self.go(1)
    }

    /// `history.go(delta)`. Out of range or zero is ignored.
    pub fn go(&mut self, delta: isize) -> NavigationOutcome {
        if !self.history.go(delta) {
            return NavigationOutcome::Ignored;
        }
        self.begin(NavigationTrigger::Traverse { delta }, None)
    }

    /// Push `path` as a new entry.
    pub fn navigate(&mut self, path: &str, state: Value) -> HistoryResult<NavigationOutcome> {
        self.push_state(state, "", Some(path))
    }

    /// Replace the current entry with `path`.
    pub fn replace(&mut self, path: &str, state: Value) -> HistoryResult<NavigationOutcome> {
        self.replace_state(state, "", Some(path))
    }

    /// Pop the current entry without `popstate` and push `path` in its place.
    pub fn pop_and_push_named(
        &mut self,
        path: &str,
        state: Value,
    ) -> HistoryResult<NavigationOutcome> {
        self.history.pop_and_push(state, path)?;
        Ok(self.begin(NavigationTrigger::Push, None))
    }

    /// Like [`pop_and_push_named`](Self::pop_and_push_named), returning the
    /// new entry's key as a restoration id.
    pub fn restorable_pop_and_push_named(
        &mut self,
        path: &str,
        state: Value,
    ) -> HistoryResult<String> {
        let entry = self.history.pop_and_push(state, path)?;
        self.begin(NavigationTrigger::Push, None);
        Ok(entry.key().to_string())
    }

    pub fn can_pop(&self) -> bool {
        self.history.can_go_back()
    }

    /// Go back one entry if possible. `result` rides on the route-change event.
    pub fn maybe_pop(&mut self, result: Option<Value>) -> bool {
        if !self.history.can_go_back() || !self.history.back() {
            return false;
        }
        self.begin(NavigationTrigger::Traverse { delta: -1 }, result);
        true
    }

    /// Adopt changes the host made to its stack on its own.
    ///
    /// A host pop is a traversal and dispatches `popstate`; pushes and
    /// rewrites are adopted silently.
    pub fn sync_from_host(&mut self) -> Option<NavigationOutcome> {
        let change = self.history.sync_from_host()?;
        tracing::debug!(?change, "Host stack changed");
        let trigger = match change {
            HostChange::Popped(count) => NavigationTrigger::HostPop { count },
            HostChange::Pushed(count) => NavigationTrigger::HostPush { count },
            HostChange::Rewritten => NavigationTrigger::HostRewrite,
        };
        Some(self.begin(trigger, None))
    }

    /// Deliver a host `prerendering` event to the boundaries at `path`.
    ///
    /// Returns the id of the navigation this committed, if any.
    pub fn dispatch_prerendering(
        &mut self,
        path: &str,
        detail: ReadinessDetail,
    ) -> Option<NavigationId> {
        let mut released = false;
        for boundary in self.boundaries.iter_mut().filter(|b| b.path() == path) {
            released |= boundary.dispatch_prerendering(detail.clone());
        }
        if !released {
            tracing::debug!(path, "Prerendering signal had no waiting boundary");
        }
        self.process_readiness()
    }

    /// Commit the pending navigation if its boundary became ready.
    pub fn process_readiness(&mut self) -> Option<NavigationId> {
        let (id, _detail) = self.scheduler.poll()?;
        match self.pending.take() {
            Some(navigation) if navigation.id == id => {
                self.commit(navigation);
                Some(id)
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// The last committed navigation.
    pub fn context(&self) -> &NavigationContext {
        &self.context
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `location`; moves as soon as history does.
    pub fn location(&self) -> Location {
        self.history.location()
    }

    /// `history.state`.
    pub fn state(&self) -> Value {
        self.history.state()
    }

    pub fn history(&self) -> &HistoryController {
        &self.history
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    pub fn pending_id(&self) -> Option<NavigationId> {
        self.pending.as_ref().map(|p| p.id)
    }

    pub fn boundaries(&self) -> &[RouteBoundary] {
        &self.boundaries
    }

    /// Boundary of the entry with `key`.
    pub fn boundary(&self, key: &str) -> Option<&RouteBoundary> {
        self.boundaries.iter().find(|b| b.key() == Some(key))
    }

    /// Boundary of the current entry.
    pub fn current_boundary(&self) -> Option<&RouteBoundary> {
        self.boundary(self.history.current().key())
    }

    pub fn boundary_for_path(&self, path: &str) -> Option<&RouteBoundary> {
        self.boundaries.iter().find(|b| b.path() == path)
    }

    pub fn add_popstate_listener(
        &mut self,
        listener: impl FnMut(&PopStateEvent) + 'static,
    ) -> ListenerId {
        self.popstate.add(listener)
    }

    pub fn remove_popstate_listener(&mut self, id: ListenerId) -> bool {
        self.popstate.remove(id)
    }

    pub fn add_route_change_listener(
        &mut self,
        listener: impl FnMut(&RouteChangeEvent) + 'static,
    ) -> ListenerId {
        self.route_change.add(listener)
    }

    pub fn remove_route_change_listener(&mut self, id: ListenerId) -> bool {
        self.route_change.remove(id)
    }
}

/// Whether any node that differs from the current chain waits for readiness.
fn requires_prerender(current: &[RouteMatch], next: &[RouteMatch]) -> bool {
    let unchanged = current
        .iter()
        .zip(next)
        .take_while(|(a, b)| a.same_target(b))
        .count();
    next[unchanged..].iter().any(|m| m.node.prerender())
}

/// Find or create the boundary for `entry`. A boundary whose entry now points
/// at another path is rebuilt; a pre-mounted boundary at `pathname` is adopted
/// before a new one is made.
fn ensure_boundary<'a>(
    boundaries: &'a mut Vec<RouteBoundary>,
    entry: &HistoryEntry,
    pathname: &str,
    matches: &[RouteMatch],
    prerender: bool,
) -> &'a mut RouteBoundary {
    let fresh = || {
        RouteBoundary::new(
            entry.key(),
            pathname,
            matches.last().map(|m| m.node.path().to_string()),
            prerender,
        )
    };

    let key = Some(entry.key());
    if let Some(index) = boundaries.iter().position(|b| b.key() == key) {
        if boundaries[index].path() == pathname {
            return &mut boundaries[index];
        }
    }

    let replacement = match boundaries
        .iter()
        .position(|b| b.is_premounted() && b.path() == pathname)
    {
        Some(index) => {
            let mut boundary = boundaries.remove(index);
            boundary.adopt(entry.key());
            boundary
        }
        None => fresh(),
    };

    let index = match boundaries.iter().position(|b| b.key() == key) {
        Some(index) => {
            boundaries[index] = replacement;
            index
        }
        None => {
            boundaries.push(replacement);
            boundaries.len() - 1
        }
    };
    &mut boundaries[index]
}
