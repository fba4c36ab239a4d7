//! Shared utilities for integration tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use hybrid_nav::config::RouteConfig;
use hybrid_nav::history::{HistoryController, HybridHistoryHandle, SharedHandle};
use hybrid_nav::navigation::{NavigationCoordinator, PopStateEvent, RouteChangeEvent};
use hybrid_nav::routing::{RouteTable, RouteTree};

/// `/` with `about`, `users/:id`, a prerendered `slow` page, a second
/// prerendered `gallery` page and a `files/*` catch-all.
pub fn sample_routes() -> Vec<RouteConfig> {
    vec![RouteConfig::new("/", "Home")
        .title("Home")
        .child(RouteConfig::new("about", "About"))
        .child(RouteConfig::new("users", "Users").child(RouteConfig::new("/users/:id", "User")))
        .child(RouteConfig::new("slow", "Slow").prerender(true))
        .child(RouteConfig::new("gallery", "Gallery").prerender(true))
        .child(RouteConfig::new("files/*", "Files"))]
}

pub fn sample_table() -> Arc<RouteTable> {
    Arc::new(RouteTable::new(
        RouteTree::from_config(&sample_routes()).unwrap(),
    ))
}

pub fn origin() -> Url {
    Url::parse("http://localhost").unwrap()
}

/// Coordinator without a host.
pub fn standalone() -> NavigationCoordinator {
    NavigationCoordinator::new(sample_table(), HistoryController::standalone(origin(), "/"))
}

/// Coordinator mirrored onto a fresh host handle, plus the handle.
#[allow(dead_code)]
pub fn hosted() -> (NavigationCoordinator, SharedHandle) {
    let handle = HybridHistoryHandle::new("/", Value::Null).shared();
    let history = HistoryController::host_backed(origin(), Rc::clone(&handle));
    (NavigationCoordinator::new(sample_table(), history), handle)
}

/// Record every `popstate` the coordinator dispatches.
pub fn record_popstate(nav: &mut NavigationCoordinator) -> Rc<RefCell<Vec<PopStateEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    nav.add_popstate_listener(move |event| sink.borrow_mut().push(event.clone()));
    seen
}

/// Record every route-change event the coordinator emits.
#[allow(dead_code)]
pub fn record_route_changes(
    nav: &mut NavigationCoordinator,
) -> Rc<RefCell<Vec<RouteChangeEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    nav.add_route_change_listener(move |event| sink.borrow_mut().push(event.clone()));
    seen
}
