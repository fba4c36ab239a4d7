//! Navigation metrics.
//!
//! # Metrics
//! - `nav_navigations_total` (counter): navigation requests by trigger
//! - `nav_commits_total` (counter): committed navigations by trigger
//! - `nav_prerender_deferred_total` (counter): commits held for readiness
//! - `nav_superseded_total` (counter): pending navigations replaced by newer ones
//! - `nav_popstate_total` (counter): `popstate` dispatches
//! - `nav_route_misses_total` (counter): paths with no matching route
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding app installs a recorder
//! - Without a recorder every call is a cheap no-op

use crate::navigation::NavigationTrigger;

pub fn record_navigation(trigger: NavigationTrigger) {
    metrics::counter!("nav_navigations_total", "trigger" => trigger.as_str()).increment(1);
}

pub fn record_commit(trigger: NavigationTrigger) {
    metrics::counter!("nav_commits_total", "trigger" => trigger.as_str()).increment(1);
}

pub fn record_deferred() {
    metrics::counter!("nav_prerender_deferred_total").increment(1);
}

pub fn record_superseded() {
    metrics::counter!("nav_superseded_total").increment(1);
}

pub fn record_popstate() {
    metrics::counter!("nav_popstate_total").increment(1);
}

pub fn record_route_miss() {
    metrics::counter!("nav_route_misses_total").increment(1);
}
