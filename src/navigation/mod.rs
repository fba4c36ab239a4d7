//! Navigation subsystem.
//!
//! # Data Flow
//! ```text
//! pushState / replaceState / navigate / back / forward / go / host change
//!     → history (entry created, replaced or traversed; location moves now)
//!     → coordinator.rs begin()                      [Idle → Resolving]
//!         - supersede any pending navigation (drop its readiness channel)
//!         - RouteTable::resolve(location.pathname)
//!         - ensure one boundary per history entry
//!         - PrerenderScheduler::register(id, boundary)
//!     → Ready:    commit                            [→ Committed → Idle]
//!     → Deferred: wait                              [→ Prerendering]
//!
//! Host `prerendering` on a boundary
//!     → coordinator.rs dispatch_prerendering(path, detail)
//!     → scheduler poll → commit if still the pending navigation
//!
//! commit
//!     → NavigationContext replaced
//!     → event.rs PopStateEvent (traversals only)
//!     → event.rs RouteChangeEvent (every commit)
//! ```
//!
//! # Design Decisions
//! - Single-threaded: the coordinator owns history, scheduler and boundaries
//! - No explicit cancel API; a newer navigation cancels the pending one
//! - A missing route is a valid committed state with an empty match chain

pub mod coordinator;
pub mod event;

pub use coordinator::{NavigationCoordinator, NavigationOutcome, Phase};
pub use event::{
    ListenerId, Listeners, NavigationContext, NavigationId, NavigationTrigger, PopStateEvent,
    RouteChangeEvent, RouteChangeKind,
};
