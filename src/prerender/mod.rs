//! Prerender subsystem.
//!
//! # Data Flow
//! ```text
//! Coordinator resolves a navigation
//!     → scheduler.rs register(id, boundary)
//!         - standalone / no prerender / already mounted → Ready
//!         - host-backed + prerender → arm boundary with a one-shot sender
//!
//! Host dispatches `prerendering` on the element
//!     → boundary.rs dispatch_prerendering(detail)
//!     → one-shot resolved (children released)
//!     → scheduler.rs poll() → (id, detail) → coordinator commits
//! ```
//!
//! # Design Decisions
//! - Readiness is a one-shot channel, resolved at most once
//! - Superseding drops the receiver; late signals fail to send and are ignored

pub mod boundary;
pub mod scheduler;

pub use boundary::{BoundaryState, ReadinessDetail, RouteBoundary};
pub use scheduler::{PrerenderScheduler, Readiness};
