//! Prerender scheduling.
//!
//! # Responsibilities
//! - Decide whether a boundary mounts now or waits for the host
//! - Own the one-shot readiness channel of the single pending target
//! - Report readiness back to the coordinator
//!
//! # Design Decisions
//! - Standalone mode never defers; behavior is identical without a host
//! - One pending target at a time; registering a new one discards the old
//! - Discarding drops the receiver, so a late signal cannot be delivered

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::history::StackMode;
use crate::navigation::NavigationId;
use crate::prerender::boundary::{ReadinessDetail, RouteBoundary};

/// Result of registering a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Mounted; commit now.
    Ready,
    /// Waiting for a `prerendering` event.
    Deferred,
}

#[derive(Debug)]
struct PendingTarget {
    id: NavigationId,
    path: String,
    receiver: oneshot::Receiver<ReadinessDetail>,
}

#[derive(Debug)]
pub struct PrerenderScheduler {
    mode: StackMode,
    pending: Option<PendingTarget>,
}

impl PrerenderScheduler {
    pub fn new(mode: StackMode) -> Self {
        Self {
            mode,
            pending: None,
        }
    }

    /// Navigation currently awaiting readiness.
    pub fn pending_id(&self) -> Option<NavigationId> {
        self.pending.as_ref().map(|p| p.id)
    }

    /// Register `boundary` as the target of navigation `id`.
    pub fn register(&mut self, id: NavigationId, boundary: &mut RouteBoundary) -> Readiness {
        self.discard();

        if self.mode == StackMode::Standalone || !boundary.prerender() || boundary.is_mounted() {
            boundary.mount();
            return Readiness::Ready;
        }

        let (tx, rx) = oneshot::channel();
        boundary.arm(tx);
        self.pending = Some(PendingTarget {
            id,
            path: boundary.path().to_string(),
            receiver: rx,
        });

        tracing::debug!(id, path = %boundary.path(), "Boundary waiting for prerendering");
        Readiness::Deferred
    }

    /// Drop the pending target, if any. Its boundary stays withheld.
    pub fn discard(&mut self) -> Option<NavigationId> {
        let pending = self.pending.take()?;
        tracing::debug!(id = pending.id, path = %pending.path, "Pending prerender discarded");
        Some(pending.id)
    }

    /// Check whether the pending target became ready.
    pub fn poll(&mut self) -> Option<(NavigationId, ReadinessDetail)> {
        let pending = self.pending.as_mut()?;
        match pending.receiver.try_recv() {
            Ok(detail) => {
                let id = pending.id;
                self.pending = None;
                Some((id, detail))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.pending = None;
                None
            }
        }
    }
}
