//! Route boundaries: the renderable unit bound to one history entry.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

/// Payload of a `prerendering` event.
pub type ReadinessDetail = Option<Value>;

/// Whether a boundary's children may be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryState {
    /// Children held back until readiness.
    Withheld,
    /// Children released for mounting.
    Mounted,
}

/// One mounted route element.
///
/// Keyed by the history entry it renders; `path` is the concrete path the
/// host uses to address it, `pattern` the route it matched. A pre-mounted
/// boundary has no key until a navigation to its path adopts it.
#[derive(Debug)]
pub struct RouteBoundary {
    key: Option<String>,
    path: String,
    pattern: Option<String>,
    prerender: bool,
    state: BoundaryState,
    detail: ReadinessDetail,
    readiness: Option<oneshot::Sender<ReadinessDetail>>,
}

impl RouteBoundary {
    pub fn new(
        key: impl Into<String>,
        path: impl Into<String>,
        pattern: Option<String>,
        prerender: bool,
    ) -> Self {
        let mut boundary = Self::premounted(path, pattern, prerender);
        boundary.key = Some(key.into());
        boundary
    }

    /// A boundary created ahead of any history entry.
    pub fn premounted(path: impl Into<String>, pattern: Option<String>, prerender: bool) -> Self {
        Self {
            key: None,
            path: path.into(),
            pattern,
            prerender,
            state: BoundaryState::Withheld,
            detail: None,
            readiness: None,
        }
    }

    /// Entry key; `None` while pre-mounted.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_premounted(&self) -> bool {
        self.key.is_none()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn prerender(&self) -> bool {
        self.prerender
    }

    pub fn state(&self) -> BoundaryState {
        self.state
    }

    /// Children are present.
    pub fn is_mounted(&self) -> bool {
        self.state == BoundaryState::Mounted
    }

    /// Detail of the `prerendering` event that released this boundary.
    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    /// Whether a readiness signal is awaited.
    pub fn is_armed(&self) -> bool {
        self.readiness.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub(crate) fn adopt(&mut self, key: impl Into<String>) {
        self.key = Some(key.into());
    }

    pub(crate) fn mount(&mut self) {
        self.state = BoundaryState::Mounted;
        self.readiness = None;
    }

    pub(crate) fn arm(&mut self, readiness: oneshot::Sender<ReadinessDetail>) {
        self.readiness = Some(readiness);
    }

    /// Deliver a `prerendering` event.
    ///
    /// Releases the children only if the scheduler is still waiting for this
    /// boundary. Repeated, unexpected or superseded signals do nothing.
    pub fn dispatch_prerendering(&mut self, detail: ReadinessDetail) -> bool {
        let Some(readiness) = self.readiness.take() else {
            return false;
        };
        match readiness.send(detail.clone()) {
            Ok(()) => {
                self.state = BoundaryState::Mounted;
                self.detail = detail;
                true
            }
            Err(_) => {
                tracing::debug!(path = %self.path, key = ?self.key, "Late prerendering signal ignored");
                false
            }
        }
    }
}
