//! History entries, entry keys and the visible location.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::{Position, Url};
use uuid::Uuid;

use crate::history::{HistoryError, HistoryResult};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Generate a process-unique entry key.
///
/// The counter prefix guarantees uniqueness within the process; the random
/// suffix keeps keys from different processes apart.
pub fn generate_key() -> String {
    let seq = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{seq:x}-{}", &nonce[..8])
}

/// One slot of the history stack. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    path: String,
    #[serde(default)]
    state: Value,
    #[serde(default = "generate_key")]
    key: String,
}

impl HistoryEntry {
    /// Create an entry with a fresh key.
    pub fn new(path: impl Into<String>, state: Value) -> Self {
        Self {
            path: path.into(),
            state,
            key: generate_key(),
        }
    }

    /// Create the entry that replaces `self` in place: same key, new content.
    pub fn replaced(&self, path: impl Into<String>, state: Value) -> Self {
        Self {
            path: path.into(),
            state,
            key: self.key.clone(),
        }
    }

    /// Path relative to the origin, including query and fragment.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// The visible `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub href: String,
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    fn from_url(url: &Url) -> Self {
        let search = url.query().map(|q| format!("?{q}")).unwrap_or_default();
        let hash = url.fragment().map(|f| format!("#{f}")).unwrap_or_default();
        Self {
            href: url.to_string(),
            pathname: url.path().to_string(),
            search,
            hash,
        }
    }

    /// Location of an entry path under `origin`.
    pub fn of_entry(origin: &Url, path: &str) -> Self {
        Self::from_url(&entry_url(origin, path))
    }
}

/// Rebuild the absolute URL of an entry path.
///
/// The path is split into its parts and set on a copy of `origin`, so a path
/// such as `//host/x` stays a path and never becomes an authority.
fn entry_url(origin: &Url, path: &str) -> Url {
    let (rest, fragment) = match path.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (path, None),
    };
    let (pathname, query) = match rest.split_once('?') {
        Some((pathname, query)) => (pathname, Some(query)),
        None => (rest, None),
    };

    let mut url = origin.clone();
    url.set_path(pathname);
    url.set_query(query);
    url.set_fragment(fragment);
    url
}

/// Resolve a `pushState`/`replaceState` URL against the current entry path.
///
/// Returns the new entry path (path, query and fragment, no origin).
pub fn resolve_url(origin: &Url, current: &str, url: &str) -> HistoryResult<String> {
    let invalid = |e: url::ParseError| HistoryError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let base = entry_url(origin, current);
    let target = base.join(url).map_err(invalid)?;

    if target.origin() != origin.origin() {
        return Err(HistoryError::CrossOrigin {
            url: url.to_string(),
            origin: origin.origin().ascii_serialization(),
        });
    }

    Ok(target[Position::BeforePath..].to_string())
}
