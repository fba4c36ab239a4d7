//! History API errors.

use thiserror::Error;

/// Errors raised by `pushState`/`replaceState` URL handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The URL could not be resolved against the current location.
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The URL resolves to a different origin than the document.
    #[error("URL `{url}` is not same-origin with `{origin}`")]
    CrossOrigin { url: String, origin: String },
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
