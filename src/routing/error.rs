//! Route configuration errors.

use thiserror::Error;

/// Errors raised while compiling route patterns.
///
/// These are configuration-time failures; matching itself never errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The same parameter name appears twice in one pattern.
    #[error("duplicate parameter `{name}` in pattern `{pattern}`")]
    DuplicateParam { pattern: String, name: String },

    /// An absolute child path does not start with the combined path of its parents.
    #[error("absolute route `{child}` is nested under `{parent}` but does not start with it")]
    NestedPathMismatch { child: String, parent: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteError::DuplicateParam {
            pattern: "/a/:id/:id".into(),
            name: "id".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate parameter `id` in pattern `/a/:id/:id`"
        );

        let err = RouteError::NestedPathMismatch {
            child: "/other".into(),
            parent: "/users".into(),
        };
        assert!(err.to_string().contains("/other"));
    }
}
