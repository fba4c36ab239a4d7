//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route pattern and report duplicate parameters
//! - Check nested absolute paths against their parents
//! - Validate the history origin and starting path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NavConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{NavConfig, RouteConfig};
use crate::routing::tree::combine_paths;
use crate::routing::{CompiledRoute, RouteError};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route `{path}` has an empty element")]
    EmptyElement { path: String },

    #[error("top-level route `{path}` must start with `/`")]
    RootNotAbsolute { path: String },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("invalid origin `{origin}`: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("initial path `{path}` must start with `/`")]
    InitialPathNotAbsolute { path: String },
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &NavConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Url::parse(&config.history.origin) {
        errors.push(ValidationError::InvalidOrigin {
            origin: config.history.origin.clone(),
            reason: e.to_string(),
        });
    }

    if !config.history.initial_path.starts_with('/') {
        errors.push(ValidationError::InitialPathNotAbsolute {
            path: config.history.initial_path.clone(),
        });
    }

    for route in &config.routes {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RootNotAbsolute {
                path: route.path.clone(),
            });
        }
        validate_route(route, None, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteConfig, parent: Option<&str>, errors: &mut Vec<ValidationError>) {
    if route.element.trim().is_empty() {
        errors.push(ValidationError::EmptyElement {
            path: route.path.clone(),
        });
    }

    let full = match combine_paths(parent, &route.path) {
        Ok((own, full)) => {
            if let Err(e) = CompiledRoute::compile(&own) {
                errors.push(e.into());
            }
            full
        }
        Err(e) => {
            errors.push(e.into());
            // Keep checking descendants against the path as written.
            route.path.clone()
        }
    };

    for child in &route.children {
        validate_route(child, Some(&full), errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let mut config = NavConfig::default();
        config.routes.push(
            RouteConfig::new("/", "Home")
                .child(RouteConfig::new("about", "About"))
                .child(RouteConfig::new("/users/:id", "User")),
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = NavConfig::default();
        config.history.origin = "not a url".into();
        config.history.initial_path = "home".into();
        config.routes.push(RouteConfig::new("users", ""));
        config.routes.push(
            RouteConfig::new("/users", "Users")
                .child(RouteConfig::new("/posts/:id", "Post"))
                .child(RouteConfig::new(":id/:id", "Dup")),
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6, "{errors:?}");
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidOrigin { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InitialPathNotAbsolute { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::RootNotAbsolute { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::EmptyElement { .. })));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::Route(RouteError::NestedPathMismatch { .. })
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::Route(RouteError::DuplicateParam { .. })
        )));
    }
}
