//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the engine.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the navigation engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NavConfig {
    /// History settings (origin, starting path).
    pub history: HistoryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, tried in order.
    pub routes: Vec<RouteConfig>,
}

/// History configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Origin that relative URLs resolve against (e.g., "http://localhost").
    pub origin: String,

    /// Path of the first entry when no host stack is present.
    pub initial_path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost".to_string(),
            initial_path: "/".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// One route. Children nest to any depth.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteConfig {
    /// Pattern, absolute (`/users/:id`) or relative to the parent (`:id`).
    pub path: String,

    /// Opaque target handed to the rendering layer.
    pub element: String,

    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Hold content until the host signals readiness.
    #[serde(default)]
    pub prerender: bool,

    /// Nested routes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            element: element.into(),
            title: None,
            prerender: false,
            children: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn prerender(mut self, prerender: bool) -> Self {
        self.prerender = prerender;
        self
    }

    pub fn child(mut self, child: RouteConfig) -> Self {
        self.children.push(child);
        self
    }
}
