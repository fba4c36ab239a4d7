//! Hybrid Navigation Engine Library

// Core subsystems
pub mod config;
pub mod history;
pub mod navigation;
pub mod prerender;
pub mod routing;

// Cross-cutting concerns
pub mod observability;

pub use config::schema::NavConfig;
pub use history::HistoryController;
pub use navigation::NavigationCoordinator;
pub use routing::{RouteTable, RouteTree};
