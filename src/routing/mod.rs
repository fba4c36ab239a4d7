//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup / on reload):
//!     RouteConfig[] (nested)
//!     → tree.rs (combine child paths with their parents)
//!     → pattern.rs (compile each level into segments)
//!     → Freeze as immutable RouteTree
//!     → table.rs (atomic swap into the live RouteTable)
//!
//! Path resolution:
//!     pathname
//!     → tree.rs (depth-first, first sibling that matches wins)
//!     → pattern.rs (prefix match of one level against the residual path)
//!     → Return: RouteMatch[] root → leaf, or empty on no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - No regex: patterns are segment vectors, matched in O(n)
//! - Deterministic: sibling order is the only tie-break
//! - No partial chains: a path is matched to a leaf or not at all

pub mod error;
pub mod pattern;
pub mod table;
pub mod tree;

pub use error::RouteError;
pub use pattern::{CompiledRoute, Params};
pub use table::RouteTable;
pub use tree::{merge_params, RouteMatch, RouteNode, RouteTree};
