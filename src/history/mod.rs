//! History subsystem.
//!
//! # Data Flow
//! ```text
//! pushState / replaceState
//!     → controller.rs (resolve URL, build entry)
//!     → stack.rs (HistoryStack strategy)
//!         - InMemoryStack (standalone)
//!         - host.rs HostBackedStack (writes through to the host handle)
//!
//! back / forward / go
//!     → controller.rs → stack.traverse(delta)
//!
//! Host-initiated change
//!     → host.rs reconcile (diff against the last mirrored stack)
//!     → HostChange (Popped / Pushed / Rewritten)
//! ```
//!
//! # Design Decisions
//! - Strategy chosen once at construction, never re-checked inline
//! - Entries are values; replace builds a new entry with the same key
//! - Keys are unique for the lifetime of the process

pub mod controller;
pub mod entry;
pub mod error;
pub mod host;
pub mod stack;

pub use controller::HistoryController;
pub use entry::{generate_key, HistoryEntry, Location};
pub use error::{HistoryError, HistoryResult};
pub use host::{HostBackedStack, HostChange, HybridHistoryHandle, SharedHandle};
pub use stack::{HistoryStack, InMemoryStack, StackMode};
