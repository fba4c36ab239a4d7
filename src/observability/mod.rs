//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → Log output (stdout, pretty or JSON)
//!     → Whatever metrics recorder the embedding app installs
//! ```
//!
//! # Design Decisions
//! - Every phase change is a `debug!` event, every commit an `info!`
//! - Metrics are cheap (atomic increments, no-op without a recorder)

pub mod logging;
pub mod metrics;
