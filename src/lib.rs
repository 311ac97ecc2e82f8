//! logbuf - Buffered, rotating log destinations
//!
//! In-process log writer with per-destination line buffers, a periodic
//! flush task, hourly or daily file rotation, severity filtering, and
//! probabilistic sampling of structured payloads.
//!
//! # Architecture
//!
//! Destinations are created and reused through a [`LogRegistry`]; every
//! caller asking for the same name shares one buffer and one output
//! file. Writes append to the in-memory buffer and return immediately.
//! The flush task walks all destinations at a fixed interval, swaps each
//! buffer out, and writes the batch with a single `write` call to a file
//! whose name is resolved from the local clock at flush time.
//!
//! ```text
//! write() / info!() / write_json()
//!        │
//!        ▼
//! [Destination buffer] --tick--> [flush: swap, concat, write] --> <name>.<suffix>
//! ```
//!
//! Rotation never renames or truncates: crossing an hour (or day)
//! boundary simply opens the next `<name>.<suffix>` file in append mode.
//!
//! # Example
//!
//! ```ignore
//! use logbuf::{LevelFilter, LogRegistry};
//!
//! #[tokio::main]
//! async fn main() -> logbuf::Result<()> {
//!     let registry = LogRegistry::new();
//!     registry.start();
//!
//!     let app = registry.get_with_level("/var/log/app", LevelFilter::Info);
//!     app.info("service started")?;
//!     logbuf::warn!(app, "queue depth {}", 17)?;
//!     app.write_json(&serde_json::json!({ "event": "login", "user": 42 }))?;
//!
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```

// =============================================================================
// Modules
// =============================================================================

/// Clock abstraction so rotation and timestamps are testable
mod clock;

/// Registry and destination configuration types
mod config;

/// A single named output stream: buffering, filtering, flushing
mod destination;

/// Error types and the fatal escalation event
mod error;

/// Probabilistic sampling draw
mod filter;

/// Severity levels and thresholds
mod level;

/// Format-style logging macros
mod macros;

/// Per-destination counters
mod metrics;

/// Destination registry and lifecycle
mod registry;

/// Rotated file name resolution and the open file slot
mod rotation;

/// Periodic flush fan-out task
mod scheduler;

// =============================================================================
// Public re-exports
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DestinationConfig, RegistryConfig, TimestampMode};
pub use destination::Destination;
pub use error::{Error, FatalError, FatalOp, Result};
pub use level::{Level, LevelFilter};
pub use metrics::{DestinationMetrics, MetricsSnapshot};
pub use registry::{LogRegistry, LogRegistryBuilder};
pub use rotation::RotationPolicy;
