//! Fetch telemetry for observability and user feedback.
//!
//! This module provides metrics collection for the tile fetch pipeline.
//! Counters are lock-free atomics, so recording from transport completion
//! contexts never blocks.
//!
//! # Architecture
//!
//! ```text
//! Fetch Coordinator ─────► FetchMetrics ─────► TelemetrySnapshot ─────► Views
//!                          (atomic counters)   (point-in-time copy)     (CLI, etc.)
//! ```
//!
//! # Example
//!
//! ```
//! use tilestream::telemetry::FetchMetrics;
//!
//! let metrics = FetchMetrics::new();
//! metrics.fetch_started();
//! metrics.bytes_fetched(768_000);
//! metrics.fetch_delivered();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.delivered, 1);
//! assert_eq!(snapshot.bytes_fetched, 768_000);
//! ```

mod metrics;
mod snapshot;

pub use metrics::FetchMetrics;
pub use snapshot::TelemetrySnapshot;
