//! Lock-free fetch counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::TelemetrySnapshot;

/// Counters for tile fetch outcomes.
///
/// One instance is typically shared (via `Arc`) between a fetch source and
/// whatever surface displays the numbers. All methods are callable from any
/// thread.
#[derive(Debug, Default)]
pub struct FetchMetrics {
    requests_started: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    duplicates_suppressed: AtomicU64,
    bytes_fetched: AtomicU64,
}

impl FetchMetrics {
    /// Create a zeroed metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new transport operation was issued.
    pub fn fetch_started(&self) {
        self.requests_started.fetch_add(1, Ordering::Relaxed);
    }

    /// A fetch completed and its callback was (or is about to be) invoked.
    pub fn fetch_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// A fetch failed at the transport and was dropped.
    pub fn fetch_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A fetch completed for an already-cancelled task and was dropped.
    pub fn fetch_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// A load was rejected because the tile was already in flight.
    pub fn duplicate_suppressed(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// `count` payload bytes arrived.
    pub fn bytes_fetched(&self, count: u64) {
        self.bytes_fetched.fetch_add(count, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            requests_started: self.requests_started.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            duplicates_suppressed: self.duplicates_suppressed.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
        }
    }
}
