//! Point-in-time view of fetch metrics.

use std::fmt;

/// Snapshot of fetch counters.
///
/// Plain values copied out of [`super::FetchMetrics`]; safe to hold, send
/// across threads, or compare in tests without touching the live counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Transport operations issued.
    pub requests_started: u64,
    /// Fetches that completed and reached the caller's callback.
    pub delivered: u64,
    /// Fetches dropped on a transport error.
    pub failed: u64,
    /// Fetches dropped because the task was cancelled.
    pub cancelled: u64,
    /// Loads rejected because the tile was already in flight.
    pub duplicates_suppressed: u64,
    /// Total payload bytes received.
    pub bytes_fetched: u64,
}

impl TelemetrySnapshot {
    /// Requests that settled one way or another.
    pub fn settled(&self) -> u64 {
        self.delivered + self.failed + self.cancelled
    }

    /// Fraction of load attempts suppressed as duplicates (0.0 to 1.0).
    pub fn duplicate_ratio(&self) -> f64 {
        let attempts = self.requests_started + self.duplicates_suppressed;
        if attempts == 0 {
            0.0
        } else {
            self.duplicates_suppressed as f64 / attempts as f64
        }
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetch: {} started, {} delivered, {} failed, {} cancelled, {} duplicates, {} bytes",
            self.requests_started,
            self.delivered,
            self.failed,
            self.cancelled,
            self.duplicates_suppressed,
            self.bytes_fetched
        )
    }
}
