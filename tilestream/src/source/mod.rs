//! Tile network-fetch coordination.
//!
//! This module turns tile coordinates into URL requests, deduplicates
//! concurrent requests for the same tile, and delivers completed payloads
//! back to the requesting pipeline stage.
//!
//! # Architecture
//!
//! ```text
//! load(task, on_complete)
//!      │
//!      ▼
//! UrlTemplate ──► PendingRequests ──► Transport::start
//!                      ▲                    │ (async)
//!                      │                    ▼
//!                      └───────── completion closure
//!                                 (unregister, check cancellation,
//!                                  assign payload, invoke callback)
//! ```
//!
//! Per tile identifier the lifecycle is:
//! Idle → Pending → delivered | dropped (error, cancelled, duplicate) → Idle.

mod pending;
mod template;

pub use pending::PendingRequests;
pub use template::{TemplateError, UrlTemplate};

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error};

use crate::coord::TileId;
use crate::task::TileTask;
use crate::telemetry::FetchMetrics;
use crate::transport::{Transport, UrlResponse};

/// Coordinates network fetches for tile tasks.
///
/// The source is a stateless orchestrator apart from its pending-request
/// registry: it retains no tile data, and a task is held only for the
/// duration of its in-flight operation.
///
/// Failed fetches are dropped without retry or propagation; a tile that
/// never received data may simply be requested again with a later
/// [`load`](NetworkTileSource::load) once it is no longer pending.
/// Re-request policy belongs to the layer above.
pub struct NetworkTileSource<T: Transport> {
    transport: Arc<T>,
    template: UrlTemplate,
    pending: Arc<PendingRequests>,
    metrics: Arc<FetchMetrics>,
}

impl<T: Transport> NetworkTileSource<T> {
    /// Create a source fetching tiles through `transport` with URLs built
    /// from `template`.
    pub fn new(transport: Arc<T>, template: UrlTemplate) -> Self {
        Self::with_metrics(transport, template, Arc::new(FetchMetrics::new()))
    }

    /// Create a source reporting into an existing metrics instance.
    ///
    /// Useful when several sources share one telemetry surface.
    pub fn with_metrics(
        transport: Arc<T>,
        template: UrlTemplate,
        metrics: Arc<FetchMetrics>,
    ) -> Self {
        Self {
            transport,
            template,
            pending: Arc::new(PendingRequests::new()),
            metrics,
        }
    }

    /// Fetch metrics for this source.
    pub fn metrics(&self) -> &Arc<FetchMetrics> {
        &self.metrics
    }

    /// Number of requests currently in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Start a network fetch for `task`.
    ///
    /// Returns true when a new request was issued. Returns false, issuing
    /// no request, when:
    /// - the task is not the terminal raw-byte retrieval stage,
    /// - the URL template is missing a coordinate token,
    /// - a request for the same tile is already in flight; that request's
    ///   completion delivers the tile.
    ///
    /// `on_complete` is invoked at most once, from the transport's
    /// completion context, after a successful fetch (including one with an
    /// empty payload, which leaves the task's payload slot untouched). It
    /// is not invoked for transport errors or for tasks cancelled before
    /// the completion ran.
    pub fn load<F>(&self, task: Arc<dyn TileTask>, on_complete: F) -> bool
    where
        F: FnOnce(Arc<dyn TileTask>) + Send + 'static,
    {
        let tile = task.tile();

        if !task.fetches_raw_bytes() {
            error!(tile = %tile, "task is not the raw-byte retrieval stage; refusing to fetch");
            return false;
        }

        let url = match self.template.url_for(&tile) {
            Ok(url) => url,
            Err(e) => {
                error!(tile = %tile, error = %e, "cannot build tile URL");
                return false;
            }
        };

        let on_finish = {
            let pending = Arc::clone(&self.pending);
            let metrics = Arc::clone(&self.metrics);
            let task = Arc::clone(&task);
            let url = url.clone();

            move |response: UrlResponse| {
                // The operation already finished; drop the handle without
                // asking the transport to cancel it.
                pending.remove(&tile);

                if task.is_cancelled() {
                    metrics.fetch_cancelled();
                    debug!(tile = %tile, "fetch finished after cancellation; dropping payload");
                    return;
                }

                if let Some(message) = response.error {
                    metrics.fetch_failed();
                    error!(tile = %tile, url = %url, error = %message, "tile request failed");
                    return;
                }

                if !response.content.is_empty() {
                    metrics.bytes_fetched(response.content.len() as u64);
                    task.assign_payload(Bytes::from(response.content));
                }

                metrics.fetch_delivered();
                on_complete(task);
            }
        };

        let started = self
            .pending
            .try_start(tile, || self.transport.start(&url, Box::new(on_finish)));

        if started {
            self.metrics.fetch_started();
            debug!(tile = %tile, url = %url, "tile request started");
        } else {
            self.metrics.duplicate_suppressed();
            debug!(tile = %tile, "tile request already in flight");
        }

        started
    }

    /// Cancel the in-flight request for `tile`, if any.
    ///
    /// Removes the pending entry and asks the transport for a best-effort
    /// abort. Idempotent when nothing is pending. The caller's callback is
    /// never invoked from here; if the abort loses the race and the
    /// completion fires anyway, the task's cancellation flag (set by the
    /// same actor that cancels the tile) is what suppresses delivery.
    pub fn cancel(&self, tile: TileId) {
        if let Some(handle) = self.pending.remove(&tile) {
            debug!(tile = %tile, "aborting in-flight tile request");
            self.transport.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::FetchTask;
    use crate::transport::MockTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn make_source(template: &str) -> (NetworkTileSource<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let source = NetworkTileSource::new(Arc::clone(&transport), UrlTemplate::new(template));
        (source, transport)
    }

    fn make_task(x: u32, y: u32, z: u8) -> Arc<FetchTask> {
        Arc::new(FetchTask::new(TileId::new(x, y, z)))
    }

    /// Task type standing in for an intermediate pipeline stage.
    struct ParseStageTask {
        tile: TileId,
    }

    impl TileTask for ParseStageTask {
        fn tile(&self) -> TileId {
            self.tile
        }
        fn is_cancelled(&self) -> bool {
            false
        }
        fn cancel(&self) {}
        fn fetches_raw_bytes(&self) -> bool {
            false
        }
        fn assign_payload(&self, _payload: Bytes) {
            panic!("intermediate stage has no payload slot");
        }
    }

    #[test]
    fn test_load_builds_url_and_starts_request() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task = make_task(3, 5, 2);

        assert!(source.load(task, |_| {}));
        assert_eq!(transport.started_urls(), vec!["http://x/2/3/5.png"]);
        assert_eq!(source.pending_count(), 1);
    }

    #[test]
    fn test_success_assigns_payload_and_invokes_callback() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task = make_task(3, 5, 2);

        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);
        assert!(source.load(Arc::clone(&task) as Arc<dyn TileTask>, move |task| {
            sink.lock().unwrap().push(task.tile());
        }));

        transport.complete_next(UrlResponse::success(vec![0xAB; 10]));

        assert_eq!(*delivered.lock().unwrap(), vec![TileId::new(3, 5, 2)]);
        assert_eq!(task.payload().unwrap().len(), 10);
        assert_eq!(source.pending_count(), 0);
    }

    #[test]
    fn test_duplicate_load_suppressed() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task_a = make_task(3, 5, 2);
        let task_b = make_task(3, 5, 2);

        assert!(source.load(task_a, |_| {}));
        assert!(!source.load(task_b, |_| {}));

        // No second transport operation for the same tile.
        assert_eq!(transport.start_count(), 1);
        assert_eq!(source.pending_count(), 1);
        assert_eq!(source.metrics().snapshot().duplicates_suppressed, 1);
    }

    #[test]
    fn test_completion_frees_tile_for_reload() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");

        assert!(source.load(make_task(3, 5, 2), |_| {}));
        transport.complete_next(UrlResponse::success(vec![1]));
        assert_eq!(source.pending_count(), 0);

        // The tile is no longer pending, so a new load is accepted.
        assert!(source.load(make_task(3, 5, 2), |_| {}));
        assert_eq!(transport.start_count(), 2);
    }

    #[test]
    fn test_transport_error_drops_without_callback() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task = make_task(3, 5, 2);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        source.load(Arc::clone(&task) as Arc<dyn TileTask>, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        transport.complete_next(UrlResponse::failure("503 service unavailable"));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!task.has_payload());
        assert_eq!(source.pending_count(), 0);
        assert_eq!(source.metrics().snapshot().failed, 1);
    }

    #[test]
    fn test_empty_success_invokes_callback_without_payload() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task = make_task(3, 5, 2);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        source.load(Arc::clone(&task) as Arc<dyn TileTask>, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        transport.complete_next(UrlResponse::success(Vec::new()));

        // "Fetch attempt finished, no data": callback fires, slot untouched.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!task.has_payload());
    }

    #[test]
    fn test_cancel_aborts_transport_and_clears_registry() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task = make_task(3, 5, 2);

        source.load(Arc::clone(&task) as Arc<dyn TileTask>, |_| {});
        task.cancel();
        source.cancel(TileId::new(3, 5, 2));

        assert_eq!(source.pending_count(), 0);
        assert_eq!(transport.cancelled_handles().len(), 1);
    }

    #[test]
    fn test_cancel_without_pending_entry_is_noop() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        source.cancel(TileId::new(9, 9, 9));
        assert!(transport.cancelled_handles().is_empty());
    }

    #[test]
    fn test_cancelled_task_suppresses_late_completion() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task = make_task(3, 5, 2);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        source.load(Arc::clone(&task) as Arc<dyn TileTask>, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // The task is cancelled but the abort never reaches the transport
        // (e.g. the completion was already queued); the handler's flag
        // check is what suppresses delivery.
        task.cancel();
        transport.complete_next(UrlResponse::success(vec![0xAB; 10]));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!task.has_payload());
        assert_eq!(source.pending_count(), 0);
        assert_eq!(source.metrics().snapshot().cancelled, 1);
    }

    #[test]
    fn test_non_fetch_stage_rejected() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");
        let task = Arc::new(ParseStageTask {
            tile: TileId::new(3, 5, 2),
        });

        assert!(!source.load(task, |_| {}));
        assert_eq!(transport.start_count(), 0);
        assert_eq!(source.pending_count(), 0);
    }

    #[test]
    fn test_malformed_template_rejected_without_registration() {
        let (source, transport) = make_source("http://x/{z}/{x}.png");
        let task = make_task(3, 5, 2);

        assert!(!source.load(task, |_| {}));
        assert_eq!(transport.start_count(), 0);
        assert_eq!(source.pending_count(), 0);
    }

    #[test]
    fn test_metrics_accounting() {
        let (source, transport) = make_source("http://x/{z}/{x}/{y}.png");

        assert!(source.load(make_task(1, 1, 1), |_| {}));
        assert!(!source.load(make_task(1, 1, 1), |_| {}));
        assert!(source.load(make_task(2, 1, 1), |_| {}));

        transport.complete_next(UrlResponse::success(vec![0u8; 64]));
        transport.complete_next(UrlResponse::failure("timed out"));

        let snapshot = source.metrics().snapshot();
        assert_eq!(snapshot.requests_started, 2);
        assert_eq!(snapshot.duplicates_suppressed, 1);
        assert_eq!(snapshot.delivered, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.bytes_fetched, 64);
    }
}
