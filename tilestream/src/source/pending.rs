//! In-flight request registry.
//!
//! The registry is the single source of truth for "is tile X currently
//! being fetched" and the sole deduplication mechanism: at most one entry
//! exists per tile identifier at any time.

use parking_lot::Mutex;

use crate::coord::TileId;
use crate::transport::RequestHandle;

/// One in-flight request: the tile it serves and the transport handle that
/// can abort it.
struct PendingEntry {
    tile: TileId,
    handle: RequestHandle,
}

/// Mutex-guarded table of in-flight tile requests.
///
/// The table is bounded by the number of concurrently visible tiles
/// (typically tens), so entries live in a flat list probed with a linear
/// scan. The guard is held only for the table mutation and the prompt
/// transport handoff, never across network activity.
#[derive(Default)]
pub struct PendingRequests {
    entries: Mutex<Vec<PendingEntry>>,
}

impl PendingRequests {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically register `tile` and start its transport operation.
    ///
    /// Returns false without invoking `start` when the tile already has an
    /// in-flight request. Otherwise `start` runs inside the critical
    /// section and its handle is recorded, so a concurrent caller can
    /// never observe the tile as absent while its request is being handed
    /// off. `start` must only enqueue work, never block on the network.
    pub fn try_start(&self, tile: TileId, start: impl FnOnce() -> RequestHandle) -> bool {
        let mut entries = self.entries.lock();
        if entries.iter().any(|entry| entry.tile == tile) {
            return false;
        }
        let handle = start();
        entries.push(PendingEntry { tile, handle });
        true
    }

    /// Remove the entry for `tile`, returning its transport handle.
    ///
    /// Used both on normal completion (the handle is dropped) and on
    /// cancellation (the handle is passed to the transport's abort).
    pub fn remove(&self, tile: &TileId) -> Option<RequestHandle> {
        let mut entries = self.entries.lock();
        let index = entries.iter().position(|entry| entry.tile == *tile)?;
        Some(entries.swap_remove(index).handle)
    }

    /// True if `tile` currently has an in-flight request.
    pub fn contains(&self, tile: &TileId) -> bool {
        self.entries.lock().iter().any(|entry| entry.tile == *tile)
    }

    /// Number of in-flight requests.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
