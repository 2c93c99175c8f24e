//! Tile task protocol.
//!
//! A tile task is the unit of work that populates one tile's raw data. The
//! task is created by the caller, shared with the fetch layer for the
//! duration of one request, and mutated (payload stored) by the completion
//! handler if the fetch succeeds before the task is cancelled.
//!
//! The [`TileTask`] trait is a capability interface: the fetch layer stores
//! downloaded bytes through [`TileTask::assign_payload`] instead of
//! downcasting to a concrete task type.

use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::coord::TileId;

/// A unit of work populating one tile's raw data.
///
/// Implementations must be thread-safe (`Send + Sync`): the cancellation
/// flag is set by an external actor on one thread and read from the
/// transport's completion context on another, and the payload slot is
/// written from the completion context while the caller may probe it.
pub trait TileTask: Send + Sync {
    /// The tile this task targets.
    fn tile(&self) -> TileId;

    /// True once the task has been cancelled.
    ///
    /// The read carries acquire semantics, so a completion handler that
    /// observes the flag also observes everything the cancelling thread
    /// did before setting it.
    fn is_cancelled(&self) -> bool;

    /// Flag the task as cancelled.
    ///
    /// Cancellation suppresses payload delivery: a completion handler that
    /// fires after this call drops the response without invoking the
    /// caller's callback.
    fn cancel(&self);

    /// True if this task is the terminal pipeline stage that retrieves raw
    /// bytes.
    ///
    /// The network fetch layer refuses tasks for which this is false; an
    /// intermediate stage has no payload slot to fill from the wire.
    fn fetches_raw_bytes(&self) -> bool;

    /// Store downloaded bytes into the task's payload slot.
    fn assign_payload(&self, payload: Bytes);
}

/// Tile task whose work is raw byte retrieval.
///
/// Shared via [`std::sync::Arc`] between the caller and the fetch layer's
/// completion closure, so it survives until the asynchronous completion
/// fires even if the caller drops its reference first.
///
/// # Example
///
/// ```
/// use tilestream::coord::TileId;
/// use tilestream::task::{FetchTask, TileTask};
///
/// let task = FetchTask::new(TileId::new(3, 5, 2));
/// assert!(!task.is_cancelled());
/// assert!(!task.has_payload());
/// ```
pub struct FetchTask {
    tile: TileId,
    cancelled: AtomicBool,
    payload: Mutex<Option<Bytes>>,
}

impl FetchTask {
    /// Create a task for the given tile with an empty payload slot.
    pub fn new(tile: TileId) -> Self {
        Self {
            tile,
            cancelled: AtomicBool::new(false),
            payload: Mutex::new(None),
        }
    }

    /// The downloaded payload, if one has been assigned.
    ///
    /// Cloning [`Bytes`] is cheap (reference-counted), so this hands out
    /// the payload without holding the slot's lock.
    pub fn payload(&self) -> Option<Bytes> {
        self.payload.lock().clone()
    }

    /// True once a payload has been assigned.
    pub fn has_payload(&self) -> bool {
        self.payload.lock().is_some()
    }
}

impl TileTask for FetchTask {
    fn tile(&self) -> TileId {
        self.tile
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn fetches_raw_bytes(&self) -> bool {
        true
    }

    fn assign_payload(&self, payload: Bytes) {
        *self.payload.lock() = Some(payload);
    }
}
