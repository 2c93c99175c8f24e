//! Tilestream - network fetching for map tiles
//!
//! This library turns abstract tile coordinates into remote resource
//! requests, deduplicates concurrent requests for the same tile, delivers
//! results back to the requesting pipeline stage, and supports cancelling
//! tiles that are no longer needed (e.g. they scrolled off-screen).
//!
//! # High-Level API
//!
//! The [`source`] module provides the fetch coordinator:
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilestream::coord::TileId;
//! use tilestream::source::{NetworkTileSource, UrlTemplate};
//! use tilestream::task::{FetchTask, TileTask};
//! use tilestream::transport::HttpTransport;
//!
//! let transport = Arc::new(HttpTransport::new(runtime_handle)?);
//! let template = UrlTemplate::new("https://tiles.example.com/{z}/{x}/{y}.png");
//! let source = NetworkTileSource::new(transport, template);
//!
//! let task = Arc::new(FetchTask::new(TileId::new(3, 5, 2)));
//! source.load(task, |task| {
//!     // payload (if any) is now stored on the task
//! });
//! ```

pub mod coord;
pub mod logging;
pub mod source;
pub mod task;
pub mod telemetry;
pub mod transport;

/// Version of the tilestream library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
