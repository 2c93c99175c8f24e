//! HTTP transport backed by reqwest.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{FinishCallback, RequestHandle, Transport, UrlResponse};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while setting up the HTTP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Production transport performing HTTP(S) GETs on a tokio runtime.
///
/// Each `start` spawns a task that races the request against a
/// per-operation [`CancellationToken`]; `cancel` fires the token. Tokens
/// for in-flight operations live in a mutex-guarded map and are removed
/// once the operation settles either way.
pub struct HttpTransport {
    client: reqwest::Client,
    runtime: Handle,
    next_id: AtomicU64,
    aborts: Arc<Mutex<HashMap<RequestHandle, CancellationToken>>>,
}

impl HttpTransport {
    /// Create a transport with the default request timeout.
    ///
    /// # Arguments
    ///
    /// * `runtime` - Handle of the tokio runtime that drives the requests
    pub fn new(runtime: Handle) -> Result<Self, TransportError> {
        Self::with_timeout(runtime, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a transport with a custom per-request timeout.
    pub fn with_timeout(runtime: Handle, timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            runtime,
            next_id: AtomicU64::new(0),
            aborts: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Number of operations currently in flight.
    pub fn inflight_count(&self) -> usize {
        self.aborts.lock().len()
    }
}

impl Transport for HttpTransport {
    fn start(&self, url: &str, on_finish: FinishCallback) -> RequestHandle {
        let handle = RequestHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        self.aborts.lock().insert(handle, token.clone());

        let client = self.client.clone();
        let aborts = Arc::clone(&self.aborts);
        let url = url.to_owned();

        self.runtime.spawn(async move {
            let outcome = tokio::select! {
                biased;

                _ = token.cancelled() => None,
                response = fetch(&client, &url) => Some(response),
            };

            aborts.lock().remove(&handle);

            match outcome {
                Some(response) => on_finish(response),
                None => debug!(url = %url, "request aborted before completion"),
            }
        });

        handle
    }

    fn cancel(&self, handle: RequestHandle) {
        if let Some(token) = self.aborts.lock().remove(&handle) {
            token.cancel();
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> UrlResponse {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return UrlResponse::failure(format!("request failed: {}", e)),
    };

    let status = response.status();
    if !status.is_success() {
        return UrlResponse::failure(format!("HTTP {} from {}", status, url));
    }

    match response.bytes().await {
        Ok(body) => UrlResponse::success(body.to_vec()),
        Err(e) => UrlResponse::failure(format!("failed to read response body: {}", e)),
    }
}
