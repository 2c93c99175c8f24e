//! Transport abstraction for tile URL requests.
//!
//! The fetch coordinator never performs network I/O itself; it hands each
//! request to a [`Transport`], an abstraction over the platform networking
//! layer. This keeps the coordinator testable with a mock transport and
//! lets the production [`HttpTransport`] live behind the same seam.

mod http;

pub use http::{HttpTransport, TransportError, DEFAULT_TIMEOUT_SECS};

#[cfg(test)]
pub use self::tests::MockTransport;

/// Opaque token identifying one in-flight transport operation.
///
/// Returned by [`Transport::start`] and held by the pending-request
/// registry; passing it to [`Transport::cancel`] is the only way to abort
/// that specific operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle(u64);

impl RequestHandle {
    /// Create a handle from a transport-assigned id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Response produced once per URL request.
#[derive(Debug, Clone, Default)]
pub struct UrlResponse {
    /// Error description, if the fetch failed.
    pub error: Option<String>,
    /// Raw payload bytes. Empty with no error means the fetch completed
    /// but the resource had no content.
    pub content: Vec<u8>,
}

impl UrlResponse {
    /// A completed fetch carrying `content` (possibly empty).
    pub fn success(content: Vec<u8>) -> Self {
        Self {
            error: None,
            content,
        }
    }

    /// A failed fetch described by `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            content: Vec::new(),
        }
    }

    /// True if the fetch failed.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Callback invoked by the transport when a request settles.
pub type FinishCallback = Box<dyn FnOnce(UrlResponse) + Send + 'static>;

/// Asynchronous URL transport.
///
/// # Contract
///
/// - `start` begins the operation and returns promptly. It must NOT invoke
///   `on_finish` from inside `start`: the fetch coordinator calls `start`
///   while holding the pending-registry guard, and the completion path
///   takes that guard again.
/// - `on_finish` runs on an implementation-defined thread or task context,
///   at most once per operation, and exactly once unless the operation is
///   cancelled first.
/// - `cancel` is a best-effort abort: once an abort wins the race against
///   completion, `on_finish` is never invoked for that handle. An abort
///   that loses the race simply lets the completion through.
pub trait Transport: Send + Sync {
    /// Start fetching `url`, delivering the outcome to `on_finish`.
    fn start(&self, url: &str, on_finish: FinishCallback) -> RequestHandle;

    /// Request a best-effort abort of the operation behind `handle`.
    fn cancel(&self, handle: RequestHandle);
}
