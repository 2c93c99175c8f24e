//! Logging setup for tilestream binaries.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the binary. This helper wires up the usual console
//! subscriber, configurable via the `RUST_LOG` environment variable.

use tracing_subscriber::EnvFilter;

/// Install a console subscriber honoring `RUST_LOG`.
///
/// Falls back to `default_directive` (e.g. `"info"`) when `RUST_LOG` is
/// unset or unparsable.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(
    default_directive: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}
