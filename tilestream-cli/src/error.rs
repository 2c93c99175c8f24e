//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use tilestream::coord::TileId;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging.
    LoggingInit(String),
    /// Failed to create the tokio runtime.
    Runtime(String),
    /// Failed to build the HTTP transport.
    Transport(String),
    /// The fetch layer refused the request (malformed template).
    RequestRejected(TileId),
    /// No completion arrived before the deadline.
    Timeout { tile: TileId, secs: u64 },
    /// The fetch finished but the tile had no content.
    NoData(TileId),
    /// Failed to write the output file.
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Timeout { .. } = self {
            eprintln!();
            eprintln!("Failed fetches are dropped without retry; check the log output");
            eprintln!("above for transport errors, then simply run the fetch again.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to create tokio runtime: {}", msg),
            CliError::Transport(msg) => write!(f, "Failed to build HTTP transport: {}", msg),
            CliError::RequestRejected(tile) => {
                write!(f, "Request for tile {} was rejected; check the URL template", tile)
            }
            CliError::Timeout { tile, secs } => {
                write!(f, "No response for tile {} within {}s", tile, secs)
            }
            CliError::NoData(tile) => write!(f, "Tile {} was fetched but carried no data", tile),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write {}: {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}
