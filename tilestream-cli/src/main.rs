//! Tilestream CLI - fetch a single map tile from a templated tile server.
//!
//! ```text
//! tilestream --template "https://tile.openstreetmap.org/{z}/{x}/{y}.png" 3 5 2 -o tile.png
//! ```

mod error;

use std::io::Write;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use clap::Parser;
use tracing::info;

use tilestream::coord::TileId;
use tilestream::logging;
use tilestream::source::{NetworkTileSource, UrlTemplate};
use tilestream::task::{FetchTask, TileTask};
use tilestream::transport::HttpTransport;

use error::CliError;

/// Fetch a single map tile from a templated tile server.
#[derive(Parser, Debug)]
#[command(name = "tilestream", version = tilestream::VERSION, about)]
struct Args {
    /// URL template containing {x}, {y} and {z} tokens.
    #[arg(short, long)]
    template: String,

    /// Tile column.
    x: u32,

    /// Tile row.
    y: u32,

    /// Zoom level.
    z: u8,

    /// Write the tile payload to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds to wait for the fetch before giving up.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn main() {
    if let Err(e) = run() {
        e.exit();
    }
}

fn run() -> Result<(), CliError> {
    let args = Args::parse();

    logging::init_logging("info").map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let transport = Arc::new(
        HttpTransport::with_timeout(runtime.handle().clone(), args.timeout)
            .map_err(|e| CliError::Transport(e.to_string()))?,
    );
    let source = NetworkTileSource::new(transport, UrlTemplate::new(&args.template));

    let tile = TileId::new(args.x, args.y, args.z);
    let task = Arc::new(FetchTask::new(tile));

    let (tx, rx) = mpsc::channel();
    let issued = source.load(Arc::clone(&task) as Arc<dyn TileTask>, move |task| {
        let _ = tx.send(task.tile());
    });
    if !issued {
        return Err(CliError::RequestRejected(tile));
    }

    // Errors are dropped by the fetch layer (logged, no callback), so a
    // missing completion and a failed fetch look the same from here.
    rx.recv_timeout(Duration::from_secs(args.timeout + 5))
        .map_err(|_| CliError::Timeout {
            tile,
            secs: args.timeout,
        })?;

    let payload = task.payload().ok_or(CliError::NoData(tile))?;
    info!(tile = %tile, bytes = payload.len(), "tile fetched");

    match &args.output {
        Some(path) => std::fs::write(path, &payload).map_err(|e| CliError::FileWrite {
            path: path.display().to_string(),
            error: e,
        })?,
        None => {
            std::io::stdout()
                .write_all(&payload)
                .map_err(|e| CliError::FileWrite {
                    path: "<stdout>".to_string(),
                    error: e,
                })?;
        }
    }

    Ok(())
}
