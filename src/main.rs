//! Edge rewrite service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Viewer Request (Host, path)
//!     ─────────────────────────▶ http server ──▶ rewrite engine ──▶ origin client ──▶ Object Storage
//!                                  │                  ▲                                 /<host>/...
//!                                  │                  │
//!                                  │          config (TOML, hot reload of [rewrite])
//!                                  ▼
//!                          observability (tracing, Prometheus)
//!
//!     Admin API: /health  /config  /invoke
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_rewrite::config::{load_config, ConfigWatcher, EdgeConfig};
use edge_rewrite::lifecycle::{signals, Shutdown};
use edge_rewrite::observability::{logging, metrics};
use edge_rewrite::EdgeServer;

#[derive(Parser)]
#[command(name = "edge-rewrite")]
#[command(about = "Host-based URL rewriting edge for multi-tenant static sites", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watch the config file and hot-reload the [rewrite] section.
    #[arg(long, default_value_t = false)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("edge-rewrite v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.base_url,
        default_host_suffix = %config.rewrite.default_host_suffix,
        on_missing_host = ?config.rewrite.on_missing_host,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let admin_listener = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&signal_shutdown).await;
    });

    let server = EdgeServer::new(config)?;
    server
        .run(listener, admin_listener, config_updates, shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
