//! Explorer server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────▶ net::manager ──▶ whitelist ──▶ http::server ──▶ routing::Dispatcher
//!                 (listener,                     (hyper HTTP/1)        │
//!                  restart)                                            ├─▶ security::acl
//!                                                                      ├─▶ handlers ──▶ backend
//!     Client Response                                                  │
//!     ◀────────── http::response ◀──────────── render (json/html) ◀────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use explorer_server::backend::{ExplorerBackend, SnapshotBackend};
use explorer_server::config::loader::load_config;
use explorer_server::config::ExplorerConfig;
use explorer_server::lifecycle::{wait_for_signal, Shutdown};
use explorer_server::observability::{logging, metrics};
use explorer_server::security::AccessControlList;
use explorer_server::ExplorerServer;

#[derive(Parser, Debug)]
#[command(name = "explorer-server", version, about = "Read-only blockchain explorer HTTP server")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// Override acl.path
    #[arg(long)]
    acl: Option<PathBuf>,

    /// Override backend.snapshot_path
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ExplorerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(acl) = cli.acl {
        config.acl.path = acl.display().to_string();
    }
    if let Some(snapshot) = cli.snapshot {
        config.backend.snapshot_path = snapshot.display().to_string();
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "explorer-server starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        whitelist = config.listener.whitelist.len(),
        acl = %config.acl.path,
        snapshot = %config.backend.snapshot_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let backend: Arc<dyn ExplorerBackend> = if config.backend.snapshot_path.is_empty() {
        tracing::warn!("No snapshot configured, serving an empty chain");
        Arc::new(SnapshotBackend::default())
    } else {
        Arc::new(SnapshotBackend::load(Path::new(&config.backend.snapshot_path))?)
    };

    let acl = Arc::new(if config.acl.path.is_empty() {
        AccessControlList::disabled()
    } else {
        AccessControlList::new(&config.acl.path)
    });

    let server = ExplorerServer::new(&config, backend, acl)?;
    let shutdown = Shutdown::new();

    let run = server.run(&shutdown);
    tokio::pin!(run);
    let signalled = tokio::select! {
        _ = &mut run => false,
        _ = wait_for_signal() => true,
    };
    if signalled {
        shutdown.trigger();
        run.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
