//! # taskd
//!
//! Task CRUD server binary: loads settings, installs logging, opens the
//! task database, and serves HTTP until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use taskd_server::{ServerConfig, TaskServer};
use taskd_settings::TaskdSettings;
use taskd_store::{ConnectionConfig, TaskStore};
use tracing::info;

/// Task CRUD server.
#[derive(Parser, Debug)]
#[command(name = "taskd", about = "Task CRUD server", version)]
struct Cli {
    /// Path to a JSON settings file (default: `$TASKD_CONFIG` or `./taskd.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` task database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line flags over loaded settings.
    fn apply(&self, settings: &mut TaskdSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref path) = self.db_path {
            settings.database.path = path.display().to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loaded =
        taskd_settings::load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    cli.apply(&mut loaded.settings);
    let settings = &loaded.settings;

    // Loading ran before the subscriber existed; report what it found now.
    taskd_logging::init_logging(&settings.logging).context("Failed to initialize logging")?;
    loaded.report();
    info!(version = env!("CARGO_PKG_VERSION"), "starting taskd");

    let db_path = PathBuf::from(&settings.database.path);
    let store = TaskStore::open(
        &db_path,
        &ConnectionConfig {
            pool_size: settings.database.pool_size,
            busy_timeout_ms: settings.database.busy_timeout_ms,
        },
    )
    .with_context(|| format!("Failed to open task database: {}", db_path.display()))?;

    let server = TaskServer::new(ServerConfig::from(&settings.server), store);
    let listener = server
        .bind()
        .await
        .with_context(|| format!("Failed to bind {}", server.config().bind_addr()))?;

    server
        .serve(listener, shutdown_signal())
        .await
        .context("Server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl+c");
        return;
    }
    info!("received ctrl+c, shutting down");
}
