//! Jukebox Player (jukebox-player) - Main entry point
//!
//! Loads configuration, wires the resolver, engine factory and session
//! registry together, and serves the HTTP control surface until Ctrl+C or
//! SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use jukebox_common::config::{IngestionLimit, TomlConfig};
use jukebox_common::events::EventBus;
use jukebox_player::{api, logging};
use jukebox_player::engine::ProcessEngineFactory;
use jukebox_player::resolver::YtDlpResolver;
use jukebox_player::{SessionRegistry, SessionSettings};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for jukebox-player
#[derive(Parser, Debug)]
#[command(name = "jukebox-player")]
#[command(about = "Multi-session media queue and playback orchestrator")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "JUKEBOX_PORT")]
    port: Option<u16>,

    /// Maximum tracks taken from one playlist, -1 for unlimited
    #[arg(long, env = "PLAYLIST_LIMIT", allow_hyphen_values = true)]
    playlist_limit: Option<i64>,

    /// Cookie file handed to the extractor
    #[arg(long, env = "COOKIE_FILE")]
    cookie_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Tracing comes up first so configuration warnings are visible
    let log_filter = logging::init().context("Failed to initialize logging")?;

    let mut config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(limit) = args.playlist_limit {
        config.ingestion_limit =
            IngestionLimit::from_i64(limit).context("Invalid playlist limit")?;
    }
    if let Some(cookie_file) = args.cookie_file {
        config.resolver.cookie_file = Some(cookie_file);
    }

    log_filter
        .apply_level(&config.logging.level)
        .context("Invalid log level")?;

    info!("Starting Jukebox Player on port {}", config.port);
    config.discard_missing_cookie_file();
    info!(
        "Playlist limit: {}, error threshold: {}, default volume: {:.0}%",
        config.ingestion_limit.as_i64(),
        config.max_consecutive_errors,
        config.default_volume * 100.0
    );

    let events = Arc::new(EventBus::new(config.event_capacity));
    let registry = Arc::new(SessionRegistry::new(
        Arc::new(YtDlpResolver::new(config.resolver.clone())),
        Arc::new(ProcessEngineFactory::new(config.engine.clone())),
        events,
        SessionSettings::from(&config),
    ));

    api::serve(registry, config.port, shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
