//! tactus - tactile materials-classification test server
//!
//! # Usage
//!
//! ```bash
//! # Run with built-in defaults (listens on 0.0.0.0:5000)
//! cargo run --release
//!
//! # Custom bind address and config file
//! cargo run --release -- --addr 127.0.0.1:8080 --config ./tactus.toml
//! ```
//!
//! # Environment Variables
//!
//! - `TACTUS_CONFIG`: Path to a tactus.toml config file
//! - `TACTUS_CORS_ORIGINS`: Comma-separated allowed CORS origins (dev only)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use tactus::api::{create_app, ApiState};
use tactus::config::TactusConfig;
use tactus::session::TestSession;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "tactus")]
#[command(about = "Tactile materials-classification test server")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default from config: "0.0.0.0:5000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a tactus.toml config file
    #[arg(long, env = "TACTUS_CONFIG")]
    config: Option<String>,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => TactusConfig::load_from_file(Path::new(path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => TactusConfig::load(),
    };

    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());

    info!(
        channels = config.device.channels,
        readings_per_channel = config.device.readings_per_channel,
        "device geometry configured"
    );

    let session = Arc::new(RwLock::new(TestSession::new()));
    let state = ApiState::new(session, &config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "tactus listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
