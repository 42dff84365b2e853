//! Waypoint server binary.
//!
//! # Usage
//!
//! ```bash
//! waypoint-server --bind 0.0.0.0:9999
//! waypoint-server --bind 0.0.0.0:9999 --config waypoint.toml --log-level debug
//! ```

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use waypoint_core::ServerConfig;
use waypoint_server::{ServerError, config_file::FileConfig, serve};

/// Waypoint robot relay server.
#[derive(Parser, Debug)]
#[command(name = "waypoint-server")]
#[command(about = "Guides robot clients to the origin over a text protocol")]
#[command(version)]
struct Args {
    /// Address to bind to.
    #[arg(short, long, default_value = "0.0.0.0:9999")]
    bind: String,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = match &args.config {
        Some(path) => FileConfig::load(path)?.merge_over(ServerConfig::default()),
        None => ServerConfig::default(),
    };

    tracing::info!(bind = %args.bind, "waypoint server starting");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    serve(&args.bind, Arc::new(config), shutdown_rx).await
}
