//! Switchboard Server
//!
//! Run with: cargo run -- --config config.toml
//!
//! # Configuration
//!
//! Without `--config` the first of these files is used, if any:
//! `~/.config/switchboard/config.toml`, `/etc/switchboard/config.toml`,
//! `./config.toml`. Environment variables override file values:
//! - `SWITCHBOARD_HOST`: Host to bind to (default: 0.0.0.0)
//! - `SWITCHBOARD_PORT`: Port to listen on (default: 8090)
//! - `SWITCHBOARD_MAX_CONNECTIONS`: Connection limit (default: 1000)
//! - `SWITCHBOARD_LOG_LEVEL`: Log level (default: info)
//! - `SWITCHBOARD_LOG_FORMAT`: `pretty` or `json` (default: pretty)
//! - `RUST_LOG`: Full filter directive, wins over the log level

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use switchboard::config::{generate_default_config, Config, LoggingConfig};
use switchboard::{serve, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "switchboard", version, about = "Real-time WebSocket connection server")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config_path = args.config.clone().or_else(Config::locate);
    let mut config = match &config_path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting Switchboard v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let state = AppState::from_config(&config).context("Failed to register default listeners")?;
    let events = state.server.listener_events().await;
    tracing::info!(
        listeners = ?events,
        max_connections = config.hub.max_connections,
        "Listeners registered"
    );

    serve(state, &config.server).await?;

    tracing::info!("Switchboard stopped");
    Ok(())
}

/// Initialize the global tracing subscriber
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("switchboard={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
