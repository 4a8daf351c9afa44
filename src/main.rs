//! Collection Creator backend entry point.
//!
//! Initializes tracing, loads configuration from a TOML file, starts the
//! keep-alive pinger when running in production on Render, and serves the
//! Axum router until a shutdown signal arrives.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collection_creator::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use collection_creator::http::start_server;
use collection_creator::keepalive::{self, HttpHealthProbe, KeepAliveConfig};
use collection_creator::routes::create_router;
use collection_creator::state::AppState;

/// Collection Creator backend
#[derive(Parser, Debug)]
#[command(name = "collection-creator", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "collection_creator=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration first: the log format lives in it
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        path = %args.config,
        host = %config.http.host,
        port = config.http.port,
        "Loaded configuration"
    );

    // Resolve keep-alive settings from the process environment
    let keep_alive = KeepAliveConfig::from_env(&config.keep_alive);
    let probe = Arc::new(HttpHealthProbe::new()?);
    let keep_alive_handle = keepalive::init(&keep_alive, probe);

    let state = AppState::new(
        config.clone(),
        keep_alive.environment,
        keep_alive.host_platform,
    );
    let app = create_router(state);

    let served = start_server(app, &config.http).await;

    if let Some(handle) = keep_alive_handle {
        handle.stop().await;
    }

    served?;
    Ok(())
}
