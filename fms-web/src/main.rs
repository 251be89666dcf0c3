//! fms-web - Find My Spot web service
//!
//! Serves the browser UI, owns the single UI state controller and calls the
//! Gemini API for image analysis and follow-up info.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fms_common::config::{default_config_path, load_toml_config, resolve_gemini_api_key};
use fms_common::events::EventBus;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fms_web::services::{GatewayConfig, GeminiGateway};
use fms_web::AppState;

/// Command-line arguments for fms-web
#[derive(Parser, Debug)]
#[command(name = "fms-web")]
#[command(about = "Find My Spot: identify where a photo was taken")]
#[command(version)]
struct Args {
    /// TOML config file (default: {config_dir}/find-my-spot/fms-web.toml)
    #[arg(short, long, env = "FMS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "FMS_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "FMS_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let config = match &config_path {
        Some(path) => load_toml_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Default::default(),
    };

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Find My Spot (fms-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }
    info!("Model: {} via {}", config.gemini_model, config.gemini_base_url);

    // Checked again on every call; this only warns early
    if let Err(e) = resolve_gemini_api_key(config.gemini_api_key.as_deref()) {
        warn!("{}", e);
    }

    let gateway = GeminiGateway::new(GatewayConfig::from_toml(&config))
        .context("Failed to initialize Gemini gateway")?;

    let event_bus = EventBus::new(100);
    let state = AppState::new(Arc::new(gateway), event_bus, config.max_upload_bytes);
    let app = fms_web::build_router(state);

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
