//! retronode-server - ROM library service
//!
//! Serves the game/platform catalogue over HTTP, scans ROM folders,
//! identifies files through an external language-model backend and
//! launches emulators.

use anyhow::{Context, Result};
use clap::Parser;
use retronode_common::config::{
    default_config_path, load_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

use retronode_server::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "retronode-server")]
#[command(about = "ROM library server for RetroNode")]
#[command(version)]
struct Args {
    /// Data folder holding games.json, platforms.json and settings.json
    #[arg(short, long, env = "RETRONODE_ROOT")]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "RETRONODE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = match &config_path {
        Some(path) => {
            load_toml_config(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => TomlConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind.clone() {
        config.bind_address = bind;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting RetroNode server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Loaded config file: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => warn!("No config directory on this platform, using defaults"),
    }

    let root_folder = RootFolderResolver::new(args.root_folder, &config).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize data folder: {}", e))?;
    info!("Data folder: {}", initializer.root_folder().display());
    if config.static_assets.is_none() {
        config.static_assets = Some(initializer.static_assets_path());
    }
    info!("ROM base path: {}", config.scanner.roms_base_path.display());

    if config.launch.dry_run {
        warn!("Launch dry-run enabled: emulator commands will not be executed");
    }

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.bind_address, config.port
            )
        })?;

    let state = AppState::new(initializer.root_folder(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
