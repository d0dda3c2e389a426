//! retronode-server library interface
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;
pub mod storage;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use retronode_common::config::TomlConfig;
use retronode_common::events::EventBus;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::{FileScanner, ScanSessionRegistry};
use crate::storage::JsonStore;

/// Event bus capacity
pub const EVENT_BUS_CAPACITY: usize = 100;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// JSON document store in the data folder
    pub store: JsonStore,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Effective configuration (file + environment)
    pub config: Arc<TomlConfig>,
    /// Folder scanner confined to the ROM base path
    pub scanner: FileScanner,
    /// Scan sessions, polled by id
    pub sessions: ScanSessionRegistry,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(data_dir: &Path, config: TomlConfig) -> Self {
        let scanner = FileScanner::new(&config.scanner.roms_base_path);
        Self {
            store: JsonStore::open(data_dir),
            event_bus: EventBus::new(EVENT_BUS_CAPACITY),
            config: Arc::new(config),
            scanner,
            sessions: ScanSessionRegistry::new(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember the most recent failure for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
///
/// `/health` sits at the root, the JSON API under `/api`. Anything else is
/// served from the static assets folder when one is configured.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(api::game_routes())
        .merge(api::platform_routes())
        .merge(api::emulator_routes())
        .merge(api::scanner_routes())
        .merge(api::scan_session_routes())
        .merge(api::launcher_routes())
        .merge(api::settings_routes())
        .fallback(api::not_found);

    let router = Router::new()
        .merge(api::health_routes())
        .nest("/api", api);

    let router = match state.config.static_assets.as_deref() {
        Some(dir) if dir.is_dir() => {
            tracing::info!("Serving static assets from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        _ => router.fallback(api::not_found),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
