//! HTTP API handlers for retronode-server
//!
//! Every route below is nested under `/api` except `/health`.

pub mod emulators;
pub mod games;
pub mod health;
pub mod json;
pub mod launcher;
pub mod platforms;
pub mod scan_sessions;
pub mod scanner;
pub mod settings;
pub mod sse;

pub use emulators::emulator_routes;
pub use games::game_routes;
pub use health::health_routes;
pub use json::ApiJson;
pub use launcher::launcher_routes;
pub use platforms::platform_routes;
pub use scan_sessions::scan_session_routes;
pub use scanner::scanner_routes;
pub use settings::settings_routes;
pub use sse::scan_event_stream;

use crate::ApiError;

/// Fallback for unknown routes
pub async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("Route not found: {}", uri.path()))
}
