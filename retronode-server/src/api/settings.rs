//! Settings endpoints
//!
//! GET /settings reports which credentials are configured without echoing
//! them; PUT /settings applies a partial update.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::models::{IdentificationBackend, Settings, SettingsUpdate};
use crate::{storage, ApiResult, AppState};

use super::ApiJson;

/// Settings as shown to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub identification_backend: IdentificationBackend,
    /// Token stored in settings.json
    pub github_token_configured: bool,
    pub gemini_api_key_configured: bool,
}

impl From<&Settings> for SettingsView {
    fn from(settings: &Settings) -> Self {
        Self {
            identification_backend: settings.identification_backend,
            github_token_configured: settings.github_token.is_some(),
            gemini_api_key_configured: settings.gemini_api_key.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub data: SettingsView,
}

/// GET /settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SettingsResponse>> {
    let settings = storage::settings::get_settings(&state.store).await?;
    Ok(Json(SettingsResponse {
        success: true,
        data: SettingsView::from(&settings),
    }))
}

/// PUT /settings
pub async fn update_settings(
    State(state): State<AppState>,
    ApiJson(update): ApiJson<SettingsUpdate>,
) -> ApiResult<Json<SettingsResponse>> {
    let settings = storage::settings::update_settings(&state.store, update).await?;
    tracing::info!(
        backend = %settings.identification_backend,
        "Settings updated"
    );
    Ok(Json(SettingsResponse {
        success: true,
        data: SettingsView::from(&settings),
    }))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}
