//! Platform endpoints
//!
//! GET/POST /platforms, GET/PUT/DELETE /platforms/:id,
//! POST /platforms/update-image

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{Platform, PlatformInput};
use crate::storage::platforms::{self, PlatformView};
use crate::{ApiError, ApiResult, AppState};

use super::ApiJson;

/// POST /platforms/update-image request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformImageRequest {
    #[serde(default)]
    pub pid: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct PlatformListResponse {
    pub success: bool,
    /// Platforms keyed by id, in document order
    pub data: IndexMap<String, Platform>,
}

#[derive(Debug, Serialize)]
pub struct PlatformResponse {
    pub success: bool,
    pub data: PlatformView,
}

impl From<PlatformView> for PlatformResponse {
    fn from(data: PlatformView) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// GET /platforms
pub async fn list_platforms(State(state): State<AppState>) -> ApiResult<Json<PlatformListResponse>> {
    Ok(Json(PlatformListResponse {
        success: true,
        data: platforms::list_platforms(&state.store).await?,
    }))
}

/// GET /platforms/:id
pub async fn get_platform(
    State(state): State<AppState>,
    Path(platform_id): Path<String>,
) -> ApiResult<Json<PlatformResponse>> {
    Ok(Json(platforms::get_platform(&state.store, &platform_id).await?.into()))
}

/// POST /platforms
///
/// Returns 409 when the id is already taken.
pub async fn create_platform(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PlatformInput>,
) -> ApiResult<(StatusCode, Json<PlatformResponse>)> {
    let platform = platforms::create_platform(&state.store, input).await?;
    Ok((StatusCode::CREATED, Json(platform.into())))
}

/// PUT /platforms/:id
pub async fn update_platform(
    State(state): State<AppState>,
    Path(platform_id): Path<String>,
    ApiJson(input): ApiJson<PlatformInput>,
) -> ApiResult<Json<PlatformResponse>> {
    Ok(Json(
        platforms::update_platform(&state.store, &platform_id, input)
            .await?
            .into(),
    ))
}

/// DELETE /platforms/:id
pub async fn delete_platform(
    State(state): State<AppState>,
    Path(platform_id): Path<String>,
) -> ApiResult<Json<Value>> {
    platforms::delete_platform(&state.store, &platform_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Platform deleted successfully",
    })))
}

/// POST /platforms/update-image
///
/// `imageUrl` must be an absolute http(s) URL.
pub async fn update_platform_image(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlatformImageRequest>,
) -> ApiResult<Json<PlatformResponse>> {
    let pid = request.pid.trim();
    if pid.is_empty() {
        return Err(ApiError::Validation("Platform ID is required".to_string()));
    }
    let image_url = request.image_url.trim();
    let valid = reqwest::Url::parse(image_url)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !valid {
        return Err(ApiError::Validation(
            "A valid image URL is required".to_string(),
        ));
    }

    let platform = platforms::set_platform_image(&state.store, pid, image_url.to_string()).await?;
    tracing::info!(platform_id = %pid, "Platform image updated");
    Ok(Json(platform.into()))
}

/// Build platform routes
pub fn platform_routes() -> Router<AppState> {
    Router::new()
        .route("/platforms", get(list_platforms).post(create_platform))
        .route("/platforms/update-image", post(update_platform_image))
        .route(
            "/platforms/:id",
            get(get_platform).put(update_platform).delete(delete_platform),
        )
}
