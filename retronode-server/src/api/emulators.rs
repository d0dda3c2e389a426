//! Emulator endpoints, nested under their platform
//!
//! GET /emulators, GET/POST /emulators/:platformId,
//! PUT/DELETE /emulators/:platformId/:emulatorId

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::EmulatorInput;
use crate::storage::platforms::{self, EmulatorView};
use crate::{ApiResult, AppState};

use super::ApiJson;

#[derive(Debug, Serialize)]
pub struct EmulatorListResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct EmulatorResponse {
    pub success: bool,
    pub data: EmulatorView,
}

/// GET /emulators
pub async fn list_all_emulators(
    State(state): State<AppState>,
) -> ApiResult<Json<EmulatorListResponse<IndexMap<String, Vec<EmulatorView>>>>> {
    Ok(Json(EmulatorListResponse {
        success: true,
        data: platforms::list_all_emulators(&state.store).await?,
    }))
}

/// GET /emulators/:platformId
pub async fn list_emulators(
    State(state): State<AppState>,
    Path(platform_id): Path<String>,
) -> ApiResult<Json<EmulatorListResponse<Vec<EmulatorView>>>> {
    Ok(Json(EmulatorListResponse {
        success: true,
        data: platforms::list_emulators(&state.store, &platform_id).await?,
    }))
}

/// POST /emulators/:platformId
pub async fn create_emulator(
    State(state): State<AppState>,
    Path(platform_id): Path<String>,
    ApiJson(input): ApiJson<EmulatorInput>,
) -> ApiResult<(StatusCode, Json<EmulatorResponse>)> {
    let emulator = platforms::create_emulator(&state.store, &platform_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(EmulatorResponse {
            success: true,
            data: emulator,
        }),
    ))
}

/// PUT /emulators/:platformId/:emulatorId
pub async fn update_emulator(
    State(state): State<AppState>,
    Path((platform_id, emulator_id)): Path<(String, String)>,
    ApiJson(input): ApiJson<EmulatorInput>,
) -> ApiResult<Json<EmulatorResponse>> {
    let emulator =
        platforms::update_emulator(&state.store, &platform_id, &emulator_id, input).await?;
    Ok(Json(EmulatorResponse {
        success: true,
        data: emulator,
    }))
}

/// DELETE /emulators/:platformId/:emulatorId
pub async fn delete_emulator(
    State(state): State<AppState>,
    Path((platform_id, emulator_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    platforms::delete_emulator(&state.store, &platform_id, &emulator_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Emulator deleted successfully",
    })))
}

/// Build emulator routes
pub fn emulator_routes() -> Router<AppState> {
    Router::new()
        .route("/emulators", get(list_all_emulators))
        .route(
            "/emulators/:platform_id",
            get(list_emulators).post(create_emulator),
        )
        .route(
            "/emulators/:platform_id/:emulator_id",
            put(update_emulator).delete(delete_emulator),
        )
}
