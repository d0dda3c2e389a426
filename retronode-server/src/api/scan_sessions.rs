//! Orchestrated scan sessions
//!
//! POST /scan-sessions starts a background run and answers 202 at once.
//! Progress is polled with GET /scan-sessions/:id or streamed from
//! GET /scan-sessions/events.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{IdentificationBackend, ScanSession};
use crate::services::file_scanner::{is_valid_path_format, normalize_extensions};
use crate::services::ScanOrchestrator;
use crate::{ApiError, ApiResult, AppState};

use super::scanner::identification_client;
use super::ApiJson;

/// POST /scan-sessions request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartScanRequest {
    #[serde(default)]
    pub folder_path: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub platform_name: String,
    pub model: Option<IdentificationBackend>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartScanResponse {
    pub success: bool,
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ScanSessionResponse {
    pub success: bool,
    pub data: ScanSession,
}

/// POST /scan-sessions
pub async fn start_scan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StartScanRequest>,
) -> ApiResult<(StatusCode, Json<StartScanResponse>)> {
    if request.platform_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Invalid input: platformName is required".to_string(),
        ));
    }
    if !is_valid_path_format(&request.folder_path) {
        return Err(ApiError::Validation(format!(
            "Invalid folder path format: {}",
            request.folder_path
        )));
    }

    let (backend, client) = identification_client(&state, request.model).await?;

    let session = ScanSession::new(
        request.folder_path,
        request.platform_name,
        normalize_extensions(&request.extensions),
        backend,
    );
    let session_id = session.session_id;
    state.sessions.save(&session).await;

    tracing::info!(
        session_id = %session_id,
        folder = %session.folder_path,
        backend = %backend,
        "Scan session started"
    );

    let orchestrator = ScanOrchestrator::new(
        state.scanner.clone(),
        state.config.scanner.batch_size,
        state.sessions.clone(),
        state.event_bus.clone(),
    );
    let state_clone = state.clone();
    tokio::spawn(async move {
        let finished = orchestrator.execute(session, client).await;
        if let Some(error) = finished.error {
            state_clone.record_error(error).await;
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(StartScanResponse {
            success: true,
            session_id,
        }),
    ))
}

/// GET /scan-sessions/:id
pub async fn get_scan_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ScanSessionResponse>> {
    let id = Uuid::parse_str(&session_id)
        .map_err(|_| ApiError::Validation(format!("Invalid session id: {}", session_id)))?;

    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Scan session not found: {}", id)))?;

    Ok(Json(ScanSessionResponse {
        success: true,
        data: session,
    }))
}

/// Build scan session routes
pub fn scan_session_routes() -> Router<AppState> {
    Router::new()
        .route("/scan-sessions", post(start_scan))
        .route("/scan-sessions/events", get(super::scan_event_stream))
        .route("/scan-sessions/:id", get(get_scan_session))
}
