//! POST /launch-game

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::services::GameLauncher;
use crate::{ApiError, ApiResult, AppState};

use super::ApiJson;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(default)]
    pub game_id: String,
    pub emulator_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchResponse {
    pub success: bool,
    pub message: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub dry_run: bool,
}

/// POST /launch-game
///
/// Waits for the emulator to exit. A failed start or non-zero exit answers
/// 500 with the command and captured output.
pub async fn launch_game(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LaunchRequest>,
) -> ApiResult<Json<LaunchResponse>> {
    if request.game_id.trim().is_empty() {
        return Err(ApiError::Validation(
            "Invalid input: gameId is required".to_string(),
        ));
    }

    let launcher = GameLauncher::new(
        state.store.clone(),
        state.event_bus.clone(),
        state.config.launch.dry_run,
    );
    let emulator_id = request.emulator_id.as_deref().filter(|id| !id.trim().is_empty());

    let outcome = match launcher.launch(&request.game_id, emulator_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = ApiError::from(e);
            if matches!(err, ApiError::LaunchFailed { .. }) {
                state.record_error(err.to_string()).await;
            }
            return Err(err);
        }
    };

    let message = if outcome.dry_run {
        "Launch command prepared (dry run)".to_string()
    } else {
        "Game launched successfully".to_string()
    };

    Ok(Json(LaunchResponse {
        success: true,
        message,
        command: outcome.command,
        exit_code: outcome.exit_code,
        stdout: outcome.stdout,
        stderr: outcome.stderr,
        dry_run: outcome.dry_run,
    }))
}

/// Build launcher routes
pub fn launcher_routes() -> Router<AppState> {
    Router::new().route("/launch-game", post(launch_game))
}
