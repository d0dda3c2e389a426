//! Game catalogue endpoints
//!
//! GET/POST /games, GET/PUT/DELETE /games/:id, PUT /games/:id/cover

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{GameInput, GameView};
use crate::pagination::{calculate_pagination, paginate, Pagination};
use crate::storage::games::{self, GameFilter};
use crate::{ApiResult, AppState};

use super::ApiJson;

/// GET /games query string
///
/// `page` and `limit` are taken as text so that junk values fall back to
/// their defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct GameListQuery {
    pub search: Option<String>,
    pub platform: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    value.and_then(|v| v.trim().parse::<usize>().ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /games response
#[derive(Debug, Serialize)]
pub struct GameListResponse {
    pub success: bool,
    pub data: Vec<GameView>,
    pub pagination: Pagination,
}

/// Single-game response
#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub success: bool,
    pub data: GameView,
}

impl From<GameView> for GameResponse {
    fn from(data: GameView) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// PUT /games/:id/cover request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverRequest {
    #[serde(default)]
    pub image_url: String,
}

/// GET /games
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<GameListQuery>,
) -> ApiResult<Json<GameListResponse>> {
    let filter = GameFilter {
        search: non_empty(query.search),
        platform: non_empty(query.platform),
    };
    let matches = games::list_games(&state.store, &filter).await?;

    let pagination = calculate_pagination(
        matches.len(),
        parse_positive(query.page.as_deref()),
        parse_positive(query.limit.as_deref()),
    );

    Ok(Json(GameListResponse {
        success: true,
        data: paginate(matches, &pagination),
        pagination,
    }))
}

/// GET /games/:id
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(games::get_game(&state.store, &game_id).await?.into()))
}

/// POST /games
pub async fn create_game(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<GameInput>,
) -> ApiResult<(StatusCode, Json<GameResponse>)> {
    let game = games::create_game(&state.store, input).await?;
    tracing::info!(game_id = %game.id, title = %game.game.title, "Game created");
    Ok((StatusCode::CREATED, Json(game.into())))
}

/// PUT /games/:id
pub async fn update_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    ApiJson(input): ApiJson<GameInput>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(games::update_game(&state.store, &game_id, input).await?.into()))
}

/// PUT /games/:id/cover
pub async fn update_cover(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    ApiJson(request): ApiJson<CoverRequest>,
) -> ApiResult<Json<GameResponse>> {
    Ok(Json(
        games::set_cover(&state.store, &game_id, request.image_url)
            .await?
            .into(),
    ))
}

/// DELETE /games/:id
pub async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Json<Value>> {
    games::delete_game(&state.store, &game_id).await?;
    tracing::info!(game_id = %game_id, "Game deleted");
    Ok(Json(json!({
        "success": true,
        "message": format!("Game {} deleted successfully", game_id),
    })))
}

/// Build game routes
pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/:id",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/games/:id/cover", put(update_cover))
}
