//! Game document operations

use indexmap::IndexMap;
use uuid::Uuid;

use super::{JsonStore, StorageError};
use crate::models::{Game, GameInput, GameView, PlatformSummary};

/// Filters for [`list_games`]
#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    /// Case-insensitive substring on title or description
    pub search: Option<String>,
    /// Keep only games with an entry for this platform id
    pub platform: Option<String>,
}

/// Filtered games sorted by title, each with its platform details
pub async fn list_games(store: &JsonStore, filter: &GameFilter) -> Result<Vec<GameView>, StorageError> {
    let games = store.games.read().await?;
    let platforms = store.platforms.read().await?;

    let search = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let platform_filter = filter.platform.as_deref().filter(|p| !p.is_empty());

    let mut views: Vec<GameView> = games
        .into_iter()
        .filter(|(_, game)| search.as_deref().map_or(true, |needle| game.matches_search(needle)))
        .filter(|(_, game)| platform_filter.map_or(true, |pid| game.platforms.contains_key(pid)))
        .map(|(id, game)| {
            let details: IndexMap<String, PlatformSummary> = game
                .platforms
                .keys()
                .filter_map(|pid| {
                    platforms.get(pid).map(|p| {
                        (
                            pid.clone(),
                            PlatformSummary {
                                name: p.name.clone(),
                                release_year: p.release_year,
                            },
                        )
                    })
                })
                .collect();
            GameView {
                id,
                game,
                platform_details: Some(details),
            }
        })
        .collect();

    views.sort_by(|a, b| {
        a.game
            .title
            .to_lowercase()
            .cmp(&b.game.title.to_lowercase())
            .then_with(|| a.game.title.cmp(&b.game.title))
    });

    Ok(views)
}

pub async fn get_game(store: &JsonStore, game_id: &str) -> Result<GameView, StorageError> {
    let games = store.games.read().await?;
    games
        .get(game_id)
        .cloned()
        .map(|game| GameView::new(game_id.to_string(), game))
        .ok_or_else(|| StorageError::NotFound(format!("Game with ID {} not found", game_id)))
}

/// Create a game under a fresh UUID v4
///
/// Duplicate titles are allowed.
pub async fn create_game(store: &JsonStore, input: GameInput) -> Result<GameView, StorageError> {
    if input.title.trim().is_empty() {
        return Err(StorageError::Validation("Game title is required".to_string()));
    }

    let game = Game::from_input(input);
    let game_id = Uuid::new_v4().to_string();

    store
        .games
        .update(|games| {
            games.insert(game_id.clone(), game.clone());
            Ok(())
        })
        .await?;

    tracing::debug!(game_id = %game_id, title = %game.title, "Game created");
    Ok(GameView::new(game_id, game))
}

/// Replace a game's fields, keeping `created_at`
pub async fn update_game(
    store: &JsonStore,
    game_id: &str,
    input: GameInput,
) -> Result<GameView, StorageError> {
    if input.title.trim().is_empty() {
        return Err(StorageError::Validation("Game title is required".to_string()));
    }

    let game = store
        .games
        .update(|games| {
            let game = games.get_mut(game_id).ok_or_else(|| {
                StorageError::NotFound(format!("Game not found with identifier: \"{}\"", game_id))
            })?;
            game.replace_with(input);
            Ok(game.clone())
        })
        .await?;

    Ok(GameView::new(game_id.to_string(), game))
}

pub async fn set_cover(
    store: &JsonStore,
    game_id: &str,
    image_url: String,
) -> Result<GameView, StorageError> {
    let game = store
        .games
        .update(|games| {
            let game = games
                .get_mut(game_id)
                .ok_or_else(|| StorageError::NotFound("Game not found".to_string()))?;
            game.cover_image_path = image_url;
            game.updated_at = chrono::Utc::now();
            Ok(game.clone())
        })
        .await?;

    Ok(GameView::new(game_id.to_string(), game))
}

pub async fn delete_game(store: &JsonStore, game_id: &str) -> Result<(), StorageError> {
    store
        .games
        .update(|games| {
            games
                .shift_remove(game_id)
                .map(|_| ())
                .ok_or_else(|| StorageError::NotFound("Game not found".to_string()))
        })
        .await
}
