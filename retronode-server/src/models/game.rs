//! Game records as stored in `games.json`
//!
//! The document is a map keyed by game id (UUID v4). The id is not repeated
//! inside the record; API responses add it back.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where a game's ROM lives for one platform
///
/// Older documents store a bare path string, newer ones a `{ "path": ... }`
/// object. Both shapes are read and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RomLocation {
    Path(String),
    Object { path: String },
}

impl RomLocation {
    pub fn path(&self) -> &str {
        match self {
            RomLocation::Path(path) => path,
            RomLocation::Object { path } => path,
        }
    }
}

impl From<String> for RomLocation {
    fn from(path: String) -> Self {
        RomLocation::Path(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image_path: String,
    /// Platform id → ROM location, in document order
    #[serde(default)]
    pub platforms: IndexMap<String, RomLocation>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Build a new record from caller input, stamping both timestamps
    pub fn from_input(input: GameInput) -> Self {
        let now = Utc::now();
        Self {
            title: input.title.trim().to_string(),
            description: input.description,
            cover_image_path: input.cover_image_path,
            platforms: input.platforms,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every field from `input`, keeping `created_at`
    pub fn replace_with(&mut self, input: GameInput) {
        self.title = input.title.trim().to_string();
        self.description = input.description;
        self.cover_image_path = input.cover_image_path;
        self.platforms = input.platforms;
        self.updated_at = Utc::now();
    }

    /// First platform entry in document order
    pub fn primary_platform(&self) -> Option<(&String, &RomLocation)> {
        self.platforms.first()
    }

    /// Case-insensitive substring match on title or description
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Platform name and year attached to listed games
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformSummary {
    pub name: String,
    pub release_year: Option<i32>,
}

/// A game as returned by the API: the record plus its id
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub id: String,
    #[serde(flatten)]
    pub game: Game,
    #[serde(rename = "platformDetails", skip_serializing_if = "Option::is_none")]
    pub platform_details: Option<IndexMap<String, PlatformSummary>>,
}

impl GameView {
    pub fn new(id: String, game: Game) -> Self {
        Self {
            id,
            game,
            platform_details: None,
        }
    }
}

/// Create / replace payload for a game
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image_path: String,
    #[serde(default)]
    pub platforms: IndexMap<String, RomLocation>,
}
