//! Commits selected scan results as games
//!
//! Each result becomes one game whose only platform entry points at
//! `<rom_library_root>/<platform_id>/<filename>`. Items are written one at
//! a time; a rejected item is reported and skipped, while a storage failure
//! stops the run and marks every remaining item failed with the same
//! message.

use chrono::Utc;
use indexmap::IndexMap;
use retronode_common::events::{EventBus, ImportedRomInfo, LibraryEvent, RomScanResult};
use serde::Serialize;
use thiserror::Error;

use crate::models::{GameInput, RomLocation};
use crate::storage::{self, JsonStore, StorageError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Platform not found: {0}")]
    PlatformNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Per-item failure in an import report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRom {
    pub filename: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: Vec<ImportedRomInfo>,
    pub failed: Vec<FailedRom>,
}

/// ROM path recorded for an imported file
pub fn rom_path(rom_library_root: &str, platform_id: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        rom_library_root.trim_end_matches(['/', '\\']),
        platform_id,
        filename
    )
}

pub struct RomImporter {
    store: JsonStore,
    event_bus: EventBus,
    rom_library_root: String,
}

impl RomImporter {
    pub fn new(store: JsonStore, event_bus: EventBus, rom_library_root: String) -> Self {
        Self {
            store,
            event_bus,
            rom_library_root,
        }
    }

    /// Import `roms` into `platform_id`
    ///
    /// Fails before any write when the platform does not exist.
    pub async fn import(
        &self,
        platform_id: &str,
        roms: Vec<RomScanResult>,
    ) -> Result<ImportReport, ImportError> {
        let platforms = storage::platforms::list_platforms(&self.store).await?;
        if !platforms.contains_key(platform_id) {
            return Err(ImportError::PlatformNotFound(platform_id.to_string()));
        }

        let mut report = ImportReport::default();
        let mut remaining = roms.into_iter();

        while let Some(rom) = remaining.next() {
            let mut platforms = IndexMap::new();
            platforms.insert(
                platform_id.to_string(),
                RomLocation::Path(rom_path(&self.rom_library_root, platform_id, &rom.filename)),
            );
            let input = GameInput {
                title: rom.name.clone(),
                description: rom.description.clone(),
                cover_image_path: String::new(),
                platforms,
            };

            match storage::games::create_game(&self.store, input).await {
                Ok(view) => report.imported.push(ImportedRomInfo {
                    filename: rom.filename,
                    game_id: view.id,
                }),
                Err(StorageError::Validation(message)) => {
                    tracing::warn!(filename = %rom.filename, %message, "ROM skipped");
                    report.failed.push(FailedRom {
                        filename: rom.filename,
                        message,
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::error!(filename = %rom.filename, error = %message, "Import aborted");
                    report.failed.push(FailedRom {
                        filename: rom.filename,
                        message: message.clone(),
                    });
                    report.failed.extend(remaining.by_ref().map(|rest| FailedRom {
                        filename: rest.filename,
                        message: message.clone(),
                    }));
                }
            }
        }

        tracing::info!(
            platform_id = %platform_id,
            imported = report.imported.len(),
            failed = report.failed.len(),
            "ROM import finished"
        );

        self.event_bus.emit_lossy(LibraryEvent::RomsImported {
            platform_id: platform_id.to_string(),
            imported: report.imported.clone(),
            failed: report.failed.len(),
            timestamp: Utc::now(),
        });

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlatformInput;
    use tempfile::TempDir;

    fn rom(filename: &str, name: &str) -> RomScanResult {
        RomScanResult {
            filename: filename.to_string(),
            name: name.to_string(),
            description: "A NES game.".to_string(),
            success: false,
        }
    }

    async fn store_with_nes(dir: &TempDir) -> JsonStore {
        let store = JsonStore::open(dir.path());
        storage::platforms::create_platform(
            &store,
            PlatformInput {
                platform_id: Some("nes".to_string()),
                name: "NES".to_string(),
                ..PlatformInput::default()
            },
        )
        .await
        .unwrap();
        store
    }

    #[test]
    fn rom_path_joins_without_double_slash() {
        assert_eq!(rom_path("/roms", "nes", "Zelda.zip"), "/roms/nes/Zelda.zip");
        assert_eq!(rom_path("/roms/", "nes", "Zelda.zip"), "/roms/nes/Zelda.zip");
    }

    #[tokio::test]
    async fn imports_one_game_per_result() {
        let dir = TempDir::new().unwrap();
        let store = store_with_nes(&dir).await;
        let importer = RomImporter::new(store.clone(), EventBus::new(8), "/roms".to_string());

        let report = importer
            .import("nes", vec![rom("Zelda.zip", "Zelda"), rom("Mario_1.nes", "Mario 1")])
            .await
            .unwrap();

        assert_eq!(report.imported.len(), 2);
        assert!(report.failed.is_empty());

        let games = store.games.read().await.unwrap();
        assert_eq!(games.len(), 2);
        for game in games.values() {
            assert_eq!(game.platforms.len(), 1);
            assert!(game.platforms.contains_key("nes"));
        }
        let zelda = &games[&report.imported[0].game_id];
        assert_eq!(zelda.platforms["nes"].path(), "/roms/nes/Zelda.zip");
    }

    #[tokio::test]
    async fn blank_name_is_skipped_and_rest_proceeds() {
        let dir = TempDir::new().unwrap();
        let store = store_with_nes(&dir).await;
        let importer = RomImporter::new(store, EventBus::new(8), "/roms".to_string());

        let report = importer
            .import("nes", vec![rom("x.nes", " "), rom("Zelda.zip", "Zelda")])
            .await
            .unwrap();

        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].filename, "x.nes");
    }

    #[tokio::test]
    async fn unknown_platform_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path());
        let importer = RomImporter::new(store.clone(), EventBus::new(8), "/roms".to_string());

        let err = importer.import("snes", vec![rom("a.sfc", "A")]).await.unwrap_err();
        assert!(matches!(err, ImportError::PlatformNotFound(_)));
        assert!(store.games.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_imports_create_separate_games() {
        let dir = TempDir::new().unwrap();
        let store = store_with_nes(&dir).await;
        let importer = RomImporter::new(store.clone(), EventBus::new(8), "/roms".to_string());

        importer.import("nes", vec![rom("Zelda.zip", "Zelda")]).await.unwrap();
        importer.import("nes", vec![rom("Zelda.zip", "Zelda")]).await.unwrap();

        assert_eq!(store.games.read().await.unwrap().len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn storage_failure_fails_remaining_items() {
        let dir = TempDir::new().unwrap();
        let store = store_with_nes(&dir).await;
        // games.json as a directory makes every game write fail
        std::fs::create_dir(dir.path().join("games.json")).unwrap();

        let importer = RomImporter::new(store, EventBus::new(8), "/roms".to_string());
        let report = importer
            .import(
                "nes",
                vec![rom("a.nes", "A"), rom("b.nes", "B"), rom("c.nes", "C")],
            )
            .await
            .unwrap();

        assert!(report.imported.is_empty());
        assert_eq!(report.failed.len(), 3);
        assert!(report.failed.iter().all(|f| f.message == report.failed[0].message));
        assert!(report.failed[0].message.contains("games.json"));
    }
}
