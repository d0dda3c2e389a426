//! Platform and emulator document operations
//!
//! Emulators are nested inside their platform; there is no separate
//! emulator document.

use indexmap::IndexMap;
use serde::Serialize;

use super::{JsonStore, StorageError};
use crate::models::{Emulator, EmulatorInput, Platform, PlatformInput};

/// Platform record with its id, as returned by single-platform endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PlatformView {
    pub platform_id: String,
    #[serde(flatten)]
    pub platform: Platform,
}

/// Emulator record with its id
#[derive(Debug, Clone, Serialize)]
pub struct EmulatorView {
    pub emulator_id: String,
    #[serde(flatten)]
    pub emulator: Emulator,
}

fn platform_not_found(platform_id: &str) -> StorageError {
    StorageError::NotFound(format!("Platform not found: {}", platform_id))
}

fn require_id(value: Option<&str>, what: &str) -> Result<String, StorageError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StorageError::Validation(format!("{} is required", what)))
}

pub async fn list_platforms(store: &JsonStore) -> Result<IndexMap<String, Platform>, StorageError> {
    store.platforms.read().await
}

pub async fn get_platform(store: &JsonStore, platform_id: &str) -> Result<PlatformView, StorageError> {
    let platforms = store.platforms.read().await?;
    platforms
        .get(platform_id)
        .cloned()
        .map(|platform| PlatformView {
            platform_id: platform_id.to_string(),
            platform,
        })
        .ok_or_else(|| platform_not_found(platform_id))
}

/// Create a platform; the id must be new
pub async fn create_platform(
    store: &JsonStore,
    input: PlatformInput,
) -> Result<PlatformView, StorageError> {
    let platform_id = require_id(input.platform_id.as_deref(), "platform_id")?;
    if input.name.trim().is_empty() {
        return Err(StorageError::Validation("Platform name is required".to_string()));
    }

    let platform = Platform::from_input(input);
    store
        .platforms
        .update(|platforms| {
            if platforms.contains_key(&platform_id) {
                return Err(StorageError::Conflict(format!(
                    "Platform already exists: {}",
                    platform_id
                )));
            }
            platforms.insert(platform_id.clone(), platform.clone());
            Ok(())
        })
        .await?;

    tracing::info!(platform_id = %platform_id, "Platform created");
    Ok(PlatformView {
        platform_id,
        platform,
    })
}

/// Replace scalar fields; emulators and the id are preserved
pub async fn update_platform(
    store: &JsonStore,
    platform_id: &str,
    input: PlatformInput,
) -> Result<PlatformView, StorageError> {
    if input.name.trim().is_empty() {
        return Err(StorageError::Validation("Platform name is required".to_string()));
    }

    let platform = store
        .platforms
        .update(|platforms| {
            let platform = platforms
                .get_mut(platform_id)
                .ok_or_else(|| platform_not_found(platform_id))?;
            platform.replace_scalars(input);
            Ok(platform.clone())
        })
        .await?;

    Ok(PlatformView {
        platform_id: platform_id.to_string(),
        platform,
    })
}

/// Point a platform at a new image
pub async fn set_platform_image(
    store: &JsonStore,
    platform_id: &str,
    image_url: String,
) -> Result<PlatformView, StorageError> {
    let platform = store
        .platforms
        .update(|platforms| {
            let platform = platforms
                .get_mut(platform_id)
                .ok_or_else(|| platform_not_found(platform_id))?;
            platform.set_image(image_url);
            Ok(platform.clone())
        })
        .await?;

    Ok(PlatformView {
        platform_id: platform_id.to_string(),
        platform,
    })
}

/// Delete a platform together with its emulators
pub async fn delete_platform(store: &JsonStore, platform_id: &str) -> Result<(), StorageError> {
    store
        .platforms
        .update(|platforms| {
            platforms
                .shift_remove(platform_id)
                .map(|_| ())
                .ok_or_else(|| platform_not_found(platform_id))
        })
        .await?;

    tracing::info!(platform_id = %platform_id, "Platform deleted");
    Ok(())
}

/// Every platform's emulators, keyed by platform id
pub async fn list_all_emulators(
    store: &JsonStore,
) -> Result<IndexMap<String, Vec<EmulatorView>>, StorageError> {
    let platforms = store.platforms.read().await?;
    Ok(platforms
        .into_iter()
        .map(|(pid, platform)| (pid, emulator_views(platform.emulators)))
        .collect())
}

pub async fn list_emulators(
    store: &JsonStore,
    platform_id: &str,
) -> Result<Vec<EmulatorView>, StorageError> {
    let platforms = store.platforms.read().await?;
    let platform = platforms
        .get(platform_id)
        .ok_or_else(|| platform_not_found(platform_id))?;
    Ok(emulator_views(platform.emulators.clone()))
}

fn emulator_views(emulators: IndexMap<String, Emulator>) -> Vec<EmulatorView> {
    emulators
        .into_iter()
        .map(|(emulator_id, emulator)| EmulatorView {
            emulator_id,
            emulator,
        })
        .collect()
}

pub async fn create_emulator(
    store: &JsonStore,
    platform_id: &str,
    input: EmulatorInput,
) -> Result<EmulatorView, StorageError> {
    let emulator_id = require_id(input.emulator_id.as_deref(), "emulator_id")?;
    if input.name.trim().is_empty() {
        return Err(StorageError::Validation("Emulator name is required".to_string()));
    }

    let emulator = Emulator::from_input(input);
    store
        .platforms
        .update(|platforms| {
            let platform = platforms
                .get_mut(platform_id)
                .ok_or_else(|| platform_not_found(platform_id))?;
            if platform.emulators.contains_key(&emulator_id) {
                return Err(StorageError::Conflict(
                    "Emulator already exists for this platform".to_string(),
                ));
            }
            platform.emulators.insert(emulator_id.clone(), emulator.clone());
            Ok(())
        })
        .await?;

    tracing::info!(platform_id = %platform_id, emulator_id = %emulator_id, "Emulator created");
    Ok(EmulatorView {
        emulator_id,
        emulator,
    })
}

/// Replace an emulator, keeping its `created_at`
pub async fn update_emulator(
    store: &JsonStore,
    platform_id: &str,
    emulator_id: &str,
    input: EmulatorInput,
) -> Result<EmulatorView, StorageError> {
    let emulator = store
        .platforms
        .update(|platforms| {
            let platform = platforms
                .get_mut(platform_id)
                .ok_or_else(|| platform_not_found(platform_id))?;
            let emulator = platform
                .emulators
                .get_mut(emulator_id)
                .ok_or_else(|| StorageError::NotFound("Emulator not found".to_string()))?;
            emulator.replace_with(input);
            Ok(emulator.clone())
        })
        .await?;

    Ok(EmulatorView {
        emulator_id: emulator_id.to_string(),
        emulator,
    })
}

pub async fn delete_emulator(
    store: &JsonStore,
    platform_id: &str,
    emulator_id: &str,
) -> Result<(), StorageError> {
    store
        .platforms
        .update(|platforms| {
            let platform = platforms
                .get_mut(platform_id)
                .ok_or_else(|| platform_not_found(platform_id))?;
            platform
                .emulators
                .shift_remove(emulator_id)
                .map(|_| ())
                .ok_or_else(|| StorageError::NotFound("Emulator not found".to_string()))
        })
        .await
}
