//! Settings document operations

use super::{JsonStore, StorageError};
use crate::models::{Settings, SettingsUpdate};

pub async fn get_settings(store: &JsonStore) -> Result<Settings, StorageError> {
    store.settings.read().await
}

pub async fn update_settings(
    store: &JsonStore,
    update: SettingsUpdate,
) -> Result<Settings, StorageError> {
    store
        .settings
        .update(|settings| {
            settings.apply(update);
            Ok(settings.clone())
        })
        .await
}

/// GitHub token stored via the settings API, if any
pub async fn get_github_token(store: &JsonStore) -> Result<Option<String>, StorageError> {
    Ok(get_settings(store).await?.github_token)
}

/// Gemini API key stored via the settings API, if any
pub async fn get_gemini_api_key(store: &JsonStore) -> Result<Option<String>, StorageError> {
    Ok(get_settings(store).await?.gemini_api_key)
}
