//! Credential resolution for the identification backends
//!
//! Provides multi-tier resolution with Settings document → ENV → TOML priority.

use retronode_common::config::TomlConfig;
use tracing::{debug, warn};

use crate::services::identification::BackendCredentials;
use crate::storage::{self, JsonStore, StorageError};

/// Environment variables consulted for the GitHub token, in order
pub const GITHUB_TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_PAT_TOKEN", "RETRONODE_GITHUB_TOKEN"];
/// Environment variables consulted for the Gemini API key, in order
pub const GEMINI_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "RETRONODE_GEMINI_API_KEY"];

/// Validate a credential (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_credential(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| is_valid_key(v))
}

/// Pick the first valid value from settings, environment, then TOML
///
/// Warns when more than one tier supplies a value.
fn resolve_tier(
    name: &str,
    settings_value: Option<String>,
    env_value: Option<String>,
    toml_value: Option<&String>,
) -> Option<String> {
    let settings_value = settings_value.filter(|k| is_valid_key(k));
    let toml_value = toml_value.filter(|k| is_valid_key(k)).cloned();

    let mut sources = Vec::new();
    if settings_value.is_some() {
        sources.push("settings");
    }
    if env_value.is_some() {
        sources.push("environment");
    }
    if toml_value.is_some() {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            name,
            sources.join(", "),
            sources[0]
        );
    }
    if let Some(source) = sources.first() {
        debug!("{} loaded from {}", name, source);
    }

    settings_value.or(env_value).or(toml_value)
}

/// Resolve the GitHub Models token
pub async fn resolve_github_token(
    store: &JsonStore,
    toml_config: &TomlConfig,
) -> Result<Option<String>, StorageError> {
    let stored = storage::settings::get_github_token(store).await?;
    Ok(resolve_tier(
        "GitHub token",
        stored,
        env_credential(&GITHUB_TOKEN_ENV_VARS),
        toml_config.identification.github_token.as_ref(),
    ))
}

/// Resolve the Gemini API key
pub async fn resolve_gemini_api_key(
    store: &JsonStore,
    toml_config: &TomlConfig,
) -> Result<Option<String>, StorageError> {
    let stored = storage::settings::get_gemini_api_key(store).await?;
    Ok(resolve_tier(
        "Gemini API key",
        stored,
        env_credential(&GEMINI_KEY_ENV_VARS),
        toml_config.identification.gemini_api_key.as_ref(),
    ))
}

/// Resolve credentials for every backend
pub async fn resolve_credentials(
    store: &JsonStore,
    toml_config: &TomlConfig,
) -> Result<BackendCredentials, StorageError> {
    Ok(BackendCredentials {
        github_token: resolve_github_token(store, toml_config).await?,
        gemini_api_key: resolve_gemini_api_key(store, toml_config).await?,
    })
}
