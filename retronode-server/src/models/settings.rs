//! Persisted settings (`settings.json`)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which external service identifies ROM filenames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentificationBackend {
    /// One chat-completion request per batch
    #[default]
    #[serde(alias = "github")]
    Chat,
    /// One generateContent request per filename
    #[serde(alias = "gemini")]
    Generative,
}

impl fmt::Display for IdentificationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentificationBackend::Chat => write!(f, "chat"),
            IdentificationBackend::Generative => write!(f, "generative"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub identification_backend: IdentificationBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
}

/// Partial update for `PUT /api/settings`
///
/// Absent fields are left alone. An empty credential string clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub identification_backend: Option<IdentificationBackend>,
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Settings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(backend) = update.identification_backend {
            self.identification_backend = backend;
        }
        if let Some(token) = update.github_token {
            self.github_token = non_blank(token);
        }
        if let Some(key) = update.gemini_api_key {
            self.gemini_api_key = non_blank(key);
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
