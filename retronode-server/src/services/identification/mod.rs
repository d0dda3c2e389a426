//! ROM identification via external language-model backends
//!
//! Two backends are supported: a chat-completion backend that identifies a
//! whole batch per request, and a generative backend that takes one request
//! per filename. Both always return one result per filename, in order,
//! filling failures with heuristic fallback names. The only hard error is a
//! missing credential for the selected backend.

mod chat_client;
mod fallback;
mod generative_client;

pub use chat_client::ChatClient;
pub use fallback::{derive_fallback_name, extract_json, fallback_batch, fallback_result};
pub use generative_client::GenerativeClient;

use retronode_common::config::IdentificationConfig;
use retronode_common::events::RomScanResult;
use std::time::Duration;
use thiserror::Error;

use crate::models::IdentificationBackend;

pub(crate) const USER_AGENT: &str = concat!("RetroNode/", env!("CARGO_PKG_VERSION"));

/// Identification errors
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Credential for the selected backend is missing
    #[error("{0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Resolved credentials for every backend
#[derive(Debug, Clone, Default)]
pub struct BackendCredentials {
    pub github_token: Option<String>,
    pub gemini_api_key: Option<String>,
}

/// A ready-to-use backend client
pub enum IdentificationClient {
    Chat(ChatClient),
    Generative(GenerativeClient),
}

impl IdentificationClient {
    /// Build a client for `backend`
    ///
    /// Fails with [`IdentifyError::Configuration`] when the backend's
    /// credential is missing.
    pub fn new(
        backend: IdentificationBackend,
        credentials: &BackendCredentials,
        config: &IdentificationConfig,
    ) -> Result<Self, IdentifyError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));

        match backend {
            IdentificationBackend::Chat => {
                let token = credentials.github_token.clone().ok_or_else(|| {
                    IdentifyError::Configuration(
                        "GitHub token is not configured. Set it via PUT /api/settings, \
                         GITHUB_PAT_TOKEN, or [identification] github_token in config.toml"
                            .to_string(),
                    )
                })?;
                Ok(Self::Chat(ChatClient::new(
                    config.chat_endpoint.clone(),
                    token,
                    timeout,
                )?))
            }
            IdentificationBackend::Generative => {
                let key = credentials.gemini_api_key.clone().ok_or_else(|| {
                    IdentifyError::Configuration(
                        "Gemini API key is not configured. Set it via PUT /api/settings, \
                         GEMINI_API_KEY, or [identification] gemini_api_key in config.toml"
                            .to_string(),
                    )
                })?;
                Ok(Self::Generative(GenerativeClient::new(
                    config.generative_endpoint.clone(),
                    key,
                    timeout,
                )?))
            }
        }
    }

    pub fn backend(&self) -> IdentificationBackend {
        match self {
            IdentificationClient::Chat(_) => IdentificationBackend::Chat,
            IdentificationClient::Generative(_) => IdentificationBackend::Generative,
        }
    }

    /// Identify `filenames`, returning exactly one result per filename in order
    pub async fn identify(&self, platform_name: &str, filenames: &[String]) -> Vec<RomScanResult> {
        if filenames.is_empty() {
            return Vec::new();
        }

        let results = match self {
            IdentificationClient::Chat(client) => client.identify_batch(platform_name, filenames).await,
            IdentificationClient::Generative(client) => {
                client.identify_batch(platform_name, filenames).await
            }
        };

        let identified = results.iter().filter(|r| r.success).count();
        tracing::info!(
            backend = %self.backend(),
            platform = %platform_name,
            batch_size = filenames.len(),
            identified,
            "Identification batch finished"
        );
        results
    }
}
