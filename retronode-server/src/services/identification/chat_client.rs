//! Chat-completion identification backend (GitHub Models)
//!
//! Sends a whole batch of filenames in one prompt and aligns the reply to
//! the batch by position.

use retronode_common::events::RomScanResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::fallback::{align_results, extract_json, fallback_batch};
use super::{IdentifyError, USER_AGENT};

const MODEL: &str = "openai/gpt-4.1";
const SYSTEM_PROMPT: &str =
    "You are an expert on retro games who can identify games from filenames.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for an OpenAI-compatible chat-completion endpoint
pub struct ChatClient {
    http_client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ChatClient {
    pub fn new(endpoint: String, token: String, timeout: Duration) -> Result<Self, IdentifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| IdentifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            token,
        })
    }

    /// Prompt listing every filename of the batch with its platform
    pub fn build_prompt(platform_name: &str, filenames: &[String]) -> String {
        let mut prompt = String::from(
            "You are the world's leading expert in identifying the name of a retro game from just the platform and rom name.\n\
             Below is a list of rom names. YOU MUST RETURN ONLY JSON.\n\
             The JSON should contain the full name of the game, a short description of the game, and a field called \"success\"\n\
             which is true or false denoting whether you succeeded in identifying that rom.\n\
             Return one entry per rom, in the same order as listed, with the fields \"name\", \"description\" and \"success\".\n",
        );
        for filename in filenames {
            prompt.push_str(&format!("PLATFORM: {}\nROM: {}\n", platform_name, filename));
        }
        prompt
    }

    /// Send one batch and return the raw reply text
    pub async fn complete(
        &self,
        platform_name: &str,
        filenames: &[String],
    ) -> Result<String, IdentifyError> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(platform_name, filenames),
                },
            ],
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1000,
        };

        tracing::debug!(
            platform = %platform_name,
            batch_size = filenames.len(),
            "Querying chat-completion backend"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| IdentifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentifyError::Api(status.as_u16(), body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| IdentifyError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| IdentifyError::Parse("Reply contained no choices".to_string()))
    }

    /// Identify a batch; never fails
    ///
    /// Any call or parse failure yields the fallback for every filename.
    pub async fn identify_batch(&self, platform_name: &str, filenames: &[String]) -> Vec<RomScanResult> {
        let reply = match self.complete(platform_name, filenames).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Chat identification failed, using fallback names");
                return fallback_batch(platform_name, filenames);
            }
        };

        match extract_json(&reply) {
            Some(value) => align_results(platform_name, filenames, &value),
            None => {
                tracing::warn!("No JSON found in chat reply, using fallback names");
                tracing::debug!(reply = %reply, "Raw chat reply");
                fallback_batch(platform_name, filenames)
            }
        }
    }
}
