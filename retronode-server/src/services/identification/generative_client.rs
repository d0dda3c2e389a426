//! Generative identification backend (Gemini `generateContent`)
//!
//! One request per filename. A failed item falls back on its own; the rest
//! of the batch is unaffected.

use retronode_common::events::RomScanResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::fallback::{complete_entry, extract_json, fallback_result};
use super::{IdentifyError, USER_AGENT};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Client for the Gemini generateContent endpoint
pub struct GenerativeClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GenerativeClient {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, IdentifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| IdentifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }

    pub fn build_prompt(platform_name: &str, filename: &str) -> String {
        format!(
            "You are the world's leading expert in identifying retro games.\n\
             I have a file named \"{filename}\" for the {platform_name} platform.\n\
             Please identify this game and provide the following information in JSON format:\n\
             - The proper title of the game\n\
             - A short description (1-2 sentences)\n\
             - Whether you're confident in your identification (true/false)\n\
             \n\
             Return ONLY valid JSON with the following structure:\n\
             {{\n  \"name\": \"Game Title\",\n  \"description\": \"Short description of the game\",\n  \"success\": true\n}}"
        )
    }

    /// Send one filename and return the reply text
    pub async fn generate(&self, platform_name: &str, filename: &str) -> Result<String, IdentifyError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(platform_name, filename),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 400,
            },
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| IdentifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentifyError::Api(status.as_u16(), body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| IdentifyError::Parse(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| IdentifyError::Parse("Reply contained no candidates".to_string()))
    }

    /// Identify one filename; never fails
    pub async fn identify_one(&self, platform_name: &str, filename: &str) -> RomScanResult {
        match self.generate(platform_name, filename).await {
            Ok(reply) => match extract_json(&reply) {
                Some(value) => complete_entry(platform_name, filename, Some(&value)),
                None => {
                    tracing::warn!(filename = %filename, "No JSON found in generative reply");
                    fallback_result(platform_name, filename)
                }
            },
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "Generative identification failed");
                fallback_result(platform_name, filename)
            }
        }
    }

    /// Identify a batch one filename at a time, in order
    pub async fn identify_batch(&self, platform_name: &str, filenames: &[String]) -> Vec<RomScanResult> {
        let mut results = Vec::with_capacity(filenames.len());
        for filename in filenames {
            results.push(self.identify_one(platform_name, filename).await);
        }
        results
    }
}
