//! Google Gemini provider.
//!
//! Implements [`EditClient`] over the `generateContent` REST endpoint. One
//! user turn per call; no conversation history is ever sent.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EditClient, ProviderError, check_status};
use crate::config::ProviderConfig;

/// Gemini text-generation client.
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    config: ProviderConfig,
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(
        client: Client,
        api_base: String,
        api_key: Option<String>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            client,
            api_base,
            api_key,
            config,
        }
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    fn endpoint(&self) -> String {
        let model = self.config.model();
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/v1beta/{model}:generateContent", self.api_base)
    }

    /// Join every text part of the first candidate.
    fn parse_response(resp: GenerateContentResponse) -> Result<String, ProviderError> {
        let Some(candidate) = resp.candidates.into_iter().next() else {
            let reason = resp
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(ProviderError::Blocked)
                .unwrap_or(ProviderError::Empty);
            return Err(reason);
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        if parts.is_empty() {
            return Err(match candidate.finish_reason {
                Some(reason) if reason != "STOP" => ProviderError::Blocked(reason),
                _ => ProviderError::Empty,
            });
        }

        Ok(parts.into_iter().filter_map(|p| p.text).collect())
    }
}

#[async_trait]
impl EditClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingApiKey(self.config.api_key_env.clone()))?;
        let url = self.endpoint();
        debug!(%url, prompt_len = prompt.len(), "sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("Gemini HTTP request failed: {e}")))?;

        let body: GenerateContentResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("Gemini response: {e}")))?;

        Self::parse_response(body)
    }
}
