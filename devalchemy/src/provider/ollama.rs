//! Ollama local LLM provider.
//!
//! Implements [`EditClient`] for local models served by Ollama, using the
//! single-shot `/api/generate` endpoint with streaming disabled.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EditClient, ProviderError, check_status};
use crate::config::ProviderConfig;

/// Ollama text-generation client.
pub struct OllamaClient {
    client: Client,
    api_base: String,
    config: ProviderConfig,
}

/// Request body for Ollama's `/api/generate` endpoint.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    options: OllamaOptions,
    /// Disable streaming to get a single response object.
    stream: bool,
}

/// Generation options for Ollama.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
}

/// Response from `/api/generate` (non-streaming).
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(client: Client, api_base: String, config: ProviderConfig) -> Self {
        Self {
            client,
            api_base,
            config,
        }
    }

    fn build_request(&self, prompt: &str) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: self.config.model().to_string(),
            prompt: prompt.to_string(),
            options: OllamaOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                num_predict: self.config.max_output_tokens,
            },
            stream: false,
        }
    }
}

#[async_trait]
impl EditClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.api_base);
        debug!(%url, model = %self.config.model(), prompt_len = prompt.len(), "sending Ollama request");

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("Ollama HTTP request failed: {e}")))?;

        let body: OllamaGenerateResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("Ollama response: {e}")))?;

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ollama_config() -> ProviderConfig {
        ProviderConfig {
            kind: ProviderKind::Ollama,
            model: Some("llama3".to_string()),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_request_body_has_stream_false() {
        let client = OllamaClient::new(Client::new(), "http://unused".to_string(), ollama_config());
        let json = serde_json::to_value(client.build_request("hi")).unwrap();

        assert_eq!(json["stream"], false);
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["prompt"], "hi");
        assert_eq!(json["options"]["num_predict"], 50_000);
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "response": "<p>hi</p>",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(Client::new(), server.uri(), ollama_config());
        assert_eq!(client.generate("x").await.unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(Client::new(), server.uri(), ollama_config());
        match client.generate("x").await {
            Err(ProviderError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client =
            OllamaClient::new(Client::new(), "http://127.0.0.1:1".to_string(), ollama_config());
        assert!(matches!(
            client.generate("x").await,
            Err(ProviderError::Transport(_))
        ));
    }
}
