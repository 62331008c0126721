//! LLM edit clients.
//!
//! The controller only sees the [`EditClient`] trait: text in, text out.
//! Concrete implementations:
//! - **Gemini** (`GeminiClient`): Google `generateContent` REST API
//! - **Ollama** (`OllamaClient`): local models via `/api/generate`

pub mod gemini;
pub mod ollama;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{ProviderConfig, ProviderKind};
use crate::prompt::ReviewRequest;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

/// Failure reported by a provider call.
///
/// The controller treats every variant the same way; the split only helps
/// the caller word the message.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider API error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider blocked the request: {0}")]
    Blocked(String),

    #[error("provider returned no usable content")]
    Empty,
}

/// Stateless request/response collaborator.
#[async_trait]
pub trait EditClient: Send + Sync {
    /// Send one prompt, return the concatenated reply text.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Short advisory commentary on `content`. Never mutates anything.
    async fn review(&self, content: &str) -> Result<String, ProviderError> {
        let prompt = ReviewRequest::new(content).render();
        let reply = self.generate(&prompt).await?;
        Ok(reply.trim().to_string())
    }
}

/// Build the client selected by `config.kind`.
pub fn client_from_config(config: &ProviderConfig) -> Result<Box<dyn EditClient>, ProviderError> {
    let http = http_client(config.timeout_secs)?;
    let client: Box<dyn EditClient> = match config.kind {
        ProviderKind::Gemini => {
            // A missing key only fails the first provider call, so offline
            // commands (show, backup, restore) still work.
            let api_key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty());
            Box::new(GeminiClient::new(http, config.api_base(), api_key, config.clone()))
        }
        ProviderKind::Ollama => Box::new(OllamaClient::new(http, config.api_base(), config.clone())),
    };
    Ok(client)
}

fn http_client(timeout_secs: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::Transport(format!("build HTTP client: {e}")))
}

/// Turn a non-2xx response into [`ProviderError::Status`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}
