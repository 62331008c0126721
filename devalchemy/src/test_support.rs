//! Test-only [`EditClient`] that replays scripted replies.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::provider::{EditClient, ProviderError};

/// Replays queued replies in order and records every prompt it receives.
///
/// An empty queue answers with [`ProviderError::Empty`].
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every `generate` call (for in-flight tests).
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(Ok(reply.to_string()));
    }

    pub fn push_error(&self, err: ProviderError) {
        self.replies.lock().expect("replies lock").push_back(Err(err));
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl EditClient for ScriptedClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().expect("replies lock").pop_front();
        next.unwrap_or(Err(ProviderError::Empty))
    }
}
