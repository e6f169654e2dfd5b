use async_trait::async_trait;
use reqwest::Client;

use crate::error::ProviderError;
use crate::models::{ChatRequest, ChatResponse};

/// Generates a chat completion for a prepared prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChat {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiChat {
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiChat {
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let mut req = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(ProviderError::Status { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}
