//! Chat-completions API client.
//!
//! Thin client for an OpenAI-style `/chat/completions` endpoint: builds the
//! request from a system/user message pair, authenticates with a bearer
//! token, and extracts the first choice's content from the response.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::http_client::HttpClient;

/// A single message in a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for the chat-completions endpoint.
///
/// Holds the transport behind the [`HttpClient`] trait so tests can inject
/// canned responses.
pub struct ChatClient {
    http: Arc<dyn HttpClient>,
    api_key: String,
    api_url: String,
    model: String,
}

impl ChatClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        api_key: String,
        api_url: String,
        model: String,
    ) -> Self {
        Self {
            http,
            api_key,
            api_url,
            model,
        }
    }

    /// Builds a client from loaded configuration, requiring an API key.
    pub fn from_config(http: Arc<dyn HttpClient>, config: &Config) -> Result<Self> {
        let api_key = config.get_api_key().cloned().ok_or_else(|| {
            anyhow!(
                "No OpenAI API key found. Please set it using one of these methods:

1. Set API key in config:
   fam --set-api-key sk-your-key-here

2. Set environment variable:
   export OPENAI_API_KEY=sk-your-key-here

3. Check current config:
   fam --config

Get your API key from: https://platform.openai.com/api-keys"
            )
        })?;

        Ok(Self::new(
            http,
            api_key,
            config.api_url.clone(),
            config.model.clone(),
        ))
    }

    /// Sends one system/user message pair and returns the reply text.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
        };

        let url = format!(
            "{}/chat/completions",
            self.api_url.trim_end_matches('/')
        );
        let auth = format!("Bearer {}", self.api_key);
        let body = serde_json::to_value(&request)?;

        debug!("Requesting completion from {} (model: {})", url, self.model);

        let response_text = self
            .http
            .post_json(
                &url,
                &[
                    ("Authorization", auth.as_str()),
                    ("Content-Type", "application/json"),
                ],
                &body,
            )
            .await?;

        debug!("API response: {}", response_text);

        let response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            anyhow!(
                "Failed to parse API response: {}\nRaw response: {}",
                e,
                response_text
            )
        })?;

        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("API response contained no choices"))
    }
}
