//! HTTP transport for the chat-completions API.
//!
//! The API client talks to the network through the [`HttpClient`] trait, so
//! tests can swap in canned transports without touching a socket.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Seconds before an in-flight completion request is abandoned.
const REQUEST_TIMEOUT_SECS: u64 = 90;

/// Transport-level POST with a JSON body.
///
/// Implementations report transport failures and non-success status codes as
/// errors and hand the raw response text back; interpreting the body is the
/// caller's job.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String>;
}

/// Production transport backed by a pooled reqwest client.
///
/// Completion requests can take a while on long prompts, so the timeout is
/// generous.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String> {
        let mut request = self.client.post(url);
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            bail!("API request failed with status {}: {}", status, text);
        }

        Ok(text)
    }
}
