//! Chat completion client for Flux Agent.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::Settings;
use crate::error::{FluxError, Result};

/// Reply used when the completion carries no text.
pub const EMPTY_REPLY: &str = "OpenAI response did not include content.";

const TEMPERATURE: f64 = 0.3;
const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// API key from settings, else `OPENAI_API_KEY`.
pub fn resolve_api_key(settings: &Settings) -> Result<String> {
    if let Some(key) = settings.openai_api_key() {
        return Ok(key.to_string());
    }
    std::env::var(OPENAI_KEY_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(FluxError::MissingApiKey)
}

/// Blocking client for an OpenAI-compatible `/v1/chat/completions`.
pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        Self::with_timeout(base_url, model, api_key, Duration::from_secs(60))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fluxloop-env/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FluxError::ChatCompletion {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Client configured from settings and the resolved API key.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = resolve_api_key(settings)?;
        Self::new(settings.openai_base_url(), settings.openai_model(), api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Send `messages` and return the first choice's text.
    pub fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": TEMPERATURE,
        });

        tracing::debug!("POST {} ({} messages)", self.endpoint(), messages.len());
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| FluxError::ChatCompletion {
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| FluxError::ChatCompletion {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FluxError::ChatCompletion {
                message: format!("{} {}", status.as_u16(), text.trim()),
            });
        }

        let payload: Value = serde_json::from_str(&text).map_err(|e| {
            FluxError::ChatCompletion {
                message: format!("invalid response body: {e}"),
            }
        })?;
        Ok(extract_content(&payload))
    }
}

/// `choices[0].message.content`, then `choices[0].text`, then [`EMPTY_REPLY`].
fn extract_content(payload: &Value) -> String {
    let choice = &payload["choices"][0];
    choice["message"]["content"]
        .as_str()
        .or_else(|| choice["text"].as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}
