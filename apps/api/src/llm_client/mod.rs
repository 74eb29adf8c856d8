/// LLM Client — the single point of entry for all completion-API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// One attempt per call, no retry, no backoff: a failed call aborts the
/// current evaluation and the caller reports it. The transport timeout is
/// whatever the HTTP client is built with.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Tuning parameters for a completion call. Two requests share a cached
/// client only while their tuples compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    /// Sampling temperature in [0, 1]. Validated at the request boundary.
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The completion seam between the evaluation pipeline and the concrete
/// client. Tests substitute stub backends; production uses `LlmClient`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

/// Anthropic Messages API client carrying one settings tuple.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    settings: ModelSettings,
}

impl LlmClient {
    pub fn new(api_key: String, settings: ModelSettings) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            settings,
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Makes a single call to the Messages API, returning the full response
    /// object. Any non-success status is returned as `LlmError::Api` with the
    /// server's message when it can be parsed out of the body.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: MAX_TOKENS,
            temperature: self.settings.temperature,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(text.to_string())
    }
}

/// Holds the client across requests. The client is rebuilt only when the
/// requested settings tuple differs from the cached one, checked by explicit
/// equality. Repeated evaluations with the same model and temperature reuse
/// one client and its connection pool.
pub struct ClientCache {
    api_key: String,
    current: Mutex<Arc<LlmClient>>,
}

impl ClientCache {
    pub fn new(api_key: String, settings: ModelSettings) -> Self {
        let current = Arc::new(LlmClient::new(api_key.clone(), settings));
        Self {
            api_key,
            current: Mutex::new(current),
        }
    }

    /// Returns a client configured with `settings`, rebuilding the cached one
    /// only on a settings change.
    pub fn client_for(&self, settings: ModelSettings) -> Arc<LlmClient> {
        let mut current = self.current.lock().expect("client cache lock poisoned");
        if *current.settings() != settings {
            info!(
                "Rebuilding LLM client (model: {}, temperature: {})",
                settings.model, settings.temperature
            );
            *current = Arc::new(LlmClient::new(self.api_key.clone(), settings));
        }
        Arc::clone(&current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(model: &str, temperature: f32) -> ModelSettings {
        ModelSettings {
            model: model.to_string(),
            temperature,
        }
    }

    #[test]
    fn test_cache_reuses_client_for_equal_settings() {
        let cache = ClientCache::new("test-key".to_string(), settings(DEFAULT_MODEL, 0.7));
        let first = cache.client_for(settings(DEFAULT_MODEL, 0.7));
        let second = cache.client_for(settings(DEFAULT_MODEL, 0.7));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_rebuilds_on_model_change() {
        let cache = ClientCache::new("test-key".to_string(), settings(DEFAULT_MODEL, 0.7));
        let first = cache.client_for(settings(DEFAULT_MODEL, 0.7));
        let second = cache.client_for(settings("claude-3-5-haiku-latest", 0.7));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.settings().model, "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_cache_rebuilds_on_temperature_change() {
        let cache = ClientCache::new("test-key".to_string(), settings(DEFAULT_MODEL, 0.7));
        let first = cache.client_for(settings(DEFAULT_MODEL, 0.7));
        let second = cache.client_for(settings(DEFAULT_MODEL, 0.2));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.settings().temperature, 0.2);
    }

    #[test]
    fn test_response_text_takes_first_text_block() {
        let response = LlmResponse {
            content: vec![
                ContentBlock {
                    block_type: "thinking".to_string(),
                    text: None,
                },
                ContentBlock {
                    block_type: "text".to_string(),
                    text: Some("Nota geral: 7.5".to_string()),
                },
            ],
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
            },
        };
        assert_eq!(response.text(), Some("Nota geral: 7.5"));
    }
}
