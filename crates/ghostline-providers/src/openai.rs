//! OpenAI-compatible FIM provider
//!
//! Talks to any server exposing the `/v1/completions` endpoint with `prompt`
//! and `suffix` fields (vLLM, Ollama's OpenAI shim, llama.cpp server, and the
//! hosted OpenAI-compatible gateways all qualify).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::ProviderError;
use crate::fim::{FimProvider, FimRequest};

/// FIM provider backed by an OpenAI-compatible completions endpoint
pub struct OpenAiCompatProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    /// Create a provider against the given base URL (e.g. `http://localhost:8000`)
    pub fn new(base_url: String) -> Result<Self, ProviderError> {
        if base_url.is_empty() {
            return Err(ProviderError::ConfigError(
                "Completion endpoint base URL is required".to_string(),
            ));
        }

        Ok(Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Create a provider with an API key sent as a bearer token
    pub fn with_api_key(base_url: String, api_key: String) -> Result<Self, ProviderError> {
        let mut provider = Self::new(base_url)?;
        if api_key.is_empty() {
            return Err(ProviderError::ConfigError(
                "API key must not be empty when provided".to_string(),
            ));
        }
        provider.api_key = Some(api_key);
        Ok(provider)
    }

    async fn send_request(&self, request: &FimRequest) -> Result<String, ProviderError> {
        let body = CompletionsRequest {
            model: &request.model,
            prompt: &request.prompt,
            suffix: &request.suffix,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: &request.stop,
            stream: false,
        };

        debug!(
            model = %request.model,
            prompt_chars = request.prompt.len(),
            suffix_chars = request.suffix.len(),
            max_tokens = request.max_tokens,
            "Sending FIM completion request"
        );

        let mut builder = self
            .client
            .post(format!("{}/v1/completions", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            error!("FIM completion request failed: {}", e);
            ProviderError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Completion API error ({}): {}", status, error_text);

            return match status.as_u16() {
                401 => Err(ProviderError::AuthError),
                429 => Err(ProviderError::RateLimited(60)),
                _ => Err(ProviderError::ProviderError(format!(
                    "Completion API error: {}",
                    status
                ))),
            };
        }

        let completions: CompletionsResponse = response.json().await?;
        let text = completions
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default();

        debug!(completion_chars = text.len(), "FIM completion received");
        Ok(text)
    }
}

#[async_trait]
impl FimProvider for OpenAiCompatProvider {
    async fn complete_fim(
        &self,
        request: &FimRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        tokio::select! {
            // Cancellation wins over an already-completed response.
            biased;
            _ = cancel.cancelled() => {
                debug!("FIM completion request cancelled");
                Err(ProviderError::Cancelled)
            }
            result = self.send_request(request) => result,
        }
    }
}

#[derive(Serialize)]
struct CompletionsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    suffix: &'a str,
    max_tokens: u32,
    temperature: f32,
    stop: &'a [String],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionsResponse {
    #[serde(default)]
    choices: Vec<CompletionsChoice>,
}

#[derive(Deserialize)]
struct CompletionsChoice {
    #[serde(default)]
    text: String,
}
