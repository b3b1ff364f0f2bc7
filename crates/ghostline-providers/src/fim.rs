//! FIM provider trait and request model

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

/// Temperature used for all FIM requests. Completions must be near
/// deterministic so that the same context yields the same suggestion.
pub const FIM_TEMPERATURE: f32 = 0.01;

/// A single fill-in-the-middle completion request
///
/// `prompt` carries the rendered prefix side of the FIM template and `suffix`
/// the text after the cursor. `stop` lists the template's stop tokens; the
/// provider must terminate generation when any of them is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FimRequest {
    pub model: String,
    pub prompt: String,
    pub suffix: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: Vec<String>,
}

impl FimRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        suffix: impl Into<String>,
        max_tokens: u32,
        stop: Vec<String>,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            suffix: suffix.into(),
            max_tokens,
            temperature: FIM_TEMPERATURE,
            stop,
        }
    }
}

/// A model-serving backend capable of fill-in-the-middle completion
///
/// Implementations issue one non-streaming generation call per request.
/// Cancelling `cancel` while the call is in flight must resolve the call as
/// `Err(ProviderError::Cancelled)`, distinguishable from transport and API
/// failures. Providers never retry; retry policy belongs to the caller's
/// host, not to this crate.
#[async_trait]
pub trait FimProvider: Send + Sync {
    /// Perform one completion call and return the generated middle text
    async fn complete_fim(
        &self,
        request: &FimRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fim_request_defaults_temperature() {
        let request = FimRequest::new("codestral", "fn main() {", "}", 256, vec![]);
        assert_eq!(request.temperature, FIM_TEMPERATURE);
        assert_eq!(request.max_tokens, 256);
    }
}
