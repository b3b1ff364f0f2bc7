//! Completion configuration
//!
//! Owned by the host; the engine only consumes it. Loadable from JSON with
//! validated defaults.

use serde::{Deserialize, Serialize};

use crate::error::{CompletionError, CompletionResult};
use crate::types::MultilineMode;

const DEFAULT_MAX_TOKENS: u32 = 256;
const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Host-supplied configuration for the completion engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Master switch; a disabled engine answers every request with nothing
    pub enabled: bool,
    /// Debounce interval between keystroke and request, in milliseconds.
    /// Enforced by the host's scheduler, carried here so one object
    /// configures the feature.
    pub debounce_ms: u64,
    /// Base URL of the completion endpoint
    pub provider_url: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Token budget per generation call
    pub max_tokens: u32,
    /// Multiline generation mode
    pub multiline: MultilineMode,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            provider_url: "http://localhost:11434".to_string(),
            model: "qwen2.5-coder".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            multiline: MultilineMode::Auto,
        }
    }
}

impl CompletionConfig {
    /// Load configuration from a JSON string, validating the result
    pub fn from_json(content: &str) -> CompletionResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints
    pub fn validate(&self) -> CompletionResult<()> {
        if self.model.is_empty() {
            return Err(CompletionError::ConfigError(
                "model must not be empty".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(CompletionError::ConfigError(
                "max_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
