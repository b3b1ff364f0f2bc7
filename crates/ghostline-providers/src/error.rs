//! Error types for the providers module

use thiserror::Error;

/// Errors that can occur when calling a completion provider
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ProviderError {
    /// The request was cancelled before a response arrived. Not a failure:
    /// callers are expected to end their work silently on this variant.
    #[error("Request cancelled")]
    Cancelled,

    /// Authentication failed (never includes key details)
    #[error("Authentication failed")]
    AuthError,

    /// Rate limited by provider
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Network error occurred
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generic provider error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ProviderError {
    /// Whether this outcome represents a clean cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::ProviderError("Request timeout".to_string())
        } else if err.is_connect() {
            ProviderError::NetworkError(err.to_string())
        } else {
            ProviderError::ProviderError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_not_a_failure() {
        assert!(ProviderError::Cancelled.is_cancelled());
        assert!(!ProviderError::AuthError.is_cancelled());
        assert!(!ProviderError::NetworkError("down".to_string()).is_cancelled());
    }

    #[test]
    fn test_serde_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let converted: ProviderError = err.into();
        assert!(matches!(converted, ProviderError::SerializationError(_)));
    }
}
