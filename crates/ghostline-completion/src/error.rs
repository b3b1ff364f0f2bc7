//! Error types for the completion engine

use ghostline_providers::ProviderError;
use thiserror::Error;

/// Result alias used throughout the completion engine
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Errors that can occur while producing a completion
///
/// Cancellation and filter rejections are not represented here: both are
/// ordinary outcomes (`Ok(None)` at the engine boundary). Only genuine
/// failures become errors.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum CompletionError {
    /// The generation call failed for a reason other than cancellation
    #[error("Generation failed: {0}")]
    Generation(ProviderError),

    /// Invalid request data (e.g. cursor offset outside the document)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<ProviderError> for CompletionError {
    fn from(err: ProviderError) -> Self {
        CompletionError::Generation(err)
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::ConfigError(err.to_string())
    }
}
