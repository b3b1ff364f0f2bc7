//! Ghostline provider layer
//!
//! Abstracts the model-serving backend behind the [`FimProvider`] trait so the
//! completion engine never depends on a concrete API. One implementation ships
//! here: [`OpenAiCompatProvider`], which targets any OpenAI-compatible
//! `/v1/completions` endpoint with fill-in-the-middle support.
//!
//! Cancellation is first-class: every call takes a
//! [`tokio_util::sync::CancellationToken`] and resolves as
//! [`ProviderError::Cancelled`] when it fires, so callers can tell a
//! superseded request apart from a real failure.

pub mod error;
pub mod fim;
pub mod openai;

pub use error::ProviderError;
pub use fim::{FimProvider, FimRequest, FIM_TEMPERATURE};
pub use openai::OpenAiCompatProvider;
