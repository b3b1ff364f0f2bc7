//! Completion streaming with cancellation and filter application
//!
//! [`CompletionStreamer`] drives one generation call and threads its output
//! through the line filter pipeline under a single cancellation scope. The
//! scope is bidirectional: the caller's token aborts the provider call, and
//! any filter stage that halts cancels the same scope so the provider call is
//! released promptly.

use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use ghostline_providers::{FimProvider, FimRequest, ProviderError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::context::CompletionContext;
use crate::error::CompletionError;
use crate::stream::{apply_filter_pipeline, stream_lines, stream_with_newlines};

/// Orchestrates one filtered generation stream per completion request
pub struct CompletionStreamer {
    provider: Arc<dyn FimProvider>,
}

impl CompletionStreamer {
    pub fn new(provider: Arc<dyn FimProvider>) -> Self {
        Self { provider }
    }

    /// Stream a completion with all line filters applied
    ///
    /// Yields text fragments (lines and separating newlines). Cancellation —
    /// whether from `cancel` or from a filter stage — ends the stream
    /// silently. Any other provider failure is yielded as a single `Err`
    /// item. Once `cancel` is observed no further fragment is forwarded,
    /// even if the pipeline has more buffered.
    pub fn stream_with_filters(
        &self,
        cancel: CancellationToken,
        model: String,
        prompt: String,
        suffix: String,
        max_tokens: u32,
        stop_tokens: Vec<String>,
        ctx: &CompletionContext,
    ) -> BoxStream<'static, Result<String, CompletionError>> {
        let provider = Arc::clone(&self.provider);
        // Halt scope: cancelled by the caller's token or by any filter stage;
        // either way the provider call is aborted.
        let halt = cancel.child_token();
        let line_below_cursor = ctx.line_below_cursor().to_string();
        let line_comment = ctx.language.line_comment;

        Box::pin(stream! {
            let request = FimRequest::new(model, prompt, suffix, max_tokens, stop_tokens.clone());

            let raw = match provider.complete_fim(&request, &halt).await {
                Ok(text) => text,
                Err(ProviderError::Cancelled) => {
                    debug!("Generation cancelled, ending stream silently");
                    return;
                }
                Err(e) => {
                    warn!("Generation failed: {}", e);
                    yield Err(CompletionError::Generation(e));
                    return;
                }
            };

            let raw = truncate_at_stop_token(&raw, &stop_tokens).to_string();
            if raw.is_empty() {
                return;
            }

            let chunks: BoxStream<'static, String> =
                Box::pin(futures::stream::iter(vec![raw]));
            let lines = stream_lines(chunks);
            let filtered =
                apply_filter_pipeline(lines, line_below_cursor, line_comment, halt.clone());
            let mut fragments = stream_with_newlines(filtered);

            while let Some(fragment) = fragments.next().await {
                if cancel.is_cancelled() {
                    debug!("Caller cancelled, dropping remaining fragments");
                    return;
                }
                yield Ok(fragment);
            }
        })
    }
}

/// Truncate generated text at the earliest stop-token occurrence
///
/// The stop tokens are also sent with the request; this is the client-side
/// half of the contract for providers that echo them back.
fn truncate_at_stop_token<'a>(text: &'a str, stop_tokens: &[String]) -> &'a str {
    let cut = stop_tokens
        .iter()
        .filter_map(|token| text.find(token.as_str()))
        .min();
    match cut {
        Some(idx) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::language::Language;

    struct FixedProvider {
        text: String,
    }

    #[async_trait]
    impl FimProvider for FixedProvider {
        async fn complete_fim(
            &self,
            _request: &FimRequest,
            cancel: &CancellationToken,
        ) -> Result<String, ProviderError> {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            Ok(self.text.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl FimProvider for FailingProvider {
        async fn complete_fim(
            &self,
            _request: &FimRequest,
            _cancel: &CancellationToken,
        ) -> Result<String, ProviderError> {
            Err(ProviderError::NetworkError("connection refused".to_string()))
        }
    }

    fn test_context() -> CompletionContext {
        CompletionContext::build(
            "fn main() {\n    \n}\n".to_string(),
            16,
            Language::from_id("rust"),
            false,
            "codestral".to_string(),
        )
        .unwrap()
    }

    fn streamer_for(text: &str) -> CompletionStreamer {
        CompletionStreamer::new(Arc::new(FixedProvider {
            text: text.to_string(),
        }))
    }

    async fn collect_text(
        stream: BoxStream<'static, Result<String, CompletionError>>,
    ) -> Result<String, CompletionError> {
        let mut out = String::new();
        let mut stream = stream;
        while let Some(item) = stream.next().await {
            out.push_str(&item?);
        }
        Ok(out)
    }

    #[test]
    fn test_truncate_at_stop_token() {
        let stops = vec!["<|end|>".to_string(), "<stop>".to_string()];
        assert_eq!(truncate_at_stop_token("abc<stop>def<|end|>", &stops), "abc");
        assert_eq!(truncate_at_stop_token("clean output", &stops), "clean output");
    }

    #[tokio::test]
    async fn test_stream_passes_filtered_text() {
        let streamer = streamer_for("let x = compute();\nlet y = x + 1;");
        let ctx = test_context();
        let stream = streamer.stream_with_filters(
            CancellationToken::new(),
            "codestral".to_string(),
            ctx.pruned_prefix.clone(),
            ctx.pruned_suffix.clone(),
            256,
            vec![],
            &ctx,
        );
        let text = collect_text(stream).await.unwrap();
        assert_eq!(text, "let x = compute();\nlet y = x + 1;");
    }

    #[tokio::test]
    async fn test_stream_ends_silently_when_precancelled() {
        let streamer = streamer_for("anything");
        let ctx = test_context();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stream = streamer.stream_with_filters(
            cancel,
            "codestral".to_string(),
            String::new(),
            String::new(),
            256,
            vec![],
            &ctx,
        );
        let text = collect_text(stream).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_stream_propagates_generation_failure() {
        let streamer = CompletionStreamer::new(Arc::new(FailingProvider));
        let ctx = test_context();
        let stream = streamer.stream_with_filters(
            CancellationToken::new(),
            "codestral".to_string(),
            String::new(),
            String::new(),
            256,
            vec![],
            &ctx,
        );
        let result = collect_text(stream).await;
        assert!(matches!(result, Err(CompletionError::Generation(_))));
    }

    #[tokio::test]
    async fn test_stream_applies_stop_tokens_client_side() {
        let streamer = streamer_for("visible<|endoftext|>hidden");
        let ctx = test_context();
        let stream = streamer.stream_with_filters(
            CancellationToken::new(),
            "codestral".to_string(),
            String::new(),
            String::new(),
            256,
            vec!["<|endoftext|>".to_string()],
            &ctx,
        );
        let text = collect_text(stream).await.unwrap();
        assert_eq!(text, "visible");
    }
}
