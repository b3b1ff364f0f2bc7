//! Inline completion engine orchestration
//!
//! Ties the pieces together for one request: prefilter, context snapshot,
//! multiline classification, template selection, the filtered generation
//! stream, postprocessing, and single-line reconciliation. Each request owns
//! its context, pipeline state, and cancellation scope exclusively; nothing
//! is shared across requests.

use std::sync::Arc;

use futures::StreamExt;
use ghostline_providers::FimProvider;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::CompletionConfig;
use crate::context::CompletionContext;
use crate::error::CompletionResult;
use crate::language::Language;
use crate::multiline::should_complete_multiline;
use crate::postprocess::postprocess_completion;
use crate::prefilter::should_skip_completion;
use crate::reconcile::reconcile_single_line;
use crate::streamer::CompletionStreamer;
use crate::template::FimTemplate;
use crate::types::{Completion, CompletionRequest};

/// The inline completion engine
///
/// Holds the provider and configuration; everything per-request lives in the
/// request's own processing chain.
pub struct InlineCompletionEngine {
    provider: Arc<dyn FimProvider>,
    config: CompletionConfig,
}

impl InlineCompletionEngine {
    pub fn new(provider: Arc<dyn FimProvider>, config: CompletionConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Produce at most one completion for the request
    ///
    /// Returns `Ok(None)` when nothing should be shown: the engine is
    /// disabled, the document is prefiltered, the request was cancelled, or
    /// every candidate was rejected. Only a genuine generation failure is an
    /// `Err`.
    pub async fn complete(
        &self,
        request: CompletionRequest,
        cancel: CancellationToken,
    ) -> CompletionResult<Option<Completion>> {
        if !self.config.enabled {
            return Ok(None);
        }

        if should_skip_completion(request.path.as_deref(), &request.document) {
            return Ok(None);
        }

        let language = Language::from_id(&request.language_id);
        let ctx = CompletionContext::build(
            request.document,
            request.cursor_offset,
            language,
            request.selected_completion,
            request.model,
        )?;

        let multiline = should_complete_multiline(&ctx, request.multiline);
        let template = FimTemplate::for_model(&ctx.model);

        let mut stop_tokens: Vec<String> =
            template.stop_tokens.iter().map(|s| s.to_string()).collect();
        if !multiline {
            // Single-line shape: generation ends at the first newline.
            stop_tokens.push("\n".to_string());
        }

        let prompt = template.render(&ctx.pruned_prefix, &ctx.pruned_suffix);
        debug!(
            model = %ctx.model,
            multiline,
            prompt_chars = prompt.len(),
            "Issuing completion request"
        );

        let streamer = CompletionStreamer::new(Arc::clone(&self.provider));
        let mut stream = streamer.stream_with_filters(
            cancel,
            ctx.model.clone(),
            prompt,
            ctx.pruned_suffix.clone(),
            request.max_tokens,
            stop_tokens,
            &ctx,
        );

        let mut completion = String::new();
        while let Some(fragment) = stream.next().await {
            completion.push_str(&fragment?);
        }

        let Some(processed) = postprocess_completion(&completion, &ctx.full_prefix) else {
            return Ok(None);
        };

        if multiline {
            return Ok(Some(Completion::insertion(processed)));
        }

        let first_line = processed.split('\n').next().unwrap_or("");
        if first_line.trim().is_empty() {
            return Ok(None);
        }

        // Range offsets are relative to the cursor.
        let result = reconcile_single_line(first_line, ctx.current_line_suffix(), 0);
        debug!(text_chars = result.text.len(), has_range = result.range.is_some(), "Completion accepted");
        Ok(Some(result))
    }
}
