//! Ghostline completion engine
//!
//! Produces a single best-effort inline completion per request using a
//! fill-in-the-middle (FIM) model, filtered so the displayed suggestion is
//! non-repetitive, well-formed, and correctly anchored against text already
//! on the line.
//!
//! # Architecture
//!
//! One request flows through a fixed chain:
//!
//! 1. **Prefilter**: skip documents where completion makes no sense
//! 2. **Context Builder**: snapshot the document, prune prefix/suffix to
//!    prompt budgets
//! 3. **Multiline Classifier**: decide the request shape before generation
//! 4. **Template Selector**: map the model id to a FIM prompt format and
//!    stop tokens
//! 5. **Completion Streamer**: drive the generation call under a shared
//!    cancellation scope and thread its output through the line filters
//! 6. **Postprocessor**: whole-completion rejection and cleanup
//! 7. **Single-Line Reconciler**: merge a single-line suggestion with the
//!    text already after the cursor
//!
//! # Cancellation
//!
//! Cancellation is cooperative and bidirectional. The caller's
//! [`tokio_util::sync::CancellationToken`] aborts the provider call; any
//! filter stage that detects a stop condition cancels the same scope so the
//! provider call is released without waiting for the stream to drain.
//! Cancellation is never an error: a cancelled request simply produces no
//! suggestion.
//!
//! # Example
//!
//! ```ignore
//! use ghostline_completion::{CompletionConfig, CompletionRequest, InlineCompletionEngine, MultilineMode};
//! use ghostline_providers::OpenAiCompatProvider;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let provider = Arc::new(OpenAiCompatProvider::new("http://localhost:8000".into())?);
//! let engine = InlineCompletionEngine::new(provider, CompletionConfig::default());
//!
//! let request = CompletionRequest {
//!     document: source_text,
//!     cursor_offset,
//!     language_id: "rust".into(),
//!     path: Some("src/main.rs".into()),
//!     selected_completion: false,
//!     model: "qwen2.5-coder".into(),
//!     multiline: MultilineMode::Auto,
//!     max_tokens: 256,
//! };
//!
//! match engine.complete(request, CancellationToken::new()).await? {
//!     Some(completion) => display(completion.text, completion.range),
//!     None => {} // nothing to show
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod language;
pub mod multiline;
pub mod postprocess;
pub mod prefilter;
pub mod reconcile;
pub mod stream;
pub mod streamer;
pub mod template;
pub mod types;

pub use config::CompletionConfig;
pub use context::{CompletionContext, MAX_PREFIX_CHARS, MAX_SUFFIX_CHARS};
pub use engine::InlineCompletionEngine;
pub use error::{CompletionError, CompletionResult};
pub use language::Language;
pub use multiline::should_complete_multiline;
pub use postprocess::postprocess_completion;
pub use prefilter::should_skip_completion;
pub use reconcile::reconcile_single_line;
pub use streamer::CompletionStreamer;
pub use template::FimTemplate;
pub use types::{Completion, CompletionRequest, MultilineMode, ReplacementRange};
