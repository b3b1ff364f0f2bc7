//! Request and result types for inline completion

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Multiline completion mode
///
/// - `Always`: always generate multiline completions
/// - `Never`: never generate multiline completions
/// - `Auto`: decide based on context (default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MultilineMode {
    Always,
    Never,
    #[default]
    Auto,
}

/// An inline completion request from the editor host
///
/// The host supplies a document snapshot and a cursor byte offset; the engine
/// never reads the document again after this point.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full document text at request time
    pub document: String,
    /// Cursor position as a byte offset into `document` (char boundary)
    pub cursor_offset: usize,
    /// Editor language identifier (e.g. "rust", "typescript")
    pub language_id: String,
    /// File path, if the document is backed by a file
    pub path: Option<PathBuf>,
    /// Whether the editor already has an intellisense suggestion selected
    pub selected_completion: bool,
    /// Target model identifier, used for FIM template dispatch
    pub model: String,
    /// Multiline generation mode
    pub multiline: MultilineMode,
    /// Token budget for the generation call
    pub max_tokens: u32,
}

/// Range of existing text the completion subsumes, as offsets relative to the
/// cursor (`start` is always 0 in practice; `end` covers the trailing text the
/// model repeated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRange {
    pub start: usize,
    pub end: usize,
}

/// A completion accepted for display
///
/// `range`, when present, tells the host which existing text the insertion
/// replaces; absent means pure insertion at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub range: Option<ReplacementRange>,
}

impl Completion {
    /// A pure insertion with no replacement range
    pub fn insertion(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            range: None,
        }
    }

    /// An insertion replacing existing text from the cursor
    pub fn replacing(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            range: Some(ReplacementRange { start, end }),
        }
    }
}
