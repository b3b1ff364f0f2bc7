//! Per-request completion context and prefix/suffix pruning
//!
//! A [`CompletionContext`] is an immutable snapshot taken once per request.
//! The engine never consults the live document after the snapshot exists, so
//! filters and the reconciler all see a consistent view even while the user
//! keeps typing.

use crate::error::{CompletionError, CompletionResult};
use crate::language::Language;

/// Character budget for the prefix sent to the model (~2000 tokens)
pub const MAX_PREFIX_CHARS: usize = 8000;
/// Character budget for the suffix sent to the model (~500 tokens)
pub const MAX_SUFFIX_CHARS: usize = 2000;

/// Immutable snapshot of everything a completion request needs
#[derive(Debug, Clone)]
pub struct CompletionContext {
    /// Full document text at snapshot time
    pub document: String,
    /// Text before the cursor, unpruned
    pub full_prefix: String,
    /// Text after the cursor, unpruned
    pub full_suffix: String,
    /// Prefix bounded for prompting
    pub pruned_prefix: String,
    /// Suffix bounded for prompting
    pub pruned_suffix: String,
    /// Cursor line (zero-based)
    pub line: usize,
    /// Cursor column in characters (zero-based)
    pub column: usize,
    /// Language metadata for the document
    pub language: Language,
    /// Whether the editor already has an inline suggestion selected
    pub selected_completion: bool,
    /// Target model identifier
    pub model: String,
}

impl CompletionContext {
    /// Build a context snapshot for a cursor offset into `document`
    ///
    /// `cursor_offset` is a byte offset and must lie on a char boundary.
    pub fn build(
        document: String,
        cursor_offset: usize,
        language: Language,
        selected_completion: bool,
        model: String,
    ) -> CompletionResult<Self> {
        if cursor_offset > document.len() || !document.is_char_boundary(cursor_offset) {
            return Err(CompletionError::InvalidRequest(format!(
                "cursor offset {} is not a valid position in a {}-byte document",
                cursor_offset,
                document.len()
            )));
        }

        let full_prefix = document[..cursor_offset].to_string();
        let full_suffix = document[cursor_offset..].to_string();

        let pruned_prefix = prune_prefix(&full_prefix, MAX_PREFIX_CHARS).to_string();
        let pruned_suffix = prune_suffix(&full_suffix, MAX_SUFFIX_CHARS).to_string();

        let line = full_prefix.matches('\n').count();
        let column = full_prefix
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0);

        Ok(Self {
            document,
            full_prefix,
            full_suffix,
            pruned_prefix,
            pruned_suffix,
            line,
            column,
            language,
            selected_completion,
            model,
        })
    }

    /// The cursor's line up to the cursor
    pub fn current_line_prefix(&self) -> &str {
        self.full_prefix.rsplit('\n').next().unwrap_or("")
    }

    /// The cursor's line from the cursor to the end of the line
    pub fn current_line_suffix(&self) -> &str {
        self.full_suffix.split('\n').next().unwrap_or("")
    }

    /// The first non-blank line below the cursor's line, or `""` if none
    ///
    /// Used by the below-cursor halt filter to stop the model from
    /// regenerating code that already exists.
    pub fn line_below_cursor(&self) -> &str {
        self.full_suffix
            .split('\n')
            .skip(1)
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
    }
}

/// Bound a prefix to `max_chars` characters, keeping its tail
///
/// If the first newline inside the kept region falls before the region's
/// midpoint, the partial line above it is dropped too, so the prompt never
/// opens mid-line. Pruning within budget is the identity.
pub fn prune_prefix(prefix: &str, max_chars: usize) -> &str {
    let char_count = prefix.chars().count();
    if char_count <= max_chars {
        return prefix;
    }

    let drop = char_count - max_chars;
    let start = prefix
        .char_indices()
        .nth(drop)
        .map(|(i, _)| i)
        .unwrap_or(prefix.len());
    let mut pruned = &prefix[start..];

    if let Some(newline) = pruned.find('\n') {
        if newline > 0 && newline < pruned.len() / 2 {
            pruned = &pruned[newline + 1..];
        }
    }

    pruned
}

/// Bound a suffix to `max_chars` characters, keeping its head
///
/// If the last newline in the kept region lies past the midpoint, trailing
/// text after it is cut so the prompt never ends mid-line.
pub fn prune_suffix(suffix: &str, max_chars: usize) -> &str {
    let char_count = suffix.chars().count();
    if char_count <= max_chars {
        return suffix;
    }

    let end = suffix
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(suffix.len());
    let mut pruned = &suffix[..end];

    if let Some(newline) = pruned.rfind('\n') {
        if newline > pruned.len() / 2 {
            pruned = &pruned[..newline];
        }
    }

    pruned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_for(document: &str, offset: usize) -> CompletionContext {
        CompletionContext::build(
            document.to_string(),
            offset,
            Language::from_id("rust"),
            false,
            "codestral".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_prefix_suffix_split() {
        let ctx = context_for("fn main() {\n    let x\n}\n", 21);
        assert_eq!(ctx.full_prefix, "fn main() {\n    let x");
        assert_eq!(ctx.full_suffix, "\n}\n");
        assert_eq!(ctx.line, 1);
        assert_eq!(ctx.column, 9);
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let result = CompletionContext::build(
            "short".to_string(),
            99,
            Language::from_id("rust"),
            false,
            "codestral".to_string(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_current_line_helpers() {
        let ctx = context_for("let a = 1;\nfoo(bar);\nlet b = 2;\n", 15);
        assert_eq!(ctx.current_line_prefix(), "foo(");
        assert_eq!(ctx.current_line_suffix(), "bar);");
    }

    #[test]
    fn test_line_below_cursor_skips_blanks() {
        let ctx = context_for("first\nsecond\n\n\nthird\n", 8);
        assert_eq!(ctx.line_below_cursor(), "third");
    }

    #[test]
    fn test_line_below_cursor_absent() {
        let ctx = context_for("only line", 4);
        assert_eq!(ctx.line_below_cursor(), "");
    }

    #[test]
    fn test_prune_prefix_within_budget_is_identity() {
        let text = "short prefix";
        assert_eq!(prune_prefix(text, 8000), text);
    }

    #[test]
    fn test_prune_prefix_keeps_tail_and_aligns_to_line() {
        // Budget 8 keeps "ne3\nzzzz"; the newline sits in the first half, so
        // the partial "ne3" is dropped too.
        let text = "aaaa\nbbbb\nline2\nline3\nzzzz";
        let pruned = prune_prefix(text, 8);
        assert_eq!(pruned, "zzzz");
    }

    #[test]
    fn test_prune_prefix_keeps_partial_line_when_newline_is_late() {
        // Budget keeps "aaaaaaaa\nz": the newline sits past the midpoint, so
        // the partial first line stays.
        let text = "xxxxxaaaaaaaa\nz";
        let pruned = prune_prefix(text, 10);
        assert_eq!(pruned, "aaaaaaaa\nz");
    }

    #[test]
    fn test_prune_suffix_within_budget_is_identity() {
        let text = "short suffix";
        assert_eq!(prune_suffix(text, 2000), text);
    }

    #[test]
    fn test_prune_suffix_trims_to_last_newline() {
        // Budget 10 keeps "aaaa\nbbbb\n"; last newline at index 9 > midpoint,
        // trailing partial line is cut.
        let text = "aaaa\nbbbb\ncccc\ndddd";
        let pruned = prune_suffix(text, 10);
        assert_eq!(pruned, "aaaa\nbbbb");
    }

    #[test]
    fn test_prune_suffix_keeps_partial_line_when_newline_is_early() {
        // Last newline in the kept region is before the midpoint, so the
        // partial tail stays.
        let text = "ab\ncdefghijklmnop";
        let pruned = prune_suffix(text, 10);
        assert_eq!(pruned, "ab\ncdefghi");
    }

    #[test]
    fn test_pruning_idempotent() {
        let text = "aaaa\nbbbb\nline2\nline3\nzzzz";
        let once = prune_prefix(text, 10).to_string();
        assert_eq!(prune_prefix(&once, 10), once);

        let suffix_once = prune_suffix(text, 10).to_string();
        assert_eq!(prune_suffix(&suffix_once, 10), suffix_once);
    }

    #[test]
    fn test_prune_handles_multibyte_text() {
        let text = "héllo wörld ".repeat(800);
        let pruned = prune_prefix(&text, 8000);
        assert!(pruned.chars().count() <= 8000);
        let pruned_suffix = prune_suffix(&text, 2000);
        assert!(pruned_suffix.chars().count() <= 2000);
    }
}
