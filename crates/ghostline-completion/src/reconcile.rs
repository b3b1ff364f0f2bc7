//! Single-line completion reconciliation
//!
//! When a single-line suggestion lands on a line that already has text after
//! the cursor, the model may have repeated that text, ignored it, or partly
//! rewritten it. A word-level diff between the existing trailing text and the
//! model's line is classified into a small set of patterns, each mapping to
//! an insertion and an optional replacement range. No pattern ever fails;
//! unrecognized shapes fall back to plain insertion.

use similar::{ChangeTag, TextDiff};
use tracing::debug;

use crate::types::Completion;

/// One contiguous span of the word-level diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Equal,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DiffSegment {
    kind: SegmentKind,
    text: String,
}

/// Split a line into word-diff tokens: runs of identifier characters, runs of
/// whitespace, and single punctuation characters. Punctuation stays separate
/// so `"bar();"` against `");"` diffs as an added `bar(` plus an equal `);`.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let word = ch.is_alphanumeric() || ch == '_';
        let space = ch.is_whitespace();

        let run_continues = |next: char| {
            if word {
                next.is_alphanumeric() || next == '_'
            } else if space {
                next.is_whitespace()
            } else {
                false
            }
        };

        match chars.peek() {
            Some(&(_, next)) if run_continues(next) => continue,
            Some(&(next_idx, _)) => {
                tokens.push(&text[start..next_idx]);
                start = next_idx;
            }
            None => {
                tokens.push(&text[start..idx + ch.len_utf8()]);
            }
        }
    }

    tokens
}

/// Word-level diff of (current trailing text, model line), with adjacent
/// same-tag changes merged into segments
fn diff_segments(current_text: &str, model_line: &str) -> Vec<DiffSegment> {
    let old_tokens = tokenize(current_text);
    let new_tokens = tokenize(model_line);
    let diff = TextDiff::from_slices(&old_tokens, &new_tokens);

    let mut segments: Vec<DiffSegment> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => SegmentKind::Equal,
            ChangeTag::Insert => SegmentKind::Added,
            ChangeTag::Delete => SegmentKind::Removed,
        };

        match segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => segments.push(DiffSegment {
                kind,
                text: change.value().to_string(),
            }),
        }
    }

    segments
}

fn pattern_matches(segments: &[DiffSegment], pattern: &[SegmentKind]) -> bool {
    segments.len() == pattern.len()
        && segments
            .iter()
            .zip(pattern)
            .all(|(segment, kind)| segment.kind == *kind)
}

/// Merge a single-line suggestion with the text already after the cursor
///
/// `cursor_offset` is the base for the returned replacement range. Patterns:
/// - pure insertion: the model added text only; insert at the cursor.
/// - insertion then matching suffix (optionally with a second insertion): the
///   model repeated the existing trailing text, so the range subsumes it.
/// - insertion with a residual mismatch: insert only, keep the existing text.
/// - anything else: the first added segment if the diff starts with one,
///   otherwise the whole model line, inserted with no range.
pub fn reconcile_single_line(
    model_line: &str,
    current_text: &str,
    cursor_offset: usize,
) -> Completion {
    use SegmentKind::{Added, Equal, Removed};

    let segments = diff_segments(current_text, model_line);
    debug!(?segments, "Classified single-line diff");

    if pattern_matches(&segments, &[Added]) {
        // Nothing after the cursor to reconcile with.
        return Completion::insertion(model_line);
    }

    if pattern_matches(&segments, &[Added, Equal]) || pattern_matches(&segments, &[Added, Equal, Added]) {
        // The model repeated the text after the cursor; replace it so the
        // suggestion does not duplicate it.
        return Completion::replacing(
            model_line,
            cursor_offset,
            cursor_offset + current_text.len(),
        );
    }

    if pattern_matches(&segments, &[Added, Removed]) || pattern_matches(&segments, &[Removed, Added]) {
        // Mid-line insertion that does not repeat to the end of the line;
        // insert without deleting the existing text.
        return Completion::insertion(model_line);
    }

    if let Some(first) = segments.first() {
        if first.kind == Added {
            return Completion::insertion(first.text.clone());
        }
    }

    Completion::insertion(model_line)
}
