//! Line-level stream filters for generated completions
//!
//! The raw generation output arrives as text fragments. [`stream_lines`]
//! regroups them into complete lines, the filter stages transform the line
//! stream, and [`stream_with_newlines`] re-joins the survivors. Every stage
//! is a lazy pull-based transform holding only its own bounded state; a stage
//! that decides generation must end cancels the shared halt token so the
//! upstream provider call is released promptly.

use async_stream::stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A lazy, single-pass stream of completion lines
pub type LineStream<'a> = BoxStream<'a, String>;

/// Consecutive near-duplicate lines tolerated before halting generation
const MAX_REPEATS: usize = 3;

/// Regroup a fragment stream into complete lines
///
/// A trailing partial line, if any, is flushed as a final line when the
/// source ends.
pub fn stream_lines(chunks: BoxStream<'_, String>) -> LineStream<'_> {
    Box::pin(stream! {
        let mut chunks = chunks;
        let mut buffer = String::new();

        while let Some(chunk) = chunks.next().await {
            buffer.push_str(&chunk);
            while let Some(idx) = buffer.find('\n') {
                let line = buffer[..idx].to_string();
                buffer.replace_range(..=idx, "");
                yield line;
            }
        }

        if !buffer.is_empty() {
            yield buffer;
        }
    })
}

/// Re-join a line stream into text fragments separated by newlines
pub fn stream_with_newlines(lines: LineStream<'_>) -> BoxStream<'_, String> {
    Box::pin(stream! {
        let mut lines = lines;
        let mut first = true;
        while let Some(line) = lines.next().await {
            if !first {
                yield "\n".to_string();
            }
            first = false;
            yield line;
        }
    })
}

/// Whether two lines are near-duplicates
///
/// Both raw lines must exceed four characters; the trimmed lines count as
/// repeated when their Levenshtein distance is under 10% of the second
/// line's length.
pub fn lines_are_repeated(a: &str, b: &str) -> bool {
    if a.chars().count() <= 4 || b.chars().count() <= 4 {
        return false;
    }

    let a_trim = a.trim();
    let b_trim = b.trim();
    let distance = strsim::levenshtein(a_trim, b_trim);
    (distance as f64) / (b_trim.chars().count() as f64) < 0.1
}

/// Halt generation once lines start repeating
///
/// Tracks the previous line; after [`MAX_REPEATS`] consecutive near-duplicate
/// lines the halt token is cancelled and the stream ends. Duplicates below
/// the threshold are still yielded.
pub fn stop_at_repeating_lines(lines: LineStream<'_>, halt: CancellationToken) -> LineStream<'_> {
    Box::pin(stream! {
        let mut lines = lines;
        let mut previous_line: Option<String> = None;
        let mut repeat_count = 0usize;

        while let Some(line) = lines.next().await {
            match &previous_line {
                Some(previous) if lines_are_repeated(&line, previous) => {
                    repeat_count += 1;
                    if repeat_count >= MAX_REPEATS {
                        debug!("Halting stream: {} consecutive repeated lines", repeat_count);
                        halt.cancel();
                        break;
                    }
                }
                _ => repeat_count = 0,
            }

            previous_line = Some(line.clone());
            yield line;
        }
    })
}

/// Drop a blank line when the previously yielded line was also blank
pub fn no_double_blank_lines(lines: LineStream<'_>) -> LineStream<'_> {
    Box::pin(stream! {
        let mut lines = lines;
        let mut previous_was_blank = false;

        while let Some(line) = lines.next().await {
            let is_blank = line.trim().is_empty();
            if is_blank && previous_was_blank {
                continue;
            }
            previous_was_blank = is_blank;
            yield line;
        }
    })
}

/// Halt when a generated line repeats the line below the cursor
///
/// Stops the model from regenerating code that already exists in the
/// document. The triggering line is withheld. A blank or absent
/// below-cursor line makes this a passthrough.
pub fn stop_at_similar_line<'a>(
    lines: LineStream<'a>,
    line_below_cursor: String,
    halt: CancellationToken,
) -> LineStream<'a> {
    Box::pin(stream! {
        let mut lines = lines;

        if line_below_cursor.trim().is_empty() {
            while let Some(line) = lines.next().await {
                yield line;
            }
            return;
        }

        while let Some(line) = lines.next().await {
            if lines_are_repeated(&line, &line_below_cursor) {
                debug!("Halting stream: generated line repeats line below cursor");
                halt.cancel();
                break;
            }
            yield line;
        }
    })
}

/// Drop lines consisting solely of the language's comment token
///
/// Matches the bare token or the token followed by a single space. A
/// language without a single-line comment token makes this a passthrough.
pub fn drop_empty_comments<'a>(
    lines: LineStream<'a>,
    line_comment: Option<&'a str>,
) -> LineStream<'a> {
    let Some(comment) = line_comment else {
        return lines;
    };

    Box::pin(stream! {
        let mut lines = lines;
        while let Some(line) = lines.next().await {
            let trimmed = line.trim();
            if trimmed == comment || trimmed == format!("{} ", comment) {
                continue;
            }
            yield line;
        }
    })
}

/// Halt at structural end-of-completion markers
///
/// Records the first line's indentation. Subsequent lines halt the stream on
/// a markdown code fence, or on a closing bracket (`}`, `)`, `]`) indented
/// less than the first line, which signals the end of the enclosing block.
pub fn stop_at_block_end(lines: LineStream<'_>, halt: CancellationToken) -> LineStream<'_> {
    Box::pin(stream! {
        let mut lines = lines;
        let mut first_line = true;
        let mut first_line_indentation = 0usize;

        while let Some(line) = lines.next().await {
            let indentation = line.len() - line.trim_start().len();

            if first_line {
                first_line_indentation = indentation;
                first_line = false;
                yield line;
                continue;
            }

            let trimmed = line.trim();

            if trimmed.starts_with("```") {
                debug!("Halting stream: markdown code fence");
                halt.cancel();
                break;
            }

            if indentation < first_line_indentation
                && trimmed.starts_with(['}', ')', ']'])
            {
                debug!("Halting stream: closing bracket below first-line indentation");
                halt.cancel();
                break;
            }

            yield line;
        }
    })
}

/// Apply the full filter chain to a line stream, in fixed order
pub fn apply_filter_pipeline<'a>(
    lines: LineStream<'a>,
    line_below_cursor: String,
    line_comment: Option<&'a str>,
    halt: CancellationToken,
) -> LineStream<'a> {
    let lines = stop_at_repeating_lines(lines, halt.clone());
    let lines = no_double_blank_lines(lines);
    let lines = stop_at_similar_line(lines, line_below_cursor, halt.clone());
    let lines = drop_empty_comments(lines, line_comment);
    stop_at_block_end(lines, halt)
}
