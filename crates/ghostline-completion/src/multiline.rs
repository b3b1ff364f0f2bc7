//! Multiline vs single-line completion classification
//!
//! Decided before the request is issued, since the answer changes the stop
//! tokens (single-line requests stop at the first newline).

use crate::context::CompletionContext;
use crate::types::MultilineMode;

/// Determine whether the completion may span multiple lines
///
/// Checks in order: explicit mode, a pre-selected editor suggestion, a cursor
/// inside a single-line comment, then the language's own predicate over the
/// pruned prefix/suffix. The default allows multiline.
pub fn should_complete_multiline(ctx: &CompletionContext, mode: MultilineMode) -> bool {
    match mode {
        MultilineMode::Always => return true,
        MultilineMode::Never => return false,
        MultilineMode::Auto => {}
    }

    // An intellisense selection is being completed; keep to one line.
    if ctx.selected_completion {
        return false;
    }

    if let Some(comment) = ctx.language.line_comment {
        if ctx.current_line_prefix().trim_start().starts_with(comment) {
            return false;
        }
    }

    if let Some(predicate) = ctx.language.multiline_predicate {
        return predicate(&ctx.pruned_prefix, &ctx.pruned_suffix);
    }

    true
}
