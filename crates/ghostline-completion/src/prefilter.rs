//! Prefiltering: skip generation entirely for unsuitable documents

use std::path::Path;
use std::sync::OnceLock;

use regex::RegexSet;
use tracing::debug;

fn skip_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RegexSet::new([r"\.prompt$", r"\.gitignore$", r"\.\w+ignore$"])
            .expect("skip patterns are valid regexes")
    })
}

/// Whether completion should be skipped for this document
///
/// Skips configuration files, pathless empty documents (nothing to anchor a
/// completion to), and ignore-file style paths.
pub fn should_skip_completion(path: Option<&Path>, document: &str) -> bool {
    let Some(path) = path else {
        // Untitled buffer: only skip while it is still empty.
        return document.trim().is_empty();
    };

    let path_str = path.to_string_lossy();

    if path_str.contains("config.json") || path_str.contains("settings.json") {
        debug!("Skipping completion in configuration file");
        return true;
    }

    if skip_patterns().is_match(&path_str) {
        debug!("Skipping completion for ignored path pattern");
        return true;
    }

    false
}
