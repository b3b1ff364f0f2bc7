//! Language metadata for completion decisions
//!
//! Maps editor language identifiers to the small amount of syntax knowledge
//! the engine needs: the single-line comment token and an optional
//! language-specific multiline predicate.

/// Decides whether a multiline completion makes sense for a language, given
/// the pruned prefix and suffix around the cursor.
pub type MultilinePredicate = fn(prefix: &str, suffix: &str) -> bool;

/// Per-language metadata consulted by the filter pipeline and the multiline
/// classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Editor language identifier
    pub id: &'static str,
    /// Single-line comment token, if the language has one
    pub line_comment: Option<&'static str>,
    /// Language-specific multiline decision, if one is defined
    pub multiline_predicate: Option<MultilinePredicate>,
}

impl Language {
    /// Resolve language metadata from an editor language identifier
    ///
    /// Unknown identifiers resolve to a language with no comment token and no
    /// multiline predicate, which makes the comment-sensitive stages no-ops.
    pub fn from_id(language_id: &str) -> Self {
        let id_lower = language_id.to_lowercase();
        let (id, line_comment): (&'static str, Option<&'static str>) = match id_lower.as_str() {
            "javascript" => ("javascript", Some("//")),
            "typescript" => ("typescript", Some("//")),
            "javascriptreact" => ("javascriptreact", Some("//")),
            "typescriptreact" => ("typescriptreact", Some("//")),
            "java" => ("java", Some("//")),
            "c" => ("c", Some("//")),
            "cpp" => ("cpp", Some("//")),
            "csharp" => ("csharp", Some("//")),
            "go" => ("go", Some("//")),
            "rust" => ("rust", Some("//")),
            "swift" => ("swift", Some("//")),
            "kotlin" => ("kotlin", Some("//")),
            "scala" => ("scala", Some("//")),
            "php" => ("php", Some("//")),
            "python" => ("python", Some("#")),
            "ruby" => ("ruby", Some("#")),
            "perl" => ("perl", Some("#")),
            "shell" | "shellscript" => ("shell", Some("#")),
            "bash" => ("bash", Some("#")),
            "r" => ("r", Some("#")),
            "yaml" => ("yaml", Some("#")),
            "toml" => ("toml", Some("#")),
            "lua" => ("lua", Some("--")),
            "sql" => ("sql", Some("--")),
            "haskell" => ("haskell", Some("--")),
            _ => ("unknown", None),
        };

        Self {
            id,
            line_comment,
            multiline_predicate: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_comment_languages() {
        assert_eq!(Language::from_id("rust").line_comment, Some("//"));
        assert_eq!(Language::from_id("typescript").line_comment, Some("//"));
        assert_eq!(Language::from_id("go").line_comment, Some("//"));
    }

    #[test]
    fn test_hash_comment_languages() {
        assert_eq!(Language::from_id("python").line_comment, Some("#"));
        assert_eq!(Language::from_id("yaml").line_comment, Some("#"));
    }

    #[test]
    fn test_dash_comment_languages() {
        assert_eq!(Language::from_id("lua").line_comment, Some("--"));
        assert_eq!(Language::from_id("sql").line_comment, Some("--"));
    }

    #[test]
    fn test_unknown_language() {
        let lang = Language::from_id("brainfuck");
        assert_eq!(lang.id, "unknown");
        assert_eq!(lang.line_comment, None);
        assert!(lang.multiline_predicate.is_none());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(Language::from_id("Rust").line_comment, Some("//"));
    }
}
