//! Whole-completion postprocessing filters
//!
//! Applied once the filtered stream has been assembled into a single string.
//! Each check either rejects the candidate outright (the request then shows
//! no suggestion) or cleans it up before display.

use tracing::debug;

use crate::stream::lines_are_repeated;

/// Whether a completion is empty after trimming
pub fn is_blank(completion: &str) -> bool {
    completion.trim().is_empty()
}

/// Whether a completion consists solely of whitespace characters
pub fn is_only_whitespace(completion: &str) -> bool {
    !completion.is_empty() && completion.chars().all(char::is_whitespace)
}

/// Whether the completion's first non-blank line near-duplicates the last
/// non-blank line of the prefix
pub fn rewrites_line_above(completion: &str, prefix: &str) -> bool {
    let Some(line_above) = prefix
        .split('\n')
        .rev()
        .find(|line| !line.trim().is_empty())
    else {
        return false;
    };

    let Some(first_line) = completion
        .split('\n')
        .find(|line| !line.trim().is_empty())
    else {
        return false;
    };

    lines_are_repeated(line_above, first_line)
}

/// Longest common subsequence of two strings, reconstructed as a string
fn longest_common_subsequence(a: &str, b: &str) -> String {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let m = a.len();
    let n = b.len();

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    let mut lcs = Vec::new();
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            lcs.push(a[i - 1]);
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    lcs.reverse();
    lcs.into_iter().collect()
}

/// Detect degenerate completions that repeat the same content line after line
///
/// For small repetition periods (1 and 2), the longest common subsequence of
/// the first line and the line one period away is taken as the repeated
/// motif; if it is substantial (over 5 chars or over half the first line) the
/// period-sampled lines containing it are counted. A weighted count over 8,
/// or over 80% of all lines, rejects the completion.
pub fn is_extreme_repetition(completion: &str) -> bool {
    let lines: Vec<&str> = completion.split('\n').collect();
    if lines.len() < 6 {
        return false;
    }

    for period in 1..3 {
        let lcs = longest_common_subsequence(lines[0], lines[period]);
        let first_len = lines[0].chars().count();
        if lcs.chars().count() > 5 || lcs.chars().count() as f64 > first_len as f64 * 0.5 {
            let match_count = lines
                .iter()
                .step_by(period)
                .filter(|line| line.contains(&lcs))
                .count();

            let weighted = match_count * period;
            if weighted > 8 || weighted as f64 / lines.len() as f64 > 0.8 {
                return true;
            }
        }
    }

    false
}

/// Strip markdown code-fence delimiters from a completion
///
/// Removes a leading line starting with three backticks (optionally carrying
/// a language tag) and a trailing line consisting solely of backticks.
fn remove_code_fences(completion: &str) -> String {
    let lines: Vec<&str> = completion.split('\n').collect();
    if lines.is_empty() {
        return completion.to_string();
    }

    let mut start = 0;
    let mut end = lines.len();

    if lines[0].trim().starts_with("```") {
        start = 1;
    }

    if lines.len() > start {
        let last = lines[lines.len() - 1].trim();
        if !last.is_empty() && last.chars().all(|c| c == '`') {
            end = lines.len() - 1;
        }
    }

    if start > 0 || end < lines.len() {
        return lines[start..end].join("\n");
    }

    completion.to_string()
}

/// Validate and clean a fully assembled completion
///
/// Returns `None` when the candidate should not be shown. Checks run in
/// order: blank, whitespace-only, rewrite of the line above, extreme
/// repetition; then the survivors get leading-space dedup at the prefix seam
/// and code-fence stripping.
pub fn postprocess_completion(completion: &str, prefix: &str) -> Option<String> {
    if is_blank(completion) {
        debug!("Rejecting completion: blank");
        return None;
    }

    if is_only_whitespace(completion) {
        debug!("Rejecting completion: whitespace only");
        return None;
    }

    if rewrites_line_above(completion, prefix) {
        debug!("Rejecting completion: rewrites the line above the cursor");
        return None;
    }

    if is_extreme_repetition(completion) {
        debug!("Rejecting completion: extreme repetition");
        return None;
    }

    let mut completion = completion.to_string();

    if prefix.ends_with(' ') && completion.starts_with(' ') {
        completion.remove(0);
    }

    Some(remove_code_fences(&completion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_whitespace_rejected() {
        assert_eq!(postprocess_completion("", "prefix"), None);
        assert_eq!(postprocess_completion("   \n\t  ", "prefix"), None);
    }

    #[test]
    fn test_is_only_whitespace() {
        assert!(is_only_whitespace("   \n"));
        assert!(!is_only_whitespace("  x "));
        assert!(!is_only_whitespace(""));
    }

    #[test]
    fn test_rewrites_line_above_rejected() {
        let prefix = "fn compute() {\n    let total = sum(values);\n";
        let completion = "    let total = sum(values);";
        assert_eq!(postprocess_completion(completion, prefix), None);
    }

    #[test]
    fn test_different_line_passes() {
        let prefix = "fn compute() {\n    let total = sum(values);\n";
        let completion = "    return total;";
        assert_eq!(
            postprocess_completion(completion, prefix),
            Some("    return total;".to_string())
        );
    }

    #[test]
    fn test_longest_common_subsequence() {
        assert_eq!(longest_common_subsequence("abcde", "ace"), "ace");
        assert_eq!(longest_common_subsequence("abc", "xyz"), "");
        assert_eq!(longest_common_subsequence("same", "same"), "same");
    }

    #[test]
    fn test_extreme_repetition_identical_lines() {
        let completion = vec!["let value = 10;"; 10].join("\n");
        assert!(is_extreme_repetition(&completion));
    }

    #[test]
    fn test_extreme_repetition_distinct_lines_pass() {
        let completion = "alpha\nbravo\ncars\ndelta\nechos\nfox\ngolf\nhotel\nindia\njudo";
        assert!(!is_extreme_repetition(completion));
    }

    #[test]
    fn test_extreme_repetition_needs_six_lines() {
        let completion = vec!["let value = 10;"; 5].join("\n");
        assert!(!is_extreme_repetition(&completion));
    }

    #[test]
    fn test_leading_space_dedup() {
        assert_eq!(
            postprocess_completion(" value", "let x = "),
            Some("value".to_string())
        );
        // No dedup when the prefix does not end with a space.
        assert_eq!(
            postprocess_completion(" value", "let x ="),
            Some(" value".to_string())
        );
    }

    #[test]
    fn test_fence_stripping() {
        assert_eq!(
            postprocess_completion("```ts\ncode\n```", "prefix"),
            Some("code".to_string())
        );
        assert_eq!(
            postprocess_completion("```\ncode", "prefix"),
            Some("code".to_string())
        );
        assert_eq!(
            postprocess_completion("plain code", "prefix"),
            Some("plain code".to_string())
        );
    }

    #[test]
    fn test_trailing_backtick_only_line_stripped() {
        assert_eq!(
            postprocess_completion("code()\n``", "prefix"),
            Some("code()".to_string())
        );
    }
}
