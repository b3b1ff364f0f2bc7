//! FIM prompt templates and per-model dispatch
//!
//! Each supported model family has its own fill-in-the-middle prompt format
//! and stop-token set. Dispatch is a static priority table over lowercase
//! model-name substrings; anything unmatched gets the generic (Stable Code)
//! format.

/// A fill-in-the-middle prompt template with its stop tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FimTemplate {
    /// Template with `{prefix}` and `{suffix}` placeholders
    pub template: &'static str,
    /// Strings that must terminate generation when produced
    pub stop_tokens: &'static [&'static str],
}

// https://huggingface.co/stabilityai/stable-code-3b
const STABLE_CODE: FimTemplate = FimTemplate {
    template: "<fim_prefix>{prefix}<fim_suffix>{suffix}<fim_middle>",
    stop_tokens: &[
        "<fim_prefix>",
        "<fim_suffix>",
        "<fim_middle>",
        "<file_sep>",
        "<|endoftext|>",
        "</fim_middle>",
        "</code>",
    ],
};

// https://github.com/QwenLM/Qwen2.5-Coder
const QWEN_CODER: FimTemplate = FimTemplate {
    template: "<|fim_prefix|>{prefix}<|fim_suffix|>{suffix}<|fim_middle|>",
    stop_tokens: &[
        "<|endoftext|>",
        "<|fim_prefix|>",
        "<|fim_middle|>",
        "<|fim_suffix|>",
        "<|fim_pad|>",
        "<|repo_name|>",
        "<|file_sep|>",
        "<|im_start|>",
        "<|im_end|>",
    ],
};

// https://www.ibm.com/granite/docs/models/granite#fim
const GRANITE: FimTemplate = FimTemplate {
    template: "<|fim_prefix|>{prefix}<|fim_suffix|>{suffix}<|fim_middle|>",
    stop_tokens: &[
        "<|end_of_text|>",
        "<|fim_prefix|>",
        "<|fim_middle|>",
        "<|fim_suffix|>",
        "<|fim_pad|>",
    ],
};

const CODESTRAL: FimTemplate = FimTemplate {
    template: "[SUFFIX]{suffix}[PREFIX]{prefix}",
    stop_tokens: &["[PREFIX]", "[SUFFIX]"],
};

const DEEPSEEK: FimTemplate = FimTemplate {
    template: "<｜fim▁begin｜>{prefix}<｜fim▁hole｜>{suffix}<｜fim▁end｜>",
    stop_tokens: &[
        "<｜fim▁begin｜>",
        "<｜fim▁hole｜>",
        "<｜fim▁end｜>",
        "<｜end▁of▁sentence｜>",
    ],
};

const CODE_LLAMA: FimTemplate = FimTemplate {
    template: "<PRE> {prefix} <SUF>{suffix} <MID>",
    stop_tokens: &["<PRE>", "<SUF>", "<MID>"],
};

const STAR_CODER: FimTemplate = FimTemplate {
    template: "<fim_prefix>{prefix}<fim_suffix>{suffix}<fim_middle>",
    stop_tokens: &[
        "<fim_prefix>",
        "<fim_suffix>",
        "<fim_middle>",
        "<|endoftext|>",
        "<file_sep>",
    ],
};

/// Model-family substrings in match priority order. First hit wins, so more
/// specific tags must precede generic ones (e.g. "code-llama" before "llama").
const TEMPLATE_TABLE: &[(&[&str], FimTemplate)] = &[
    (&["deepseek"], DEEPSEEK),
    (&["qwen"], QWEN_CODER),
    (&["granite"], GRANITE),
    (&["codestral"], CODESTRAL),
    (&["code-llama", "codellama", "llama"], CODE_LLAMA),
    (&["starcoder", "star-coder"], STAR_CODER),
    (&["stable-code", "stablecode"], STABLE_CODE),
];

impl FimTemplate {
    /// Look up the template for a model identifier
    ///
    /// Matching is case-insensitive substring search over the static family
    /// table; unmatched identifiers get the generic Stable Code format.
    pub fn for_model(model: &str) -> FimTemplate {
        let model_lower = model.to_lowercase();
        for (tags, template) in TEMPLATE_TABLE {
            if tags.iter().any(|tag| model_lower.contains(tag)) {
                return *template;
            }
        }
        STABLE_CODE
    }

    /// Render the prompt by substituting each placeholder exactly once
    ///
    /// Placeholder positions come from the static template, so
    /// placeholder-like text inside `prefix` or `suffix` is never
    /// re-expanded.
    pub fn render(&self, prefix: &str, suffix: &str) -> String {
        let mut out = self.template.to_string();
        let mut substitutions = [
            (self.template.find("{prefix}"), "{prefix}".len(), prefix),
            (self.template.find("{suffix}"), "{suffix}".len(), suffix),
        ];
        // Apply the later placeholder first so the earlier index stays valid.
        substitutions.sort_by_key(|(idx, _, _)| std::cmp::Reverse(idx.unwrap_or(0)));
        for (idx, pat_len, value) in substitutions {
            if let Some(i) = idx {
                out.replace_range(i..i + pat_len, value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_family() {
        assert_eq!(FimTemplate::for_model("deepseek-coder-6.7b"), DEEPSEEK);
        assert_eq!(FimTemplate::for_model("Qwen2.5-Coder-7B"), QWEN_CODER);
        assert_eq!(FimTemplate::for_model("granite-8b-code"), GRANITE);
        assert_eq!(FimTemplate::for_model("Codestral-22B"), CODESTRAL);
        assert_eq!(FimTemplate::for_model("CodeLlama-13b"), CODE_LLAMA);
        assert_eq!(FimTemplate::for_model("starcoder2-15b"), STAR_CODER);
    }

    #[test]
    fn test_unknown_model_gets_default() {
        assert_eq!(FimTemplate::for_model("mystery-model"), STABLE_CODE);
        assert_eq!(FimTemplate::for_model(""), STABLE_CODE);
    }

    #[test]
    fn test_render_substitutes_once() {
        let template = FimTemplate::for_model("qwen");
        let prompt = template.render("before", "after");
        assert_eq!(
            prompt,
            "<|fim_prefix|>before<|fim_suffix|>after<|fim_middle|>"
        );
    }

    #[test]
    fn test_render_does_not_recurse_into_placeholders() {
        let template = FimTemplate::for_model("qwen");
        // A prefix containing "{suffix}" must not be treated as a placeholder.
        let prompt = template.render("a{suffix}b", "tail");
        assert_eq!(
            prompt,
            "<|fim_prefix|>a{suffix}b<|fim_suffix|>tail<|fim_middle|>"
        );
    }

    #[test]
    fn test_codestral_puts_suffix_first() {
        let template = FimTemplate::for_model("codestral");
        assert_eq!(template.render("p", "s"), "[SUFFIX]s[PREFIX]p");
    }
}
