// Shared prompt fragments.
// Each module that calls the model keeps its own prompts.rs alongside it;
// this file only holds cross-cutting pieces.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Appended to every prompt whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    If unsure, use nulls or empty arrays. Do not invent facts.";

/// Fills `{name}` placeholders in a template in a single pass, so braces
/// inside substituted values are never expanded.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_every_placeholder() {
        let out = fill("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn test_fill_leaves_unknown_placeholders() {
        assert_eq!(fill("{missing}", &[("a", "x")]), "{missing}");
    }

    #[test]
    fn test_fill_does_not_expand_placeholders_inside_values() {
        let out = fill(
            "{requirements}\n{resume_text}",
            &[("requirements", "- knows {resume_text}"), ("resume_text", "CV")],
        );
        assert_eq!(out, "- knows {resume_text}\nCV");
    }
}
