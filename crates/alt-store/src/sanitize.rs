//! Text field sanitation applied before alt text is persisted

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_OR_STYLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b.*?</(script|style)\s*>").ok());
static TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)<[^>]*(>|$)").ok());
static WHITESPACE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s+").ok());

fn replace(re: &Lazy<Option<Regex>>, input: &str, with: &str) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(input, with).into_owned(),
        None => input.to_string(),
    }
}

/// Clean a single-line text value
///
/// Script and style blocks are dropped with their contents, remaining tags
/// (including an unterminated trailing one) are stripped, whitespace runs
/// collapse to one space and the result is trimmed.
#[must_use]
pub fn sanitize_text_field(input: &str) -> String {
    let without_blocks = replace(&SCRIPT_OR_STYLE, input, "");
    let without_tags = replace(&TAG, &without_blocks, "");
    replace(&WHITESPACE, &without_tags, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_markup() {
        assert_eq!(sanitize_text_field("<em>Red</em> bicycle"), "Red bicycle");
        assert_eq!(
            sanitize_text_field("Dog<script>alert(1)</script> on grass"),
            "Dog on grass"
        );
        assert_eq!(sanitize_text_field("Cat <img src=x onerror=y"), "Cat");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize_text_field("  A\n\n red\t\tbicycle  "), "A red bicycle");
        assert_eq!(sanitize_text_field(" \t\n "), "");
    }

    #[test]
    fn keeps_plain_text() {
        assert_eq!(sanitize_text_field("Caf\u{e9} & bar > 3"), "Caf\u{e9} & bar > 3");
    }

    proptest! {
        #[test]
        fn output_is_trimmed_and_single_spaced(input in "[a-z <>/\t\n]{0,40}") {
            let out = sanitize_text_field(&input);
            prop_assert_eq!(out.trim(), out.as_str());
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.contains('\n'));
            prop_assert!(!out.contains('<'));
        }

        #[test]
        fn idempotent(input in "[a-zA-Z <>/=\"\t\n]{0,40}") {
            let once = sanitize_text_field(&input);
            prop_assert_eq!(sanitize_text_field(&once), once.clone());
        }
    }
}
