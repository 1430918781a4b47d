//! Language utilities for ISO language code handling
//!
//! Backends are addressed with 2-letter ISO 639-1 codes, optionally with a
//! region suffix (`zh-CN`, `pt-BR`). Prompts for LLM backends use display
//! names instead of codes.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Display names used in translation prompts for the most common languages
const PROMPT_LANGUAGE_NAMES: [(&str, &str); 12] = [
    ("en", "English"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
];

/// Split a code such as `pt-BR` into its primary subtag, lowercased
fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Validate a language code: a known ISO 639-1 code with an optional region suffix
pub fn validate_language_code(code: &str) -> Result<()> {
    let primary = primary_subtag(code);

    if primary.len() == 2 && Language::from_639_1(&primary).is_some() {
        return Ok(());
    }

    Err(anyhow!(
        "Invalid language code: '{}'. Use 2-letter ISO codes such as en, de, es",
        code
    ))
}

/// Get a human-readable language name for prompts.
///
/// Unknown codes fall back to the code itself so prompts still carry the
/// caller's intent.
pub fn display_name(code: &str) -> String {
    let primary = primary_subtag(code);

    if let Some((_, name)) = PROMPT_LANGUAGE_NAMES.iter().find(|(c, _)| *c == primary) {
        return (*name).to_string();
    }

    if primary.len() == 2 {
        if let Some(lang) = Language::from_639_1(&primary) {
            return lang.to_name().to_string();
        }
    }

    code.to_string()
}
