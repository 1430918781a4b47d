use once_cell::sync::Lazy;
use regex::Regex;

// @module: Link detection for fragments that must not be translated

/// Patterns that mark a fragment as a link. Matching is a search over the
/// whole fragment, so prose containing a URL is classified as a link too.
static LINK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:https?|ftp|file)://\S+",
        r"(?i)www\.\S+",
        r"(?i)mailto:\S+",
        r"(?i)[a-z0-9.-]+\.[a-z]{2,}",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Literal markers checked even when no pattern matched
const LINK_INDICATORS: [&str; 6] = ["http://", "https://", "www.", "mailto:", "ftp://", "file://"];

/// Check whether a fragment looks like a URL, e-mail link or domain name.
///
/// This is a heuristic biased towards skipping: abbreviations such as
/// "approx.Total" are reported as links and left untranslated.
pub fn is_link(text: &str) -> bool {
    if LINK_PATTERNS.iter().any(|re| re.is_match(text)) {
        return true;
    }

    let lower = text.to_lowercase();
    LINK_INDICATORS.iter().any(|indicator| lower.contains(indicator))
}
