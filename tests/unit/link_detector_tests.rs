/*!
 * Tests for link detection
 */

use docxlate::link_detector::is_link;
use docxlate::translation::ResilientTranslator;

/// Fragments that are plainly links
#[test]
fn test_isLink_withUrlsAndAddresses_shouldReturnTrue() {
    let links = [
        "https://www.rust-lang.org/learn",
        "http://localhost:8080",
        "www.example.org",
        "mailto:office@example.com",
        "ftp://mirror.example.net/pub",
        "example.de",
    ];

    for link in links {
        assert!(is_link(link), "expected {:?} to be a link", link);
    }
}

/// Ordinary prose is not a link
#[test]
fn test_isLink_withProse_shouldReturnFalse() {
    let prose = [
        "Hello world",
        "Quarterly report 2024",
        "The meeting ends at 5 pm.",
        "Net income: 1.5 million",
        "",
    ];

    for text in prose {
        assert!(!is_link(text), "expected {:?} not to be a link", text);
    }
}

/// Prose that mentions a URL anywhere is skipped as a whole
#[test]
fn test_isLink_withEmbeddedUrl_shouldReturnTrue() {
    assert!(is_link("See https://example.com for details"));
    assert!(is_link("Write to support@example.com today"));
}

/// The translator never sends links or one-character fragments
#[test]
fn test_shouldTranslate_shouldRejectLinksAndShortText() {
    assert!(!ResilientTranslator::should_translate("https://example.com"));
    assert!(!ResilientTranslator::should_translate("A"));
    assert!(!ResilientTranslator::should_translate("  x  "));
    assert!(!ResilientTranslator::should_translate("   "));
    assert!(ResilientTranslator::should_translate("Hi"));
    assert!(ResilientTranslator::should_translate("Hello world"));
}
