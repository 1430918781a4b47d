/*!
 * Tests for the retrying fragment translator
 */

use std::sync::Arc;

use docxlate::providers::mock::MockBackend;
use docxlate::translation::{
    NoopObserver, RecordingObserver, ResilientTranslator, RetryPolicy, TranslationRequest,
};

fn translator(backend: &MockBackend, attempts: u32) -> ResilientTranslator {
    ResilientTranslator::new(Arc::new(backend.clone()), RetryPolicy::without_delay(attempts))
}

#[tokio::test]
async fn test_translate_withWorkingBackend_shouldReturnTranslation() {
    let backend = MockBackend::with_translations([("Hello", "Hallo")]);
    let translator = translator(&backend, 3);

    let result = translator
        .translate(&TranslationRequest::new("Hello", "en", "de"), &NoopObserver)
        .await;

    assert_eq!(result, "Hallo");
    assert_eq!(backend.call_count(), 1);
    let call = &backend.calls()[0];
    assert_eq!((call.source_language.as_str(), call.target_language.as_str()), ("en", "de"));
}

/// URLs are returned untouched without calling the backend
#[tokio::test]
async fn test_translate_withUrl_shouldSkipBackend() {
    let backend = MockBackend::working();
    let translator = translator(&backend, 3);

    let result = translator
        .translate(&TranslationRequest::new("https://example.com", "en", "de"), &NoopObserver)
        .await;

    assert_eq!(result, "https://example.com");
    assert_eq!(backend.call_count(), 0);
}

/// Prose containing a URL is kept whole and never sent
#[tokio::test]
async fn test_translate_withUrlInProse_shouldSkipBackend() {
    let backend = MockBackend::working();
    let translator = translator(&backend, 3);

    let result = translator
        .translate(&TranslationRequest::new("Visit https://example.com today", "en", "de"), &NoopObserver)
        .await;

    assert_eq!(result, "Visit https://example.com today");
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_translate_withSingleCharacter_shouldSkipBackend() {
    let backend = MockBackend::working();
    let translator = translator(&backend, 3);

    for text in ["A", " 1 ", ""] {
        let result = translator
            .translate(&TranslationRequest::new(text, "en", "de"), &NoopObserver)
            .await;
        assert_eq!(result, text);
    }
    assert_eq!(backend.call_count(), 0);
}

/// Two throttled attempts followed by a success yield the translation
#[tokio::test]
async fn test_translate_rateLimitedTwice_shouldSucceedOnThirdAttempt() {
    let backend = MockBackend::rate_limited_then_working(2);
    let translator = translator(&backend, 3);
    let observer = RecordingObserver::new();

    let result = translator
        .translate(&TranslationRequest::new("Hello", "en", "de"), &observer)
        .await;

    assert_eq!(result, "[de] Hello");
    assert_eq!(backend.call_count(), 3);
    assert!(observer.warnings().is_empty());
}

/// Exhausted attempts keep the original text and warn exactly once
#[tokio::test]
async fn test_translate_alwaysFailing_shouldKeepOriginalAfterMaxAttempts() {
    let backend = MockBackend::unauthorized();
    let translator = translator(&backend, 3);
    let observer = RecordingObserver::new();

    let result = translator
        .translate(&TranslationRequest::new("Quarterly report", "en", "de"), &observer)
        .await;

    assert_eq!(result, "Quarterly report");
    assert_eq!(backend.call_count(), 3);

    let warnings = observer.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Failed to translate: 'Quarterly report...'"));
}

#[tokio::test]
async fn test_translate_warning_shouldQuoteFirstFiftyCharacters() {
    let backend = MockBackend::failing();
    let translator = translator(&backend, 1);
    let observer = RecordingObserver::new();
    let text = "ü".repeat(80);

    translator
        .translate(&TranslationRequest::new(&text, "en", "de"), &observer)
        .await;

    let expected = format!("Failed to translate: '{}...'", "ü".repeat(50));
    assert!(observer.warnings()[0].starts_with(&expected));
}

/// A zero attempt count still makes one attempt
#[tokio::test]
async fn test_retryPolicy_withZeroAttempts_shouldClampToOne() {
    let backend = MockBackend::failing();
    let translator = translator(&backend, 0);

    assert_eq!(translator.policy().max_attempts, 1);
    translator
        .translate(&TranslationRequest::new("Hello", "en", "de"), &NoopObserver)
        .await;
    assert_eq!(backend.call_count(), 1);
}
