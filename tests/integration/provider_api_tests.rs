/*!
 * Integration tests for the real backends against a local HTTP server
 */

use std::time::Duration;

use docxlate::errors::ProviderError;
use docxlate::providers::TranslationBackend;
use docxlate::providers::google::Google;
use docxlate::providers::openai::OpenAI;
use crate::common::mock_server::{MockHttpServer, MockResponse};

fn openai(server: &MockHttpServer, api_key: &str) -> OpenAI {
    OpenAI::new(api_key, server.url(), "gpt-test").timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_openai_translate_withCompletion_shouldReturnTrimmedContent() {
    let server = MockHttpServer::start(vec![MockResponse::openai_completion("  Hallo Welt \n")]).await;

    let result = openai(&server, "sk-test").translate("Hello world", "en", "de").await;

    assert_eq!(result.unwrap(), "Hallo Welt");
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].uri.path(), "/chat/completions");
    assert_eq!(requests[0].header("authorization"), Some("Bearer sk-test"));

    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-test");
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("from English to German"));
    assert_eq!(body["messages"][1]["content"], "Hello world");
}

/// Status codes map onto the provider error variants
#[tokio::test]
async fn test_openai_translate_withErrorStatus_shouldClassifyFailure() {
    let cases: Vec<(u16, fn(&ProviderError) -> bool)> = vec![
        (401, |e| matches!(e, ProviderError::AuthenticationError(_))),
        (429, |e| matches!(e, ProviderError::RateLimitExceeded(_))),
        (500, |e| matches!(e, ProviderError::ApiError { status_code: 500, .. })),
        (404, |e| matches!(e, ProviderError::ApiError { status_code: 404, .. })),
    ];

    for (status, is_expected) in cases {
        let server = MockHttpServer::start(vec![MockResponse::new(status, r#"{"error":{"message":"nope"}}"#)]).await;

        let err = openai(&server, "sk-test")
            .translate("Hello", "en", "de")
            .await
            .unwrap_err();

        assert!(is_expected(&err), "status {} mapped to {:?}", status, err);
    }
}

/// An empty completion keeps the original text
#[tokio::test]
async fn test_openai_translate_withEmptyContent_shouldReturnOriginal() {
    let server = MockHttpServer::start(vec![MockResponse::openai_completion("")]).await;

    let result = openai(&server, "sk-test").translate("Hello", "en", "de").await;
    assert_eq!(result.unwrap(), "Hello");
}

#[tokio::test]
async fn test_openai_translate_withMalformedBody_shouldBeParseError() {
    let server = MockHttpServer::start(vec![MockResponse::new(200, "not json")]).await;

    let err = openai(&server, "sk-test").translate("Hello", "en", "de").await.unwrap_err();
    assert!(matches!(err, ProviderError::ParseError(_)));
}

/// A malformed key never reaches the network
#[tokio::test]
async fn test_openai_translate_withBadKey_shouldFailWithoutRequest() {
    let server = MockHttpServer::start(vec![MockResponse::openai_completion("Hallo")]).await;

    let err = openai(&server, "bad-key").translate("Hello", "en", "de").await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidCredentialFormat));
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn test_google_translate_shouldJoinSegments() {
    let server = MockHttpServer::start(vec![MockResponse::google_segments(&["Hallo ", "Welt"])]).await;
    let google = Google::new(server.url(), Duration::from_secs(5));

    let result = google.translate("Hello world", "en", "de").await;

    assert_eq!(result.unwrap(), "Hallo Welt");
    let request = &server.requests()[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.uri.path(), "/translate_a/single");
    assert_eq!(request.query_param("client").as_deref(), Some("gtx"));
    assert_eq!(request.query_param("sl").as_deref(), Some("en"));
    assert_eq!(request.query_param("tl").as_deref(), Some("de"));
    assert_eq!(request.query_param("q").as_deref(), Some("Hello world"));
}

#[tokio::test]
async fn test_google_translate_withThrottling_shouldBeRateLimitError() {
    let server = MockHttpServer::start(vec![MockResponse::new(429, "")]).await;
    let google = Google::new(server.url(), Duration::from_secs(5));

    let err = google.translate("Hello", "en", "de").await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimitExceeded(_)));
}

#[tokio::test]
async fn test_connectionRefused_shouldBeConnectionError() {
    let google = Google::new("http://127.0.0.1:9", Duration::from_secs(5));

    let err = google.translate("Hello", "en", "de").await.unwrap_err();
    assert!(matches!(err, ProviderError::ConnectionError(_)), "{:?}", err);
}
