/*!
 * Mock backend implementations for testing.
 *
 * This module provides a scriptable backend that simulates different behaviors:
 * - `MockBackend::working()` - Always succeeds with a marked-up translation
 * - `MockBackend::failing()` - Always fails with an API error
 * - `MockBackend::rate_limited_then_working(n)` - Throttles `n` times, then succeeds
 * - `MockBackend::with_translations(..)` - Answers from a fixed dictionary
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use super::TranslationBackend;

/// A single call recorded by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock backend
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[<target>] <text>`
    Working,
    /// Returns the input unchanged
    Echo,
    /// Looks the text up in a dictionary, echoing unknown entries
    Dictionary(HashMap<String, String>),
    /// Fails every Nth request with a 503
    Intermittent { fail_every: usize },
    /// Throttles the first `failures` requests, then works
    RateLimitedThenWorking { failures: usize },
    /// Always fails with an API error
    Failing,
    /// Always rejects the credential
    Unauthorized,
    /// Returns an empty string
    Empty,
    /// Sleeps before answering like `Working`
    Slow { delay_ms: u64 },
}

/// Mock backend for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every call in arrival order, shared between clones
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock answering from `pairs`
    pub fn with_translations<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let dictionary = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(MockBehavior::Dictionary(dictionary))
    }

    /// Create an intermittently failing mock backend
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a mock that is rate limited `failures` times before succeeding
    pub fn rate_limited_then_working(failures: usize) -> Self {
        Self::new(MockBehavior::RateLimitedThenWorking { failures })
    }

    /// Create a failing mock backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that always rejects its credential
    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits `delay_ms` before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of translate calls received so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the recorded calls
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    fn marked(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(MockCall {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        });

        match &self.behavior {
            MockBehavior::Working => Ok(Self::marked(text, target_language)),

            MockBehavior::Echo => Ok(text.to_string()),

            MockBehavior::Dictionary(dictionary) => Ok(dictionary
                .get(text)
                .cloned()
                .unwrap_or_else(|| text.to_string())),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::marked(text, target_language))
                }
            }

            MockBehavior::RateLimitedThenWorking { failures } => {
                if count < *failures {
                    Err(ProviderError::RateLimitExceeded(
                        "Simulated throttling".to_string(),
                    ))
                } else {
                    Ok(Self::marked(text, target_language))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated credential rejection".to_string(),
            )),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(Self::marked(text, target_language))
            }
        }
    }
}
