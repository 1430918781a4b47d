/*!
 * Resilient per-fragment translation.
 *
 * This module contains the `ResilientTranslator`, which wraps a backend with
 * the skip rules (too short, link-like) and a fixed-interval retry loop. It
 * never fails: a fragment that cannot be translated keeps its original text.
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationCommonConfig;
use crate::link_detector;
use crate::providers::TranslationBackend;
use super::observer::TranslationObserver;

/// Fragments shorter than this after trimming are never sent
const MIN_TRANSLATABLE_CHARS: usize = 2;

/// Characters of the original text quoted in failure warnings
const WARNING_EXCERPT_CHARS: usize = 50;

/// One fragment to translate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationRequest<'a> {
    /// Text of the fragment
    pub text: &'a str,
    /// Source language code
    pub source_language: &'a str,
    /// Target language code
    pub target_language: &'a str,
}

impl<'a> TranslationRequest<'a> {
    pub fn new(text: &'a str, source_language: &'a str, target_language: &'a str) -> Self {
        Self {
            text,
            source_language,
            target_language,
        }
    }
}

/// Wait performed between two attempts
#[async_trait]
pub trait RetryDelay: Send + Sync + Debug {
    /// Wait after failed attempt number `attempt` (1-based)
    async fn wait(&self, attempt: u32);
}

/// Sleeps for a fixed interval
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl RetryDelay for FixedDelay {
    async fn wait(&self, _attempt: u32) {
        tokio::time::sleep(self.0).await;
    }
}

/// Returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RetryDelay for NoDelay {
    async fn wait(&self, _attempt: u32) {}
}

/// How many attempts to make and how long to wait between them
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, at least 1
    pub max_attempts: u32,
    /// Wait between attempts
    pub delay: Arc<dyn RetryDelay>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Arc::new(FixedDelay(Duration::from_secs(1))),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Arc<dyn RetryDelay>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Policy described by the common translation settings
    pub fn from_config(config: &TranslationCommonConfig) -> Self {
        Self::new(config.retry_count, Arc::new(FixedDelay(config.retry_delay())))
    }

    /// Same attempt count without any waiting
    pub fn without_delay(max_attempts: u32) -> Self {
        Self::new(max_attempts, Arc::new(NoDelay))
    }
}

/// Translator that swallows backend failures
#[derive(Debug, Clone)]
pub struct ResilientTranslator {
    backend: Arc<dyn TranslationBackend>,
    policy: RetryPolicy,
}

impl ResilientTranslator {
    pub fn new(backend: Arc<dyn TranslationBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Name of the wrapped backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Whether `text` would be sent to the backend at all
    pub fn should_translate(text: &str) -> bool {
        text.trim().chars().count() >= MIN_TRANSLATABLE_CHARS && !link_detector::is_link(text)
    }

    /// Translate one fragment, returning the original text when every attempt fails
    pub async fn translate(
        &self,
        request: &TranslationRequest<'_>,
        observer: &dyn TranslationObserver,
    ) -> String {
        if !Self::should_translate(request.text) {
            debug!("Skipping fragment: {:?}", excerpt(request.text));
            return request.text.to_string();
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self
                .backend
                .translate(request.text, request.source_language, request.target_language)
                .await
            {
                Ok(translated) => return translated,
                Err(e) if attempt < max_attempts => {
                    debug!(
                        "{} attempt {}/{} failed: {}",
                        self.backend.name(),
                        attempt,
                        max_attempts,
                        e
                    );
                    self.policy.delay.wait(attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    observer.on_warning(&format!(
                        "Failed to translate: '{}...' - {}",
                        excerpt(request.text),
                        e
                    ));
                    return request.text.to_string();
                }
            }
        }
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(WARNING_EXCERPT_CHARS).collect()
}
