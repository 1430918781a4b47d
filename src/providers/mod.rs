/*!
 * Backend implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - Google: the public Google Translate `gtx` endpoint
 * - OpenAI: OpenAI chat completions API
 * - Mock: scriptable in-process backend for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{AppError, ProviderError};

/// Common trait for all translation backends
///
/// Backends are interchangeable: the translator only relies on this single
/// capability and never inspects which service answered.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Translate `text` from `source_language` to `target_language`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or a classified failure
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Backend choice plus the credential it needs
#[derive(Debug, Clone, Default)]
pub struct BackendSelection {
    /// Which backend to call
    pub provider: TranslationProvider,
    /// API key, required by OpenAI only
    pub credential: Option<String>,
}

impl BackendSelection {
    /// Build a selection from the translation config
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            provider: config.provider,
            credential: config.get_api_key(),
        }
    }
}

/// Create the backend described by `selection`
///
/// A missing OpenAI credential is a configuration error. A present but
/// malformed one is accepted here and fails each attempt locally.
pub fn create_backend(
    selection: &BackendSelection,
    config: &TranslationConfig,
) -> Result<Arc<dyn TranslationBackend>, AppError> {
    match selection.provider {
        TranslationProvider::Google => Ok(Arc::new(google::Google::new(
            &config.google.endpoint,
            Duration::from_secs(config.google.timeout_secs),
        ))),
        TranslationProvider::OpenAI => {
            let api_key = selection
                .credential
                .as_deref()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Config("OpenAI translation requires an API key".to_string())
                })?;

            Ok(Arc::new(
                openai::OpenAI::new(api_key, &config.openai.endpoint, &config.openai.model)
                    .max_tokens(config.openai.max_tokens)
                    .temperature(config.common.temperature)
                    .max_chars(config.common.max_chars_per_request)
                    .timeout(Duration::from_secs(config.openai.timeout_secs)),
            ))
        }
    }
}

pub mod google;
pub mod mock;
pub mod openai;
