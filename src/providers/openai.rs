use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils;
use super::TranslationBackend;

/// Prefix every OpenAI secret key starts with
const API_KEY_PREFIX: &str = "sk-";

/// Marker appended to fragments cut down to the character budget
const TRUNCATION_MARKER: &str = "...";

/// OpenAI client for chat-completion based translation
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication, validated on every call
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model name
    model: String,
    /// Completion token budget
    max_tokens: u32,
    /// Sampling temperature
    temperature: f32,
    /// Longest fragment sent as-is
    max_chars: usize,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    pub model: String,

    /// The messages for the conversation
    pub messages: Vec<OpenAIMessage>,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,
}

/// Single completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// Generated message
    pub message: OpenAIMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u32,
    /// Number of completion tokens
    pub completion_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Completion choices, first one is used
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl OpenAIRequest {
    /// Create a new request for `model`
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens,
            temperature: 0.3,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Check the shape of an API key without contacting the service
pub fn validate_api_key(api_key: &str) -> Result<&str, ProviderError> {
    let api_key = api_key.trim();
    if api_key.starts_with(API_KEY_PREFIX) {
        Ok(api_key)
    } else {
        Err(ProviderError::InvalidCredentialFormat)
    }
}

/// Cut `text` to `max_chars` characters, appending a truncation marker
pub fn truncate_for_request(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// System prompt naming both languages
pub fn system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the following text from {} to {}. \
         Preserve the original formatting, punctuation, and meaning. \
         Do not translate URLs, email addresses, or technical terms that should remain unchanged. \
         Return only the translated text without any explanations.",
        language_utils::display_name(source_language),
        language_utils::display_name(target_language)
    )
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let timeout = Duration::from_secs(30);
        Self {
            client: Self::build_client(timeout),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            max_tokens: 1000,
            temperature: 0.3,
            max_chars: 3000,
        }
    }

    fn build_client(timeout: Duration) -> Client {
        Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default()
    }

    /// Set the completion token budget
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the fragment character budget
    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = Self::build_client(timeout);
        self
    }

    /// Build the chat request for one fragment
    pub fn build_request(&self, text: &str, source_language: &str, target_language: &str) -> OpenAIRequest {
        OpenAIRequest::new(self.model.clone(), self.max_tokens)
            .add_message("system", system_prompt(source_language, target_language))
            .add_message("user", truncate_for_request(text, self.max_chars))
            .temperature(self.temperature)
    }

    /// Send a chat completion request and classify the HTTP outcome
    pub async fn complete(&self, api_key: &str, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let api_url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        match status.as_u16() {
            200 => response
                .json::<OpenAIResponse>()
                .await
                .map_err(|e| ProviderError::ParseError(e.to_string())),
            401 => Err(ProviderError::AuthenticationError(
                "Invalid API key or authentication failed".to_string(),
            )),
            429 => Err(ProviderError::RateLimitExceeded(
                "Please wait a moment and try again.".to_string(),
            )),
            code => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to get error response text".to_string());
                error!("OpenAI API error ({}): {}", status, body);
                Err(ProviderError::ApiError {
                    status_code: code,
                    message: body,
                })
            }
        }
    }

    /// Extract the first choice's content, trimmed
    pub fn extract_text_from_response(response: &OpenAIResponse) -> Result<String, ProviderError> {
        let choice = response
            .choices
            .first()
            .ok_or_else(|| ProviderError::ParseError("response contained no choices".to_string()))?;

        Ok(choice
            .message
            .content
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

#[async_trait]
impl TranslationBackend for OpenAI {
    fn name(&self) -> &str {
        "openai"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let api_key = validate_api_key(&self.api_key)?;

        let request = self.build_request(text, source_language, target_language);
        let response = self.complete(api_key, &request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI usage: {} prompt + {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let translated = Self::extract_text_from_response(&response)?;
        if translated.is_empty() {
            return Ok(text.to_string());
        }

        Ok(translated)
    }
}
