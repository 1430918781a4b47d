/*!
 * Error types for the docxlate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when calling a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The credential does not look like an API key; no request was made
    #[error("Invalid API key format")]
    InvalidCredentialFormat,

    /// The backend rejected the credential
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Response body or error message from the API
        message: String,
    },

    /// Network-level failure (DNS, TLS, timeout, connection reset)
    #[error("Network error: {0}")]
    ConnectionError(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error when building or sending an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),
}

impl ProviderError {
    /// Map a reqwest transport error onto the backend error taxonomy
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::RequestFailed(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::ConnectionError(error.to_string())
        }
    }
}

/// Errors that can occur while reading or rewriting a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file is not a readable zip package
    #[error("Invalid document package: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The main document part is not well-formed XML
    #[error("Malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A required package part is missing
    #[error("Document part not found: {0}")]
    MissingPart(String),

    /// A fragment location does not exist in the document
    #[error("No such location in document: {0}")]
    InvalidLocation(String),

    /// Text was written to a fragment that has no text run to hold it
    #[error("Fragment at {0} has no text run to receive text")]
    NoTextRun(String),

    /// Reading or writing the file failed
    #[error("Document I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a backend
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from loading or saving a document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The user has used up today's translations
    #[error("Daily limit of {limit} translations reached for user {user_id}")]
    DailyLimitReached {
        /// User the limit applies to
        user_id: String,
        /// Configured daily limit
        limit: u32,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
