/*!
 * # docxlate
 *
 * A Rust library for translating the text of Word (`.docx`) documents in place.
 *
 * ## Features
 *
 * - Translate every paragraph and table cell of a document, keeping its formatting
 * - Translation backends:
 *   - Google Translate (public `gtx` endpoint)
 *   - OpenAI chat completions
 * - Retries with a fixed delay; untranslatable fragments keep their original text
 * - Hyperlinks and very short fragments are left untouched
 * - Per-user daily translation limits backed by SQLite
 * - ISO 639-1 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: The `TextDocument` abstraction, `.docx` and in-memory documents
 * - `translation`: Document translation:
 *   - `translation::core`: Resilient per-fragment translator and retry policy
 *   - `translation::walker`: Ordered walk over paragraphs and table cells
 *   - `translation::observer`: Progress and status reporting
 * - `link_detector`: Recognises fragments that are links
 * - `providers`: Translation backends:
 *   - `providers::google`: Google Translate client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::mock`: Scriptable backend for tests
 * - `database`: SQLite usage tracker
 * - `identity`: Stable anonymous user ids
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod identity;
pub mod language_utils;
pub mod link_detector;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOutcome};
pub use database::UsageTracker;
pub use document::{DocxDocument, MemoryDocument, TextDocument};
pub use errors::{AppError, DocumentError, ProviderError};
pub use link_detector::is_link;
pub use providers::{BackendSelection, TranslationBackend};
pub use translation::{DocumentWalker, ResilientTranslator, RetryPolicy, translate_document};
