/*!
 * Document translation.
 *
 * This module is split into several submodules:
 *
 * - `core`: the resilient per-fragment translator and its retry policy
 * - `walker`: the ordered walk over a document's paragraphs and table cells
 * - `observer`: progress and status reporting
 */

// Re-export main types for easier usage
pub use self::core::{
    FixedDelay, NoDelay, ResilientTranslator, RetryDelay, RetryPolicy, TranslationRequest,
};
pub use self::observer::{LogObserver, NoopObserver, ObserverEvent, RecordingObserver, TranslationObserver};
pub use self::walker::{DocumentWalker, WalkSummary, translate_document};

// Submodules
pub mod core;
pub mod observer;
pub mod walker;
