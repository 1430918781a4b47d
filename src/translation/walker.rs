/*!
 * Document walk: visit every fragment once, translate, write back.
 */

use log::{debug, info};
use std::time::Instant;

use crate::app_config::TranslationConfig;
use crate::document::TextDocument;
use crate::errors::{AppError, DocumentError};
use crate::providers::{self, BackendSelection};
use super::core::{ResilientTranslator, RetryPolicy, TranslationRequest};
use super::observer::TranslationObserver;

/// Counters from one document walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Non-blank fragments found up front
    pub total: usize,
    /// Fragments visited, including failed write-backs
    pub processed: usize,
    /// Fragments whose text was replaced
    pub changed: usize,
    /// Fragments whose write-back failed
    pub failed: usize,
}

/// Drives a `ResilientTranslator` over a document
#[derive(Debug, Clone)]
pub struct DocumentWalker {
    translator: ResilientTranslator,
}

impl DocumentWalker {
    pub fn new(translator: ResilientTranslator) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &ResilientTranslator {
        &self.translator
    }

    /// Translate every non-blank paragraph, then every non-blank table cell
    ///
    /// Fragments are visited in document order and replaced in place. A
    /// failed write-back is reported and counted, and the walk continues.
    pub async fn translate_document<D: TextDocument + ?Sized>(
        &self,
        document: &mut D,
        source_language: &str,
        target_language: &str,
        observer: &dyn TranslationObserver,
    ) -> Result<WalkSummary, DocumentError> {
        let start_time = Instant::now();
        let fragments: Vec<_> = document
            .fragments()?
            .into_iter()
            .filter(|fragment| !fragment.is_blank())
            .collect();

        let mut summary = WalkSummary {
            total: fragments.len(),
            ..WalkSummary::default()
        };
        info!(
            "Translating {} fragments {} -> {} with {}",
            summary.total,
            source_language,
            target_language,
            self.translator.backend_name()
        );

        for fragment in &fragments {
            let label = fragment.location.kind_label();
            observer.on_status(&format!(
                "Translating {} {}/{}...",
                label,
                summary.processed + 1,
                summary.total
            ));

            let request = TranslationRequest::new(&fragment.text, source_language, target_language);
            let translated = self.translator.translate(&request, observer).await;

            if translated != fragment.text {
                match document.set_text_at(fragment.location, &translated) {
                    Ok(()) => summary.changed += 1,
                    Err(e) => {
                        summary.failed += 1;
                        observer.on_error(&format!("Error translating {}: {}", label, e));
                    }
                }
            }

            summary.processed += 1;
            observer.on_progress(summary.processed, summary.total);
        }

        observer.on_finish();
        debug!(
            "Walk finished in {:?}: {} changed, {} failed",
            start_time.elapsed(),
            summary.changed,
            summary.failed
        );

        Ok(summary)
    }
}

/// Translate `document` with the backend described by `selection`
///
/// The backend is built once for the whole document.
pub async fn translate_document<D: TextDocument + ?Sized>(
    document: &mut D,
    source_language: &str,
    target_language: &str,
    selection: &BackendSelection,
    config: &TranslationConfig,
    observer: &dyn TranslationObserver,
) -> Result<WalkSummary, AppError> {
    let backend = providers::create_backend(selection, config)?;
    let translator = ResilientTranslator::new(backend, RetryPolicy::from_config(&config.common));

    let summary = DocumentWalker::new(translator)
        .translate_document(document, source_language, target_language, observer)
        .await?;

    Ok(summary)
}
