use anyhow::Context;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::database::UsageTracker;
use crate::document::DocxDocument;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::providers::{self, BackendSelection, TranslationBackend};
use crate::translation::{
    DocumentWalker, LogObserver, ResilientTranslator, RetryPolicy, TranslationObserver, WalkSummary,
};

// @module: Application controller for document translation

/// Progress bar fed by the document walker
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} fragments ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        Self { bar }
    }
}

impl TranslationObserver for ProgressBarObserver {
    fn on_status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn on_progress(&self, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
    }

    fn on_warning(&self, message: &str) {
        self.bar.suspend(|| warn!("{}", message));
    }

    fn on_error(&self, message: &str) {
        self.bar.suspend(|| error!("{}", message));
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Result of a single-file run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The document was translated and written to `output`
    Translated { output: PathBuf, summary: WalkSummary },
    /// The output already existed and overwriting was not requested
    Skipped { output: PathBuf },
}

/// Counters from a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Files left untouched because the daily limit was reached
    pub not_attempted: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Backend choice and credential
    selection: BackendSelection,
    // @field: Daily usage counters
    tracker: UsageTracker,
    // @field: User the usage is counted against
    user_id: String,
    // @field: Backend used instead of the configured one
    backend_override: Option<Arc<dyn TranslationBackend>>,
    retry_policy: RetryPolicy,
    // @field: Terminal progress; None logs instead
    progress: Option<MultiProgress>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn new(config: Config, tracker: UsageTracker, user_id: impl Into<String>) -> Self {
        let selection = BackendSelection::from_config(&config.translation);
        let retry_policy = RetryPolicy::from_config(&config.translation.common);

        Self {
            config,
            selection,
            tracker,
            user_id: user_id.into(),
            backend_override: None,
            retry_policy,
            progress: None,
        }
    }

    /// Replace the backend selection derived from the configuration
    pub fn with_selection(mut self, selection: BackendSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Translate with `backend` regardless of the selection
    pub fn with_backend(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.backend_override = Some(backend);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Show indicatif progress bars while translating
    pub fn with_progress_bars(mut self) -> Self {
        self.progress = Some(MultiProgress::new());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    fn translator(&self) -> Result<ResilientTranslator, AppError> {
        let backend = match &self.backend_override {
            Some(backend) => Arc::clone(backend),
            None => providers::create_backend(&self.selection, &self.config.translation)?,
        };
        Ok(ResilientTranslator::new(backend, self.retry_policy.clone()))
    }

    /// Translate one `.docx` file
    ///
    /// The output is `translated_<name>` in `output_dir`, or next to the input.
    pub async fn run(
        &self,
        input_file: &Path,
        output_dir: Option<&Path>,
        force_overwrite: bool,
    ) -> Result<RunOutcome, AppError> {
        let start_time = Instant::now();

        if !FileManager::is_docx(input_file) {
            return Err(AppError::File(format!(
                "Unsupported file type: {:?}. Only .docx documents can be translated",
                input_file
            )));
        }
        if !FileManager::file_exists(input_file) {
            return Err(AppError::File(format!("Input file does not exist: {:?}", input_file)));
        }

        let output_path = FileManager::generate_output_path(input_file, output_dir);
        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, translation already exists (use -f to force overwrite)",
                input_file
            );
            return Ok(RunOutcome::Skipped { output: output_path });
        }

        let daily_limit = self.config.usage.daily_limit;
        if !self.tracker.can_translate(&self.user_id, daily_limit).await? {
            return Err(AppError::DailyLimitReached {
                user_id: self.user_id.clone(),
                limit: daily_limit,
            });
        }

        let mut document = DocxDocument::open(input_file)?;
        let translator = self.translator()?;
        info!(
            "Translating {:?} ({} -> {}) with {}",
            input_file,
            self.config.source_language,
            self.config.target_language,
            self.selection.provider.display_name()
        );

        let walker = DocumentWalker::new(translator);
        let observer: Box<dyn TranslationObserver> = match &self.progress {
            Some(multi) => Box::new(ProgressBarObserver::new(multi.add(ProgressBar::new(0)))),
            None => Box::new(LogObserver),
        };
        let summary = walker
            .translate_document(
                &mut document,
                &self.config.source_language,
                &self.config.target_language,
                observer.as_ref(),
            )
            .await?;

        let bytes = document.to_bytes()?;
        FileManager::write_atomic(&output_path, &bytes)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;

        let file_name = input_file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        self.tracker
            .increment_count(
                &self.user_id,
                &file_name,
                &self.config.source_language,
                &self.config.target_language,
                self.selection.provider.display_name(),
            )
            .await
            .context("Failed to record translation usage")?;

        let used = self.tracker.get_daily_count(&self.user_id).await?;
        info!(
            "Success: {} ({} of {} fragments changed, {} failed) in {}",
            output_path.display(),
            summary.changed,
            summary.total,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );
        info!("Daily usage: {}/{}", used, daily_limit);

        Ok(RunOutcome::Translated {
            output: output_path,
            summary,
        })
    }

    /// Translate every `.docx` file under a directory, next to its source
    ///
    /// Stops early once the daily limit is reached.
    pub async fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<FolderSummary, AppError> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(AppError::File(format!("Input directory does not exist: {:?}", input_dir)));
        }

        let files = FileManager::find_docx_files(input_dir)?;
        if files.is_empty() {
            return Err(AppError::File(format!("No .docx files found in directory: {:?}", input_dir)));
        }

        let folder_pb = match &self.progress {
            Some(multi) => {
                let bar = multi.add(ProgressBar::new(files.len() as u64));
                let style = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
                    .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
                    .unwrap_or_else(|_| ProgressStyle::default_bar());
                bar.set_style(style.progress_chars("█▓▒░"));
                bar
            }
            None => ProgressBar::hidden(),
        };

        let mut summary = FolderSummary::default();
        for (index, file) in files.iter().enumerate() {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run(file, None, force_overwrite).await {
                Ok(RunOutcome::Translated { .. }) => summary.translated += 1,
                Ok(RunOutcome::Skipped { .. }) => summary.skipped += 1,
                Err(e @ AppError::DailyLimitReached { .. }) => {
                    summary.not_attempted = files.len() - index;
                    folder_pb.suspend(|| warn!("{}; stopping folder run", e));
                    break;
                }
                Err(e) => {
                    folder_pb.suspend(|| error!("Error processing file {}: {}", file_name, e));
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();
        info!(
            "Folder processing completed: {} translated, {} skipped, {} errors, {} not attempted - Duration: {}",
            summary.translated,
            summary.skipped,
            summary.failed,
            summary.not_attempted,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
