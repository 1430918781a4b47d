/*!
 * Controller runs: output files, usage accounting and the daily limit
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use docxlate::app_config::{Config, TranslationProvider};
use docxlate::app_controller::{Controller, FolderSummary, RunOutcome};
use docxlate::database::UsageTracker;
use docxlate::errors::AppError;
use docxlate::providers::mock::MockBackend;
use docxlate::translation::RetryPolicy;
use crate::common::{self, DocxBuilder};

fn controller(config: Config, tracker: &UsageTracker, backend: &MockBackend) -> Controller {
    Controller::new(config, tracker.clone(), "tester")
        .with_backend(Arc::new(backend.clone()))
        .with_retry_policy(RetryPolicy::without_delay(3))
}

fn write_sample(dir: &Path, name: &str) -> Result<std::path::PathBuf> {
    DocxBuilder::new()
        .paragraph("Hello")
        .table(&[&["Goodbye"]])
        .write_to(dir, name)
}

#[tokio::test]
async fn test_run_shouldWriteOutputAndCountUsage() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = write_sample(temp_dir.path(), "letter.docx")?;
    let tracker = UsageTracker::new_in_memory()?;
    let backend = MockBackend::with_translations([("Hello", "Hallo"), ("Goodbye", "Auf Wiedersehen")]);

    let outcome = controller(common::test_config(temp_dir.path()), &tracker, &backend)
        .run(&input, None, false)
        .await?;

    let output = temp_dir.path().join("translated_letter.docx");
    match outcome {
        RunOutcome::Translated { output: written, summary } => {
            assert_eq!(written, output);
            assert_eq!(summary.changed, 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(common::fragment_texts(&output)?, vec!["Hallo", "Auf Wiedersehen"]);
    assert_eq!(common::fragment_texts(&input)?, vec!["Hello", "Goodbye"]);

    assert_eq!(tracker.get_daily_count("tester").await?, 1);
    let log = tracker.get_translations("tester").await?;
    assert_eq!(log[0].file_name, "letter.docx");
    assert_eq!((log[0].src_lang.as_str(), log[0].dest_lang.as_str()), ("en", "de"));
    assert_eq!(log[0].translation_method, "Google Translate");
    Ok(())
}

#[tokio::test]
async fn test_run_withOutputDir_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_sample(temp_dir.path(), "letter.docx")?;
    let out_dir = temp_dir.path().join("out");
    let tracker = UsageTracker::new_in_memory()?;

    controller(common::test_config(temp_dir.path()), &tracker, &MockBackend::working())
        .run(&input, Some(&out_dir), false)
        .await?;

    assert!(out_dir.join("translated_letter.docx").is_file());
    assert!(!temp_dir.path().join("translated_letter.docx").exists());
    Ok(())
}

/// The limit is checked before any translation work
#[tokio::test]
async fn test_run_atDailyLimit_shouldFailWithoutTranslating() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_sample(temp_dir.path(), "letter.docx")?;
    let tracker = UsageTracker::new_in_memory()?;
    for i in 0..2 {
        tracker
            .increment_count("tester", &format!("{}.docx", i), "en", "de", "Google Translate")
            .await?;
    }

    let mut config = common::test_config(temp_dir.path());
    config.usage.daily_limit = 2;
    let backend = MockBackend::working();

    let result = controller(config, &tracker, &backend).run(&input, None, false).await;

    match result {
        Err(AppError::DailyLimitReached { user_id, limit }) => {
            assert_eq!(user_id, "tester");
            assert_eq!(limit, 2);
        }
        other => panic!("expected daily limit error, got {:?}", other),
    }
    assert_eq!(backend.call_count(), 0);
    assert!(!temp_dir.path().join("translated_letter.docx").exists());
    assert_eq!(tracker.get_daily_count("tester").await?, 2);
    Ok(())
}

/// Other users are not affected by someone else's limit
#[tokio::test]
async fn test_run_limitIsPerUser() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_sample(temp_dir.path(), "letter.docx")?;
    let tracker = UsageTracker::new_in_memory()?;
    tracker.increment_count("someone-else", "x.docx", "en", "de", "OpenAI").await?;

    let mut config = common::test_config(temp_dir.path());
    config.usage.daily_limit = 1;

    let outcome = controller(config, &tracker, &MockBackend::working())
        .run(&input, None, false)
        .await?;
    assert!(matches!(outcome, RunOutcome::Translated { .. }));
    Ok(())
}

#[tokio::test]
async fn test_run_existingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_sample(temp_dir.path(), "letter.docx")?;
    let existing = temp_dir.path().join("translated_letter.docx");
    fs::write(&existing, b"old")?;
    let tracker = UsageTracker::new_in_memory()?;
    let backend = MockBackend::working();
    let controller = controller(common::test_config(temp_dir.path()), &tracker, &backend);

    let outcome = controller.run(&input, None, false).await?;
    assert!(matches!(outcome, RunOutcome::Skipped { .. }));
    assert_eq!(fs::read(&existing)?, b"old");
    assert_eq!(tracker.get_daily_count("tester").await?, 0);

    let outcome = controller.run(&input, None, true).await?;
    assert!(matches!(outcome, RunOutcome::Translated { .. }));
    assert_eq!(common::fragment_texts(&existing)?, vec!["[de] Hello", "[de] Goodbye"]);
    Ok(())
}

/// A corrupt package is a whole-operation failure and is not counted
#[tokio::test]
async fn test_run_withCorruptDocument_shouldFailWithDocumentError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("broken.docx");
    fs::write(&input, b"this is not a zip archive")?;
    let tracker = UsageTracker::new_in_memory()?;

    let result = controller(common::test_config(temp_dir.path()), &tracker, &MockBackend::working())
        .run(&input, None, false)
        .await;

    assert!(matches!(result, Err(AppError::Document(_))), "{:?}", result);
    assert_eq!(tracker.get_daily_count("tester").await?, 0);
    Ok(())
}

/// OpenAI without a key is rejected before the document is touched
#[tokio::test]
async fn test_run_openAiWithoutKey_shouldBeConfigError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = write_sample(temp_dir.path(), "letter.docx")?;
    let mut config = common::test_config(temp_dir.path());
    config.translation.provider = TranslationProvider::OpenAI;

    let result = Controller::new(config, UsageTracker::new_in_memory()?, "tester")
        .with_retry_policy(RetryPolicy::without_delay(1))
        .run(&input, None, false)
        .await;

    assert!(matches!(result, Err(AppError::Config(_))), "{:?}", result);
    assert!(!temp_dir.path().join("translated_letter.docx").exists());
    Ok(())
}

/// Folder runs stop once the daily limit is used up
#[tokio::test]
async fn test_runFolder_shouldStopAtDailyLimit() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for name in ["a.docx", "b.docx", "c.docx", "d.docx"] {
        write_sample(temp_dir.path(), name)?;
    }
    let tracker = UsageTracker::new_in_memory()?;
    let mut config = common::test_config(temp_dir.path());
    config.usage.daily_limit = 2;

    let summary = controller(config, &tracker, &MockBackend::working())
        .run_folder(temp_dir.path(), false)
        .await?;

    assert_eq!(
        summary,
        FolderSummary { translated: 2, skipped: 0, failed: 0, not_attempted: 2 }
    );
    assert!(temp_dir.path().join("translated_a.docx").exists());
    assert!(temp_dir.path().join("translated_b.docx").exists());
    assert!(!temp_dir.path().join("translated_c.docx").exists());
    assert_eq!(tracker.get_daily_count("tester").await?, 2);
    Ok(())
}

/// A second folder run skips outputs and never re-translates them
#[tokio::test]
async fn test_runFolder_secondRun_shouldSkipExistingOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_sample(temp_dir.path(), "a.docx")?;
    write_sample(temp_dir.path(), "b.docx")?;
    let tracker = UsageTracker::new_in_memory()?;
    let controller = controller(common::test_config(temp_dir.path()), &tracker, &MockBackend::working());

    let first = controller.run_folder(temp_dir.path(), false).await?;
    assert_eq!(first.translated, 2);

    let second = controller.run_folder(temp_dir.path(), false).await?;
    assert_eq!(second, FolderSummary { translated: 0, skipped: 2, failed: 0, not_attempted: 0 });
    assert!(!temp_dir.path().join("translated_translated_a.docx").exists());
    Ok(())
}
