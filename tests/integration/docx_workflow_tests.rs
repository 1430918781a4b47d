/*!
 * End-to-end tests translating real .docx packages
 */

use anyhow::Result;
use std::io::{Cursor, Read};
use std::sync::Arc;
use zip::ZipArchive;

use docxlate::app_config::{TranslationConfig, TranslationProvider};
use docxlate::document::{DocxDocument, TextDocument};
use docxlate::providers::BackendSelection;
use docxlate::providers::mock::MockBackend;
use docxlate::translation::{self, DocumentWalker, RecordingObserver, ResilientTranslator, RetryPolicy};
use crate::common::{self, DocxBuilder};

fn dictionary_walker(backend: &MockBackend) -> DocumentWalker {
    DocumentWalker::new(ResilientTranslator::new(
        Arc::new(backend.clone()),
        RetryPolicy::without_delay(3),
    ))
}

fn read_entry(package: &[u8], name: &str) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let mut content = String::new();
    archive.by_name(name)?.read_to_string(&mut content)?;
    Ok(content)
}

/// A single paragraph is translated and written back into the package
#[tokio::test]
async fn test_translateDocx_singleParagraph_shouldReplaceText() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = DocxBuilder::new().paragraph("Hello").write_to(temp_dir.path(), "hello.docx")?;

    let backend = MockBackend::with_translations([("Hello", "Hallo")]);
    let mut document = DocxDocument::open(&input)?;
    let summary = dictionary_walker(&backend)
        .translate_document(&mut document, "en", "de", &RecordingObserver::new())
        .await?;
    assert_eq!(summary.changed, 1);

    let output = temp_dir.path().join("translated_hello.docx");
    document.save(&output)?;

    assert_eq!(common::fragment_texts(&output)?, vec!["Hallo"]);
    let package = std::fs::read(&output)?;
    let xml = read_entry(&package, "word/document.xml")?;
    assert!(xml.contains("<w:rPr><w:i/></w:rPr>"), "run formatting should survive: {}", xml);
    assert!(read_entry(&package, "word/styles.xml")?.contains("w:styles"));
    Ok(())
}

/// Text split over several runs lands in the first run
#[tokio::test]
async fn test_translateDocx_splitRuns_shouldCollapseIntoFirstRun() -> Result<()> {
    let backend = MockBackend::with_translations([("Good morning", "Guten Morgen")]);
    let mut document = DocxDocument::from_bytes(DocxBuilder::new().split_paragraph(&["Good ", "mor", "ning"]).build())?;
    assert_eq!(document.paragraph_text(0)?, "Good morning");

    dictionary_walker(&backend)
        .translate_document(&mut document, "en", "de", &RecordingObserver::new())
        .await?;

    let reopened = DocxDocument::from_bytes(document.to_bytes()?)?;
    assert_eq!(reopened.paragraph_text(0)?, "Guten Morgen");
    Ok(())
}

/// A line break must not glue words together and hide the paragraph from translation
#[tokio::test]
async fn test_translateDocx_paragraphWithBreak_shouldTranslateAndKeepBreak() -> Result<()> {
    let backend = MockBackend::with_translations([("Total amount.\nPlease pay", "Gesamtbetrag.\nBitte zahlen")]);
    let mut document = DocxDocument::from_bytes(
        DocxBuilder::new()
            .paragraph_with_breaks(&["Total amount.", "Please pay"])
            .build(),
    )?;

    let summary = dictionary_walker(&backend)
        .translate_document(&mut document, "en", "de", &RecordingObserver::new())
        .await?;

    assert_eq!(summary.changed, 1);
    assert_eq!(backend.call_count(), 1);
    let package = document.to_bytes()?;
    let reopened = DocxDocument::from_bytes(package.clone())?;
    assert_eq!(reopened.paragraph_text(0)?, "Gesamtbetrag.\nBitte zahlen");
    assert!(read_entry(&package, "word/document.xml")?.contains("<w:br/>"));
    Ok(())
}

/// Multi-line cells keep one paragraph per line
#[tokio::test]
async fn test_translateDocx_tableCell_shouldDistributeLines() -> Result<()> {
    let backend = MockBackend::with_translations([
        ("Line one\nLine two", "Zeile eins\nZeile zwei"),
        ("Header", "Kopfzeile"),
    ]);
    let package = DocxBuilder::new()
        .paragraph("Header")
        .table(&[&["Line one\nLine two", "42"]])
        .build();
    let mut document = DocxDocument::from_bytes(package)?;

    let summary = dictionary_walker(&backend)
        .translate_document(&mut document, "en", "de", &RecordingObserver::new())
        .await?;
    assert_eq!(summary.total, 3);
    assert_eq!(summary.changed, 2);

    let reopened = DocxDocument::from_bytes(document.to_bytes()?)?;
    assert_eq!(reopened.paragraph_text(0)?, "Kopfzeile");
    assert_eq!(reopened.cell_text(0, 0, 0)?, "Zeile eins\nZeile zwei");
    assert_eq!(reopened.cell_text(0, 0, 1)?, "42");
    Ok(())
}

/// A document without text comes back byte for byte
#[tokio::test]
async fn test_translateDocx_blankDocument_shouldBeUnchanged() -> Result<()> {
    let package = DocxBuilder::new().paragraph("").paragraph("   ").table(&[&[""]]).build();
    let backend = MockBackend::working();
    let mut document = DocxDocument::from_bytes(package.clone())?;

    let summary = dictionary_walker(&backend)
        .translate_document(&mut document, "en", "de", &RecordingObserver::new())
        .await?;

    assert_eq!(summary.total, 0);
    assert_eq!(backend.call_count(), 0);
    assert!(!document.is_dirty());
    assert_eq!(document.to_bytes()?, package);
    Ok(())
}

/// A malformed OpenAI key fails every attempt locally and keeps the text
#[tokio::test]
async fn test_translateDocument_openAiWithBadKey_shouldKeepOriginalText() -> Result<()> {
    let mut config = TranslationConfig::default();
    config.provider = TranslationProvider::OpenAI;
    config.common.retry_delay_ms = 0;
    // Nothing listens here; a request would fail with a connection error instead
    config.openai.endpoint = "http://127.0.0.1:9".to_string();

    let selection = BackendSelection {
        provider: TranslationProvider::OpenAI,
        credential: Some("bad-key".to_string()),
    };
    let observer = RecordingObserver::new();
    let mut document = DocxDocument::from_bytes(DocxBuilder::new().paragraph("Hello").build())?;

    let summary =
        translation::translate_document(&mut document, "en", "de", &selection, &config, &observer).await?;

    assert_eq!(summary.changed, 0);
    assert_eq!(document.paragraph_text(0)?, "Hello");
    let warnings = observer.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Invalid API key format"), "{}", warnings[0]);
    Ok(())
}
