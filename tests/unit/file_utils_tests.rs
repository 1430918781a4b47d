/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use docxlate::file_utils::FileManager;
use crate::common;

/// Test that file_exists distinguishes files from directories
#[test]
fn test_fileExists_withFileAndDirectory_shouldOnlyAcceptFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = temp_dir.path().join("report.docx");
    fs::write(&file, b"x")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::file_exists("non_existent_file.docx"));
    Ok(())
}

#[test]
fn test_isTranslatedOutput_shouldMatchPrefixOnly() {
    assert!(FileManager::is_translated_output("/docs/translated_report.docx"));
    assert!(!FileManager::is_translated_output("/docs/report_translated.docx"));
    assert!(!FileManager::is_translated_output("/translated_dir/report.docx"));
}

/// Running the tool on its own output prefixes it again
#[test]
fn test_generateOutputPath_onTranslatedInput_shouldPrefixAgain() {
    let output = FileManager::generate_output_path(Path::new("translated_a.docx"), None);
    assert_eq!(output, Path::new("translated_translated_a.docx"));
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;
    assert!(nested.is_dir());
    Ok(())
}
