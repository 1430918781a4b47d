/*!
 * Tests for language utility functions
 */

use docxlate::language_utils::{display_name, validate_language_code};

/// Test validation of language codes
#[test]
fn test_validateLanguageCode_withValidCodes_shouldSucceed() {
    for code in ["en", "de", "fr", " EN ", "zh-CN", "pt_BR"] {
        assert!(validate_language_code(code).is_ok(), "{:?} should be valid", code);
    }
}

#[test]
fn test_validateLanguageCode_withInvalidCodes_shouldFail() {
    for code in ["", "e", "eng", "xx", "english", "12"] {
        let err = validate_language_code(code).unwrap_err();
        assert!(err.to_string().contains("Invalid language code"), "{:?}: {}", code, err);
    }
}

#[test]
fn test_displayName_shouldPreferPromptNames() {
    assert_eq!(display_name("de"), "German");
    assert_eq!(display_name("zh-TW"), "Chinese");
    assert_eq!(display_name("nl"), "Dutch");
    assert_eq!(display_name("klingon"), "klingon");
}
