/*!
 * Database entity models and DTOs.
 *
 * These structures map to rows of the usage tables and to the aggregates
 * computed from them.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// One completed document translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationLogRecord {
    /// Row id (assigned by the database)
    pub id: Option<i64>,
    /// User who ran the translation
    pub user_id: String,
    /// Name of the translated input file
    pub file_name: String,
    /// Source language code
    pub src_lang: String,
    /// Target language code
    pub dest_lang: String,
    /// Backend display name, e.g. "Google Translate"
    pub translation_method: String,
    /// Local timestamp (RFC 3339)
    pub created_at: String,
}

impl TranslationLogRecord {
    /// Create a new log record stamped with the current local time
    pub fn new(
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        src_lang: impl Into<String>,
        dest_lang: impl Into<String>,
        translation_method: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            file_name: file_name.into(),
            src_lang: src_lang.into(),
            dest_lang: dest_lang.into(),
            translation_method: translation_method.into(),
            created_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

/// How often a language pair was used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePairCount {
    pub src_lang: String,
    pub dest_lang: String,
    pub count: u64,
}

impl fmt::Display for LanguagePairCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {}", self.src_lang, self.dest_lang, self.count)
    }
}

/// Usage figures for a single user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Documents translated over all time
    pub total_translations: u64,
    /// Documents translated today
    pub today_count: u32,
    /// Up to five most used pairs, most used first
    pub popular_languages: Vec<LanguagePairCount>,
    /// Timestamp of the first translation, if any
    pub first_translation: Option<String>,
}

/// Usage figures across all users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    /// Distinct users with at least one translation
    pub total_users: u64,
    /// Documents translated over all time
    pub total_translations: u64,
    /// Users who translated something today
    pub active_today: u64,
    /// Up to ten most used pairs, most used first
    pub popular_pairs: Vec<LanguagePairCount>,
}

impl fmt::Display for UserStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total translations: {}, Today: {}, First: {}",
            self.total_translations,
            self.today_count,
            self.first_translation.as_deref().unwrap_or("never")
        )
    }
}

impl fmt::Display for Analytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Users: {}, Translations: {}, Active today: {}",
            self.total_users, self.total_translations, self.active_today
        )
    }
}
