/*!
 * Database module for persistent usage tracking.
 *
 * This module provides SQLite-based persistence for:
 * - Per-user daily translation counters used for rate limiting
 * - A log of completed translations used for statistics
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{Analytics, LanguagePairCount, TranslationLogRecord, UserStats};
pub use repository::{DEFAULT_DAILY_LIMIT, UsageTracker};
