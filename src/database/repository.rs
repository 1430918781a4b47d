/*!
 * Usage tracking on top of the SQLite connection.
 *
 * `UsageTracker` owns per-user daily counters and the translation log. It
 * is constructed explicitly and shared by reference; no global instance
 * exists.
 */

use anyhow::Result;
use chrono::{Local, NaiveDate};
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

use super::connection::DatabaseConnection;
use super::models::{Analytics, LanguagePairCount, TranslationLogRecord, UserStats};

/// Daily quota applied when none is configured
pub const DEFAULT_DAILY_LIMIT: u32 = 5;

/// Pairs listed in per-user stats
const USER_TOP_PAIRS: u32 = 5;

/// Pairs listed in global analytics
const GLOBAL_TOP_PAIRS: u32 = 10;

/// Local calendar day as stored in `daily_usage.date`
fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Per-user daily counters and translation log
#[derive(Debug, Clone)]
pub struct UsageTracker {
    /// Database connection
    db: DatabaseConnection,
}

impl UsageTracker {
    /// Create a new tracker with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a tracker with the default database location
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Create a tracker with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Translations recorded for `user_id` today
    pub async fn get_daily_count(&self, user_id: &str) -> Result<u32> {
        self.get_daily_count_on(user_id, today()).await
    }

    /// Translations recorded for `user_id` on `date`
    pub async fn get_daily_count_on(&self, user_id: &str, date: NaiveDate) -> Result<u32> {
        let user_id = user_id.to_string();
        let date = day_key(date);

        self.db
            .execute_async(move |conn| Self::daily_count_sync(conn, &user_id, &date))
            .await
    }

    fn daily_count_sync(conn: &Connection, user_id: &str, date: &str) -> Result<u32> {
        let count = conn
            .query_row(
                "SELECT translation_count FROM daily_usage WHERE user_id = ?1 AND date = ?2",
                params![user_id, date],
                |row| row.get::<_, u32>(0),
            )
            .optional()?;

        Ok(count.unwrap_or(0))
    }

    /// Whether `user_id` is still below `daily_limit` today
    pub async fn can_translate(&self, user_id: &str, daily_limit: u32) -> Result<bool> {
        let count = self.get_daily_count(user_id).await?;
        debug!("User {} has {} of {} translations today", user_id, count, daily_limit);
        Ok(count < daily_limit)
    }

    /// Count one translation for today and log it
    pub async fn increment_count(
        &self,
        user_id: &str,
        file_name: &str,
        src_lang: &str,
        dest_lang: &str,
        translation_method: &str,
    ) -> Result<()> {
        let record = TranslationLogRecord::new(user_id, file_name, src_lang, dest_lang, translation_method);
        self.record_translation_on(record, today()).await
    }

    /// Count `record` against `date` and append it to the log
    ///
    /// The counter upsert and the log insert share one transaction.
    pub async fn record_translation_on(&self, record: TranslationLogRecord, date: NaiveDate) -> Result<()> {
        let date = day_key(date);

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    r#"
                    INSERT INTO daily_usage (user_id, date, translation_count, last_used)
                    VALUES (?1, ?2, 1, ?3)
                    ON CONFLICT(user_id, date) DO UPDATE SET
                        translation_count = translation_count + 1,
                        last_used = excluded.last_used
                    "#,
                    params![record.user_id, date, record.created_at],
                )?;

                tx.execute(
                    r#"
                    INSERT INTO translations (
                        user_id, file_name, src_lang, dest_lang, translation_method, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        record.user_id,
                        record.file_name,
                        record.src_lang,
                        record.dest_lang,
                        record.translation_method,
                        record.created_at,
                    ],
                )?;

                Ok(())
            })
            .await
    }

    /// Logged translations for `user_id`, newest first
    pub async fn get_translations(&self, user_id: &str) -> Result<Vec<TranslationLogRecord>> {
        let user_id = user_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, user_id, file_name, src_lang, dest_lang, translation_method, created_at
                    FROM translations
                    WHERE user_id = ?1
                    ORDER BY id DESC
                    "#,
                )?;

                let records = stmt
                    .query_map([&user_id], |row| {
                        Ok(TranslationLogRecord {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            file_name: row.get(2)?,
                            src_lang: row.get(3)?,
                            dest_lang: row.get(4)?,
                            translation_method: row.get(5)?,
                            created_at: row.get(6)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(records)
            })
            .await
    }

    /// Totals, today's count, favourite pairs and first use for `user_id`
    pub async fn get_user_stats(&self, user_id: &str) -> Result<UserStats> {
        let user_id = user_id.to_string();
        let date = day_key(today());

        self.db
            .execute_async(move |conn| {
                let total_translations: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM translations WHERE user_id = ?1",
                    [&user_id],
                    |row| row.get(0),
                )?;

                let today_count = Self::daily_count_sync(conn, &user_id, &date)?;

                let popular_languages = Self::top_pairs_sync(
                    conn,
                    "WHERE user_id = ?1",
                    Some(user_id.as_str()),
                    USER_TOP_PAIRS,
                )?;

                let first_translation: Option<String> = conn.query_row(
                    "SELECT MIN(created_at) FROM translations WHERE user_id = ?1",
                    [&user_id],
                    |row| row.get(0),
                )?;

                Ok(UserStats {
                    total_translations: total_translations as u64,
                    today_count,
                    popular_languages,
                    first_translation,
                })
            })
            .await
    }

    /// Figures across all users
    pub async fn get_analytics(&self) -> Result<Analytics> {
        let date = day_key(today());

        self.db
            .execute_async(move |conn| {
                let (total_users, total_translations): (i64, i64) = conn.query_row(
                    "SELECT COUNT(DISTINCT user_id), COUNT(*) FROM translations",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;

                let active_today: i64 = conn.query_row(
                    "SELECT COUNT(DISTINCT user_id) FROM daily_usage WHERE date = ?1",
                    [&date],
                    |row| row.get(0),
                )?;

                let popular_pairs = Self::top_pairs_sync(conn, "", None, GLOBAL_TOP_PAIRS)?;

                Ok(Analytics {
                    total_users: total_users as u64,
                    total_translations: total_translations as u64,
                    active_today: active_today as u64,
                    popular_pairs,
                })
            })
            .await
    }

    fn top_pairs_sync(
        conn: &Connection,
        filter: &str,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<LanguagePairCount>> {
        let sql = format!(
            r#"
            SELECT src_lang, dest_lang, COUNT(*) AS uses
            FROM translations
            {}
            GROUP BY src_lang, dest_lang
            ORDER BY uses DESC, src_lang, dest_lang
            LIMIT {}
            "#,
            filter, limit
        );
        let mut stmt = conn.prepare(&sql)?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<LanguagePairCount> {
            Ok(LanguagePairCount {
                src_lang: row.get(0)?,
                dest_lang: row.get(1)?,
                count: row.get::<_, i64>(2)? as u64,
            })
        };

        let pairs = match user_id {
            Some(user_id) => stmt.query_map([user_id], map_row)?.collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt.query_map([], map_row)?.collect::<rusqlite::Result<Vec<_>>>()?,
        };

        Ok(pairs)
    }
}
