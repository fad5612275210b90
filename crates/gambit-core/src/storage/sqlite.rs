//! SQLite Storage Implementation
//!
//! Durable performance store. Besides the per-problem records it keeps the
//! aggregate statistics a trainer shows (totals and streaks, per-category and
//! per-day counts, a session log), all updated in the same transaction as
//! the record they derive from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    AttemptRecord, CategoryStats, DailyStats, ExportBundle, PerformanceRecord, PerformanceStore,
    ProblemResult, RecordSnapshot, Result, SessionRecord, StorageError, TrainingStats,
};
use crate::position::ProblemId;

/// Default database file name inside the data directory
pub const DB_FILE_NAME: &str = "gambit.db";

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite performance store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making Storage `Send + Sync` so a scheduler can
/// hold it behind an `Arc`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        // Apply encryption key if SQLCipher is enabled and key is provided
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("GAMBIT_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Platform data path for the database
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "gambit", "trainer").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        Ok(proj_dirs.data_dir().join(DB_FILE_NAME))
    }

    /// Open (or create) the store
    ///
    /// `None` uses the platform data directory.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let path = Self::default_path()?;
                if let Some(data_dir) = path.parent() {
                    std::fs::create_dir_all(data_dir)?;
                    // Restrict directory permissions to owner-only on Unix
                    #[cfg(unix)]
                    {
                        use std::os::unix::fs::PermissionsExt;
                        let perms = std::fs::Permissions::from_mode(0o700);
                        let _ = std::fs::set_permissions(data_dir, perms);
                    }
                }
                path
            }
        };

        // Open writer connection
        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        // Open reader connection to same path
        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        tracing::debug!(path = %path.display(), "Opened performance store");

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    /// Database file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    /// Parse a stored timestamp
    ///
    /// Accepts RFC 3339 and SQLite's `CURRENT_TIMESTAMP` format. Anything else
    /// reads as `None`, which the classifier treats as "always due".
    fn parse_timestamp(value: Option<String>, field_name: &str) -> Option<DateTime<Utc>> {
        let value = value?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }
        tracing::warn!("Unparseable {} timestamp '{}'", field_name, value);
        None
    }

    /// Convert a row to a record; malformed rows map to `None`
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Option<(String, PerformanceRecord)>> {
        let problem_id: String = row.get("problem_id")?;
        let attempts: Option<i64> = row.get("attempts")?;
        let solved: Option<i64> = row.get("solved")?;
        let first_try_solved: Option<i64> = row.get("first_try_solved")?;
        let last_attempt: Option<String> = row.get("last_attempt")?;

        let (Some(attempts), Some(solved)) = (attempts, solved) else {
            tracing::warn!(problem = %problem_id, "Ignoring malformed performance record");
            return Ok(None);
        };
        let Ok(attempts) = u32::try_from(attempts) else {
            tracing::warn!(problem = %problem_id, attempts, "Ignoring record with invalid attempt count");
            return Ok(None);
        };

        let record = PerformanceRecord {
            solved: solved != 0,
            attempts,
            first_try_solved: first_try_solved.unwrap_or(0) != 0,
            last_attempt: Self::parse_timestamp(last_attempt, "last_attempt"),
        };

        Ok(Some((problem_id, record)))
    }

    // ========================================================================
    // STATISTICS
    // ========================================================================

    /// Lifetime totals
    pub fn get_stats(&self) -> Result<TrainingStats> {
        let reader = self.reader()?;
        let stats = reader
            .query_row(
                "SELECT total_problems, total_correct, total_attempts, success_rate,
                        current_streak, best_streak, last_update
                 FROM training_stats WHERE id = 1",
                [],
                |row| {
                    Ok(TrainingStats {
                        total_problems: row.get(0)?,
                        total_correct: row.get(1)?,
                        total_attempts: row.get(2)?,
                        success_rate: row.get(3)?,
                        current_streak: row.get(4)?,
                        best_streak: row.get(5)?,
                        last_update: Self::parse_timestamp(row.get(6)?, "last_update"),
                    })
                },
            )
            .optional()?;
        Ok(stats.unwrap_or_default())
    }

    /// Per-category totals, ordered by category then value
    pub fn category_stats(&self) -> Result<Vec<CategoryStats>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT category_type, category_value, total, correct, attempts
             FROM category_stats ORDER BY category_type, category_value",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryStats {
                    category_type: row.get(0)?,
                    category_value: row.get(1)?,
                    total: row.get(2)?,
                    correct: row.get(3)?,
                    attempts: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Most recent `limit` days with activity, newest first
    pub fn daily_stats(&self, limit: u32) -> Result<Vec<DailyStats>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT date, problems, correct, attempts
             FROM daily_stats ORDER BY date DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                let date: String = row.get(0)?;
                let counts: (i64, i64, i64) = (row.get(1)?, row.get(2)?, row.get(3)?);
                Ok((date, counts))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(date, (problems, correct, attempts))| {
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()?;
                Some(DailyStats {
                    date,
                    problems,
                    correct,
                    attempts,
                })
            })
            .collect();
        Ok(rows)
    }

    // ========================================================================
    // SESSION LOG
    // ========================================================================

    /// Insert or replace a session log entry
    pub fn save_session(&self, session: &SessionRecord) -> Result<()> {
        let problems_json = serde_json::to_string(&session.problems)?;
        let writer = self.writer()?;
        writer.execute(
            "INSERT OR REPLACE INTO training_sessions (
                session_id, start_time, end_time, total_attempts, correct_answers,
                completed_problems, auto_revealed, skipped, problems_data, revealed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                session.session_id,
                session.start_time.to_rfc3339(),
                session.end_time.map(|t| t.to_rfc3339()),
                session.total_attempts,
                session.correct_answers,
                session.completed_problems,
                session.auto_revealed,
                session.skipped,
                problems_json,
                session.revealed,
            ],
        )?;
        Ok(())
    }

    /// Most recent `limit` sessions, newest first
    pub fn list_sessions(&self, limit: u32) -> Result<Vec<SessionRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT session_id, start_time, end_time, total_attempts, correct_answers,
                    completed_problems, auto_revealed, skipped, problems_data, revealed
             FROM training_sessions ORDER BY start_time DESC LIMIT ?1",
        )?;

        let sessions = stmt
            .query_map(params![limit], |row| {
                let session_id: String = row.get(0)?;
                let start_time: Option<String> = row.get(1)?;
                let end_time: Option<String> = row.get(2)?;
                let problems_data: String = row.get(8)?;

                let Some(start_time) = Self::parse_timestamp(start_time, "start_time") else {
                    return Ok(None);
                };
                let problems: Vec<ProblemResult> = serde_json::from_str(&problems_data)
                    .unwrap_or_else(|e| {
                        tracing::warn!(session = %session_id, "Unreadable problem list: {}", e);
                        Vec::new()
                    });

                Ok(Some(SessionRecord {
                    session_id,
                    start_time,
                    end_time: Self::parse_timestamp(end_time, "end_time"),
                    total_attempts: row.get(3)?,
                    correct_answers: row.get(4)?,
                    completed_problems: row.get(5)?,
                    auto_revealed: row.get(6)?,
                    revealed: row.get(9)?,
                    skipped: row.get(7)?,
                    problems,
                }))
            })?
            .filter_map(|r| r.ok().flatten())
            .collect();
        Ok(sessions)
    }

    // ========================================================================
    // MAINTENANCE
    // ========================================================================

    /// Everything the store holds
    pub fn export(&self, exported_at: DateTime<Utc>) -> Result<ExportBundle> {
        let problem_stats: BTreeMap<String, PerformanceRecord> = self.snapshot()?.into_iter().collect();

        Ok(ExportBundle {
            stats: self.get_stats()?,
            problem_stats,
            category_stats: self.category_stats()?,
            daily_stats: self.daily_stats(u32::MAX)?,
            sessions: self.list_sessions(u32::MAX)?,
            export_date: exported_at,
        })
    }

    /// Flush the WAL into the main database file
    pub fn checkpoint(&self) -> Result<()> {
        let writer = self.writer()?;
        writer.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

// ============================================================================
// PERFORMANCE STORE CONTRACT
// ============================================================================

impl PerformanceStore for Storage {
    fn get(&self, id: &ProblemId) -> Result<Option<PerformanceRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM problem_stats WHERE problem_id = ?1")?;

        let record = stmt
            .query_row(params![id.key()], |row| Self::row_to_record(row))
            .optional()?
            .flatten()
            .map(|(_, record)| record);
        Ok(record)
    }

    fn snapshot(&self) -> Result<RecordSnapshot> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM problem_stats")?;

        let mut snapshot = RecordSnapshot::new();
        let rows = stmt.query_map([], |row| Self::row_to_record(row))?;
        for row in rows {
            if let Some((key, record)) = row? {
                snapshot.insert(key, record);
            }
        }
        Ok(snapshot)
    }

    fn record_attempt(&self, attempt: &AttemptRecord) -> Result<PerformanceRecord> {
        let key = attempt.problem_id.key();
        let at = attempt.at.to_rfc3339();

        let mut writer = self.writer()?;
        let tx = writer.transaction()?;

        let existing = tx
            .query_row(
                "SELECT * FROM problem_stats WHERE problem_id = ?1",
                params![key],
                |row| {
                    let record = Self::row_to_record(row)?.map(|(_, r)| r);
                    let solved_at: Option<String> = row.get("solved_at")?;
                    Ok((record, solved_at))
                },
            )
            .optional()?;

        let (mut record, solved_at) = match existing {
            Some((record, solved_at)) => (record.unwrap_or_default(), solved_at),
            None => (PerformanceRecord::default(), None),
        };

        let newly_solved = attempt.was_correct && solved_at.is_none();
        let solved_at = if newly_solved { Some(at.clone()) } else { solved_at };
        record.apply_attempt(attempt.was_correct, attempt.at);

        tx.execute(
            "INSERT INTO problem_stats (
                problem_id, attempts, solved, first_try_solved, last_attempt, solved_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?5)
            ON CONFLICT(problem_id) DO UPDATE SET
                attempts = excluded.attempts,
                solved = excluded.solved,
                first_try_solved = excluded.first_try_solved,
                last_attempt = excluded.last_attempt,
                solved_at = excluded.solved_at",
            params![
                key,
                record.attempts,
                record.solved,
                record.first_try_solved,
                at,
                solved_at,
            ],
        )?;

        // Lifetime totals and streaks
        tx.execute("INSERT OR IGNORE INTO training_stats (id) VALUES (1)", [])?;
        let (total_correct, total_attempts, current_streak, best_streak): (i64, i64, i64, i64) = tx
            .query_row(
                "SELECT total_correct, total_attempts, current_streak, best_streak
                 FROM training_stats WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let total_attempts = total_attempts + 1;
        let (total_correct, current_streak) = if attempt.was_correct {
            (total_correct + 1, current_streak + 1)
        } else {
            (total_correct, 0)
        };
        let best_streak = best_streak.max(current_streak);
        let success_rate = total_correct as f64 / total_attempts as f64 * 100.0;

        tx.execute(
            "UPDATE training_stats SET
                total_problems = total_problems + ?1,
                total_correct = ?2,
                total_attempts = ?3,
                success_rate = ?4,
                current_streak = ?5,
                best_streak = ?6,
                last_update = ?7
             WHERE id = 1",
            params![
                newly_solved as i64,
                total_correct,
                total_attempts,
                success_rate,
                current_streak,
                best_streak,
                at,
            ],
        )?;

        // Per-category totals
        let categories = [
            ("error_type", attempt.error_type.as_str()),
            ("player_color", attempt.player_color.as_str()),
        ];
        for (category_type, category_value) in categories {
            tx.execute(
                "INSERT INTO category_stats (
                    category_type, category_value, total, correct, attempts, last_update
                ) VALUES (?1, ?2, ?3, ?4, 1, ?5)
                ON CONFLICT(category_type, category_value) DO UPDATE SET
                    total = total + excluded.total,
                    correct = correct + excluded.correct,
                    attempts = attempts + 1,
                    last_update = excluded.last_update",
                params![
                    category_type,
                    category_value,
                    newly_solved as i64,
                    attempt.was_correct as i64,
                    at,
                ],
            )?;
        }

        // Per-day totals
        tx.execute(
            "INSERT INTO daily_stats (date, problems, correct, attempts)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(date) DO UPDATE SET
                problems = problems + excluded.problems,
                correct = correct + excluded.correct,
                attempts = attempts + 1",
            params![
                attempt.at.date_naive().format("%Y-%m-%d").to_string(),
                newly_solved as i64,
                attempt.was_correct as i64,
            ],
        )?;

        tx.commit()?;

        tracing::debug!(
            problem = %key,
            correct = attempt.was_correct,
            attempts = record.attempts,
            "Recorded attempt"
        );

        Ok(record)
    }

    fn reset(&self) -> Result<()> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;

        for table in ["problem_stats", "category_stats", "daily_stats", "training_sessions"] {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }
        tx.execute(
            "UPDATE training_stats SET
                total_problems = 0, total_correct = 0, total_attempts = 0,
                success_rate = 0.0, current_streak = 0, best_streak = 0,
                last_update = NULL
             WHERE id = 1",
            [],
        )?;

        tx.commit()?;
        tracing::info!("Performance data reset");
        Ok(())
    }
}
