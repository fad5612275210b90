//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: problem records and training totals",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Category and daily statistics",
        up: MIGRATION_V2_UP,
    },
    Migration {
        version: 3,
        description: "Training session log",
        up: MIGRATION_V3_UP,
    },
    Migration {
        version: 4,
        description: "Learner reveals in the session log",
        up: MIGRATION_V4_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS problem_stats (
    problem_id TEXT PRIMARY KEY,

    -- Rows with NULL attempts or solved read back as "no record"
    attempts INTEGER DEFAULT 0,
    solved INTEGER DEFAULT 0,
    first_try_solved INTEGER DEFAULT 0,
    last_attempt TEXT,

    -- First time the problem was solved (distinct-solve counting)
    solved_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_problem_last_attempt ON problem_stats(last_attempt);

CREATE TABLE IF NOT EXISTS training_stats (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    total_problems INTEGER NOT NULL DEFAULT 0,
    total_correct INTEGER NOT NULL DEFAULT 0,
    total_attempts INTEGER NOT NULL DEFAULT 0,
    success_rate REAL NOT NULL DEFAULT 0.0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    best_streak INTEGER NOT NULL DEFAULT 0,
    last_update TEXT
);

INSERT OR IGNORE INTO training_stats (id) VALUES (1);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Category and daily statistics
const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS category_stats (
    category_type TEXT NOT NULL,
    category_value TEXT NOT NULL,
    total INTEGER NOT NULL DEFAULT 0,
    correct INTEGER NOT NULL DEFAULT 0,
    attempts INTEGER NOT NULL DEFAULT 0,
    last_update TEXT,
    PRIMARY KEY (category_type, category_value)
);

CREATE TABLE IF NOT EXISTS daily_stats (
    date TEXT PRIMARY KEY,
    problems INTEGER NOT NULL DEFAULT 0,
    correct INTEGER NOT NULL DEFAULT 0,
    attempts INTEGER NOT NULL DEFAULT 0
);

INSERT INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

/// V3: Training session log
const MIGRATION_V3_UP: &str = r#"
CREATE TABLE IF NOT EXISTS training_sessions (
    session_id TEXT PRIMARY KEY,
    start_time TEXT NOT NULL,
    end_time TEXT,
    total_attempts INTEGER NOT NULL DEFAULT 0,
    correct_answers INTEGER NOT NULL DEFAULT 0,
    completed_problems INTEGER NOT NULL DEFAULT 0,
    auto_revealed INTEGER NOT NULL DEFAULT 0,
    skipped INTEGER NOT NULL DEFAULT 0,
    problems_data TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_sessions_start ON training_sessions(start_time);

INSERT INTO schema_version (version, applied_at) VALUES (3, datetime('now'));
"#;

/// V4: Reveals requested by the learner, kept apart from skips
const MIGRATION_V4_UP: &str = r#"
ALTER TABLE training_sessions ADD COLUMN revealed INTEGER NOT NULL DEFAULT 0;

INSERT INTO schema_version (version, applied_at) VALUES (4, datetime('now'));
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
