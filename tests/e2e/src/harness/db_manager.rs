//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Databases pre-seeded with attempt history
//! - Reopening a database to check persistence
//! - Scheduler wiring with a controllable clock

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gambit_core::{
    AttemptRecord, FixedClock, PerformanceStore, Position, Scheduler, SchedulerConfig, Storage,
};
use tempfile::TempDir;

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// let clock = TestDataFactory::clock();
/// let scheduler = db.scheduler(clock.clone());
///
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// The storage instance, shared with schedulers built from this manager
    pub storage: Arc<Storage>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    ///
    /// The database is automatically deleted when the manager is dropped.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_gambit.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Check if the database holds no performance records
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Number of performance records
    pub fn record_count(&self) -> usize {
        self.storage.snapshot().map(|s| s.len()).unwrap_or(0)
    }

    /// Scheduler over this database with default caps
    pub fn scheduler(&self, clock: Arc<FixedClock>) -> Scheduler<Arc<Storage>, Arc<FixedClock>> {
        self.scheduler_with(clock, SchedulerConfig::default())
    }

    pub fn scheduler_with(
        &self,
        clock: Arc<FixedClock>,
        config: SchedulerConfig,
    ) -> Scheduler<Arc<Storage>, Arc<FixedClock>> {
        Scheduler::new(self.storage.clone(), clock, config)
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Replay completed exposures for one position, oldest first
    pub fn seed_history(&self, position: &Position, outcomes: &[(bool, DateTime<Utc>)]) {
        for &(was_correct, at) in outcomes {
            let attempt = AttemptRecord {
                problem_id: position.problem_id(),
                error_type: position.error_type,
                player_color: position.player_color,
                was_correct,
                attempt_number: 1,
                was_auto_revealed: !was_correct,
                at,
            };
            self.storage
                .record_attempt(&attempt)
                .expect("Failed to seed attempt");
        }
    }

    // ========================================================================
    // CLEANUP
    // ========================================================================

    /// Clear all data from the database
    pub fn clear(&mut self) {
        let _ = self.storage.reset();
    }

    /// Close and reopen the database at the same path
    ///
    /// Any scheduler still holding the old handle keeps working against it.
    pub fn reopen(&mut self) {
        self.storage = Arc::new(
            Storage::new(Some(self.db_path.clone())).expect("Failed to reopen storage"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::TestDataFactory;
    use chrono::Duration;

    #[test]
    fn test_temp_database_starts_empty() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn test_seed_history() {
        let db = TestDatabaseManager::new_temp();
        let corpus = TestDataFactory::corpus(2);
        let t = TestDataFactory::base_time();

        db.seed_history(&corpus.positions()[0], &[(false, t), (true, t + Duration::days(1))]);

        let record = db
            .storage
            .get(&corpus.positions()[0].problem_id())
            .unwrap()
            .unwrap();
        assert_eq!(record.attempts, 2);
        assert!(record.solved);
        assert!(!record.first_try_solved);
        assert_eq!(db.record_count(), 1);
    }

    #[test]
    fn test_reopen_persists() {
        let mut db = TestDatabaseManager::new_temp();
        let corpus = TestDataFactory::corpus(1);
        db.seed_history(&corpus.positions()[0], &[(true, TestDataFactory::base_time())]);

        db.reopen();
        assert_eq!(db.record_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut db = TestDatabaseManager::new_temp();
        let corpus = TestDataFactory::corpus(3);
        for position in corpus.positions() {
            db.seed_history(position, &[(true, TestDataFactory::base_time())]);
        }
        assert_eq!(db.record_count(), 3);

        db.clear();
        assert!(db.is_empty());
        assert_eq!(db.storage.get_stats().unwrap().total_problems, 0);
    }
}
