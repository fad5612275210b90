//! In-process performance store

use std::sync::Mutex;

use super::{AttemptRecord, PerformanceRecord, PerformanceStore, RecordSnapshot, Result, StorageError};
use crate::position::ProblemId;

/// Performance store backed by a `HashMap`
///
/// Nothing survives the process. Useful for tests and for practising
/// without touching the learner's history.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<RecordSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records
    pub fn with_records(records: RecordSnapshot) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Overwrite one record directly
    pub fn insert(&self, id: &ProblemId, record: PerformanceRecord) -> Result<()> {
        self.lock()?.insert(id.key(), record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, RecordSnapshot>> {
        self.records
            .lock()
            .map_err(|_| StorageError::Init("Record lock poisoned".into()))
    }
}

impl PerformanceStore for MemoryStore {
    fn get(&self, id: &ProblemId) -> Result<Option<PerformanceRecord>> {
        Ok(self.lock()?.get(&id.key()).cloned())
    }

    fn snapshot(&self) -> Result<RecordSnapshot> {
        Ok(self.lock()?.clone())
    }

    fn record_attempt(&self, attempt: &AttemptRecord) -> Result<PerformanceRecord> {
        let mut records = self.lock()?;
        let record = records.entry(attempt.problem_id.key()).or_default();
        record.apply_attempt(attempt.was_correct, attempt.at);
        Ok(record.clone())
    }

    fn reset(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}
