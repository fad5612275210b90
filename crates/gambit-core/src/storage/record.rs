//! Performance records and the store contract

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Result;
use crate::position::{ErrorType, PlayerColor, Position, ProblemId};
use crate::schedule::CompletionEvent;

/// Point-in-time view of every record, keyed by [`ProblemId::key`]
pub type RecordSnapshot = HashMap<String, PerformanceRecord>;

/// Historical performance on one problem
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    /// The most recent completed exposure was correct
    pub solved: bool,
    /// Completed exposures, across all sessions
    pub attempts: u32,
    /// Solved on the very first exposure; never cleared
    pub first_try_solved: bool,
    /// When the last exposure completed (`None` = unknown)
    pub last_attempt: Option<DateTime<Utc>>,
}

impl PerformanceRecord {
    /// Fold one completed exposure into the record
    pub fn apply_attempt(&mut self, was_correct: bool, at: DateTime<Utc>) {
        if self.attempts == 0 && was_correct {
            self.first_try_solved = true;
        }
        self.attempts = self.attempts.saturating_add(1);
        self.solved = was_correct;
        self.last_attempt = Some(at);
    }
}

/// One completed exposure, as written to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub problem_id: ProblemId,
    pub error_type: ErrorType,
    pub player_color: PlayerColor,
    pub was_correct: bool,
    /// Moves submitted during the exposure
    pub attempt_number: u32,
    pub was_auto_revealed: bool,
    pub at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn from_event(event: &CompletionEvent, position: &Position, at: DateTime<Utc>) -> Self {
        Self {
            problem_id: event.problem_id.clone(),
            error_type: position.error_type,
            player_color: position.player_color,
            was_correct: event.was_correct,
            attempt_number: event.attempts,
            was_auto_revealed: event.was_auto_revealed,
            at,
        }
    }
}

/// Keyed store of per-problem performance
///
/// The scheduler reads through [`snapshot`](Self::snapshot) and writes through
/// [`record_attempt`](Self::record_attempt). A write must be durable before
/// the next snapshot is taken.
pub trait PerformanceStore: Send + Sync {
    /// Record for one problem, `None` if never attempted
    fn get(&self, id: &ProblemId) -> Result<Option<PerformanceRecord>>;

    /// Every record, read at a single point in time
    fn snapshot(&self) -> Result<RecordSnapshot>;

    /// Apply a completed exposure and return the updated record
    fn record_attempt(&self, attempt: &AttemptRecord) -> Result<PerformanceRecord>;

    /// Delete all performance data
    fn reset(&self) -> Result<()>;
}

impl<S: PerformanceStore + ?Sized> PerformanceStore for Arc<S> {
    fn get(&self, id: &ProblemId) -> Result<Option<PerformanceRecord>> {
        (**self).get(id)
    }

    fn snapshot(&self) -> Result<RecordSnapshot> {
        (**self).snapshot()
    }

    fn record_attempt(&self, attempt: &AttemptRecord) -> Result<PerformanceRecord> {
        (**self).record_attempt(attempt)
    }

    fn reset(&self) -> Result<()> {
        (**self).reset()
    }
}
