//! Aggregate training statistics kept alongside the performance records

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::PerformanceRecord;
use crate::schedule::OverrideKind;

/// Lifetime totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    /// Distinct problems solved at least once
    pub total_problems: i64,
    /// Correct exposures
    pub total_correct: i64,
    /// Completed exposures
    pub total_attempts: i64,
    /// Correct / attempts, as a percentage
    pub success_rate: f64,
    /// Consecutive correct exposures, up to the latest
    pub current_streak: i64,
    pub best_streak: i64,
    pub last_update: Option<DateTime<Utc>>,
}

/// Totals for one category value (e.g. `error_type = blunder`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category_type: String,
    pub category_value: String,
    /// Distinct problems in this category solved for the first time
    pub total: i64,
    pub correct: i64,
    pub attempts: i64,
}

/// Totals for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    /// Problems solved for the first time that day
    pub problems: i64,
    pub correct: i64,
    pub attempts: i64,
}

/// How one problem went in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemResult {
    pub problem_id: String,
    pub was_correct: bool,
    pub attempts: u32,
    pub auto_revealed: bool,
    /// How the learner ended the exposure, if a move did not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_kind: Option<OverrideKind>,
}

/// Logged training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Moves submitted across all exposures
    pub total_attempts: i64,
    pub correct_answers: i64,
    pub completed_problems: i64,
    pub auto_revealed: i64,
    /// Answers shown on request
    #[serde(default)]
    pub revealed: i64,
    pub skipped: i64,
    pub problems: Vec<ProblemResult>,
}

/// Everything the store knows, for backup or analysis elsewhere
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub stats: TrainingStats,
    pub problem_stats: BTreeMap<String, PerformanceRecord>,
    pub category_stats: Vec<CategoryStats>,
    pub daily_stats: Vec<DailyStats>,
    pub sessions: Vec<SessionRecord>,
    pub export_date: DateTime<Utc>,
}
