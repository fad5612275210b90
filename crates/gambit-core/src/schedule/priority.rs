//! Priority ranking of due positions
//!
//! score = 100
//!       + 10 × days overdue (only when overdue)
//!       + 50 if the last completed attempt failed
//!       + 5 × total attempts
//!       − 20 × mastery level
//!
//! Higher scores are reviewed first. Equal scores keep corpus order.

use super::classify::DaysSinceSeen;
use super::mastery::MasteryLevel;
use super::queue::QueueItem;
use crate::storage::PerformanceRecord;

/// Starting score for every due position
pub const BASE_PRIORITY: i64 = 100;

/// Bonus per day past the interval
pub const OVERDUE_WEIGHT: i64 = 10;

/// Bonus for positions whose last attempt failed
pub const UNSOLVED_BONUS: i64 = 50;

/// Bonus per recorded attempt
pub const ATTEMPT_WEIGHT: i64 = 5;

/// Penalty per mastery level
pub const MASTERY_WEIGHT: i64 = 20;

/// Priority score for a due position
pub fn priority_score(record: &PerformanceRecord, mastery: MasteryLevel, elapsed: DaysSinceSeen) -> i64 {
    let mut score = BASE_PRIORITY;

    let overdue = elapsed.effective_days() - mastery.interval_days() as i64;
    if overdue > 0 {
        score += overdue * OVERDUE_WEIGHT;
    }

    if !record.solved {
        score += UNSOLVED_BONUS;
    }

    score += record.attempts as i64 * ATTEMPT_WEIGHT;
    score -= mastery.value() as i64 * MASTERY_WEIGHT;

    score
}

/// Score and order due items, highest priority first
///
/// The sort is stable, so items with equal scores stay in the order they
/// arrived in (corpus order when fed straight from classification).
pub fn rank(mut due: Vec<QueueItem>) -> Vec<QueueItem> {
    for item in &mut due {
        item.priority = match (&item.record, item.mastery, item.days_since_seen) {
            (Some(record), Some(mastery), Some(elapsed)) => Some(priority_score(record, mastery, elapsed)),
            _ => Some(BASE_PRIORITY),
        };
    }

    due.sort_by(|a, b| b.priority.cmp(&a.priority));
    due
}
