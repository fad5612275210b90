//! Due-ness classification
//!
//! Splits the active corpus into three buckets:
//! - **New**: no performance record yet
//! - **Due**: elapsed days reached the mastery interval, or mastery is 0
//! - **Not-Due**: seen too recently; left out of the session

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::interval::max_interval_days;
use super::mastery::{mastery_level, MasteryLevel};
use super::queue::QueueItem;
use crate::position::Position;
use crate::storage::{PerformanceRecord, RecordSnapshot};

/// Whole days since a position was last attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "days")]
pub enum DaysSinceSeen {
    /// Calendar days between the last attempt and today
    Days(i64),
    /// No usable timestamp (never recorded, unparseable, or in the future).
    /// Always counts as due.
    Infinite,
}

impl DaysSinceSeen {
    /// Days since `last_attempt`, measured in UTC calendar days
    pub fn between(last_attempt: Option<DateTime<Utc>>, today: NaiveDate) -> Self {
        let Some(last) = last_attempt else {
            return DaysSinceSeen::Infinite;
        };

        let days = (today - last.date_naive()).num_days();
        if days < 0 {
            tracing::warn!(
                last_attempt = %last,
                today = %today,
                "Last attempt is in the future; treating position as due"
            );
            return DaysSinceSeen::Infinite;
        }

        DaysSinceSeen::Days(days)
    }

    /// Whether at least `interval` days have passed
    pub fn reached(self, interval: u32) -> bool {
        match self {
            DaysSinceSeen::Days(days) => days >= interval as i64,
            DaysSinceSeen::Infinite => true,
        }
    }

    /// Days counted for the overdue bonus
    ///
    /// An infinite gap counts as the longest interval on the ladder.
    pub fn effective_days(self) -> i64 {
        match self {
            DaysSinceSeen::Days(days) => days,
            DaysSinceSeen::Infinite => max_interval_days() as i64,
        }
    }
}

impl std::fmt::Display for DaysSinceSeen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaysSinceSeen::Days(days) => write!(f, "{}d", days),
            DaysSinceSeen::Infinite => write!(f, "never"),
        }
    }
}

/// Classification bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    New,
    Due,
    NotDue,
}

/// The active corpus split into buckets, each in corpus order
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub new: Vec<QueueItem>,
    pub due: Vec<QueueItem>,
    pub not_due: Vec<QueueItem>,
}

impl Classification {
    /// Size of the active corpus that was classified
    pub fn total(&self) -> usize {
        self.new.len() + self.due.len() + self.not_due.len()
    }
}

/// Bucket for a single record
pub fn bucket_for(record: Option<&PerformanceRecord>, today: NaiveDate) -> Bucket {
    let Some(record) = record else {
        return Bucket::New;
    };

    let level = mastery_level(Some(record));
    let elapsed = DaysSinceSeen::between(record.last_attempt, today);

    if level.is_zero() || elapsed.reached(level.interval_days()) {
        Bucket::Due
    } else {
        Bucket::NotDue
    }
}

/// Classify one position against its record
pub fn classify_position(
    position: &Arc<Position>,
    record: Option<&PerformanceRecord>,
    today: NaiveDate,
) -> (Bucket, QueueItem) {
    let bucket = bucket_for(record, today);

    let item = match record {
        None => QueueItem::new_problem(position.clone()),
        Some(record) => {
            let mastery: MasteryLevel = mastery_level(Some(record));
            let elapsed = DaysSinceSeen::between(record.last_attempt, today);
            QueueItem::review(position.clone(), record.clone(), mastery, elapsed)
        }
    };

    (bucket, item)
}

/// Classify the active corpus against a point-in-time record snapshot
pub fn classify(active: &[Arc<Position>], records: &RecordSnapshot, today: NaiveDate) -> Classification {
    let mut classification = Classification::default();

    for position in active {
        let key = position.problem_id().key();
        let (bucket, item) = classify_position(position, records.get(&key), today);

        tracing::debug!(problem = %key, ?bucket, "Classified position");

        match bucket {
            Bucket::New => classification.new.push(item),
            Bucket::Due => classification.due.push(item),
            Bucket::NotDue => classification.not_due.push(item),
        }
    }

    classification
}
