//! Session queue building
//!
//! Takes the classified corpus, ranks the due bucket, applies the session
//! caps and shuffles the result so reviews and new problems are interleaved.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::classify::{Classification, DaysSinceSeen};
use super::mastery::MasteryLevel;
use super::priority::rank;
use crate::position::Position;
use crate::storage::PerformanceRecord;

/// Default cap on new problems per session
pub const DEFAULT_MAX_NEW: usize = 10;

/// Default cap on reviews per session
pub const DEFAULT_MAX_REVIEW: usize = 50;

// ============================================================================
// QUEUE ITEM
// ============================================================================

/// One problem scheduled for the session
///
/// Rebuilt every time a queue is computed; never persisted.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub position: Arc<Position>,
    /// No performance record existed at classification time
    pub is_new: bool,
    /// Ranking score (due items only)
    pub priority: Option<i64>,
    /// Mastery at classification time (reviews only)
    pub mastery: Option<MasteryLevel>,
    /// Days since the last attempt (reviews only)
    pub days_since_seen: Option<DaysSinceSeen>,
    /// Record snapshot the item was classified from (reviews only)
    pub record: Option<PerformanceRecord>,
}

impl QueueItem {
    /// A problem with no history
    pub fn new_problem(position: Arc<Position>) -> Self {
        Self {
            position,
            is_new: true,
            priority: None,
            mastery: None,
            days_since_seen: None,
            record: None,
        }
    }

    /// A problem with history
    pub fn review(
        position: Arc<Position>,
        record: PerformanceRecord,
        mastery: MasteryLevel,
        days_since_seen: DaysSinceSeen,
    ) -> Self {
        Self {
            position,
            is_new: false,
            priority: None,
            mastery: Some(mastery),
            days_since_seen: Some(days_since_seen),
            record: Some(record),
        }
    }
}

// ============================================================================
// SESSION QUEUE
// ============================================================================

/// Counts reported alongside a queue, for progress display only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMetrics {
    /// Due positions before the review cap
    pub due_count: usize,
    /// New positions before the new cap
    pub new_count: usize,
    /// Size of the active corpus
    pub total_count: usize,
}

/// How a queue was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    /// Classified and ranked from performance data
    #[default]
    Scheduled,
    /// Performance data was unavailable; an unranked slice of the corpus
    Degraded,
}

/// Ordered problems for one session
#[derive(Debug, Clone, Default)]
pub struct SessionQueue {
    pub items: Vec<QueueItem>,
    pub metrics: QueueMetrics,
    pub mode: QueueMode,
}

impl SessionQueue {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Nothing due and nothing new: the learner is caught up
    pub fn is_caught_up(&self) -> bool {
        self.items.is_empty() && self.mode == QueueMode::Scheduled
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Applies session caps and ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueBuilder {
    pub max_new: usize,
    pub max_review: usize,
}

impl Default for QueueBuilder {
    fn default() -> Self {
        Self {
            max_new: DEFAULT_MAX_NEW,
            max_review: DEFAULT_MAX_REVIEW,
        }
    }
}

impl QueueBuilder {
    pub fn new(max_new: usize, max_review: usize) -> Self {
        Self { max_new, max_review }
    }

    /// Upper bound on queue length
    pub fn capacity(&self) -> usize {
        self.max_new + self.max_review
    }

    /// Build the session queue from a classification
    ///
    /// New problems are taken in corpus order, reviews by rank. The combined
    /// list is shuffled with `rng`; pass a seeded generator for a
    /// reproducible order. Not-due positions never enter the queue.
    pub fn build<R: Rng + ?Sized>(&self, classification: Classification, rng: &mut R) -> SessionQueue {
        let Classification { new, due, not_due } = classification;

        let metrics = QueueMetrics {
            due_count: due.len(),
            new_count: new.len(),
            total_count: new.len() + due.len() + not_due.len(),
        };

        let mut items: Vec<QueueItem> = rank(due).into_iter().take(self.max_review).collect();
        items.extend(new.into_iter().take(self.max_new));
        items.shuffle(rng);

        tracing::info!(
            queued = items.len(),
            due = metrics.due_count,
            new = metrics.new_count,
            total = metrics.total_count,
            "Built session queue"
        );

        SessionQueue {
            items,
            metrics,
            mode: QueueMode::Scheduled,
        }
    }

    /// Build a queue without performance data
    ///
    /// Takes the first `limit` positions of the active corpus, shuffled. No
    /// due/new distinction is possible, so both counts report zero.
    pub fn build_degraded<R: Rng + ?Sized>(
        &self,
        active: &[Arc<Position>],
        limit: usize,
        rng: &mut R,
    ) -> SessionQueue {
        let mut items: Vec<QueueItem> = active
            .iter()
            .take(limit)
            .cloned()
            .map(QueueItem::new_problem)
            .collect();
        items.shuffle(rng);

        tracing::warn!(
            queued = items.len(),
            total = active.len(),
            "Built degraded queue without performance data"
        );

        SessionQueue {
            items,
            metrics: QueueMetrics {
                due_count: 0,
                new_count: 0,
                total_count: active.len(),
            },
            mode: QueueMode::Degraded,
        }
    }
}
