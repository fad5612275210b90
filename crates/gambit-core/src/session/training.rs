//! Training session runner
//!
//! Walks a session queue one exposure at a time, writing every completion to
//! the store and keeping the session-scoped counters.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Scheduler, SchedulerError};
use crate::clock::Clock;
use crate::position::Position;
use crate::schedule::{
    AttemptOutcome, CompletionEvent, Exposure, OverrideKind, QueueItem, QueueMetrics, QueueMode,
};
use crate::storage::{AttemptRecord, PerformanceStore, ProblemResult, SessionRecord};

// ============================================================================
// SESSION STATS
// ============================================================================

/// Counters for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Moves submitted across completed exposures
    pub total_attempts: u32,
    pub correct_answers: u32,
    pub completed_problems: u32,
    pub auto_revealed: u32,
    /// Answers shown on request
    pub revealed: u32,
    /// Exposures ended by a "skip" override
    pub skipped: u32,
    pub problems: Vec<ProblemResult>,
}

impl SessionStats {
    /// Fold one completion event into the counters
    pub fn record_completion(&mut self, event: &CompletionEvent) {
        self.total_attempts += event.attempts;
        self.completed_problems += 1;
        if event.was_correct {
            self.correct_answers += 1;
        }
        if event.was_auto_revealed {
            self.auto_revealed += 1;
        }
        match event.override_kind {
            Some(OverrideKind::Skip) => self.skipped += 1,
            Some(OverrideKind::Reveal) => self.revealed += 1,
            Some(OverrideKind::MarkCorrect) | None => {}
        }
        self.problems.push(ProblemResult {
            problem_id: event.problem_id.key(),
            was_correct: event.was_correct,
            attempts: event.attempts,
            auto_revealed: event.was_auto_revealed,
            override_kind: event.override_kind,
        });
    }

    /// Share of completed problems answered correctly, as a percentage
    pub fn accuracy(&self) -> f64 {
        if self.completed_problems == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / self.completed_problems as f64 * 100.0
    }
}

// ============================================================================
// TRAINING SESSION
// ============================================================================

struct ActiveProblem {
    item: QueueItem,
    exposure: Exposure,
}

/// One learner sitting
///
/// At most one exposure is live at a time. Completed exposures are written to
/// the store immediately; a write that fails stays pending and is retried
/// before the next queue build.
pub struct TrainingSession<'s, S, C> {
    id: Uuid,
    scheduler: &'s Scheduler<S, C>,
    active_corpus: Vec<Arc<Position>>,
    started_at: DateTime<Utc>,
    queue: VecDeque<QueueItem>,
    active: Option<ActiveProblem>,
    metrics: QueueMetrics,
    mode: QueueMode,
    caught_up: bool,
    stats: SessionStats,
    pending: VecDeque<AttemptRecord>,
}

impl<'s, S: PerformanceStore, C: Clock> TrainingSession<'s, S, C> {
    /// Open a session over `active_corpus` and build its first queue
    pub fn start<R: Rng + ?Sized>(
        scheduler: &'s Scheduler<S, C>,
        active_corpus: Vec<Arc<Position>>,
        rng: &mut R,
    ) -> Result<Self, SchedulerError> {
        let mut session = Self {
            id: Uuid::new_v4(),
            scheduler,
            active_corpus,
            started_at: scheduler.clock().now(),
            queue: VecDeque::new(),
            active: None,
            metrics: QueueMetrics::default(),
            mode: QueueMode::Scheduled,
            caught_up: false,
            stats: SessionStats::default(),
            pending: VecDeque::new(),
        };
        session.refresh(rng)?;

        tracing::info!(session = %session.id, queued = session.remaining(), "Training session started");
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Metrics of the most recent queue build
    pub fn metrics(&self) -> QueueMetrics {
        self.metrics
    }

    pub fn mode(&self) -> QueueMode {
        self.mode
    }

    /// The live exposure, if any
    pub fn current(&self) -> Option<&Exposure> {
        self.active.as_ref().map(|a| &a.exposure)
    }

    /// Queue entry behind the live exposure
    pub fn current_item(&self) -> Option<&QueueItem> {
        self.active.as_ref().map(|a| &a.item)
    }

    /// Problems left, counting the live one
    pub fn remaining(&self) -> usize {
        self.queue.len() + usize::from(self.active.is_some())
    }

    /// Current queue has been worked through
    pub fn is_exhausted(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// The last build found nothing to review and nothing new
    pub fn is_caught_up(&self) -> bool {
        self.is_exhausted() && self.caught_up
    }

    /// Completion writes not yet accepted by the store
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Submit a move for the live exposure
    pub fn submit_move(&mut self, candidate: &str) -> Result<AttemptOutcome, SchedulerError> {
        let active = self.active.as_mut().ok_or(SchedulerError::NoActivePosition)?;
        let outcome = active.exposure.submit(candidate)?;

        if let Some(event) = outcome.event() {
            self.complete(event.clone());
        }
        Ok(outcome)
    }

    /// End the live exposure on the learner's say-so
    pub fn override_completion(&mut self, kind: OverrideKind) -> Result<CompletionEvent, SchedulerError> {
        let active = self.active.as_mut().ok_or(SchedulerError::NoActivePosition)?;
        let event = active.exposure.override_completion(kind)?;
        self.complete(event.clone());
        Ok(event)
    }

    /// Drop the live exposure and the rest of the queue without recording anything
    ///
    /// Returns the position that was live.
    pub fn abandon(&mut self) -> Option<Arc<Position>> {
        self.queue.clear();
        let dropped = self.active.take().map(|a| a.item.position);
        if let Some(position) = &dropped {
            tracing::debug!(problem = %position.problem_id(), "Abandoned exposure");
        }
        dropped
    }

    /// Rebuild the queue from the store
    ///
    /// Pending writes are retried first. Any still unsaved are applied on top
    /// of the store's records, so their positions are not offered as new
    /// again. The live exposure, if any, is discarded without a completion
    /// event.
    pub fn refresh<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<QueueMetrics, SchedulerError> {
        if let Err(e) = self.flush() {
            tracing::warn!(pending = self.pending.len(), "Rebuilding with unsaved attempts: {}", e);
        }

        let queue = self.scheduler.build_queue_with(
            &self.active_corpus,
            self.pending.make_contiguous(),
            rng,
        )?;
        self.caught_up = queue.is_caught_up();
        self.metrics = queue.metrics;
        self.mode = queue.mode;
        self.queue = queue.items.into();
        self.active = None;
        self.advance();

        Ok(self.metrics)
    }

    /// Retry pending writes in completion order
    ///
    /// Stops at the first failure, keeping it and everything after it.
    pub fn flush(&mut self) -> Result<usize, SchedulerError> {
        let mut written = 0;
        while let Some(attempt) = self.pending.front() {
            self.scheduler.record(attempt)?;
            self.pending.pop_front();
            written += 1;
        }
        Ok(written)
    }

    /// Close the session and summarize it for the session log
    pub fn finish(mut self) -> SessionRecord {
        if let Err(e) = self.flush() {
            tracing::warn!(pending = self.pending.len(), "Session closed with unsaved attempts: {}", e);
        }
        self.abandon();

        let stats = &self.stats;
        let record = SessionRecord {
            session_id: self.id.to_string(),
            start_time: self.started_at,
            end_time: Some(self.scheduler.clock().now()),
            total_attempts: i64::from(stats.total_attempts),
            correct_answers: i64::from(stats.correct_answers),
            completed_problems: i64::from(stats.completed_problems),
            auto_revealed: i64::from(stats.auto_revealed),
            revealed: i64::from(stats.revealed),
            skipped: i64::from(stats.skipped),
            problems: stats.problems.clone(),
        };

        tracing::info!(
            session = %self.id,
            completed = stats.completed_problems,
            correct = stats.correct_answers,
            "Training session finished"
        );
        record
    }

    fn complete(&mut self, event: CompletionEvent) {
        self.stats.record_completion(&event);

        if let Some(active) = self.active.take() {
            let attempt = self.scheduler.attempt_record(&event, &active.item.position);
            self.pending.push_back(attempt);
            if let Err(e) = self.flush() {
                tracing::warn!(problem = %event.problem_id, "Attempt kept for retry: {}", e);
            }
        }

        self.advance();
    }

    fn advance(&mut self) {
        if self.active.is_some() {
            return;
        }
        if let Some(item) = self.queue.pop_front() {
            let exposure = self.scheduler.expose(item.position.clone());
            self.active = Some(ActiveProblem { item, exposure });
        }
    }
}
