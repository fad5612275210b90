//! Scheduler facade
//!
//! Owns the store, the clock and the caps, and turns an active corpus into a
//! session queue. Queue builds are one-shot and non-reentrant.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;

use super::{SchedulerConfig, SchedulerError};
use crate::clock::Clock;
use crate::position::Position;
use crate::schedule::{classify, CompletionEvent, Exposure, QueueBuilder, SessionQueue};
use crate::storage::{AttemptRecord, PerformanceRecord, PerformanceStore, StorageError};

/// Queue construction over a performance store
pub struct Scheduler<S, C> {
    store: S,
    clock: C,
    config: SchedulerConfig,
    building: AtomicBool,
}

/// Holds the build flag for the duration of one queue build
struct BuildGuard<'a>(&'a AtomicBool);

impl<'a> BuildGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SchedulerError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BuildGuard(flag))
            .map_err(|_| SchedulerError::RebuildInProgress)
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: PerformanceStore, C: Clock> Scheduler<S, C> {
    pub fn new(store: S, clock: C, config: SchedulerConfig) -> Self {
        Self {
            store,
            clock,
            config,
            building: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Build the session queue for `active`
    ///
    /// Classification runs against one snapshot of the store. If the store
    /// cannot be read the queue degrades to an unranked slice of the corpus.
    /// A call made while another build is running fails with
    /// [`SchedulerError::RebuildInProgress`].
    pub fn build_queue<R: Rng + ?Sized>(
        &self,
        active: &[Arc<Position>],
        rng: &mut R,
    ) -> Result<SessionQueue, SchedulerError> {
        self.build_queue_with(active, &[], rng)
    }

    /// Build the session queue, counting attempts the store has not accepted yet
    ///
    /// `pending` is applied on top of the snapshot in order, so a position
    /// completed during an outage is classified from its completion rather
    /// than as new.
    pub fn build_queue_with<R: Rng + ?Sized>(
        &self,
        active: &[Arc<Position>],
        pending: &[AttemptRecord],
        rng: &mut R,
    ) -> Result<SessionQueue, SchedulerError> {
        let _guard = BuildGuard::acquire(&self.building)?;
        let builder = QueueBuilder::new(self.config.max_new, self.config.max_review);

        match self.store.snapshot() {
            Ok(mut records) => {
                for attempt in pending {
                    records
                        .entry(attempt.problem_id.key())
                        .or_default()
                        .apply_attempt(attempt.was_correct, attempt.at);
                }
                let classification = classify(active, &records, self.clock.today());
                Ok(builder.build(classification, rng))
            }
            Err(e) => {
                tracing::warn!("Performance store unavailable, degrading queue: {}", e);
                Ok(builder.build_degraded(active, self.config.fallback_size, rng))
            }
        }
    }

    /// Fresh exposure for `position` using the configured attempt limit
    pub fn expose(&self, position: Arc<Position>) -> Exposure {
        Exposure::with_max_attempts(position, self.config.max_attempts)
    }

    /// Stamp a completion event with the current time
    pub fn attempt_record(&self, event: &CompletionEvent, position: &Position) -> AttemptRecord {
        AttemptRecord::from_event(event, position, self.clock.now())
    }

    /// Write one completed exposure to the store
    pub fn record(&self, attempt: &AttemptRecord) -> Result<PerformanceRecord, StorageError> {
        self.store.record_attempt(attempt)
    }
}
