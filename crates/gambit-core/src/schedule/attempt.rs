//! Attempt state machine
//!
//! Tracks one exposure of a position: the continuous presentation of a
//! problem from the moment it becomes active until it is solved, revealed,
//! or completed by a learner override.
//!
//! ```text
//! Unattempted ──submit──▶ Attempting ──best move──▶ Solved
//!      │                   │    ▲
//!      │                   │    └── wrong move, attempts < max
//!      │                   └── wrong move, attempts == max ──▶ AutoRevealed
//!      └──────── override (skip / reveal / mark correct) ────────▶ Overridden
//! ```
//!
//! Every terminal transition yields exactly one [`CompletionEvent`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::position::{Position, ProblemId};

/// Wrong answers allowed before the best move is revealed
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Exposure state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Unattempted,
    Attempting,
    Solved,
    AutoRevealed,
    /// Completed by a learner override (skip / reveal / mark correct)
    Overridden,
}

/// How the learner ended an exposure without finding the move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    /// Move on without seeing the answer
    Skip,
    /// Show the best move
    Reveal,
    /// Count the problem as solved
    MarkCorrect,
}

impl OverrideKind {
    pub fn is_correct(self) -> bool {
        self == OverrideKind::MarkCorrect
    }
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptState::Solved | AttemptState::AutoRevealed | AttemptState::Overridden
        )
    }
}

impl std::fmt::Display for AttemptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttemptState::Unattempted => "unattempted",
            AttemptState::Attempting => "attempting",
            AttemptState::Solved => "solved",
            AttemptState::AutoRevealed => "auto_revealed",
            AttemptState::Overridden => "overridden",
        };
        write!(f, "{}", name)
    }
}

/// Emitted once when an exposure ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub problem_id: ProblemId,
    pub was_correct: bool,
    pub was_auto_revealed: bool,
    /// Moves submitted during this exposure
    pub attempts: u32,
    /// Set when the learner ended the exposure rather than a move
    pub override_kind: Option<OverrideKind>,
}

impl CompletionEvent {
    pub fn is_overridden(&self) -> bool {
        self.override_kind.is_some()
    }
}

/// Result of submitting a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Best move found; exposure complete
    Solved(CompletionEvent),
    /// Wrong move; the learner may try again
    Incorrect { attempts_remaining: u32 },
    /// Final wrong move; the best move is revealed and the exposure completes
    AutoRevealed {
        best_move: String,
        event: CompletionEvent,
    },
}

impl AttemptOutcome {
    /// Completion event, when the outcome ended the exposure
    pub fn event(&self) -> Option<&CompletionEvent> {
        match self {
            AttemptOutcome::Solved(event) => Some(event),
            AttemptOutcome::AutoRevealed { event, .. } => Some(event),
            AttemptOutcome::Incorrect { .. } => None,
        }
    }
}

/// Exposure errors
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExposureError {
    /// Input arrived after the exposure ended
    #[error("Exposure of {problem_id} already ended ({state})")]
    AlreadyComplete {
        problem_id: ProblemId,
        state: AttemptState,
    },
}

/// Per-exposure attempt tracking for the active position
#[derive(Debug, Clone)]
pub struct Exposure {
    position: Arc<Position>,
    max_attempts: u32,
    attempts_this_exposure: u32,
    auto_reveal_triggered: bool,
    state: AttemptState,
}

impl Exposure {
    pub fn new(position: Arc<Position>) -> Self {
        Self::with_max_attempts(position, DEFAULT_MAX_ATTEMPTS)
    }

    /// Exposure allowing `max_attempts` wrong answers (at least one)
    pub fn with_max_attempts(position: Arc<Position>, max_attempts: u32) -> Self {
        Self {
            position,
            max_attempts: max_attempts.max(1),
            attempts_this_exposure: 0,
            auto_reveal_triggered: false,
            state: AttemptState::Unattempted,
        }
    }

    pub fn position(&self) -> &Arc<Position> {
        &self.position
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts_this_exposure
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts_this_exposure)
    }

    pub fn auto_reveal_triggered(&self) -> bool {
        self.auto_reveal_triggered
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Submit a move for the active position
    pub fn submit(&mut self, candidate: &str) -> Result<AttemptOutcome, ExposureError> {
        self.ensure_open()?;

        self.attempts_this_exposure += 1;
        self.state = AttemptState::Attempting;

        if self.position.is_best_move(candidate) {
            self.state = AttemptState::Solved;
            return Ok(AttemptOutcome::Solved(self.completion(true, None)));
        }

        if self.attempts_this_exposure >= self.max_attempts && !self.auto_reveal_triggered {
            self.auto_reveal_triggered = true;
            self.state = AttemptState::AutoRevealed;
            tracing::debug!(
                problem = %self.position.problem_id(),
                attempts = self.attempts_this_exposure,
                "Auto-revealing best move"
            );
            return Ok(AttemptOutcome::AutoRevealed {
                best_move: self.position.best_move.clone(),
                event: self.completion(false, None),
            });
        }

        Ok(AttemptOutcome::Incorrect {
            attempts_remaining: self.attempts_remaining(),
        })
    }

    /// Complete the exposure on the learner's say-so
    ///
    /// Only [`OverrideKind::MarkCorrect`] records a correct answer.
    pub fn override_completion(&mut self, kind: OverrideKind) -> Result<CompletionEvent, ExposureError> {
        self.ensure_open()?;
        self.state = AttemptState::Overridden;
        Ok(self.completion(kind.is_correct(), Some(kind)))
    }

    fn ensure_open(&self) -> Result<(), ExposureError> {
        if self.state.is_terminal() {
            return Err(ExposureError::AlreadyComplete {
                problem_id: self.position.problem_id(),
                state: self.state,
            });
        }
        Ok(())
    }

    fn completion(&self, was_correct: bool, override_kind: Option<OverrideKind>) -> CompletionEvent {
        CompletionEvent {
            problem_id: self.position.problem_id(),
            was_correct,
            was_auto_revealed: self.state == AttemptState::AutoRevealed,
            attempts: self.attempts_this_exposure,
            override_kind,
        }
    }
}
