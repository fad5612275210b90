//! Position module - the training problems
//!
//! A position is one recorded decision point from a past game where the
//! learner went wrong:
//! - The board before the move (FEN) and the move actually played
//! - The engine's best move, which is the expected answer
//! - Engine evaluation before/after the played move
//! - Error classification and game context

mod corpus;

pub use corpus::{Corpus, CorpusError, CorpusFilter, CorpusSummary};

use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

/// How badly the recorded move dropped the evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(alias = "blunder", alias = "BLUNDER")]
    Blunder,
    #[serde(alias = "mistake", alias = "MISTAKE")]
    Mistake,
    #[serde(alias = "inaccuracy", alias = "INACCURACY")]
    Inaccuracy,
}

impl ErrorType {
    /// All error types, most severe first
    pub const ALL: [ErrorType; 3] = [ErrorType::Blunder, ErrorType::Mistake, ErrorType::Inaccuracy];

    /// Lower-case name, used as the category key in statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Blunder => "blunder",
            ErrorType::Mistake => "mistake",
            ErrorType::Inaccuracy => "inaccuracy",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blunder" => Ok(ErrorType::Blunder),
            "mistake" => Ok(ErrorType::Mistake),
            "inaccuracy" => Ok(ErrorType::Inaccuracy),
            _ => Err(format!("Unknown error type: {}", s)),
        }
    }
}

// ============================================================================
// SIDE TO MOVE
// ============================================================================

/// Color the learner played in the recorded game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    #[serde(alias = "White", alias = "WHITE")]
    White,
    #[serde(alias = "Black", alias = "BLACK")]
    Black,
}

impl PlayerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }
}

impl std::fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlayerColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" | "w" => Ok(PlayerColor::White),
            "black" | "b" => Ok(PlayerColor::Black),
            _ => Err(format!("Unknown color: {}", s)),
        }
    }
}

// ============================================================================
// PROBLEM ID
// ============================================================================

/// Identity of a training problem
///
/// The triple (board, played move, corpus index) is stable as long as the
/// corpus keeps its order. Two identical blunders from different games stay
/// distinct problems because their indexes differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProblemId {
    pub fen: String,
    pub player_move: String,
    pub index: usize,
}

impl ProblemId {
    pub fn new(fen: impl Into<String>, player_move: impl Into<String>, index: usize) -> Self {
        Self {
            fen: fen.into(),
            player_move: player_move.into(),
            index,
        }
    }

    /// Canonical string key used by performance stores
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.fen, self.player_move, self.index)
    }
}

impl std::fmt::Display for ProblemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.fen, self.player_move, self.index)
    }
}

// ============================================================================
// POSITION
// ============================================================================

/// One recorded mistake, presented to the learner as a problem
///
/// Field names on the wire follow the analysis pipeline's JSON output.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Board the learner faces, in FEN
    pub fen: String,
    /// Full-move number in the source game
    #[serde(default)]
    pub move_number: u32,
    /// Color the learner played
    pub player_color: PlayerColor,
    /// Move the learner actually played (UCI)
    pub player_move: String,
    /// Engine's best move (UCI) - the expected answer
    pub best_move: String,
    /// Evaluation before the played move, centipawns, learner's perspective
    #[serde(default, rename = "eval_before_move_cp")]
    pub eval_before_cp: Option<i32>,
    /// Evaluation after the played move, centipawns, learner's perspective
    #[serde(default, rename = "eval_after_move_cp")]
    pub eval_after_cp: Option<i32>,
    pub error_type: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    /// Position in the corpus, assigned on load
    #[serde(skip)]
    pub index: usize,
}

impl Position {
    /// Build a position with the mandatory fields; context fields start empty
    pub fn new(
        fen: impl Into<String>,
        player_color: PlayerColor,
        player_move: impl Into<String>,
        best_move: impl Into<String>,
        error_type: ErrorType,
    ) -> Self {
        Self {
            fen: fen.into(),
            move_number: 0,
            player_color,
            player_move: player_move.into(),
            best_move: best_move.into(),
            eval_before_cp: None,
            eval_after_cp: None,
            error_type,
            game_url: None,
            game_date: None,
            player_name: None,
            index: 0,
        }
    }

    /// Set the evaluations (builder style)
    pub fn with_evals(mut self, before: Option<i32>, after: Option<i32>) -> Self {
        self.eval_before_cp = before;
        self.eval_after_cp = after;
        self
    }

    /// Set the corpus index (builder style)
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn problem_id(&self) -> ProblemId {
        ProblemId::new(self.fen.clone(), self.player_move.clone(), self.index)
    }

    /// Centipawns lost by the played move, when both evaluations are known
    pub fn eval_drop(&self) -> Option<i32> {
        match (self.eval_before_cp, self.eval_after_cp) {
            (Some(before), Some(after)) => Some(before.saturating_sub(after)),
            _ => None,
        }
    }

    /// Whether `candidate` is the engine's best move
    ///
    /// UCI is compared ignoring surrounding whitespace and letter case.
    pub fn is_best_move(&self, candidate: &str) -> bool {
        candidate.trim().eq_ignore_ascii_case(self.best_move.trim())
    }
}
