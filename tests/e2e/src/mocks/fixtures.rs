//! Test Data Factory
//!
//! Provides utilities for generating realistic test data:
//! - Positions in the analysis pipeline's shape
//! - Corpora with a mix of error types and colors
//! - Corpus files on disk
//! - A controllable clock

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use gambit_core::{Corpus, ErrorType, FixedClock, PlayerColor, Position};
use serde_json::json;

/// Boards used by generated positions, cycled by index
const BOARDS: [&str; 4] = [
    "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    "rnbqkb1r/pp2pppp/3p1n2/8/3NP3/8/PPP2PPP/RNBQKB1R w KQkq - 1 5",
    "r2qkb1r/ppp2ppp/2n2n2/3pp3/2PP4/2N2N2/PP2PPPP/R1BQKB1R b KQkq - 0 5",
    "4rrk1/pp3ppp/2p5/8/3P4/2P2N2/P4PPP/R4RK1 b - - 0 21",
];

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let corpus = TestDataFactory::corpus(30);
/// let clock = TestDataFactory::clock();
/// clock.advance(chrono::Duration::days(1));
/// ```
pub struct TestDataFactory;

impl TestDataFactory {
    /// Instant every generated scenario starts from
    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 7, 19, 30, 0)
            .single()
            .expect("valid base time")
    }

    /// Clock frozen at [`base_time`](Self::base_time)
    pub fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Self::base_time()))
    }

    /// Error type for a generated index: blunder, mistake, inaccuracy, ...
    pub fn error_type_for(index: usize) -> ErrorType {
        ErrorType::ALL[index % ErrorType::ALL.len()]
    }

    /// Color for a generated index: white on even, black on odd
    pub fn color_for(index: usize) -> PlayerColor {
        if index % 2 == 0 {
            PlayerColor::White
        } else {
            PlayerColor::Black
        }
    }

    /// Best move every generated position expects
    pub fn best_move_for(index: usize) -> String {
        if index % 2 == 0 {
            "d2d4".to_string()
        } else {
            "d7d5".to_string()
        }
    }

    /// One generated position as pipeline JSON
    pub fn position_json(index: usize) -> serde_json::Value {
        let before = 40 + (index as i64 % 5) * 10;
        let after = before - 120 - (index as i64 % 3) * 150;
        let player_move = if index % 2 == 0 { "h2h3" } else { "a7a6" };
        let error_type = match Self::error_type_for(index) {
            ErrorType::Blunder => "Blunder",
            ErrorType::Mistake => "Mistake",
            ErrorType::Inaccuracy => "Inaccuracy",
        };
        json!({
            "fen": BOARDS[index % BOARDS.len()],
            "move_number": 3 + index,
            "player_color": Self::color_for(index).as_str(),
            "player_move": player_move,
            "eval_before_move_cp": before,
            "eval_after_move_cp": after,
            "best_move": Self::best_move_for(index),
            "error_type": error_type,
            "game_url": format!("https://lichess.org/test{index:04}"),
        })
    }

    /// Pipeline JSON for `count` positions
    pub fn corpus_json(count: usize) -> String {
        let positions: Vec<serde_json::Value> = (0..count).map(Self::position_json).collect();
        serde_json::Value::Array(positions).to_string()
    }

    /// Corpus of `count` positions
    ///
    /// Boards repeat every four positions, so identical boards with distinct
    /// problem ids are always present once `count > 4`.
    pub fn corpus(count: usize) -> Corpus {
        Corpus::from_json_str(&Self::corpus_json(count)).expect("fixture corpus parses")
    }

    /// Write a corpus file into `dir`
    pub fn write_corpus(dir: &Path, count: usize) -> PathBuf {
        let path = dir.join("analysis_results.json");
        std::fs::write(&path, Self::corpus_json(count)).expect("Failed to write corpus");
        path
    }

    /// Position at `index` of a generated corpus, shared
    pub fn position(index: usize) -> Arc<Position> {
        Self::corpus(index + 1).positions()[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_mix() {
        let corpus = TestDataFactory::corpus(9);
        let summary = corpus.summary();
        assert_eq!(summary.total, 9);
        assert_eq!(summary.by_error_type[&ErrorType::Blunder], 3);
        assert_eq!(summary.white, 5);
        assert_eq!(summary.black, 4);
    }

    #[test]
    fn test_repeated_boards_stay_distinct() {
        let corpus = TestDataFactory::corpus(8);
        let a = &corpus.positions()[0];
        let b = &corpus.positions()[4];
        assert_eq!(a.fen, b.fen);
        assert_ne!(a.problem_id(), b.problem_id());
    }

    #[test]
    fn test_position_helper() {
        let position = TestDataFactory::position(3);
        assert_eq!(position.index, 3);
        assert_eq!(position.best_move, "d7d5");
        assert!(position.eval_drop().unwrap() > 0);
    }
}
