//! Position corpus
//!
//! The ordered, read-only set of problems produced by the analysis pipeline.
//! Order matters: the corpus index is part of every [`ProblemId`], so the
//! corpus must be read the same way every time.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ErrorType, PlayerColor, Position, ProblemId};

/// Corpus loading error
///
/// The corpus is the one input the engine cannot degrade around.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// IO error
    #[error("Failed to read corpus {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON error
    #[error("Invalid corpus JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered collection of positions
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    positions: Vec<Arc<Position>>,
}

impl Corpus {
    /// Build a corpus, assigning indexes in the given order
    pub fn new(positions: Vec<Position>) -> Self {
        let positions = positions
            .into_iter()
            .enumerate()
            .map(|(index, position)| Arc::new(position.with_index(index)))
            .collect();
        Self { positions }
    }

    /// Parse the analysis pipeline's JSON array
    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        let positions: Vec<Position> = serde_json::from_str(json)?;
        Ok(Self::new(positions))
    }

    /// Load a corpus file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let corpus = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            positions = corpus.len(),
            "Loaded position corpus"
        );
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Arc<Position>] {
        &self.positions
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Position>> {
        self.positions.get(index)
    }

    /// Look a position up by its problem id
    pub fn find(&self, id: &ProblemId) -> Option<&Arc<Position>> {
        self.positions
            .get(id.index)
            .filter(|p| p.fen == id.fen && p.player_move == id.player_move)
    }

    /// The active corpus under `filter`, in corpus order
    pub fn filtered(&self, filter: &CorpusFilter) -> Vec<Arc<Position>> {
        self.positions
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    /// Per-error-type breakdown
    pub fn summary(&self) -> CorpusSummary {
        let mut by_error_type = BTreeMap::new();
        let mut white = 0;
        let mut black = 0;

        for position in &self.positions {
            *by_error_type.entry(position.error_type).or_insert(0) += 1;
            match position.player_color {
                PlayerColor::White => white += 1,
                PlayerColor::Black => black += 1,
            }
        }

        CorpusSummary {
            total: self.positions.len(),
            by_error_type,
            white,
            black,
        }
    }
}

/// Category filter applied before scheduling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusFilter {
    /// Keep only these error types (`None` keeps all)
    pub error_types: Option<Vec<ErrorType>>,
    /// Keep only positions played with this color
    pub player_color: Option<PlayerColor>,
}

impl CorpusFilter {
    /// Filter that keeps everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, position: &Position) -> bool {
        let type_ok = self
            .error_types
            .as_ref()
            .is_none_or(|types| types.contains(&position.error_type));
        let color_ok = self.player_color.is_none_or(|c| c == position.player_color);
        type_ok && color_ok
    }
}

/// Corpus breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSummary {
    pub total: usize,
    pub by_error_type: BTreeMap<ErrorType, usize>,
    pub white: usize,
    pub black: usize,
}
