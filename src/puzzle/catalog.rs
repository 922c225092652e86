//! Puzzle catalogs: lookup, filtering and practice ordering.

use super::builtin::builtin_puzzles;
use super::types::{GamePhase, Puzzle, PuzzleDifficulty, PuzzleError};
use crate::rules::RulesError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read puzzle pack: {0}")]
    Io(#[from] io::Error),
    #[error("malformed puzzle pack: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] PuzzleError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("duplicate puzzle id '{0}'")]
    DuplicateId(String),
    #[error("unknown puzzle '{0}'")]
    UnknownPuzzle(String),
}

/// Criteria for narrowing a catalog. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzleFilter {
    pub difficulty: Option<PuzzleDifficulty>,
    pub theme: Option<String>,
    pub phase: Option<GamePhase>,
}

impl PuzzleFilter {
    pub fn difficulty(mut self, difficulty: PuzzleDifficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn phase(mut self, phase: GamePhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn matches(&self, puzzle: &Puzzle) -> bool {
        self.difficulty.map_or(true, |d| puzzle.difficulty == d)
            && self
                .theme
                .as_deref()
                .map_or(true, |t| puzzle.theme.eq_ignore_ascii_case(t))
            && self.phase.map_or(true, |p| puzzle.phase == p)
    }
}

/// Validated puzzles indexed by id, in load order.
#[derive(Debug, Clone, Default)]
pub struct PuzzleCatalog {
    puzzles: Vec<Puzzle>,
    index: HashMap<String, usize>,
}

impl PuzzleCatalog {
    /// Build a catalog, validating every puzzle and rejecting duplicate ids.
    pub fn from_puzzles(puzzles: Vec<Puzzle>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(puzzles.len());
        for (i, puzzle) in puzzles.iter().enumerate() {
            puzzle.validate()?;
            if index.insert(puzzle.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(puzzle.id.clone()));
            }
        }
        debug!(count = puzzles.len(), "puzzle catalog built");
        Ok(Self { puzzles, index })
    }

    /// Parse a JSON array of puzzles.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let puzzles: Vec<Puzzle> = serde_json::from_str(json)?;
        Self::from_puzzles(puzzles)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        info!(path = %path.display(), count = catalog.len(), "loaded puzzle pack");
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_puzzles(builtin_puzzles()?)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Puzzle> {
        self.puzzles.iter()
    }

    pub fn get(&self, id: &str) -> Result<&Puzzle, CatalogError> {
        self.index
            .get(id)
            .map(|&i| &self.puzzles[i])
            .ok_or_else(|| CatalogError::UnknownPuzzle(id.to_string()))
    }

    pub fn filter(&self, filter: &PuzzleFilter) -> Vec<&Puzzle> {
        self.puzzles.iter().filter(|p| filter.matches(p)).collect()
    }

    /// A random puzzle matching `filter`.
    pub fn random<R: Rng>(&self, filter: &PuzzleFilter, rng: &mut R) -> Option<&Puzzle> {
        self.filter(filter).choose(rng).copied()
    }

    /// Shuffled ids of every puzzle matching `filter`, for a practice run.
    pub fn practice_order<R: Rng>(&self, filter: &PuzzleFilter, rng: &mut R) -> Vec<String> {
        let mut ids: Vec<String> = self
            .filter(filter)
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        ids.shuffle(rng);
        ids
    }
}
