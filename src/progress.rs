//! Persistent solve statistics, fed by the engine's `Solved` signal.

use crate::core::constants::PROGRESS_FILENAME;
use crate::solve::SolvedRecord;
use crate::utils::persistence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;

/// Per-puzzle history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub times_started: u32,
    pub times_solved: u32,
    /// Solves without full-solution playback.
    pub clean_solves: u32,
    /// Fewest failed attempts in an unassisted solve.
    pub best_failed_attempts: Option<u32>,
    pub last_solved: Option<DateTime<Utc>>,
}

/// Persistent puzzle stats (saved to disk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleProgress {
    pub sessions_started: u32,
    pub puzzles_solved: u32,
    pub puzzles_assisted: u32,
    pub total_failed_attempts: u32,
    #[serde(default)]
    pub puzzles: BTreeMap<String, PuzzleRecord>,
}

impl PuzzleProgress {
    pub fn load() -> Self {
        persistence::load_json_or_default(PROGRESS_FILENAME)
    }

    pub fn save(&self) -> io::Result<()> {
        persistence::save_json(PROGRESS_FILENAME, self)
    }

    pub fn record_started(&mut self, puzzle_id: &str) {
        self.sessions_started += 1;
        self.puzzles
            .entry(puzzle_id.to_string())
            .or_default()
            .times_started += 1;
    }

    pub fn record_solved(&mut self, record: &SolvedRecord) {
        self.total_failed_attempts += record.failed_attempts;
        let entry = self.puzzles.entry(record.puzzle_id.clone()).or_default();
        entry.times_solved += 1;
        entry.last_solved = Some(record.solved_at);

        if record.assisted {
            self.puzzles_assisted += 1;
        } else {
            self.puzzles_solved += 1;
            entry.clean_solves += 1;
            entry.best_failed_attempts = Some(
                entry
                    .best_failed_attempts
                    .map_or(record.failed_attempts, |best| best.min(record.failed_attempts)),
            );
        }
        tracing::debug!(
            puzzle_id = %record.puzzle_id,
            solved = self.puzzles_solved,
            assisted = self.puzzles_assisted,
            "progress updated"
        );
    }

    pub fn get(&self, puzzle_id: &str) -> Option<&PuzzleRecord> {
        self.puzzles.get(puzzle_id)
    }

    /// Solved by the player at least once, without playback.
    pub fn is_solved(&self, puzzle_id: &str) -> bool {
        self.get(puzzle_id).map_or(false, |r| r.clean_solves > 0)
    }

    /// Share of started sessions that ended in an unassisted solve.
    pub fn solve_rate(&self) -> f64 {
        if self.sessions_started == 0 {
            return 0.0;
        }
        self.puzzles_solved as f64 / self.sessions_started as f64
    }
}
