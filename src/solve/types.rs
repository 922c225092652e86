//! Solve session vocabulary: states, outcomes, events and errors.

use crate::core::constants::{AUTO_REPLY_DELAY_TICKS, PRE_MOVE_DELAY_TICKS};
use crate::puzzle::PuzzleError;
use crate::rules::{PieceKind, RulesError, Side, Square};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Where the session stands. `Idle` and `Correct` both mean "waiting for the
/// solver's move"; `Incorrect` needs a retry (or full playback) to leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolveState {
    Idle,
    AwaitingPreMove,
    Correct,
    Incorrect,
    Solved,
}

impl SolveState {
    pub fn is_awaiting_human(&self) -> bool {
        matches!(self, Self::Idle | Self::Correct)
    }
}

/// What happened to a single `attempt_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptOutcome {
    /// Illegal per the rules; nothing changed.
    Rejected,
    /// Matched the script; more moves to find.
    Correct,
    /// Legal but not the scripted move. The move stays on the board.
    Incorrect,
    /// Matched the script and completed it.
    Solved,
}

/// Which piece to move next, and from where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub moving_piece: PieceKind,
    pub origin_square: Square,
}

/// Delays for deferred actions, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveTiming {
    pub pre_move_delay_ticks: u32,
    pub auto_reply_delay_ticks: u32,
}

impl Default for SolveTiming {
    fn default() -> Self {
        Self {
            pre_move_delay_ticks: PRE_MOVE_DELAY_TICKS,
            auto_reply_delay_ticks: AUTO_REPLY_DELAY_TICKS,
        }
    }
}

/// The outward "puzzle solved" signal. Persisting it is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedRecord {
    pub session_id: Uuid,
    pub puzzle_id: String,
    pub failed_attempts: u32,
    /// Reached through full-solution playback rather than by the solver.
    pub assisted: bool,
    pub solved_at: DateTime<Utc>,
}

/// State changes reported to the host, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SolveEvent {
    PreMoveApplied { notation: String },
    MoveAccepted { cursor: usize, notation: String },
    MoveRejected { origin: Square, destination: Square },
    MoveIncorrect { notation: String, failed_attempts: u32 },
    AutoReplyApplied { cursor: usize, notation: String },
    RetryStarted { cursor: usize },
    ReplayApplied { notation: String },
    PlaybackStep { cursor: usize, notation: String },
    HistoryStepped { history_pointer: usize },
    Restarted,
    Solved(SolvedRecord),
}

/// Read-only view of the session, taken after any operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Serialized current position (FEN for the board rules).
    pub current_position: String,
    pub side_to_move: Side,
    pub cursor: usize,
    pub total_steps: usize,
    pub last_attempt_outcome: SolveState,
    pub history_pointer: usize,
    pub is_at_terminal: bool,
    pub failed_attempts: u32,
    pub pending_action: bool,
    pub is_playing_solution: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot {operation} while {state:?}")]
    InvalidOperation {
        operation: &'static str,
        state: SolveState,
    },
    #[error("cannot {operation} while a deferred move is pending")]
    ActionPending { operation: &'static str },
    #[error("cannot {operation}: already at the end of the move history")]
    HistoryBoundary { operation: &'static str },
    #[error("scripted move '{notation}' is illegal in the current position")]
    IllegalScriptedMove { notation: String },
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error(transparent)]
    Rules(#[from] RulesError),
}
