//! Solve sessions: the engine and the types it reports through.

pub mod engine;
pub mod types;

pub use engine::PuzzleSolveEngine;
pub use types::{
    AttemptOutcome, EngineError, Hint, SessionSnapshot, SolveEvent, SolveState, SolveTiming,
    SolvedRecord,
};
