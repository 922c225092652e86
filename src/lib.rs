//! Puzzle Trainer - scripted chess puzzle solving.
//!
//! The library holds the solve engine and everything around it; the binary
//! is a thin line-driven host.

pub mod config;
pub mod core;
pub mod progress;
pub mod puzzle;
pub mod rules;
pub mod solve;
pub mod utils;

pub use config::TrainerConfig;
pub use progress::PuzzleProgress;
pub use puzzle::{Puzzle, PuzzleCatalog};
pub use rules::{BoardRules, ChessRules};
pub use solve::PuzzleSolveEngine;
