//! Puzzle definitions: the immutable input of a solve session.

use crate::rules::{PieceKind, PromotionPiece, Side, Square};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Difficulty levels for puzzles. Classification only; the solve engine
/// never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleDifficulty {
    Novice,     // Mate-in-1
    Apprentice, // Simple tactics
    Journeyman, // Mate-in-2
    Master,     // Longer combinations
}

difficulty_enum_impl!(PuzzleDifficulty);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// Who plays a scripted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Human,
    Automated,
}

/// One scripted ply of the expected solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionStep {
    pub expected_move_notation: String,
    pub actor: Actor,
    pub origin_square: Square,
    pub destination_square: Square,
}

impl SolutionStep {
    pub fn new(
        actor: Actor,
        notation: impl Into<String>,
        origin_square: Square,
        destination_square: Square,
    ) -> Self {
        Self {
            expected_move_notation: notation.into(),
            actor,
            origin_square,
            destination_square,
        }
    }

    pub fn is_automated(&self) -> bool {
        self.actor == Actor::Automated
    }

    pub fn piece(&self) -> PieceKind {
        PieceKind::from_san(&self.expected_move_notation)
    }

    pub fn promotion(&self) -> Option<PromotionPiece> {
        PromotionPiece::from_san(&self.expected_move_notation)
    }
}

/// Automated move played before the solver's first turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreMove {
    pub move_notation: String,
    pub actor_color: Side,
    pub origin_square: Square,
    pub destination_square: Square,
}

impl PreMove {
    pub fn promotion(&self) -> Option<PromotionPiece> {
        PromotionPiece::from_san(&self.move_notation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("puzzle id is empty")]
    EmptyId,
    #[error("puzzle '{0}' has no solution steps")]
    NoSolutionSteps(String),
}

/// A puzzle as authored: starting FEN, scripted solution, optional pre-move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub starting_position: String,
    pub solution_steps: Vec<SolutionStep>,
    #[serde(default)]
    pub pre_move: Option<PreMove>,
    pub difficulty: PuzzleDifficulty,
    #[serde(default)]
    pub theme: String,
    pub phase: GamePhase,
}

impl Puzzle {
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.id.trim().is_empty() {
            return Err(PuzzleError::EmptyId);
        }
        if self.solution_steps.is_empty() {
            return Err(PuzzleError::NoSolutionSteps(self.id.clone()));
        }
        Ok(())
    }

    /// How many moves the solver has to find.
    pub fn human_step_count(&self) -> usize {
        self.solution_steps
            .iter()
            .filter(|s| s.actor == Actor::Human)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn sample() -> Puzzle {
        Puzzle {
            id: "ladder-1".to_string(),
            title: "Rook Ladder".to_string(),
            starting_position: "6k1/8/8/8/8/8/1R6/R5K1 w - - 0 1".to_string(),
            solution_steps: vec![
                SolutionStep::new(Actor::Human, "Ra7", sq("a1"), sq("a7")),
                SolutionStep::new(Actor::Automated, "Kh8", sq("g8"), sq("h8")),
                SolutionStep::new(Actor::Human, "Rb8#", sq("b2"), sq("b8")),
            ],
            pre_move: None,
            difficulty: PuzzleDifficulty::Journeyman,
            theme: "mateIn2".to_string(),
            phase: GamePhase::Endgame,
        }
    }

    #[test]
    fn test_difficulty_from_index() {
        assert_eq!(PuzzleDifficulty::from_index(0), PuzzleDifficulty::Novice);
        assert_eq!(PuzzleDifficulty::from_index(3), PuzzleDifficulty::Master);
        assert_eq!(PuzzleDifficulty::from_index(99), PuzzleDifficulty::Novice);
        assert_eq!(PuzzleDifficulty::Journeyman.name(), "Journeyman");
    }

    #[test]
    fn test_step_piece_and_promotion() {
        let step = SolutionStep::new(Actor::Human, "e8=N+", sq("e7"), sq("e8"));
        assert_eq!(step.piece(), PieceKind::Pawn);
        assert_eq!(step.promotion(), Some(PromotionPiece::Knight));
        assert!(!step.is_automated());
    }

    #[test]
    fn test_validate() {
        assert_eq!(sample().validate(), Ok(()));

        let mut no_id = sample();
        no_id.id = "  ".to_string();
        assert_eq!(no_id.validate(), Err(PuzzleError::EmptyId));

        let mut no_steps = sample();
        no_steps.solution_steps.clear();
        assert_eq!(
            no_steps.validate(),
            Err(PuzzleError::NoSolutionSteps("ladder-1".to_string()))
        );
    }

    #[test]
    fn test_human_step_count() {
        assert_eq!(sample().human_step_count(), 2);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "id": "scholar",
            "startingPosition": "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3",
            "solutionSteps": [
                {"expectedMoveNotation": "Qxf7#", "actor": "human", "originSquare": "h5", "destinationSquare": "f7"}
            ],
            "preMove": {"moveNotation": "Nf6", "actorColor": "black", "originSquare": "g8", "destinationSquare": "f6"},
            "difficulty": "novice",
            "phase": "opening"
        }"#;
        let puzzle: Puzzle = serde_json::from_str(json).unwrap();
        assert_eq!(puzzle.solution_steps[0].origin_square, sq("h5"));
        assert_eq!(puzzle.pre_move.as_ref().unwrap().actor_color, Side::Black);
        assert!(puzzle.title.is_empty());
        assert!(puzzle.theme.is_empty());
        assert_eq!(puzzle.validate(), Ok(()));
    }
}
