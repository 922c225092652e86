//! Bundled puzzle set used by the CLI and as a catalog fallback.
//!
//! Squares are written in algebraic form ("e4"); step tuples are
//! (actor, expected notation, from, to).

use super::types::{Actor, GamePhase, PreMove, Puzzle, PuzzleDifficulty, SolutionStep};
use crate::rules::{RulesError, Side};

type StepDef = (Actor, &'static str, &'static str, &'static str);

struct PuzzleDef {
    id: &'static str,
    title: &'static str,
    theme: &'static str,
    difficulty: PuzzleDifficulty,
    phase: GamePhase,
    fen: &'static str,
    /// (notation, side, from, to)
    pre_move: Option<(&'static str, Side, &'static str, &'static str)>,
    steps: &'static [StepDef],
}

static BUILTIN_PUZZLES: &[PuzzleDef] = &[
    // 1. e4 e5  2. Bc4 Nc6  3. Qh5 Nf6??  4. Qxf7#
    PuzzleDef {
        id: "scholars-mate",
        title: "Scholar's Mate",
        theme: "mateIn1",
        difficulty: PuzzleDifficulty::Novice,
        phase: GamePhase::Opening,
        fen: "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3",
        pre_move: Some(("Nf6", Side::Black, "g8", "f6")),
        steps: &[(Actor::Human, "Qxf7#", "h5", "f7")],
    },
    // 1. f3? e5  2. g4?? Qh4#
    PuzzleDef {
        id: "fools-mate",
        title: "Fool's Mate",
        theme: "mateIn1",
        difficulty: PuzzleDifficulty::Novice,
        phase: GamePhase::Opening,
        fen: "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2",
        pre_move: None,
        steps: &[(Actor::Human, "Qh4#", "d8", "h4")],
    },
    // Knight check hits king and rook at once
    PuzzleDef {
        id: "royal-fork",
        title: "Royal Fork",
        theme: "fork",
        difficulty: PuzzleDifficulty::Apprentice,
        phase: GamePhase::Middlegame,
        fen: "r3k3/7p/8/3N4/8/8/8/6K1 b - - 0 1",
        pre_move: Some(("h6", Side::Black, "h7", "h6")),
        steps: &[
            (Actor::Human, "Nc7+", "d5", "c7"),
            (Actor::Automated, "Kd7", "e8", "d7"),
            (Actor::Human, "Nxa8", "c7", "a8"),
        ],
    },
    // Two rooks walk the king to the edge
    PuzzleDef {
        id: "rook-ladder",
        title: "Rook Ladder",
        theme: "mateIn2",
        difficulty: PuzzleDifficulty::Journeyman,
        phase: GamePhase::Endgame,
        fen: "6k1/8/8/8/8/8/1R6/R5K1 w - - 0 1",
        pre_move: None,
        steps: &[
            (Actor::Human, "Ra7", "a1", "a7"),
            (Actor::Automated, "Kh8", "g8", "h8"),
            (Actor::Human, "Rb8#", "b2", "b8"),
        ],
    },
];

impl PuzzleDef {
    fn to_puzzle(&self) -> Result<Puzzle, RulesError> {
        let pre_move = match self.pre_move {
            Some((notation, side, from, to)) => Some(PreMove {
                move_notation: notation.to_string(),
                actor_color: side,
                origin_square: from.parse()?,
                destination_square: to.parse()?,
            }),
            None => None,
        };

        let solution_steps = self
            .steps
            .iter()
            .map(|&(actor, notation, from, to)| -> Result<SolutionStep, RulesError> {
                Ok(SolutionStep::new(actor, notation, from.parse()?, to.parse()?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Puzzle {
            id: self.id.to_string(),
            title: self.title.to_string(),
            starting_position: self.fen.to_string(),
            solution_steps,
            pre_move,
            difficulty: self.difficulty,
            theme: self.theme.to_string(),
            phase: self.phase,
        })
    }
}

/// The bundled puzzles, in presentation order.
pub fn builtin_puzzles() -> Result<Vec<Puzzle>, RulesError> {
    BUILTIN_PUZZLES.iter().map(PuzzleDef::to_puzzle).collect()
}
