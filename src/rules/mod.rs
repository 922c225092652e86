//! The chess rules capability consumed by the solve engine.
//!
//! The engine never implements chess itself. It drives an injected
//! [`ChessRules`] over opaque position values, owning exactly one current
//! position at a time.

pub mod board;
pub mod notation;

pub use board::{BoardPosition, BoardRules};
pub use notation::normalize_san;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failures raised by a rules capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("invalid square '{0}'")]
    InvalidSquare(String),
}

/// A board square. `file` 0-7 = a-h, `rank` 0-7 = ranks 1-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.rank) as char
    }
}

impl FromStr for Square {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(RulesError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| RulesError::InvalidSquare(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = RulesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Piece that makes a move written in algebraic notation.
    /// Castling is a king move; anything without a piece letter is a pawn.
    pub fn from_san(notation: &str) -> Self {
        let notation = notation.trim();
        if notation.starts_with("O-O") || notation.starts_with("0-0") {
            return Self::King;
        }
        match notation.chars().next() {
            Some('K') => Self::King,
            Some('Q') => Self::Queen,
            Some('R') => Self::Rook,
            Some('B') => Self::Bishop,
            Some('N') => Self::Knight,
            _ => Self::Pawn,
        }
    }

    pub fn san_letter(&self) -> &'static str {
        match self {
            Self::King => "K",
            Self::Queen => "Q",
            Self::Rook => "R",
            Self::Bishop => "B",
            Self::Knight => "N",
            Self::Pawn => "",
        }
    }
}

/// Piece a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    /// Parse `q`/`r`/`b`/`n` in either case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(Self::Queen),
            'r' => Some(Self::Rook),
            'b' => Some(Self::Bishop),
            'n' => Some(Self::Knight),
            _ => None,
        }
    }

    /// Promotion piece named by a `=X` suffix in algebraic notation.
    pub fn from_san(notation: &str) -> Option<Self> {
        let (_, suffix) = notation.split_once('=')?;
        suffix.chars().next().and_then(Self::from_char)
    }

    pub fn san_letter(&self) -> char {
        match self {
            Self::Queen => 'Q',
            Self::Rook => 'R',
            Self::Bishop => 'B',
            Self::Knight => 'N',
        }
    }
}

/// Result of a legal move: the new position and the move's canonical notation.
#[derive(Debug, Clone)]
pub struct AppliedMove<P> {
    pub position: P,
    pub notation: String,
}

/// Legal-move validation, move application and position transcription.
///
/// Positions are values: every operation takes a position and returns a new
/// one. `undo` must revert the most recent `apply_move` that produced the
/// position it is given.
pub trait ChessRules {
    type Position: Clone + fmt::Debug;

    fn load(&self, fen: &str) -> Result<Self::Position, RulesError>;

    fn serialize(&self, position: &Self::Position) -> String;

    /// Returns `None` when the move is illegal.
    fn apply_move(
        &self,
        position: &Self::Position,
        origin: Square,
        destination: Square,
        promotion: Option<PromotionPiece>,
    ) -> Option<AppliedMove<Self::Position>>;

    /// Reverts one ply. A position with nothing to undo is returned unchanged.
    fn undo(&self, position: &Self::Position) -> Self::Position;

    fn legal_moves_from(&self, position: &Self::Position, square: Square) -> Vec<Square>;

    fn turn_color(&self, position: &Self::Position) -> Side;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parse_and_display() {
        let sq: Square = "e4".parse().unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.to_string(), "e4");
        assert_eq!("H8".parse::<Square>().unwrap().to_string(), "h8");
    }

    #[test]
    fn test_square_parse_rejects_garbage() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_serde_as_string() {
        let sq = Square::new(6, 0).unwrap();
        let json = serde_json::to_string(&sq).unwrap();
        assert_eq!(json, "\"g1\"");
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sq);
        assert!(serde_json::from_str::<Square>("\"z9\"").is_err());
    }

    #[test]
    fn test_piece_kind_from_san() {
        assert_eq!(PieceKind::from_san("Nf3"), PieceKind::Knight);
        assert_eq!(PieceKind::from_san("Qxf7#"), PieceKind::Queen);
        assert_eq!(PieceKind::from_san("exd5"), PieceKind::Pawn);
        assert_eq!(PieceKind::from_san("O-O-O"), PieceKind::King);
        assert_eq!(PieceKind::from_san("e8=Q+"), PieceKind::Pawn);
    }

    #[test]
    fn test_promotion_from_san() {
        assert_eq!(PromotionPiece::from_san("e8=Q+"), Some(PromotionPiece::Queen));
        assert_eq!(PromotionPiece::from_san("axb1=N"), Some(PromotionPiece::Knight));
        assert_eq!(PromotionPiece::from_san("Nf3"), None);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::White.opposite(), Side::Black);
        assert_eq!(Side::Black.opposite(), Side::White);
    }
}
