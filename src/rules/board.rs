//! `ChessRules` backed by the `chess-engine` crate.
//!
//! `chess-engine` boards are immutable values without FEN support, so the
//! position carries the FEN-only fields (castling rights, en passant square,
//! move clocks) next to the board, plus the stack of earlier states that
//! `undo` pops.
//!
//! Coordinate mapping: `Position::new(rank, file)` where rank 0-7 = ranks 1-8
//! and file 0-7 = files a-h.

use super::notation::{check_suffix, san_for_move};
use super::{AppliedMove, ChessRules, PieceKind, PromotionPiece, RulesError, Side, Square};
use chess_engine::{Board, BoardBuilder, Color as ChessColor, Evaluate, Move, Piece, Position};
use tracing::debug;

/// Castling availability as written in the FEN castling field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    fn from_fen(field: &str) -> Option<Self> {
        let mut rights = Self::default();
        if field == "-" {
            return Some(rights);
        }
        for c in field.chars() {
            match c {
                'K' => rights.white_king_side = true,
                'Q' => rights.white_queen_side = true,
                'k' => rights.black_king_side = true,
                'q' => rights.black_queen_side = true,
                _ => return None,
            }
        }
        Some(rights)
    }

    fn to_fen(self) -> String {
        let mut s = String::new();
        if self.white_king_side {
            s.push('K');
        }
        if self.white_queen_side {
            s.push('Q');
        }
        if self.black_king_side {
            s.push('k');
        }
        if self.black_queen_side {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    /// Rights left after a move touching `from` and `to`. Moving a king or
    /// rook off its home square, or capturing on a rook home square, loses
    /// the matching right.
    fn after_move(mut self, from: Square, to: Square) -> Self {
        for sq in [from, to] {
            match (sq.file(), sq.rank()) {
                (4, 0) => {
                    self.white_king_side = false;
                    self.white_queen_side = false;
                }
                (7, 0) => self.white_king_side = false,
                (0, 0) => self.white_queen_side = false,
                (4, 7) => {
                    self.black_king_side = false;
                    self.black_queen_side = false;
                }
                (7, 7) => self.black_king_side = false,
                (0, 7) => self.black_queen_side = false,
                _ => {}
            }
        }
        self
    }
}

#[derive(Debug, Clone)]
struct BoardState {
    board: Board,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// Position value handed out by [`BoardRules`].
#[derive(Debug, Clone)]
pub struct BoardPosition {
    state: BoardState,
    undo_stack: Vec<BoardState>,
}

impl BoardPosition {
    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn castling(&self) -> CastlingRights {
        self.state.castling
    }

    /// Number of plies that can still be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}

/// Standard chess rules via `chess-engine`.
///
/// Promotion is always to a queen in `chess-engine`; requesting any other
/// promotion piece is refused as an illegal move.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardRules;

impl BoardRules {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn to_position(square: Square) -> Position {
    Position::new(square.rank() as i32, square.file() as i32)
}

pub(crate) fn to_square(position: Position) -> Option<Square> {
    Square::new(position.get_col() as u8, position.get_row() as u8)
}

pub(crate) fn to_side(color: ChessColor) -> Side {
    match color {
        ChessColor::White => Side::White,
        ChessColor::Black => Side::Black,
    }
}

fn to_chess_color(side: Side) -> ChessColor {
    match side {
        Side::White => ChessColor::White,
        Side::Black => ChessColor::Black,
    }
}

pub(crate) fn piece_kind(piece: &Piece) -> PieceKind {
    match piece {
        Piece::King(..) => PieceKind::King,
        Piece::Queen(..) => PieceKind::Queen,
        Piece::Rook(..) => PieceKind::Rook,
        Piece::Bishop(..) => PieceKind::Bishop,
        Piece::Knight(..) => PieceKind::Knight,
        Piece::Pawn(..) => PieceKind::Pawn,
    }
}

fn piece_to_fen_char(piece: &Piece) -> char {
    let c = match piece_kind(piece) {
        PieceKind::King => 'k',
        PieceKind::Queen => 'q',
        PieceKind::Rook => 'r',
        PieceKind::Bishop => 'b',
        PieceKind::Knight => 'n',
        PieceKind::Pawn => 'p',
    };
    if piece.get_color() == ChessColor::White {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

fn piece_from_fen_char(c: char, position: Position) -> Option<Piece> {
    let color = if c.is_ascii_uppercase() {
        ChessColor::White
    } else {
        ChessColor::Black
    };
    let piece = match c.to_ascii_lowercase() {
        'k' => Piece::King(color, position),
        'q' => Piece::Queen(color, position),
        'r' => Piece::Rook(color, position),
        'b' => Piece::Bishop(color, position),
        'n' => Piece::Knight(color, position),
        'p' => Piece::Pawn(color, position),
        _ => return None,
    };
    Some(piece)
}

/// Translate a from/to square pair into an engine move. A king moving two
/// files along its rank is castling.
fn resolve_move(board: &Board, origin: Square, destination: Square) -> Option<Move> {
    let from = to_position(origin);
    let piece = board.get_piece(from)?;
    if piece.is_king() && origin.rank() == destination.rank() {
        if destination.file() == origin.file() + 2 {
            return Some(Move::KingSideCastle);
        }
        if origin.file() >= 2 && destination.file() == origin.file() - 2 {
            return Some(Move::QueenSideCastle);
        }
    }
    Some(Move::Piece(from, to_position(destination)))
}

fn invalid_fen(fen: &str, reason: impl Into<String>) -> RulesError {
    RulesError::InvalidFen {
        fen: fen.to_string(),
        reason: reason.into(),
    }
}

fn build_board(pieces: &[Piece], castling: CastlingRights) -> Board {
    let mut builder = pieces
        .iter()
        .fold(BoardBuilder::default(), |builder, &piece| builder.piece(piece));
    if castling.white_king_side {
        builder = builder.enable_kingside_castle(ChessColor::White);
    }
    if castling.white_queen_side {
        builder = builder.enable_queenside_castle(ChessColor::White);
    }
    if castling.black_king_side {
        builder = builder.enable_kingside_castle(ChessColor::Black);
    }
    if castling.black_queen_side {
        builder = builder.enable_queenside_castle(ChessColor::Black);
    }
    builder.build()
}

/// `chess-engine` only records an en passant square when it plays the double
/// push itself. Put the pushed pawn back on its home square and replay the
/// push so the capture is legal on the loaded board.
fn replay_double_push(
    fen: &str,
    mut pieces: Vec<Piece>,
    castling: CastlingRights,
    side: Side,
    target: Square,
) -> Result<Board, RulesError> {
    let pusher = side.opposite();
    // (home, skipped, landed) ranks of the pushing side
    let (home_rank, target_rank, landed_rank) = match pusher {
        Side::White => (1, 2, 3),
        Side::Black => (6, 5, 4),
    };
    if target.rank() != target_rank {
        return Err(invalid_fen(fen, "en passant square on the wrong rank"));
    }

    let file = target.file();
    let home = Square::new(file, home_rank).map(to_position);
    let landed = Square::new(file, landed_rank).map(to_position);
    let (Some(home), Some(landed)) = (home, landed) else {
        return Err(invalid_fen(fen, "bad en passant square"));
    };
    let skipped = to_position(target);

    let pusher_color = to_chess_color(pusher);
    let pushed = pieces
        .iter()
        .position(|p| p.is_pawn() && p.get_color() == pusher_color && p.get_pos() == landed);
    let blocked = pieces
        .iter()
        .any(|p| p.get_pos() == home || p.get_pos() == skipped);
    let Some(index) = pushed.filter(|_| !blocked) else {
        return Err(invalid_fen(
            fen,
            "en passant square without a double-pushed pawn",
        ));
    };
    pieces[index] = Piece::Pawn(pusher_color, home);

    let board = build_board(&pieces, castling)
        .set_turn(pusher_color)
        .apply_eval_move(Move::Piece(home, landed));
    debug!(%target, "en passant square restored");
    Ok(board)
}

impl ChessRules for BoardRules {
    type Position = BoardPosition;

    fn load(&self, fen: &str) -> Result<BoardPosition, RulesError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(invalid_fen(fen, "expected 4 to 6 fields"));
        }

        let rows: Vec<&str> = fields[0].split('/').collect();
        if rows.len() != 8 {
            return Err(invalid_fen(fen, "expected 8 ranks"));
        }

        let mut pieces = Vec::with_capacity(32);
        let mut kings = (0, 0);
        for (i, row) in rows.iter().enumerate() {
            let rank = 7 - i as i32;
            let mut file = 0i32;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as i32;
                    continue;
                }
                if file > 7 {
                    return Err(invalid_fen(fen, format!("rank {} overflows", rank + 1)));
                }
                let piece = piece_from_fen_char(c, Position::new(rank, file))
                    .ok_or_else(|| invalid_fen(fen, format!("unknown piece '{}'", c)))?;
                if piece.is_king() {
                    match piece.get_color() {
                        ChessColor::White => kings.0 += 1,
                        ChessColor::Black => kings.1 += 1,
                    }
                }
                pieces.push(piece);
                file += 1;
            }
            if file != 8 {
                return Err(invalid_fen(fen, format!("rank {} has {} files", rank + 1, file)));
            }
        }
        if kings != (1, 1) {
            return Err(invalid_fen(fen, "each side needs exactly one king"));
        }

        let side = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            other => return Err(invalid_fen(fen, format!("unknown side '{}'", other))),
        };

        let castling = CastlingRights::from_fen(fields[2])
            .ok_or_else(|| invalid_fen(fen, "bad castling field"))?;

        let en_passant = match fields[3] {
            "-" => None,
            sq => Some(
                sq.parse::<Square>()
                    .map_err(|_| invalid_fen(fen, "bad en passant square"))?,
            ),
        };

        let halfmove_clock = match fields.get(4) {
            Some(n) => n
                .parse()
                .map_err(|_| invalid_fen(fen, "bad halfmove clock"))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(n) => n
                .parse()
                .map_err(|_| invalid_fen(fen, "bad fullmove number"))?,
            None => 1,
        };

        let board = match en_passant {
            None => build_board(&pieces, castling).set_turn(to_chess_color(side)),
            Some(target) => replay_double_push(fen, pieces, castling, side, target)?,
        };

        Ok(BoardPosition {
            state: BoardState {
                board,
                castling,
                en_passant,
                halfmove_clock,
                fullmove_number,
            },
            undo_stack: Vec::new(),
        })
    }

    fn serialize(&self, position: &BoardPosition) -> String {
        let state = &position.state;
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match state.board.get_piece(Position::new(rank, file)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece_to_fen_char(&piece));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match to_side(state.board.get_turn_color()) {
            Side::White => "w",
            Side::Black => "b",
        };
        let en_passant = state
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            placement,
            side,
            state.castling.to_fen(),
            en_passant,
            state.halfmove_clock,
            state.fullmove_number
        )
    }

    fn apply_move(
        &self,
        position: &BoardPosition,
        origin: Square,
        destination: Square,
        promotion: Option<PromotionPiece>,
    ) -> Option<AppliedMove<BoardPosition>> {
        let state = &position.state;
        let board = &state.board;
        let mover = board.get_turn_color();
        let piece = board.get_piece(to_position(origin))?;
        let kind = piece_kind(&piece);

        let chess_move = resolve_move(board, origin, destination)?;
        let legal_moves = board.get_legal_moves();
        if !legal_moves.contains(&chess_move) {
            debug!(%origin, %destination, "illegal move refused");
            return None;
        }

        let last_rank = match to_side(mover) {
            Side::White => 7,
            Side::Black => 0,
        };
        let promoting = kind == PieceKind::Pawn && destination.rank() == last_rank;
        if promoting && !matches!(promotion, None | Some(PromotionPiece::Queen)) {
            debug!(%origin, %destination, ?promotion, "under-promotion is not supported");
            return None;
        }

        let mut notation = san_for_move(board, chess_move, &legal_moves);
        if promoting {
            notation.push('=');
            notation.push(PromotionPiece::Queen.san_letter());
        }

        let is_capture = board.get_piece(to_position(destination)).is_some()
            || (kind == PieceKind::Pawn && origin.file() != destination.file());
        let next_board = board.apply_eval_move(chess_move);
        notation.push_str(check_suffix(&next_board));

        let double_push = kind == PieceKind::Pawn && origin.rank().abs_diff(destination.rank()) == 2;
        let en_passant = if double_push {
            Square::new(origin.file(), (origin.rank() + destination.rank()) / 2)
        } else {
            None
        };
        let halfmove_clock = if kind == PieceKind::Pawn || is_capture {
            0
        } else {
            state.halfmove_clock + 1
        };
        let fullmove_number = if mover == ChessColor::Black {
            state.fullmove_number + 1
        } else {
            state.fullmove_number
        };

        let mut undo_stack = position.undo_stack.clone();
        undo_stack.push(state.clone());

        Some(AppliedMove {
            position: BoardPosition {
                state: BoardState {
                    board: next_board,
                    castling: state.castling.after_move(origin, destination),
                    en_passant,
                    halfmove_clock,
                    fullmove_number,
                },
                undo_stack,
            },
            notation,
        })
    }

    fn undo(&self, position: &BoardPosition) -> BoardPosition {
        let mut undo_stack = position.undo_stack.clone();
        match undo_stack.pop() {
            Some(state) => BoardPosition { state, undo_stack },
            None => position.clone(),
        }
    }

    fn legal_moves_from(&self, position: &BoardPosition, square: Square) -> Vec<Square> {
        let board = &position.state.board;
        let origin = to_position(square);
        let is_king = board
            .get_piece(origin)
            .map(|p| p.is_king() && p.get_color() == board.get_turn_color())
            .unwrap_or(false);

        let mut destinations = Vec::new();
        for m in board.get_legal_moves() {
            let dest = match m {
                Move::Piece(from, to) if from == origin => to_square(to),
                Move::KingSideCastle if is_king => Square::new(square.file() + 2, square.rank()),
                Move::QueenSideCastle if is_king && square.file() >= 2 => {
                    Square::new(square.file() - 2, square.rank())
                }
                _ => None,
            };
            if let Some(dest) = dest {
                destinations.push(dest);
            }
        }
        destinations
    }

    fn turn_color(&self, position: &BoardPosition) -> Side {
        to_side(position.state.board.get_turn_color())
    }
}
