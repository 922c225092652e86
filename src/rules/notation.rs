//! Standard algebraic notation for `chess-engine` moves.

use super::board::{piece_kind, to_square};
use super::PieceKind;
use chess_engine::{Board, Move, Position};

/// Algebraic notation for `chess_move` on `board`, without promotion or
/// check suffixes. `legal_moves` is used for disambiguation.
pub fn san_for_move(board: &Board, chess_move: Move, legal_moves: &[Move]) -> String {
    let (from, to) = match chess_move {
        Move::Piece(from, to) => (from, to),
        Move::KingSideCastle => return "O-O".to_string(),
        Move::QueenSideCastle => return "O-O-O".to_string(),
        Move::Resign => return "resigns".to_string(),
    };
    let (Some(from_sq), Some(to_sq)) = (to_square(from), to_square(to)) else {
        return String::new();
    };
    let Some(piece) = board.get_piece(from) else {
        return String::new();
    };
    let kind = piece_kind(&piece);

    if kind == PieceKind::Pawn {
        // Pawn captures change file, including en passant
        return if from_sq.file() != to_sq.file() {
            format!("{}x{}", from_sq.file_char(), to_sq)
        } else {
            to_sq.to_string()
        };
    }

    let capture = if board.get_piece(to).is_some() { "x" } else { "" };
    format!(
        "{}{}{}{}",
        kind.san_letter(),
        disambiguation(board, kind, from, to, legal_moves),
        capture,
        to_sq
    )
}

/// File, rank, or full square of the origin when another piece of the same
/// kind can also reach the destination.
fn disambiguation(
    board: &Board,
    kind: PieceKind,
    from: Position,
    to: Position,
    legal_moves: &[Move],
) -> String {
    if kind == PieceKind::King {
        return String::new();
    }

    let rivals: Vec<Position> = legal_moves
        .iter()
        .filter_map(|m| match *m {
            Move::Piece(f, t) if t == to && f != from => Some(f),
            _ => None,
        })
        .filter(|f| board.get_piece(*f).map(|p| piece_kind(&p)) == Some(kind))
        .collect();

    let Some(from_sq) = to_square(from) else {
        return String::new();
    };
    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|r| r.get_col() != from.get_col()) {
        return from_sq.file_char().to_string();
    }
    if rivals.iter().all(|r| r.get_row() != from.get_row()) {
        return from_sq.rank_char().to_string();
    }
    from_sq.to_string()
}

/// `#` for checkmate, `+` for check, nothing otherwise. `after` is the
/// board with the move applied and the turn passed to the defender.
pub fn check_suffix(after: &Board) -> &'static str {
    if after.is_checkmate() {
        "#"
    } else if after.is_in_check(after.get_turn_color()) {
        "+"
    } else {
        ""
    }
}

/// Notation with check, mate and annotation marks stripped, so `Qxf7#`,
/// `Qxf7+` and `Qxf7!` all compare equal to `Qxf7`. `0-0` is read as `O-O`.
pub fn normalize_san(notation: &str) -> String {
    notation
        .trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace('0', "O")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::board::to_position;
    use crate::rules::{BoardRules, ChessRules, Square};
    use chess_engine::Evaluate;

    fn square_position(s: &str) -> Option<Position> {
        s.parse::<Square>().ok().map(to_position)
    }

    fn san(fen: &str, from: &str, to: &str) -> String {
        let rules = BoardRules::new();
        let pos = rules.load(fen).unwrap();
        let board = pos.board();
        let m = Move::Piece(square_position(from).unwrap(), square_position(to).unwrap());
        san_for_move(board, m, &board.get_legal_moves())
    }

    #[test]
    fn test_pawn_push_and_capture() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        assert_eq!(san(fen, "e4", "e5"), "e5");
        assert_eq!(san(fen, "e4", "d5"), "exd5");
    }

    #[test]
    fn test_piece_capture() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        assert_eq!(san(fen, "h5", "f7"), "Qxf7");
    }

    #[test]
    fn test_knight_disambiguation_by_file() {
        // Knights on b1 and f3 can both reach d2
        let fen = "4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1";
        assert_eq!(san(fen, "b1", "d2"), "Nbd2");
        assert_eq!(san(fen, "f3", "d2"), "Nfd2");
    }

    #[test]
    fn test_rook_disambiguation_by_rank() {
        // Rooks on a1 and a5 can both reach a3
        let fen = "4k3/8/8/R7/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san(fen, "a1", "a3"), "R1a3");
        assert_eq!(san(fen, "a5", "a3"), "R5a3");
    }

    #[test]
    fn test_castling_notation() {
        let board = chess_engine::Board::default();
        assert_eq!(san_for_move(&board, Move::KingSideCastle, &[]), "O-O");
        assert_eq!(san_for_move(&board, Move::QueenSideCastle, &[]), "O-O-O");
    }

    #[test]
    fn test_normalize_strips_marks() {
        assert_eq!(normalize_san("Qxf7#"), "Qxf7");
        assert_eq!(normalize_san("Nf3+"), "Nf3");
        assert_eq!(normalize_san(" e4!? "), "e4");
        assert_eq!(normalize_san("0-0-0"), "O-O-O");
        assert_eq!(normalize_san("e8=Q+"), "e8=Q");
    }
}
