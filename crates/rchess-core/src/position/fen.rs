//! FEN import/export
//!
//! Castling rights and the en passant square are folded into the piece
//! flags: a king or rook without the right is marked as moved, and the pawn
//! that just advanced two squares carries the flag. Halfmove and fullmove
//! counters are accepted and ignored (they are not part of the position).

use super::Position;
use crate::error::PositionError;
use crate::types::{Color, Piece, PieceKind, Square};

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Castling corner: (color, rook file, FEN letter)
const CORNERS: [(Color, u8, char); 4] = [
    (Color::White, 7, 'K'),
    (Color::White, 0, 'Q'),
    (Color::Black, 7, 'k'),
    (Color::Black, 0, 'q'),
];

const KING_FILE: u8 = 4;

impl Position {
    /// Parse a FEN string
    pub fn from_fen(fen: &str) -> Result<Position, PositionError> {
        let invalid = |why: &str| PositionError::InvalidFen(format!("{why}: {fen:?}"));
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or_else(|| invalid("missing placement"))?;
        let side = match fields.next().unwrap_or("w") {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(invalid("bad side to move")),
        };
        let castling = fields.next().unwrap_or("-");
        let en_passant = fields.next().unwrap_or("-");

        let mut pos = Position::empty(side);
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid("placement needs 8 ranks"));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(invalid("bad empty-square count"));
                    }
                    file = file
                        .checked_add(skip as u8)
                        .filter(|&f| f <= 8)
                        .ok_or_else(|| invalid("rank too long"))?;
                    continue;
                }
                let kind = PieceKind::from_letter(c).ok_or_else(|| invalid("bad piece letter"))?;
                let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                let sq = Square::new(file, rank).ok_or_else(|| invalid("rank too long"))?;
                // Kings and rooks count as moved until a castling right says otherwise.
                let piece = match kind {
                    PieceKind::King | PieceKind::Rook => Piece::new(color, kind).with_flag(),
                    _ => Piece::new(color, kind),
                };
                pos.set(sq, piece);
                file += 1;
            }
            if file != 8 {
                return Err(invalid("rank does not cover 8 files"));
            }
        }

        count_kings(&pos)?;

        if castling != "-" {
            for c in castling.chars() {
                let &(color, rook_file, _) = CORNERS
                    .iter()
                    .find(|(_, _, letter)| *letter == c)
                    .ok_or_else(|| invalid("bad castling field"))?;
                let back = color.back_rank();
                let king_sq = Square::new(KING_FILE, back).ok_or_else(|| invalid("castling"))?;
                let rook_sq = Square::new(rook_file, back).ok_or_else(|| invalid("castling"))?;
                let king = pos.piece_at(king_sq);
                let rook = pos.piece_at(rook_sq);
                if !king.is(color, PieceKind::King) || !rook.is(color, PieceKind::Rook) {
                    return Err(invalid("castling right without king and rook in place"));
                }
                pos.set(king_sq, king.without_flag());
                pos.set(rook_sq, rook.without_flag());
            }
        }

        if en_passant != "-" {
            let target = Square::parse(en_passant).ok_or_else(|| invalid("bad en passant square"))?;
            // The pawn that moved belongs to the side that is *not* to move.
            let mover = side.opponent();
            let pawn_sq = target
                .offset(0, mover.pawn_direction())
                .ok_or_else(|| invalid("bad en passant square"))?;
            let pawn = pos.piece_at(pawn_sq);
            if !pawn.is(mover, PieceKind::Pawn) {
                return Err(invalid("en passant square without a pawn in front"));
            }
            // A right nobody can use is dropped.
            if pos.has_en_passant_attacker(pawn_sq, mover) {
                pos.set(pawn_sq, pawn.with_flag());
            }
        }

        Ok(pos)
    }

    /// Render as FEN (clocks are always `0 1`)
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let letter = Square::new(file, rank).and_then(|sq| self.piece_at(sq).letter());
                match letter {
                    Some(letter) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(letter);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        let mut any_castling = false;
        for (color, rook_file, letter) in CORNERS {
            let back = color.back_rank();
            let unmoved = |file: u8, kind: PieceKind| {
                Square::new(file, back).is_some_and(|sq| self.piece_at(sq).is_unmoved(color, kind))
            };
            if unmoved(KING_FILE, PieceKind::King) && unmoved(rook_file, PieceKind::Rook) {
                out.push(letter);
                any_castling = true;
            }
        }
        if !any_castling {
            out.push('-');
        }

        out.push(' ');
        let mover = self.side_to_move().opponent();
        let target = self
            .pieces()
            .find(|(_, piece)| piece.flag() && piece.is(mover, PieceKind::Pawn))
            .and_then(|(sq, _)| sq.offset(0, -mover.pawn_direction()));
        match target {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }

        out.push_str(" 0 1");
        out
    }
}

pub(crate) fn count_kings(pos: &Position) -> Result<(), PositionError> {
    let white = pos.pieces().filter(|(_, p)| p.is(Color::White, PieceKind::King)).count();
    let black = pos.pieces().filter(|(_, p)| p.is(Color::Black, PieceKind::King)).count();
    if white == 1 && black == 1 {
        Ok(())
    } else {
        Err(PositionError::KingCount { white, black })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_fen() {
        let pos = Position::from_fen(STARTPOS_FEN).unwrap();
        assert_eq!(pos, Position::startpos());
        assert_eq!(pos.to_fen(), STARTPOS_FEN);
    }

    #[test]
    fn test_castling_rights_map_to_flags() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").unwrap();
        let piece = |s: &str| pos.piece_at(Square::parse(s).unwrap());
        assert!(!piece("e1").flag());
        assert!(!piece("h1").flag());
        assert!(piece("a1").flag());
        assert!(!piece("e8").flag());
        assert!(!piece("a8").flag());
        assert!(piece("h8").flag());
        assert_eq!(pos.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1");
    }

    #[test]
    fn test_en_passant_square() {
        let fen = "rnbqkbnr/pppp1ppp/8/8/3Pp3/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert!(pos.piece_at(Square::parse("d4").unwrap()).flag());
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn test_rejects_bad_fen() {
        assert!(matches!(Position::from_fen(""), Err(PositionError::InvalidFen(_))));
        assert!(matches!(Position::from_fen("8/8/8 w - - 0 1"), Err(PositionError::InvalidFen(_))));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(PositionError::KingCount { white: 0, black: 0 })
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w K - 0 1"),
            Err(PositionError::InvalidFen(_))
        ));
    }

    #[test]
    fn test_rejects_overlong_ranks() {
        let nines = "9".repeat(30);
        let fen = format!("{nines}/8/8/8/8/8/8/4K2k w - - 0 1");
        assert!(matches!(Position::from_fen(&fen), Err(PositionError::InvalidFen(_))));
        for fen in [
            "44k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
            "4k3/9/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/08/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3R w - - 0 1",
        ] {
            assert!(matches!(Position::from_fen(fen), Err(PositionError::InvalidFen(_))), "{fen}");
        }
    }

    #[test]
    fn test_unusable_en_passant_square_is_dropped() {
        let pos = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert!(!pos.piece_at(Square::parse("e4").unwrap()).flag());
        assert_eq!(pos, Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1").unwrap());
        assert_eq!(pos.to_fen(), "4k3/8/8/8/4P3/8/8/4K3 b - - 0 1");
    }
}
