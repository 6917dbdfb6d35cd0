//! Board position
//!
//! `Position` is an immutable value: board contents plus side to move. It is
//! the key of the position graph, so equality is plain byte equality of the
//! 64 squares and the side to move. New positions are only produced by
//! copying a parent ([`Position::successor`]) and editing the copy, never by
//! mutating a position that may already be stored somewhere.

pub mod fen;
pub mod notation;
pub mod record;

use crate::types::{Color, Piece, PieceKind, Square};

/// Board contents plus side to move
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    side_to_move: Color,
    squares: [Piece; Square::NUM],
}

impl Position {
    /// Empty board
    pub const fn empty(side_to_move: Color) -> Position {
        Position { side_to_move, squares: [Piece::EMPTY; Square::NUM] }
    }

    /// Standard starting position
    pub fn startpos() -> Position {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut pos = Position::empty(Color::White);
        for (file, kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            for color in [Color::White, Color::Black] {
                let back = color.back_rank();
                let pawns = (back as i8 + color.pawn_direction()) as u8;
                if let (Some(piece_sq), Some(pawn_sq)) =
                    (Square::new(file, back), Square::new(file, pawns))
                {
                    pos.set(piece_sq, Piece::new(color, *kind));
                    pos.set(pawn_sq, Piece::new(color, PieceKind::Pawn));
                }
            }
        }
        pos
    }

    #[inline]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub const fn piece_at(&self, sq: Square) -> Piece {
        self.squares[sq.index()]
    }

    /// Raw squares, a1 first
    #[inline]
    pub const fn squares(&self) -> &[Piece; Square::NUM] {
        &self.squares
    }

    /// Occupied squares with their pieces
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all()
            .map(|sq| (sq, self.piece_at(sq)))
            .filter(|(_, piece)| piece.is_present())
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.is(color, PieceKind::King))
            .map(|(sq, _)| sq)
    }

    /// Same board with the other side to move
    ///
    /// Used to ask "would the side to move be attacked if it passed".
    pub fn with_side_to_move(&self, side_to_move: Color) -> Position {
        Position { side_to_move, squares: self.squares }
    }

    /// Material of the side to move minus material of the opponent
    pub fn material_balance(&self) -> i32 {
        self.pieces()
            .map(|(_, piece)| match (piece.kind(), piece.color()) {
                (Some(kind), Some(color)) if color == self.side_to_move => kind.material(),
                (Some(kind), Some(_)) => -kind.material(),
                _ => 0,
            })
            .sum()
    }

    /// Copy of this position with the turn passed to the opponent
    ///
    /// En passant rights of the new side to move expire here: they only
    /// existed for the one reply the mover just made, so every pawn of the
    /// side now to move loses its "advanced two squares" flag. Keeping the
    /// flags canonical is what makes transpositions compare equal.
    pub(crate) fn successor(&self) -> Position {
        let mut next = Position { side_to_move: self.side_to_move.opponent(), squares: self.squares };
        let stm = next.side_to_move;
        for piece in next.squares.iter_mut() {
            if piece.flag() && piece.is(stm, PieceKind::Pawn) {
                *piece = piece.without_flag();
            }
        }
        next
    }

    /// Whether an enemy pawn stands beside `sq`, where a pawn of `mover`
    /// has just landed after advancing two squares
    ///
    /// The en passant flag is only kept when this holds, so positions that
    /// differ in nothing a capture could use compare equal.
    pub(crate) fn has_en_passant_attacker(&self, sq: Square, mover: Color) -> bool {
        [-1, 1].into_iter().any(|df| {
            sq.offset(df, 0)
                .is_some_and(|side| self.piece_at(side).is(mover.opponent(), PieceKind::Pawn))
        })
    }

    #[inline]
    pub(crate) fn set(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index()] = piece;
    }

    pub(crate) fn from_parts(side_to_move: Color, squares: [Piece; Square::NUM]) -> Position {
        Position { side_to_move, squares }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let letter = Square::new(file, rank)
                    .and_then(|sq| self.piece_at(sq).letter())
                    .unwrap_or('.');
                write!(f, " {letter}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{} to move", self.side_to_move)
    }
}
