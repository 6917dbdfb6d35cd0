//! Move representation

use smallvec::SmallVec;

use crate::types::{PieceKind, Square};

/// Upper bound used to size the inline move buffer (most positions fit)
pub const INLINE_MOVES: usize = 64;

/// Generated moves
pub type MoveList = SmallVec<[Move; INLINE_MOVES]>;

/// Special handling a move needs when it is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    /// Pawn advanced two squares (sets the en passant flag)
    DoubleStep,
    /// Pawn captured a pawn that just double-stepped past it
    EnPassant,
    /// King moved two squares; the rook jumps over it
    Castle,
}

/// A move in coordinate form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub kind: MoveKind,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Move {
        Move { from, to, promotion: None, kind: MoveKind::Normal }
    }

    #[inline]
    pub const fn with_kind(self, kind: MoveKind) -> Move {
        Move { kind, ..self }
    }

    #[inline]
    pub const fn promoting(self, kind: PieceKind) -> Move {
        Move { promotion: Some(kind), ..self }
    }
}

impl std::fmt::Display for Move {
    /// Coordinate notation: `e2e4`, `e7e8q`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}
