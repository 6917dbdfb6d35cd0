//! Coordinate move notation (`e2e4`, `e7e8q`)

use super::Position;
use crate::error::NotationError;
use crate::movegen::{self, Move};
use crate::types::{PieceKind, Square};

impl Position {
    /// Legal move matching `text`, with the child it leads to
    pub fn parse_move(&self, text: &str) -> Result<(Move, Position), NotationError> {
        let text = text.trim();
        let malformed = || NotationError::Malformed(text.to_string());
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(malformed());
        }
        let from = Square::parse(&text[0..2]).ok_or_else(malformed)?;
        let to = Square::parse(&text[2..4]).ok_or_else(malformed)?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
                _ => return Err(malformed()),
            },
        };

        movegen::legal_moves(self)
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
            .map(|mv| (mv, movegen::apply(self, mv)))
            .ok_or_else(|| NotationError::NoSuchMove(text.to_string()))
    }

    /// Legal move leading from this position to `child`
    pub fn move_to(&self, child: &Position) -> Option<Move> {
        movegen::legal_moves(self)
            .into_iter()
            .find(|&mv| movegen::apply(self, mv) == *child)
    }

    /// Coordinate text of the move to `child`, `"?"` when none leads there
    pub fn describe_move(&self, child: &Position) -> String {
        self.move_to(child).map_or_else(|| "?".to_string(), |mv| mv.to_string())
    }
}
