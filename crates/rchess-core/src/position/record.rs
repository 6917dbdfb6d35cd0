//! Persisted position record
//!
//! ```json
//! {"side_to_move": "white", "squares": [132, 144, ...]}
//! ```
//!
//! `squares` holds the 64 raw piece bytes, a1 first. Decoding checks the
//! length and every byte, and that each side has one king.

use serde::{Deserialize, Serialize};

use super::Position;
use super::fen::count_kings;
use crate::error::PositionError;
use crate::types::{Color, Piece, Square};

/// Serde view of a [`Position`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub side_to_move: Color,
    pub squares: Vec<u8>,
}

impl From<&Position> for PositionRecord {
    fn from(pos: &Position) -> Self {
        PositionRecord {
            side_to_move: pos.side_to_move(),
            squares: pos.squares().iter().map(|p| p.byte()).collect(),
        }
    }
}

impl TryFrom<PositionRecord> for Position {
    type Error = PositionError;

    fn try_from(record: PositionRecord) -> Result<Self, Self::Error> {
        if record.squares.len() != Square::NUM {
            return Err(PositionError::SquareCount(record.squares.len()));
        }
        let mut squares = [Piece::EMPTY; Square::NUM];
        for (index, (&byte, slot)) in record.squares.iter().zip(squares.iter_mut()).enumerate() {
            *slot = Piece::from_byte(byte).ok_or(PositionError::InvalidSquare { index, byte })?;
        }
        let pos = Position::from_parts(record.side_to_move, squares);
        count_kings(&pos)?;
        Ok(pos)
    }
}

impl Position {
    pub fn to_json(&self) -> String {
        serde_json::to_string(&PositionRecord::from(self)).unwrap_or_default()
    }

    pub fn from_json(text: &str) -> Result<Position, PositionError> {
        let record: PositionRecord = serde_json::from_str(text)?;
        Position::try_from(record)
    }
}
