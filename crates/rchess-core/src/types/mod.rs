//! Basic types
//!
//! - `Color`: side to move
//! - `Piece` / `PieceKind`: one byte per square
//! - `Square`: board index (a1 = 0, h8 = 63)
//! - `Evaluation` / `Outcome`: ordered position value

mod color;
mod evaluation;
mod piece;
mod square;

pub use color::Color;
pub use evaluation::{Evaluation, Outcome};
pub use piece::{Piece, PieceKind};
pub use square::Square;
