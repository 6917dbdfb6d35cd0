//! Attack detection

use crate::position::Position;
use crate::types::{Color, PieceKind, Square};

pub(crate) const KNIGHT_STEPS: [(i8, i8); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];

pub(crate) const KING_STEPS: [(i8, i8); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

pub(crate) const ROOK_RAYS: [(i8, i8); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

pub(crate) const BISHOP_RAYS: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Whether any piece of `by` attacks `sq`
pub fn is_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    // Pawns of `by` sit one rank behind the square they attack.
    let pawn_attack = [-1, 1].into_iter().any(|df| {
        sq.offset(df, -by.pawn_direction())
            .is_some_and(|from| pos.piece_at(from).is(by, PieceKind::Pawn))
    });
    if pawn_attack {
        return true;
    }

    let leaper = |steps: &[(i8, i8)], kind: PieceKind| {
        steps.iter().any(|&(df, dr)| {
            sq.offset(df, dr).is_some_and(|from| pos.piece_at(from).is(by, kind))
        })
    };
    if leaper(&KNIGHT_STEPS, PieceKind::Knight) || leaper(&KING_STEPS, PieceKind::King) {
        return true;
    }

    let slider = |rays: &[(i8, i8)], kind: PieceKind| {
        rays.iter().any(|&(df, dr)| {
            let mut cur = sq;
            while let Some(next) = cur.offset(df, dr) {
                let piece = pos.piece_at(next);
                if piece.is_present() {
                    return piece.is(by, kind) || piece.is(by, PieceKind::Queen);
                }
                cur = next;
            }
            false
        })
    };
    slider(&ROOK_RAYS, PieceKind::Rook) || slider(&BISHOP_RAYS, PieceKind::Bishop)
}

/// Whether the side that just moved left its own king attacked
///
/// A child position with this property is pseudo-legal only.
pub fn is_opponent_in_check(pos: &Position) -> bool {
    let mover = pos.side_to_move().opponent();
    pos.king_square(mover)
        .is_some_and(|king| is_attacked(pos, king, pos.side_to_move()))
}

/// Whether the side to move is in check
pub fn is_in_check(pos: &Position) -> bool {
    let stm = pos.side_to_move();
    pos.king_square(stm).is_some_and(|king| is_attacked(pos, king, stm.opponent()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(text: &str) -> Square {
        Square::parse(text).unwrap()
    }

    #[test]
    fn test_startpos_attacks() {
        let pos = Position::startpos();
        assert!(is_attacked(&pos, sq("f3"), Color::White));
        assert!(is_attacked(&pos, sq("e3"), Color::White));
        assert!(!is_attacked(&pos, sq("e4"), Color::White));
        assert!(is_attacked(&pos, sq("f6"), Color::Black));
        assert!(!is_in_check(&pos));
        assert!(!is_opponent_in_check(&pos));
    }

    #[test]
    fn test_slider_blocked() {
        let pos = Position::from_fen("4k3/8/8/8/4p3/8/8/R3K2R w - - 0 1").unwrap();
        assert!(is_attacked(&pos, sq("a8"), Color::White));
        assert!(!is_attacked(&pos, sq("e8"), Color::White));
    }

    #[test]
    fn test_pawn_attack_direction() {
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_attacked(&pos, sq("c4"), Color::Black));
        assert!(is_attacked(&pos, sq("e4"), Color::Black));
        assert!(!is_attacked(&pos, sq("c6"), Color::Black));
    }

    #[test]
    fn test_check_detection() {
        // black queen gives check along the e-file
        let pos = Position::from_fen("4k3/8/8/8/4q3/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_in_check(&pos));
        // same board with black to move: white left its king in check
        let passed = pos.with_side_to_move(Color::Black);
        assert!(is_opponent_in_check(&passed));
    }
}
