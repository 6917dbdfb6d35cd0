//! Move generation
//!
//! Moves are generated pseudo-legally and turned into child positions with
//! [`apply`]; legality is decided on the child with
//! [`is_opponent_in_check`]. Castling is only generated when the king does
//! not start, pass or land on an attacked square, so castling children are
//! always legal.

mod attack;
mod types;

#[cfg(test)]
mod tests;

pub use attack::{is_attacked, is_in_check, is_opponent_in_check};
pub use types::{Move, MoveKind, MoveList};

use attack::{BISHOP_RAYS, KING_STEPS, KNIGHT_STEPS, ROOK_RAYS};

use crate::position::Position;
use crate::types::{Piece, PieceKind, Square};

/// Rook files and the files the king and rook land on when castling
struct CastleSide {
    rook_file: u8,
    king_to: u8,
    rook_to: u8,
    /// Files between king and rook that must be empty
    empty: &'static [u8],
    /// Files the king crosses (including start and destination)
    safe: &'static [u8],
}

const KING_FILE: u8 = 4;

const CASTLE_SIDES: [CastleSide; 2] = [
    CastleSide { rook_file: 7, king_to: 6, rook_to: 5, empty: &[5, 6], safe: &[4, 5, 6] },
    CastleSide { rook_file: 0, king_to: 2, rook_to: 3, empty: &[1, 2, 3], safe: &[4, 3, 2] },
];

/// All pseudo-legal moves of the side to move
pub fn generate_moves(pos: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let stm = pos.side_to_move();
    for (from, piece) in pos.pieces().filter(|(_, p)| p.belongs_to(stm)) {
        match piece.kind() {
            Some(PieceKind::Pawn) => pawn_moves(pos, from, &mut moves),
            Some(PieceKind::Knight) => step_moves(pos, from, &KNIGHT_STEPS, &mut moves),
            Some(PieceKind::Bishop) => ray_moves(pos, from, &BISHOP_RAYS, &mut moves),
            Some(PieceKind::Rook) => ray_moves(pos, from, &ROOK_RAYS, &mut moves),
            Some(PieceKind::Queen) => {
                ray_moves(pos, from, &ROOK_RAYS, &mut moves);
                ray_moves(pos, from, &BISHOP_RAYS, &mut moves);
            }
            Some(PieceKind::King) => {
                step_moves(pos, from, &KING_STEPS, &mut moves);
                castle_moves(pos, from, piece, &mut moves);
            }
            None => {}
        }
    }
    moves
}

/// Legal moves of the side to move
pub fn legal_moves(pos: &Position) -> MoveList {
    generate_moves(pos)
        .into_iter()
        .filter(|&mv| !is_opponent_in_check(&apply(pos, mv)))
        .collect()
}

/// Child positions reachable by a pseudo-legal move
pub fn pseudo_children(pos: &Position) -> Vec<Position> {
    generate_moves(pos).into_iter().map(|mv| apply(pos, mv)).collect()
}

/// Child positions reachable by a legal move, in generation order
pub fn legal_children(pos: &Position) -> Vec<Position> {
    pseudo_children(pos)
        .into_iter()
        .filter(|child| !is_opponent_in_check(child))
        .collect()
}

/// Position after `mv`
///
/// `mv` must come from [`generate_moves`] for `pos`.
pub fn apply(pos: &Position, mv: Move) -> Position {
    let mut next = pos.successor();
    let stm = pos.side_to_move();
    let moving = pos.piece_at(mv.from);
    next.set(mv.from, Piece::EMPTY);

    let placed = match (mv.promotion, moving.kind()) {
        (Some(PieceKind::Rook), _) => Piece::new(stm, PieceKind::Rook).with_flag(),
        (Some(kind), _) => Piece::new(stm, kind),
        (None, Some(PieceKind::King | PieceKind::Rook)) => moving.with_flag(),
        (None, _) if mv.kind == MoveKind::DoubleStep && pos.has_en_passant_attacker(mv.to, stm) => {
            moving.with_flag()
        }
        (None, _) => moving.without_flag(),
    };
    next.set(mv.to, placed);

    match mv.kind {
        MoveKind::EnPassant => {
            if let Some(captured) = Square::new(mv.to.file(), mv.from.rank()) {
                next.set(captured, Piece::EMPTY);
            }
        }
        MoveKind::Castle => {
            let back = mv.from.rank();
            let side = if mv.to.file() > mv.from.file() { &CASTLE_SIDES[0] } else { &CASTLE_SIDES[1] };
            if let (Some(rook_from), Some(rook_to)) =
                (Square::new(side.rook_file, back), Square::new(side.rook_to, back))
            {
                let rook = pos.piece_at(rook_from);
                next.set(rook_from, Piece::EMPTY);
                next.set(rook_to, rook.with_flag());
            }
        }
        MoveKind::Normal | MoveKind::DoubleStep => {}
    }
    next
}

/// Leaf count of the legal move tree to `depth`
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let children = legal_children(pos);
    if depth == 1 {
        return children.len() as u64;
    }
    children.iter().map(|child| perft(child, depth - 1)).sum()
}

fn pawn_moves(pos: &Position, from: Square, moves: &mut MoveList) {
    let stm = pos.side_to_move();
    let dir = stm.pawn_direction();
    let promotion_rank = stm.opponent().back_rank();
    let start_rank = (stm.back_rank() as i8 + dir) as u8;

    let mut push = |mv: Move| {
        if mv.to.rank() == promotion_rank {
            for kind in PieceKind::PROMOTIONS {
                moves.push(mv.promoting(kind));
            }
        } else {
            moves.push(mv);
        }
    };

    if let Some(one) = from.offset(0, dir).filter(|&sq| pos.piece_at(sq).is_empty()) {
        push(Move::new(from, one));
        if from.rank() == start_rank {
            if let Some(two) = one.offset(0, dir).filter(|&sq| pos.piece_at(sq).is_empty()) {
                push(Move::new(from, two).with_kind(MoveKind::DoubleStep));
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = from.offset(df, dir) else { continue };
        let target = pos.piece_at(to);
        if target.belongs_to(stm.opponent()) {
            push(Move::new(from, to));
        } else if target.is_empty() && en_passant_victim(pos, from, df) {
            push(Move::new(from, to).with_kind(MoveKind::EnPassant));
        }
    }
}

/// An opponent pawn beside `from` that just advanced two squares
fn en_passant_victim(pos: &Position, from: Square, df: i8) -> bool {
    let opponent = pos.side_to_move().opponent();
    from.offset(df, 0).is_some_and(|sq| {
        let piece = pos.piece_at(sq);
        piece.is(opponent, PieceKind::Pawn) && piece.flag()
    })
}

fn step_moves(pos: &Position, from: Square, steps: &[(i8, i8)], moves: &mut MoveList) {
    let stm = pos.side_to_move();
    for &(df, dr) in steps {
        if let Some(to) = from.offset(df, dr) {
            if !pos.piece_at(to).belongs_to(stm) {
                moves.push(Move::new(from, to));
            }
        }
    }
}

fn ray_moves(pos: &Position, from: Square, rays: &[(i8, i8)], moves: &mut MoveList) {
    let stm = pos.side_to_move();
    for &(df, dr) in rays {
        let mut cur = from;
        while let Some(to) = cur.offset(df, dr) {
            let target = pos.piece_at(to);
            if target.belongs_to(stm) {
                break;
            }
            moves.push(Move::new(from, to));
            if target.is_present() {
                break;
            }
            cur = to;
        }
    }
}

fn castle_moves(pos: &Position, from: Square, king: Piece, moves: &mut MoveList) {
    let stm = pos.side_to_move();
    let back = stm.back_rank();
    if !king.is_unmoved(stm, PieceKind::King) || Square::new(KING_FILE, back) != Some(from) {
        return;
    }
    let opponent = stm.opponent();
    for side in &CASTLE_SIDES {
        let rook_ok = Square::new(side.rook_file, back)
            .is_some_and(|sq| pos.piece_at(sq).is_unmoved(stm, PieceKind::Rook));
        let path_empty = side
            .empty
            .iter()
            .all(|&file| Square::new(file, back).is_some_and(|sq| pos.piece_at(sq).is_empty()));
        let path_safe = side
            .safe
            .iter()
            .all(|&file| Square::new(file, back).is_some_and(|sq| !is_attacked(pos, sq, opponent)));
        if rook_ok && path_empty && path_safe {
            if let Some(to) = Square::new(side.king_to, back) {
                moves.push(Move::new(from, to).with_kind(MoveKind::Castle));
            }
        }
    }
}
