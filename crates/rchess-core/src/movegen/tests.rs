//! Move generation tests

use super::*;
use crate::types::Color;

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).unwrap()
}

fn sq(text: &str) -> Square {
    Square::parse(text).unwrap()
}

fn has_move(moves: &MoveList, text: &str) -> bool {
    moves.iter().any(|mv| mv.to_string() == text)
}

#[test]
fn test_perft_startpos() {
    let start = Position::startpos();
    assert_eq!(perft(&start, 1), 20);
    assert_eq!(perft(&start, 2), 400);
    assert_eq!(perft(&start, 3), 8902);
}

#[test]
fn test_perft_kiwipete() {
    // castling, en passant, promotions and pins all appear within two plies
    let p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    assert_eq!(perft(&p, 1), 48);
    assert_eq!(perft(&p, 2), 2039);
}

#[test]
fn test_perft_endgame_pins() {
    let p = pos("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    assert_eq!(perft(&p, 1), 14);
    assert_eq!(perft(&p, 2), 191);
    assert_eq!(perft(&p, 3), 2812);
}

#[test]
fn test_perft_promotion_heavy() {
    let p = pos("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
    assert_eq!(perft(&p, 1), 6);
    assert_eq!(perft(&p, 2), 264);
}

#[test]
fn test_generated_children_are_unique() {
    let children = legal_children(&Position::startpos());
    let set: std::collections::HashSet<_> = children.iter().collect();
    assert_eq!(set.len(), children.len());
    assert!(children.iter().all(|c| c.side_to_move() == Color::Black));
}

#[test]
fn test_castling_both_sides() {
    let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let moves = legal_moves(&p);
    assert!(has_move(&moves, "e1g1"));
    assert!(has_move(&moves, "e1c1"));

    let short = moves.iter().find(|mv| mv.to_string() == "e1g1").copied().unwrap();
    assert_eq!(short.kind, MoveKind::Castle);
    let after = apply(&p, short);
    assert!(after.piece_at(sq("g1")).is(Color::White, PieceKind::King));
    assert!(after.piece_at(sq("f1")).is(Color::White, PieceKind::Rook));
    assert!(after.piece_at(sq("h1")).is_empty());
    assert!(after.piece_at(sq("g1")).flag());
    assert_eq!(after.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 0 1");
}

#[test]
fn test_castling_blocked_by_attack_or_lost_rights() {
    // black rook on f8 covers f1
    let attacked = pos("5r1k/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    let moves = legal_moves(&attacked);
    assert!(!has_move(&moves, "e1g1"));
    assert!(has_move(&moves, "e1c1"));

    let no_rights = pos("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
    let moves = legal_moves(&no_rights);
    assert!(!has_move(&moves, "e1g1"));
    assert!(!has_move(&moves, "e1c1"));

    // moving the rook loses the right on that side only
    let p = pos("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    let rook_move = legal_moves(&p).into_iter().find(|mv| mv.to_string() == "h1h2").unwrap();
    let after = apply(&p, rook_move);
    assert_eq!(after.to_fen(), "4k3/8/8/8/8/8/7R/R3K3 b Q - 0 1");
}

#[test]
fn test_en_passant_capture() {
    let p = pos("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1");
    let double = legal_moves(&p).into_iter().find(|mv| mv.to_string() == "e2e4").unwrap();
    assert_eq!(double.kind, MoveKind::DoubleStep);
    let after = apply(&p, double);
    assert_eq!(after.to_fen(), "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1");

    let replies = legal_moves(&after);
    let ep = replies.iter().find(|mv| mv.to_string() == "d4e3").copied().unwrap();
    assert_eq!(ep.kind, MoveKind::EnPassant);
    let captured = apply(&after, ep);
    assert!(captured.piece_at(sq("e4")).is_empty());
    assert!(captured.piece_at(sq("e3")).is(Color::Black, PieceKind::Pawn));
}

#[test]
fn test_double_step_without_attacker_leaves_no_right() {
    let p = pos("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
    let double = legal_moves(&p).into_iter().find(|mv| mv.to_string() == "e2e4").unwrap();
    let after = apply(&p, double);
    assert!(!after.piece_at(sq("e4")).flag());
    assert_eq!(after.to_fen(), "4k3/8/8/8/4P3/8/8/4K3 b - - 0 1");
}

#[test]
fn test_double_step_transposes_with_move_order() {
    let play = |moves: &[&str]| {
        moves.iter().fold(Position::startpos(), |p, text| p.parse_move(text).unwrap().1)
    };
    let pawn_first = play(&["e2e4", "g8f6", "g1f3"]);
    let knight_first = play(&["g1f3", "g8f6", "e2e4"]);
    assert_eq!(pawn_first, knight_first);
}

#[test]
fn test_en_passant_expires_after_one_reply() {
    let p = pos("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1");
    let double = legal_moves(&p).into_iter().find(|mv| mv.to_string() == "e2e4").unwrap();
    let after = apply(&p, double);
    // black plays a king move instead of capturing
    let wait = legal_moves(&after).into_iter().find(|mv| mv.to_string() == "e8d8").unwrap();
    let after_wait = apply(&after, wait);
    let white_wait =
        legal_moves(&after_wait).into_iter().find(|mv| mv.to_string() == "e1d1").unwrap();
    let back_to_black = apply(&after_wait, white_wait);
    assert!(!has_move(&legal_moves(&back_to_black), "d4e3"));
}

#[test]
fn test_promotions() {
    let p = pos("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
    let moves = legal_moves(&p);
    for text in ["e7e8q", "e7e8r", "e7e8b", "e7e8n"] {
        assert!(has_move(&moves, text), "missing {text}");
    }
    assert!(!has_move(&moves, "e7e8"));

    let rook = moves.iter().find(|mv| mv.to_string() == "e7e8r").copied().unwrap();
    let after = apply(&p, rook);
    let promoted = after.piece_at(sq("e8"));
    assert!(promoted.is(Color::White, PieceKind::Rook));
    assert!(promoted.flag(), "promoted rook never grants castling");
}

#[test]
fn test_pinned_piece_stays() {
    // knight on e2 is pinned against the king by the rook on e8
    let p = pos("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
    let moves = legal_moves(&p);
    assert!(!moves.iter().any(|mv| mv.from == sq("e2")));
    let pseudo = generate_moves(&p);
    assert!(pseudo.iter().any(|mv| mv.from == sq("e2")));
    assert!(pseudo_children(&p).len() > legal_children(&p).len());
}

#[test]
fn test_checkmated_side_has_no_moves() {
    // fool's mate
    let p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1");
    assert!(is_in_check(&p));
    assert!(legal_children(&p).is_empty());
}

#[test]
fn test_stalemate_has_no_moves() {
    let p = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(!is_in_check(&p));
    assert!(legal_children(&p).is_empty());
}
