//! Seeded random games checked against the position encodings

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rchess_core::Position;
use rchess_core::movegen;

const GAMES: u64 = 24;
const MAX_PLIES: usize = 120;

fn move_texts(pos: &Position) -> Vec<String> {
    let mut texts: Vec<String> = movegen::legal_moves(pos).iter().map(|mv| mv.to_string()).collect();
    texts.sort();
    texts
}

#[test]
fn random_games_keep_encodings_consistent() {
    for seed in 0..GAMES {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut pos = Position::startpos();

        for ply in 0..MAX_PLIES {
            let fen = pos.to_fen();
            let reparsed = Position::from_fen(&fen).unwrap();
            assert_eq!(reparsed.to_fen(), fen, "seed {seed} ply {ply}");
            assert_eq!(move_texts(&reparsed), move_texts(&pos), "seed {seed} ply {ply}: {fen}");
            assert_eq!(Position::from_json(&pos.to_json()).unwrap(), pos);

            let legal = movegen::legal_children(&pos);
            let pseudo = movegen::pseudo_children(&pos);
            assert!(legal.iter().all(|c| pseudo.contains(c)), "{fen}: legal child not pseudo-legal");
            assert!(legal.iter().all(|c| !movegen::is_opponent_in_check(c)), "{fen}: king left in check");
            if legal.is_empty() {
                break;
            }

            let moves = movegen::legal_moves(&pos);
            let mv = moves[rng.random_range(0..moves.len())];
            let child = movegen::apply(&pos, mv);
            assert_eq!(pos.describe_move(&child), mv.to_string());
            assert_eq!(pos.parse_move(&mv.to_string()).unwrap(), (mv, child));
            pos = child;
        }
    }
}
