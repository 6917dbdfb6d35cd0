//! Position value (Evaluation)
//!
//! An evaluation is always expressed from the point of view of the side to
//! move in the position it belongs to. A parent looks at a child through
//! [`Evaluation::invert`].
//!
//! Ordering (higher is better for the side it belongs to):
//!
//! - the outcome dominates: `Win > Scored > Draw > Loss`
//! - `Win`: fewer plies until mate is better
//! - `Scored`: more material is better
//! - `Draw`: a nearer draw is better
//! - `Loss`: more plies until being mated is better
//!
//! For the terminal outcomes the score is a ply distance. Every inversion
//! adds one ply, saturating at [`Evaluation::MAX_DISTANCE`], so the set of
//! reachable values is finite and backpropagation, which only accepts
//! strict improvements, always terminates.

use serde::Serialize;
use std::cmp::Ordering;

/// Outcome category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Loss,
    Draw,
    Scored,
    Win,
}

impl Outcome {
    #[inline]
    const fn rank(self) -> u8 {
        match self {
            Outcome::Loss => 0,
            Outcome::Draw => 1,
            Outcome::Scored => 2,
            Outcome::Win => 3,
        }
    }
}

/// Evaluation of a position for its side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub score: i32,
}

impl Evaluation {
    /// Upper bound of a ply distance
    pub const MAX_DISTANCE: i32 = 1024;

    /// Mated on the board (terminal position, side to move lost)
    pub const CHECKMATED: Evaluation = Evaluation::loss(0);
    /// Stalemate (terminal position, no legal move and not in check)
    pub const STALEMATE: Evaluation = Evaluation::draw(0);

    #[inline]
    pub const fn win(plies: i32) -> Evaluation {
        Evaluation { outcome: Outcome::Win, score: plies }
    }

    #[inline]
    pub const fn loss(plies: i32) -> Evaluation {
        Evaluation { outcome: Outcome::Loss, score: plies }
    }

    #[inline]
    pub const fn draw(plies: i32) -> Evaluation {
        Evaluation { outcome: Outcome::Draw, score: plies }
    }

    #[inline]
    pub const fn scored(material: i32) -> Evaluation {
        Evaluation { outcome: Outcome::Scored, score: material }
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        !matches!(self.outcome, Outcome::Scored)
    }

    /// View this evaluation from the opponent's side, one ply earlier
    ///
    /// `Win(n) -> Loss(n+1)`, `Loss(n) -> Win(n+1)`, `Draw(n) -> Draw(n+1)`,
    /// `Scored(s) -> Scored(-s)`.
    #[inline]
    pub fn invert(self) -> Evaluation {
        match self.outcome {
            Outcome::Win => Evaluation::loss(next_distance(self.score)),
            Outcome::Loss => Evaluation::win(next_distance(self.score)),
            Outcome::Draw => Evaluation::draw(next_distance(self.score)),
            Outcome::Scored => Evaluation::scored(self.score.saturating_neg()),
        }
    }

    /// True when `self` is strictly better than `current` (or there is no current value)
    #[inline]
    pub fn improves_on(self, current: Option<Evaluation>) -> bool {
        match current {
            None => true,
            Some(current) => self > current,
        }
    }
}

#[inline]
fn next_distance(score: i32) -> i32 {
    score.saturating_add(1).min(Evaluation::MAX_DISTANCE)
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.outcome.rank().cmp(&other.outcome.rank()).then_with(|| match self.outcome {
            Outcome::Win | Outcome::Draw => other.score.cmp(&self.score),
            Outcome::Scored | Outcome::Loss => self.score.cmp(&other.score),
        })
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.outcome {
            Outcome::Win => write!(f, "win in {}", self.score),
            Outcome::Loss => write!(f, "loss in {}", self.score),
            Outcome::Draw => write!(f, "draw in {}", self.score),
            Outcome::Scored => write!(f, "{:+}", self.score),
        }
    }
}
