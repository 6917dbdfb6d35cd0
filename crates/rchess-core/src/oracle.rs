//! Position oracle
//!
//! The explorer never looks inside a position; everything it needs to know
//! comes from [`Oracle::expand`].

use crate::movegen;
use crate::position::Position;
use crate::types::Evaluation;

/// Result of expanding one position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Legal child positions, in generation order
    pub legal_children: Vec<Position>,
    /// Static value of the position for its side to move
    pub self_evaluation: Evaluation,
    /// All pseudo-legal children (superset of `legal_children`)
    pub pseudo_children: Vec<Position>,
}

impl Expansion {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.legal_children.is_empty()
    }
}

/// Move generation plus static evaluation
///
/// Contract:
/// - Pure and deterministic: the same position always expands the same way.
/// - `self_evaluation` is from the side to move's perspective.
/// - A position without legal children must evaluate to a terminal outcome.
pub trait Oracle: Send + Sync {
    fn expand(&self, pos: &Position) -> Expansion;
}

impl<F> Oracle for F
where
    F: Fn(&Position) -> Expansion + Send + Sync,
{
    fn expand(&self, pos: &Position) -> Expansion {
        self(pos)
    }
}

/// Chess rules with a material count as the static evaluation
///
/// - Checkmated: `Loss(0)`
/// - Stalemated: `Draw(0)`
/// - Otherwise: `Scored(material of the side to move - material of the opponent)`
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialOracle;

impl Oracle for MaterialOracle {
    fn expand(&self, pos: &Position) -> Expansion {
        let pseudo_children = movegen::pseudo_children(pos);
        let legal_children: Vec<Position> = pseudo_children
            .iter()
            .filter(|child| !movegen::is_opponent_in_check(child))
            .copied()
            .collect();

        let self_evaluation = if !legal_children.is_empty() {
            Evaluation::scored(pos.material_balance())
        } else if movegen::is_in_check(pos) {
            Evaluation::CHECKMATED
        } else {
            Evaluation::STALEMATE
        };

        Expansion { legal_children, self_evaluation, pseudo_children }
    }
}
