//! Best-child propagation
//!
//! A node's best child is recomputed from the current values of its
//! children that are already in the graph. When the result strictly
//! improves on what the node holds, its parents are queued for the same
//! treatment. Distances saturate, so every accepted update climbs a finite
//! lattice and the work-list drains.

use std::collections::{HashSet, VecDeque};

use log::trace;

use crate::graph::{Parents, PositionGraph};
use crate::position::Position;
use crate::types::Evaluation;

/// Outcome of one [`reevaluate`] step
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reevaluation {
    /// The node has been pruned meanwhile
    Missing,
    /// No child with a node yet, or no strict improvement
    Unchanged,
    /// New best stored; these parents need a look
    Improved(Parents),
}

/// Recompute the best child of `position`
///
/// Never holds two node locks at once: the child list is copied out, each
/// child is read under its own lock, and the node is locked again only to
/// compare and store.
pub(crate) fn reevaluate(graph: &PositionGraph, position: &Position) -> Reevaluation {
    let Some(node) = graph.get(position) else {
        return Reevaluation::Missing;
    };
    let children = node.lock().legal_children().to_vec();

    let mut best: Option<(Position, Evaluation)> = None;
    for child in children {
        let Some(candidate) = graph.evaluation_of(&child).map(Evaluation::invert) else {
            continue;
        };
        if best.is_none_or(|(_, current)| candidate > current) {
            best = Some((child, candidate));
        }
    }

    let Some((child, evaluation)) = best else {
        return Reevaluation::Unchanged;
    };
    let mut guard = node.lock();
    if guard.offer_best_child(child, evaluation) {
        Reevaluation::Improved(guard.parents().iter().copied().collect())
    } else {
        Reevaluation::Unchanged
    }
}

/// Counts from one [`propagate`] run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Propagation {
    pub reevaluations: u64,
    pub improvements: u64,
}

/// Reevaluate `seeds` and everything above them that changes as a result
pub(crate) fn propagate<I>(graph: &PositionGraph, seeds: I) -> Propagation
where
    I: IntoIterator<Item = Position>,
{
    let mut work = VecDeque::new();
    let mut pending = HashSet::new();
    for seed in seeds {
        if pending.insert(seed) {
            work.push_back(seed);
        }
    }

    let mut result = Propagation::default();
    while let Some(position) = work.pop_front() {
        pending.remove(&position);
        result.reevaluations += 1;
        if let Reevaluation::Improved(parents) = reevaluate(graph, &position) {
            result.improvements += 1;
            if log::log_enabled!(log::Level::Trace) {
                trace!("improved {position:?}, {} parent(s) to revisit", parents.len());
            }
            for parent in parents {
                if pending.insert(parent) {
                    work.push_back(parent);
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{MaterialOracle, Oracle};

    fn insert(graph: &PositionGraph, position: Position, parent: Option<Position>) {
        graph.lookup_or_create(position, |node| {
            node.populate(MaterialOracle.expand(&position));
            if let Some(parent) = parent {
                node.record_parent_edge(parent);
            }
        });
    }

    #[test]
    fn test_missing_and_childless() {
        let graph = PositionGraph::new();
        let start = Position::startpos();
        assert_eq!(reevaluate(&graph, &start), Reevaluation::Missing);
        insert(&graph, start, None);
        assert_eq!(reevaluate(&graph, &start), Reevaluation::Unchanged);
    }

    #[test]
    fn test_capture_propagates_to_root() {
        // white to move can win the queen on d5 with the pawn
        let root = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let (_, capture) = root.parse_move("e4d5").unwrap();
        let (_, quiet) = root.parse_move("e1f1").unwrap();

        let graph = PositionGraph::new();
        insert(&graph, root, None);
        insert(&graph, quiet, Some(root));
        let first = propagate(&graph, [quiet]);
        assert_eq!(first.improvements, 0, "quiet has no expanded children");
        propagate(&graph, [root]);
        assert_eq!(graph.best_reply(&root), Some((quiet, Evaluation::scored(-8))));

        insert(&graph, capture, Some(root));
        let second = propagate(&graph, [capture, root]);
        assert_eq!(second.improvements, 1);
        assert_eq!(graph.best_reply(&root), Some((capture, Evaluation::scored(1))));
    }
}
