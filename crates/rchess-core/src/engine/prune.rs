//! Removal of history the game can no longer reach
//!
//! Two passes, both under the suspend write lock:
//!
//! 1. cascade: remove the previous root, drop its children's back edges and
//!    continue into every child left without parents;
//! 2. sweep: remove whatever is still not reachable from the new root.
//!    Reversible moves make cycles (a knight going out and back), and a
//!    cycle keeps its members' parent sets non-empty, so the cascade alone
//!    would leave them behind.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::error::GraphError;
use crate::graph::PositionGraph;
use crate::position::Position;

/// Remove everything the game can no longer reach from `new_root`
///
/// Returns the number of nodes removed.
pub(crate) fn prune(
    graph: &PositionGraph,
    previous_root: Position,
    new_root: &Position,
) -> Result<usize, GraphError> {
    let cascaded = cascade(graph, previous_root, new_root)?;
    let swept = sweep(graph, new_root)?;
    if swept > 0 {
        debug!("prune: {cascaded} by cascade, {swept} unreachable");
    }
    Ok(cascaded + swept)
}

/// Remove `previous_root` and everything left without parents below it
///
/// A previous root that is still somebody's child (a repetition) is kept.
fn cascade(
    graph: &PositionGraph,
    previous_root: Position,
    new_root: &Position,
) -> Result<usize, GraphError> {
    let mut removed = 0;
    let mut stack = vec![previous_root];

    while let Some(position) = stack.pop() {
        if position == *new_root {
            continue;
        }
        let Some(node) = graph.get(&position) else {
            continue;
        };
        if node.lock().has_parents() {
            continue;
        }
        let node = graph.remove(&position, new_root)?;
        removed += 1;

        let children = node.lock().legal_children().to_vec();
        for child in children {
            let Some(child_node) = graph.get(&child) else {
                continue;
            };
            let orphaned = {
                let mut guard = child_node.lock();
                guard.remove_parent_edge(&position);
                !guard.has_parents()
            };
            if orphaned && child != *new_root {
                stack.push(child);
            }
        }
    }
    Ok(removed)
}

/// Positions reachable from `root` through graphed children
fn reachable_from(graph: &PositionGraph, root: &Position) -> HashSet<Position> {
    let mut seen = HashSet::new();
    let mut work = VecDeque::new();
    if graph.contains(root) {
        seen.insert(*root);
        work.push_back(*root);
    }
    while let Some(position) = work.pop_front() {
        let Some(children) = graph.inspect(&position, |n| n.legal_children().to_vec()) else {
            continue;
        };
        for child in children {
            if graph.contains(&child) && seen.insert(child) {
                work.push_back(child);
            }
        }
    }
    seen
}

/// Remove every node not reachable from `new_root`
fn sweep(graph: &PositionGraph, new_root: &Position) -> Result<usize, GraphError> {
    let reachable = reachable_from(graph, new_root);
    if reachable.len() == graph.len() {
        return Ok(0);
    }

    let garbage: HashSet<Position> =
        graph.positions().into_iter().filter(|p| !reachable.contains(p)).collect();
    for position in &reachable {
        if let Some(node) = graph.get(position) {
            node.lock().retain_parents(|parent| !garbage.contains(parent));
        }
    }
    for position in &garbage {
        if let Some(node) = graph.get(position) {
            node.lock().retain_parents(|_| false);
        }
        graph.remove(position, new_root)?;
    }
    Ok(garbage.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{MaterialOracle, Oracle};

    fn insert(graph: &PositionGraph, position: Position, parent: Option<Position>) {
        let lookup = graph.lookup_or_create(position, |node| {
            node.populate(MaterialOracle.expand(&position));
        });
        if let Some(parent) = parent {
            lookup.node().lock().record_parent_edge(parent);
        }
    }

    /// Insert the line of `moves` from `from`, returning its positions
    fn line(graph: &PositionGraph, from: Position, moves: &[&str]) -> Vec<Position> {
        let mut positions = vec![from];
        for text in moves {
            let parent = *positions.last().unwrap();
            let (_, child) = parent.parse_move(text).unwrap();
            insert(graph, child, Some(parent));
            positions.push(child);
        }
        positions
    }

    #[test]
    fn test_prune_drops_siblings_keeps_new_subtree() {
        let graph = PositionGraph::new();
        let start = Position::startpos();
        insert(&graph, start, None);
        let e4_line = line(&graph, start, &["e2e4", "e7e5"]);
        let d4_line = line(&graph, start, &["d2d4", "d7d5"]);
        let (e4, e4e5) = (e4_line[1], e4_line[2]);

        let removed = prune(&graph, start, &e4).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(graph.len(), 2);
        assert!(graph.contains(&e4e5));
        assert!(!graph.contains(&start));
        assert!(d4_line.iter().all(|p| !graph.contains(p)));
        assert!(graph.inspect(&e4, |n| n.parents().is_empty()).unwrap());
    }

    #[test]
    fn test_prune_keeps_shared_descendant() {
        // Nf3 Nf6 Nc3 and Nc3 Nf6 Nf3 reach the same position
        let graph = PositionGraph::new();
        let start = Position::startpos();
        insert(&graph, start, None);
        let kingside = line(&graph, start, &["g1f3", "g8f6", "b1c3"]);
        let queenside = line(&graph, start, &["b1c3", "g8f6", "g1f3"]);
        assert_eq!(kingside[3], queenside[3]);

        prune(&graph, start, &kingside[1]).unwrap();
        assert!(graph.contains(&kingside[3]));
        assert!(!graph.contains(&queenside[1]));
        assert!(!graph.contains(&queenside[2]));
        let parents = graph.inspect(&kingside[3], |n| n.parents().to_vec()).unwrap();
        assert_eq!(parents, vec![kingside[2]]);
    }

    #[test]
    fn test_repetition_keeps_previous_root() {
        // Nf3 Nf6 Ng1 Ng8 returns to the start, so the start and its other
        // children stay reachable from Nf3
        let graph = PositionGraph::new();
        let start = Position::startpos();
        insert(&graph, start, None);
        let cycle = line(&graph, start, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(cycle[4], start);
        let e4 = line(&graph, start, &["e2e4"])[1];
        let stray = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        insert(&graph, stray, None);

        let removed = prune(&graph, start, &cycle[1]).unwrap();
        assert_eq!(removed, 1, "only the unconnected node goes");
        assert!(!graph.contains(&stray));
        assert!(graph.contains(&start));
        assert!(graph.contains(&e4));
        assert!(cycle.iter().all(|p| graph.contains(p)));
        let parents = graph.inspect(&start, |n| n.parents().to_vec()).unwrap();
        assert_eq!(parents, vec![cycle[3]]);
        let parents = graph.inspect(&e4, |n| n.parents().to_vec()).unwrap();
        assert_eq!(parents, vec![start]);
    }

    #[test]
    fn test_unreachable_cycle_is_swept() {
        let graph = PositionGraph::new();
        let start = Position::startpos();
        insert(&graph, start, None);
        let cycle = line(&graph, start, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        let e4 = line(&graph, start, &["e2e4"])[1];

        let removed = prune(&graph, start, &e4).unwrap();
        assert_eq!(removed, 4);
        assert_eq!(graph.positions(), vec![e4]);
        assert!(cycle.iter().all(|p| !graph.contains(p)));
    }
}
