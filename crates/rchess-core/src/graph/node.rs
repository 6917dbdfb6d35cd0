//! Graph node

use smallvec::SmallVec;

use crate::oracle::Expansion;
use crate::position::Position;
use crate::types::Evaluation;

/// Parent edges; most positions are reached from only a few predecessors
pub type Parents = SmallVec<[Position; 4]>;

/// Everything known about one position
///
/// Children and parents are stored as keys into the graph, never as owning
/// pointers. A node starts as a placeholder and is populated exactly once,
/// under its own lock, before any other thread can observe it.
#[derive(Debug, Clone)]
pub struct PositionNode {
    position: Position,
    expanded: bool,
    self_evaluation: Evaluation,
    legal_children: Vec<Position>,
    pseudo_children: Vec<Position>,
    best_child: Option<Position>,
    best_child_evaluation: Option<Evaluation>,
    parents: Parents,
}

impl PositionNode {
    pub(crate) fn placeholder(position: Position) -> Self {
        Self {
            position,
            expanded: false,
            self_evaluation: Evaluation::STALEMATE,
            legal_children: Vec::new(),
            pseudo_children: Vec::new(),
            best_child: None,
            best_child_evaluation: None,
            parents: Parents::new(),
        }
    }

    /// Fill in the oracle's answer
    pub(crate) fn populate(&mut self, expansion: Expansion) {
        debug_assert!(!self.expanded, "node populated twice: {:?}", self.position);
        self.self_evaluation = expansion.self_evaluation;
        self.legal_children = expansion.legal_children;
        self.pseudo_children = expansion.pseudo_children;
        self.expanded = true;
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[inline]
    pub fn self_evaluation(&self) -> Evaluation {
        self.self_evaluation
    }

    #[inline]
    pub fn legal_children(&self) -> &[Position] {
        &self.legal_children
    }

    #[inline]
    pub fn pseudo_children(&self) -> &[Position] {
        &self.pseudo_children
    }

    #[inline]
    pub fn best_child(&self) -> Option<Position> {
        self.best_child
    }

    #[inline]
    pub fn best_child_evaluation(&self) -> Option<Evaluation> {
        self.best_child_evaluation
    }

    #[inline]
    pub fn parents(&self) -> &[Position] {
        &self.parents
    }

    #[inline]
    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.expanded && self.legal_children.is_empty()
    }

    /// Current value from this node's own side to move
    ///
    /// The propagated best child value once one exists, else the static one.
    #[inline]
    pub fn value(&self) -> Evaluation {
        self.best_child_evaluation.unwrap_or(self.self_evaluation)
    }

    /// Record `parent` as a predecessor; returns whether the edge is new
    pub fn record_parent_edge(&mut self, parent: Position) -> bool {
        if self.parents.contains(&parent) {
            false
        } else {
            self.parents.push(parent);
            true
        }
    }

    /// Drop the edge from `parent`; returns whether it existed
    pub(crate) fn remove_parent_edge(&mut self, parent: &Position) -> bool {
        match self.parents.iter().position(|p| p == parent) {
            Some(index) => {
                self.parents.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Keep only the parent edges `keep` accepts
    pub(crate) fn retain_parents(&mut self, mut keep: impl FnMut(&Position) -> bool) {
        self.parents.retain(|parent| keep(parent));
    }

    /// Adopt `child` as best reply when `evaluation` strictly improves on the
    /// current best
    pub(crate) fn offer_best_child(&mut self, child: Position, evaluation: Evaluation) -> bool {
        if evaluation.improves_on(self.best_child_evaluation) {
            self.best_child = Some(child);
            self.best_child_evaluation = Some(evaluation);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{MaterialOracle, Oracle};

    #[test]
    fn test_parent_edges_are_a_set() {
        let start = Position::startpos();
        let child = MaterialOracle.expand(&start).legal_children[0];
        let mut node = PositionNode::placeholder(child);
        assert!(node.record_parent_edge(start));
        assert!(!node.record_parent_edge(start));
        assert_eq!(node.parents(), &[start]);
        assert!(node.remove_parent_edge(&start));
        assert!(!node.remove_parent_edge(&start));
        assert!(!node.has_parents());
    }

    #[test]
    fn test_value_prefers_best_child() {
        let start = Position::startpos();
        let mut node = PositionNode::placeholder(start);
        node.populate(MaterialOracle.expand(&start));
        assert!(node.is_expanded());
        assert_eq!(node.value(), Evaluation::scored(0));

        let reply = node.legal_children()[0];
        assert!(node.offer_best_child(reply, Evaluation::scored(-1)));
        assert!(!node.offer_best_child(reply, Evaluation::scored(-1)));
        assert!(!node.offer_best_child(reply, Evaluation::scored(-3)));
        assert!(node.offer_best_child(reply, Evaluation::win(3)));
        assert_eq!(node.value(), Evaluation::win(3));
        assert_eq!(node.best_child(), Some(reply));
    }
}
