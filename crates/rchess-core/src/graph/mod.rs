//! Deduplicated position graph
//!
//! One node per distinct [`Position`], shared by every worker. The map lock
//! only guards membership; node contents are guarded by the node's own
//! mutex. Lock order is map → node: a thread holding a node lock never asks
//! for the map lock. The one place both are held together is
//! [`PositionGraph::lookup_or_create`], which locks a brand-new node before
//! publishing it, so nobody else can be waiting on it.

mod node;

pub use node::{Parents, PositionNode};

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::GraphError;
use crate::position::Position;
use crate::types::Evaluation;

/// Shared handle to a node
pub type NodeRef = Arc<Mutex<PositionNode>>;

/// Result of [`PositionGraph::lookup_or_create`]
pub enum Lookup {
    /// Inserted by this call; `init` has already run on it
    Created(NodeRef),
    /// Already present; the caller locks it as needed
    Existing(NodeRef),
}

impl Lookup {
    pub fn node(&self) -> &NodeRef {
        match self {
            Lookup::Created(node) | Lookup::Existing(node) => node,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Lookup::Created(_))
    }
}

/// Concurrent map from position to node
#[derive(Default)]
pub struct PositionGraph {
    nodes: RwLock<HashMap<Position, NodeRef>>,
}

impl PositionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the node for `position`, inserting and initialising it if absent
    ///
    /// A new node is locked before it becomes visible and `init` runs under
    /// that lock after the map lock is released. Concurrent callers for the
    /// same position get [`Lookup::Existing`] and block on the node lock
    /// until `init` is done, so a position is never initialised twice.
    pub fn lookup_or_create<F>(&self, position: Position, init: F) -> Lookup
    where
        F: FnOnce(&mut PositionNode),
    {
        if let Some(node) = self.nodes.read().get(&position) {
            return Lookup::Existing(Arc::clone(node));
        }

        let mut map = self.nodes.write();
        match map.entry(position) {
            Entry::Occupied(entry) => Lookup::Existing(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let node = Arc::new(Mutex::new(PositionNode::placeholder(position)));
                let mut guard = node.lock();
                entry.insert(Arc::clone(&node));
                drop(map);
                init(&mut guard);
                drop(guard);
                Lookup::Created(node)
            }
        }
    }

    pub fn get(&self, position: &Position) -> Option<NodeRef> {
        self.nodes.read().get(position).cloned()
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.nodes.read().contains_key(position)
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Snapshot of every key
    pub fn positions(&self) -> Vec<Position> {
        self.nodes.read().keys().copied().collect()
    }

    /// Run `f` on the node under its lock
    pub fn inspect<R>(&self, position: &Position, f: impl FnOnce(&PositionNode) -> R) -> Option<R> {
        let node = self.get(position)?;
        let guard = node.lock();
        Some(f(&guard))
    }

    /// Node value from its own side to move (best child value, else static)
    pub fn evaluation_of(&self, position: &Position) -> Option<Evaluation> {
        self.inspect(position, PositionNode::value)
    }

    /// Current best reply and its value
    pub fn best_reply(&self, position: &Position) -> Option<(Position, Evaluation)> {
        self.inspect(position, |node| node.best_child().zip(node.best_child_evaluation()))
            .flatten()
    }

    /// Remove a node that nothing points at any more
    ///
    /// Fails when parent edges remain or when `position` is `live_root`.
    pub fn remove(&self, position: &Position, live_root: &Position) -> Result<NodeRef, GraphError> {
        if position == live_root {
            return Err(GraphError::LiveRoot(*position));
        }
        let mut map = self.nodes.write();
        let node = map.get(position).ok_or(GraphError::Missing(*position))?;
        let parents = node.lock().parents().len();
        if parents > 0 {
            return Err(GraphError::HasParents { position: *position, parents });
        }
        map.remove(position).ok_or(GraphError::Missing(*position))
    }

    /// Parent edges whose endpoint is gone or does not list the child
    #[cfg(feature = "diagnostics")]
    pub fn audit_edges(&self) -> Vec<(Position, Position)> {
        let mut broken = Vec::new();
        for position in self.positions() {
            let Some(parents) = self.inspect(&position, |n| n.parents().to_vec()) else { continue };
            for parent in parents {
                let linked = self
                    .inspect(&parent, |p| p.legal_children().contains(&position))
                    .unwrap_or(false);
                if !linked {
                    broken.push((parent, position));
                }
            }
        }
        broken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{MaterialOracle, Oracle};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_lookup_or_create_once() {
        let graph = PositionGraph::new();
        let start = Position::startpos();
        let created = graph.lookup_or_create(start, |node| node.populate(MaterialOracle.expand(&start)));
        assert!(created.is_created());
        assert!(created.node().lock().is_expanded());

        let again = graph.lookup_or_create(start, |_| panic!("initialised twice"));
        assert!(!again.is_created());
        assert!(Arc::ptr_eq(created.node(), again.node()));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.evaluation_of(&start), Some(Evaluation::scored(0)));
        assert_eq!(graph.best_reply(&start), None);
    }

    #[test]
    fn test_concurrent_lookups_initialise_once() {
        let graph = PositionGraph::new();
        let start = Position::startpos();
        let inits = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let lookup = graph.lookup_or_create(start, |node| {
                        inits.fetch_add(1, Ordering::SeqCst);
                        node.populate(MaterialOracle.expand(&start));
                    });
                    // whoever loses the race still sees a populated node
                    assert!(lookup.node().lock().is_expanded());
                });
            }
        });
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_remove_rules() {
        let graph = PositionGraph::new();
        let start = Position::startpos();
        let child = MaterialOracle.expand(&start).legal_children[0];
        graph.lookup_or_create(start, |_| {});
        graph.lookup_or_create(child, |node| {
            node.record_parent_edge(start);
        });

        assert_eq!(graph.remove(&start, &start).err(), Some(GraphError::LiveRoot(start)));
        assert_eq!(
            graph.remove(&child, &start).err(),
            Some(GraphError::HasParents { position: child, parents: 1 })
        );

        graph.get(&child).unwrap().lock().remove_parent_edge(&start);
        assert!(graph.remove(&child, &start).is_ok());
        assert!(!graph.contains(&child));
        assert_eq!(graph.remove(&child, &start).err(), Some(GraphError::Missing(child)));
        assert_eq!(graph.positions(), vec![start]);
    }
}
