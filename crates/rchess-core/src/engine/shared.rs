//! State shared by the explorer and its threads

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use parking_lot::RwLock;

use super::stats::ExplorerStats;
use super::worker::WorkItem;
use crate::graph::PositionGraph;
use crate::oracle::Oracle;
use crate::position::Position;
use crate::queue::WorkQueue;

/// Live game position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Root {
    pub position: Position,
    /// Plies committed since the starting position
    pub ply: u32,
}

pub(crate) struct Shared<O> {
    pub oracle: O,
    pub graph: PositionGraph,
    pub queue: WorkQueue<WorkItem>,
    /// Suspend lock: expansion and propagation hold it for reading, commit
    /// and prune for writing. It also guards the live root.
    pub root: RwLock<Root>,
    pub stats: ExplorerStats,
    stop: AtomicBool,
}

impl<O: Oracle> Shared<O> {
    pub fn new(oracle: O, root: Position) -> Self {
        Self {
            oracle,
            graph: PositionGraph::new(),
            queue: WorkQueue::new(),
            root: RwLock::new(Root { position: root, ply: 0 }),
            stats: ExplorerStats::default(),
            stop: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Halt intake and release every worker blocked on the queue
    ///
    /// Returns the number of queued items abandoned.
    pub fn request_stop(&self) -> usize {
        if !self.stop.swap(true, Ordering::AcqRel) {
            debug!("stop requested");
        }
        self.queue.close()
    }
}
