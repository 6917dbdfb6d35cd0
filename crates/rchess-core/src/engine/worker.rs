//! Expansion workers

use std::iter;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, trace};

use super::backprop;
use super::shared::Shared;
use crate::error::EngineError;
use crate::graph::Lookup;
use crate::oracle::Oracle;
use crate::position::Position;

/// Position waiting to be graphed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// Position it was generated from; `None` only for the starting position
    pub parent: Option<Position>,
    pub position: Position,
    /// Plies from the starting position
    pub depth: u32,
}

impl WorkItem {
    pub fn root(position: Position, depth: u32) -> Self {
        Self { parent: None, position, depth }
    }

    pub fn child_of(parent: Position, position: Position, depth: u32) -> Self {
        Self { parent: Some(parent), position, depth }
    }
}

/// What happened to one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Processed {
    /// New node; children enqueued
    Expanded,
    /// Node already existed; at most a parent edge was added
    Duplicate,
    /// Parent pruned (or a stale root seed); nothing done
    Discarded,
}

/// Per-worker totals, returned when the thread ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub id: usize,
    pub expanded: u64,
    pub duplicates: u64,
    pub discarded: u64,
    pub panicked: bool,
}

impl WorkerSummary {
    pub(crate) fn count(&mut self, processed: Processed) {
        match processed {
            Processed::Expanded => self.expanded += 1,
            Processed::Duplicate => self.duplicates += 1,
            Processed::Discarded => self.discarded += 1,
        }
    }
}

/// Graph one work item
///
/// The caller holds the suspend lock (read for workers, write for commit)
/// and passes the live root it guards.
pub(crate) fn process_item<O: Oracle>(shared: &Shared<O>, item: WorkItem, root: &Position) -> Processed {
    let live = match item.parent {
        Some(parent) => shared.graph.contains(&parent),
        None => item.position == *root,
    };
    if !live {
        shared.stats.record_discarded();
        return Processed::Discarded;
    }

    let mut children = Vec::new();
    let lookup = shared.graph.lookup_or_create(item.position, |node| {
        node.populate(shared.oracle.expand(&item.position));
        if let Some(parent) = item.parent {
            node.record_parent_edge(parent);
        }
        children.extend_from_slice(node.legal_children());
    });

    match lookup {
        Lookup::Created(_) => {
            shared.stats.record_expanded(item.depth);
            let depth = item.depth + 1;
            shared
                .queue
                .enqueue_batch(children.into_iter().map(|child| WorkItem::child_of(item.position, child, depth)));

            let seeds = iter::once(item.position).chain(item.parent);
            let result = backprop::propagate(&shared.graph, seeds);
            shared.stats.record_propagation(result.reevaluations, result.improvements);
            Processed::Expanded
        }
        Lookup::Existing(node) => {
            shared.stats.record_duplicate();
            let Some(parent) = item.parent else {
                return Processed::Duplicate;
            };
            let new_edge = node.lock().record_parent_edge(parent);
            if new_edge {
                if log::log_enabled!(log::Level::Trace) {
                    trace!("transposition into {:?} from {parent:?}", item.position);
                }
                let result = backprop::propagate(&shared.graph, [parent]);
                shared.stats.record_propagation(result.reevaluations, result.improvements);
            }
            Processed::Duplicate
        }
    }
}

/// Start worker `id`
pub(crate) fn spawn_worker<O: Oracle + 'static>(
    shared: Arc<Shared<O>>,
    id: usize,
    stack_mb: Option<usize>,
) -> Result<JoinHandle<WorkerSummary>, EngineError> {
    let name = format!("explorer-worker-{id}");
    let mut builder = thread::Builder::new().name(name.clone());
    if let Some(mb) = stack_mb {
        builder = builder.stack_size(mb * 1024 * 1024);
    }
    builder
        .spawn(move || worker_loop(&shared, id))
        .map_err(|source| EngineError::Spawn { name, source })
}

fn worker_loop<O: Oracle>(shared: &Shared<O>, id: usize) -> WorkerSummary {
    let mut summary = WorkerSummary { id, ..WorkerSummary::default() };

    let res = panic::catch_unwind(AssertUnwindSafe(|| {
        if log::log_enabled!(log::Level::Debug) {
            debug!("Worker {id} started");
        }
        while !shared.should_stop() {
            let Some(item) = shared.queue.dequeue() else {
                break;
            };
            let root = shared.root.read();
            if shared.should_stop() {
                break;
            }
            summary.count(process_item(shared, item, &root.position));
        }
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Worker {id} stopped: {} expanded, {} duplicates, {} discarded",
                summary.expanded, summary.duplicates, summary.discarded
            );
        }
    }));

    if res.is_err() {
        error!("Worker {id} panicked; requesting stop");
        summary.panicked = true;
        shared.request_stop();
    }
    summary
}
