//! Concurrent exploration engine
//!
//! [`Explorer`] owns the graph, the work queue and the suspend lock, and
//! drives a fixed pool of worker threads:
//!
//! ```text
//! queue → worker → oracle → graph → (children → queue, backpropagation)
//! ```
//!
//! [`Explorer::commit`] advances the live game: it takes the suspend lock
//! for writing, which waits for every in-flight expansion to finish, moves
//! the root and prunes what the game can no longer reach.

mod backprop;
mod prune;
mod reporter;
mod shared;
mod stats;
mod worker;

pub use shared::Root;
pub use stats::{ExplorationReport, ExplorerStats, StatsSnapshot};
pub use worker::{WorkItem, WorkerSummary};

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::config::ExplorerConfig;
use crate::error::EngineError;
use crate::graph::PositionGraph;
use crate::oracle::Oracle;
use crate::position::Position;
use crate::types::Evaluation;
use reporter::Reporter;
use shared::Shared;
use worker::{Processed, process_item, spawn_worker};

/// Result of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    pub previous_root: Position,
    pub root: Position,
    /// Nodes pruned from the graph
    pub removed: usize,
    /// Whether the new root had to be expanded on the spot
    pub expanded_inline: bool,
}

/// Granularity of the stop check while a timed run sleeps
const RUN_POLL: Duration = Duration::from_millis(20);

/// Position-graph explorer
pub struct Explorer<O: Oracle + 'static> {
    shared: Arc<Shared<O>>,
    config: ExplorerConfig,
    workers: Vec<JoinHandle<WorkerSummary>>,
    reporter: Option<Reporter>,
    started: Option<Instant>,
    stopped: Option<Instant>,
    summaries: Vec<WorkerSummary>,
    /// Items dropped from the queue at stop
    abandoned: usize,
}

impl<O: Oracle + 'static> Explorer<O> {
    /// Explorer rooted at `root`; the root is queued but nothing runs yet
    pub fn new(oracle: O, root: Position, config: ExplorerConfig) -> Self {
        let shared = Arc::new(Shared::new(oracle, root));
        shared.queue.enqueue_batch([WorkItem::root(root, 0)]);
        Self {
            shared,
            config,
            workers: Vec::new(),
            reporter: None,
            started: None,
            stopped: None,
            summaries: Vec::new(),
            abandoned: 0,
        }
    }

    /// Spawn the worker pool (and the progress reporter)
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::State("already running"));
        }
        if self.shared.should_stop() {
            return Err(EngineError::State("stopped"));
        }

        let threads = self.config.resolved_threads();
        info!("starting {threads} worker(s) from {:?}", self.root());
        self.started = Some(Instant::now());
        for id in 0..threads {
            match spawn_worker(Arc::clone(&self.shared), id, self.config.worker_stack_mb) {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    error!("{e}");
                    self.shutdown();
                    return Err(e);
                }
            }
        }

        if let Some(interval) = self.config.progress_interval() {
            match Reporter::spawn(Arc::clone(&self.shared), interval) {
                Ok(reporter) => self.reporter = Some(reporter),
                // progress lines are optional; keep exploring without them
                Err(e) => warn!("{e}"),
            }
        }
        Ok(())
    }

    /// Signal the pool to stop, join it and report
    ///
    /// Items still queued are abandoned; the explorer cannot be restarted.
    pub fn stop(&mut self) -> ExplorationReport {
        self.shutdown();
        let report = self.report();
        info!("exploration stopped: {report}");
        report
    }

    /// Explore for `duration` (or until a worker fails), then stop
    pub fn run_for(&mut self, duration: Duration) -> Result<ExplorationReport, EngineError> {
        self.start()?;
        let deadline = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= deadline || self.shared.should_stop() {
                break;
            }
            thread::sleep(RUN_POLL.min(deadline - now));
        }
        Ok(self.stop())
    }

    /// Process up to `limit` queued items on the calling thread
    ///
    /// Deterministic single-threaded driver; returns the number of items
    /// taken from the queue.
    pub fn process_pending(&self, limit: usize) -> usize {
        let mut taken = 0;
        while taken < limit {
            let Some(item) = self.shared.queue.try_dequeue() else {
                break;
            };
            let root = self.shared.root.read();
            process_item(&self.shared, item, &root.position);
            taken += 1;
        }
        taken
    }

    /// Make `child` the live root and prune the rest of the history
    ///
    /// `child` must be a legal reply of the current root. Waits for every
    /// in-flight expansion to finish.
    pub fn commit(&self, child: Position) -> Result<CommitSummary, EngineError> {
        let mut root = self.shared.root.write();
        let previous = *root;

        // Root may still be queued if nothing ran yet.
        if !self.shared.graph.contains(&previous.position) {
            process_item(&self.shared, WorkItem::root(previous.position, previous.ply), &previous.position);
        }
        let legal = self
            .shared
            .graph
            .inspect(&previous.position, |node| node.legal_children().contains(&child))
            .unwrap_or(false);
        if !legal {
            return Err(EngineError::IllegalReply(child));
        }

        let expanded_inline = !self.shared.graph.contains(&child);
        if expanded_inline {
            let item = WorkItem::child_of(previous.position, child, previous.ply + 1);
            if process_item(&self.shared, item, &previous.position) != Processed::Expanded {
                return Err(EngineError::State("failed to expand the committed position"));
            }
        }

        *root = Root { position: child, ply: previous.ply + 1 };
        let removed = prune::prune(&self.shared.graph, previous.position, &child).map_err(|e| {
            error!("prune failed: {e}");
            EngineError::from(e)
        })?;
        self.shared.stats.record_commit(removed as u64);
        #[cfg(feature = "diagnostics")]
        for (parent, child) in self.shared.graph.audit_edges() {
            warn!("dangling edge after prune: {} -> {}", parent.to_fen(), child.to_fen());
        }

        info!(
            "committed {} (ply {}), pruned {removed} node(s), {} remain",
            previous.position.describe_move(&child),
            root.ply,
            self.shared.graph.len()
        );
        Ok(CommitSummary { previous_root: previous.position, root: child, removed, expanded_inline })
    }

    /// Commit the current best reply of the root
    pub fn commit_best(&self) -> Result<CommitSummary, EngineError> {
        let (best, _) = self.best_reply().ok_or(EngineError::NoBestReply)?;
        self.commit(best)
    }

    /// Current best reply of the root and its value for the side to move
    pub fn best_reply(&self) -> Option<(Position, Evaluation)> {
        let root = self.shared.root.read();
        self.shared.graph.best_reply(&root.position)
    }

    pub fn root(&self) -> Position {
        self.shared.root.read().position
    }

    pub fn graph(&self) -> &PositionGraph {
        &self.shared.graph
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Per-worker totals of the threads joined so far
    pub fn worker_summaries(&self) -> &[WorkerSummary] {
        &self.summaries
    }

    pub fn report(&self) -> ExplorationReport {
        let root = self.root();
        let best = self.shared.graph.best_reply(&root);
        let stats = self.stats();
        ExplorationReport {
            positions: self.shared.graph.len(),
            max_depth: stats.max_depth,
            queued: self.shared.queue.len() + self.abandoned,
            elapsed_ms: self.elapsed().as_millis() as u64,
            root: root.to_fen(),
            best_reply: best.map(|(child, _)| root.describe_move(&child)),
            best_evaluation: best.map(|(_, eval)| eval),
            stats,
        }
    }

    /// Wall time since `start`, frozen once stopped
    pub fn elapsed(&self) -> Duration {
        match (self.started, self.stopped) {
            (Some(start), Some(stop)) => stop.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    fn shutdown(&mut self) {
        self.abandoned += self.shared.request_stop();
        if self.started.is_some() && self.stopped.is_none() {
            self.stopped = Some(Instant::now());
        }
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(summary) => self.summaries.push(summary),
                Err(_) => error!("worker thread could not be joined"),
            }
        }
        if let Some(reporter) = self.reporter.take() {
            reporter.stop();
        }
    }
}

impl<O: Oracle + 'static> Drop for Explorer<O> {
    fn drop(&mut self) {
        if self.is_running() || self.reporter.is_some() {
            self.shutdown();
        }
    }
}
