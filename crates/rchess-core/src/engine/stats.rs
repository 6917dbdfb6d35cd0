//! Run counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::types::Evaluation;

/// Counters shared by every worker
///
/// Relaxed atomics; values are only read for reporting.
#[derive(Debug, Default)]
pub struct ExplorerStats {
    expanded: AtomicU64,
    duplicates: AtomicU64,
    discarded: AtomicU64,
    max_depth: AtomicU64,
    reevaluations: AtomicU64,
    improvements: AtomicU64,
    pruned: AtomicU64,
    commits: AtomicU64,
}

impl ExplorerStats {
    pub(crate) fn record_expanded(&self, depth: u32) {
        self.expanded.fetch_add(1, Ordering::Relaxed);
        self.max_depth.fetch_max(u64::from(depth), Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_propagation(&self, reevaluations: u64, improvements: u64) {
        self.reevaluations.fetch_add(reevaluations, Ordering::Relaxed);
        self.improvements.fetch_add(improvements, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self, pruned: u64) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.pruned.fetch_add(pruned, Ordering::Relaxed);
    }

    pub fn expanded(&self) -> u64 {
        self.expanded.load(Ordering::Relaxed)
    }

    pub fn max_depth(&self) -> u64 {
        self.max_depth.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            expanded: self.expanded.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
            reevaluations: self.reevaluations.load(Ordering::Relaxed),
            improvements: self.improvements.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`ExplorerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Positions expanded through the oracle
    pub expanded: u64,
    /// Work items that hit an existing node
    pub duplicates: u64,
    /// Work items dropped because their parent was pruned
    pub discarded: u64,
    /// Deepest ply (relative to the starting position) expanded so far
    pub max_depth: u64,
    pub reevaluations: u64,
    pub improvements: u64,
    /// Nodes removed by commits
    pub pruned: u64,
    pub commits: u64,
}

/// Summary returned when an exploration run ends
#[derive(Debug, Clone, Serialize)]
pub struct ExplorationReport {
    /// Distinct positions currently in the graph
    pub positions: usize,
    pub max_depth: u64,
    /// Items abandoned in the queue
    pub queued: usize,
    pub elapsed_ms: u64,
    /// Live root as FEN
    pub root: String,
    /// Best reply of the root in coordinate notation, if known
    pub best_reply: Option<String>,
    pub best_evaluation: Option<Evaluation>,
    pub stats: StatsSnapshot,
}

impl std::fmt::Display for ExplorationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "positions {} max depth {} queued {} in {} ms",
            self.positions, self.max_depth, self.queued, self.elapsed_ms
        )?;
        if let (Some(reply), Some(eval)) = (&self.best_reply, self.best_evaluation) {
            write!(f, ", best {reply} ({eval})")?;
        }
        Ok(())
    }
}
