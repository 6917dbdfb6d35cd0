//! # rchess-core
//!
//! Concurrent chess position-graph explorer.
//!
//! ## Modules
//!
//! - `types`: basic types (Color, Square, Piece, Evaluation)
//! - `position`: board position, FEN, JSON record, move notation
//! - `movegen`: move generation and check detection
//! - `oracle`: expand a position into children and a static value
//! - `queue`: blocking batch FIFO feeding the workers
//! - `graph`: deduplicated position graph with per-node locks
//! - `engine`: worker pool, backpropagation, commit and prune
//! - `config`: explorer settings (TOML)
//!

pub mod types;

pub mod movegen;
pub mod position;

pub mod oracle;

pub mod graph;
pub mod queue;

pub mod engine;

pub mod config;
pub mod error;

pub use config::ExplorerConfig;
pub use engine::{CommitSummary, ExplorationReport, Explorer};
pub use error::{ConfigError, EngineError, GraphError, NotationError, PositionError};
pub use oracle::{Expansion, MaterialOracle, Oracle};
pub use position::Position;
pub use types::{Color, Evaluation, Outcome, Piece, PieceKind, Square};
