//! Error types
//!
//! Boundary errors (text and records coming from outside) and the invariant
//! violations the graph can detect. Missing nodes during propagation or
//! pruning are not errors: they mean the branch was already pruned.

use crate::position::Position;

/// Errors decoding a position from FEN or from the persisted record
#[derive(thiserror::Error, Debug)]
pub enum PositionError {
    /// Record does not hold exactly 64 squares
    #[error("expected 64 squares, got {0}")]
    SquareCount(usize),

    /// Byte that the square encoding never produces
    #[error("invalid square encoding {byte:#010b} at index {index}")]
    InvalidSquare { index: usize, byte: u8 },

    /// Malformed FEN text
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// Each side needs exactly one king
    #[error("expected one king per side, found {white} white and {black} black")]
    KingCount { white: usize, black: usize },

    /// Record JSON could not be parsed
    #[error("invalid position record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors parsing coordinate move text
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NotationError {
    #[error("malformed move text {0:?}, expected e.g. e2e4 or e7e8q")]
    Malformed(String),

    #[error("{0} is not a legal move in this position")]
    NoSuchMove(String),
}

/// Invariant violations detected by the position graph
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// Removal requested while parent edges still point at the node
    #[error("cannot remove {position:?}: {parents} parent edge(s) remain")]
    HasParents { position: Position, parents: usize },

    /// Removal of the live root requested
    #[error("cannot remove the live root {0:?}")]
    LiveRoot(Position),

    /// Node required by the operation is not in the graph
    #[error("position not in graph: {0:?}")]
    Missing(Position),
}

/// Errors raised by the explorer's public operations
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Commit target is not a legal reply of the current root
    #[error("{0:?} is not a legal reply to the current root")]
    IllegalReply(Position),

    /// The current root has no known reply yet
    #[error("no best reply known for the current root")]
    NoBestReply,

    /// Graph invariant violated
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Worker or reporter thread could not be spawned
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Operation needs a running (or a stopped) explorer
    #[error("explorer is {0}")]
    State(&'static str),
}

/// Errors loading explorer configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
