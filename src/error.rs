//! Error types for the index engine.

use crate::scalar::ScalarKind;
use crate::strategy::Strategy;
use thiserror::Error;

/// Errors surfaced by span construction and the index adapters.
///
/// Every variant is a precondition violation: it aborts the calling
/// operation immediately and is never partially handled. Degenerate
/// picksplit input is not an error; it takes the documented fallback path.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("span lower bound {lower} exceeds upper bound {upper}")]
    InvalidSpan { lower: String, upper: String },

    #[error("mixed base types: expected {expected}, got {got}")]
    TypeMismatch {
        expected: ScalarKind,
        got: ScalarKind,
    },

    #[error("{operation} requires at least one entry")]
    EmptyEntries { operation: &'static str },

    #[error("picksplit requires at least two entries, got {got}")]
    NotEnoughEntries { got: usize },

    #[error("boxes have incompatible axis sets: {axis} present on one side only")]
    DimensionMismatch { axis: &'static str },

    #[error("strategy {strategy:?} names axis {axis} which is absent from an operand")]
    MissingAxis {
        strategy: Strategy,
        axis: &'static str,
    },

    #[error("strategy {0:?} is not supported by this adapter")]
    UnsupportedStrategy(Strategy),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, IndexError>;
