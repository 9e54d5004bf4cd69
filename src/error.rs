//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by the GA toolkit.
///
/// Configuration and type-contract errors are returned to the caller
/// immediately. Evaluation timeouts are not errors: they end a run early
/// and are reported through [`History::timed_out`](crate::ga::History::timed_out).
#[derive(Error, Debug)]
pub enum Error {
    /// A selection method name that maps to no known strategy.
    #[error("unknown selection method: {0:?}")]
    UnknownSelection(String),

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two shapes that must agree do not.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape required by the receiver.
        expected: Vec<usize>,
        /// Shape that was supplied.
        actual: Vec<usize>,
    },

    /// A flat buffer or mask whose length does not match the genome.
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch {
        /// Element count required by the shape.
        expected: usize,
        /// Element count that was supplied.
        actual: usize,
    },

    /// Incoming individuals do not match the population's record layout.
    #[error("individual layout mismatch: {0}")]
    LayoutMismatch(String),

    /// A fitness value that is not a number.
    #[error("invalid fitness value: {0}")]
    InvalidFitness(f64),

    /// An aggregate was requested from a population with no individuals.
    #[error("population is empty")]
    EmptyPopulation,

    /// Random initialisation was requested with no gene values to draw from.
    #[error("gene value set is empty")]
    EmptyGeneValues,

    /// Fitness evaluation aborted without producing results.
    #[error("fitness evaluation failed: {0}")]
    EvaluationFailed(String),

    /// History persistence failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
