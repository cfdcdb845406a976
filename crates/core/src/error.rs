//! Error types for cablepack.

use thiserror::Error;

/// Result type alias for cablepack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during bundle packing operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A wire radius was zero, negative, or non-finite.
    #[error("invalid radius {value} for wire {index}: radii must be positive and finite")]
    InvalidRadius {
        /// Position of the offending wire in its set.
        index: usize,
        /// The rejected radius value.
        value: f64,
    },

    /// The margin fraction was negative or non-finite.
    #[error("invalid margin {0}: margins must be non-negative and finite")]
    InvalidMargin(f64),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The numerical solve of a single restart failed.
    ///
    /// Contained by the packer, which degrades the restart to an infeasible
    /// outcome; surfaced only when the solver seam is driven directly.
    #[error("solver failure: {0}")]
    Solver(String),

    /// Every restart in a completed batch violated the constraints.
    #[error("no feasible packing found within {restarts} restart(s)")]
    NoFeasibleSolution {
        /// Number of restarts that were executed.
        restarts: usize,
    },

    /// The batch was cancelled before any feasible packing was found.
    #[error("computation cancelled")]
    Cancelled,

    /// Promotion requested while no feasible solution exists.
    #[error("no feasible solution available to promote")]
    NoSolutionAvailable,
}

impl From<argmin::core::Error> for Error {
    fn from(e: argmin::core::Error) -> Self {
        Self::Solver(e.to_string())
    }
}
