//! # Cablepack Core
//!
//! Solver frameworks for the cablepack wire-bundle optimizer.
//!
//! This crate provides the numerical machinery shared by packing domains,
//! kept free of any wire-specific knowledge:
//!
//! - **Solver seam**: [`NlpProblem`] and [`ConstrainedSolver`] - a smooth
//!   scalar objective under inequality constraints, minimized from an
//!   initial point with an iteration cap.
//! - **Augmented Lagrangian**: [`AlmSolver`] - the default
//!   [`ConstrainedSolver`], a Powell-Hestenes-Rockafellar outer loop around
//!   an L-BFGS inner solve.
//! - **Multi-start framework**: [`MultiStartRunner`], [`MultiStartProblem`] -
//!   embarrassingly parallel randomized restarts with a deterministic
//!   seed-per-restart scheme and a min-feasible-objective reduction.
//! - **Errors**: [`Error`], [`Result`].
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod alm;
pub mod error;
pub mod multistart;
pub mod nlp;

// Re-exports
pub use alm::{AlmConfig, AlmSolver};
pub use error::{Error, Result};
pub use multistart::{
    MultiStartConfig, MultiStartProblem, MultiStartResult, MultiStartRunner, Restart,
};
pub use nlp::{ConstrainedSolver, NlpProblem, NlpSolution};
