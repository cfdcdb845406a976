//! # Cablepack Bundle
//!
//! 2D circle-packing engine for wire bundles.
//!
//! Given a set of circular wires with known radii, the engine finds
//! non-overlapping center positions minimizing the radius of a single
//! enclosing circle, optionally keeping every wire outside a frozen inner
//! core left behind by earlier shield/sleeve layers.
//!
//! ## Core Components
//!
//! - **Wires**: [`Wire`], [`WireSet`] - immutable inputs with margin-inflated
//!   effective radii
//! - **Geometry**: [`Layout`] and pure distance/clearance helpers
//! - **Constraints**: [`PackingProblem`] - containment, non-overlap, and
//!   frozen-core residuals with first-order information
//! - **Packer**: [`BundlePacker`], [`PackConfig`] - parallel multi-start
//!   constrained solves, best-feasible selection
//! - **Layers**: [`Layer`], [`BundleState`] - freezing an accepted solution
//!   into the exclusion core of the next ring
//!
//! ## Example
//!
//! ```rust
//! use cablepack_bundle::{BundlePacker, BundleState, PackConfig};
//!
//! let mut state = BundleState::new();
//! state.add_group(1.0, 3);
//! state.add_group(0.5, 2);
//!
//! let config = PackConfig::new()
//!     .with_margin(0.05)
//!     .with_restarts(8)
//!     .with_seed(42);
//! let packer = BundlePacker::new(config);
//!
//! let solution = state.solve(&packer).unwrap();
//! assert!(solution.feasible);
//!
//! // Freeze the ring under a 0.4 thick shield and start the next one.
//! state.promote(0.4, Some("inner shield".to_string())).unwrap();
//! assert!(state.core_radius().is_some());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod constraint;
pub mod geometry;
pub mod layer;
pub mod packer;
pub mod result;
pub mod state;
pub mod wire;

// Re-exports
pub use cablepack_core::{
    AlmConfig, AlmSolver, ConstrainedSolver, Error, NlpProblem, NlpSolution, Result,
};
pub use constraint::PackingProblem;
pub use geometry::Layout;
pub use layer::Layer;
pub use packer::{BundlePacker, PackConfig};
pub use result::Solution;
pub use state::BundleState;
pub use wire::{Wire, WireSet};
