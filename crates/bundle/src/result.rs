//! Packing solve results.

use crate::geometry::Layout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Best outcome of a multi-start packing batch.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// The optimized arrangement.
    pub layout: Layout,

    /// Margin-inflated radii the batch solved for, in wire-set order.
    pub effective_radii: Vec<f64>,

    /// Whether every constraint holds within the configured tolerance.
    pub feasible: bool,

    /// Largest constraint violation at the returned arrangement.
    pub max_violation: f64,

    /// Index of the restart that produced this arrangement.
    pub restart: usize,

    /// Number of restarts that reached feasibility.
    pub feasible_count: usize,

    /// Number of restarts executed (skipped restarts excluded).
    pub restarts_run: usize,

    /// Wall-clock time of the whole batch in milliseconds.
    pub computation_time_ms: u64,
}

impl Solution {
    /// Achieved radius of the enclosing circle.
    pub fn outer_radius(&self) -> f64 {
        self.layout.outer_radius
    }

    /// Achieved diameter of the enclosing circle.
    pub fn outer_diameter(&self) -> f64 {
        self.layout.outer_diameter()
    }

    /// Number of wires in the arrangement.
    pub fn wire_count(&self) -> usize {
        self.layout.len()
    }
}
