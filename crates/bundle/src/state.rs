//! Bundle session state.
//!
//! [`BundleState`] is the explicit, caller-owned aggregate of one packing
//! session: the working wire set, the stack of frozen layers, and the best
//! solution of the latest batch. The engine never holds a global; the caller
//! threads the state through `solve`, `promote`, and `reset` by `&mut`,
//! which also rules out mutating it while a batch is in flight.

use crate::layer::Layer;
use crate::packer::BundlePacker;
use crate::result::Solution;
use crate::wire::{Wire, WireSet};
use cablepack_core::nlp::ConstrainedSolver;
use cablepack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mutable session state for layered bundle packing.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BundleState {
    wires: WireSet,
    layers: Vec<Layer>,
    solution: Option<Solution>,
}

impl BundleState {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The working wire set of the next ring.
    pub fn wires(&self) -> &WireSet {
        &self.wires
    }

    /// The frozen layers, oldest first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Best solution of the latest batch, if one succeeded.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Exclusion radius for the next solve. Only the newest layer matters:
    /// layers are nested and monotonically growing, so clearing the latest
    /// boundary clears all earlier ones.
    pub fn core_radius(&self) -> Option<f64> {
        self.layers.last().map(Layer::core_radius)
    }

    /// Appends one wire to the working set.
    pub fn add_wire(&mut self, wire: Wire) {
        self.wires.add(wire);
    }

    /// Appends `count` wires of the same radius to the working set.
    pub fn add_group(&mut self, radius: f64, count: usize) {
        self.wires.add_group(radius, count);
    }

    /// Solves the working set with the given packer, constrained outside the
    /// newest layer's core radius. The working set is read, not consumed;
    /// the stored solution is replaced on success.
    pub fn solve<S>(&mut self, packer: &BundlePacker<S>) -> Result<&Solution>
    where
        S: ConstrainedSolver + Send + Sync,
    {
        if self.wires.is_empty() {
            return Err(Error::ConfigError(
                "no wires defined for the current ring".to_string(),
            ));
        }
        let solution = packer.pack(&self.wires, self.core_radius())?;
        Ok(&*self.solution.insert(solution))
    }

    /// Freezes the current solution into a layer with the given annular
    /// shield/sleeve thickness, then clears the working set so the caller
    /// can define the next ring.
    ///
    /// Fails with [`Error::NoSolutionAvailable`] when no feasible solution
    /// exists, including right after a previous promotion, whose working
    /// set was cleared.
    pub fn promote(&mut self, thickness: f64, label: Option<String>) -> Result<&Layer> {
        if !thickness.is_finite() || thickness < 0.0 {
            return Err(Error::ConfigError(format!(
                "invalid layer thickness {}",
                thickness
            )));
        }
        match self.solution.take() {
            Some(solution) if solution.feasible => {
                self.layers.push(Layer::new(
                    solution.layout,
                    solution.effective_radii,
                    thickness,
                    label,
                ));
                self.wires = WireSet::new();
                Ok(&self.layers[self.layers.len() - 1])
            }
            other => {
                // Leave a stale-but-infeasible solution in place for
                // inspection; only a promotion consumes it.
                self.solution = other;
                Err(Error::NoSolutionAvailable)
            }
        }
    }

    /// Clears the working set, the layer stack, and the solution. A single
    /// exclusive borrow: no partially reset state is observable.
    pub fn reset(&mut self) {
        self.wires = WireSet::new();
        self.layers.clear();
        self.solution = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Layout;

    fn feasible_solution(outer_radius: f64) -> Solution {
        Solution {
            layout: Layout {
                centers: vec![(0.0, 0.0)],
                outer_radius,
            },
            effective_radii: vec![outer_radius],
            feasible: true,
            max_violation: 0.0,
            restart: 0,
            feasible_count: 1,
            restarts_run: 1,
            computation_time_ms: 0,
        }
    }

    fn state_with_solution(outer_radius: f64) -> BundleState {
        let mut state = BundleState::new();
        state.add_group(outer_radius, 1);
        state.solution = Some(feasible_solution(outer_radius));
        state
    }

    #[test]
    fn test_promote_without_solution_fails() {
        let mut state = BundleState::new();
        assert!(matches!(
            state.promote(0.5, None),
            Err(Error::NoSolutionAvailable)
        ));
    }

    #[test]
    fn test_promote_freezes_and_clears() {
        let mut state = state_with_solution(2.0);
        let core = {
            let layer = state.promote(0.5, Some("shield".to_string())).unwrap();
            layer.core_radius()
        };

        assert_eq!(core, 2.5);
        assert_eq!(state.core_radius(), Some(2.5));
        assert!(state.wires().is_empty());
        assert!(state.solution().is_none());
        assert_eq!(state.layers().len(), 1);
    }

    #[test]
    fn test_promote_twice_fails() {
        let mut state = state_with_solution(2.0);
        state.promote(0.5, None).unwrap();
        assert!(matches!(
            state.promote(0.5, None),
            Err(Error::NoSolutionAvailable)
        ));
    }

    #[test]
    fn test_promote_rejects_bad_thickness() {
        let mut state = state_with_solution(2.0);
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                state.promote(bad, None),
                Err(Error::ConfigError(_))
            ));
        }
        // The solution survived the rejected attempts.
        assert!(state.solution().is_some());
    }

    #[test]
    fn test_infeasible_solution_is_not_promotable() {
        let mut state = state_with_solution(2.0);
        if let Some(solution) = state.solution.as_mut() {
            solution.feasible = false;
        }
        assert!(matches!(
            state.promote(0.5, None),
            Err(Error::NoSolutionAvailable)
        ));
        // Still inspectable afterwards.
        assert!(state.solution().is_some());
    }

    #[test]
    fn test_only_newest_layer_sets_the_core() {
        let mut state = state_with_solution(2.0);
        state.promote(0.5, None).unwrap();
        state.add_group(1.0, 1);
        state.solution = Some(feasible_solution(4.0));
        state.promote(1.0, None).unwrap();

        assert_eq!(state.layers().len(), 2);
        assert_eq!(state.core_radius(), Some(5.0));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = state_with_solution(2.0);
        state.promote(0.5, None).unwrap();
        state.add_group(1.0, 3);
        state.solution = Some(feasible_solution(4.0));

        state.reset();
        assert!(state.wires().is_empty());
        assert!(state.layers().is_empty());
        assert!(state.solution().is_none());
        assert_eq!(state.core_radius(), None);
    }
}
