//! Multi-start bundle packing solver.
//!
//! [`BundlePacker`] drives the whole pipeline for one wire set: initial
//! guess generation, one constrained solve per restart through the
//! [`ConstrainedSolver`] seam, and the multi-start reduction. A restart that
//! fails numerically is degraded to an infeasible outcome so it can never
//! abort the batch.

use crate::constraint::PackingProblem;
use crate::geometry::{enclosing_radius, Layout};
use crate::result::Solution;
use crate::wire::WireSet;
use cablepack_core::alm::{AlmConfig, AlmSolver};
use cablepack_core::multistart::{
    MultiStartConfig, MultiStartProblem, MultiStartRunner, Restart,
};
use cablepack_core::nlp::ConstrainedSolver;
use cablepack_core::{Error, Result};
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Assumed density of a random scatter; keeps initial disks loose enough to
/// untangle.
const SCATTER_DENSITY: f64 = 0.5;

/// Radial step per wire of the spiral guess, in effective radii.
const SPIRAL_STEP_FACTOR: f64 = 1.5;

/// Configuration for one packing solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackConfig {
    /// Manufacturing tolerance margin: every radius is inflated to
    /// `r * (1 + margin)`.
    pub margin: f64,

    /// Number of independent solver restarts.
    pub restarts: usize,

    /// Iteration cap of each restart's inner smooth solve.
    pub max_iterations: usize,

    /// Feasibility tolerance on constraint residuals.
    pub tolerance: f64,

    /// Master random seed (None = drawn from entropy).
    pub seed: Option<u64>,

    /// Worker threads for the restart batch (0 = all cores).
    pub threads: usize,

    /// Wall-clock limit in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Settings of the underlying augmented Lagrangian solver.
    pub alm: AlmConfig,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            margin: 0.0,
            restarts: 8,
            max_iterations: 2000,
            tolerance: 1e-6,
            seed: None,
            threads: 0,
            time_limit_ms: 0,
            alm: AlmConfig::default(),
        }
    }
}

impl PackConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance margin fraction.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the restart count.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Sets the per-restart iteration cap.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the feasibility tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the master random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the worker thread count (0 = all cores).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the wall-clock limit in milliseconds (0 = unlimited).
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::InvalidMargin(self.margin));
        }
        if self.restarts == 0 {
            return Err(Error::ConfigError(
                "at least one restart is required".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(Error::ConfigError(
                "at least one solver iteration is required".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::ConfigError(format!(
                "invalid feasibility tolerance {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Circle-packing solver for one wire bundle.
pub struct BundlePacker<S: ConstrainedSolver = AlmSolver> {
    config: PackConfig,
    solver: S,
    cancelled: Arc<AtomicBool>,
}

impl BundlePacker<AlmSolver> {
    /// Creates a packer with the default augmented Lagrangian backend.
    pub fn new(config: PackConfig) -> Self {
        let solver = AlmSolver::new(config.alm.clone());
        Self::with_solver(config, solver)
    }
}

impl<S: ConstrainedSolver + Send + Sync> BundlePacker<S> {
    /// Creates a packer with a custom solver backend.
    pub fn with_solver(config: PackConfig, solver: S) -> Self {
        Self {
            config,
            solver,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Returns a handle that cancels not-yet-started restarts.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Cancels the in-flight batch, if any.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Packs `wires` into the smallest enclosing circle, keeping every
    /// center outside `core_radius` when one is given.
    ///
    /// Runs the configured number of independent restarts in parallel and
    /// returns the feasible arrangement with the smallest outer radius.
    /// Fails with [`Error::NoFeasibleSolution`] when a completed batch finds
    /// nothing feasible, or [`Error::Cancelled`] when the batch was cut
    /// short first.
    pub fn pack(&self, wires: &WireSet, core_radius: Option<f64>) -> Result<Solution> {
        self.config.validate()?;
        if wires.is_empty() {
            return Err(Error::ConfigError(
                "cannot pack an empty wire set".to_string(),
            ));
        }
        if let Some(core) = core_radius {
            if !core.is_finite() || core < 0.0 {
                return Err(Error::ConfigError(format!(
                    "invalid frozen core radius {}",
                    core
                )));
            }
        }
        let eff_radii = wires.effective_radii(self.config.margin)?;

        log::debug!(
            "packing {} wires: {} restarts, {} iterations, core {:?}",
            eff_radii.len(),
            self.config.restarts,
            self.config.max_iterations,
            core_radius
        );
        self.cancelled.store(false, Ordering::Relaxed);
        let start = Instant::now();

        let problem = RestartProblem {
            eff_radii: &eff_radii,
            core_radius,
            solver: &self.solver,
            max_iterations: self.config.max_iterations as u64,
            tolerance: self.config.tolerance,
        };
        let ms_config = MultiStartConfig {
            restarts: self.config.restarts,
            seed: self.config.seed,
            threads: self.config.threads,
            time_limit_ms: self.config.time_limit_ms,
        };
        let runner = MultiStartRunner::with_cancellation(ms_config, problem, self.cancelled.clone());
        let batch = runner.run()?;
        let computation_time_ms = start.elapsed().as_millis() as u64;

        match batch.best {
            Some(best) => Ok(Solution {
                layout: best.solution.layout,
                effective_radii: eff_radii,
                feasible: true,
                max_violation: best.solution.max_violation,
                restart: best.index,
                feasible_count: batch.feasible_count,
                restarts_run: batch.restarts_run,
                computation_time_ms,
            }),
            None if batch.cancelled => Err(Error::Cancelled),
            None => Err(Error::NoFeasibleSolution {
                restarts: batch.restarts_run,
            }),
        }
    }
}

/// Payload of one restart: the arrangement it reached and how badly it
/// violates the constraints.
struct SingleRun {
    layout: Layout,
    max_violation: f64,
}

/// One packing batch seen through the multi-start framework.
struct RestartProblem<'a, S> {
    eff_radii: &'a [f64],
    core_radius: Option<f64>,
    solver: &'a S,
    max_iterations: u64,
    tolerance: f64,
}

impl<S: ConstrainedSolver + Send + Sync> MultiStartProblem for RestartProblem<'_, S> {
    type Solution = SingleRun;

    fn run_restart(&self, index: usize, rng: &mut StdRng) -> Restart<SingleRun> {
        let problem = PackingProblem::new(self.eff_radii.to_vec(), self.core_radius);
        // Restart 0 winds the deterministic spiral; the rest scatter randomly.
        let x0 = if index == 0 {
            spiral_guess(self.eff_radii, self.core_radius)
        } else {
            random_guess(self.eff_radii, self.core_radius, rng)
        };

        match self.solver.minimize(&problem, x0, self.max_iterations) {
            Ok(solution) => {
                let layout = Layout::from_vector(&solution.x);
                let feasible = solution.max_violation <= self.tolerance;
                Restart {
                    index,
                    objective: layout.outer_radius,
                    feasible,
                    solution: SingleRun {
                        layout,
                        max_violation: solution.max_violation,
                    },
                }
            }
            Err(e) => {
                log::warn!(
                    "restart {} failed numerically ({}); degraded to infeasible",
                    index,
                    e
                );
                Restart {
                    index,
                    objective: f64::INFINITY,
                    feasible: false,
                    solution: SingleRun {
                        layout: Layout {
                            centers: Vec::new(),
                            outer_radius: f64::INFINITY,
                        },
                        max_violation: f64::INFINITY,
                    },
                }
            }
        }
    }
}

/// Radius of the scatter disk for random initial guesses: holds the total
/// effective disk area at [`SCATTER_DENSITY`] (the `pi` factors cancel),
/// floored by the largest effective diameter.
fn scatter_radius(eff_radii: &[f64]) -> f64 {
    let area: f64 = eff_radii.iter().map(|r| r * r).sum();
    let max_r = eff_radii.iter().fold(0.0_f64, |acc, &r| acc.max(r));
    (area / SCATTER_DENSITY).sqrt().max(2.0 * max_r)
}

/// Flattens centers into the optimization vector, with the initial outer
/// radius set to the farthest center's distance plus its effective radius.
fn initial_vector(centers: Vec<(f64, f64)>, eff_radii: &[f64]) -> Vec<f64> {
    let outer = enclosing_radius(&centers, eff_radii);
    let layout = Layout {
        centers,
        outer_radius: outer,
    };
    layout.to_vector()
}

/// Deterministic spiral guess: wires wound largest-first on an unwinding
/// spiral, starting outside the frozen core when one exists.
fn spiral_guess(eff_radii: &[f64], core_radius: Option<f64>) -> Vec<f64> {
    let n = eff_radii.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eff_radii[b]
            .partial_cmp(&eff_radii[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let step = TAU / n.max(1) as f64;
    let mut centers = vec![(0.0, 0.0); n];
    let mut angle = 0.0_f64;
    let mut radius = core_radius.unwrap_or(0.0);
    for &idx in &order {
        radius += SPIRAL_STEP_FACTOR * eff_radii[idx];
        centers[idx] = (radius * angle.cos(), radius * angle.sin());
        angle += step;
    }
    initial_vector(centers, eff_radii)
}

/// Random scatter: uniform over a loose square without a core, polar over
/// the annulus just outside the core with one.
fn random_guess(eff_radii: &[f64], core_radius: Option<f64>, rng: &mut StdRng) -> Vec<f64> {
    let span = scatter_radius(eff_radii);
    let centers = eff_radii
        .iter()
        .map(|&r| match core_radius {
            Some(core) => {
                let angle = rng.gen_range(0.0..TAU);
                let radial = core + r + rng.gen::<f64>() * span;
                (radial * angle.cos(), radial * angle.sin())
            }
            None => (rng.gen_range(-span..span), rng.gen_range(-span..span)),
        })
        .collect();
    initial_vector(centers, eff_radii)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{min_core_clearance, origin_distances};
    use rand::SeedableRng;

    #[test]
    fn test_spiral_guess_clears_the_core() {
        let eff = [1.0, 0.5, 0.5, 0.25];
        let x = spiral_guess(&eff, Some(3.0));
        let layout = Layout::from_vector(&x);

        assert!(min_core_clearance(&layout.centers, &eff, 3.0) >= 0.0);
        assert!((layout.outer_radius - enclosing_radius(&layout.centers, &eff)).abs() < 1e-12);
    }

    #[test]
    fn test_spiral_guess_separates_consecutive_wires() {
        let eff = [1.0, 1.0, 1.0];
        let x = spiral_guess(&eff, None);
        let layout = Layout::from_vector(&x);

        // Each wire sits on a strictly larger spiral radius than the one
        // placed before it.
        let mut distances = origin_distances(&layout.centers);
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in distances.windows(2) {
            assert!(pair[1] - pair[0] >= 1.0);
        }
    }

    #[test]
    fn test_random_guess_with_core_stays_outside() {
        let eff = [1.0, 0.5];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let x = random_guess(&eff, Some(2.0), &mut rng);
            let layout = Layout::from_vector(&x);
            assert!(min_core_clearance(&layout.centers, &eff, 2.0) >= 0.0);
        }
    }

    #[test]
    fn test_scatter_radius_floor() {
        // A single wire: the floor (one effective diameter) dominates.
        assert!(scatter_radius(&[1.0]) >= 2.0);
        // Many wires: the area term dominates and grows with the count.
        assert!(scatter_radius(&[1.0; 50]) > scatter_radius(&[1.0; 10]));
    }

    #[test]
    fn test_pack_rejects_bad_inputs() {
        let packer = BundlePacker::new(PackConfig::default().with_seed(1));
        let wires = WireSet::from_radii(&[1.0]);

        assert!(matches!(
            packer.pack(&WireSet::new(), None),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            packer.pack(&wires, Some(f64::NAN)),
            Err(Error::ConfigError(_))
        ));

        let packer = BundlePacker::new(PackConfig::default().with_restarts(0));
        assert!(matches!(
            packer.pack(&wires, None),
            Err(Error::ConfigError(_))
        ));

        let packer = BundlePacker::new(PackConfig::default().with_margin(-0.5));
        assert!(matches!(
            packer.pack(&wires, None),
            Err(Error::InvalidMargin(_))
        ));
    }

    #[test]
    fn test_pack_single_wire() {
        let config = PackConfig::default()
            .with_restarts(2)
            .with_max_iterations(300)
            .with_seed(7);
        let packer = BundlePacker::new(config);
        let wires = WireSet::from_radii(&[1.5]);

        let solution = packer.pack(&wires, None).unwrap();
        assert!(solution.feasible);
        assert!(solution.max_violation <= 1e-6);
        assert!(
            (solution.outer_radius() - 1.5).abs() < 5e-3,
            "outer radius = {}",
            solution.outer_radius()
        );
        assert_eq!(solution.wire_count(), 1);
        assert_eq!(solution.effective_radii, vec![1.5]);
    }
}
