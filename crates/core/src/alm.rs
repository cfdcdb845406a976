//! Augmented Lagrangian constrained minimization.
//!
//! Solves `min f(x)  s.t.  g_k(x) >= 0` with the Powell-Hestenes-Rockafellar
//! scheme: an outer loop maintains one multiplier estimate per constraint and
//! a growing penalty parameter, while each subproblem is a smooth
//! unconstrained minimization handled by L-BFGS with More-Thuente line
//! search (via `argmin`).
//!
//! The PHR term for a residual `g_k` with multiplier `l_k` and penalty `mu`
//! is `(max(0, l_k - mu * g_k)^2 - l_k^2) / (2 * mu)`, which is continuously
//! differentiable, so quasi-Newton inner solves are well behaved.

use crate::error::{Error, Result};
use crate::nlp::{ConstrainedSolver, NlpProblem, NlpSolution};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the augmented Lagrangian solver.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlmConfig {
    /// Initial penalty parameter.
    pub mu_init: f64,
    /// Multiplicative penalty growth applied when feasibility stalls.
    pub mu_factor: f64,
    /// Upper bound on the penalty parameter.
    pub mu_max: f64,
    /// Maximum outer (multiplier-update) iterations.
    pub max_outer_iters: usize,
    /// Constraint feasibility tolerance: converged when the largest
    /// violation drops below this value and the objective has stalled.
    pub constraint_tol: f64,
    /// Relative objective change below which the outer loop is considered
    /// stalled.
    pub objective_tol: f64,
    /// Required violation decrease ratio between outer iterations; a slower
    /// decrease grows the penalty.
    pub violation_decrease: f64,
    /// L-BFGS history length of the inner solver.
    pub lbfgs_memory: usize,
}

impl Default for AlmConfig {
    fn default() -> Self {
        Self {
            mu_init: 10.0,
            mu_factor: 5.0,
            mu_max: 1e8,
            max_outer_iters: 20,
            constraint_tol: 1e-6,
            objective_tol: 1e-9,
            violation_decrease: 0.25,
            lbfgs_memory: 7,
        }
    }
}

impl AlmConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial penalty parameter.
    pub fn with_mu_init(mut self, mu: f64) -> Self {
        self.mu_init = mu.max(f64::EPSILON);
        self
    }

    /// Sets the penalty growth factor.
    pub fn with_mu_factor(mut self, factor: f64) -> Self {
        self.mu_factor = factor.max(1.0);
        self
    }

    /// Sets the penalty upper bound.
    pub fn with_mu_max(mut self, mu_max: f64) -> Self {
        self.mu_max = mu_max.max(self.mu_init);
        self
    }

    /// Sets the maximum outer iterations.
    pub fn with_max_outer_iters(mut self, iters: usize) -> Self {
        self.max_outer_iters = iters.max(1);
        self
    }

    /// Sets the feasibility tolerance.
    pub fn with_constraint_tol(mut self, tol: f64) -> Self {
        self.constraint_tol = tol.max(0.0);
        self
    }

    /// Sets the L-BFGS history length.
    pub fn with_lbfgs_memory(mut self, memory: usize) -> Self {
        self.lbfgs_memory = memory.max(1);
        self
    }
}

/// Augmented Lagrangian solver with an L-BFGS inner loop.
#[derive(Debug, Clone, Default)]
pub struct AlmSolver {
    config: AlmConfig,
}

impl AlmSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: AlmConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AlmConfig {
        &self.config
    }
}

/// One smooth PHR subproblem: fixed multipliers and penalty.
struct Subproblem<'a, P> {
    problem: &'a P,
    lambdas: &'a [f64],
    mu: f64,
}

impl<P: NlpProblem> Subproblem<'_, P> {
    fn residuals(&self, x: &[f64]) -> Vec<f64> {
        let mut g = vec![0.0; self.problem.num_constraints()];
        self.problem.constraints(x, &mut g);
        g
    }
}

impl<P: NlpProblem> CostFunction for Subproblem<'_, P> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<f64, argmin::core::Error> {
        let g = self.residuals(x);
        let mut value = self.problem.objective(x);
        for (k, &gk) in g.iter().enumerate() {
            let t = (self.lambdas[k] - self.mu * gk).max(0.0);
            value += (t * t - self.lambdas[k] * self.lambdas[k]) / (2.0 * self.mu);
        }
        Ok(value)
    }
}

impl<P: NlpProblem> Gradient for Subproblem<'_, P> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, x: &Self::Param) -> std::result::Result<Vec<f64>, argmin::core::Error> {
        let n = self.problem.dim();
        let mut grad = vec![0.0; n];
        self.problem.objective_grad(x, &mut grad);

        let g = self.residuals(x);
        let mut cgrad = vec![0.0; n];
        for (k, &gk) in g.iter().enumerate() {
            let t = (self.lambdas[k] - self.mu * gk).max(0.0);
            if t > 0.0 {
                self.problem.constraint_grad(x, k, &mut cgrad);
                for (gj, &cj) in grad.iter_mut().zip(&cgrad) {
                    *gj -= t * cj;
                }
            }
        }
        Ok(grad)
    }
}

impl ConstrainedSolver for AlmSolver {
    fn minimize<P: NlpProblem>(
        &self,
        problem: &P,
        x0: Vec<f64>,
        max_iters: u64,
    ) -> Result<NlpSolution> {
        let n = problem.dim();
        let m = problem.num_constraints();
        if x0.len() != n {
            return Err(Error::ConfigError(format!(
                "initial point has dimension {}, problem expects {}",
                x0.len(),
                n
            )));
        }
        if !x0.iter().all(|v| v.is_finite()) || !problem.objective(&x0).is_finite() {
            return Err(Error::Solver(
                "non-finite objective or variables at the initial point".to_string(),
            ));
        }

        let mut x = x0;
        let mut lambdas = vec![0.0; m];
        let mut mu = self.config.mu_init;
        let mut violation = problem.max_violation(&x);
        let mut objective = problem.objective(&x);
        let mut inner_iterations = 0u64;
        let mut converged = false;
        let mut outer = 0;

        while outer < self.config.max_outer_iters {
            outer += 1;

            // The result holds the subproblem (and its borrow of the
            // multipliers), so it is scoped off before the update below.
            let inner = {
                let subproblem = Subproblem {
                    problem,
                    lambdas: &lambdas,
                    mu,
                };
                let linesearch = MoreThuenteLineSearch::new();
                let solver = LBFGS::new(linesearch, self.config.lbfgs_memory);
                Executor::new(subproblem, solver)
                    .configure(|state| state.param(x.clone()).max_iters(max_iters))
                    .run()
                    .map(|result| {
                        let state = result.state();
                        (state.get_iter(), state.get_best_param().cloned())
                    })
            };
            match inner {
                Ok((iters, best)) => {
                    inner_iterations += iters;
                    if let Some(best) = best {
                        x = best;
                    }
                }
                // A stalled line search near a nonsmooth point polishes no
                // further; keep the best iterate and let the feasibility
                // evaluation decide.
                Err(e) => {
                    log::debug!("inner solve stopped early in outer iteration {}: {}", outer, e);
                    break;
                }
            }
            if !x.iter().all(|v| v.is_finite()) {
                return Err(Error::Solver(
                    "inner solve produced non-finite variables".to_string(),
                ));
            }

            // Multiplier update: l_k <- max(0, l_k - mu * g_k).
            let mut residuals = vec![0.0; m];
            problem.constraints(&x, &mut residuals);
            for (lk, &gk) in lambdas.iter_mut().zip(&residuals) {
                *lk = (*lk - mu * gk).max(0.0);
            }

            let new_violation = residuals.iter().fold(0.0, |acc: f64, &g| acc.max(-g));
            let new_objective = problem.objective(&x);
            if !new_objective.is_finite() {
                return Err(Error::Solver("non-finite objective value".to_string()));
            }

            let objective_stalled = (new_objective - objective).abs()
                <= self.config.objective_tol * objective.abs().max(1.0);
            if new_violation <= self.config.constraint_tol && objective_stalled {
                violation = new_violation;
                objective = new_objective;
                converged = true;
                break;
            }

            // Grow the penalty only when feasibility is not improving fast
            // enough; otherwise the multipliers alone are doing the work.
            if new_violation > self.config.violation_decrease * violation {
                mu = (mu * self.config.mu_factor).min(self.config.mu_max);
            }
            violation = new_violation;
            objective = new_objective;
        }

        if !converged {
            log::debug!(
                "augmented Lagrangian stopped after {} outer iterations (violation {:.3e})",
                outer,
                violation
            );
        }

        Ok(NlpSolution {
            x,
            objective,
            max_violation: violation,
            outer_iterations: outer,
            inner_iterations,
            converged,
        })
    }
}
