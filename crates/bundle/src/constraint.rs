//! Constraint evaluation for the packing NLP.
//!
//! The optimization vector is `[x0, y0, .., x_{n-1}, y_{n-1}, R]` and the
//! objective is plain `R`. Three residual families, each `>= 0` when
//! satisfied:
//!
//! 1. Containment, per wire: `R - (|c_i| + r_i)`.
//! 2. Non-overlap, per unordered pair: `|c_i - c_j| - (r_i + r_j)`.
//! 3. Frozen core, per wire (only with a prior layer): `|c_i| - (R_core + r_i)`.
//!
//! All radii here are margin-inflated effective radii.

use crate::geometry::index_pairs;
use cablepack_core::nlp::NlpProblem;
use nalgebra::Vector2;

/// Center distance below which norm gradients switch to a finite fallback
/// direction instead of dividing by a vanishing denominator.
const DEGENERATE_DISTANCE: f64 = 1e-12;

/// The circle-packing problem in NLP form.
#[derive(Debug, Clone)]
pub struct PackingProblem {
    eff_radii: Vec<f64>,
    pairs: Vec<(usize, usize)>,
    core_radius: Option<f64>,
}

impl PackingProblem {
    /// Creates the problem for the given effective radii and optional frozen
    /// core radius.
    pub fn new(eff_radii: Vec<f64>, core_radius: Option<f64>) -> Self {
        let pairs = index_pairs(eff_radii.len());
        Self {
            eff_radii,
            pairs,
            core_radius,
        }
    }

    /// Number of wires.
    pub fn wire_count(&self) -> usize {
        self.eff_radii.len()
    }

    /// The effective radii the problem was built with.
    pub fn effective_radii(&self) -> &[f64] {
        &self.eff_radii
    }

    /// The frozen core radius, if any.
    pub fn core_radius(&self) -> Option<f64> {
        self.core_radius
    }

    /// All residuals as a fresh vector (convenience over
    /// [`NlpProblem::constraints`]).
    pub fn residuals(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.num_constraints()];
        self.constraints(x, &mut out);
        out
    }

    fn center(x: &[f64], i: usize) -> Vector2<f64> {
        Vector2::new(x[2 * i], x[2 * i + 1])
    }
}

impl NlpProblem for PackingProblem {
    fn dim(&self) -> usize {
        2 * self.eff_radii.len() + 1
    }

    fn num_constraints(&self) -> usize {
        let n = self.eff_radii.len();
        let core = if self.core_radius.is_some() { n } else { 0 };
        n + self.pairs.len() + core
    }

    fn objective(&self, x: &[f64]) -> f64 {
        x[self.dim() - 1]
    }

    fn objective_grad(&self, _x: &[f64], grad: &mut [f64]) {
        grad.fill(0.0);
        let last = grad.len() - 1;
        grad[last] = 1.0;
    }

    fn constraints(&self, x: &[f64], out: &mut [f64]) {
        let n = self.eff_radii.len();
        let outer = x[self.dim() - 1];
        let mut idx = 0;

        for (i, &r) in self.eff_radii.iter().enumerate() {
            out[idx] = outer - (Self::center(x, i).norm() + r);
            idx += 1;
        }
        for &(i, j) in &self.pairs {
            let d = (Self::center(x, i) - Self::center(x, j)).norm();
            out[idx] = d - (self.eff_radii[i] + self.eff_radii[j]);
            idx += 1;
        }
        if let Some(core) = self.core_radius {
            for (i, &r) in self.eff_radii.iter().enumerate() {
                out[idx] = Self::center(x, i).norm() - (core + r);
                idx += 1;
            }
        }
    }

    fn constraint_grad(&self, x: &[f64], k: usize, grad: &mut [f64]) {
        grad.fill(0.0);
        let n = self.eff_radii.len();
        let last = grad.len() - 1;

        if k < n {
            // Containment: d/dc_i = -c_i / |c_i|, d/dR = 1. A center exactly
            // at the origin sits at the residual's maximum; the zero
            // subgradient is valid there.
            let c = Self::center(x, k);
            let d = c.norm();
            if d > DEGENERATE_DISTANCE {
                grad[2 * k] = -c.x / d;
                grad[2 * k + 1] = -c.y / d;
            }
            grad[last] = 1.0;
        } else if k < n + self.pairs.len() {
            // Non-overlap: d/dc_i = (c_i - c_j) / |c_i - c_j| and the
            // opposite for c_j. Coincident centers get a full-magnitude
            // fixed separating push instead of a division by zero.
            let (i, j) = self.pairs[k - n];
            let diff = Self::center(x, i) - Self::center(x, j);
            let d = diff.norm();
            let dir = if d > DEGENERATE_DISTANCE {
                diff / d
            } else {
                Vector2::new(1.0, 0.0)
            };
            grad[2 * i] = dir.x;
            grad[2 * i + 1] = dir.y;
            grad[2 * j] = -dir.x;
            grad[2 * j + 1] = -dir.y;
        } else {
            // Frozen core: d/dc_i = c_i / |c_i|. A center on the core axis
            // gets a fixed outward push of full magnitude.
            let i = k - n - self.pairs.len();
            let c = Self::center(x, i);
            let d = c.norm();
            if d > DEGENERATE_DISTANCE {
                grad[2 * i] = c.x / d;
                grad[2 * i + 1] = c.y / d;
            } else {
                grad[2 * i] = 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finite_difference(problem: &PackingProblem, x: &[f64], k: usize) -> Vec<f64> {
        let h = 1e-7;
        let mut grad = vec![0.0; x.len()];
        let mut lo = vec![0.0; problem.num_constraints()];
        let mut hi = vec![0.0; problem.num_constraints()];
        let mut xp = x.to_vec();
        for j in 0..x.len() {
            xp[j] = x[j] - h;
            problem.constraints(&xp, &mut lo);
            xp[j] = x[j] + h;
            problem.constraints(&xp, &mut hi);
            xp[j] = x[j];
            grad[j] = (hi[k] - lo[k]) / (2.0 * h);
        }
        grad
    }

    #[test]
    fn test_residual_values() {
        // Wires of effective radius 1 at (+-2, 0), outer radius 3, core 0.5.
        let problem = PackingProblem::new(vec![1.0, 1.0], Some(0.5));
        let x = [2.0, 0.0, -2.0, 0.0, 3.0];
        let g = problem.residuals(&x);

        assert_eq!(g.len(), 5);
        // Containment: 3 - (2 + 1) = 0 for both wires.
        assert!((g[0]).abs() < 1e-12);
        assert!((g[1]).abs() < 1e-12);
        // Pair: 4 - 2 = 2.
        assert!((g[2] - 2.0).abs() < 1e-12);
        // Core: 2 - (0.5 + 1) = 0.5 for both wires.
        assert!((g[3] - 0.5).abs() < 1e-12);
        assert!((g[4] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_counts_without_core() {
        let problem = PackingProblem::new(vec![1.0, 0.5, 0.25], None);
        assert_eq!(problem.dim(), 7);
        // 3 containment + 3 pairs, no core family.
        assert_eq!(problem.num_constraints(), 6);
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let problem = PackingProblem::new(vec![1.0, 0.7, 0.4], Some(0.8));
        // A generic point with no degeneracies.
        let x = [1.3, -0.4, -2.1, 0.9, 0.5, 2.6, 4.2];

        let mut grad = vec![0.0; x.len()];
        for k in 0..problem.num_constraints() {
            problem.constraint_grad(&x, k, &mut grad);
            let fd = finite_difference(&problem, &x, k);
            for (j, (&a, &b)) in grad.iter().zip(&fd).enumerate() {
                assert!(
                    (a - b).abs() < 1e-5,
                    "constraint {} component {}: analytic {} vs fd {}",
                    k,
                    j,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_objective_gradient() {
        let problem = PackingProblem::new(vec![1.0, 1.0], None);
        let x = [0.0, 0.0, 1.0, 1.0, 5.0];
        assert_eq!(problem.objective(&x), 5.0);

        let mut grad = vec![0.0; 5];
        problem.objective_grad(&x, &mut grad);
        assert_eq!(grad, vec![0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_coincident_centers_fail_closed() {
        let problem = PackingProblem::new(vec![1.0, 1.0], None);
        // Both wires at the same point: the pair residual is deeply violated
        // and its gradient must still be finite with a separating direction.
        let x = [0.5, 0.5, 0.5, 0.5, 3.0];
        let g = problem.residuals(&x);
        assert!((g[2] + 2.0).abs() < 1e-12);

        let mut grad = vec![0.0; 5];
        problem.constraint_grad(&x, 2, &mut grad);
        assert!(grad.iter().all(|v| v.is_finite()));
        assert_eq!(grad[0], 1.0);
        assert_eq!(grad[2], -1.0);
    }

    #[test]
    fn test_center_at_origin_fail_closed() {
        let problem = PackingProblem::new(vec![1.0], Some(0.5));
        let x = [0.0, 0.0, 2.0];

        let mut grad = vec![0.0; 3];
        // Containment at the origin: zero subgradient, R component set.
        problem.constraint_grad(&x, 0, &mut grad);
        assert_eq!(grad, vec![0.0, 0.0, 1.0]);

        // Core family at the origin: fixed outward push.
        problem.constraint_grad(&x, 1, &mut grad);
        assert!(grad.iter().all(|v| v.is_finite()));
        assert_eq!(grad[0], 1.0);
    }
}
