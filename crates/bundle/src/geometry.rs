//! Pure 2D layout geometry.
//!
//! Everything here is side-effect free; the constraint evaluator and the
//! test suites share these helpers.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A candidate or final arrangement: one center per wire plus the radius of
/// the enclosing circle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Layout {
    /// Center coordinates per wire, in wire-set order.
    pub centers: Vec<(f64, f64)>,
    /// Radius of the enclosing circle.
    pub outer_radius: f64,
}

impl Layout {
    /// Number of wires in the arrangement.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Returns true if the arrangement holds no wires.
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Diameter of the enclosing circle.
    pub fn outer_diameter(&self) -> f64 {
        2.0 * self.outer_radius
    }

    /// Flattens into the optimization vector `[x0, y0, .., x_{n-1}, y_{n-1}, R]`.
    pub fn to_vector(&self) -> Vec<f64> {
        let mut x = Vec::with_capacity(2 * self.centers.len() + 1);
        for &(cx, cy) in &self.centers {
            x.push(cx);
            x.push(cy);
        }
        x.push(self.outer_radius);
        x
    }

    /// Rebuilds an arrangement from an optimization vector of dimension `2n + 1`.
    pub fn from_vector(x: &[f64]) -> Self {
        debug_assert!(x.len() % 2 == 1, "layout vectors have odd dimension 2n + 1");
        let n = x.len() / 2;
        let centers = (0..n).map(|i| (x[2 * i], x[2 * i + 1])).collect();
        Self {
            centers,
            outer_radius: x[2 * n],
        }
    }
}

/// Upper-triangle index pairs `(i, j)` with `i < j`, in row-major order.
pub fn index_pairs(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Distance from the origin to each center.
pub fn origin_distances(centers: &[(f64, f64)]) -> Vec<f64> {
    centers
        .iter()
        .map(|&(x, y)| Vector2::new(x, y).norm())
        .collect()
}

/// Distances between all unordered center pairs, in [`index_pairs`] order.
pub fn pairwise_distances(centers: &[(f64, f64)]) -> Vec<f64> {
    index_pairs(centers.len())
        .into_iter()
        .map(|(i, j)| {
            let (xi, yi) = centers[i];
            let (xj, yj) = centers[j];
            Vector2::new(xi - xj, yi - yj).norm()
        })
        .collect()
}

/// Smallest radius of an origin-centered circle enclosing every disk.
///
/// Returns `0.0` for an empty arrangement.
pub fn enclosing_radius(centers: &[(f64, f64)], radii: &[f64]) -> f64 {
    debug_assert_eq!(centers.len(), radii.len());
    origin_distances(centers)
        .iter()
        .zip(radii)
        .fold(0.0, |acc: f64, (&d, &r)| acc.max(d + r))
}

/// Smallest surface-to-surface clearance over all disk pairs.
///
/// Negative values mean overlap; `+inf` for fewer than two disks.
pub fn min_pair_clearance(centers: &[(f64, f64)], radii: &[f64]) -> f64 {
    debug_assert_eq!(centers.len(), radii.len());
    index_pairs(centers.len())
        .into_iter()
        .zip(pairwise_distances(centers))
        .fold(f64::INFINITY, |acc, ((i, j), d)| {
            acc.min(d - (radii[i] + radii[j]))
        })
}

/// Smallest clearance between disk surfaces and a core disk of the given
/// radius centered at the origin.
///
/// Negative values mean intrusion into the core; `+inf` for an empty
/// arrangement.
pub fn min_core_clearance(centers: &[(f64, f64)], radii: &[f64], core_radius: f64) -> f64 {
    debug_assert_eq!(centers.len(), radii.len());
    origin_distances(centers)
        .iter()
        .zip(radii)
        .fold(f64::INFINITY, |acc, (&d, &r)| {
            acc.min(d - (core_radius + r))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_layout_correspondence() {
        let layout = Layout {
            centers: vec![(1.0, 2.0), (-3.0, 0.5)],
            outer_radius: 4.5,
        };
        let x = layout.to_vector();
        assert_eq!(x, vec![1.0, 2.0, -3.0, 0.5, 4.5]);
        assert_eq!(Layout::from_vector(&x), layout);
    }

    #[test]
    fn test_index_pairs() {
        assert_eq!(index_pairs(1), vec![]);
        assert_eq!(index_pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_distances_and_clearances() {
        // Two unit disks on the x axis, touching at the origin.
        let centers = [(-1.0, 0.0), (1.0, 0.0)];
        let radii = [1.0, 1.0];

        assert_eq!(origin_distances(&centers), vec![1.0, 1.0]);
        assert_eq!(pairwise_distances(&centers), vec![2.0]);
        assert_eq!(enclosing_radius(&centers, &radii), 2.0);
        assert_eq!(min_pair_clearance(&centers, &radii), 0.0);

        // A core of radius 0.5 leaves no room: each disk reaches the origin.
        assert_eq!(min_core_clearance(&centers, &radii, 0.5), -0.5);
    }

    #[test]
    fn test_single_disk_edge_cases() {
        let centers = [(0.0, 3.0)];
        let radii = [1.0];
        assert_eq!(enclosing_radius(&centers, &radii), 4.0);
        assert_eq!(min_pair_clearance(&centers, &radii), f64::INFINITY);
        assert_eq!(min_core_clearance(&centers, &radii, 1.0), 1.0);
    }

    #[test]
    fn test_empty_layout() {
        assert_eq!(enclosing_radius(&[], &[]), 0.0);
        let layout = Layout::from_vector(&[5.0]);
        assert!(layout.is_empty());
        assert_eq!(layout.outer_radius, 5.0);
    }
}
