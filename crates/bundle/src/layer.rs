//! Frozen bundle layers.

use crate::geometry::Layout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A frozen, previously solved ring of wires plus its shield/sleeve annulus.
///
/// Once created a layer never changes: its centers and effective radii are
/// the accepted solution's, and its core radius is the exclusion boundary
/// for the next ring.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Layer {
    layout: Layout,
    eff_radii: Vec<f64>,
    thickness: f64,
    label: Option<String>,
}

impl Layer {
    pub(crate) fn new(
        layout: Layout,
        eff_radii: Vec<f64>,
        thickness: f64,
        label: Option<String>,
    ) -> Self {
        Self {
            layout,
            eff_radii,
            thickness,
            label,
        }
    }

    /// The frozen arrangement.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Margin-inflated radii of the frozen wires, in wire-set order.
    pub fn effective_radii(&self) -> &[f64] {
        &self.eff_radii
    }

    /// Annular shield/sleeve thickness added outside the arrangement.
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Caller-supplied label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Exclusion radius for the next ring: own outer radius plus the
    /// annulus.
    pub fn core_radius(&self) -> f64 {
        self.layout.outer_radius + self.thickness
    }

    /// Number of wires frozen in this layer.
    pub fn wire_count(&self) -> usize {
        self.layout.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_radius_adds_the_annulus() {
        let layout = Layout {
            centers: vec![(0.0, 0.0)],
            outer_radius: 2.0,
        };
        let layer = Layer::new(layout, vec![2.0], 0.75, Some("shield".to_string()));

        assert_eq!(layer.core_radius(), 2.75);
        assert_eq!(layer.thickness(), 0.75);
        assert_eq!(layer.label(), Some("shield"));
        assert_eq!(layer.wire_count(), 1);
    }
}
