//! Wire and wire set definitions.

use cablepack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single circular wire.
///
/// Radii are in whatever consistent linear unit the caller works in; the
/// engine never converts units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wire {
    radius: f64,
    label: Option<String>,
}

impl Wire {
    /// Creates a wire from its radius.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            label: None,
        }
    }

    /// Creates a wire from its diameter.
    pub fn from_diameter(diameter: f64) -> Self {
        Self::new(diameter / 2.0)
    }

    /// Attaches a catalog label (e.g. a gauge name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the nominal radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the catalog label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the margin-inflated radius `r * (1 + margin)`.
    pub fn effective_radius(&self, margin: f64) -> f64 {
        self.radius * (1.0 + margin)
    }

    /// Validates the radius; `index` is the wire's position in its set.
    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidRadius {
                index,
                value: self.radius,
            });
        }
        Ok(())
    }
}

/// An ordered set of wires submitted to one packing solve.
///
/// Order is irrelevant to the math but fixed for indexing: solutions and
/// layers report centers in the same order wires were added.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireSet {
    wires: Vec<Wire>,
}

impl WireSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from plain radii.
    pub fn from_radii(radii: &[f64]) -> Self {
        Self {
            wires: radii.iter().map(|&r| Wire::new(r)).collect(),
        }
    }

    /// Appends one wire.
    pub fn add(&mut self, wire: Wire) {
        self.wires.push(wire);
    }

    /// Appends `count` wires of the same radius.
    pub fn add_group(&mut self, radius: f64, count: usize) {
        self.wires
            .extend(std::iter::repeat_with(|| Wire::new(radius)).take(count));
    }

    /// Returns the wires in insertion order.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Iterates over the wires.
    pub fn iter(&self) -> std::slice::Iter<'_, Wire> {
        self.wires.iter()
    }

    /// Number of wires.
    pub fn len(&self) -> usize {
        self.wires.len()
    }

    /// Returns true if the set holds no wires.
    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// Removes all wires.
    pub fn clear(&mut self) {
        self.wires.clear();
    }

    /// Validates every wire radius.
    pub fn validate(&self) -> Result<()> {
        for (index, wire) in self.wires.iter().enumerate() {
            wire.validate(index)?;
        }
        Ok(())
    }

    /// Computes the margin-inflated radius of every wire.
    ///
    /// Rejects negative or non-finite margins and any invalid radius; the
    /// engine validates rather than clamping.
    pub fn effective_radii(&self, margin: f64) -> Result<Vec<f64>> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(Error::InvalidMargin(margin));
        }
        self.validate()?;
        Ok(self
            .wires
            .iter()
            .map(|w| w.effective_radius(margin))
            .collect())
    }
}
