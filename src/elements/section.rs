//! Cross-section constants

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Geometric constants of a member cross-section, in local member axes
///
/// Which constants a member reads depends on the structure kind: trusses use
/// `a` alone, plane frames add `iz`, grids use `iy` and `j` and space frames
/// use all four.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Area, m²
    pub a: f64,
    /// Second moment of area about local y, m⁴
    #[serde(default)]
    pub iy: f64,
    /// Second moment of area about local z, m⁴
    #[serde(default)]
    pub iz: f64,
    /// St Venant torsion constant, m⁴
    #[serde(default)]
    pub j: f64,
}

/// Torsion constant of a solid rectangle with sides `long >= short`
fn rectangle_torsion(long: f64, short: f64) -> f64 {
    long * short.powi(3) * (1.0 / 3.0 - 0.21 * short / long)
}

impl Section {
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self { a, iy, iz, j }
    }

    /// Bar section for truss members
    pub fn axial(a: f64) -> Self {
        Self {
            a,
            ..Self::new(0.0, 0.0, 0.0, 0.0)
        }
    }

    /// Solid rectangle; `width` runs along local y and `depth` along local z,
/// so `iz` is the weak axis when `width < depth`
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let j = rectangle_torsion(width.max(depth), width.min(depth));
        Self {
            a: width * depth,
            iy: width * depth.powi(3) / 12.0,
            iz: depth * width.powi(3) / 12.0,
            j,
        }
    }

    /// Solid round bar
    pub fn circular(diameter: f64) -> Self {
        let i = PI * diameter.powi(4) / 64.0;
        Self {
            a: PI * diameter * diameter / 4.0,
            iy: i,
            iz: i,
            j: 2.0 * i,
        }
    }

    /// Reason this section cannot produce a member stiffness, if any
    pub fn defect(&self) -> Option<String> {
        if !self.a.is_finite() || self.a <= 0.0 {
            return Some(format!("area must be positive (got {})", self.a));
        }
        [("iy", self.iy), ("iz", self.iz), ("j", self.j)]
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
            .map(|(label, value)| format!("{label} must be non-negative (got {value})"))
    }
}
