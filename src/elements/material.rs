//! Elastic constants of member materials

use serde::{Deserialize, Serialize};

/// Isotropic linear elastic material
///
/// Only `e` and `g` enter member stiffness: `e` for axial and bending terms,
/// `g` for the torsion of grid and space frame members. `nu` and `rho` are
/// carried for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Young's modulus, Pa
    pub e: f64,
    /// Shear modulus, Pa
    pub g: f64,
    pub nu: f64,
    /// Mass density, kg/m³
    pub rho: f64,
}

impl Material {
    pub fn new(e: f64, g: f64, nu: f64, rho: f64) -> Self {
        Self { e, g, nu, rho }
    }

    /// Material whose shear modulus follows from `e` and Poisson's ratio
    pub fn isotropic(e: f64, nu: f64, rho: f64) -> Self {
        Self::new(e, e / (2.0 * (1.0 + nu)), nu, rho)
    }

    /// Mild structural steel
    pub fn steel() -> Self {
        Self::new(200e9, 77e9, 0.3, 7850.0)
    }

    /// Reason this material cannot produce a member stiffness, if any
    pub fn defect(&self) -> Option<String> {
        match (self.e, self.g) {
            (e, _) if !e.is_finite() || e <= 0.0 => {
                Some(format!("modulus of elasticity must be positive (got {e})"))
            }
            (_, g) if !g.is_finite() || g < 0.0 => {
                Some(format!("shear modulus must be non-negative (got {g})"))
            }
            _ => None,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}
