//! Support constraints on the banded system

use std::collections::BTreeMap;

use crate::dofs::DofMap;
use crate::math::{BandMatrix, Vec};
use crate::model::StructuralModel;

/// Constrained global DOFs and their prescribed displacements
///
/// Built once per run from the model's supports and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryConditions {
    prescribed: BTreeMap<usize, f64>,
}

impl BoundaryConditions {
    /// Collect restrained active components of every supported node
    pub fn from_supports(model: &StructuralModel, dof_map: &DofMap) -> Self {
        let mut prescribed = BTreeMap::new();
        for (node, support) in model.supports() {
            let Some(position) = model.node_position(node) else {
                continue;
            };
            for &component in model.kind.components() {
                if let (Some(value), Some(dof)) = (
                    support.prescribed(component),
                    dof_map.dof_of(position, component),
                ) {
                    prescribed.insert(dof, value);
                }
            }
        }
        Self { prescribed }
    }

    pub fn from_map(prescribed: BTreeMap<usize, f64>) -> Self {
        Self { prescribed }
    }

    pub fn len(&self) -> usize {
        self.prescribed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prescribed.is_empty()
    }

    pub fn is_constrained(&self, dof: usize) -> bool {
        self.prescribed.contains_key(&dof)
    }

    /// Constrained DOFs in ascending order with their values
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.prescribed.iter().map(|(&dof, &value)| (dof, value))
    }

    /// Enforce the constraints in place
    ///
    /// For each constrained DOF k with value v: every row coupled to k takes
    /// `K[i][k] * v` onto its right-hand side, row and column k are zeroed
    /// inside the band, `K[k][k] = 1` and `f[k] = v`. The band shape does not
    /// change and a second application is a no-op.
    pub fn apply(&self, band: &mut BandMatrix, loads: &mut Vec) {
        let n = band.size();
        let b = band.half_bandwidth();

        for (&k, &value) in &self.prescribed {
            if k >= n {
                continue;
            }
            let lo = k.saturating_sub(b);
            let hi = (k + b).min(n - 1);
            for i in lo..=hi {
                if i == k {
                    continue;
                }
                if let Some(entry) = band.entry_mut(i, k) {
                    if value != 0.0 && !self.is_constrained(i) {
                        loads[i] -= *entry * value;
                    }
                    *entry = 0.0;
                }
            }
            if let Some(diagonal) = band.entry_mut(k, k) {
                *diagonal = 1.0;
            }
            loads[k] = value;
        }
    }
}
