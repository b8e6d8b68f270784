//! Member end forces and support reactions from the displacement solution

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::boundary::BoundaryConditions;
use crate::dofs::DofMap;
use crate::formulation::ElementStiffness;
use crate::math::{BandMatrix, Vec};
use crate::model::{StructuralModel, StructureKind};
use crate::results::{MemberForceRecord, MemberForces, NodeDisplacement, NodeRecord, Reactions};

/// End forces of one member: `k_local * (T * d)`
pub fn recover_member(
    kind: StructureKind,
    element: &ElementStiffness,
    displacements: &Vec,
) -> MemberForceRecord {
    let d_global = Vec::from_iterator(
        element.dofs.len(),
        element.dofs.iter().map(|&dof| displacements[dof]),
    );
    let d_local = &element.transform * d_global;
    let f_local = &element.local * d_local;

    let mut full = [0.0; 12];
    for (slot, &component) in kind.member_dofs().iter().enumerate() {
        full[component] = f_local[slot];
    }

    MemberForceRecord {
        member: element.member.clone(),
        end_forces: f_local.iter().copied().collect(),
        i_end: MemberForces::from_i_node_forces(&full),
        j_end: MemberForces::from_j_node_forces(&full),
    }
}

/// End forces of every member, in formulation order
pub fn member_forces(
    kind: StructureKind,
    elements: &[ElementStiffness],
    displacements: &Vec,
) -> std::vec::Vec<MemberForceRecord> {
    #[cfg(feature = "parallel")]
    {
        elements
            .par_iter()
            .map(|element| recover_member(kind, element, displacements))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        elements
            .iter()
            .map(|element| recover_member(kind, element, displacements))
            .collect()
    }
}

/// Nodal displacements in the full six-component layout
pub fn node_displacements(
    model: &StructuralModel,
    dof_map: &DofMap,
    displacements: &Vec,
) -> std::vec::Vec<NodeRecord<NodeDisplacement>> {
    model
        .nodes()
        .enumerate()
        .map(|(position, (name, _))| {
            let mut values = [0.0; 6];
            for &component in model.kind.components() {
                if let Some(dof) = dof_map.dof_of(position, component) {
                    values[component] = displacements[dof];
                }
            }
            NodeRecord {
                node: name.to_string(),
                values: NodeDisplacement::from_array(values),
            }
        })
        .collect()
}

/// Residual `K d - F` of the unreduced system, non-zero only at supports
pub fn reaction_vector(
    unreduced: &BandMatrix,
    loads: &Vec,
    displacements: &Vec,
    bcs: &BoundaryConditions,
) -> Vec {
    let residual = unreduced.mul_vec(displacements) - loads;
    Vec::from_fn(residual.len(), |dof, _| {
        if bcs.is_constrained(dof) {
            residual[dof]
        } else {
            0.0
        }
    })
}

/// Reactions at supported nodes, in model node order
pub fn node_reactions(
    model: &StructuralModel,
    dof_map: &DofMap,
    reactions: &Vec,
    bcs: &BoundaryConditions,
) -> std::vec::Vec<NodeRecord<Reactions>> {
    model
        .nodes()
        .enumerate()
        .filter(|(position, _)| {
            dof_map
                .node_dofs(*position)
                .any(|dof| bcs.is_constrained(dof))
        })
        .map(|(position, (name, _))| {
            let mut values = [0.0; 6];
            for &component in model.kind.components() {
                if let Some(dof) = dof_map.dof_of(position, component) {
                    values[component] = reactions[dof];
                }
            }
            NodeRecord {
                node: name.to_string(),
                values: Reactions::from_array(values),
            }
        })
        .collect()
}

/// Translational equilibrium of applied loads and reactions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticsCheck {
    /// Sum of loads plus reactions per global axis
    pub residual: [f64; 3],
    /// Largest load or reaction magnitude, used as the scale
    pub scale: f64,
}

impl StaticsCheck {
    pub fn compute(dof_map: &DofMap, loads: &Vec, reactions: &Vec) -> Self {
        let mut residual = [0.0; 3];
        let mut scale: f64 = 0.0;
        for dof in 0..dof_map.total_dofs() {
            let (_, component) = dof_map.dof_owner(dof);
            if component < 3 {
                residual[component] += loads[dof] + reactions[dof];
                scale = scale.max(loads[dof].abs()).max(reactions[dof].abs());
            }
        }
        Self { residual, scale }
    }

    /// Largest residual relative to the scale
    pub fn relative_error(&self) -> f64 {
        let worst = self.residual.iter().fold(0.0_f64, |m, r| m.max(r.abs()));
        if self.scale > 0.0 {
            worst / self.scale
        } else {
            worst
        }
    }

    pub fn passes(&self, tolerance: f64) -> bool {
        self.relative_error() <= tolerance
    }
}
