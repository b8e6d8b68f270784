//! Global stiffness assembly into band storage

use log::warn;

use crate::dofs::DofMap;
use crate::error::{LsaError, LsaResult};
use crate::formulation::ElementStiffness;
use crate::math::{BandMatrix, Vec};
use crate::model::{StructuralModel, COMPONENT_LABELS};

/// Assembled stiffness and load vector, indexed by global DOF
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    pub stiffness: BandMatrix,
    pub loads: Vec,
}

/// Scatter-add element matrices into a band of the map's half-bandwidth
///
/// Only the lower band is written. A coupling that falls outside the band
/// is reported rather than dropped.
pub fn assemble_stiffness(dof_map: &DofMap, elements: &[ElementStiffness]) -> LsaResult<BandMatrix> {
    let mut band = BandMatrix::zeros(dof_map.total_dofs(), dof_map.half_bandwidth());

    for element in elements {
        for (r, &row) in element.dofs.iter().enumerate() {
            for (c, &col) in element.dofs.iter().enumerate() {
                if row < col {
                    continue;
                }
                let value = element.global[(r, c)];
                match band.entry_mut(row, col) {
                    Some(entry) => *entry += value,
                    None => {
                        return Err(LsaError::BandwidthExceeded {
                            member: element.member.clone(),
                            row,
                            col,
                            half_bandwidth: dof_map.half_bandwidth(),
                        })
                    }
                }
            }
        }
    }

    Ok(band)
}

/// Load vector from node loads on active components
///
/// Non-zero components the structure kind does not carry are ignored with a
/// warning.
pub fn assemble_loads(model: &StructuralModel, dof_map: &DofMap) -> Vec {
    let mut loads = Vec::zeros(dof_map.total_dofs());

    for (node, load) in model.node_loads() {
        let Some(position) = model.node_position(node) else {
            continue;
        };
        for (component, &value) in load.as_array().iter().enumerate() {
            if value == 0.0 {
                continue;
            }
            match dof_map.dof_of(position, component) {
                Some(dof) => loads[dof] += value,
                None => warn!(
                    "Ignoring {} load of {} at node '{}': not a {} DOF",
                    COMPONENT_LABELS[component],
                    value,
                    node,
                    model.kind.name()
                ),
            }
        }
    }

    loads
}

/// Assemble the full global system
pub fn assemble(
    model: &StructuralModel,
    dof_map: &DofMap,
    elements: &[ElementStiffness],
) -> LsaResult<GlobalSystem> {
    let stiffness = assemble_stiffness(dof_map, elements)?;
    let loads = assemble_loads(model, dof_map);
    Ok(GlobalSystem { stiffness, loads })
}
