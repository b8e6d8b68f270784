//! Element stiffness formulation
//!
//! Every member gets a local stiffness matrix sized by the structure kind,
//! a matching transformation, and the global matrix `T^T k T`. The result is
//! computed once per run and then only read by assembly and force recovery.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::dofs::DofMap;
use crate::elements::Member;
use crate::error::{LsaError, LsaResult};
use crate::math::{
    apply_releases, member_local_stiffness, plane_rotation, select_dofs, space_rotation,
    transformation_from_rotation, Mat, MIN_LENGTH,
};
use crate::model::{StructuralModel, StructureKind};

/// Stiffness of one member, fixed after formulation
#[derive(Debug, Clone)]
pub struct ElementStiffness {
    pub member: String,
    pub length: f64,
    /// Local stiffness in the kind's member DOF order, releases applied
    pub local: Mat,
    /// Global-to-local transformation for the same DOFs
    pub transform: Mat,
    /// `T^T k T`
    pub global: Mat,
    /// Global DOF index of each row of `global`
    pub dofs: Vec<usize>,
}

/// Section properties that drive each kind's stiffness, as (iy, iz, j)
fn bending_properties(kind: StructureKind, iy: f64, iz: f64, j: f64) -> (f64, f64, f64) {
    match kind {
        StructureKind::PlaneTruss | StructureKind::SpaceTruss => (0.0, 0.0, 0.0),
        StructureKind::PlaneFrame => (0.0, iz, 0.0),
        StructureKind::Grid => (iy, 0.0, j),
        StructureKind::SpaceFrame => (iy, iz, j),
    }
}

fn missing_bending(kind: StructureKind, iy: f64, iz: f64) -> Option<&'static str> {
    match kind {
        StructureKind::PlaneFrame if iz <= 0.0 => Some("iz must be positive for plane frames"),
        StructureKind::Grid if iy <= 0.0 => Some("iy must be positive for grids"),
        StructureKind::SpaceFrame if iy <= 0.0 || iz <= 0.0 => {
            Some("iy and iz must be positive for space frames")
        }
        _ => None,
    }
}

/// Formulate the stiffness of a single member
pub fn member_stiffness(
    model: &StructuralModel,
    dof_map: &DofMap,
    name: &str,
    member: &Member,
) -> LsaResult<ElementStiffness> {
    let kind = model.kind;
    let referrer = || format!("member '{name}'");

    let node_i = model.node(&member.i_node).ok_or_else(|| LsaError::NodeNotFound {
        node: member.i_node.clone(),
        referrer: referrer(),
    })?;
    let node_j = model.node(&member.j_node).ok_or_else(|| LsaError::NodeNotFound {
        node: member.j_node.clone(),
        referrer: referrer(),
    })?;
    let material = model
        .material(&member.material)
        .ok_or_else(|| LsaError::MaterialNotFound {
            material: member.material.clone(),
            member: name.to_string(),
        })?;
    let section = model
        .section(&member.section)
        .ok_or_else(|| LsaError::SectionNotFound {
            section: member.section.clone(),
            member: name.to_string(),
        })?;

    let length = node_i.distance_to(node_j);
    if length < MIN_LENGTH {
        return Err(LsaError::ZeroLengthMember {
            member: name.to_string(),
            i_node: member.i_node.clone(),
            j_node: member.j_node.clone(),
        });
    }
    if kind.is_planar() && (node_i.z - node_j.z).abs() > MIN_LENGTH {
        return Err(LsaError::NonPlanarMember(name.to_string()));
    }
    if let Some(reason) = missing_bending(kind, section.iy, section.iz) {
        return Err(LsaError::InvalidProperty {
            owner: format!("section '{}' of member '{name}'", member.section),
            reason: reason.to_string(),
        });
    }

    let (iy, iz, j) = bending_properties(kind, section.iy, section.iz, section.j);
    let mut k = member_local_stiffness(material.e, material.g, section.a, iy, iz, j, length);

    let components = kind.member_dofs();
    if member.releases.any() && !kind.is_truss() {
        let mut releases = member.releases.as_array();
        for (dof, released) in releases.iter_mut().enumerate() {
            *released &= components.contains(&dof);
        }
        k = apply_releases(&k, &releases);
    }

    let rotation = if kind.is_planar() {
        plane_rotation(&node_i.coords(), &node_j.coords())
    } else {
        space_rotation(&node_i.coords(), &node_j.coords(), member.rotation)
    }
    .ok_or_else(|| LsaError::ZeroLengthMember {
        member: name.to_string(),
        i_node: member.i_node.clone(),
        j_node: member.j_node.clone(),
    })?;

    let local = select_dofs(&k, &components);
    let transform = select_dofs(&transformation_from_rotation(&rotation), &components);
    let global = transform.transpose() * &local * &transform;

    Ok(ElementStiffness {
        member: name.to_string(),
        length,
        local,
        transform,
        global,
        dofs: dof_map.member_dofs(model, member),
    })
}

/// Formulate every member in model order
pub fn formulate(model: &StructuralModel, dof_map: &DofMap) -> LsaResult<Vec<ElementStiffness>> {
    let members: Vec<(&str, &Member)> = model.members().collect();

    #[cfg(feature = "parallel")]
    let elements = members
        .par_iter()
        .map(|&(name, member)| member_stiffness(model, dof_map, name, member))
        .collect::<LsaResult<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let elements = members
        .iter()
        .map(|&(name, member)| member_stiffness(model, dof_map, name, member))
        .collect::<LsaResult<Vec<_>>>()?;

    log::debug!("Formulated {} member stiffness matrices", elements.len());
    Ok(elements)
}
