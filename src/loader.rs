//! Model document loading
//!
//! A model is a JSON object with `title`, `structure`, `nodes`, `materials`,
//! `sections`, `members`, `supports` and `loads`. Entities are added to the
//! model in dependency order, so a dangling reference is reported with the
//! name of the entity that made it, before any analysis starts.

use std::path::Path;

use serde::Deserialize;

use crate::elements::{Material, Member, MemberReleases, Node, Section, Support};
use crate::error::{LsaError, LsaResult};
use crate::loads::NodeLoad;
use crate::model::{StructuralModel, StructureKind};

pub use crate::report::results_path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    structure: StructureKind,
    nodes: Vec<NodeData>,
    materials: Vec<MaterialData>,
    sections: Vec<SectionData>,
    members: Vec<MemberData>,
    #[serde(default)]
    supports: Vec<SupportData>,
    #[serde(default)]
    loads: Vec<NodeLoadData>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeData {
    name: String,
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaterialData {
    name: String,
    e: f64,
    /// Derived from `e` and `nu` when omitted
    #[serde(default)]
    g: Option<f64>,
    #[serde(default = "default_nu")]
    nu: f64,
    #[serde(default)]
    rho: f64,
}

fn default_nu() -> f64 {
    0.3
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ShapeData {
    Rectangular { width: f64, depth: f64 },
    Circular { diameter: f64 },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SectionData {
    name: String,
    #[serde(default)]
    shape: Option<ShapeData>,
    #[serde(default)]
    a: Option<f64>,
    #[serde(default)]
    iy: f64,
    #[serde(default)]
    iz: f64,
    #[serde(default)]
    j: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MemberData {
    name: String,
    i_node: String,
    j_node: String,
    material: String,
    section: String,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    releases: MemberReleases,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnforcedData {
    dx: Option<f64>,
    dy: Option<f64>,
    dz: Option<f64>,
    rx: Option<f64>,
    ry: Option<f64>,
    rz: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SupportData {
    node: String,
    #[serde(default)]
    dx: bool,
    #[serde(default)]
    dy: bool,
    #[serde(default)]
    dz: bool,
    #[serde(default)]
    rx: bool,
    #[serde(default)]
    ry: bool,
    #[serde(default)]
    rz: bool,
    /// Prescribed displacements; each also restrains its component
    #[serde(default)]
    enforced: EnforcedData,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeLoadData {
    node: String,
    #[serde(default)]
    fx: f64,
    #[serde(default)]
    fy: f64,
    #[serde(default)]
    fz: f64,
    #[serde(default)]
    mx: f64,
    #[serde(default)]
    my: f64,
    #[serde(default)]
    mz: f64,
}

impl SectionData {
    fn to_section(&self) -> LsaResult<Section> {
        let section = match (&self.shape, self.a) {
            (Some(ShapeData::Rectangular { width, depth }), _) => {
                Section::rectangular(*width, *depth)
            }
            (Some(ShapeData::Circular { diameter }), _) => Section::circular(*diameter),
            (None, Some(a)) => Section::new(a, self.iy, self.iz, self.j),
            (None, None) => {
                return Err(LsaError::InvalidProperty {
                    owner: format!("section '{}'", self.name),
                    reason: "either 'a' or 'shape' is required".to_string(),
                })
            }
        };
        Ok(section)
    }
}

impl SupportData {
    fn to_support(&self) -> Support {
        let mut support =
            Support::with_restraints(self.dx, self.dy, self.dz, self.rx, self.ry, self.rz);
        let e = &self.enforced;
        for (component, value) in [e.dx, e.dy, e.dz, e.rx, e.ry, e.rz].into_iter().enumerate() {
            if let Some(value) = value {
                support = support.with_enforced(component, value);
            }
        }
        support
    }
}

fn build(data: ModelData) -> LsaResult<StructuralModel> {
    let mut model = StructuralModel::new(data.structure).with_title(&data.title);

    for mat in data.materials {
        let material = match mat.g {
            Some(g) => Material::new(mat.e, g, mat.nu, mat.rho),
            None => Material::isotropic(mat.e, mat.nu, mat.rho),
        };
        model.add_material(&mat.name, material)?;
    }

    for sec in &data.sections {
        model.add_section(&sec.name, sec.to_section()?)?;
    }

    for node in data.nodes {
        model.add_node(&node.name, Node::new(node.x, node.y, node.z))?;
    }

    for member in data.members {
        let m = Member::new(&member.i_node, &member.j_node, &member.material, &member.section)
            .with_rotation(member.rotation)
            .with_releases(member.releases);
        model.add_member(&member.name, m)?;
    }

    for sup in &data.supports {
        model.add_support(&sup.node, sup.to_support())?;
    }

    for load in data.loads {
        model.add_node_load(
            &load.node,
            NodeLoad::new(load.fx, load.fy, load.fz, load.mx, load.my, load.mz),
        )?;
    }

    Ok(model)
}

/// Parse a model document held in memory
pub fn load_model_str(text: &str) -> LsaResult<StructuralModel> {
    let data: ModelData = serde_json::from_str(text)?;
    build(data)
}

/// Read a model document and remember where it came from
pub fn load_model(path: &Path) -> LsaResult<StructuralModel> {
    let text = std::fs::read_to_string(path)?;
    let model = load_model_str(&text)?.with_source(path);
    log::info!(
        "Loaded model '{}' from {}: {} nodes, {} members",
        model.title,
        path.display(),
        model.node_count(),
        model.member_count()
    );
    Ok(model)
}
