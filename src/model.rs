//! Structural model - the container the analysis pipeline consumes

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::elements::{Material, Member, Node, Section, Support};
use crate::error::{LsaError, LsaResult};
use crate::loads::NodeLoad;

/// Labels of the six node components [DX, DY, DZ, RX, RY, RZ]
pub const COMPONENT_LABELS: [&str; 6] = ["DX", "DY", "DZ", "RX", "RY", "RZ"];

/// Element family of the model, fixing the active DOFs per node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Pin-jointed bars in the XY plane
    PlaneTruss,
    /// Rigid-jointed beams in the XY plane
    #[default]
    PlaneFrame,
    /// Members in the XY plane loaded normal to it
    Grid,
    /// Pin-jointed bars in space
    SpaceTruss,
    /// Rigid-jointed beams in space
    SpaceFrame,
}

impl StructureKind {
    /// Active components of a node, as indices into [DX, DY, DZ, RX, RY, RZ]
    pub fn components(self) -> &'static [usize] {
        match self {
            Self::PlaneTruss => &[0, 1],
            Self::PlaneFrame => &[0, 1, 5],
            Self::Grid => &[2, 3, 4],
            Self::SpaceTruss => &[0, 1, 2],
            Self::SpaceFrame => &[0, 1, 2, 3, 4, 5],
        }
    }

    /// Number of DOFs per node
    pub fn dofs_per_node(self) -> usize {
        self.components().len()
    }

    /// Member DOFs as indices into the 12-component space-frame ordering
    pub fn member_dofs(self) -> Vec<usize> {
        let comps = self.components();
        comps.iter().copied().chain(comps.iter().map(|c| c + 6)).collect()
    }

    /// Whether the structure must lie in the XY plane
    pub fn is_planar(self) -> bool {
        matches!(self, Self::PlaneTruss | Self::PlaneFrame | Self::Grid)
    }

    /// Whether members carry axial force only
    pub fn is_truss(self) -> bool {
        matches!(self, Self::PlaneTruss | Self::SpaceTruss)
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::PlaneTruss => "Plane Truss",
            Self::PlaneFrame => "Plane Frame",
            Self::Grid => "Grid",
            Self::SpaceTruss => "Space Truss",
            Self::SpaceFrame => "Space Frame",
        }
    }
}

/// Node coordinates and member connectivity for an external renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wireframe {
    pub nodes: Vec<WireNode>,
    pub edges: Vec<WireEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    pub name: String,
    pub coords: [f64; 3],
}

/// A member drawn between two entries of [`Wireframe::nodes`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEdge {
    pub member: String,
    pub i: usize,
    pub j: usize,
}

/// The structural model
///
/// Nodes and members keep insertion order; node order defines the default
/// DOF numbering and therefore the half-bandwidth.
#[derive(Debug, Clone, Default)]
pub struct StructuralModel {
    /// Title printed in reports
    pub title: String,
    /// Element family
    pub kind: StructureKind,
    nodes: Vec<(String, Node)>,
    node_index: HashMap<String, usize>,
    materials: HashMap<String, Material>,
    sections: HashMap<String, Section>,
    members: Vec<(String, Member)>,
    member_index: HashMap<String, usize>,
    supports: HashMap<String, Support>,
    node_loads: HashMap<String, NodeLoad>,
    source: Option<PathBuf>,
}

impl StructuralModel {
    /// Create a new empty model
    pub fn new(kind: StructureKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Set the report title
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Record the file the model was loaded from
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node to the model
    pub fn add_node(&mut self, name: &str, node: Node) -> LsaResult<()> {
        if self.node_index.contains_key(name) {
            return Err(LsaError::DuplicateName(name.to_string()));
        }
        if !node.is_finite() {
            return Err(LsaError::InvalidProperty {
                owner: format!("node '{name}'"),
                reason: "coordinates must be finite".to_string(),
            });
        }
        self.node_index.insert(name.to_string(), self.nodes.len());
        self.nodes.push((name.to_string(), node));
        Ok(())
    }

    /// Add a material to the model
    pub fn add_material(&mut self, name: &str, material: Material) -> LsaResult<()> {
        if self.materials.contains_key(name) {
            return Err(LsaError::DuplicateName(name.to_string()));
        }
        if let Some(reason) = material.defect() {
            return Err(LsaError::InvalidProperty {
                owner: format!("material '{name}'"),
                reason,
            });
        }
        self.materials.insert(name.to_string(), material);
        Ok(())
    }

    /// Add a section to the model
    pub fn add_section(&mut self, name: &str, section: Section) -> LsaResult<()> {
        if self.sections.contains_key(name) {
            return Err(LsaError::DuplicateName(name.to_string()));
        }
        if let Some(reason) = section.defect() {
            return Err(LsaError::InvalidProperty {
                owner: format!("section '{name}'"),
                reason,
            });
        }
        self.sections.insert(name.to_string(), section);
        Ok(())
    }

    /// Add a member to the model
    pub fn add_member(&mut self, name: &str, member: Member) -> LsaResult<()> {
        for node in member.nodes() {
            if !self.node_index.contains_key(node) {
                return Err(LsaError::NodeNotFound {
                    node: node.to_string(),
                    referrer: format!("member '{name}'"),
                });
            }
        }
        if !self.materials.contains_key(&member.material) {
            return Err(LsaError::MaterialNotFound {
                material: member.material.clone(),
                member: name.to_string(),
            });
        }
        if !self.sections.contains_key(&member.section) {
            return Err(LsaError::SectionNotFound {
                section: member.section.clone(),
                member: name.to_string(),
            });
        }
        if self.member_index.contains_key(name) {
            return Err(LsaError::DuplicateName(name.to_string()));
        }

        self.member_index.insert(name.to_string(), self.members.len());
        self.members.push((name.to_string(), member));
        Ok(())
    }

    /// Add a support condition, replacing any earlier one at the node
    pub fn add_support(&mut self, node_name: &str, support: Support) -> LsaResult<()> {
        self.require_node(node_name, "support")?;
        self.supports.insert(node_name.to_string(), support);
        Ok(())
    }

    /// Add a node load; several loads on one node are summed
    pub fn add_node_load(&mut self, node_name: &str, load: NodeLoad) -> LsaResult<()> {
        self.require_node(node_name, "load")?;
        let entry = self.node_loads.entry(node_name.to_string()).or_default();
        *entry = entry.combined(&load);
        Ok(())
    }

    fn require_node(&self, node_name: &str, referrer: &str) -> LsaResult<()> {
        if self.node_index.contains_key(node_name) {
            Ok(())
        } else {
            Err(LsaError::NodeNotFound {
                node: node_name.to_string(),
                referrer: referrer.to_string(),
            })
        }
    }

    /// Check the model is complete enough to analyze
    pub fn validate(&self) -> LsaResult<()> {
        if self.nodes.is_empty() {
            return Err(LsaError::InvalidModel("model has no nodes".to_string()));
        }
        if self.members.is_empty() {
            return Err(LsaError::InvalidModel("model has no members".to_string()));
        }
        let mut connected = vec![false; self.nodes.len()];
        for (_, member) in &self.members {
            for node in member.nodes() {
                connected[self.node_index[node]] = true;
            }
        }
        if let Some(pos) = connected.iter().position(|&c| !c) {
            return Err(LsaError::InvalidModel(format!(
                "node '{}' is not connected to any member",
                self.nodes[pos].0
            )));
        }
        Ok(())
    }

    // ========================
    // Accessors
    // ========================

    /// Nodes in numbering order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Members in insertion order
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.node_index.get(name).map(|&i| &self.nodes[i].1)
    }

    /// Position of a node in insertion order
    pub fn node_position(&self, name: &str) -> Option<usize> {
        self.node_index.get(name).copied()
    }

    /// Name of the node at a position
    pub fn node_name(&self, position: usize) -> Option<&str> {
        self.nodes.get(position).map(|(name, _)| name.as_str())
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.member_index.get(name).map(|&i| &self.members[i].1)
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn support(&self, node_name: &str) -> Option<&Support> {
        self.supports.get(node_name)
    }

    /// Supports keyed by node name
    pub fn supports(&self) -> impl Iterator<Item = (&str, &Support)> {
        self.supports.iter().map(|(name, s)| (name.as_str(), s))
    }

    pub fn node_load(&self, node_name: &str) -> Option<&NodeLoad> {
        self.node_loads.get(node_name)
    }

    /// Loads keyed by node name
    pub fn node_loads(&self) -> impl Iterator<Item = (&str, &NodeLoad)> {
        self.node_loads.iter().map(|(name, l)| (name.as_str(), l))
    }

    /// File the model was loaded from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Geometry for an external 3-D renderer
    pub fn geometry(&self) -> Wireframe {
        let nodes = self
            .nodes
            .iter()
            .map(|(name, node)| WireNode {
                name: name.clone(),
                coords: node.coords(),
            })
            .collect();
        let edges = self
            .members
            .iter()
            .map(|(name, member)| WireEdge {
                member: name.clone(),
                i: self.node_index[&member.i_node],
                j: self.node_index[&member.j_node],
            })
            .collect();
        Wireframe { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_model() -> StructuralModel {
        let mut model = StructuralModel::new(StructureKind::PlaneFrame);
        model.add_material("Steel", Material::steel()).unwrap();
        model.add_section("S", Section::rectangular(0.3, 0.5)).unwrap();
        model.add_node("N1", Node::planar(0.0, 0.0)).unwrap();
        model.add_node("N2", Node::planar(10.0, 0.0)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "S")).unwrap();
        model
    }

    #[test]
    fn test_kind_components() {
        assert_eq!(StructureKind::PlaneFrame.member_dofs(), vec![0, 1, 5, 6, 7, 11]);
        assert_eq!(StructureKind::Grid.member_dofs(), vec![2, 3, 4, 8, 9, 10]);
        assert_eq!(StructureKind::PlaneTruss.dofs_per_node(), 2);
        assert_eq!(StructureKind::SpaceFrame.dofs_per_node(), 6);
    }

    #[test]
    fn test_dangling_references_rejected() {
        let mut model = two_node_model();
        let err = model
            .add_member("M2", Member::new("N1", "N9", "Steel", "S"))
            .unwrap_err();
        assert!(matches!(err, LsaError::NodeNotFound { ref node, .. } if node == "N9"));

        let err = model
            .add_member("M3", Member::new("N1", "N2", "Wood", "S"))
            .unwrap_err();
        assert!(matches!(err, LsaError::MaterialNotFound { .. }));

        assert!(matches!(
            model.add_node("N1", Node::default()),
            Err(LsaError::DuplicateName(_))
        ));
        assert!(model.add_support("N7", Support::fixed()).is_err());
    }

    #[test]
    fn test_loads_accumulate() {
        let mut model = two_node_model();
        model.add_node_load("N2", NodeLoad::fy(-5.0)).unwrap();
        model.add_node_load("N2", NodeLoad::fy(-5.0)).unwrap();
        assert_eq!(model.node_load("N2").unwrap().fy, -10.0);
    }

    #[test]
    fn test_validate_unconnected_node() {
        let mut model = two_node_model();
        assert!(model.validate().is_ok());
        model.add_node("N3", Node::planar(20.0, 0.0)).unwrap();
        assert!(matches!(model.validate(), Err(LsaError::InvalidModel(_))));
    }

    #[test]
    fn test_geometry() {
        let wire = two_node_model().geometry();
        assert_eq!(wire.nodes.len(), 2);
        assert_eq!(wire.edges[0].i, 0);
        assert_eq!(wire.edges[0].j, 1);
        assert_eq!(wire.nodes[1].coords, [10.0, 0.0, 0.0]);
    }
}
