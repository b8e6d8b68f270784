//! Result types for a static analysis run

use std::path::PathBuf;

use chrono::{DateTime, Local};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::math::SolverPath;
use crate::model::StructureKind;

/// Translations (m) and rotations (rad) of a node in global axes
///
/// Components the structure kind does not carry stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl NodeDisplacement {
    pub fn from_array([dx, dy, dz, rx, ry, rz]: [f64; 6]) -> Self {
        Self { dx, dy, dz, rx, ry, rz }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Length of the translation, rotations ignored
    pub fn translation_magnitude(&self) -> f64 {
        Vector3::new(self.dx, self.dy, self.dz).norm()
    }
}

/// Forces (N) and moments (N·m) a support exerts on its node, in global axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl Reactions {
    pub fn from_array([fx, fy, fz, mx, my, mz]: [f64; 6]) -> Self {
        Self { fx, fy, fz, mx, my, mz }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    /// Length of the force resultant, moments ignored
    pub fn force_magnitude(&self) -> f64 {
        Vector3::new(self.fx, self.fy, self.fz).norm()
    }
}

/// Stress resultants at one member end, in local axes
///
/// `axial` is positive in tension at both ends, and `torsion` likewise reads
/// the same at both ends. Shears keep the sign of the i-end action and are
/// reversed at the j end. Moments are the end actions as computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberForces {
    pub axial: f64,
    pub shear_y: f64,
    pub shear_z: f64,
    pub torsion: f64,
    pub moment_y: f64,
    pub moment_z: f64,
}

impl MemberForces {
    /// Resultants from the six end actions `k d` at one end; `outward` is -1
    /// at the i end, where the local x axis points into the member
    fn at_end(actions: &[f64], outward: f64) -> Self {
        Self {
            axial: outward * actions[0],
            shear_y: -outward * actions[1],
            shear_z: -outward * actions[2],
            torsion: outward * actions[3],
            moment_y: actions[4],
            moment_z: actions[5],
        }
    }

    /// i-end resultants from the full 12-component end actions
    pub fn from_i_node_forces(forces: &[f64; 12]) -> Self {
        Self::at_end(&forces[..6], -1.0)
    }

    /// j-end resultants from the full 12-component end actions
    pub fn from_j_node_forces(forces: &[f64; 12]) -> Self {
        Self::at_end(&forces[6..], 1.0)
    }

    /// Largest bending moment magnitude
    pub fn max_moment(&self) -> f64 {
        self.moment_y.abs().max(self.moment_z.abs())
    }
}

/// A per-node result tagged with its node name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord<T> {
    pub node: String,
    #[serde(flatten)]
    pub values: T,
}

/// Local end forces of one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberForceRecord {
    pub member: String,
    /// `k_local * d_local` in the structure kind's member DOF order
    pub end_forces: Vec<f64>,
    pub i_end: MemberForces,
    pub j_end: MemberForces,
}

/// Extremes and sizes reported at the head of the results
///
/// A name is empty when every candidate value was zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub max_displacement: f64,
    pub max_disp_node: String,
    pub max_reaction: f64,
    pub max_reaction_node: String,
    /// Largest axial force magnitude at either member end
    pub max_axial: f64,
    pub max_axial_member: String,
    pub max_moment: f64,
    pub max_moment_member: String,
    pub num_nodes: usize,
    pub num_members: usize,
    pub total_dofs: usize,
    /// Unrestrained DOFs
    pub free_dofs: usize,
    /// Half-bandwidth of the assembled system
    pub half_bandwidth: usize,
}

/// First name carrying the largest positive value, `(0.0, "")` when none does
fn largest<'a>(values: impl Iterator<Item = (&'a str, f64)>) -> (f64, String) {
    values.fold((0.0, String::new()), |best, (name, value)| {
        if value > best.0 {
            (value, name.to_string())
        } else {
            best
        }
    })
}

impl AnalysisSummary {
    /// Extremes over the recovered results
    pub fn from_results(
        displacements: &[NodeRecord<NodeDisplacement>],
        reactions: &[NodeRecord<Reactions>],
        member_forces: &[MemberForceRecord],
    ) -> Self {
        let (max_displacement, max_disp_node) = largest(
            displacements
                .iter()
                .map(|r| (r.node.as_str(), r.values.translation_magnitude())),
        );
        let (max_reaction, max_reaction_node) = largest(
            reactions
                .iter()
                .map(|r| (r.node.as_str(), r.values.force_magnitude())),
        );

        let ends = || {
            member_forces
                .iter()
                .flat_map(|r| [(r.member.as_str(), r.i_end), (r.member.as_str(), r.j_end)])
        };
        let (max_axial, max_axial_member) = largest(ends().map(|(m, f)| (m, f.axial.abs())));
        let (max_moment, max_moment_member) = largest(ends().map(|(m, f)| (m, f.max_moment())));

        Self {
            max_displacement,
            max_disp_node,
            max_reaction,
            max_reaction_node,
            max_axial,
            max_axial_member,
            max_moment,
            max_moment_member,
            ..Self::default()
        }
    }
}

/// Everything a completed static linear run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub title: String,
    pub kind: StructureKind,
    /// Display name of the analysis type
    pub analysis: String,
    pub completed_at: DateTime<Local>,
    pub solver_path: SolverPath,
    /// Relative deviation between banded and reference solves, if checked
    pub solver_deviation: Option<f64>,
    /// Solve time in milliseconds
    pub solve_millis: u128,
    /// Every node, in model order
    pub displacements: Vec<NodeRecord<NodeDisplacement>>,
    /// Supported nodes in model order
    pub reactions: Vec<NodeRecord<Reactions>>,
    pub member_forces: Vec<MemberForceRecord>,
    pub summary: AnalysisSummary,
    /// Model file the run read, if any
    pub source: Option<PathBuf>,
}

impl AnalysisResults {
    pub fn displacement(&self, node: &str) -> Option<&NodeDisplacement> {
        self.displacements
            .iter()
            .find(|r| r.node == node)
            .map(|r| &r.values)
    }

    pub fn reaction(&self, node: &str) -> Option<&Reactions> {
        self.reactions.iter().find(|r| r.node == node).map(|r| &r.values)
    }

    pub fn member_forces(&self, member: &str) -> Option<&MemberForceRecord> {
        self.member_forces.iter().find(|r| r.member == member)
    }

    /// Pretty-printed JSON export
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_force_sign_convention() {
        // Bar in tension: pulled towards -x at i, +x at j
        let mut forces = [0.0; 12];
        forces[0] = -5.0;
        forces[6] = 5.0;
        forces[5] = 2.0;
        forces[11] = -3.0;
        let i_end = MemberForces::from_i_node_forces(&forces);
        let j_end = MemberForces::from_j_node_forces(&forces);
        assert_eq!(i_end.axial, 5.0);
        assert_eq!(j_end.axial, 5.0);
        assert_eq!(i_end.max_moment(), 2.0);
        assert_eq!(j_end.max_moment(), 3.0);
    }

    #[test]
    fn test_summary_extremes() {
        let displacements = vec![
            NodeRecord {
                node: "N1".to_string(),
                values: NodeDisplacement::default(),
            },
            NodeRecord {
                node: "N2".to_string(),
                values: NodeDisplacement::from_array([0.003, -0.004, 0.0, 0.0, 0.0, 0.1]),
            },
        ];
        let reactions = vec![NodeRecord {
            node: "N1".to_string(),
            values: Reactions::from_array([0.0, 10.0, 0.0, 0.0, 0.0, 40.0]),
        }];
        let summary = AnalysisSummary::from_results(&displacements, &reactions, &[]);
        assert_eq!(summary.max_disp_node, "N2");
        assert!((summary.max_displacement - 0.005).abs() < 1e-15);
        assert_eq!(summary.max_reaction_node, "N1");
        assert_eq!(summary.max_reaction, 10.0);
        assert!(summary.max_axial_member.is_empty());
    }
}
