//! Two-node members and their end releases

use serde::{Deserialize, Serialize};

/// Bending components of one member end, in `[DX, DY, DZ, RX, RY, RZ]` order
const MOMENT_HINGE: [bool; 6] = [false, false, false, false, true, true];

/// Local components freed at each member end
///
/// Released components carry no end force. They are condensed out of the
/// local stiffness before rotation to global axes, so trusses ignore them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberReleases {
    #[serde(default)]
    pub i_node: [bool; 6],
    #[serde(default)]
    pub j_node: [bool; 6],
}

impl MemberReleases {
    pub fn none() -> Self {
        Self::default()
    }

    /// Moment hinge at the i end
    pub fn pin_i() -> Self {
        Self {
            i_node: MOMENT_HINGE,
            ..Self::none()
        }
    }

    /// Moment hinge at the j end
    pub fn pin_j() -> Self {
        Self {
            j_node: MOMENT_HINGE,
            ..Self::none()
        }
    }

    /// Both ends flagged, in the member's 12-component local order
    pub fn as_array(&self) -> [bool; 12] {
        let mut flags = [false; 12];
        let (i_end, j_end) = flags.split_at_mut(6);
        i_end.copy_from_slice(&self.i_node);
        j_end.copy_from_slice(&self.j_node);
        flags
    }

    pub fn any(&self) -> bool {
        self.as_array().contains(&true)
    }
}

/// A prismatic member spanning from its i-node to its j-node
///
/// Ends, material and section are held by name and resolved against the
/// owning model, which rejects dangling names when the member is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub i_node: String,
    pub j_node: String,
    pub material: String,
    pub section: String,
    /// Roll about the member axis in radians; read by space frames only
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub releases: MemberReleases,
}

impl Member {
    pub fn new(i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self {
            i_node: i_node.into(),
            j_node: j_node.into(),
            material: material.into(),
            section: section.into(),
            rotation: 0.0,
            releases: MemberReleases::none(),
        }
    }

    pub fn with_rotation(self, rotation: f64) -> Self {
        Self { rotation, ..self }
    }

    pub fn with_releases(self, releases: MemberReleases) -> Self {
        Self { releases, ..self }
    }

    /// End node names, i first
    pub fn nodes(&self) -> [&str; 2] {
        [self.i_node.as_str(), self.j_node.as_str()]
    }
}
