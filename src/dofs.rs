//! Global DOF numbering and half-bandwidth

use std::collections::VecDeque;
use std::ops::Range;

use crate::elements::Member;
use crate::model::{StructuralModel, StructureKind, COMPONENT_LABELS};

/// Assignment of global DOF indices to nodes
///
/// Every node owns a contiguous block of `kind.dofs_per_node()` indices.
/// The half-bandwidth follows from the numbering and the member
/// connectivity.
#[derive(Debug, Clone)]
pub struct DofMap {
    kind: StructureKind,
    /// First DOF of each node, by node position
    offsets: Vec<usize>,
    /// Node position owning each DOF block
    owners: Vec<usize>,
    half_bandwidth: usize,
}

impl DofMap {
    /// Number DOFs in node insertion order
    pub fn new(model: &StructuralModel) -> Self {
        Self::from_order(model, (0..model.node_count()).collect())
    }

    /// Number DOFs in reverse Cuthill-McKee node order to narrow the band
    pub fn renumbered(model: &StructuralModel) -> Self {
        let order = reverse_cuthill_mckee(model);
        let candidate = Self::from_order(model, order);
        let natural = Self::new(model);
        if candidate.half_bandwidth < natural.half_bandwidth {
            candidate
        } else {
            natural
        }
    }

    fn from_order(model: &StructuralModel, order: Vec<usize>) -> Self {
        let ndof = model.kind.dofs_per_node();
        let mut offsets = vec![0; order.len()];
        for (block, &node) in order.iter().enumerate() {
            offsets[node] = block * ndof;
        }
        let mut map = Self {
            kind: model.kind,
            offsets,
            owners: order,
            half_bandwidth: 0,
        };
        let half_bandwidth = model
            .members()
            .map(|(_, member)| {
                let dofs = map.member_dofs(model, member);
                let lo = dofs.iter().min().copied().unwrap_or(0);
                let hi = dofs.iter().max().copied().unwrap_or(0);
                hi - lo
            })
            .max()
            .unwrap_or(ndof.saturating_sub(1));
        map.half_bandwidth = half_bandwidth;
        map
    }

    pub fn total_dofs(&self) -> usize {
        self.offsets.len() * self.kind.dofs_per_node()
    }

    pub fn half_bandwidth(&self) -> usize {
        self.half_bandwidth
    }

    /// Global DOFs of the node at `position`
    pub fn node_dofs(&self, position: usize) -> Range<usize> {
        let first = self.offsets[position];
        first..first + self.kind.dofs_per_node()
    }

    /// Global DOFs of a member: i-node block then j-node block
    pub fn member_dofs(&self, model: &StructuralModel, member: &Member) -> Vec<usize> {
        member
            .nodes()
            .iter()
            .filter_map(|name| model.node_position(name))
            .flat_map(|pos| self.node_dofs(pos))
            .collect()
    }

    /// Global DOF of a node component (index into [DX..RZ]), if active
    pub fn dof_of(&self, position: usize, component: usize) -> Option<usize> {
        let local = self.kind.components().iter().position(|&c| c == component)?;
        Some(self.offsets[position] + local)
    }

    /// Node position and component index owning a global DOF
    pub fn dof_owner(&self, dof: usize) -> (usize, usize) {
        let ndof = self.kind.dofs_per_node();
        let node = self.owners[dof / ndof];
        (node, self.kind.components()[dof % ndof])
    }

    /// Node name and component label of a global DOF, for messages
    pub fn describe(&self, model: &StructuralModel, dof: usize) -> (String, &'static str) {
        let (node, component) = self.dof_owner(dof);
        let name = model.node_name(node).unwrap_or("?").to_string();
        (name, COMPONENT_LABELS[component])
    }
}

/// Reverse Cuthill-McKee ordering of the node adjacency graph
///
/// Returns node positions in their new numbering order.
pub fn reverse_cuthill_mckee(model: &StructuralModel) -> Vec<usize> {
    let n = model.node_count();
    if n == 0 {
        return vec![];
    }

    // Build adjacency list
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (_, member) in model.members() {
        if let (Some(i), Some(j)) = (
            model.node_position(&member.i_node),
            model.node_position(&member.j_node),
        ) {
            if i != j && !adj[i].contains(&j) {
                adj[i].push(j);
                adj[j].push(i);
            }
        }
    }

    let degrees: Vec<usize> = adj.iter().map(|v| v.len()).collect();
    for neighbors in &mut adj {
        neighbors.sort_by_key(|&i| (degrees[i], i));
    }

    let mut visited = vec![false; n];
    let mut result = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    while result.len() < n {
        // Start each component from its lowest-degree unvisited node
        let Some(start) = (0..n).filter(|&i| !visited[i]).min_by_key(|&i| (degrees[i], i)) else {
            break;
        };
        visited[start] = true;
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            result.push(node);
            for &neighbor in &adj[node] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    result.reverse();
    result
}
