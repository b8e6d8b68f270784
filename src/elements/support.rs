//! Support conditions at nodes

use serde::{Deserialize, Serialize};

use crate::model::COMPONENT_LABELS;

/// Restraints at one node, held over all six node components
///
/// A restrained component holds the displacement it is forced to, zero for
/// an ordinary support. Components the structure kind does not carry are
/// ignored when boundary conditions are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Support {
    held: [Option<f64>; 6],
}

impl Support {
    /// Node with nothing restrained
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixed() -> Self {
        Self::with_restraints(true, true, true, true, true, true)
    }

    /// Translations held, rotations free
    pub fn pinned() -> Self {
        Self::with_restraints(true, true, true, false, false, false)
    }

    /// Vertical roller of a plane structure
    pub fn roller_y() -> Self {
        Self::with_restraints(false, true, false, false, false, false)
    }

    pub fn with_restraints(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        let flags = [dx, dy, dz, rx, ry, rz];
        Self {
            held: flags.map(|restrained| restrained.then_some(0.0)),
        }
    }

    /// Restrain `component` (0-5) and force it to `value`; other indices are ignored
    pub fn with_enforced(mut self, component: usize, value: f64) -> Self {
        if let Some(slot) = self.held.get_mut(component) {
            *slot = Some(value);
        }
        self
    }

    pub fn restraints(&self) -> [bool; 6] {
        self.held.map(|slot| slot.is_some())
    }

    /// Displacement a restrained component is held at, `None` when free
    pub fn prescribed(&self, component: usize) -> Option<f64> {
        self.held.get(component).copied().flatten()
    }

    /// Names of the restrained components, e.g. `DX DY RZ`
    pub fn describe(&self) -> String {
        COMPONENT_LABELS
            .iter()
            .zip(self.restraints())
            .filter_map(|(name, restrained)| restrained.then_some(*name))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support_holds_everything_at_zero() {
        let support = Support::fixed();
        assert_eq!(support.restraints(), [true; 6]);
        assert!((0..6).all(|c| support.prescribed(c) == Some(0.0)));
    }

    #[test]
    fn test_pinned_support_frees_rotations() {
        let support = Support::pinned();
        assert_eq!(support.describe(), "DX DY DZ");
        assert_eq!(support.prescribed(3), None);
        assert_eq!(Support::roller_y().describe(), "DY");
    }

    #[test]
    fn test_settlement_restrains_its_component() {
        let support = Support::roller_y().with_enforced(0, 0.004).with_enforced(9, 1.0);
        assert_eq!(support.restraints(), [true, true, false, false, false, false]);
        assert_eq!(support.prescribed(0), Some(0.004));
        assert_eq!(support.prescribed(1), Some(0.0));
        assert_eq!(support.prescribed(9), None);
        assert!(Support::new().describe().is_empty());
    }
}
