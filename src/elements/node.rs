//! Joints of the structure

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A joint, located in global axes
///
/// Plane structures leave `z` at zero. Which components a joint carries is
/// decided by the structure kind, not by the joint itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Node {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Joint of a plane structure (`z = 0`)
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    fn position(&self) -> Vector3<f64> {
        Vector3::from(self.coords())
    }

    /// Straight-line length of a member running from this joint to `other`
    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.position() - self.position()).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.coords().iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_node_sits_at_zero_z() {
        let node = Node::planar(4.0, 5.0);
        assert_eq!(node.coords(), [4.0, 5.0, 0.0]);
        assert_eq!(Node::default(), Node::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_member_length_in_space() {
        let a = Node::new(1.0, 1.0, 1.0);
        let b = Node::new(3.0, 4.0, 7.0);
        assert!((a.distance_to(&b) - 7.0).abs() < 1e-12);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
    }

    #[test]
    fn test_non_finite_coordinate() {
        assert!(Node::planar(1.0, 2.0).is_finite());
        assert!(!Node::new(0.0, f64::NAN, 0.0).is_finite());
        assert!(!Node::planar(f64::INFINITY, 0.0).is_finite());
    }
}
