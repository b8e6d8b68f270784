//! Concentrated loads at nodes

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Forces (N) and moments (N·m) acting on a node, in global axes
///
/// Components a structure kind does not carry are dropped during assembly
/// with a warning for each non-zero one, e.g. `fz`, `mx` or `my` on a plane
/// frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeLoad {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl NodeLoad {
    pub fn new(fx: f64, fy: f64, fz: f64, mx: f64, my: f64, mz: f64) -> Self {
        Self { fx, fy, fz, mx, my, mz }
    }

    fn from_array([fx, fy, fz, mx, my, mz]: [f64; 6]) -> Self {
        Self::new(fx, fy, fz, mx, my, mz)
    }

    /// Load with a single non-zero component
    fn single(component: usize, value: f64) -> Self {
        let mut values = [0.0; 6];
        values[component] = value;
        Self::from_array(values)
    }

    pub fn fx(value: f64) -> Self {
        Self::single(0, value)
    }

    pub fn fy(value: f64) -> Self {
        Self::single(1, value)
    }

    pub fn fz(value: f64) -> Self {
        Self::single(2, value)
    }

    /// Couple about the global z axis
    pub fn mz(value: f64) -> Self {
        Self::single(5, value)
    }

    /// `[FX, FY, FZ, MX, MY, MZ]`
    pub fn as_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    /// Resultant of this load and `other` acting on the same node
    pub fn combined(&self, other: &NodeLoad) -> Self {
        *self + *other
    }
}

impl Add for NodeLoad {
    type Output = NodeLoad;

    fn add(self, rhs: NodeLoad) -> NodeLoad {
        let (a, b) = (self.as_array(), rhs.as_array());
        Self::from_array(std::array::from_fn(|k| a[k] + b[k]))
    }
}
