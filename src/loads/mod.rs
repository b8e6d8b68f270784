//! Loads applied to the structure

mod node_load;

pub use node_load::NodeLoad;
