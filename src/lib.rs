//! LSA Solver - linear static analysis of skeletal structures
//!
//! Plane and space trusses, plane and space frames and grids are analysed by
//! the direct stiffness method:
//! - Member stiffness in local axes, rotated to global axes
//! - Assembly into a symmetric banded global stiffness matrix
//! - Support conditions applied by row and column reduction
//! - Banded Gauss elimination, cross-checked against a banded Cholesky solve
//! - Member end forces, support reactions and an equilibrium check
//! - An atomically written plain-text report
//!
//! ## Example
//! ```rust
//! use lsa_solver::prelude::*;
//!
//! let mut model = StructuralModel::new(StructureKind::PlaneFrame).with_title("Cantilever");
//!
//! model.add_material("Steel", Material::steel()).unwrap();
//! model.add_section("R200x300", Section::rectangular(0.2, 0.3)).unwrap();
//!
//! model.add_node("N1", Node::planar(0.0, 0.0)).unwrap();
//! model.add_node("N2", Node::planar(3.0, 0.0)).unwrap();
//! model.add_member("M1", Member::new("N1", "N2", "Steel", "R200x300")).unwrap();
//!
//! model.add_support("N1", Support::fixed()).unwrap();
//! model.add_node_load("N2", NodeLoad::fy(-10_000.0)).unwrap();
//!
//! let outcome = run(&model, AnalysisType::StaticLinear, &AnalysisOptions::in_memory(), None).unwrap();
//! let tip = outcome.results().unwrap().displacement("N2").unwrap();
//! assert!(tip.dy < 0.0);
//! ```

pub mod analysis;
pub mod assembly;
pub mod boundary;
pub mod dofs;
pub mod elements;
pub mod error;
pub mod formulation;
pub mod loader;
pub mod loads;
pub mod logging;
pub mod math;
pub mod model;
pub mod recovery;
pub mod report;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        run, AnalysisOptions, AnalysisType, DiscrepancyPolicy, RunOutcome, SolverOptions,
    };
    pub use crate::elements::{Material, Member, MemberReleases, Node, Section, Support};
    pub use crate::error::{ErrorKind, LsaError, LsaResult};
    pub use crate::loader::{load_model, load_model_str};
    pub use crate::loads::NodeLoad;
    pub use crate::logging::RunLog;
    pub use crate::math::SolverPath;
    pub use crate::model::{StructuralModel, StructureKind};
    pub use crate::results::{AnalysisResults, MemberForces, NodeDisplacement, Reactions};
}
