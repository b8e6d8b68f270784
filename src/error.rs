//! Error types for the analysis engine

use std::path::PathBuf;

use thiserror::Error;

/// Broad failure classes surfaced to callers of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent model input
    Model,
    /// The model is valid but the reduced system could not be solved
    Numerical,
    /// Report or log could not be written
    Io,
}

/// Main error type for analysis operations
#[derive(Error, Debug)]
pub enum LsaError {
    #[error("Node '{node}' referenced by {referrer} not found in model")]
    NodeNotFound { node: String, referrer: String },

    #[error("Material '{material}' referenced by member '{member}' not found in model")]
    MaterialNotFound { material: String, member: String },

    #[error("Section '{section}' referenced by member '{member}' not found in model")]
    SectionNotFound { section: String, member: String },

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Member '{member}' has zero length (nodes '{i_node}' and '{j_node}' coincide)")]
    ZeroLengthMember {
        member: String,
        i_node: String,
        j_node: String,
    },

    #[error("Member '{0}' does not lie in the XY plane required by this structure kind")]
    NonPlanarMember(String),

    #[error("Invalid property for {owner}: {reason}")]
    InvalidProperty { owner: String, reason: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Member '{member}' couples DOFs {row} and {col}, outside half-bandwidth {half_bandwidth}")]
    BandwidthExceeded {
        member: String,
        row: usize,
        col: usize,
        half_bandwidth: usize,
    },

    #[error("Malformed model document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("Singular stiffness matrix at DOF {dof} ({component} of node '{node}') - model may be unstable or have insufficient supports")]
    SingularMatrix {
        dof: usize,
        node: String,
        component: &'static str,
    },

    #[error("Banded solver deviates from reference solve by {deviation:.3e} (tolerance {tolerance:.1e})")]
    SolverDiscrepancy { deviation: f64, tolerance: f64 },

    #[error("Failed to write report '{}': {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LsaError {
    /// Classify the error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SingularMatrix { .. } | Self::SolverDiscrepancy { .. } => ErrorKind::Numerical,
            Self::Report { .. } | Self::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Model,
        }
    }
}

/// Result type for analysis operations
pub type LsaResult<T> = Result<T, LsaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let singular = LsaError::SingularMatrix {
            dof: 3,
            node: "N2".to_string(),
            component: "DX",
        };
        assert_eq!(singular.kind(), ErrorKind::Numerical);
        assert!(singular.to_string().contains("N2"));

        let missing = LsaError::NodeNotFound {
            node: "N9".to_string(),
            referrer: "member 'M1'".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::Model);

        let io = LsaError::Report {
            path: PathBuf::from("/nope/out.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(io.kind(), ErrorKind::Io);
    }
}
