//! Analysis types and options

mod run;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::results::AnalysisResults;

pub use crate::math::{DiscrepancyPolicy, SolverOptions};
pub use run::run;

/// Type of structural analysis to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    /// First-order linear static analysis
    #[default]
    StaticLinear,
    StaticNonlinear,
    DynamicLinear,
    DynamicNonlinear,
    FrequencyDomain,
    Buckling,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 6] = [
        Self::StaticLinear,
        Self::StaticNonlinear,
        Self::DynamicLinear,
        Self::DynamicNonlinear,
        Self::FrequencyDomain,
        Self::Buckling,
    ];

    /// Name shown in the analysis selector
    pub fn display_name(self) -> &'static str {
        match self {
            Self::StaticLinear => "Static Linear Analysis",
            Self::StaticNonlinear => "Static Nonlinear Analysis",
            Self::DynamicLinear => "Dynamic Linear Analysis",
            Self::DynamicNonlinear => "Dynamic Nonlinear Analysis",
            Self::FrequencyDomain => "Frequency Domain Analysis",
            Self::Buckling => "Buckling Analysis",
        }
    }

    /// Short name used on the command line
    pub fn cli_name(self) -> &'static str {
        match self {
            Self::StaticLinear => "static-linear",
            Self::StaticNonlinear => "static-nonlinear",
            Self::DynamicLinear => "dynamic-linear",
            Self::DynamicNonlinear => "dynamic-nonlinear",
            Self::FrequencyDomain => "frequency-domain",
            Self::Buckling => "buckling",
        }
    }

    /// Whether a run of this type produces results
    pub fn is_implemented(self) -> bool {
        matches!(self, Self::StaticLinear)
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AnalysisType {
    type Err = String;

    /// Accepts the command-line name or the selector name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| {
                t.cli_name().eq_ignore_ascii_case(wanted)
                    || t.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|t| t.cli_name()).collect();
                format!("unknown analysis type '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Options for structural analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Check static equilibrium after analysis
    pub check_statics: bool,
    /// Renumber nodes (reverse Cuthill-McKee) when it narrows the band
    pub renumber_nodes: bool,
    /// Write the text report after a successful run
    pub write_report: bool,
    /// Report destination; defaults to `<model stem>_results.txt`
    pub report_path: Option<PathBuf>,
    pub solver: SolverOptions,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_statics: true,
            renumber_nodes: false,
            write_report: true,
            report_path: None,
            solver: SolverOptions::default(),
        }
    }
}

impl AnalysisOptions {
    /// Options that never touch the filesystem
    pub fn in_memory() -> Self {
        Self {
            write_report: false,
            ..Self::default()
        }
    }

    /// Write the report to a fixed path
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.write_report = true;
        self.report_path = Some(path.into());
        self
    }

    pub fn with_renumbering(mut self, enabled: bool) -> Self {
        self.renumber_nodes = enabled;
        self
    }

    pub fn with_statics_check(mut self, enabled: bool) -> Self {
        self.check_statics = enabled;
        self
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }

    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> crate::error::LsaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Static linear analysis finished
    Completed {
        results: Box<AnalysisResults>,
        /// Where the report was written, if it was
        report_path: Option<PathBuf>,
    },
    /// The selected analysis type has no implementation; nothing was computed
    NotImplemented(AnalysisType),
}

impl RunOutcome {
    pub fn results(&self) -> Option<&AnalysisResults> {
        match self {
            Self::Completed { results, .. } => Some(results.as_ref()),
            Self::NotImplemented(_) => None,
        }
    }

    pub fn report_path(&self) -> Option<&Path> {
        match self {
            Self::Completed { report_path, .. } => report_path.as_deref(),
            Self::NotImplemented(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
