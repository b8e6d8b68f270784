//! Plain-text results report
//!
//! The report is rendered completely in memory, then written to a private
//! temporary file beside the destination and renamed over it, so a reader
//! never sees a partial report.

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{LsaError, LsaResult};
use crate::model::{StructureKind, COMPONENT_LABELS};
use crate::results::{AnalysisResults, MemberForces};

const RULE: &str = "==========================================================================";

/// Suffix replacing the model file extension
pub const RESULTS_SUFFIX: &str = "_results.txt";

/// `<dir>/<stem>_results.txt` beside a model file
pub fn results_path(model_path: &Path) -> PathBuf {
    let stem = model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    model_path.with_file_name(format!("{stem}{RESULTS_SUFFIX}"))
}

type ForceColumn = (&'static str, fn(&MemberForces) -> f64);

/// Member force columns that carry values for a structure kind
fn force_columns(kind: StructureKind) -> &'static [ForceColumn] {
    const AXIAL: ForceColumn = ("Axial", |f| f.axial);
    const SHEAR_Y: ForceColumn = ("Shear y", |f| f.shear_y);
    const SHEAR_Z: ForceColumn = ("Shear z", |f| f.shear_z);
    const TORSION: ForceColumn = ("Torsion", |f| f.torsion);
    const MOMENT_Y: ForceColumn = ("Moment y", |f| f.moment_y);
    const MOMENT_Z: ForceColumn = ("Moment z", |f| f.moment_z);

    match kind {
        StructureKind::PlaneTruss | StructureKind::SpaceTruss => &[AXIAL],
        StructureKind::PlaneFrame => &[AXIAL, SHEAR_Y, MOMENT_Z],
        StructureKind::Grid => &[SHEAR_Z, TORSION, MOMENT_Y],
        StructureKind::SpaceFrame => &[AXIAL, SHEAR_Y, SHEAR_Z, TORSION, MOMENT_Y, MOMENT_Z],
    }
}

/// Text rendering of a completed run
pub struct Report<'a> {
    results: &'a AnalysisResults,
}

impl<'a> Report<'a> {
    pub fn new(results: &'a AnalysisResults) -> Self {
        Self { results }
    }

    fn header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.results;
        writeln!(f, "{RULE}")?;
        writeln!(f, " LINEAR STRUCTURAL ANALYSIS RESULTS")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Title:          {}", r.title)?;
        writeln!(f, "Structure:      {}", r.kind.name())?;
        writeln!(f, "Analysis:       {}", r.analysis)?;
        writeln!(f, "Completed:      {}", r.completed_at.format("%Y-%m-%d %H:%M:%S"))?;
        if let Some(source) = &r.source {
            writeln!(f, "Model file:     {}", source.display())?;
        }
        writeln!(f)?;

        let s = &r.summary;
        writeln!(f, "MODEL SIZE")?;
        writeln!(f, "  Nodes:          {}", s.num_nodes)?;
        writeln!(f, "  Members:        {}", s.num_members)?;
        writeln!(f, "  DOFs:           {} ({} free)", s.total_dofs, s.free_dofs)?;
        writeln!(f, "  Half-bandwidth: {}", s.half_bandwidth)?;
        writeln!(f)?;

        writeln!(f, "SOLVER")?;
        writeln!(f, "  Path:           {}", r.solver_path)?;
        match r.solver_deviation {
            Some(deviation) => writeln!(f, "  Deviation:      {deviation:.3e}")?,
            None => writeln!(f, "  Deviation:      not checked")?,
        }
        writeln!(f, "  Solve time:     {} ms", r.solve_millis)?;
        writeln!(f)
    }

    fn displacements(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = self.results.kind.components();
        writeln!(f, "NODE DISPLACEMENTS")?;
        write!(f, "  {:<12}", "Node")?;
        for &c in components {
            write!(f, "{:>15}", COMPONENT_LABELS[c])?;
        }
        writeln!(f)?;
        for record in &self.results.displacements {
            let values = record.values.as_array();
            write!(f, "  {:<12}", record.node)?;
            for &c in components {
                write!(f, "{:>15.6e}", values[c])?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }

    fn reactions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABELS: [&str; 6] = ["FX", "FY", "FZ", "MX", "MY", "MZ"];
        let components = self.results.kind.components();
        writeln!(f, "SUPPORT REACTIONS")?;
        write!(f, "  {:<12}", "Node")?;
        for &c in components {
            write!(f, "{:>15}", LABELS[c])?;
        }
        writeln!(f)?;
        for record in &self.results.reactions {
            let values = record.values.as_array();
            write!(f, "  {:<12}", record.node)?;
            for &c in components {
                write!(f, "{:>15.6e}", values[c])?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }

    fn member_forces(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = force_columns(self.results.kind);
        writeln!(f, "MEMBER END FORCES (local axes, tension positive)")?;
        write!(f, "  {:<12}{:<5}", "Member", "End")?;
        for (label, _) in columns {
            write!(f, "{label:>15}")?;
        }
        writeln!(f)?;
        for record in &self.results.member_forces {
            for (end, forces) in [("i", &record.i_end), ("j", &record.j_end)] {
                write!(f, "  {:<12}{:<5}", record.member, end)?;
                for (_, value) in columns {
                    write!(f, "{:>15.6e}", value(forces))?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f)
    }

    fn summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.results.summary;
        writeln!(f, "SUMMARY")?;
        writeln!(
            f,
            "  Max displacement: {:.6e} at node {}",
            s.max_displacement, s.max_disp_node
        )?;
        writeln!(
            f,
            "  Max reaction:     {:.6e} at node {}",
            s.max_reaction, s.max_reaction_node
        )?;
        writeln!(
            f,
            "  Max axial force:  {:.6e} in member {}",
            s.max_axial, s.max_axial_member
        )?;
        writeln!(
            f,
            "  Max moment:       {:.6e} in member {}",
            s.max_moment, s.max_moment_member
        )?;
        writeln!(f, "{RULE}")
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header(f)?;
        self.displacements(f)?;
        self.reactions(f)?;
        self.member_forces(f)?;
        self.summary(f)
    }
}

/// Render the report into a string
pub fn render(results: &AnalysisResults) -> String {
    Report::new(results).to_string()
}

/// Replace `path` with `contents` in one rename
///
/// The destination directory must exist. On failure the temporary file is
/// removed and any previous file at `path` is left as it was.
pub fn write_atomic(path: &Path, contents: &str) -> LsaResult<()> {
    let report_error = |source: std::io::Error| LsaError::Report {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(report_error)?;
    file.write_all(contents.as_bytes()).map_err(report_error)?;
    file.flush().map_err(report_error)?;
    file.as_file().sync_all().map_err(report_error)?;
    file.persist(path).map_err(|e| report_error(e.error))?;
    Ok(())
}

/// Render and atomically write the report
pub fn write_report(results: &AnalysisResults, path: &Path) -> LsaResult<()> {
    let text = render(results);
    write_atomic(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_results_path() {
        assert_eq!(
            results_path(Path::new("/data/models/bridge.json")),
            PathBuf::from("/data/models/bridge_results.txt")
        );
        assert_eq!(
            results_path(Path::new("frame.xml")),
            PathBuf::from("frame_results.txt")
        );
    }

    #[test]
    fn test_atomic_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_results.txt");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, "new report\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new report\n");
        // Only the report remains, no stray temporary files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out_results.txt");
        let err = write_atomic(&path, "text").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(err, LsaError::Report { path: ref p, .. } if p == &path));
        assert!(!path.exists());
    }

    #[test]
    fn test_force_columns_per_kind() {
        let labels: Vec<&str> = force_columns(StructureKind::Grid)
            .iter()
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(labels, ["Shear z", "Torsion", "Moment y"]);
        assert_eq!(force_columns(StructureKind::PlaneTruss).len(), 1);
    }
}
