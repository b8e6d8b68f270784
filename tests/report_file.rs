use std::fs;
use std::path::{Path, PathBuf};

use lsa_solver::prelude::*;

/// Copy a bundled model into a fresh directory
fn staged_model(dir: &Path, name: &str) -> PathBuf {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("models").join(name);
    let target = dir.join(name);
    fs::copy(source, &target).unwrap();
    target
}

#[test]
fn report_lands_beside_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = staged_model(dir.path(), "cantilever.json");
    let model = load_model(&path).unwrap();

    let mut log = RunLog::new();
    let outcome = run(
        &model,
        AnalysisType::StaticLinear,
        &AnalysisOptions::default(),
        Some(&mut log),
    )
    .unwrap();

    let report = dir.path().join("cantilever_results.txt");
    assert_eq!(outcome.report_path(), Some(report.as_path()));

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("Cantilever with tip load"));
    assert!(text.contains("Static Linear Analysis"));
    assert!(text.contains("NODE DISPLACEMENTS"));
    assert!(text.contains("SUPPORT REACTIONS"));
    assert!(text.contains("MEMBER END FORCES"));

    // Model and report only; the temporary file was renamed away
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    assert!(log
        .lines()
        .iter()
        .any(|line| line.ends_with(&format!("Results written to {}", report.display()))));
}

#[test]
fn rerun_replaces_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = staged_model(dir.path(), "bracket_truss.json");
    let report = dir.path().join("bracket_truss_results.txt");
    fs::write(&report, "stale").unwrap();

    let model = load_model(&path).unwrap();
    run(&model, AnalysisType::StaticLinear, &AnalysisOptions::default(), None).unwrap();

    let text = fs::read_to_string(&report).unwrap();
    assert!(!text.contains("stale"));
    assert!(text.contains("Three-bar bracket"));
}

#[test]
fn unwritable_report_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = staged_model(dir.path(), "cantilever.json");
    let model = load_model(&path).unwrap();
    let target = dir.path().join("no_such_dir").join("out.txt");

    let mut log = RunLog::new();
    let err = run(
        &model,
        AnalysisType::StaticLinear,
        &AnalysisOptions::default().with_report_path(&target),
        Some(&mut log),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!target.exists());
    assert!(log.lines().last().unwrap().contains("ERROR - Analysis failed"));
}

#[test]
fn unimplemented_analysis_writes_no_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = staged_model(dir.path(), "cantilever.json");
    let model = load_model(&path).unwrap();

    let outcome = run(
        &model,
        AnalysisType::FrequencyDomain,
        &AnalysisOptions::default(),
        None,
    )
    .unwrap();

    assert!(outcome.report_path().is_none());
    assert!(!dir.path().join("cantilever_results.txt").exists());
}

#[test]
fn run_log_file_collects_progress() {
    let dir = tempfile::tempdir().unwrap();
    let path = staged_model(dir.path(), "portal_frame.json");
    let log_path = dir.path().join("lsa.log");
    let model = load_model(&path).unwrap();

    let mut log = RunLog::append_to(&log_path).unwrap();
    run(&model, AnalysisType::StaticLinear, &AnalysisOptions::in_memory(), Some(&mut log)).unwrap();
    drop(log);

    let text = fs::read_to_string(&log_path).unwrap();
    assert!(text.contains("INFO - Stiffness matrix completed"));
    assert!(text.contains("INFO - Solver finished in"));
}
