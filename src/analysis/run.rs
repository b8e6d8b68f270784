//! Run invocation: analysis-type dispatch and the static linear pipeline

use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use log::Level;

use super::{AnalysisOptions, AnalysisType, RunOutcome};
use crate::assembly::assemble;
use crate::boundary::BoundaryConditions;
use crate::dofs::DofMap;
use crate::error::{LsaError, LsaResult};
use crate::formulation::formulate;
use crate::logging::{note, RunLog};
use crate::math::{solve, SolveError, SolverPath};
use crate::model::StructuralModel;
use crate::recovery::{member_forces, node_displacements, node_reactions, reaction_vector, StaticsCheck};
use crate::report::{results_path, write_report};
use crate::results::{AnalysisResults, AnalysisSummary};

/// Relative residual above which the statics check warns
const STATICS_TOLERANCE: f64 = 1e-6;

/// Run the selected analysis on a model
///
/// Only [`AnalysisType::StaticLinear`] computes anything; every other type is
/// logged as not implemented and returns [`RunOutcome::NotImplemented`]
/// without writing a report. Any failure is logged and returned; no report
/// is written for a failed run.
pub fn run(
    model: &StructuralModel,
    analysis: AnalysisType,
    options: &AnalysisOptions,
    log: Option<&mut RunLog>,
) -> LsaResult<RunOutcome> {
    let mut log = log;

    if !analysis.is_implemented() {
        note(&mut log, Level::Warn, format!("{analysis} is not yet implemented"));
        return Ok(RunOutcome::NotImplemented(analysis));
    }

    note(&mut log, Level::Info, format!("Running {analysis}"));
    static_linear(model, analysis, options, &mut log).map_err(|err| {
        note(&mut log, Level::Error, format!("Analysis failed: {err}"));
        err
    })
}

fn solve_error(err: SolveError, model: &StructuralModel, dof_map: &DofMap) -> LsaError {
    match err {
        SolveError::Singular(pivot) => {
            let (node, component) = dof_map.describe(model, pivot.dof);
            LsaError::SingularMatrix {
                dof: pivot.dof,
                node,
                component,
            }
        }
        SolveError::Discrepancy {
            deviation,
            tolerance,
        } => LsaError::SolverDiscrepancy {
            deviation,
            tolerance,
        },
    }
}

fn static_linear(
    model: &StructuralModel,
    analysis: AnalysisType,
    options: &AnalysisOptions,
    log: &mut Option<&mut RunLog>,
) -> LsaResult<RunOutcome> {
    model.validate()?;

    let dof_map = if options.renumber_nodes {
        DofMap::renumbered(model)
    } else {
        DofMap::new(model)
    };
    note(
        log,
        Level::Info,
        format!(
            "{} nodes, {} members, {} DOFs, half-bandwidth {}",
            model.node_count(),
            model.member_count(),
            dof_map.total_dofs(),
            dof_map.half_bandwidth()
        ),
    );

    let elements = formulate(model, &dof_map)?;
    let system = assemble(model, &dof_map, &elements)?;
    note(log, Level::Info, "Stiffness matrix completed");

    let bcs = BoundaryConditions::from_supports(model, &dof_map);
    if bcs.is_empty() {
        note(log, Level::Warn, "Model has no supports");
    }

    // Reactions need the system as assembled
    let unreduced = system.stiffness.clone();
    let mut band = system.stiffness;
    let mut reduced_loads = system.loads.clone();
    bcs.apply(&mut band, &mut reduced_loads);

    note(log, Level::Info, "Solver started");
    let started = Instant::now();
    let solution = solve(band, reduced_loads, &options.solver)
        .map_err(|err| solve_error(err, model, &dof_map))?;
    let solve_millis = started.elapsed().as_millis();
    note(log, Level::Info, format!("Solver finished in {solve_millis} ms"));

    match (solution.path, solution.deviation) {
        (SolverPath::Banded, Some(deviation)) => note(
            log,
            Level::Info,
            format!("Banded solution agrees with reference solve (deviation {deviation:.3e})"),
        ),
        (SolverPath::Banded, None) => note(log, Level::Info, "Banded solution not cross-checked"),
        (SolverPath::ReferenceFallback, _) => note(
            log,
            Level::Warn,
            "Banded solution diverged from reference solve; reference solution substituted",
        ),
    }

    let d = &solution.displacements;
    let forces = member_forces(model.kind, &elements, d);
    let reactions = reaction_vector(&unreduced, &system.loads, d, &bcs);

    if options.check_statics {
        let check = StaticsCheck::compute(&dof_map, &system.loads, &reactions);
        if check.passes(STATICS_TOLERANCE) {
            note(log, Level::Info, "Statics check passed");
        } else {
            note(
                log,
                Level::Warn,
                format!(
                    "Statics check failed: residual [{:.3e}, {:.3e}, {:.3e}]",
                    check.residual[0], check.residual[1], check.residual[2]
                ),
            );
        }
    }

    let displacements = node_displacements(model, &dof_map, d);
    let node_reactions = node_reactions(model, &dof_map, &reactions, &bcs);
    let mut summary = AnalysisSummary::from_results(&displacements, &node_reactions, &forces);
    summary.num_nodes = model.node_count();
    summary.num_members = model.member_count();
    summary.total_dofs = dof_map.total_dofs();
    summary.free_dofs = dof_map.total_dofs() - bcs.len();
    summary.half_bandwidth = dof_map.half_bandwidth();

    let results = AnalysisResults {
        title: model.title.clone(),
        kind: model.kind,
        analysis: analysis.display_name().to_string(),
        completed_at: Local::now(),
        solver_path: solution.path,
        solver_deviation: solution.deviation,
        solve_millis,
        displacements,
        reactions: node_reactions,
        member_forces: forces,
        summary,
        source: model.source().map(PathBuf::from),
    };

    let report_path = if options.write_report {
        options
            .report_path
            .clone()
            .or_else(|| model.source().map(results_path))
    } else {
        None
    };
    match &report_path {
        Some(path) => {
            write_report(&results, path)?;
            note(log, Level::Info, format!("Results written to {}", path.display()));
        }
        None if options.write_report => note(
            log,
            Level::Warn,
            "Model has no source file and no report path was given; report not written",
        ),
        None => {}
    }

    Ok(RunOutcome::Completed {
        results: Box::new(results),
        report_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, Member, Node, Section, Support};
    use crate::error::ErrorKind;
    use crate::loads::NodeLoad;
    use crate::math::{DiscrepancyPolicy, SolverOptions};
    use crate::model::StructureKind;
    use approx::assert_relative_eq;

    fn cantilever() -> StructuralModel {
        let mut model = StructuralModel::new(StructureKind::PlaneFrame).with_title("Cantilever");
        model.add_material("Steel", Material::steel()).unwrap();
        model.add_section("S", Section::rectangular(0.2, 0.3)).unwrap();
        model.add_node("N1", Node::planar(0.0, 0.0)).unwrap();
        model.add_node("N2", Node::planar(3.0, 0.0)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "S")).unwrap();
        model.add_support("N1", Support::fixed()).unwrap();
        model.add_node_load("N2", NodeLoad::fy(-10_000.0)).unwrap();
        model
    }

    #[test]
    fn test_not_implemented_types() {
        let model = cantilever();
        let mut log = RunLog::new();
        for analysis in AnalysisType::ALL.into_iter().filter(|t| !t.is_implemented()) {
            let outcome = run(&model, analysis, &AnalysisOptions::default(), Some(&mut log)).unwrap();
            assert!(matches!(outcome, RunOutcome::NotImplemented(t) if t == analysis));
            assert!(outcome.report_path().is_none());
        }
        assert_eq!(log.lines().len(), 5);
        assert!(log.lines()[0].ends_with("Static Nonlinear Analysis is not yet implemented"));
    }

    #[test]
    fn test_static_linear_logs_progress() {
        let model = cantilever();
        let mut log = RunLog::new();
        let outcome = run(
            &model,
            AnalysisType::StaticLinear,
            &AnalysisOptions::default(),
            Some(&mut log),
        )
        .unwrap();
        let results = outcome.results().unwrap();

        let iz = 0.3 * 0.2_f64.powi(3) / 12.0;
        let expected = -10_000.0 * 27.0 / (3.0 * 200e9 * iz);
        assert_relative_eq!(results.displacement("N2").unwrap().dy, expected, max_relative = 1e-9);
        assert_eq!(results.solver_path, SolverPath::Banded);

        let text = log.lines().join("\n");
        assert!(text.contains("Stiffness matrix completed"));
        assert!(text.contains("Solver finished in"));
        assert!(text.contains("Statics check passed"));
        // No source file, no report
        assert!(outcome.report_path().is_none());
        assert!(text.contains("report not written"));
    }

    #[test]
    fn test_failure_is_logged() {
        let mut model = StructuralModel::new(StructureKind::PlaneFrame);
        model.add_material("Steel", Material::steel()).unwrap();
        model.add_section("S", Section::rectangular(0.2, 0.3)).unwrap();
        model.add_node("N1", Node::planar(0.0, 0.0)).unwrap();
        model.add_node("N2", Node::planar(3.0, 0.0)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "S")).unwrap();

        let mut log = RunLog::new();
        let err = run(
            &model,
            AnalysisType::StaticLinear,
            &AnalysisOptions::in_memory(),
            Some(&mut log),
        )
        .unwrap_err();
        assert!(matches!(err, LsaError::SingularMatrix { .. }));
        assert!(log.lines().last().unwrap().contains("ERROR - Analysis failed"));
    }

    fn run_with(solver: SolverOptions, log: &mut RunLog) -> LsaResult<RunOutcome> {
        let options = AnalysisOptions::in_memory().with_solver(solver);
        run(&cantilever(), AnalysisType::StaticLinear, &options, Some(log))
    }

    #[test]
    fn test_substituted_reference_is_logged() {
        // A negative tolerance rejects every banded solution
        let mut log = RunLog::new();
        let outcome = run_with(SolverOptions::default().with_tolerance(-1.0), &mut log).unwrap();
        let results = outcome.results().unwrap();
        assert_eq!(results.solver_path, SolverPath::ReferenceFallback);
        assert!(results.solver_deviation.is_some());
        assert!(log
            .lines()
            .iter()
            .any(|line| line.contains("WARN - ") && line.contains("reference solution substituted")));

        let iz = 0.3 * 0.2_f64.powi(3) / 12.0;
        let expected = -10_000.0 * 27.0 / (3.0 * 200e9 * iz);
        assert_relative_eq!(results.displacement("N2").unwrap().dy, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_discrepancy_fails_run_under_strict_policy() {
        let mut log = RunLog::new();
        let solver = SolverOptions::default()
            .with_tolerance(-1.0)
            .with_policy(DiscrepancyPolicy::Fail);
        let err = run_with(solver, &mut log).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
        assert!(matches!(err, LsaError::SolverDiscrepancy { tolerance, .. } if tolerance == -1.0));
        assert!(log.lines().last().unwrap().contains("ERROR - Analysis failed"));
    }

    #[test]
    fn test_unchecked_run_is_logged() {
        let mut log = RunLog::new();
        let outcome = run_with(SolverOptions::default().with_cross_check(false), &mut log).unwrap();
        let results = outcome.results().unwrap();
        assert_eq!(results.solver_path, SolverPath::Banded);
        assert!(results.solver_deviation.is_none());
        assert!(log
            .lines()
            .iter()
            .any(|line| line.ends_with("INFO - Banded solution not cross-checked")));
    }
}
