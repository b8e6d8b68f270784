use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use lsa_solver::prelude::*;

fn model_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("models").join(name)
}

fn analyse(model: &StructuralModel, options: &AnalysisOptions) -> AnalysisResults {
    let outcome = run(model, AnalysisType::StaticLinear, options, None).unwrap();
    outcome.results().unwrap().clone()
}

#[test]
fn cantilever_tip_matches_beam_theory() {
    let model = load_model(&model_path("cantilever.json")).unwrap();
    let results = analyse(&model, &AnalysisOptions::in_memory());

    // R200x300 bends about local z: iz = 0.3 * 0.2^3 / 12
    let e = 200e9;
    let iz = 0.3 * 0.2_f64.powi(3) / 12.0;
    let (p, l): (f64, f64) = (10_000.0, 3.0);

    let tip = results.displacement("N3").unwrap();
    assert_relative_eq!(tip.dy, -p * l.powi(3) / (3.0 * e * iz), max_relative = 1e-9);
    assert_relative_eq!(tip.rz, -p * l.powi(2) / (2.0 * e * iz), max_relative = 1e-9);
    assert_eq!(tip.dz, 0.0);

    let base = results.reaction("N1").unwrap();
    assert_relative_eq!(base.fy, p, max_relative = 1e-9);
    assert_relative_eq!(base.mz, p * l, max_relative = 1e-9);
    assert!(base.fx.abs() < 1e-6);

    let root = results.member_forces("M1").unwrap();
    assert_relative_eq!(root.i_end.shear_y, p, max_relative = 1e-9);
    assert_relative_eq!(root.i_end.moment_z, p * l, max_relative = 1e-9);
    assert_eq!(root.end_forces.len(), 6);

    assert_eq!(results.solver_path, SolverPath::Banded);
    assert!(results.solver_deviation.unwrap() < 1e-6);
    assert_eq!(results.summary.max_disp_node, "N3");
    assert_eq!(results.summary.total_dofs, 9);
    assert_eq!(results.summary.free_dofs, 6);
}

#[test]
fn zero_load_gives_zero_displacements() {
    let mut model = StructuralModel::new(StructureKind::PlaneFrame);
    model.add_material("Steel", Material::steel()).unwrap();
    model.add_section("S", Section::rectangular(0.2, 0.3)).unwrap();
    model.add_node("N1", Node::planar(0.0, 0.0)).unwrap();
    model.add_node("N2", Node::planar(2.0, 1.0)).unwrap();
    model.add_member("M1", Member::new("N1", "N2", "Steel", "S")).unwrap();
    model.add_support("N1", Support::fixed()).unwrap();

    let results = analyse(&model, &AnalysisOptions::in_memory());
    for record in &results.displacements {
        assert!(record.values.as_array().iter().all(|&v| v == 0.0));
    }
    assert_eq!(results.summary.max_displacement, 0.0);
}

#[test]
fn renumbering_does_not_change_results() {
    let model = load_model(&model_path("portal_frame.json")).unwrap();
    let plain = analyse(&model, &AnalysisOptions::in_memory());
    let renumbered = analyse(&model, &AnalysisOptions::in_memory().with_renumbering(true));

    assert!(renumbered.summary.half_bandwidth <= plain.summary.half_bandwidth);
    for (a, b) in plain.displacements.iter().zip(&renumbered.displacements) {
        assert_eq!(a.node, b.node);
        for (x, y) in a.values.as_array().iter().zip(b.values.as_array()) {
            assert_relative_eq!(*x, y, epsilon = 1e-12, max_relative = 1e-8);
        }
    }
    for (a, b) in plain.member_forces.iter().zip(&renumbered.member_forces) {
        assert_relative_eq!(a.i_end.moment_z, b.i_end.moment_z, epsilon = 1e-6, max_relative = 1e-8);
    }
}

#[test]
fn portal_frame_is_in_equilibrium() {
    let model = load_model(&model_path("portal_frame.json")).unwrap();
    let results = analyse(&model, &AnalysisOptions::in_memory());

    let a = results.reaction("A").unwrap();
    let e = results.reaction("E").unwrap();
    assert_relative_eq!(a.fx + e.fx, -8_000.0, max_relative = 1e-9);
    assert_relative_eq!(a.fy + e.fy, 25_000.0, max_relative = 1e-9);
    // Pinned bases carry no moment
    assert_eq!(a.mz, 0.0);
    // Sway to the right under the eaves load
    assert!(results.displacement("B").unwrap().dx > 0.0);
}

#[test]
fn floor_grid_shares_load_between_beams() {
    let model = load_model(&model_path("floor_grid.json")).unwrap();
    let results = analyse(&model, &AnalysisOptions::in_memory());

    // Two identical fixed-ended beams of span 4 crossing at midspan
    let e = 30e9;
    let iy = 0.3 * 0.5_f64.powi(3) / 12.0;
    let share = 40_000.0 / 2.0;
    let expected = -share * 4.0_f64.powi(3) / (192.0 * e * iy);

    let centre = results.displacement("O").unwrap();
    assert_relative_eq!(centre.dz, expected, max_relative = 1e-9);
    assert!(centre.rx.abs() < 1e-15);
    assert!(centre.ry.abs() < 1e-15);

    for node in ["W", "E", "S", "N"] {
        assert_relative_eq!(results.reaction(node).unwrap().fz, 10_000.0, max_relative = 1e-9);
    }
}
