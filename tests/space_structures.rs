use approx::assert_relative_eq;
use lsa_solver::prelude::*;

fn analyse(model: &StructuralModel, options: &AnalysisOptions) -> AnalysisResults {
    let outcome = run(model, AnalysisType::StaticLinear, options, None).unwrap();
    outcome.results().unwrap().clone()
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn inclined_rolled_cantilever_matches_beam_theory() {
    let mut model = StructuralModel::new(StructureKind::SpaceFrame);
    model.add_material("Steel", Material::steel()).unwrap();
    model.add_section("Rod", Section::circular(0.1)).unwrap();
    model.add_node("Root", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("Tip", Node::new(1.0, 2.0, 2.0)).unwrap();
    model
        .add_member("M1", Member::new("Root", "Tip", "Steel", "Rod").with_rotation(0.7))
        .unwrap();
    model.add_support("Root", Support::fixed()).unwrap();

    // Perpendicular to the member axis (1, 2, 2) / 3
    let p = 1000.0;
    let dir = [2.0 / 5f64.sqrt(), -1.0 / 5f64.sqrt(), 0.0];
    model
        .add_node_load("Tip", NodeLoad::new(p * dir[0], p * dir[1], 0.0, 0.0, 0.0, 0.0))
        .unwrap();

    let results = analyse(&model, &AnalysisOptions::in_memory());

    let l: f64 = 3.0;
    let i = std::f64::consts::PI * 0.1_f64.powi(4) / 64.0;
    let expected = p * l.powi(3) / (3.0 * 200e9 * i);

    let tip = results.displacement("Tip").unwrap();
    let shift = [tip.dx, tip.dy, tip.dz];
    assert_relative_eq!(tip.translation_magnitude(), expected, max_relative = 1e-9);
    assert_relative_eq!(dot(shift, dir), expected, max_relative = 1e-9);

    let root = results.member_forces("M1").unwrap();
    assert_eq!(root.end_forces.len(), 12);
    let moment = root.i_end.moment_y.hypot(root.i_end.moment_z);
    let shear = root.i_end.shear_y.hypot(root.i_end.shear_z);
    assert_relative_eq!(moment, p * l, max_relative = 1e-9);
    assert_relative_eq!(shear, p, max_relative = 1e-9);
    assert!(root.i_end.axial.abs() < 1e-6);
    assert!(root.i_end.torsion.abs() < 1e-6);
    assert!(root.j_end.moment_y.hypot(root.j_end.moment_z) < 1e-6);

    let base = results.reaction("Root").unwrap();
    assert_relative_eq!(base.force_magnitude(), p, max_relative = 1e-9);
    assert_relative_eq!(
        dot([base.fx, base.fy, base.fz], dir),
        -p,
        max_relative = 1e-9
    );
}

#[test]
fn vertical_column_bends_about_local_z_for_sway() {
    // Local y runs along -X for an upward column, so sway in X uses iz
    let mut model = StructuralModel::new(StructureKind::SpaceFrame);
    model.add_material("Steel", Material::steel()).unwrap();
    model.add_section("Col", Section::rectangular(0.2, 0.3)).unwrap();
    model.add_node("Base", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("Top", Node::new(0.0, 4.0, 0.0)).unwrap();
    model.add_member("C1", Member::new("Base", "Top", "Steel", "Col")).unwrap();
    model.add_support("Base", Support::fixed()).unwrap();
    model.add_node_load("Top", NodeLoad::fx(5000.0)).unwrap();

    let results = analyse(&model, &AnalysisOptions::in_memory());

    let (p, l): (f64, f64) = (5000.0, 4.0);
    let iz = 0.3 * 0.2_f64.powi(3) / 12.0;
    let top = results.displacement("Top").unwrap();
    assert_relative_eq!(top.dx, p * l.powi(3) / (3.0 * 200e9 * iz), max_relative = 1e-9);
    assert!(top.dz.abs() < 1e-12);

    let base = results.member_forces("C1").unwrap().i_end;
    assert_relative_eq!(base.moment_z.abs(), p * l, max_relative = 1e-9);
    assert!(base.moment_y.abs() < 1e-6);
    assert_relative_eq!(results.reaction("Base").unwrap().mz, p * l, max_relative = 1e-9);
}

fn tripod(p: f64) -> StructuralModel {
    let mut model = StructuralModel::new(StructureKind::SpaceTruss).with_title("Tripod");
    model.add_material("Steel", Material::steel()).unwrap();
    model.add_section("Leg", Section::axial(0.002)).unwrap();

    // Legs 5 long: feet on a radius-3 circle, apex 4 up
    let half_root3 = 3f64.sqrt() / 2.0;
    let feet = [
        ("F1", 3.0, 0.0),
        ("F2", -1.5, 3.0 * half_root3),
        ("F3", -1.5, -3.0 * half_root3),
    ];
    model.add_node("Apex", Node::new(0.0, 0.0, 4.0)).unwrap();
    for (name, x, y) in feet {
        model.add_node(name, Node::new(x, y, 0.0)).unwrap();
        model.add_support(name, Support::pinned()).unwrap();
        model
            .add_member(&format!("L{}", &name[1..]), Member::new(name, "Apex", "Steel", "Leg"))
            .unwrap();
    }
    model.add_node_load("Apex", NodeLoad::fz(-p)).unwrap();
    model
}

#[test]
fn tripod_legs_share_the_load() {
    let p = 3000.0;
    let model = tripod(p);
    let (h, l) = (4.0, 5.0);

    for renumber in [false, true] {
        let results = analyse(&model, &AnalysisOptions::in_memory().with_renumbering(renumber));
        assert_eq!(results.summary.total_dofs, 12);
        assert_eq!(results.summary.free_dofs, 3);

        for leg in ["L1", "L2", "L3"] {
            let forces = results.member_forces(leg).unwrap();
            assert_relative_eq!(forces.i_end.axial, -p * l / (3.0 * h), max_relative = 1e-9);
            assert_relative_eq!(forces.j_end.axial, -p * l / (3.0 * h), max_relative = 1e-9);
        }
        for foot in ["F1", "F2", "F3"] {
            assert_relative_eq!(results.reaction(foot).unwrap().fz, p / 3.0, max_relative = 1e-9);
        }

        let apex = results.displacement("Apex").unwrap();
        assert!(apex.dz < 0.0);
        assert!(apex.dx.abs() < 1e-12 && apex.dy.abs() < 1e-12);
    }
}
