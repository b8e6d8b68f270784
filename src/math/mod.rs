//! Member stiffness, member axes and small matrix helpers

pub mod band;
pub mod banded;

use nalgebra::{DMatrix, DVector, Matrix3, Matrix4, SMatrix, SVector, Vector3};

pub use band::BandMatrix;
pub use banded::{
    band_cholesky_solve, band_gauss_solve, solve, DiscrepancyPolicy, SingularPivot, Solution,
    SolveError, SolverOptions, SolverPath,
};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;

/// Full two-node member matrix, six components per end
pub type Mat12 = SMatrix<f64, 12, 12>;
pub type Vec12 = SVector<f64, 12>;

/// Lengths below this are treated as coincident nodes
pub const MIN_LENGTH: f64 = 1e-10;

/// Direction cosines below this count as zero when choosing member axes
const AXIS_TOL: f64 = 1e-10;

/// Stack local axes (as global vectors) into a rotation, one axis per row
fn axes_to_rotation(x: Vector3<f64>, y: Vector3<f64>, z: Vector3<f64>) -> Mat3 {
    Mat3::from_rows(&[x.transpose(), y.transpose(), z.transpose()])
}

/// Unit vector from `i_node` to `j_node`, `None` if they coincide
fn member_axis(i_node: Vector3<f64>, j_node: Vector3<f64>) -> Option<Vector3<f64>> {
    let span = j_node - i_node;
    let length = span.norm();
    (length >= MIN_LENGTH).then(|| span / length)
}

/// Member axes of a plane structure
///
/// Local z is global Z and local y is Z × x. The z coordinates are ignored.
pub fn plane_rotation(i_node: &[f64; 3], j_node: &[f64; 3]) -> Option<Mat3> {
    let x = member_axis(
        Vector3::new(i_node[0], i_node[1], 0.0),
        Vector3::new(j_node[0], j_node[1], 0.0),
    )?;
    let z = Vector3::<f64>::z();
    Some(axes_to_rotation(x, z.cross(&x), z))
}

/// Member axes in space, rolled by `rotation` radians about the member
///
/// Before the roll:
/// - a vertical member takes local z along global Z and local y along -X
///   when it points up, +X when it points down
/// - a horizontal member takes local y along global Y
/// - an inclined member keeps local z horizontal, with local y on the upper
///   side of the member
pub fn space_rotation(i_node: &[f64; 3], j_node: &[f64; 3], rotation: f64) -> Option<Mat3> {
    let x = member_axis(Vector3::from(*i_node), Vector3::from(*j_node))?;

    let (y, z) = if x.x.abs() < AXIS_TOL && x.z.abs() < AXIS_TOL {
        let y = if x.y > 0.0 { -Vector3::<f64>::x() } else { Vector3::x() };
        (y, Vector3::z())
    } else if x.y.abs() < AXIS_TOL {
        let y = Vector3::<f64>::y();
        (y, x.cross(&y).normalize())
    } else {
        let plan = Vector3::new(x.x, 0.0, x.z);
        let z = if x.y > 0.0 { plan.cross(&x) } else { x.cross(&plan) };
        let z = z.normalize();
        (z.cross(&x).normalize(), z)
    };

    let (sin, cos) = rotation.sin_cos();
    let rolled_y = y * cos + z * sin;
    let rolled_z = z * cos - y * sin;
    Some(axes_to_rotation(x, rolled_y, rolled_z))
}

/// Member transformation: `r` repeated down the diagonal for the
/// translations and rotations of each end
pub fn transformation_from_rotation(r: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for start in (0..12).step_by(3) {
        t.fixed_view_mut::<3, 3>(start, start).copy_from(r);
    }
    t
}

/// Two equal and opposite springs of stiffness `k` between `a` and `b`
fn add_spring(m: &mut Mat12, a: usize, b: usize, k: f64) {
    m[(a, a)] += k;
    m[(b, b)] += k;
    m[(a, b)] -= k;
    m[(b, a)] -= k;
}

/// Euler-Bernoulli bending in one plane
///
/// `dofs` are `[v_i, theta_i, v_j, theta_j]`. `sense` is +1 when a positive
/// rotation lifts the member toward +v and -1 when it lowers it, which flips
/// the sign of every translation-rotation coupling term.
fn add_bending(m: &mut Mat12, dofs: [usize; 4], ei: f64, l: f64, sense: f64) {
    #[rustfmt::skip]
    let beam = Matrix4::new(
        12.0,      6.0 * l,     -12.0,      6.0 * l,
        6.0 * l,   4.0 * l * l, -6.0 * l,   2.0 * l * l,
        -12.0,     -6.0 * l,    12.0,       -6.0 * l,
        6.0 * l,   2.0 * l * l, -6.0 * l,   4.0 * l * l,
    ) * (ei / l.powi(3));

    for (r, &row) in dofs.iter().enumerate() {
        for (c, &col) in dofs.iter().enumerate() {
            let coupling = (r + c) % 2 == 1;
            let sign = if coupling { sense } else { 1.0 };
            m[(row, col)] += sign * beam[(r, c)];
        }
    }
}

/// Local stiffness of a prismatic space frame member
///
/// Component order is `[DX, DY, DZ, RX, RY, RZ]` at the i-node followed by
/// the same at the j-node. Passing zero for `iy`, `iz` or `j` drops the
/// matching action, which is how trusses, plane frames and grids reuse it.
pub fn member_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    iy: f64,
    iz: f64,
    j: f64,
    length: f64,
) -> Mat12 {
    let mut k = Mat12::zeros();
    add_spring(&mut k, 0, 6, e * a / length);
    add_spring(&mut k, 3, 9, g * j / length);
    // Bending in the local xy plane: DY with RZ
    add_bending(&mut k, [1, 5, 7, 11], e * iz, length, 1.0);
    // Bending in the local xz plane: DZ with RY
    add_bending(&mut k, [2, 4, 8, 10], e * iy, length, -1.0);
    k
}

/// Condense released components out of a member stiffness
///
/// The kept block becomes `k_kk - k_kr k_rr⁻¹ k_rk`. Released rows and
/// columns come back as zeros. A singular released block leaves the matrix
/// unchanged.
pub fn apply_releases(k: &Mat12, releases: &[bool; 12]) -> Mat12 {
    let (freed, kept): (std::vec::Vec<usize>, std::vec::Vec<usize>) =
        (0..12).partition(|&dof| releases[dof]);
    if freed.is_empty() {
        return *k;
    }

    let Some(k_rr_inv) = sub_block(k, &freed, &freed).try_inverse() else {
        return *k;
    };
    let condensed = sub_block(k, &kept, &kept)
        - sub_block(k, &kept, &freed) * k_rr_inv * sub_block(k, &freed, &kept);

    let mut position = [None; 12];
    for (p, &dof) in kept.iter().enumerate() {
        position[dof] = Some(p);
    }
    Mat12::from_fn(|r, c| match (position[r], position[c]) {
        (Some(pr), Some(pc)) => condensed[(pr, pc)],
        _ => 0.0,
    })
}

fn sub_block(m: &Mat12, rows: &[usize], cols: &[usize]) -> Mat {
    Mat::from_fn(rows.len(), cols.len(), |r, c| m[(rows[r], cols[c])])
}

/// Extract the rows and columns `dofs` of a 12x12 matrix
pub fn select_dofs(m: &Mat12, dofs: &[usize]) -> Mat {
    sub_block(m, dofs, dofs)
}

/// Whether a square matrix is symmetric to a relative tolerance
pub fn is_symmetric(m: &Mat, tol: f64) -> bool {
    let scale = m.amax().max(f64::MIN_POSITIVE);
    (0..m.nrows()).all(|i| (0..i).all(|j| (m[(i, j)] - m[(j, i)]).abs() <= tol * scale))
}
