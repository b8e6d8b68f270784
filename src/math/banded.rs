//! Banded symmetric solvers
//!
//! [`band_gauss_solve`] is the production path: Gaussian elimination that
//! only ever touches the stored lower band. [`band_cholesky_solve`] is the
//! reference `L L^T` solve it is cross-checked against by [`solve`].

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{BandMatrix, Vec};

/// Pivot that failed the singularity test during elimination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingularPivot {
    /// Global DOF at which elimination stopped
    pub dof: usize,
    pub pivot: f64,
}

/// Failure of [`solve`], mapped onto model context by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveError {
    Singular(SingularPivot),
    Discrepancy { deviation: f64, tolerance: f64 },
}

/// What to do when the banded solve disagrees with the reference solve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyPolicy {
    /// Log a warning and continue with the reference solution
    #[default]
    Substitute,
    /// Abort the run with a numerical error
    Fail,
}

/// Which solve produced the accepted displacements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverPath {
    Banded,
    ReferenceFallback,
}

impl std::fmt::Display for SolverPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Banded => write!(f, "banded Gauss elimination"),
            Self::ReferenceFallback => write!(f, "reference banded Cholesky (fallback)"),
        }
    }
}

/// Solver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Run the reference solve and compare
    pub cross_check: bool,
    /// Allowed deviation relative to the largest reference displacement
    pub tolerance: f64,
    /// Pivots at or below this fraction of their row's original diagonal
    /// are singular
    pub singular_tolerance: f64,
    pub on_discrepancy: DiscrepancyPolicy,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            cross_check: true,
            tolerance: 1e-6,
            singular_tolerance: 1e-12,
            on_discrepancy: DiscrepancyPolicy::Substitute,
        }
    }
}

impl SolverOptions {
    pub fn with_cross_check(mut self, enabled: bool) -> Self {
        self.cross_check = enabled;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_singular_tolerance(mut self, tolerance: f64) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    pub fn with_policy(mut self, policy: DiscrepancyPolicy) -> Self {
        self.on_discrepancy = policy;
        self
    }
}

/// Accepted displacement vector and how it was obtained
#[derive(Debug, Clone)]
pub struct Solution {
    pub displacements: Vec,
    pub path: SolverPath,
    /// Relative deviation between the two solves, when both ran
    pub deviation: Option<f64>,
}

/// Per-row singularity thresholds, scaled by each row's own diagonal
fn pivot_thresholds(band: &BandMatrix, singular_tolerance: f64) -> Vec {
    band.diagonal().abs() * singular_tolerance
}

/// Solve `K x = f` in place by symmetric banded Gaussian elimination
///
/// On success `band` holds the eliminated factors and `rhs` the solution.
/// Cost is O(n b^2) for order n and half-bandwidth b.
pub fn band_gauss_solve(
    band: &mut BandMatrix,
    rhs: &mut Vec,
    singular_tolerance: f64,
) -> Result<(), SingularPivot> {
    let n = band.size();
    let b = band.half_bandwidth();
    let thresholds = pivot_thresholds(band, singular_tolerance);
    let a = band.storage_mut();

    // Forward elimination. Column k below the diagonal is left intact and
    // reused as the upper triangle during back substitution.
    for k in 0..n {
        let pivot = a[(0, k)];
        if !pivot.is_finite() || pivot <= thresholds[k] {
            return Err(SingularPivot { dof: k, pivot });
        }
        let last = (k + b).min(n - 1);
        for i in k + 1..=last {
            let aik = a[(i - k, k)];
            if aik == 0.0 {
                continue;
            }
            let factor = aik / pivot;
            for j in k + 1..=i {
                let ajk = a[(j - k, k)];
                a[(i - j, j)] -= factor * ajk;
            }
            rhs[i] -= factor * rhs[k];
        }
    }

    // Back substitution
    for k in (0..n).rev() {
        let last = (k + b).min(n - 1);
        let mut sum = rhs[k];
        for j in k + 1..=last {
            sum -= a[(j - k, k)] * rhs[j];
        }
        rhs[k] = sum / a[(0, k)];
    }

    Ok(())
}

/// Reference solve by banded Cholesky factorization `K = L L^T`
///
/// Works on a copy; the inputs are left untouched.
pub fn band_cholesky_solve(
    band: &BandMatrix,
    rhs: &Vec,
    singular_tolerance: f64,
) -> Result<Vec, SingularPivot> {
    let n = band.size();
    let b = band.half_bandwidth();
    let thresholds = pivot_thresholds(band, singular_tolerance);
    let mut l = band.storage().clone();

    for j in 0..n {
        let first = j.saturating_sub(b);
        let mut d = l[(0, j)];
        for k in first..j {
            d -= l[(j - k, k)].powi(2);
        }
        if !d.is_finite() || d <= thresholds[j] {
            return Err(SingularPivot { dof: j, pivot: d });
        }
        let ljj = d.sqrt();
        l[(0, j)] = ljj;

        for i in j + 1..=(j + b).min(n - 1) {
            let mut s = l[(i - j, j)];
            for k in i.saturating_sub(b)..j {
                s -= l[(i - k, k)] * l[(j - k, k)];
            }
            l[(i - j, j)] = s / ljj;
        }
    }

    // L y = f
    let mut x = rhs.clone();
    for i in 0..n {
        let mut s = x[i];
        for k in i.saturating_sub(b)..i {
            s -= l[(i - k, k)] * x[k];
        }
        x[i] = s / l[(0, i)];
    }
    // L^T x = y
    for i in (0..n).rev() {
        let mut s = x[i];
        for k in i + 1..=(i + b).min(n.saturating_sub(1)) {
            s -= l[(k - i, i)] * x[k];
        }
        x[i] = s / l[(0, i)];
    }

    Ok(x)
}

/// Largest absolute difference relative to the reference magnitude
pub fn relative_deviation(x: &Vec, reference: &Vec) -> f64 {
    let scale = reference.amax().max(f64::MIN_POSITIVE);
    (x - reference).amax() / scale
}

/// Solve the reduced system, cross-checking against the reference solve
///
/// Consumes the band and load vector since elimination overwrites them.
pub fn solve(
    mut band: BandMatrix,
    mut rhs: Vec,
    options: &SolverOptions,
) -> Result<Solution, SolveError> {
    if !options.cross_check {
        band_gauss_solve(&mut band, &mut rhs, options.singular_tolerance)
            .map_err(SolveError::Singular)?;
        return Ok(Solution {
            displacements: rhs,
            path: SolverPath::Banded,
            deviation: None,
        });
    }

    let reference = band_cholesky_solve(&band, &rhs, options.singular_tolerance);
    let custom = band_gauss_solve(&mut band, &mut rhs, options.singular_tolerance);
    settle(custom.map(|()| rhs), reference, options)
}

/// Pick the accepted solution from the outcomes of both solves
fn settle(
    custom: Result<Vec, SingularPivot>,
    reference: Result<Vec, SingularPivot>,
    options: &SolverOptions,
) -> Result<Solution, SolveError> {
    match (custom, reference) {
        (_, Err(pivot)) => Err(SolveError::Singular(pivot)),
        (Err(pivot), Ok(reference)) => {
            warn!(
                "Banded elimination failed at DOF {} (pivot {:e}) but reference solve succeeded",
                pivot.dof, pivot.pivot
            );
            match options.on_discrepancy {
                DiscrepancyPolicy::Substitute => Ok(Solution {
                    displacements: reference,
                    path: SolverPath::ReferenceFallback,
                    deviation: None,
                }),
                DiscrepancyPolicy::Fail => Err(SolveError::Singular(pivot)),
            }
        }
        (Ok(banded), Ok(reference)) => reconcile(banded, reference, options),
    }
}

/// Accept the banded result or fall back to the reference per policy
pub fn reconcile(
    banded: Vec,
    reference: Vec,
    options: &SolverOptions,
) -> Result<Solution, SolveError> {
    let deviation = relative_deviation(&banded, &reference);
    if deviation <= options.tolerance {
        debug!("Banded solve agrees with reference (deviation {deviation:.3e})");
        return Ok(Solution {
            displacements: banded,
            path: SolverPath::Banded,
            deviation: Some(deviation),
        });
    }

    match options.on_discrepancy {
        DiscrepancyPolicy::Substitute => {
            warn!(
                "Banded solve deviates from reference by {:.3e} (tolerance {:.1e}); using reference solution",
                deviation, options.tolerance
            );
            Ok(Solution {
                displacements: reference,
                path: SolverPath::ReferenceFallback,
                deviation: Some(deviation),
            })
        }
        DiscrepancyPolicy::Fail => Err(SolveError::Discrepancy {
            deviation,
            tolerance: options.tolerance,
        }),
    }
}
