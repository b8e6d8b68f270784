//! Symmetric band storage

use super::{Mat, Vec};

/// Symmetric matrix stored as its lower band
///
/// The storage is a `(half_bandwidth + 1) x n` array where
/// `band[(i - j, j)] = K[i][j]` for `0 <= i - j <= half_bandwidth`. Row 0 of
/// the storage is the diagonal. Entries outside the band are zero by
/// construction and cannot be written.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMatrix {
    band: Mat,
}

impl BandMatrix {
    /// An all-zero `n x n` matrix with the given half-bandwidth
    pub fn zeros(n: usize, half_bandwidth: usize) -> Self {
        Self {
            band: Mat::zeros(half_bandwidth + 1, n),
        }
    }

    /// Band of a dense symmetric matrix; entries beyond the band are dropped
    pub fn from_dense(m: &Mat, half_bandwidth: usize) -> Self {
        let n = m.nrows();
        let mut band = Mat::zeros(half_bandwidth + 1, n);
        for j in 0..n {
            for d in 0..=half_bandwidth.min(n - 1 - j) {
                band[(d, j)] = m[(j + d, j)];
            }
        }
        Self { band }
    }

    /// Matrix order
    pub fn size(&self) -> usize {
        self.band.ncols()
    }

    pub fn half_bandwidth(&self) -> usize {
        self.band.nrows() - 1
    }

    /// Raw lower-band storage
    pub fn storage(&self) -> &Mat {
        &self.band
    }

    pub(crate) fn storage_mut(&mut self) -> &mut Mat {
        &mut self.band
    }

    /// Whether (i, j) lies inside the stored band
    pub fn in_band(&self, i: usize, j: usize) -> bool {
        i.abs_diff(j) <= self.half_bandwidth() && i.max(j) < self.size()
    }

    /// Entry (i, j) of the full symmetric matrix
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (row, col) = if i >= j { (i, j) } else { (j, i) };
        if self.in_band(row, col) {
            self.band[(row - col, col)]
        } else {
            0.0
        }
    }

    /// Mutable access to entry (i, j) and its mirror; `None` outside the band
    pub fn entry_mut(&mut self, i: usize, j: usize) -> Option<&mut f64> {
        let (row, col) = if i >= j { (i, j) } else { (j, i) };
        if self.in_band(row, col) {
            Some(&mut self.band[(row - col, col)])
        } else {
            None
        }
    }

    /// Copy of the diagonal
    pub fn diagonal(&self) -> Vec {
        self.band.row(0).transpose()
    }

    /// Product with a vector, touching only the band
    pub fn mul_vec(&self, x: &Vec) -> Vec {
        let n = self.size();
        let b = self.half_bandwidth();
        let mut y = Vec::zeros(n);
        for j in 0..n {
            y[j] += self.band[(0, j)] * x[j];
            for d in 1..=b.min(n - 1 - j) {
                let k = self.band[(d, j)];
                if k != 0.0 {
                    // K[j + d][j] and its mirror K[j][j + d]
                    y[j + d] += k * x[j];
                    y[j] += k * x[j + d];
                }
            }
        }
        y
    }

    /// Expand to a dense symmetric matrix
    pub fn to_dense(&self) -> Mat {
        let n = self.size();
        Mat::from_fn(n, n, |i, j| self.get(i, j))
    }
}
