// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! QR decomposition by Householder reflections.

use crate::context;
use crate::error::LatticeError;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::linalg::check_matrix;

#[cold]
#[inline(never)]
fn qr_rhs_error(expected: usize, actual: usize) -> ! {
    panic!("lattix: {}", LatticeError::shape_mismatch(&[expected], &[actual]));
}

#[cold]
#[inline(never)]
fn qr_tall_error(m: usize, n: usize) -> ! {
    panic!("lattix: least squares requires at least as many rows as columns, got {} × {}", m, n);
}

/// The QR decomposition of an `m`×`n` matrix with `m ≥ n`: `A = Q·R`
/// with orthogonal `Q` and upper triangular `R`.
///
/// The Householder vectors are stored below the diagonal of the packed
/// matrix with the diagonal of `R` held separately, so `Q` and `R` can
/// be produced on demand without recomputation.
pub struct QrDecomposition {
    qr: Vec<f64>,
    rdiag: Vec<f64>,
    m: usize,
    n: usize,
}

impl QrDecomposition {
    /// Decompose a copy of `a`; `a` itself is left untouched.
    ///
    /// **Panics** if `a` has more than one channel.
    pub fn decompose(a: &DoubleGrid2d) -> Self {
        check_matrix(a);
        let m = a.rows();
        let n = a.cols();
        let mut qr = a.to_vec();
        let mut rdiag = vec![0.0; n];

        for k in 0..n {
            // 2-norm of column k below the diagonal, hypot-accumulated
            // to dodge overflow
            let mut nrm: f64 = 0.0;
            for i in k..m {
                nrm = nrm.hypot(qr[i * n + k]);
            }
            if nrm != 0.0 {
                if qr[k * n + k] < 0.0 {
                    nrm = -nrm;
                }
                for i in k..m {
                    qr[i * n + k] /= nrm;
                }
                qr[k * n + k] += 1.0;

                // apply the reflector to the trailing columns
                for j in k + 1..n {
                    let mut s = 0.0;
                    for i in k..m {
                        s += qr[i * n + k] * qr[i * n + j];
                    }
                    s = -s / qr[k * n + k];
                    for i in k..m {
                        qr[i * n + j] += s * qr[i * n + k];
                    }
                }
            }
            rdiag[k] = -nrm;
        }

        QrDecomposition { qr, rdiag, m, n }
    }

    /// Whether every diagonal of `R` is nonzero under the active
    /// tolerance.
    pub fn has_full_rank(&self) -> bool {
        let ctx = context::context();
        self.rdiag.iter().all(|&d| !ctx.is_zero(d))
    }

    /// The diagonal of `R`.
    pub fn r_diagonal(&self) -> &[f64] {
        &self.rdiag
    }

    /// The compact packed form: Householder vectors below the
    /// diagonal, the rest of `R` at and above it.
    pub fn packed(&self) -> DoubleGrid2d {
        DoubleGrid2d::from_dense(Extent2d::new(self.m, self.n), self.qr.clone())
    }

    /// The Householder vectors as a lower trapezoidal matrix.
    pub fn householder_vectors(&self) -> DoubleGrid2d {
        let mut h = DoubleGrid2d::zeros(Extent2d::new(self.m, self.n));
        for i in 0..self.m {
            for j in 0..self.n.min(i + 1) {
                h.set((i, j), self.qr[i * self.n + j]);
            }
        }
        h
    }

    /// The upper triangular factor `R`, `n`×`n`.
    pub fn r(&self) -> DoubleGrid2d {
        let n = self.n;
        let mut r = DoubleGrid2d::zeros(Extent2d::new(n, n));
        for i in 0..n {
            r.set((i, i), self.rdiag[i]);
            for j in i + 1..n {
                r.set((i, j), self.qr[i * n + j]);
            }
        }
        r
    }

    /// The orthogonal factor `Q`, `m`×`n`, built by applying the
    /// reflectors to the identity from the last to the first.
    pub fn q(&self) -> DoubleGrid2d {
        let (m, n) = (self.m, self.n);
        let mut q = vec![0.0; m * n];
        for k in (0..n).rev() {
            for i in 0..m {
                q[i * n + k] = 0.0;
            }
            if k < m {
                q[k * n + k] = 1.0;
            }
            for j in k..n {
                if self.qr[k * n + k] != 0.0 {
                    let mut s = 0.0;
                    for i in k..m {
                        s += self.qr[i * n + k] * q[i * n + j];
                    }
                    s = -s / self.qr[k * n + k];
                    for i in k..m {
                        q[i * n + j] += s * self.qr[i * n + k];
                    }
                }
            }
        }
        DoubleGrid2d::from_dense(Extent2d::new(m, n), q)
    }

    /// Least squares solution of `A·X = B`: apply `Qᵀ` to `B`, then
    /// back solve `R`. Returns the `n`×`p` solution minimizing
    /// `‖A·X − B‖₂` columnwise.
    ///
    /// Fails with `Singular` if `R` is rank deficient under the active
    /// tolerance.
    ///
    /// **Panics** if `B` has the wrong row count or the matrix has
    /// fewer rows than columns.
    pub fn solve(&self, b: &DoubleGrid2d) -> Result<DoubleGrid2d, LatticeError> {
        check_matrix(b);
        let (m, n) = (self.m, self.n);
        if m < n {
            qr_tall_error(m, n);
        }
        if b.rows() != m {
            qr_rhs_error(m, b.rows());
        }
        if !self.has_full_rank() {
            return Err(LatticeError::singular());
        }
        let p = b.cols();
        let mut x = b.to_vec();

        // x ← Qᵀ·x, one reflector at a time
        for k in 0..n {
            for j in 0..p {
                let mut s = 0.0;
                for i in k..m {
                    s += self.qr[i * n + k] * x[i * p + j];
                }
                s = -s / self.qr[k * n + k];
                for i in k..m {
                    x[i * p + j] += s * self.qr[i * n + k];
                }
            }
        }
        // back solve R against the leading n rows
        for k in (0..n).rev() {
            for j in 0..p {
                x[k * p + j] /= self.rdiag[k];
            }
            for i in 0..k {
                let factor = self.qr[i * n + k];
                for j in 0..p {
                    let t = x[k * p + j];
                    x[i * p + j] -= t * factor;
                }
            }
        }

        let mut solution = DoubleGrid2d::zeros(Extent2d::new(n, p));
        for i in 0..n {
            for j in 0..p {
                solution.set((i, j), x[i * p + j]);
            }
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid2;
    use crate::linalg::general_mat_mul;
    use approx::assert_abs_diff_eq;

    fn assert_matrix_close(a: &DoubleGrid2d, b: &DoubleGrid2d, tol: f64) {
        assert_eq!((a.rows(), a.cols()), (b.rows(), b.cols()));
        for i in 0..a.rows() {
            for j in 0..a.cols() {
                assert_abs_diff_eq!(a.get((i, j)), b.get((i, j)), epsilon = tol);
            }
        }
    }

    #[test]
    fn q_times_r_reproduces_the_matrix() {
        let a = grid2(&[
            [12.0, -51.0, 4.0],
            [6.0, 167.0, -68.0],
            [-4.0, 24.0, -41.0],
            [-1.0, 1.0, 0.0],
        ]);
        let qr = QrDecomposition::decompose(&a);
        assert!(qr.has_full_rank());
        let mut product = DoubleGrid2d::zeros(Extent2d::new(4, 3));
        general_mat_mul(1.0, &qr.q(), &qr.r(), 0.0, &mut product);
        assert_matrix_close(&a, &product, 1e-10);
    }

    #[test]
    fn q_has_orthonormal_columns() {
        let a = grid2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let q = QrDecomposition::decompose(&a).q();
        let gram = q.mult(&q, None, 1.0, 0.0, true, false);
        assert_matrix_close(&gram, &DoubleGrid2d::eye(2), 1e-12);
    }

    #[test]
    fn square_solve_matches_direct_elimination() {
        let a = grid2(&[[2.0, 1.0], [1.0, 3.0]]);
        let b = grid2(&[[3.0], [5.0]]);
        let x = QrDecomposition::decompose(&a).solve(&b).unwrap();
        // 2x + y = 3, x + 3y = 5 → x = 4/5, y = 7/5
        assert_abs_diff_eq!(x.get((0, 0)), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get((1, 0)), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn overdetermined_solve_minimizes_the_residual() {
        // fit y = c0 + c1·t through (0,1), (1,2), (2,2), (3,3)
        let a = grid2(&[[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]]);
        let b = grid2(&[[1.0], [2.0], [2.0], [3.0]]);
        let x = QrDecomposition::decompose(&a).solve(&b).unwrap();
        assert_abs_diff_eq!(x.get((0, 0)), 1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get((1, 0)), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn rank_deficiency_is_detected() {
        let a = grid2(&[[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
        let qr = QrDecomposition::decompose(&a);
        assert!(!qr.has_full_rank());
        assert!(qr.solve(&grid2(&[[1.0], [1.0], [1.0]])).is_err());
    }
}
