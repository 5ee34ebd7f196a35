// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cholesky decomposition of symmetric positive definite matrices.

use crate::context;
use crate::error::LatticeError;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::linalg::blas::{solve_lower_triangular, solve_upper_triangular};
use crate::linalg::{check_matrix, square_error};

#[cold]
#[inline(never)]
fn cholesky_rhs_error(expected: usize, actual: usize) -> ! {
    panic!("lattix: {}", LatticeError::shape_mismatch(&[expected], &[actual]));
}

/// The Cholesky decomposition of a symmetric positive definite matrix:
/// `A = L·Lᵀ` with lower triangular `L`.
///
/// The factorization proceeds by columns and stops at the first
/// non-positive pivot; [`is_spd`] then answers `false` and [`solve`]
/// fails with `NotPositiveDefinite`.
///
/// [`is_spd`]: CholeskyDecomposition::is_spd
/// [`solve`]: CholeskyDecomposition::solve
pub struct CholeskyDecomposition {
    l: DoubleGrid2d,
    spd: bool,
}

impl CholeskyDecomposition {
    /// Decompose `a`; `a` itself is left untouched. Only the lower
    /// triangle of `a` is trusted; symmetry is verified against the
    /// upper triangle under the active tolerance.
    ///
    /// **Panics** if `a` is not square or has more than one channel.
    pub fn decompose(a: &DoubleGrid2d) -> Self {
        check_matrix(a);
        if !a.is_square() {
            square_error(a.rows(), a.cols());
        }
        let n = a.rows();
        let ctx = context::context();
        let src = a.to_vec();
        let mut l = vec![0.0; n * n];
        let mut spd = true;

        'columns: for j in 0..n {
            for k in 0..j {
                let mut s = 0.0;
                for i in 0..k {
                    s += l[j * n + i] * l[k * n + i];
                }
                l[j * n + k] = (src[j * n + k] - s) / l[k * n + k];
                if !ctx.equals(src[j * n + k], src[k * n + j]) {
                    spd = false;
                    break 'columns;
                }
            }
            let mut d = src[j * n + j];
            for k in 0..j {
                d -= l[j * n + k] * l[j * n + k];
            }
            if d <= ctx.epsilon() {
                spd = false;
                break;
            }
            l[j * n + j] = d.sqrt();
        }

        CholeskyDecomposition {
            l: DoubleGrid2d::from_dense(Extent2d::new(n, n), l),
            spd,
        }
    }

    /// The lower triangular factor. Meaningful only when [`is_spd`]
    /// answers `true`.
    ///
    /// [`is_spd`]: CholeskyDecomposition::is_spd
    pub fn l(&self) -> &DoubleGrid2d {
        &self.l
    }

    /// Whether the matrix proved symmetric positive definite.
    pub fn is_spd(&self) -> bool {
        self.spd
    }

    /// Solve `A·X = B` by a forward solve against `L` and a back solve
    /// against `Lᵀ` (a transposed view; no elements move).
    ///
    /// Fails with `NotPositiveDefinite` if the decomposition stopped
    /// early.
    ///
    /// **Panics** if `B` has the wrong row count.
    pub fn solve(&self, b: &DoubleGrid2d) -> Result<DoubleGrid2d, LatticeError> {
        check_matrix(b);
        if !self.spd {
            return Err(LatticeError::not_positive_definite());
        }
        if b.rows() != self.l.rows() {
            cholesky_rhs_error(self.l.rows(), b.rows());
        }
        let mut x = b.copy();
        solve_lower_triangular(&self.l, false, &mut x)?;
        solve_upper_triangular(&self.l.t(), &mut x)?;
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid2;
    use crate::linalg::general_mat_mul;
    use approx::assert_abs_diff_eq;

    #[test]
    fn the_classic_worked_example() {
        let a = grid2(&[
            [4.0, 12.0, -16.0],
            [12.0, 37.0, -43.0],
            [-16.0, -43.0, 98.0],
        ]);
        let chol = CholeskyDecomposition::decompose(&a);
        assert!(chol.is_spd());
        let expected = grid2(&[[2.0, 0.0, 0.0], [6.0, 1.0, 0.0], [-8.0, 5.0, 3.0]]);
        assert!(*chol.l() == expected);

        let x = chol.solve(&grid2(&[[1.0], [2.0], [3.0]])).unwrap();
        assert_abs_diff_eq!(x.get((0, 0)), 343.0 / 12.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x.get((1, 0)), -23.0 / 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x.get((2, 0)), 4.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn l_times_l_transposed_reproduces_the_matrix() {
        let a = grid2(&[[25.0, 15.0, -5.0], [15.0, 18.0, 0.0], [-5.0, 0.0, 11.0]]);
        let chol = CholeskyDecomposition::decompose(&a);
        assert!(chol.is_spd());
        let mut product = DoubleGrid2d::zeros(Extent2d::new(3, 3));
        general_mat_mul(1.0, chol.l(), &chol.l().t(), 0.0, &mut product);
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(product.get((i, j)), a.get((i, j)), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn indefinite_matrices_are_rejected() {
        let a = grid2(&[[1.0, 2.0], [2.0, 1.0]]);
        let chol = CholeskyDecomposition::decompose(&a);
        assert!(!chol.is_spd());
        assert!(chol.solve(&grid2(&[[1.0], [1.0]])).is_err());
    }

    #[test]
    fn asymmetry_is_rejected() {
        let a = grid2(&[[4.0, 1.0], [2.0, 4.0]]);
        assert!(!CholeskyDecomposition::decompose(&a).is_spd());
    }

    #[test]
    fn one_by_one_positive_matrix() {
        let a = grid2(&[[9.0]]);
        let chol = CholeskyDecomposition::decompose(&a);
        assert!(chol.is_spd());
        assert_eq!(chol.l().get((0, 0)), 3.0);
        assert_eq!(chol.solve(&grid2(&[[6.0]])).unwrap().get((0, 0)), 6.0 / 9.0);
    }
}
