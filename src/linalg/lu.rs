// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! LU decomposition with partial pivoting.

use crate::context;
use crate::error::LatticeError;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::linalg::blas::{permute_rows, solve_lower_triangular, solve_upper_triangular};
use crate::linalg::{check_matrix, square_error};

#[cold]
#[inline(never)]
fn lu_rhs_error(expected: usize, actual: usize) -> ! {
    panic!("lattix: {}", LatticeError::shape_mismatch(&[expected], &[actual]));
}

/// The LU decomposition of an `m`×`n` matrix: `P·A = L·U` with unit
/// lower triangular `L`, upper triangular `U` and a row pivot
/// sequence `P`.
///
/// The decomposition always completes; a zero pivot under the active
/// tolerance marks the result singular, and only [`solve`] fails on it.
///
/// [`solve`]: LuDecomposition::solve
pub struct LuDecomposition {
    lu: DoubleGrid2d,
    piv: Vec<usize>,
    pivsign: f64,
    singular: bool,
}

impl LuDecomposition {
    /// Decompose a copy of `a`; `a` itself is left untouched.
    ///
    /// **Panics** if `a` has more than one channel.
    pub fn decompose(a: &DoubleGrid2d) -> Self {
        check_matrix(a);
        let m = a.rows();
        let n = a.cols();
        let ctx = context::context();
        let mut lu = a.to_vec();
        let mut piv = Vec::with_capacity(m.min(n));
        let mut pivsign = 1.0;
        let mut singular = false;

        for k in 0..m.min(n) {
            // pivot: the largest magnitude in column k at or below the
            // diagonal
            let mut p = k;
            for i in k + 1..m {
                if lu[i * n + k].abs() > lu[p * n + k].abs() {
                    p = i;
                }
            }
            piv.push(p);
            if p != k {
                for j in 0..n {
                    lu.swap(k * n + j, p * n + j);
                }
                pivsign = -pivsign;
            }

            let pivot = lu[k * n + k];
            if ctx.is_zero(pivot) {
                // leave the column unscaled so the factors stay
                // inspectable; solve refuses later
                singular = true;
                continue;
            }
            for i in k + 1..m {
                lu[i * n + k] /= pivot;
            }
            for i in k + 1..m {
                let factor = lu[i * n + k];
                for j in k + 1..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        LuDecomposition {
            lu: DoubleGrid2d::from_dense(Extent2d::new(m, n), lu),
            piv,
            pivsign,
            singular,
        }
    }

    /// The packed factors: `L` below the diagonal, `U` at and above.
    pub fn packed(&self) -> &DoubleGrid2d {
        &self.lu
    }

    /// The unit lower triangular factor, `m`×`min(m, n)`.
    pub fn l(&self) -> DoubleGrid2d {
        let m = self.lu.rows();
        let k = m.min(self.lu.cols());
        let mut l = DoubleGrid2d::zeros(Extent2d::new(m, k));
        for i in 0..m {
            for j in 0..k.min(i + 1) {
                l.set((i, j), if i == j { 1.0 } else { self.lu.get((i, j)) });
            }
        }
        l
    }

    /// The upper triangular factor, `min(m, n)`×`n`.
    pub fn u(&self) -> DoubleGrid2d {
        let n = self.lu.cols();
        let k = n.min(self.lu.rows());
        let mut u = DoubleGrid2d::zeros(Extent2d::new(k, n));
        for i in 0..k {
            for j in i..n {
                u.set((i, j), self.lu.get((i, j)));
            }
        }
        u
    }

    /// The pivot sequence: at step `k`, rows `k` and `piv[k]` were
    /// exchanged.
    pub fn pivot(&self) -> &[usize] {
        &self.piv
    }

    /// Whether a pivot was zero under the active tolerance.
    pub fn is_singular(&self) -> bool {
        self.singular
    }

    /// The determinant, `±Π U[k,k]` with the sign of the pivot parity.
    ///
    /// **Panics** if the matrix is not square.
    pub fn det(&self) -> f64 {
        if !self.lu.is_square() {
            square_error(self.lu.rows(), self.lu.cols());
        }
        let mut det = self.pivsign;
        for k in 0..self.lu.rows() {
            det *= self.lu.get((k, k));
        }
        det
    }

    /// Solve `A·X = B`: permute `B` by the pivot sequence, forward
    /// solve the unit lower factor, back solve the upper factor.
    ///
    /// Fails with `Singular` if the decomposition found a zero pivot.
    ///
    /// **Panics** if the matrix is not square or `B` has the wrong row
    /// count.
    pub fn solve(&self, b: &DoubleGrid2d) -> Result<DoubleGrid2d, LatticeError> {
        check_matrix(b);
        if !self.lu.is_square() {
            square_error(self.lu.rows(), self.lu.cols());
        }
        let n = self.lu.rows();
        if b.rows() != n {
            lu_rhs_error(n, b.rows());
        }
        if self.singular {
            return Err(LatticeError::singular());
        }
        let mut x = b.copy();
        permute_rows(&mut x, &self.piv);
        solve_lower_triangular(&self.lu, true, &mut x)?;
        solve_upper_triangular(&self.lu, &mut x)?;
        Ok(x)
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
    fn factors_reproduce_the_permuted_matrix() {
        let a = grid2(&[
            [2.0, 1.0, 1.0],
            [4.0, -6.0, 0.0],
            [-2.0, 7.0, 2.0],
        ]);
        let lu = LuDecomposition::decompose(&a);
        let mut pa = a.copy();
        permute_rows(&mut pa, lu.pivot());
        let mut product = DoubleGrid2d::zeros(Extent2d::new(3, 3));
        general_mat_mul(1.0, &lu.l(), &lu.u(), 0.0, &mut product);
        assert_matrix_close(&pa, &product, 1e-12);
        assert!(!lu.is_singular());
    }

    #[test]
    fn determinant_tracks_pivot_parity() {
        let a = grid2(&[[0.0, 1.0], [1.0, 0.0]]);
        assert_abs_diff_eq!(LuDecomposition::decompose(&a).det(), -1.0);
        let b = grid2(&[[3.0, 0.0], [0.0, 2.0]]);
        assert_abs_diff_eq!(LuDecomposition::decompose(&b).det(), 6.0);
    }

    #[test]
    fn solve_recovers_the_right_hand_side() {
        let a = grid2(&[[4.0, 3.0], [6.0, 3.0]]);
        let b = grid2(&[[10.0], [12.0]]);
        let x = LuDecomposition::decompose(&a).solve(&b).unwrap();
        assert_abs_diff_eq!(x.get((0, 0)), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get((1, 0)), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_matrices_are_flagged_and_refuse_solving() {
        let a = grid2(&[[1.0, 2.0], [2.0, 4.0]]);
        let lu = LuDecomposition::decompose(&a);
        assert!(lu.is_singular());
        assert_eq!(lu.det(), 0.0);
        let b = grid2(&[[1.0], [1.0]]);
        assert!(lu.solve(&b).is_err());
    }

    #[test]
    fn one_by_one_matrix() {
        let a = grid2(&[[5.0]]);
        let lu = LuDecomposition::decompose(&a);
        assert_eq!(lu.det(), 5.0);
        assert_eq!(lu.l().get((0, 0)), 1.0);
        assert_eq!(lu.u().get((0, 0)), 5.0);
        let x = lu.solve(&grid2(&[[10.0]])).unwrap();
        assert_eq!(x.get((0, 0)), 2.0);
    }
}
