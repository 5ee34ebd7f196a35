// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Matrix algebra façade: solving, inversion, norms and derived
//! quantities, dispatching on shape to the right factorization.

use crate::error::LatticeError;
use crate::grid::DoubleGrid2d;
use crate::linalg::check_matrix;
use crate::linalg::lu::LuDecomposition;
use crate::linalg::qr::QrDecomposition;
use crate::linalg::svd::SvdDecomposition;
use crate::numeric_util;

/// Solve `A·X = B`: LU for square `A`, QR least squares otherwise.
///
/// Fails with `Singular` if `A` is singular or rank deficient under
/// the active tolerance.
///
/// **Panics** if `A` is wide (fewer rows than columns); the QR least
/// squares path requires `m ≥ n`.
pub fn solve(a: &DoubleGrid2d, b: &DoubleGrid2d) -> Result<DoubleGrid2d, LatticeError> {
    if a.is_square() {
        LuDecomposition::decompose(a).solve(b)
    } else {
        QrDecomposition::decompose(a).solve(b)
    }
}

/// The inverse of a square `A`, or the least squares pseudo-solution
/// of `A·X = I` when `A` is tall.
///
/// Fails with `Singular` if `A` is singular or rank deficient.
///
/// **Panics** if `A` is wide (fewer rows than columns), as for
/// [`solve`].
pub fn inverse(a: &DoubleGrid2d) -> Result<DoubleGrid2d, LatticeError> {
    solve(a, &DoubleGrid2d::eye(a.rows()))
}

/// The determinant, via LU.
///
/// **Panics** if `a` is not square.
pub fn det(a: &DoubleGrid2d) -> f64 {
    LuDecomposition::decompose(a).det()
}

/// Effective rank: the count of singular values above
/// `max(m, n) · σ_max · ε_machine`.
///
/// Fails with `NoConvergence` if the SVD iteration cap is exceeded.
pub fn rank(a: &DoubleGrid2d) -> Result<usize, LatticeError> {
    Ok(SvdDecomposition::decompose(a)?.rank())
}

/// The 2-norm condition number, `σ_max / σ_min`.
///
/// Fails with `NoConvergence` if the SVD iteration cap is exceeded.
pub fn cond(a: &DoubleGrid2d) -> Result<f64, LatticeError> {
    Ok(SvdDecomposition::decompose(a)?.cond())
}

/// Maximum absolute column sum.
pub fn norm1(a: &DoubleGrid2d) -> f64 {
    check_matrix(a);
    let mut norm = 0.0f64;
    for j in 0..a.cols() {
        let mut sum = 0.0;
        for i in 0..a.rows() {
            sum += a.get((i, j)).abs();
        }
        norm = norm.max(sum);
    }
    norm
}

/// Maximum absolute row sum.
pub fn norm_inf(a: &DoubleGrid2d) -> f64 {
    check_matrix(a);
    let mut norm = 0.0f64;
    for i in 0..a.rows() {
        let mut sum = 0.0;
        for j in 0..a.cols() {
            sum += a.get((i, j)).abs();
        }
        norm = norm.max(sum);
    }
    norm
}

/// The Frobenius norm, `sqrt(Σ |A[i,j]|²)`. Contiguous matrices take
/// an unrolled sum-of-squares pass; views fall back to a
/// hypot-accumulated walk.
pub fn norm_f(a: &DoubleGrid2d) -> f64 {
    check_matrix(a);
    if a.structure().is_contiguous() {
        let start = a.structure().layout().start() as usize;
        let buf = a.storage().borrow();
        let xs = &buf[start..start + a.size()];
        return numeric_util::unrolled_dot(xs, xs).sqrt();
    }
    let mut norm = 0.0f64;
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            norm = norm.hypot(a.get((i, j)));
        }
    }
    norm
}

/// The spectral norm, `σ_max`.
///
/// Fails with `NoConvergence` if the SVD iteration cap is exceeded.
pub fn norm2(a: &DoubleGrid2d) -> Result<f64, LatticeError> {
    Ok(SvdDecomposition::decompose(a)?.norm2())
}

/// The trace: the diagonal sum up to `min(rows, cols)`.
pub fn trace(a: &DoubleGrid2d) -> f64 {
    check_matrix(a);
    let mut sum = 0.0;
    for i in 0..a.rows().min(a.cols()) {
        sum += a.get((i, i));
    }
    sum
}
