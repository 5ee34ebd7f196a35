// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Singular value decomposition.
//!
//! Householder bidiagonalization followed by implicit-shift QR sweeps
//! with deflation (LINPACK lineage). Singular values come out
//! non-negative and descending. Wide matrices are decomposed through
//! their transpose with `U` and `V` swapped.

use crate::error::LatticeError;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::linalg::check_matrix;

const MACHINE_EPS: f64 = f64::EPSILON;
/// Total QR sweeps allowed across the spectrum, per matrix order.
const QR_SWEEPS_PER_ORDER: usize = 30;

/// The singular value decomposition `A = U·Σ·Vᵀ` of an `m`×`n` matrix,
/// with `U` of shape `m`×`min(m,n)`, `V` of shape `n`×`min(m,n)` and
/// `Σ` the diagonal of singular values.
pub struct SvdDecomposition {
    m: usize,
    n: usize,
    u: DoubleGrid2d,
    s: Vec<f64>,
    v: DoubleGrid2d,
}

impl SvdDecomposition {
    /// Decompose a copy of `a`; `a` itself is left untouched.
    ///
    /// Fails with `NoConvergence` if the iteration cap is exceeded.
    ///
    /// **Panics** if `a` has more than one channel.
    pub fn decompose(a: &DoubleGrid2d) -> Result<Self, LatticeError> {
        check_matrix(a);
        let m = a.rows();
        let n = a.cols();
        if m.min(n) == 0 {
            return Ok(SvdDecomposition {
                m,
                n,
                u: DoubleGrid2d::zeros(Extent2d::new(m, 0)),
                s: Vec::new(),
                v: DoubleGrid2d::zeros(Extent2d::new(n, 0)),
            });
        }
        if m >= n {
            let (u, s, v) = svd_tall(m, n, a.to_vec())?;
            Ok(SvdDecomposition {
                m,
                n,
                u: DoubleGrid2d::from_dense(Extent2d::new(m, n), u),
                s,
                v: DoubleGrid2d::from_dense(Extent2d::new(n, n), v),
            })
        } else {
            // wide: decompose the transpose and swap the factors
            let (u, s, v) = svd_tall(n, m, a.t().to_vec())?;
            Ok(SvdDecomposition {
                m,
                n,
                u: DoubleGrid2d::from_dense(Extent2d::new(m, m), v),
                s,
                v: DoubleGrid2d::from_dense(Extent2d::new(n, m), u),
            })
        }
    }

    /// The singular values, non-negative and descending; length
    /// `min(m, n)`.
    pub fn singular_values(&self) -> &[f64] {
        &self.s
    }

    /// The diagonal matrix `Σ`, `min(m,n)` square.
    pub fn s_matrix(&self) -> DoubleGrid2d {
        let k = self.s.len();
        let mut sm = DoubleGrid2d::zeros(Extent2d::new(k, k));
        for (i, &value) in self.s.iter().enumerate() {
            sm.set((i, i), value);
        }
        sm
    }

    /// The left singular vectors, `m`×`min(m,n)` with orthonormal
    /// columns.
    pub fn u(&self) -> &DoubleGrid2d {
        &self.u
    }

    /// The right singular vectors, `n`×`min(m,n)` with orthonormal
    /// columns.
    pub fn v(&self) -> &DoubleGrid2d {
        &self.v
    }

    /// The spectral norm, `σ_max`.
    pub fn norm2(&self) -> f64 {
        self.s.first().copied().unwrap_or(0.0)
    }

    /// The 2-norm condition number, `σ_max / σ_min`.
    pub fn cond(&self) -> f64 {
        match (self.s.first(), self.s.last()) {
            (Some(&max), Some(&min)) => max / min,
            _ => 0.0,
        }
    }

    /// Effective rank: singular values above
    /// `max(m, n) · σ_max · ε_machine`.
    pub fn rank(&self) -> usize {
        let tol = self.m.max(self.n) as f64 * self.norm2() * MACHINE_EPS;
        self.rank_with(tol)
    }

    /// Effective rank under an explicit tolerance.
    pub fn rank_with(&self, tolerance: f64) -> usize {
        self.s.iter().filter(|&&sigma| sigma > tolerance).count()
    }
}

/// Decompose a tall (`m ≥ n ≥ 1`) row-major matrix. Returns
/// `(U: m×n, s: n, V: n×n)`.
#[allow(clippy::needless_range_loop)]
fn svd_tall(m: usize, n: usize, mut a: Vec<f64>) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), LatticeError> {
    let nu = n;
    let mut s = vec![0.0f64; n];
    let mut e = vec![0.0f64; n];
    let mut u = vec![0.0f64; m * nu];
    let mut v = vec![0.0f64; n * n];
    let mut work = vec![0.0f64; m];

    // bidiagonalize: alternating left and right Householder
    // reflections, storing the vectors in the reduced matrix
    let nct = (m - 1).min(n);
    let nrt = n.saturating_sub(2);
    for k in 0..nct.max(nrt) {
        if k < nct {
            s[k] = 0.0;
            for i in k..m {
                s[k] = s[k].hypot(a[i * n + k]);
            }
            if s[k] != 0.0 {
                if a[k * n + k] < 0.0 {
                    s[k] = -s[k];
                }
                for i in k..m {
                    a[i * n + k] /= s[k];
                }
                a[k * n + k] += 1.0;
            }
            s[k] = -s[k];
        }
        for j in k + 1..n {
            if k < nct && s[k] != 0.0 {
                let mut t = 0.0;
                for i in k..m {
                    t += a[i * n + k] * a[i * n + j];
                }
                t = -t / a[k * n + k];
                for i in k..m {
                    a[i * n + j] += t * a[i * n + k];
                }
            }
            e[j] = a[k * n + j];
        }
        if k < nct {
            for i in k..m {
                u[i * nu + k] = a[i * n + k];
            }
        }
        if k < nrt {
            e[k] = 0.0;
            for i in k + 1..n {
                e[k] = e[k].hypot(e[i]);
            }
            if e[k] != 0.0 {
                if e[k + 1] < 0.0 {
                    e[k] = -e[k];
                }
                for i in k + 1..n {
                    e[i] /= e[k];
                }
                e[k + 1] += 1.0;
            }
            e[k] = -e[k];
            if k + 1 < m && e[k] != 0.0 {
                for i in k + 1..m {
                    work[i] = 0.0;
                }
                for j in k + 1..n {
                    for i in k + 1..m {
                        work[i] += e[j] * a[i * n + j];
                    }
                }
                for j in k + 1..n {
                    let t = -e[j] / e[k + 1];
                    for i in k + 1..m {
                        a[i * n + j] += t * work[i];
                    }
                }
            }
            for i in k + 1..n {
                v[i * n + k] = e[i];
            }
        }
    }

    // set up the final bidiagonal
    let p0 = n;
    if nct < n {
        s[nct] = a[nct * n + nct];
    }
    if nrt + 1 < p0 {
        e[nrt] = a[nrt * n + p0 - 1];
    }
    e[p0 - 1] = 0.0;

    // generate U
    for j in nct..nu {
        for i in 0..m {
            u[i * nu + j] = 0.0;
        }
        u[j * nu + j] = 1.0;
    }
    for k in (0..nct).rev() {
        if s[k] != 0.0 {
            for j in k + 1..nu {
                let mut t = 0.0;
                for i in k..m {
                    t += u[i * nu + k] * u[i * nu + j];
                }
                t = -t / u[k * nu + k];
                for i in k..m {
                    u[i * nu + j] += t * u[i * nu + k];
                }
            }
            for i in k..m {
                u[i * nu + k] = -u[i * nu + k];
            }
            u[k * nu + k] += 1.0;
            // every entry above the reflector pivot belongs to zero
            for i in 0..k {
                u[i * nu + k] = 0.0;
            }
        } else {
            for i in 0..m {
                u[i * nu + k] = 0.0;
            }
            u[k * nu + k] = 1.0;
        }
    }

    // generate V
    for k in (0..n).rev() {
        if k < nrt && e[k] != 0.0 {
            for j in k + 1..nu {
                let mut t = 0.0;
                for i in k + 1..n {
                    t += v[i * n + k] * v[i * n + j];
                }
                t = -t / v[(k + 1) * n + k];
                for i in k + 1..n {
                    v[i * n + j] += t * v[i * n + k];
                }
            }
        }
        for i in 0..n {
            v[i * n + k] = 0.0;
        }
        v[k * n + k] = 1.0;
    }

    // the main iteration: deflate the bidiagonal until it is diagonal
    let mut p = p0;
    let pp = p - 1;
    let eps = MACHINE_EPS;
    let tiny = 2.0f64.powi(-966);
    let sweep_budget = QR_SWEEPS_PER_ORDER * n;
    let mut sweeps = 0;
    while p > 0 {
        let mut k: isize = p as isize - 2;
        while k >= 0 {
            let ku = k as usize;
            if e[ku].abs() <= tiny + eps * (s[ku].abs() + s[ku + 1].abs()) {
                e[ku] = 0.0;
                break;
            }
            k -= 1;
        }

        let kase;
        if k == p as isize - 2 {
            kase = 4;
        } else {
            let mut ks = p as isize - 1;
            while ks > k {
                let ksu = ks as usize;
                let t = e[ksu].abs()
                    + if ks != k + 1 { e[ksu - 1].abs() } else { 0.0 };
                if s[ksu].abs() <= tiny + eps * t {
                    s[ksu] = 0.0;
                    break;
                }
                ks -= 1;
            }
            if ks == k {
                kase = 3;
            } else if ks == p as isize - 1 {
                kase = 1;
            } else {
                kase = 2;
                k = ks;
            }
        }
        let k = (k + 1) as usize;

        match kase {
            // e[p-2] is negligible: deflate s[p-1]
            1 => {
                let mut f = e[p - 2];
                e[p - 2] = 0.0;
                for j in (k..p - 1).rev() {
                    let mut t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    if j != k {
                        f = -sn * e[j - 1];
                        e[j - 1] *= cs;
                    }
                    for i in 0..n {
                        t = cs * v[i * n + j] + sn * v[i * n + p - 1];
                        v[i * n + p - 1] = -sn * v[i * n + j] + cs * v[i * n + p - 1];
                        v[i * n + j] = t;
                    }
                }
            }
            // s[k-1] is negligible: split at k
            2 => {
                let mut f = e[k - 1];
                e[k - 1] = 0.0;
                for j in k..p {
                    let mut t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    f = -sn * e[j];
                    e[j] *= cs;
                    for i in 0..m {
                        t = cs * u[i * nu + j] + sn * u[i * nu + k - 1];
                        u[i * nu + k - 1] = -sn * u[i * nu + j] + cs * u[i * nu + k - 1];
                        u[i * nu + j] = t;
                    }
                }
            }
            // one implicit-shift QR step
            3 => {
                sweeps += 1;
                if sweeps > sweep_budget {
                    return Err(LatticeError::no_convergence());
                }

                let scale = s[p - 1]
                    .abs()
                    .max(s[p - 2].abs())
                    .max(e[p - 2].abs())
                    .max(s[k].abs())
                    .max(e[k].abs());
                let sp = s[p - 1] / scale;
                let spm1 = s[p - 2] / scale;
                let epm1 = e[p - 2] / scale;
                let sk = s[k] / scale;
                let ek = e[k] / scale;
                let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / 2.0;
                let c = (sp * epm1) * (sp * epm1);
                let mut shift = 0.0;
                if b != 0.0 || c != 0.0 {
                    shift = (b * b + c).sqrt();
                    if b < 0.0 {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }
                let mut f = (sk + sp) * (sk - sp) + shift;
                let mut g = sk * ek;

                // chase the bulge down the bidiagonal
                for j in k..p - 1 {
                    let mut t = f.hypot(g);
                    let mut cs = f / t;
                    let mut sn = g / t;
                    if j != k {
                        e[j - 1] = t;
                    }
                    f = cs * s[j] + sn * e[j];
                    e[j] = cs * e[j] - sn * s[j];
                    g = sn * s[j + 1];
                    s[j + 1] *= cs;
                    for i in 0..n {
                        t = cs * v[i * n + j] + sn * v[i * n + j + 1];
                        v[i * n + j + 1] = -sn * v[i * n + j] + cs * v[i * n + j + 1];
                        v[i * n + j] = t;
                    }
                    t = f.hypot(g);
                    cs = f / t;
                    sn = g / t;
                    s[j] = t;
                    f = cs * e[j] + sn * s[j + 1];
                    s[j + 1] = -sn * e[j] + cs * s[j + 1];
                    g = sn * e[j + 1];
                    e[j + 1] *= cs;
                    if j < m - 1 {
                        for i in 0..m {
                            t = cs * u[i * nu + j] + sn * u[i * nu + j + 1];
                            u[i * nu + j + 1] = -sn * u[i * nu + j] + cs * u[i * nu + j + 1];
                            u[i * nu + j] = t;
                        }
                    }
                }
                e[p - 2] = f;
            }
            // convergence: make s[k] non-negative, order it, deflate
            _ => {
                if s[k] <= 0.0 {
                    s[k] = if s[k] < 0.0 { -s[k] } else { 0.0 };
                    for i in 0..=pp {
                        v[i * n + k] = -v[i * n + k];
                    }
                }
                let mut k = k;
                while k < pp {
                    if s[k] >= s[k + 1] {
                        break;
                    }
                    s.swap(k, k + 1);
                    if k < n - 1 {
                        for i in 0..n {
                            v.swap(i * n + k, i * n + k + 1);
                        }
                    }
                    if k < m - 1 {
                        for i in 0..m {
                            u.swap(i * nu + k, i * nu + k + 1);
                        }
                    }
                    k += 1;
                }
                p -= 1;
            }
        }
    }

    Ok((u, s, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid2;
    use crate::linalg::general_mat_mul;
    use approx::assert_abs_diff_eq;

    fn assert_reconstructs(a: &DoubleGrid2d, svd: &SvdDecomposition, tol: f64) {
        let us = svd.u().mult(&svd.s_matrix(), None, 1.0, 0.0, false, false);
        let mut usv = DoubleGrid2d::zeros(Extent2d::new(a.rows(), a.cols()));
        general_mat_mul(1.0, &us, &svd.v().t(), 0.0, &mut usv);
        for i in 0..a.rows() {
            for j in 0..a.cols() {
                assert_abs_diff_eq!(usv.get((i, j)), a.get((i, j)), epsilon = tol);
            }
        }
    }

    fn assert_orthonormal_columns(q: &DoubleGrid2d, tol: f64) {
        let gram = q.mult(q, None, 1.0, 0.0, true, false);
        for i in 0..gram.rows() {
            for j in 0..gram.cols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram.get((i, j)), expected, epsilon = tol);
            }
        }
    }

    #[test]
    fn rank_one_matrix_has_one_singular_value() {
        let a = grid2(&[[1.0, 2.0], [2.0, 4.0]]);
        let svd = SvdDecomposition::decompose(&a).unwrap();
        assert_abs_diff_eq!(svd.singular_values()[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(svd.singular_values()[1], 0.0, epsilon = 1e-12);
        assert_eq!(svd.rank(), 1);
        assert_abs_diff_eq!(svd.norm2(), 5.0, epsilon = 1e-12);
        assert_reconstructs(&a, &svd, 1e-12);
    }

    #[test]
    fn tall_matrix_decomposition() {
        let a = grid2(&[
            [2.0, 0.0],
            [0.0, -3.0],
            [0.0, 0.0],
            [1.0, 1.0],
        ]);
        let svd = SvdDecomposition::decompose(&a).unwrap();
        let s = svd.singular_values();
        assert_eq!(s.len(), 2);
        assert!(s[0] >= s[1] && s[1] >= 0.0);
        assert_eq!(svd.u().rows(), 4);
        assert_eq!(svd.u().cols(), 2);
        assert_eq!(svd.v().rows(), 2);
        assert_orthonormal_columns(svd.u(), 1e-12);
        assert_orthonormal_columns(svd.v(), 1e-12);
        assert_reconstructs(&a, &svd, 1e-12);
    }

    #[test]
    fn wide_matrix_goes_through_the_transpose() {
        let a = grid2(&[[1.0, 0.0, 2.0], [0.0, 3.0, 0.0]]);
        let svd = SvdDecomposition::decompose(&a).unwrap();
        let s = svd.singular_values();
        assert_eq!(s.len(), 2);
        assert_abs_diff_eq!(s[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[1], 5.0f64.sqrt(), epsilon = 1e-12);
        assert_eq!(svd.u().rows(), 2);
        assert_eq!(svd.v().rows(), 3);
        assert_orthonormal_columns(svd.u(), 1e-12);
        assert_orthonormal_columns(svd.v(), 1e-12);
        assert_reconstructs(&a, &svd, 1e-12);
    }

    #[test]
    fn square_matrix_with_deep_reflectors() {
        // m == n with four columns drives the left reflectors down to
        // column index 2, covering the above-pivot clearing path that
        // the tall 2- and 3-column cases never reach
        let a = grid2(&[
            [4.0, 1.0, 2.0, 0.0],
            [1.0, 3.0, 0.0, 1.0],
            [2.0, 0.0, 5.0, 2.0],
            [0.0, 1.0, 2.0, 1.0],
        ]);
        let svd = SvdDecomposition::decompose(&a).unwrap();
        let s = svd.singular_values();
        assert_eq!(s.len(), 4);
        assert!(s.windows(2).all(|w| w[0] >= w[1]));
        assert!(s.iter().all(|&sigma| sigma >= 0.0));
        assert_orthonormal_columns(svd.u(), 1e-12);
        assert_orthonormal_columns(svd.v(), 1e-12);
        assert_reconstructs(&a, &svd, 1e-12);
    }

    #[test]
    fn condition_number_of_a_diagonal_matrix() {
        let a = grid2(&[[4.0, 0.0], [0.0, 0.5]]);
        let svd = SvdDecomposition::decompose(&a).unwrap();
        assert_abs_diff_eq!(svd.cond(), 8.0, epsilon = 1e-12);
        assert_eq!(svd.rank(), 2);
    }

    #[test]
    fn identity_has_unit_spectrum() {
        let a = DoubleGrid2d::eye(3);
        let svd = SvdDecomposition::decompose(&a).unwrap();
        for &sigma in svd.singular_values() {
            assert_abs_diff_eq!(sigma, 1.0);
        }
        assert_eq!(svd.rank(), 3);
    }
}
