// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Eigenvalues and eigenvectors of a square matrix.
//!
//! Symmetric inputs (checked under the active numeric context) go
//! through Householder tridiagonalization and implicit-shift QL;
//! general inputs through Hessenberg reduction and Francis
//! double-shift QR. Complex eigenvalues appear as conjugate pairs in
//! the real/imaginary part vectors, with the paired eigenvectors
//! encoded in two adjacent columns of `V`.

use num_complex::Complex;

use crate::context;
use crate::error::LatticeError;
use crate::extent::Extent2d;
use crate::grid::DoubleGrid2d;
use crate::linalg::{check_matrix, square_error};

const MACHINE_EPS: f64 = f64::EPSILON;
/// QL sweeps allowed per eigenvalue before giving up.
const QL_MAX_SWEEPS: usize = 30;
/// Total QR sweeps allowed across the spectrum, per matrix order.
const QR_SWEEPS_PER_ORDER: usize = 30;

/// The eigendecomposition `A·V = V·D` of a square matrix.
pub struct EigenDecomposition {
    n: usize,
    symmetric: bool,
    d: Vec<f64>,
    e: Vec<f64>,
    v: DoubleGrid2d,
}

impl EigenDecomposition {
    /// Decompose a copy of `a`; `a` itself is left untouched.
    ///
    /// Fails with `NoConvergence` if the iteration cap is exceeded.
    ///
    /// **Panics** if `a` is not square or has more than one channel.
    pub fn decompose(a: &DoubleGrid2d) -> Result<Self, LatticeError> {
        check_matrix(a);
        if !a.is_square() {
            square_error(a.rows(), a.cols());
        }
        let n = a.rows();
        let ctx = context::context();
        let src = a.to_vec();

        let mut symmetric = true;
        'sym: for i in 0..n {
            for j in 0..i {
                if !ctx.equals(src[i * n + j], src[j * n + i]) {
                    symmetric = false;
                    break 'sym;
                }
            }
        }

        let mut d = vec![0.0; n];
        let mut e = vec![0.0; n];
        let v;
        if n == 0 {
            v = Vec::new();
        } else if symmetric {
            let mut work = src;
            tred2(n, &mut work, &mut d, &mut e);
            tql2(n, &mut work, &mut d, &mut e)?;
            v = work;
        } else {
            let mut h = src;
            let mut work = vec![0.0; n * n];
            let mut ort = vec![0.0; n];
            orthes(n, &mut h, &mut work, &mut ort);
            hqr2(n, &mut h, &mut work, &mut d, &mut e)?;
            v = work;
        }

        Ok(EigenDecomposition {
            n,
            symmetric,
            d,
            e,
            v: DoubleGrid2d::from_dense(Extent2d::new(n, n), v),
        })
    }

    /// Whether the input tested symmetric under the active context.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Real parts of the eigenvalues. Ascending for symmetric inputs.
    pub fn real_eigenvalues(&self) -> &[f64] {
        &self.d
    }

    /// Imaginary parts of the eigenvalues; conjugate pairs occupy
    /// adjacent slots.
    pub fn imag_eigenvalues(&self) -> &[f64] {
        &self.e
    }

    /// The eigenvalues as complex numbers.
    pub fn eigenvalues(&self) -> Vec<Complex<f64>> {
        self.d
            .iter()
            .zip(&self.e)
            .map(|(&re, &im)| Complex::new(re, im))
            .collect()
    }

    /// The eigenvector matrix `V`. For a complex pair at columns
    /// `j, j+1` the eigenvectors are `V[:,j] ± i·V[:,j+1]`.
    pub fn v(&self) -> &DoubleGrid2d {
        &self.v
    }

    /// The block diagonal eigenvalue matrix: real eigenvalues on the
    /// diagonal, conjugate pairs as 2×2 blocks.
    pub fn d_matrix(&self) -> DoubleGrid2d {
        let n = self.n;
        let mut m = DoubleGrid2d::zeros(Extent2d::new(n, n));
        for i in 0..n {
            m.set((i, i), self.d[i]);
            if self.e[i] > 0.0 {
                m.set((i, i + 1), self.e[i]);
            } else if self.e[i] < 0.0 {
                m.set((i, i - 1), self.e[i]);
            }
        }
        m
    }
}

/// Householder reduction to tridiagonal form, accumulating the
/// transformation in `v`.
fn tred2(n: usize, v: &mut [f64], d: &mut [f64], e: &mut [f64]) {
    for j in 0..n {
        d[j] = v[(n - 1) * n + j];
    }

    for i in (1..n).rev() {
        let mut scale = 0.0;
        let mut h = 0.0;
        for item in d.iter().take(i) {
            scale += item.abs();
        }
        if scale == 0.0 {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = v[(i - 1) * n + j];
                v[i * n + j] = 0.0;
                v[j * n + i] = 0.0;
            }
        } else {
            for k in 0..i {
                d[k] /= scale;
                h += d[k] * d[k];
            }
            let mut f = d[i - 1];
            let mut g = h.sqrt();
            if f > 0.0 {
                g = -g;
            }
            e[i] = scale * g;
            h -= f * g;
            d[i - 1] = f - g;
            for j in 0..i {
                e[j] = 0.0;
            }
            for j in 0..i {
                f = d[j];
                v[j * n + i] = f;
                g = e[j] + v[j * n + j] * f;
                for k in j + 1..i {
                    g += v[k * n + j] * d[k];
                    e[k] += v[k * n + j] * f;
                }
                e[j] = g;
            }
            f = 0.0;
            for j in 0..i {
                e[j] /= h;
                f += e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] -= hh * d[j];
            }
            for j in 0..i {
                f = d[j];
                g = e[j];
                for k in j..i {
                    v[k * n + j] -= f * e[k] + g * d[k];
                }
                d[j] = v[(i - 1) * n + j];
                v[i * n + j] = 0.0;
            }
        }
        d[i] = h;
    }

    for i in 0..n - 1 {
        v[(n - 1) * n + i] = v[i * n + i];
        v[i * n + i] = 1.0;
        let h = d[i + 1];
        if h != 0.0 {
            for k in 0..=i {
                d[k] = v[k * n + i + 1] / h;
            }
            for j in 0..=i {
                let mut g = 0.0;
                for k in 0..=i {
                    g += v[k * n + i + 1] * v[k * n + j];
                }
                for k in 0..=i {
                    v[k * n + j] -= g * d[k];
                }
            }
        }
        for k in 0..=i {
            v[k * n + i + 1] = 0.0;
        }
    }
    for j in 0..n {
        d[j] = v[(n - 1) * n + j];
        v[(n - 1) * n + j] = 0.0;
    }
    v[(n - 1) * n + n - 1] = 1.0;
    e[0] = 0.0;
}

/// Implicit-shift QL iteration on a tridiagonal matrix, rotating `v`
/// along. Eigenvalues come out ascending.
fn tql2(n: usize, v: &mut [f64], d: &mut [f64], e: &mut [f64]) -> Result<(), LatticeError> {
    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = 0.0;

    let mut f = 0.0f64;
    let mut tst1 = 0.0f64;
    for l in 0..n {
        tst1 = tst1.max(d[l].abs() + e[l].abs());
        let mut m = l;
        while m < n {
            if e[m].abs() <= MACHINE_EPS * tst1 {
                break;
            }
            m += 1;
        }

        if m > l {
            let mut iter = 0;
            loop {
                iter += 1;
                if iter > QL_MAX_SWEEPS {
                    return Err(LatticeError::no_convergence());
                }

                let mut g = d[l];
                let mut p = (d[l + 1] - g) / (2.0 * e[l]);
                let mut r = p.hypot(1.0);
                if p < 0.0 {
                    r = -r;
                }
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let mut h = g - d[l];
                for item in d.iter_mut().take(n).skip(l + 2) {
                    *item -= h;
                }
                f += h;

                p = d[m];
                let mut c = 1.0;
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = 0.0;
                let mut s2 = 0.0;
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    g = c * e[i];
                    h = c * p;
                    r = p.hypot(e[i]);
                    e[i + 1] = s * r;
                    s = e[i] / r;
                    c = p / r;
                    p = c * d[i] - s * g;
                    d[i + 1] = h + s * (c * g + s * d[i]);
                    for k in 0..n {
                        h = v[k * n + i + 1];
                        v[k * n + i + 1] = s * v[k * n + i] + c * h;
                        v[k * n + i] = c * v[k * n + i] - s * h;
                    }
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                if e[l].abs() <= MACHINE_EPS * tst1 {
                    break;
                }
            }
        }
        d[l] += f;
        e[l] = 0.0;
    }

    // order ascending, carrying the vectors along
    for i in 0..n - 1 {
        let mut k = i;
        let mut p = d[i];
        for j in i + 1..n {
            if d[j] < p {
                k = j;
                p = d[j];
            }
        }
        if k != i {
            d[k] = d[i];
            d[i] = p;
            for j in 0..n {
                v.swap(j * n + i, j * n + k);
            }
        }
    }
    Ok(())
}

/// Householder reduction of a general matrix to upper Hessenberg form,
/// accumulating the transformation in `v`.
fn orthes(n: usize, h: &mut [f64], v: &mut [f64], ort: &mut [f64]) {
    let high = n - 1;

    for m in 1..high {
        let mut scale = 0.0;
        for i in m..=high {
            scale += h[i * n + m - 1].abs();
        }
        if scale != 0.0 {
            let mut hsum = 0.0;
            for i in (m..=high).rev() {
                ort[i] = h[i * n + m - 1] / scale;
                hsum += ort[i] * ort[i];
            }
            let mut g = hsum.sqrt();
            if ort[m] > 0.0 {
                g = -g;
            }
            hsum -= ort[m] * g;
            ort[m] -= g;

            // similarity transform, applied from both sides
            for j in m..n {
                let mut f = 0.0;
                for i in (m..=high).rev() {
                    f += ort[i] * h[i * n + j];
                }
                f /= hsum;
                for i in m..=high {
                    h[i * n + j] -= f * ort[i];
                }
            }
            for i in 0..=high {
                let mut f = 0.0;
                for j in (m..=high).rev() {
                    f += ort[j] * h[i * n + j];
                }
                f /= hsum;
                for j in m..=high {
                    h[i * n + j] -= f * ort[j];
                }
            }
            ort[m] *= scale;
            h[m * n + m - 1] = scale * g;
        }
    }

    for i in 0..n {
        for j in 0..n {
            v[i * n + j] = if i == j { 1.0 } else { 0.0 };
        }
    }
    for m in (1..high).rev() {
        if h[m * n + m - 1] != 0.0 {
            for i in m + 1..=high {
                ort[i] = h[i * n + m - 1];
            }
            for j in m..=high {
                let mut g = 0.0;
                for i in m..=high {
                    g += ort[i] * v[i * n + j];
                }
                g = (g / ort[m]) / h[m * n + m - 1];
                for i in m..=high {
                    v[i * n + j] += g * ort[i];
                }
            }
        }
    }
}

fn cdiv(xr: f64, xi: f64, yr: f64, yi: f64) -> (f64, f64) {
    if yr.abs() > yi.abs() {
        let r = yi / yr;
        let d = yr + r * yi;
        ((xr + r * xi) / d, (xi - r * xr) / d)
    } else {
        let r = yr / yi;
        let d = yi + r * yr;
        ((r * xr + xi) / d, (r * xi - xr) / d)
    }
}

/// Francis double-shift QR iteration on an upper Hessenberg matrix,
/// followed by back substitution for the eigenvectors.
#[allow(unused_assignments, clippy::needless_range_loop)]
fn hqr2(nn: usize, h: &mut [f64], v: &mut [f64], d: &mut [f64], e: &mut [f64]) -> Result<(), LatticeError> {
    let mut n = nn as isize - 1;
    let eps = MACHINE_EPS;
    let mut exshift = 0.0f64;
    let (mut p, mut q, mut r, mut s, mut z) = (0.0f64, 0.0f64, 0.0f64, 0.0f64, 0.0f64);
    let (mut t, mut w, mut x, mut y) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);

    let mut norm = 0.0f64;
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm += h[i * nn + j].abs();
        }
    }

    let sweep_budget = QR_SWEEPS_PER_ORDER * nn;
    let mut sweeps = 0;
    let mut iter = 0;
    while n >= 0 {
        let nu = n as usize;

        // look for a single small subdiagonal element
        let mut l = nu;
        while l > 0 {
            s = h[(l - 1) * nn + l - 1].abs() + h[l * nn + l].abs();
            if s == 0.0 {
                s = norm;
            }
            if h[l * nn + l - 1].abs() < eps * s {
                break;
            }
            l -= 1;
        }

        if l == nu {
            // one root found
            h[nu * nn + nu] += exshift;
            d[nu] = h[nu * nn + nu];
            e[nu] = 0.0;
            n -= 1;
            iter = 0;
        } else if l == nu - 1 {
            // two roots found
            w = h[nu * nn + nu - 1] * h[(nu - 1) * nn + nu];
            p = (h[(nu - 1) * nn + nu - 1] - h[nu * nn + nu]) / 2.0;
            q = p * p + w;
            z = q.abs().sqrt();
            h[nu * nn + nu] += exshift;
            h[(nu - 1) * nn + nu - 1] += exshift;
            x = h[nu * nn + nu];

            if q >= 0.0 {
                // real pair
                z = if p >= 0.0 { p + z } else { p - z };
                d[nu - 1] = x + z;
                d[nu] = d[nu - 1];
                if z != 0.0 {
                    d[nu] = x - w / z;
                }
                e[nu - 1] = 0.0;
                e[nu] = 0.0;
                x = h[nu * nn + nu - 1];
                s = x.abs() + z.abs();
                p = x / s;
                q = z / s;
                r = (p * p + q * q).sqrt();
                p /= r;
                q /= r;
                for j in nu - 1..nn {
                    z = h[(nu - 1) * nn + j];
                    h[(nu - 1) * nn + j] = q * z + p * h[nu * nn + j];
                    h[nu * nn + j] = q * h[nu * nn + j] - p * z;
                }
                for i in 0..=nu {
                    z = h[i * nn + nu - 1];
                    h[i * nn + nu - 1] = q * z + p * h[i * nn + nu];
                    h[i * nn + nu] = q * h[i * nn + nu] - p * z;
                }
                for i in 0..nn {
                    z = v[i * nn + nu - 1];
                    v[i * nn + nu - 1] = q * z + p * v[i * nn + nu];
                    v[i * nn + nu] = q * v[i * nn + nu] - p * z;
                }
            } else {
                // complex pair
                d[nu - 1] = x + p;
                d[nu] = x + p;
                e[nu - 1] = z;
                e[nu] = -z;
            }
            n -= 2;
            iter = 0;
        } else {
            // no convergence yet; form a shift
            x = h[nu * nn + nu];
            y = 0.0;
            w = 0.0;
            if l < nu {
                y = h[(nu - 1) * nn + nu - 1];
                w = h[nu * nn + nu - 1] * h[(nu - 1) * nn + nu];
            }

            if iter == 10 {
                // exceptional shift
                exshift += x;
                for i in 0..=nu {
                    h[i * nn + i] -= x;
                }
                s = h[nu * nn + nu - 1].abs() + h[(nu - 1) * nn + nu - 2].abs();
                x = 0.75 * s;
                y = x;
                w = -0.4375 * s * s;
            }
            if iter == 20 {
                // second exceptional shift
                s = (y - x) / 2.0;
                s = s * s + w;
                if s > 0.0 {
                    s = s.sqrt();
                    if y < x {
                        s = -s;
                    }
                    s = x - w / ((y - x) / 2.0 + s);
                    for i in 0..=nu {
                        h[i * nn + i] -= s;
                    }
                    exshift += s;
                    x = 0.964;
                    y = 0.964;
                    w = 0.964;
                }
            }

            iter += 1;
            sweeps += 1;
            if sweeps > sweep_budget {
                return Err(LatticeError::no_convergence());
            }

            // look for two consecutive small subdiagonal elements
            let mut m = nu - 2;
            loop {
                z = h[m * nn + m];
                r = x - z;
                s = y - z;
                p = (r * s - w) / h[(m + 1) * nn + m] + h[m * nn + m + 1];
                q = h[(m + 1) * nn + m + 1] - z - r - s;
                r = h[(m + 2) * nn + m + 1];
                s = p.abs() + q.abs() + r.abs();
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                if h[m * nn + m - 1].abs() * (q.abs() + r.abs())
                    < eps
                        * (p.abs()
                            * (h[(m - 1) * nn + m - 1].abs() + z.abs() + h[(m + 1) * nn + m + 1].abs()))
                {
                    break;
                }
                m -= 1;
            }
            for i in m + 2..=nu {
                h[i * nn + i - 2] = 0.0;
                if i > m + 2 {
                    h[i * nn + i - 3] = 0.0;
                }
            }

            // double QR step on rows l..=nu and columns m..=nu
            for k in m..nu {
                let notlast = k != nu - 1;
                if k != m {
                    p = h[k * nn + k - 1];
                    q = h[(k + 1) * nn + k - 1];
                    r = if notlast { h[(k + 2) * nn + k - 1] } else { 0.0 };
                    x = p.abs() + q.abs() + r.abs();
                    if x == 0.0 {
                        continue;
                    }
                    p /= x;
                    q /= x;
                    r /= x;
                }
                s = (p * p + q * q + r * r).sqrt();
                if p < 0.0 {
                    s = -s;
                }
                if s != 0.0 {
                    if k != m {
                        h[k * nn + k - 1] = -s * x;
                    } else if l != m {
                        h[k * nn + k - 1] = -h[k * nn + k - 1];
                    }
                    p += s;
                    x = p / s;
                    y = q / s;
                    z = r / s;
                    q /= p;
                    r /= p;

                    for j in k..nn {
                        p = h[k * nn + j] + q * h[(k + 1) * nn + j];
                        if notlast {
                            p += r * h[(k + 2) * nn + j];
                            h[(k + 2) * nn + j] -= p * z;
                        }
                        h[k * nn + j] -= p * x;
                        h[(k + 1) * nn + j] -= p * y;
                    }
                    for i in 0..=nu.min(k + 3) {
                        p = x * h[i * nn + k] + y * h[i * nn + k + 1];
                        if notlast {
                            p += z * h[i * nn + k + 2];
                            h[i * nn + k + 2] -= p * r;
                        }
                        h[i * nn + k] -= p;
                        h[i * nn + k + 1] -= p * q;
                    }
                    for i in 0..nn {
                        p = x * v[i * nn + k] + y * v[i * nn + k + 1];
                        if notlast {
                            p += z * v[i * nn + k + 2];
                            v[i * nn + k + 2] -= p * r;
                        }
                        v[i * nn + k] -= p;
                        v[i * nn + k + 1] -= p * q;
                    }
                }
            }
        }
    }

    if norm == 0.0 {
        return Ok(());
    }

    // back substitution: eigenvectors of the quasi-triangular form
    for nb in (0..nn).rev() {
        p = d[nb];
        q = e[nb];

        if q == 0.0 {
            // real vector
            let mut l = nb;
            h[nb * nn + nb] = 1.0;
            for i in (0..nb).rev() {
                w = h[i * nn + i] - p;
                r = 0.0;
                for j in l..=nb {
                    r += h[i * nn + j] * h[j * nn + nb];
                }
                if e[i] < 0.0 {
                    z = w;
                    s = r;
                } else {
                    l = i;
                    if e[i] == 0.0 {
                        h[i * nn + nb] = if w != 0.0 { -r / w } else { -r / (eps * norm) };
                    } else {
                        // solve the 2x2 block
                        x = h[i * nn + i + 1];
                        y = h[(i + 1) * nn + i];
                        q = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                        t = (x * s - z * r) / q;
                        h[i * nn + nb] = t;
                        h[(i + 1) * nn + nb] = if x.abs() > z.abs() {
                            (-r - w * t) / x
                        } else {
                            (-s - y * t) / z
                        };
                    }
                    // overflow control
                    t = h[i * nn + nb].abs();
                    if (eps * t) * t > 1.0 {
                        for j in i..=nb {
                            h[j * nn + nb] /= t;
                        }
                    }
                }
            }
        } else if q < 0.0 {
            // complex vector, paired with column nb-1
            let mut l = nb - 1;

            if h[nb * nn + nb - 1].abs() > h[(nb - 1) * nn + nb].abs() {
                h[(nb - 1) * nn + nb - 1] = q / h[nb * nn + nb - 1];
                h[(nb - 1) * nn + nb] = -(h[nb * nn + nb] - p) / h[nb * nn + nb - 1];
            } else {
                let (cr, ci) = cdiv(0.0, -h[(nb - 1) * nn + nb], h[(nb - 1) * nn + nb - 1] - p, q);
                h[(nb - 1) * nn + nb - 1] = cr;
                h[(nb - 1) * nn + nb] = ci;
            }
            h[nb * nn + nb - 1] = 0.0;
            h[nb * nn + nb] = 1.0;
            for i in (0..nb.saturating_sub(1)).rev() {
                let mut ra = 0.0;
                let mut sa = 0.0;
                for j in l..=nb {
                    ra += h[i * nn + j] * h[j * nn + nb - 1];
                    sa += h[i * nn + j] * h[j * nn + nb];
                }
                w = h[i * nn + i] - p;

                if e[i] < 0.0 {
                    z = w;
                    r = ra;
                    s = sa;
                } else {
                    l = i;
                    if e[i] == 0.0 {
                        let (cr, ci) = cdiv(-ra, -sa, w, q);
                        h[i * nn + nb - 1] = cr;
                        h[i * nn + nb] = ci;
                    } else {
                        // solve the complex 2x2 block
                        x = h[i * nn + i + 1];
                        y = h[(i + 1) * nn + i];
                        let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                        let vi = (d[i] - p) * 2.0 * q;
                        if vr == 0.0 && vi == 0.0 {
                            vr = eps * norm * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                        }
                        let (cr, ci) =
                            cdiv(x * r - z * ra + q * sa, x * s - z * sa - q * ra, vr, vi);
                        h[i * nn + nb - 1] = cr;
                        h[i * nn + nb] = ci;
                        if x.abs() > z.abs() + q.abs() {
                            h[(i + 1) * nn + nb - 1] =
                                (-ra - w * h[i * nn + nb - 1] + q * h[i * nn + nb]) / x;
                            h[(i + 1) * nn + nb] =
                                (-sa - w * h[i * nn + nb] - q * h[i * nn + nb - 1]) / x;
                        } else {
                            let (cr, ci) =
                                cdiv(-r - y * h[i * nn + nb - 1], -s - y * h[i * nn + nb], z, q);
                            h[(i + 1) * nn + nb - 1] = cr;
                            h[(i + 1) * nn + nb] = ci;
                        }
                    }
                    // overflow control
                    t = h[i * nn + nb - 1].abs().max(h[i * nn + nb].abs());
                    if (eps * t) * t > 1.0 {
                        for j in i..=nb {
                            h[j * nn + nb - 1] /= t;
                            h[j * nn + nb] /= t;
                        }
                    }
                }
            }
        }
    }

    // back transformation to the eigenvectors of the original matrix
    for j in (0..nn).rev() {
        for i in 0..nn {
            z = 0.0;
            for k in 0..=j {
                z += v[i * nn + k] * h[k * nn + j];
            }
            v[i * nn + j] = z;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid2;
    use crate::linalg::general_mat_mul;
    use approx::assert_abs_diff_eq;

    fn assert_av_equals_vd(a: &DoubleGrid2d, eig: &EigenDecomposition, tol: f64) {
        let n = a.rows();
        let mut av = DoubleGrid2d::zeros(Extent2d::new(n, n));
        let mut vd = DoubleGrid2d::zeros(Extent2d::new(n, n));
        general_mat_mul(1.0, a, eig.v(), 0.0, &mut av);
        general_mat_mul(1.0, eig.v(), &eig.d_matrix(), 0.0, &mut vd);
        for i in 0..n {
            for j in 0..n {
                assert_abs_diff_eq!(av.get((i, j)), vd.get((i, j)), epsilon = tol);
            }
        }
    }

    #[test]
    fn symmetric_two_by_two() {
        let a = grid2(&[[2.0, 1.0], [1.0, 2.0]]);
        let eig = EigenDecomposition::decompose(&a).unwrap();
        assert!(eig.is_symmetric());
        assert_abs_diff_eq!(eig.real_eigenvalues()[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.real_eigenvalues()[1], 3.0, epsilon = 1e-12);
        assert_eq!(eig.imag_eigenvalues(), &[0.0, 0.0]);
        assert_av_equals_vd(&a, &eig, 1e-12);
    }

    #[test]
    fn symmetric_eigenvectors_are_orthonormal() {
        let a = grid2(&[
            [4.0, 1.0, -2.0],
            [1.0, 2.0, 0.0],
            [-2.0, 0.0, 3.0],
        ]);
        let eig = EigenDecomposition::decompose(&a).unwrap();
        let v = eig.v();
        let gram = v.mult(v, None, 1.0, 0.0, true, false);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram.get((i, j)), expected, epsilon = 1e-10);
            }
        }
        assert_av_equals_vd(&a, &eig, 1e-10);
    }

    #[test]
    fn rotation_matrix_has_imaginary_pair() {
        let a = grid2(&[[0.0, 1.0], [-1.0, 0.0]]);
        let eig = EigenDecomposition::decompose(&a).unwrap();
        assert!(!eig.is_symmetric());
        assert_abs_diff_eq!(eig.real_eigenvalues()[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.real_eigenvalues()[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.imag_eigenvalues()[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.imag_eigenvalues()[1], -1.0, epsilon = 1e-12);
        let values = eig.eigenvalues();
        assert_eq!(values[0].im, -values[1].im);
        assert_av_equals_vd(&a, &eig, 1e-12);
    }

    #[test]
    fn general_triangular_matrix() {
        let a = grid2(&[[3.0, 1.0], [0.0, 2.0]]);
        let eig = EigenDecomposition::decompose(&a).unwrap();
        let mut values = eig.real_eigenvalues().to_vec();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(values[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], 3.0, epsilon = 1e-12);
        assert_av_equals_vd(&a, &eig, 1e-12);
    }

    #[test]
    fn general_three_by_three() {
        let a = grid2(&[
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 10.0],
        ]);
        let eig = EigenDecomposition::decompose(&a).unwrap();
        assert_av_equals_vd(&a, &eig, 1e-8);
        // the trace equals the eigenvalue sum
        let sum: f64 = eig.real_eigenvalues().iter().sum();
        assert_abs_diff_eq!(sum, 16.0, epsilon = 1e-8);
    }
}
