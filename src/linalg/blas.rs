// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Dense double kernels: matrix multiply, matrix-vector multiply,
//! triangular solves and row permutation.
//!
//! The kernels read operands through their layouts, so transposed or
//! sliced views cost nothing extra. The output must not share a buffer
//! with an input; the kernels check handle identity and panic rather
//! than alias.

use crate::context;
use crate::error::LatticeError;
use crate::extent::{Extent1d, Extent2d};
use crate::grid::{DenseGrid1d, DoubleGrid1d, DoubleGrid2d};
use crate::linalg::{check_matrix, square_error, LinalgScalar};
use crate::numeric_util;

/// Square block side for the tiled multiply; sized so three blocks of
/// doubles stay in a 32 KiB L1 cache.
const GEMM_BLOCK: usize = 32;

#[cold]
#[inline(never)]
fn gemm_shape_error(m: usize, k: usize, k2: usize, n: usize, cm: usize, cn: usize) -> ! {
    panic!(
        "lattix: inputs {} × {}, {} × {}, and output {} × {} are not compatible for matrix multiplication",
        m, k, k2, n, cm, cn
    );
}

#[cold]
#[inline(never)]
fn gemv_shape_error(m: usize, n: usize, x: usize, y: usize) -> ! {
    panic!(
        "lattix: input {} × {}, vector {}, and output vector {} are not compatible for matrix-vector multiplication",
        m, n, x, y
    );
}

#[cold]
#[inline(never)]
fn dot_shape_error(a: usize, b: usize) -> ! {
    panic!("lattix: vectors of length {} and {} are not compatible for dot product", a, b);
}

#[cold]
#[inline(never)]
fn aliased_output_error() -> ! {
    panic!("lattix: kernel output shares a buffer with an input; copy the operand first");
}

#[cold]
#[inline(never)]
fn rhs_shape_error(expected: usize, actual: usize) -> ! {
    panic!(
        "lattix: {}",
        LatticeError::shape_mismatch(&[expected], &[actual])
    );
}

#[derive(Clone, Copy)]
struct Map2 {
    start: isize,
    rs: isize,
    cs: isize,
}

impl Map2 {
    fn of(a: &DoubleGrid2d) -> Self {
        let layout = a.structure().layout();
        Map2 {
            start: layout.start(),
            rs: layout.stride().row,
            cs: layout.stride().col,
        }
    }

    #[inline(always)]
    fn at(&self, i: usize, j: usize) -> usize {
        (self.start + self.rs * i as isize + self.cs * j as isize) as usize
    }
}

#[derive(Clone, Copy)]
struct Map1 {
    start: isize,
    stride: isize,
}

impl Map1 {
    fn of(x: &DoubleGrid1d) -> Self {
        let layout = x.structure().layout();
        Map1 {
            start: layout.start(),
            stride: layout.stride().0,
        }
    }

    #[inline(always)]
    fn at(&self, i: usize) -> usize {
        (self.start + self.stride * i as isize) as usize
    }
}

/// General matrix multiply: `C ← α·A·B + β·C`.
///
/// Multiply a transposed operand by passing its [`transpose`] view, or
/// use [`DoubleGrid2d::mult`] with flags.
///
/// **Panics** if the shapes disagree, any operand has more than one
/// channel, or `c` shares a buffer with `a` or `b`.
///
/// [`transpose`]: crate::Grid2d::transpose
pub fn general_mat_mul(alpha: f64, a: &DoubleGrid2d, b: &DoubleGrid2d, beta: f64, c: &mut DoubleGrid2d) {
    check_matrix(a);
    check_matrix(b);
    check_matrix(c);
    let (m, k) = (a.rows(), a.cols());
    let (k2, n) = (b.rows(), b.cols());
    if k != k2 || c.rows() != m || c.cols() != n {
        gemm_shape_error(m, k, k2, n, c.rows(), c.cols());
    }
    if c.storage().shares_buffer(a.storage()) || c.storage().shares_buffer(b.storage()) {
        aliased_output_error();
    }

    let am = Map2::of(a);
    let bm = Map2::of(b);
    let cm = Map2::of(c);
    let av = a.storage().borrow();
    let bv = b.storage().borrow();
    let mut cv = c.storage().borrow_mut();

    if beta != 1.0 {
        for i in 0..m {
            for j in 0..n {
                let cc = cm.at(i, j);
                cv[cc] = if beta == 0.0 { 0.0 } else { beta * cv[cc] };
            }
        }
    }

    // Tile the k and n loops so a block of B stays cached while every
    // row of A streams past it; the inner product accumulates with
    // fused multiply-add.
    let mut l0 = 0;
    while l0 < k {
        let l1 = (l0 + GEMM_BLOCK).min(k);
        let mut j0 = 0;
        while j0 < n {
            let j1 = (j0 + GEMM_BLOCK).min(n);
            for i in 0..m {
                for l in l0..l1 {
                    let a_il = alpha * av[am.at(i, l)];
                    for j in j0..j1 {
                        let cc = cm.at(i, j);
                        cv[cc] = a_il.mul_add(bv[bm.at(l, j)], cv[cc]);
                    }
                }
            }
            j0 = j1;
        }
        l0 = l1;
    }
}

/// General matrix-vector multiply: `y ← α·A·x + β·y`.
///
/// **Panics** if the shapes disagree, `a` has more than one channel,
/// or `y` shares a buffer with `a` or `x`.
pub fn general_mat_vec_mul(alpha: f64, a: &DoubleGrid2d, x: &DoubleGrid1d, beta: f64, y: &mut DoubleGrid1d) {
    check_matrix(a);
    let (m, n) = (a.rows(), a.cols());
    if x.size() != n || y.size() != m {
        gemv_shape_error(m, n, x.size(), y.size());
    }
    if y.storage().shares_buffer(a.storage()) || y.storage().shares_buffer(x.storage()) {
        aliased_output_error();
    }

    let am = Map2::of(a);
    let xm = Map1::of(x);
    let ym = Map1::of(y);
    let av = a.storage().borrow();
    let xv = x.storage().borrow();
    let mut yv = y.storage().borrow_mut();

    for i in 0..m {
        let mut sum = 0.0f64;
        for j in 0..n {
            sum = av[am.at(i, j)].mul_add(xv[xm.at(j)], sum);
        }
        let yy = ym.at(i);
        let prior = if beta == 0.0 { 0.0 } else { beta * yv[yy] };
        yv[yy] = alpha.mul_add(sum, prior);
    }
}

/// Solve `L·X = B` in place for lower triangular `L`, overwriting `B`
/// with `X`. The caller asserts triangularity: entries above the
/// diagonal are never read. With `unit_diagonal` the diagonal is taken
/// as ones and never read either.
///
/// Fails with `Singular` if a diagonal entry is zero under the active
/// tolerance; `B` is then left partially transformed.
///
/// **Panics** if `l` is not square, the row counts disagree, an operand
/// has more than one channel, or `b` shares a buffer with `l`.
pub fn solve_lower_triangular(
    l: &DoubleGrid2d,
    unit_diagonal: bool,
    b: &mut DoubleGrid2d,
) -> Result<(), LatticeError> {
    check_matrix(l);
    check_matrix(b);
    if !l.is_square() {
        square_error(l.rows(), l.cols());
    }
    let n = l.rows();
    if b.rows() != n {
        rhs_shape_error(n, b.rows());
    }
    if b.storage().shares_buffer(l.storage()) {
        aliased_output_error();
    }
    let ctx = context::context();
    let lm = Map2::of(l);
    let bm = Map2::of(b);
    let lv = l.storage().borrow();
    let mut bv = b.storage().borrow_mut();
    let p = b.cols();

    for k in 0..n {
        if !unit_diagonal {
            let pivot = lv[lm.at(k, k)];
            if ctx.is_zero(pivot) {
                return Err(LatticeError::singular());
            }
            for j in 0..p {
                bv[bm.at(k, j)] /= pivot;
            }
        }
        for i in k + 1..n {
            let factor = lv[lm.at(i, k)];
            for j in 0..p {
                let t = bv[bm.at(k, j)];
                let bb = bm.at(i, j);
                bv[bb] -= factor * t;
            }
        }
    }
    Ok(())
}

/// Solve `U·X = B` in place for upper triangular `U`, overwriting `B`
/// with `X`. The caller asserts triangularity: entries below the
/// diagonal are never read.
///
/// Fails with `Singular` if a diagonal entry is zero under the active
/// tolerance; `B` is then left partially transformed.
///
/// **Panics** under the same conditions as [`solve_lower_triangular`].
pub fn solve_upper_triangular(u: &DoubleGrid2d, b: &mut DoubleGrid2d) -> Result<(), LatticeError> {
    check_matrix(u);
    check_matrix(b);
    if !u.is_square() {
        square_error(u.rows(), u.cols());
    }
    let n = u.rows();
    if b.rows() != n {
        rhs_shape_error(n, b.rows());
    }
    if b.storage().shares_buffer(u.storage()) {
        aliased_output_error();
    }
    let ctx = context::context();
    let um = Map2::of(u);
    let bm = Map2::of(b);
    let uv = u.storage().borrow();
    let mut bv = b.storage().borrow_mut();
    let p = b.cols();

    for k in (0..n).rev() {
        let pivot = uv[um.at(k, k)];
        if ctx.is_zero(pivot) {
            return Err(LatticeError::singular());
        }
        for j in 0..p {
            bv[bm.at(k, j)] /= pivot;
        }
        for i in 0..k {
            let factor = uv[um.at(i, k)];
            for j in 0..p {
                let t = bv[bm.at(k, j)];
                let bb = bm.at(i, j);
                bv[bb] -= factor * t;
            }
        }
    }
    Ok(())
}

/// Apply a pivot sequence: `A[i,:] ↔ A[piv[i],:]`, in order.
///
/// **Panics** if a pivot row is out of bounds or `a` has more than one
/// channel.
pub fn permute_rows(a: &mut DoubleGrid2d, piv: &[usize]) {
    check_matrix(a);
    let (m, n) = (a.rows(), a.cols());
    for (i, &p) in piv.iter().enumerate() {
        if i >= m || p >= m {
            crate::grid::index_bounds_error(&[m], &[i.max(p)]);
        }
    }
    let am = Map2::of(a);
    let mut av = a.storage().borrow_mut();
    for (i, &p) in piv.iter().enumerate() {
        if p != i {
            for j in 0..n {
                av.swap(am.at(i, j), am.at(p, j));
            }
        }
    }
}

impl<A> DenseGrid1d<A>
where A: LinalgScalar + Default
{
    /// Dot product of two equally long vectors. Contiguous operands
    /// take an unrolled fast path.
    ///
    /// **Panics** if the lengths differ.
    pub fn dot(&self, rhs: &Self) -> A {
        let len = self.size();
        if rhs.size() != len {
            dot_shape_error(len, rhs.size());
        }
        if self.structure().is_contiguous() && rhs.structure().is_contiguous() {
            let a0 = self.structure().layout().start() as usize;
            let b0 = rhs.structure().layout().start() as usize;
            let av = self.storage().borrow();
            let bv = rhs.storage().borrow();
            return numeric_util::unrolled_dot(&av[a0..a0 + len], &bv[b0..b0 + len]);
        }
        let mut sum = A::zero();
        for i in 0..len {
            sum = sum + self.get(i) * rhs.get(i);
        }
        sum
    }
}

impl DoubleGrid2d {
    /// Matrix multiply with scaling and transpose flags:
    /// `C ← α·op(A)·op(B) + β·C` where `op` is identity or transpose.
    /// The transposes are view transforms; no elements move.
    ///
    /// When `c` is `None` a fresh matrix of the right shape is
    /// allocated and `β` is ignored. The written target is returned.
    ///
    /// **Panics** under the conditions of [`general_mat_mul`].
    pub fn mult(
        &self,
        b: &Self,
        c: Option<Self>,
        alpha: f64,
        beta: f64,
        trans_a: bool,
        trans_b: bool,
    ) -> Self {
        let a = if trans_a { self.t() } else { self.clone() };
        let b = if trans_b { b.t() } else { b.clone() };
        match c {
            Some(mut c) => {
                general_mat_mul(alpha, &a, &b, beta, &mut c);
                c
            }
            None => {
                let mut c = DoubleGrid2d::zeros(Extent2d::new(a.rows(), b.cols()));
                general_mat_mul(alpha, &a, &b, 0.0, &mut c);
                c
            }
        }
    }

    /// Matrix-vector multiply with scaling and a transpose flag:
    /// `y ← α·op(A)·x + β·y`.
    ///
    /// When `y` is `None` a fresh vector of the right length is
    /// allocated and `β` is ignored. The written target is returned.
    ///
    /// **Panics** under the conditions of [`general_mat_vec_mul`].
    pub fn mult_vec(
        &self,
        x: &DoubleGrid1d,
        y: Option<DoubleGrid1d>,
        alpha: f64,
        beta: f64,
        trans_a: bool,
    ) -> DoubleGrid1d {
        let a = if trans_a { self.t() } else { self.clone() };
        match y {
            Some(mut y) => {
                general_mat_vec_mul(alpha, &a, x, beta, &mut y);
                y
            }
            None => {
                let mut y = DoubleGrid1d::zeros(Extent1d::new(a.rows()));
                general_mat_vec_mul(alpha, &a, x, 0.0, &mut y);
                y
            }
        }
    }
}
