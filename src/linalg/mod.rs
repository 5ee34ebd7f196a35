// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Linear algebra on dense double matrices.
//!
//! A matrix here is a single-channel [`DoubleGrid2d`]; transposed and
//! sliced views work everywhere since the kernels read through the
//! layout. Factorizations copy their input and own their results.
//!
//! [`DoubleGrid2d`]: crate::DoubleGrid2d

use std::ops::{Add, Div, Mul, Sub};

use num_traits::{One, Zero};

use crate::grid::Grid2d;
use crate::storage::Array;

pub mod algebra;
pub mod blas;
pub mod cholesky;
pub mod eigen;
pub mod lu;
pub mod qr;
pub mod svd;

pub use self::algebra::{cond, det, inverse, norm1, norm2, norm_f, norm_inf, rank, solve, trace};
pub use self::blas::{
    general_mat_mul, general_mat_vec_mul, permute_rows, solve_lower_triangular,
    solve_upper_triangular,
};
pub use self::cholesky::CholeskyDecomposition;
pub use self::eigen::EigenDecomposition;
pub use self::lu::LuDecomposition;
pub use self::qr::QrDecomposition;
pub use self::svd::SvdDecomposition;

/// Elements that support linear algebra operations.
///
/// `Zero` and `One` are additive and multiplicative identities.
pub trait LinalgScalar:
    'static
    + Copy
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
}

impl<T> LinalgScalar for T where T: 'static
        + Copy
        + Zero
        + One
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
{
}

#[cold]
#[inline(never)]
fn channel_error(channels: usize) -> ! {
    panic!(
        "lattix: matrix kernels require single-channel grids, got {} channels",
        channels
    );
}

#[cold]
#[inline(never)]
pub(crate) fn square_error(rows: usize, cols: usize) -> ! {
    panic!("lattix: matrix must be square, got {} × {}", rows, cols);
}

pub(crate) fn check_matrix<A, S>(a: &Grid2d<S>)
where S: Array<Elem = A> {
    if a.channels() != 1 {
        channel_error(a.channels());
    }
}
