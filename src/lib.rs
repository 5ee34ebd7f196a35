// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `lattix` crate provides dense strided lattices: rank-1/2/3 grid
//! views over flat shared buffers, plus dense double matrix kernels
//! and factorizations.
//!
//! - [`Grid1d`], [`Grid2d`], [`Grid3d`]: a grid is a structure (extent
//!   plus layout) over a storage buffer. Cloning a grid is O(1) and
//!   yields another view of the same elements.
//! - View transforms ([`range`](Grid2d::range),
//!   [`stride`](Grid2d::stride), [`transpose`](Grid2d::transpose),
//!   [`row`](Grid2d::row)/[`col`](Grid2d::col)/
//!   [`diagonal`](Grid2d::diagonal), [`slice`](Grid3d::slice)) are
//!   pure structure arithmetic; they never touch elements and compose
//!   exactly.
//! - The lattice operation set (`fill`, `assign`, `apply`, `reduce`,
//!   the matchers, tolerance-aware equality) is available on every
//!   element kind; `f64`, `i32` and `i64` grids are aliased, other
//!   kinds come from the same generic types by instantiation.
//! - [`linalg`] holds the dense double kernels (`gemm`, `gemv`,
//!   triangular solves, permutation) and the LU, QR, Cholesky, Eigen
//!   and SVD factorizations with their solvers, fronted by the
//!   [`linalg::algebra`] façade.
//!
//! ## Sharing and aliasing
//!
//! Storage is shared by reference among all views; mutation through
//! one view is visible to every grid over the same buffer. The library
//! is single-threaded and re-entrant, with no internal
//! synchronization. Kernels refuse an output that shares a buffer with
//! an input; detach with [`copy`](Grid2d::copy) first.
//!
//! ## Tolerances
//!
//! Floating point comparison goes through the
//! [`NumericContext`](context::NumericContext): install one process
//! wide at startup ([`context::install`]) or pass one explicitly to
//! the `_with` variants. The default is exact comparison.
//!
//! ## Crate feature flags
//!
//! - `approx`: `AbsDiffEq`/`RelativeEq` implementations for grids.

pub use crate::context::NumericContext;
pub use crate::error::{ErrorKind, LatticeError};
pub use crate::extent::{Extent1d, Extent2d, Extent3d, MAX_ELEMENTS};
pub use crate::grid::{
    grid1, grid2, DenseGrid1d, DenseGrid2d, DenseGrid3d, DoubleGrid1d, DoubleGrid2d, DoubleGrid3d,
    Grid1d, Grid2d, Grid3d, IntGrid1d, IntGrid2d, LongGrid1d, LongGrid2d,
};
pub use crate::index::{Axis, Index2d, Index3d};
pub use crate::indexes::{Indices1d, Indices2d, Indices3d, Order};
pub use crate::layout::{Layout1d, Layout2d, Layout3d, Stride1d, Stride2d, Stride3d};
pub use crate::storage::{Array, DenseArray};
pub use crate::structure::{Structure1d, Structure2d, Structure3d};

pub mod context;
mod error;
mod extent;
mod format;
mod grid;
#[cfg(feature = "approx")]
mod grid_approx;
mod impl_lattice;
mod impl_views;
mod index;
mod indexes;
mod layout;
pub mod linalg;
mod numeric_util;
pub mod prelude;
mod storage;
mod structure;
