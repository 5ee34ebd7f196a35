// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The lattix prelude.
//!
//! ```
//! use lattix::prelude::*;
//! ```

pub use crate::context::NumericContext;
pub use crate::error::{ErrorKind, LatticeError};
pub use crate::extent::{Extent1d, Extent2d, Extent3d};
pub use crate::grid::{
    grid1, grid2, DenseGrid1d, DenseGrid2d, DenseGrid3d, DoubleGrid1d, DoubleGrid2d, DoubleGrid3d,
    Grid1d, Grid2d, Grid3d, IntGrid1d, IntGrid2d, LongGrid1d, LongGrid2d,
};
pub use crate::index::{Axis, Index2d, Index3d};
pub use crate::indexes::Order;
pub use crate::linalg::{
    CholeskyDecomposition, EigenDecomposition, LuDecomposition, QrDecomposition, SvdDecomposition,
};
pub use crate::storage::{Array, DenseArray};
pub use crate::structure::{Structure1d, Structure2d, Structure3d};
