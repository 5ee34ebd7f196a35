// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! View methods on grids.
//!
//! Every method here is O(1): it clones the storage handle and
//! transforms the structure. Mutation through a view is visible to
//! every other grid sharing the storage.

use crate::extent::{Extent1d, Extent2d, Extent3d};
use crate::grid::{Grid1d, Grid2d, Grid3d};
use crate::index::{Axis, Index2d, Index3d};
use crate::storage::Array;

impl<A, S> Grid1d<S>
where S: Array<Elem = A>
{
    /// A view of the sub-range `[start, start + extent)`.
    ///
    /// **Panics** if the sub-range reaches past the extent.
    pub fn range(&self, start: usize, extent: Extent1d) -> Self {
        Grid1d {
            structure: self.structure.range(start, extent),
            storage: self.storage.clone(),
        }
    }

    /// A view keeping every `step`-th element.
    ///
    /// **Panics** if `step` is zero.
    pub fn stride(&self, step: usize) -> Self {
        Grid1d {
            structure: self.structure.stride(step),
            storage: self.storage.clone(),
        }
    }
}

impl<A, S> Grid2d<S>
where S: Array<Elem = A>
{
    /// A view of the sub-box starting at `start` with shape `extent`.
    ///
    /// **Panics** if the sub-box reaches past the extent or the
    /// channel counts differ.
    pub fn range<I: Into<Index2d>>(&self, start: I, extent: Extent2d) -> Self {
        Grid2d {
            structure: self.structure.range(start.into(), extent),
            storage: self.storage.clone(),
        }
    }

    /// A view keeping every `row_step`-th row and `col_step`-th column.
    ///
    /// **Panics** if either step is zero.
    pub fn stride(&self, row_step: usize, col_step: usize) -> Self {
        Grid2d {
            structure: self.structure.stride(row_step, col_step),
            storage: self.storage.clone(),
        }
    }

    /// The transposed view. No elements move; applying it twice
    /// restores the original view.
    pub fn transpose(&self) -> Self {
        Grid2d {
            structure: self.structure.transpose(),
            storage: self.storage.clone(),
        }
    }

    /// Shorthand for [`transpose`][Grid2d::transpose].
    pub fn t(&self) -> Self {
        self.transpose()
    }

    /// A rank-1 view of row `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    pub fn row(&self, index: usize) -> Grid1d<S> {
        Grid1d {
            structure: self.structure.row(index),
            storage: self.storage.clone(),
        }
    }

    /// A rank-1 view of column `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    pub fn col(&self, index: usize) -> Grid1d<S> {
        Grid1d {
            structure: self.structure.col(index),
            storage: self.storage.clone(),
        }
    }

    /// A rank-1 view of the main diagonal, length `min(rows, cols)`.
    pub fn diagonal(&self) -> Grid1d<S> {
        Grid1d {
            structure: self.structure.diagonal(),
            storage: self.storage.clone(),
        }
    }

    /// A single-channel view selecting channel `channel` of every cell.
    ///
    /// **Panics** if `channel` is out of bounds.
    pub fn band(&self, channel: usize) -> Self {
        Grid2d {
            structure: self.structure.band(channel),
            storage: self.storage.clone(),
        }
    }
}

impl<A, S> Grid3d<S>
where S: Array<Elem = A>
{
    /// A view of the sub-box starting at `start` with shape `extent`.
    ///
    /// **Panics** if the sub-box reaches past the extent.
    pub fn range<I: Into<Index3d>>(&self, start: I, extent: Extent3d) -> Self {
        Grid3d {
            structure: self.structure.range(start.into(), extent),
            storage: self.storage.clone(),
        }
    }

    /// A view keeping every `slice_step`-th slice, `row_step`-th row
    /// and `col_step`-th column.
    ///
    /// **Panics** if any step is zero.
    pub fn stride(&self, slice_step: usize, row_step: usize, col_step: usize) -> Self {
        Grid3d {
            structure: self.structure.stride(slice_step, row_step, col_step),
            storage: self.storage.clone(),
        }
    }

    /// A view with axes `a` and `b` swapped.
    ///
    /// **Panics** if an axis is out of range.
    pub fn dice(&self, a: Axis, b: Axis) -> Self {
        Grid3d {
            structure: self.structure.dice(a, b),
            storage: self.storage.clone(),
        }
    }

    /// A rank-2 view of slice `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    pub fn slice(&self, index: usize) -> Grid2d<S> {
        Grid2d {
            structure: self.structure.slice(index),
            storage: self.storage.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{grid2, DoubleGrid3d, IntGrid2d};

    #[test]
    fn views_share_the_buffer() {
        let a = grid2(&[[1, 2, 3], [4, 5, 6]]);
        let mut t = a.t();
        assert_eq!(t.get((2, 1)), 6);
        t.set((0, 1), 40);
        assert_eq!(a.get((1, 0)), 40);
    }

    #[test]
    fn row_col_and_diagonal_are_windows() {
        let a = grid2(&[[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        assert_eq!(a.row(1).to_vec(), vec![4, 5, 6]);
        assert_eq!(a.col(2).to_vec(), vec![3, 6, 9]);
        assert_eq!(a.diagonal().to_vec(), vec![1, 5, 9]);
        let mut d = a.diagonal();
        d.set(1, 50);
        assert_eq!(a.get((1, 1)), 50);
    }

    #[test]
    fn range_of_range_composes() {
        let a: IntGrid2d = grid2(&[
            [0, 1, 2, 3, 4],
            [5, 6, 7, 8, 9],
            [10, 11, 12, 13, 14],
            [15, 16, 17, 18, 19],
        ]);
        let inner = a
            .range((1, 1), Extent2d::new(3, 3))
            .range((1, 1), Extent2d::new(2, 2));
        assert_eq!(inner.get((0, 0)), a.get((2, 2)));
        assert_eq!(inner.get((1, 1)), a.get((3, 3)));
    }

    #[test]
    fn dice_and_slice_agree() {
        let mut g = DoubleGrid3d::zeros(Extent3d::new(2, 3, 4));
        g.set((1, 2, 3), 8.0);
        let d = g.dice(Axis(0), Axis(1));
        assert_eq!(d.get((2, 1, 3)), 8.0);
        assert_eq!(g.slice(1).get((2, 3)), 8.0);
    }
}
