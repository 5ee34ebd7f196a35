// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Structures pair an extent with a layout and carry the view algebra.
//!
//! All view transforms are pure: they return a new structure over the
//! same storage in O(1) and never touch elements. Composition is exact
//! under repeated transformation; see the crate tests for the laws.

use crate::error::LatticeError;
use crate::extent::{Extent1d, Extent2d, Extent3d};
use crate::index::{Axis, Index2d, Index3d};
use crate::layout::{Layout1d, Layout2d, Layout3d, Stride1d, Stride2d, Stride3d};

#[cold]
#[inline(never)]
fn range_bounds_error(extent: &[usize], index: &[usize]) -> ! {
    panic!("lattix: {}", LatticeError::index_out_of_bounds(extent, index));
}

#[cold]
#[inline(never)]
fn zero_step_error() -> ! {
    panic!("lattix: stride view requires steps of at least 1");
}

#[inline]
fn strided_len(len: usize, step: usize) -> usize {
    if step == 0 {
        zero_step_error();
    }
    if len > 0 {
        (len - 1) / step + 1
    } else {
        0
    }
}

/// Extent and layout of a rank-1 lattice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Structure1d {
    extent: Extent1d,
    layout: Layout1d,
}

impl Structure1d {
    /// Create a dense forward structure for `extent`.
    pub fn new(extent: Extent1d) -> Self {
        Structure1d {
            extent,
            layout: Layout1d::row_major(extent),
        }
    }

    /// Create a structure from an extent and an explicit layout.
    pub fn with_layout(extent: Extent1d, layout: Layout1d) -> Self {
        Structure1d { extent, layout }
    }

    /// The extent.
    #[inline]
    pub fn extent(&self) -> Extent1d {
        self.extent
    }

    /// The layout.
    #[inline]
    pub fn layout(&self) -> Layout1d {
        self.layout
    }

    /// Flat offset of `index`.
    #[inline(always)]
    pub fn offset(&self, index: usize) -> isize {
        self.layout.offset(index)
    }

    /// Restrict to the sub-range `[start, start + extent)`.
    ///
    /// **Panics** if the sub-range reaches past the extent.
    pub fn range(&self, start: usize, extent: Extent1d) -> Self {
        if start + extent.length() > self.extent.length() {
            range_bounds_error(&[self.extent.length()], &[start + extent.length()]);
        }
        Structure1d {
            extent,
            layout: Layout1d::new(self.layout.offset(start), self.layout.stride()),
        }
    }

    /// Keep every `step`-th element.
    ///
    /// **Panics** if `step` is zero.
    pub fn stride(&self, step: usize) -> Self {
        Structure1d {
            extent: Extent1d::new(strided_len(self.extent.length(), step)),
            layout: Layout1d::new(
                self.layout.start(),
                Stride1d(self.layout.stride().0 * step as isize),
            ),
        }
    }

    /// Whether elements are laid out consecutively.
    pub fn is_contiguous(&self) -> bool {
        self.layout.stride().0 == 1
    }

    pub(crate) fn offset_bounds(&self) -> Option<(isize, isize)> {
        if self.extent.length() == 0 {
            return None;
        }
        let reach = self.layout.stride().0 * (self.extent.length() as isize - 1);
        let start = self.layout.start();
        Some((start + reach.min(0), start + reach.max(0)))
    }
}

/// Extent and layout of a rank-2 lattice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Structure2d {
    extent: Extent2d,
    layout: Layout2d,
}

impl Structure2d {
    /// Create a dense row-major structure for `extent`.
    pub fn new(extent: Extent2d) -> Self {
        Structure2d {
            extent,
            layout: Layout2d::row_major(extent),
        }
    }

    /// Create a structure from an extent and an explicit layout.
    pub fn with_layout(extent: Extent2d, layout: Layout2d) -> Self {
        Structure2d { extent, layout }
    }

    /// The extent.
    #[inline]
    pub fn extent(&self) -> Extent2d {
        self.extent
    }

    /// The layout.
    #[inline]
    pub fn layout(&self) -> Layout2d {
        self.layout
    }

    /// Flat offset of the cell at `index`.
    #[inline(always)]
    pub fn offset(&self, index: Index2d) -> isize {
        self.layout.offset(index)
    }

    /// Restrict to the sub-box starting at `start` with shape `extent`.
    /// The sub-extent must carry the same channel count.
    ///
    /// **Panics** if the sub-box reaches past the extent or the channel
    /// counts differ.
    pub fn range(&self, start: Index2d, extent: Extent2d) -> Self {
        if start.row + extent.rows() > self.extent.rows()
            || start.col + extent.cols() > self.extent.cols()
        {
            range_bounds_error(
                &[self.extent.rows(), self.extent.cols()],
                &[start.row + extent.rows(), start.col + extent.cols()],
            );
        }
        if extent.channels() != self.extent.channels() {
            panic!(
                "lattix: sub-extent channels {} do not match parent channels {}",
                extent.channels(),
                self.extent.channels()
            );
        }
        Structure2d {
            extent,
            layout: Layout2d::new(self.layout.offset(start), self.layout.stride()),
        }
    }

    /// Keep every `row_step`-th row and `col_step`-th column.
    ///
    /// **Panics** if either step is zero.
    pub fn stride(&self, row_step: usize, col_step: usize) -> Self {
        let stride = self.layout.stride();
        Structure2d {
            extent: Extent2d::with_channels(
                strided_len(self.extent.rows(), row_step),
                strided_len(self.extent.cols(), col_step),
                self.extent.channels(),
            ),
            layout: Layout2d::new(
                self.layout.start(),
                Stride2d::new(stride.row * row_step as isize, stride.col * col_step as isize),
            ),
        }
    }

    /// Swap the row and column axes. An involution: applying it twice
    /// restores the structure.
    pub fn transpose(&self) -> Self {
        Structure2d {
            extent: self.extent.transpose(),
            layout: self.layout.transpose(),
        }
    }

    /// Project out row `index` as a rank-1 structure over the columns.
    ///
    /// **Panics** if `index` is out of bounds.
    pub fn row(&self, index: usize) -> Structure1d {
        if index >= self.extent.rows() {
            range_bounds_error(&[self.extent.rows(), self.extent.cols()], &[index, 0]);
        }
        Structure1d::with_layout(
            Extent1d::new(self.extent.cols()),
            Layout1d::new(
                self.layout.start() + self.layout.stride().row * index as isize,
                Stride1d(self.layout.stride().col),
            ),
        )
    }

    /// Project out column `index` as a rank-1 structure over the rows.
    ///
    /// **Panics** if `index` is out of bounds.
    pub fn col(&self, index: usize) -> Structure1d {
        if index >= self.extent.cols() {
            range_bounds_error(&[self.extent.rows(), self.extent.cols()], &[0, index]);
        }
        Structure1d::with_layout(
            Extent1d::new(self.extent.rows()),
            Layout1d::new(
                self.layout.start() + self.layout.stride().col * index as isize,
                Stride1d(self.layout.stride().row),
            ),
        )
    }

    /// Project out the main diagonal as a rank-1 structure of length
    /// `min(rows, cols)`.
    pub fn diagonal(&self) -> Structure1d {
        let stride = self.layout.stride();
        Structure1d::with_layout(
            Extent1d::new(self.extent.rows().min(self.extent.cols())),
            Layout1d::new(self.layout.start(), Stride1d(stride.row + stride.col)),
        )
    }

    /// Select channel `channel` of every cell; the result has one
    /// channel.
    ///
    /// **Panics** if `channel` is out of bounds.
    pub fn band(&self, channel: usize) -> Self {
        if channel >= self.extent.channels() {
            range_bounds_error(&[self.extent.channels()], &[channel]);
        }
        Structure2d {
            extent: Extent2d::new(self.extent.rows(), self.extent.cols()),
            layout: Layout2d::new(self.layout.start() + channel as isize, self.layout.stride()),
        }
    }

    /// Whether elements are laid out consecutively in row-major order.
    pub fn is_contiguous(&self) -> bool {
        let stride = self.layout.stride();
        let channels = self.extent.channels() as isize;
        stride.col == channels && stride.row == self.extent.cols() as isize * channels
    }

    pub(crate) fn offset_bounds(&self) -> Option<(isize, isize)> {
        if self.extent.length() == 0 {
            return None;
        }
        let stride = self.layout.stride();
        let axes = [
            (self.extent.rows(), stride.row),
            (self.extent.cols(), stride.col),
            (self.extent.channels(), 1),
        ];
        let mut lo = self.layout.start();
        let mut hi = lo;
        for (len, step) in axes {
            let reach = step * (len as isize - 1);
            lo += reach.min(0);
            hi += reach.max(0);
        }
        Some((lo, hi))
    }
}

/// Extent and layout of a rank-3 lattice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Structure3d {
    extent: Extent3d,
    layout: Layout3d,
}

impl Structure3d {
    /// Create a dense row-major structure for `extent`.
    pub fn new(extent: Extent3d) -> Self {
        Structure3d {
            extent,
            layout: Layout3d::row_major(extent),
        }
    }

    /// Create a structure from an extent and an explicit layout.
    pub fn with_layout(extent: Extent3d, layout: Layout3d) -> Self {
        Structure3d { extent, layout }
    }

    /// The extent.
    #[inline]
    pub fn extent(&self) -> Extent3d {
        self.extent
    }

    /// The layout.
    #[inline]
    pub fn layout(&self) -> Layout3d {
        self.layout
    }

    /// Flat offset of `index`.
    #[inline(always)]
    pub fn offset(&self, index: Index3d) -> isize {
        self.layout.offset(index)
    }

    /// Restrict to the sub-box starting at `start` with shape `extent`.
    ///
    /// **Panics** if the sub-box reaches past the extent.
    pub fn range(&self, start: Index3d, extent: Extent3d) -> Self {
        if start.slice + extent.slices() > self.extent.slices()
            || start.row + extent.rows() > self.extent.rows()
            || start.col + extent.cols() > self.extent.cols()
        {
            range_bounds_error(
                &[self.extent.slices(), self.extent.rows(), self.extent.cols()],
                &[
                    start.slice + extent.slices(),
                    start.row + extent.rows(),
                    start.col + extent.cols(),
                ],
            );
        }
        Structure3d {
            extent,
            layout: Layout3d::new(self.layout.offset(start), self.layout.stride()),
        }
    }

    /// Keep every `slice_step`-th slice, `row_step`-th row and
    /// `col_step`-th column.
    ///
    /// **Panics** if any step is zero.
    pub fn stride(&self, slice_step: usize, row_step: usize, col_step: usize) -> Self {
        let stride = self.layout.stride();
        Structure3d {
            extent: Extent3d::new(
                strided_len(self.extent.slices(), slice_step),
                strided_len(self.extent.rows(), row_step),
                strided_len(self.extent.cols(), col_step),
            ),
            layout: Layout3d::new(
                self.layout.start(),
                Stride3d::new(
                    stride.slice * slice_step as isize,
                    stride.row * row_step as isize,
                    stride.col * col_step as isize,
                ),
            ),
        }
    }

    /// Swap axes `a` and `b`. `dice(a, b)` twice restores the
    /// structure; a rank-2 transpose is `dice(Axis(1), Axis(2))` on
    /// each slice.
    ///
    /// **Panics** if an axis is out of range.
    pub fn dice(&self, a: Axis, b: Axis) -> Self {
        let mut axes = [
            (self.extent.slices(), self.layout.stride().slice),
            (self.extent.rows(), self.layout.stride().row),
            (self.extent.cols(), self.layout.stride().col),
        ];
        if a.index() > 2 || b.index() > 2 {
            panic!("lattix: axis {} out of range for rank 3", a.index().max(b.index()));
        }
        axes.swap(a.index(), b.index());
        Structure3d {
            extent: Extent3d::new(axes[0].0, axes[1].0, axes[2].0),
            layout: Layout3d::new(
                self.layout.start(),
                Stride3d::new(axes[0].1, axes[1].1, axes[2].1),
            ),
        }
    }

    /// Project out slice `index` as a rank-2 structure over rows and
    /// columns.
    ///
    /// **Panics** if `index` is out of bounds.
    pub fn slice(&self, index: usize) -> Structure2d {
        if index >= self.extent.slices() {
            range_bounds_error(
                &[self.extent.slices(), self.extent.rows(), self.extent.cols()],
                &[index, 0, 0],
            );
        }
        let stride = self.layout.stride();
        Structure2d::with_layout(
            Extent2d::new(self.extent.rows(), self.extent.cols()),
            Layout2d::new(
                self.layout.start() + stride.slice * index as isize,
                Stride2d::new(stride.row, stride.col),
            ),
        )
    }

    /// Whether elements are laid out consecutively in row-major order.
    pub fn is_contiguous(&self) -> bool {
        let stride = self.layout.stride();
        stride.col == 1
            && stride.row == self.extent.cols() as isize
            && stride.slice == (self.extent.rows() * self.extent.cols()) as isize
    }

    pub(crate) fn offset_bounds(&self) -> Option<(isize, isize)> {
        if self.extent.length() == 0 {
            return None;
        }
        let stride = self.layout.stride();
        let axes = [
            (self.extent.slices(), stride.slice),
            (self.extent.rows(), stride.row),
            (self.extent.cols(), stride.col),
        ];
        let mut lo = self.layout.start();
        let mut hi = lo;
        for (len, step) in axes {
            let reach = step * (len as isize - 1);
            lo += reach.min(0);
            hi += reach.max(0);
        }
        Some((lo, hi))
    }
}
