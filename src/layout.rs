// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Offset maps from dimensional indices to flat storage offsets.
//!
//! A layout is a start offset plus signed per-axis strides; the offset
//! of an index `i` is `start + Σⱼ strideⱼ · iⱼ`. Strides may be
//! negative or zero; layouts never touch storage.

use crate::extent::{Extent1d, Extent2d, Extent3d};
use crate::index::{Index2d, Index3d};

/// Signed step along the single axis of a rank-1 layout.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Stride1d(pub isize);

/// Signed steps along the axes of a rank-2 layout.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Stride2d {
    /// Step between consecutive rows.
    pub row: isize,
    /// Step between consecutive columns.
    pub col: isize,
}

impl Stride2d {
    /// Create a stride pair.
    #[inline(always)]
    pub fn new(row: isize, col: isize) -> Self {
        Stride2d { row, col }
    }
}

/// Signed steps along the axes of a rank-3 layout.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Stride3d {
    /// Step between consecutive slices.
    pub slice: isize,
    /// Step between consecutive rows.
    pub row: isize,
    /// Step between consecutive columns.
    pub col: isize,
}

impl Stride3d {
    /// Create a stride triple.
    #[inline(always)]
    pub fn new(slice: isize, row: isize, col: isize) -> Self {
        Stride3d { slice, row, col }
    }
}

/// Offset map of a rank-1 lattice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Layout1d {
    start: isize,
    stride: Stride1d,
}

impl Layout1d {
    /// Create a layout from a start offset and stride.
    pub fn new(start: isize, stride: Stride1d) -> Self {
        Layout1d { start, stride }
    }

    /// The dense forward layout for `_extent`: start 0, stride 1.
    pub fn row_major(_extent: Extent1d) -> Self {
        Layout1d { start: 0, stride: Stride1d(1) }
    }

    /// Start offset of element 0.
    #[inline]
    pub fn start(&self) -> isize {
        self.start
    }

    /// Per-axis stride.
    #[inline]
    pub fn stride(&self) -> Stride1d {
        self.stride
    }

    /// Flat offset of `index`.
    #[inline(always)]
    pub fn offset(&self, index: usize) -> isize {
        self.start + self.stride.0 * index as isize
    }
}

/// Offset map of a rank-2 lattice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Layout2d {
    start: isize,
    stride: Stride2d,
}

impl Layout2d {
    /// Create a layout from a start offset and strides.
    pub fn new(start: isize, stride: Stride2d) -> Self {
        Layout2d { start, stride }
    }

    /// The dense row-major layout for `extent`. Channels are
    /// interleaved: the column stride equals the channel count.
    pub fn row_major(extent: Extent2d) -> Self {
        let channels = extent.channels() as isize;
        Layout2d {
            start: 0,
            stride: Stride2d::new(extent.cols() as isize * channels, channels),
        }
    }

    /// Start offset of cell (0, 0).
    #[inline]
    pub fn start(&self) -> isize {
        self.start
    }

    /// Per-axis strides.
    #[inline]
    pub fn stride(&self) -> Stride2d {
        self.stride
    }

    /// Flat offset of the cell at `index`.
    #[inline(always)]
    pub fn offset(&self, index: Index2d) -> isize {
        self.start + self.stride.row * index.row as isize + self.stride.col * index.col as isize
    }

    /// Swap the row and column axes.
    pub fn transpose(&self) -> Self {
        Layout2d {
            start: self.start,
            stride: Stride2d::new(self.stride.col, self.stride.row),
        }
    }
}

/// Offset map of a rank-3 lattice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Layout3d {
    start: isize,
    stride: Stride3d,
}

impl Layout3d {
    /// Create a layout from a start offset and strides.
    pub fn new(start: isize, stride: Stride3d) -> Self {
        Layout3d { start, stride }
    }

    /// The dense row-major layout for `extent`.
    pub fn row_major(extent: Extent3d) -> Self {
        Layout3d {
            start: 0,
            stride: Stride3d::new(
                (extent.rows() * extent.cols()) as isize,
                extent.cols() as isize,
                1,
            ),
        }
    }

    /// Start offset of element (0, 0, 0).
    #[inline]
    pub fn start(&self) -> isize {
        self.start
    }

    /// Per-axis strides.
    #[inline]
    pub fn stride(&self) -> Stride3d {
        self.stride
    }

    /// Flat offset of `index`.
    #[inline(always)]
    pub fn offset(&self, index: Index3d) -> isize {
        self.start
            + self.stride.slice * index.slice as isize
            + self.stride.row * index.row as isize
            + self.stride.col * index.col as isize
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_offsets_are_dense() {
        let layout = Layout2d::row_major(Extent2d::new(3, 4));
        assert_eq!(layout.offset(Index2d::new(0, 0)), 0);
        assert_eq!(layout.offset(Index2d::new(0, 3)), 3);
        assert_eq!(layout.offset(Index2d::new(2, 1)), 9);
    }

    #[test]
    fn channels_widen_the_column_stride() {
        let layout = Layout2d::row_major(Extent2d::with_channels(2, 3, 2));
        assert_eq!(layout.stride(), Stride2d::new(6, 2));
        assert_eq!(layout.offset(Index2d::new(1, 2)), 10);
    }

    #[test]
    fn negative_strides_walk_backwards() {
        let layout = Layout1d::new(9, Stride1d(-3));
        assert_eq!(layout.offset(0), 9);
        assert_eq!(layout.offset(3), 0);
    }
}
