// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Grids: structure plus storage.
//!
//! A grid is a window onto a flat storage buffer. Cloning a grid is
//! O(1) and yields another view of the same buffer; [`Grid2d::copy`]
//! and friends detach. Grids are never resized.

use num_traits::{One, Zero};

use crate::error::LatticeError;
use crate::extent::{Extent1d, Extent2d, Extent3d};
use crate::index::{Index2d, Index3d};
use crate::indexes::Order;
use crate::storage::{Array, DenseArray};
use crate::structure::{Structure1d, Structure2d, Structure3d};

#[cold]
#[inline(never)]
pub(crate) fn index_bounds_error(extent: &[usize], index: &[usize]) -> ! {
    panic!("lattix: {}", LatticeError::index_out_of_bounds(extent, index));
}

fn check_span(lo_hi: Option<(isize, isize)>, len: usize) -> Result<(), LatticeError> {
    match lo_hi {
        None => Ok(()),
        Some((lo, hi)) if lo >= 0 && (hi as usize) < len => Ok(()),
        Some((_, hi)) => Err(LatticeError::index_out_of_bounds(&[len], &[hi.max(0) as usize])),
    }
}

/// A rank-1 lattice: a strided view of element type `S::Elem` onto a
/// flat storage buffer.
#[derive(Clone)]
pub struct Grid1d<S: Array> {
    pub(crate) structure: Structure1d,
    pub(crate) storage: S,
}

/// A rank-2 lattice. Dense `f64` grids double as the matrix type of
/// the `linalg` module.
#[derive(Clone)]
pub struct Grid2d<S: Array> {
    pub(crate) structure: Structure2d,
    pub(crate) storage: S,
}

/// A rank-3 lattice.
#[derive(Clone)]
pub struct Grid3d<S: Array> {
    pub(crate) structure: Structure3d,
    pub(crate) storage: S,
}

/// A rank-1 grid over dense shared storage.
pub type DenseGrid1d<A> = Grid1d<DenseArray<A>>;
/// A rank-2 grid over dense shared storage.
pub type DenseGrid2d<A> = Grid2d<DenseArray<A>>;
/// A rank-3 grid over dense shared storage.
pub type DenseGrid3d<A> = Grid3d<DenseArray<A>>;

/// Dense rank-1 grid of doubles.
pub type DoubleGrid1d = DenseGrid1d<f64>;
/// Dense rank-2 grid of doubles; the matrix type of `linalg`.
pub type DoubleGrid2d = DenseGrid2d<f64>;
/// Dense rank-3 grid of doubles.
pub type DoubleGrid3d = DenseGrid3d<f64>;
/// Dense rank-1 grid of 32-bit integers.
pub type IntGrid1d = DenseGrid1d<i32>;
/// Dense rank-2 grid of 32-bit integers.
pub type IntGrid2d = DenseGrid2d<i32>;
/// Dense rank-1 grid of 64-bit integers.
pub type LongGrid1d = DenseGrid1d<i64>;
/// Dense rank-2 grid of 64-bit integers.
pub type LongGrid2d = DenseGrid2d<i64>;

impl<A, S> Grid1d<S>
where S: Array<Elem = A>
{
    /// Wrap `storage` under `structure`.
    ///
    /// Fails with `IndexOutOfBounds` if any in-range index would map
    /// outside the storage.
    pub fn from_parts(structure: Structure1d, storage: S) -> Result<Self, LatticeError> {
        check_span(structure.offset_bounds(), storage.len())?;
        Ok(Grid1d { structure, storage })
    }

    /// The structure of this view.
    #[inline]
    pub fn structure(&self) -> &Structure1d {
        &self.structure
    }

    /// The extent of this view.
    #[inline]
    pub fn extent(&self) -> Extent1d {
        self.structure.extent()
    }

    /// Number of elements in this view.
    #[inline]
    pub fn size(&self) -> usize {
        self.structure.extent().length()
    }

    /// Whether this view holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// A read-only handle to the underlying storage.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the element at `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> A {
        if index >= self.size() {
            index_bounds_error(&[self.size()], &[index]);
        }
        self.storage.get(self.structure.offset(index) as usize)
    }

    /// Write the element at `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, value: A) {
        if index >= self.size() {
            index_bounds_error(&[self.size()], &[index]);
        }
        let offset = self.structure.offset(index) as usize;
        self.storage.set(offset, value);
    }

    /// Detach: allocate fresh storage of the same kind and copy every
    /// element of this view into it.
    pub fn copy(&self) -> Self {
        let extent = self.extent();
        let mut storage = self.storage.like(extent.length());
        for (k, offset) in self.offsets(Order::RowMajor).enumerate() {
            storage.set(k, self.storage.get(offset));
        }
        Grid1d { structure: Structure1d::new(extent), storage }
    }

    /// Copy the elements of this view out as a `Vec`.
    pub fn to_vec(&self) -> Vec<A> {
        self.offsets(Order::RowMajor).map(|offset| self.storage.get(offset)).collect()
    }

    pub(crate) fn offsets(&self, order: Order) -> impl Iterator<Item = usize> {
        let structure = self.structure;
        structure.extent().indices(order).map(move |i| structure.offset(i) as usize)
    }
}

impl<A: Clone + Default> DenseGrid1d<A> {
    /// Allocate a dense grid of default-valued elements.
    pub fn new(extent: Extent1d) -> Self {
        Grid1d {
            structure: Structure1d::new(extent),
            storage: DenseArray::new(extent.length()),
        }
    }

    /// Allocate a dense grid filled with `elem`.
    pub fn from_elem(extent: Extent1d, elem: A) -> Self {
        Grid1d {
            structure: Structure1d::new(extent),
            storage: DenseArray::from_elem(extent.length(), elem),
        }
    }

    /// Wrap a vector as a dense grid without copying.
    pub fn from_vec(vec: Vec<A>) -> Self {
        let extent = Extent1d::new(vec.len());
        Grid1d {
            structure: Structure1d::new(extent),
            storage: DenseArray::from_vec(vec),
        }
    }
}

impl<A: Clone + Default + Zero> DenseGrid1d<A> {
    /// Allocate a dense grid of zeros.
    pub fn zeros(extent: Extent1d) -> Self {
        Self::from_elem(extent, A::zero())
    }
}

impl<A, S> Grid2d<S>
where S: Array<Elem = A>
{
    /// Wrap `storage` under `structure`.
    ///
    /// Fails with `IndexOutOfBounds` if any in-range index (including
    /// channels) would map outside the storage.
    pub fn from_parts(structure: Structure2d, storage: S) -> Result<Self, LatticeError> {
        check_span(structure.offset_bounds(), storage.len())?;
        Ok(Grid2d { structure, storage })
    }

    /// The structure of this view.
    #[inline]
    pub fn structure(&self) -> &Structure2d {
        &self.structure
    }

    /// The extent of this view.
    #[inline]
    pub fn extent(&self) -> Extent2d {
        self.structure.extent()
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.structure.extent().rows()
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.structure.extent().cols()
    }

    /// Number of values per cell.
    #[inline]
    pub fn channels(&self) -> usize {
        self.structure.extent().channels()
    }

    /// Whether the view has as many rows as columns.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    /// Number of elements in this view, channels included.
    #[inline]
    pub fn size(&self) -> usize {
        self.structure.extent().length()
    }

    /// Whether this view holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// A read-only handle to the underlying storage.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[inline]
    fn check_index(&self, index: Index2d) {
        let extent = self.structure.extent();
        if index.row >= extent.rows() || index.col >= extent.cols() {
            index_bounds_error(&[extent.rows(), extent.cols()], &[index.row, index.col]);
        }
    }

    /// Read the cell at `index` (channel 0). Select another channel
    /// with [`Grid2d::band`] first.
    ///
    /// **Panics** if `index` is out of bounds.
    ///
    /// [`Grid2d::band`]: Grid2d::band
    #[inline]
    pub fn get<I: Into<Index2d>>(&self, index: I) -> A {
        let index = index.into();
        self.check_index(index);
        self.storage.get(self.structure.offset(index) as usize)
    }

    /// Write the cell at `index` (channel 0).
    ///
    /// **Panics** if `index` is out of bounds.
    #[inline]
    pub fn set<I: Into<Index2d>>(&mut self, index: I, value: A) {
        let index = index.into();
        self.check_index(index);
        let offset = self.structure.offset(index) as usize;
        self.storage.set(offset, value);
    }

    /// Detach: allocate fresh storage of the same kind and copy every
    /// element of this view into it. The copy is dense row-major.
    pub fn copy(&self) -> Self {
        let extent = self.extent();
        let mut storage = self.storage.like(extent.length());
        for (k, offset) in self.offsets(Order::RowMajor).enumerate() {
            storage.set(k, self.storage.get(offset));
        }
        Grid2d { structure: Structure2d::new(extent), storage }
    }

    /// Copy the elements of this view out as a row-major `Vec` with
    /// interleaved channels.
    pub fn to_vec(&self) -> Vec<A> {
        self.offsets(Order::RowMajor).map(|offset| self.storage.get(offset)).collect()
    }

    pub(crate) fn offsets(&self, order: Order) -> impl Iterator<Item = usize> {
        let structure = self.structure;
        let channels = structure.extent().channels();
        let backward = matches!(order, Order::Backward);
        structure.extent().indices(order).flat_map(move |index| {
            let base = structure.offset(index);
            (0..channels).map(move |k| {
                let k = if backward { channels - 1 - k } else { k };
                (base + k as isize) as usize
            })
        })
    }
}

impl<A: Clone + Default> DenseGrid2d<A> {
    /// Allocate a dense grid of default-valued elements. This is the
    /// dense factory: fresh storage of exactly `extent.length()`
    /// elements.
    pub fn new(extent: Extent2d) -> Self {
        Grid2d {
            structure: Structure2d::new(extent),
            storage: DenseArray::new(extent.length()),
        }
    }

    /// Allocate a dense grid filled with `elem`.
    pub fn from_elem(extent: Extent2d, elem: A) -> Self {
        Grid2d {
            structure: Structure2d::new(extent),
            storage: DenseArray::from_elem(extent.length(), elem),
        }
    }

    /// Wrap a row-major vector as a dense grid without copying.
    ///
    /// Fails with `ShapeMismatch` if the vector length does not equal
    /// `extent.length()`.
    pub fn from_vec(extent: Extent2d, vec: Vec<A>) -> Result<Self, LatticeError> {
        if vec.len() != extent.length() {
            return Err(LatticeError::shape_mismatch(&[extent.length()], &[vec.len()]));
        }
        Ok(Grid2d {
            structure: Structure2d::new(extent),
            storage: DenseArray::from_vec(vec),
        })
    }

    pub(crate) fn from_dense(extent: Extent2d, vec: Vec<A>) -> Self {
        debug_assert_eq!(vec.len(), extent.length());
        Grid2d {
            structure: Structure2d::new(extent),
            storage: DenseArray::from_vec(vec),
        }
    }
}

impl<A: Clone + Default + Zero> DenseGrid2d<A> {
    /// Allocate a dense grid of zeros.
    pub fn zeros(extent: Extent2d) -> Self {
        Self::from_elem(extent, A::zero())
    }
}

impl<A: Clone + Default + Zero + One> DenseGrid2d<A> {
    /// The `n`×`n` identity matrix.
    pub fn eye(n: usize) -> Self {
        let mut grid = Self::zeros(Extent2d::new(n, n));
        for i in 0..n {
            grid.set((i, i), A::one());
        }
        grid
    }
}

impl<A, S> Grid3d<S>
where S: Array<Elem = A>
{
    /// Wrap `storage` under `structure`.
    ///
    /// Fails with `IndexOutOfBounds` if any in-range index would map
    /// outside the storage.
    pub fn from_parts(structure: Structure3d, storage: S) -> Result<Self, LatticeError> {
        check_span(structure.offset_bounds(), storage.len())?;
        Ok(Grid3d { structure, storage })
    }

    /// The structure of this view.
    #[inline]
    pub fn structure(&self) -> &Structure3d {
        &self.structure
    }

    /// The extent of this view.
    #[inline]
    pub fn extent(&self) -> Extent3d {
        self.structure.extent()
    }

    /// Number of elements in this view.
    #[inline]
    pub fn size(&self) -> usize {
        self.structure.extent().length()
    }

    /// Whether this view holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// A read-only handle to the underlying storage.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[inline]
    fn check_index(&self, index: Index3d) {
        let extent = self.structure.extent();
        if index.slice >= extent.slices() || index.row >= extent.rows() || index.col >= extent.cols() {
            index_bounds_error(
                &[extent.slices(), extent.rows(), extent.cols()],
                &[index.slice, index.row, index.col],
            );
        }
    }

    /// Read the element at `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    #[inline]
    pub fn get<I: Into<Index3d>>(&self, index: I) -> A {
        let index = index.into();
        self.check_index(index);
        self.storage.get(self.structure.offset(index) as usize)
    }

    /// Write the element at `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    #[inline]
    pub fn set<I: Into<Index3d>>(&mut self, index: I, value: A) {
        let index = index.into();
        self.check_index(index);
        let offset = self.structure.offset(index) as usize;
        self.storage.set(offset, value);
    }

    /// Detach: allocate fresh storage of the same kind and copy every
    /// element of this view into it.
    pub fn copy(&self) -> Self {
        let extent = self.extent();
        let mut storage = self.storage.like(extent.length());
        for (k, offset) in self.offsets(Order::RowMajor).enumerate() {
            storage.set(k, self.storage.get(offset));
        }
        Grid3d { structure: Structure3d::new(extent), storage }
    }

    /// Copy the elements of this view out as a row-major `Vec`.
    pub fn to_vec(&self) -> Vec<A> {
        self.offsets(Order::RowMajor).map(|offset| self.storage.get(offset)).collect()
    }

    pub(crate) fn offsets(&self, order: Order) -> impl Iterator<Item = usize> {
        let structure = self.structure;
        structure.extent().indices(order).map(move |index| structure.offset(index) as usize)
    }
}

impl<A: Clone + Default> DenseGrid3d<A> {
    /// Allocate a dense grid of default-valued elements.
    pub fn new(extent: Extent3d) -> Self {
        Grid3d {
            structure: Structure3d::new(extent),
            storage: DenseArray::new(extent.length()),
        }
    }

    /// Allocate a dense grid filled with `elem`.
    pub fn from_elem(extent: Extent3d, elem: A) -> Self {
        Grid3d {
            structure: Structure3d::new(extent),
            storage: DenseArray::from_elem(extent.length(), elem),
        }
    }

    /// Wrap a row-major vector as a dense grid without copying.
    ///
    /// Fails with `ShapeMismatch` if the vector length does not equal
    /// `extent.length()`.
    pub fn from_vec(extent: Extent3d, vec: Vec<A>) -> Result<Self, LatticeError> {
        if vec.len() != extent.length() {
            return Err(LatticeError::shape_mismatch(&[extent.length()], &[vec.len()]));
        }
        Ok(Grid3d {
            structure: Structure3d::new(extent),
            storage: DenseArray::from_vec(vec),
        })
    }
}

impl<A: Clone + Default + Zero> DenseGrid3d<A> {
    /// Allocate a dense grid of zeros.
    pub fn zeros(extent: Extent3d) -> Self {
        Self::from_elem(extent, A::zero())
    }
}

/// Create a dense rank-1 grid from a slice.
pub fn grid1<A: Clone + Default>(xs: &[A]) -> DenseGrid1d<A> {
    DenseGrid1d::from_vec(xs.to_vec())
}

/// Create a dense rank-2 grid from nested rows.
///
/// ```
/// use lattix::grid2;
///
/// let a = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(a.get((1, 0)), 3.0);
/// ```
pub fn grid2<A: Clone + Default, const N: usize>(rows: &[[A; N]]) -> DenseGrid2d<A> {
    let mut vec = Vec::with_capacity(rows.len() * N);
    for row in rows {
        vec.extend_from_slice(row);
    }
    DenseGrid2d::from_dense(Extent2d::new(rows.len(), N), vec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Layout1d, Stride1d};

    #[test]
    fn set_then_get_round_trips() {
        let mut g = DoubleGrid2d::zeros(Extent2d::new(3, 4));
        g.set((2, 1), 5.5);
        assert_eq!(g.get((2, 1)), 5.5);
        assert_eq!(g.get([0, 0]), 0.0);
    }

    #[test]
    fn clones_share_storage() {
        let mut g = IntGrid2d::zeros(Extent2d::new(2, 2));
        let view = g.clone();
        g.set((0, 1), 7);
        assert_eq!(view.get((0, 1)), 7);
        let detached = g.copy();
        g.set((0, 1), 8);
        assert_eq!(detached.get((0, 1)), 7);
    }

    #[test]
    fn from_parts_rejects_short_storage() {
        let structure = Structure1d::new(Extent1d::new(5));
        let storage = DenseArray::<f64>::new(4);
        assert!(Grid1d::from_parts(structure, storage).is_err());
        let storage = DenseArray::<f64>::new(5);
        assert!(Grid1d::from_parts(structure, storage).is_ok());
    }

    #[test]
    fn from_parts_accepts_negative_strides_in_bounds() {
        let layout = Layout1d::new(4, Stride1d(-1));
        let structure = Structure1d::with_layout(Extent1d::new(5), layout);
        let g = Grid1d::from_parts(structure, DenseArray::from_vec(vec![0, 1, 2, 3, 4])).unwrap();
        assert_eq!(g.get(0), 4);
        assert_eq!(g.get(4), 0);
    }

    #[test]
    #[should_panic(expected = "IndexOutOfBounds")]
    fn get_checks_the_extent() {
        DoubleGrid2d::zeros(Extent2d::new(2, 2)).get((2, 0));
    }

    #[test]
    fn eye_is_the_identity() {
        let id = DoubleGrid2d::eye(3);
        assert_eq!(id.get((1, 1)), 1.0);
        assert_eq!(id.get((1, 2)), 0.0);
    }
}
