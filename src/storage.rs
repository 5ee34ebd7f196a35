// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Flat element storage behind grid views.
//!
//! A storage is a contiguous zero-based buffer of one element kind.
//! Grids never own elements directly; they hold a storage handle plus a
//! structure describing which offsets belong to the view. Any number of
//! views may share one buffer, and mutation through one view is visible
//! to all of them. The single-threaded shared-cell representation keeps
//! every access safe; kernels that need exclusive slices check handle
//! identity first.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::error::LatticeError;

#[cold]
#[inline(never)]
fn storage_bounds_error(index: usize, len: usize) -> ! {
    panic!("lattix: {}", LatticeError::index_out_of_bounds(&[len], &[index]));
}

/// The storage seam the lattice and kernel code is written against.
///
/// Implementations provide random access, deep copy and the `like`
/// allocation hook; everything else in the crate is built from these.
/// `Clone` of a storage clones the *handle*: the clone shares the
/// underlying buffer.
pub trait Array: Clone {
    /// Element type of the buffer.
    type Elem: Clone;

    /// Number of elements in the buffer.
    fn len(&self) -> usize;

    /// Whether the buffer holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the element at `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    fn get(&self, index: usize) -> Self::Elem;

    /// Write the element at `index`.
    ///
    /// **Panics** if `index` is out of bounds.
    fn set(&mut self, index: usize, value: Self::Elem);

    /// Allocate an independent buffer holding a copy of every element.
    fn copy(&self) -> Self;

    /// Allocate a fresh buffer of the same kind with `len` elements.
    fn like(&self, len: usize) -> Self;

    /// Whether `self` and `other` may share memory. The conservative
    /// default answers `true`, which steers callers away from
    /// exclusive-slice fast paths.
    fn aliases(&self, other: &Self) -> bool {
        let _ = other;
        true
    }

    /// Copy `len` elements from `src[src_start..]` into
    /// `self[dst_start..]`. Overlapping source and destination ranges
    /// within one buffer are the caller's responsibility.
    fn copy_range(&mut self, dst_start: usize, src: &Self, src_start: usize, len: usize) {
        for k in 0..len {
            self.set(dst_start + k, src.get(src_start + k));
        }
    }

    /// Exchange `len` elements between `self[start..]` and
    /// `other[other_start..]`.
    fn swap_range(&mut self, start: usize, other: &mut Self, other_start: usize, len: usize) {
        for k in 0..len {
            let a = self.get(start + k);
            let b = other.get(other_start + k);
            self.set(start + k, b);
            other.set(other_start + k, a);
        }
    }
}

/// The dense storage kind: a flat buffer shared by reference among all
/// views onto it.
///
/// `Clone` is shallow and O(1); [`Array::copy`] makes a deep copy. The
/// buffer's lifetime is the lifetime of the longest-living handle, and
/// no view ever changes its length.
pub struct DenseArray<T> {
    buf: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for DenseArray<T> {
    fn clone(&self) -> Self {
        DenseArray { buf: Rc::clone(&self.buf) }
    }
}

impl<T: Clone + Default> DenseArray<T> {
    /// Allocate a buffer of `len` default-valued elements.
    pub fn new(len: usize) -> Self {
        let mut buf = Vec::new();
        buf.resize_with(len, T::default);
        DenseArray { buf: Rc::new(RefCell::new(buf)) }
    }
}

impl<T: Clone> DenseArray<T> {
    /// Allocate a buffer of `len` copies of `elem`.
    pub fn from_elem(len: usize, elem: T) -> Self {
        DenseArray { buf: Rc::new(RefCell::new(vec![elem; len])) }
    }

    /// Copy the buffer out as a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.buf.borrow().clone()
    }
}

impl<T> DenseArray<T> {
    /// Wrap an existing vector without copying.
    pub fn from_vec(vec: Vec<T>) -> Self {
        DenseArray { buf: Rc::new(RefCell::new(vec)) }
    }

    /// Whether `self` and `other` are handles to the same buffer.
    pub fn shares_buffer(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.buf, &other.buf)
    }

    pub(crate) fn borrow(&self) -> Ref<'_, Vec<T>> {
        self.buf.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, Vec<T>> {
        self.buf.borrow_mut()
    }
}

impl<T: Clone + Default> Array for DenseArray<T> {
    type Elem = T;

    fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    fn get(&self, index: usize) -> T {
        let buf = self.buf.borrow();
        if index >= buf.len() {
            storage_bounds_error(index, buf.len());
        }
        buf[index].clone()
    }

    fn set(&mut self, index: usize, value: T) {
        let mut buf = self.buf.borrow_mut();
        let len = buf.len();
        if index >= len {
            storage_bounds_error(index, len);
        }
        buf[index] = value;
    }

    fn copy(&self) -> Self {
        DenseArray {
            buf: Rc::new(RefCell::new(self.buf.borrow().clone())),
        }
    }

    fn like(&self, len: usize) -> Self {
        DenseArray::new(len)
    }

    fn aliases(&self, other: &Self) -> bool {
        self.shares_buffer(other)
    }

    fn copy_range(&mut self, dst_start: usize, src: &Self, src_start: usize, len: usize) {
        if self.shares_buffer(src) {
            // one cell: fall back to sequential element moves
            for k in 0..len {
                let value = src.get(src_start + k);
                self.set(dst_start + k, value);
            }
        } else {
            let src_buf = src.buf.borrow();
            let mut dst_buf = self.buf.borrow_mut();
            dst_buf[dst_start..dst_start + len]
                .clone_from_slice(&src_buf[src_start..src_start + len]);
        }
    }

    fn swap_range(&mut self, start: usize, other: &mut Self, other_start: usize, len: usize) {
        if self.shares_buffer(other) {
            for k in 0..len {
                let a = self.get(start + k);
                let b = other.get(other_start + k);
                self.set(start + k, b);
                other.set(other_start + k, a);
            }
        } else {
            let mut a_buf = self.buf.borrow_mut();
            let mut b_buf = other.buf.borrow_mut();
            a_buf[start..start + len].swap_with_slice(&mut b_buf[other_start..other_start + len]);
        }
    }
}
