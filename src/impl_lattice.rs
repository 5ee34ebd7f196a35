// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The lattice operation set, available on every grid kind.
//!
//! Binary operations require operands of equal extent and panic with
//! `ExtentMismatch` otherwise. `assign` and `swap` take a block fast
//! path when both operands are contiguous and known not to share a
//! buffer; everything else iterates in the default row-major order.
//! `reduce` folds right-to-left over the backward traversal so
//! non-associative reducers are reproducible.

use crate::context::{self, NumericContext};
use crate::error::LatticeError;
use crate::grid::{Grid1d, Grid2d, Grid3d};
use crate::indexes::Order;
use crate::storage::Array;

#[cold]
#[inline(never)]
fn extent_mismatch_error(expected: &[usize], actual: &[usize]) -> ! {
    panic!("lattix: {}", LatticeError::extent_mismatch(expected, actual));
}

macro_rules! lattice_methods {
    () => {
        /// Fill every element of this view with `value`.
        pub fn fill(&mut self, value: A) {
            for offset in self.offsets(Order::RowMajor) {
                self.storage.set(offset, value.clone());
            }
        }

        /// Copy every element of `src` into this view.
        ///
        /// Assigning a view to itself is a no-op. When both sides are
        /// contiguous and do not share a buffer the copy is a single
        /// block move.
        ///
        /// **Panics** if the extents differ.
        pub fn assign(&mut self, src: &Self) {
            self.check_same_extent(src);
            if self.storage.aliases(&src.storage) && self.structure == src.structure {
                return;
            }
            if self.structure.is_contiguous()
                && src.structure.is_contiguous()
                && !self.storage.aliases(&src.storage)
            {
                let len = self.size();
                let dst_start = self.structure.layout().start() as usize;
                let src_start = src.structure.layout().start() as usize;
                self.storage.copy_range(dst_start, &src.storage, src_start, len);
                return;
            }
            for (dst, s) in self.offsets(Order::RowMajor).zip(src.offsets(Order::RowMajor)) {
                let value = src.storage.get(s);
                self.storage.set(dst, value);
            }
        }

        /// Replace every element `x` of this view with `f(x)`.
        pub fn apply<F>(&mut self, f: F)
        where F: Fn(A) -> A
        {
            for offset in self.offsets(Order::RowMajor) {
                let value = f(self.storage.get(offset));
                self.storage.set(offset, value);
            }
        }

        /// Replace every element `x` of this view with `f(x, y)` where
        /// `y` is the matching element of `other`.
        ///
        /// **Panics** if the extents differ.
        pub fn zip_apply<F>(&mut self, other: &Self, f: F)
        where F: Fn(A, A) -> A
        {
            self.check_same_extent(other);
            for (dst, s) in self.offsets(Order::RowMajor).zip(other.offsets(Order::RowMajor)) {
                let value = f(self.storage.get(dst), other.storage.get(s));
                self.storage.set(dst, value);
            }
        }

        /// Exchange the elements of this view with those of `other`.
        ///
        /// **Panics** if the extents differ.
        pub fn swap(&mut self, other: &mut Self) {
            self.check_same_extent(other);
            if self.structure.is_contiguous()
                && other.structure.is_contiguous()
                && !self.storage.aliases(&other.storage)
            {
                let len = self.size();
                let start = self.structure.layout().start() as usize;
                let other_start = other.structure.layout().start() as usize;
                self.storage.swap_range(start, &mut other.storage, other_start, len);
                return;
            }
            for (a, b) in self.offsets(Order::RowMajor).zip(other.offsets(Order::RowMajor)) {
                let left = self.storage.get(a);
                let right = other.storage.get(b);
                self.storage.set(a, right);
                other.storage.set(b, left);
            }
        }

        /// Right fold: `a(n-1) = f(x[n-1])`,
        /// `a(i) = reducer(a(i+1), f(x[i]))`. Returns `None` when the
        /// view is empty. The traversal is backward, so the fold order
        /// is fixed even for non-associative reducers.
        pub fn reduce<R, F>(&self, reducer: R, f: F) -> Option<A>
        where
            R: Fn(A, A) -> A,
            F: Fn(A) -> A,
        {
            let mut acc = None;
            for offset in self.offsets(Order::Backward) {
                let value = f(self.storage.get(offset));
                acc = Some(match acc {
                    None => value,
                    Some(acc) => reducer(acc, value),
                });
            }
            acc
        }

        /// Visit every element in row-major order.
        pub fn for_each<F>(&self, mut f: F)
        where F: FnMut(A)
        {
            for offset in self.offsets(Order::RowMajor) {
                f(self.storage.get(offset));
            }
        }

        /// Visit every element in the given traversal order.
        pub fn for_each_in<F>(&self, order: Order, mut f: F)
        where F: FnMut(A)
        {
            for offset in self.offsets(order) {
                f(self.storage.get(offset));
            }
        }

        /// Whether any element satisfies `predicate`; short-circuits.
        pub fn any_match<P>(&self, predicate: P) -> bool
        where P: Fn(&A) -> bool
        {
            self.offsets(Order::RowMajor)
                .any(|offset| predicate(&self.storage.get(offset)))
        }

        /// Whether every element satisfies `predicate`; short-circuits.
        pub fn all_match<P>(&self, predicate: P) -> bool
        where P: Fn(&A) -> bool
        {
            self.offsets(Order::RowMajor)
                .all(|offset| predicate(&self.storage.get(offset)))
        }

        /// Whether no element satisfies `predicate`; short-circuits.
        pub fn non_match<P>(&self, predicate: P) -> bool
        where P: Fn(&A) -> bool
        {
            !self.any_match(predicate)
        }
    };
}

macro_rules! double_equals_methods {
    () => {
        /// Whether `self` and `other` are extent-equal and elementwise
        /// equal under `ctx`.
        pub fn equals_with(&self, other: &Self, ctx: &NumericContext) -> bool {
            if !self.extent_matches(other) {
                return false;
            }
            self.offsets(Order::RowMajor)
                .zip(other.offsets(Order::RowMajor))
                .all(|(a, b)| ctx.equals(self.storage.get(a), other.storage.get(b)))
        }

        /// Whether `self` and `other` are extent-equal and elementwise
        /// equal under the process-wide numeric context.
        pub fn equals(&self, other: &Self) -> bool {
            self.equals_with(other, &context::context())
        }
    };
}

impl<A, S> Grid1d<S>
where
    S: Array<Elem = A>,
    A: Clone,
{
    fn extent_matches(&self, other: &Self) -> bool {
        self.extent() == other.extent()
    }

    fn check_same_extent(&self, other: &Self) {
        if !self.extent_matches(other) {
            extent_mismatch_error(&[self.size()], &[other.size()]);
        }
    }

    lattice_methods! {}
}

impl<S> Grid1d<S>
where S: Array<Elem = f64>
{
    double_equals_methods! {}
}

impl<A, S> Grid2d<S>
where
    S: Array<Elem = A>,
    A: Clone,
{
    fn extent_matches(&self, other: &Self) -> bool {
        self.extent() == other.extent()
    }

    fn check_same_extent(&self, other: &Self) {
        let a = self.extent();
        let b = other.extent();
        if a != b {
            extent_mismatch_error(&[a.rows(), a.cols(), a.channels()], &[b.rows(), b.cols(), b.channels()]);
        }
    }

    lattice_methods! {}
}

impl<S> Grid2d<S>
where S: Array<Elem = f64>
{
    double_equals_methods! {}
}

impl<A, S> Grid3d<S>
where
    S: Array<Elem = A>,
    A: Clone,
{
    fn extent_matches(&self, other: &Self) -> bool {
        self.extent() == other.extent()
    }

    fn check_same_extent(&self, other: &Self) {
        let a = self.extent();
        let b = other.extent();
        if a != b {
            extent_mismatch_error(&[a.slices(), a.rows(), a.cols()], &[b.slices(), b.rows(), b.cols()]);
        }
    }

    lattice_methods! {}
}

impl<S> Grid3d<S>
where S: Array<Elem = f64>
{
    double_equals_methods! {}
}

impl<A, B, S, S2> PartialEq<Grid1d<S2>> for Grid1d<S>
where
    S: Array<Elem = A>,
    S2: Array<Elem = B>,
    A: PartialEq<B>,
{
    fn eq(&self, other: &Grid1d<S2>) -> bool {
        self.extent() == other.extent()
            && self
                .offsets(Order::RowMajor)
                .zip(other.offsets(Order::RowMajor))
                .all(|(a, b)| self.storage.get(a) == other.storage.get(b))
    }
}

impl<A, B, S, S2> PartialEq<Grid2d<S2>> for Grid2d<S>
where
    S: Array<Elem = A>,
    S2: Array<Elem = B>,
    A: PartialEq<B>,
{
    fn eq(&self, other: &Grid2d<S2>) -> bool {
        self.extent() == other.extent()
            && self
                .offsets(Order::RowMajor)
                .zip(other.offsets(Order::RowMajor))
                .all(|(a, b)| self.storage.get(a) == other.storage.get(b))
    }
}

impl<A, B, S, S2> PartialEq<Grid3d<S2>> for Grid3d<S>
where
    S: Array<Elem = A>,
    S2: Array<Elem = B>,
    A: PartialEq<B>,
{
    fn eq(&self, other: &Grid3d<S2>) -> bool {
        self.extent() == other.extent()
            && self
                .offsets(Order::RowMajor)
                .zip(other.offsets(Order::RowMajor))
                .all(|(a, b)| self.storage.get(a) == other.storage.get(b))
    }
}

#[cfg(test)]
mod tests {
    use crate::extent::Extent2d;
    use crate::grid::{grid1, grid2, DoubleGrid2d, IntGrid2d};
    use crate::indexes::Order;

    #[test]
    fn assign_copies_and_self_assign_is_a_noop() {
        let src = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
        let mut dst = DoubleGrid2d::zeros(Extent2d::new(2, 2));
        dst.assign(&src);
        assert!(dst == src);
        let before = dst.to_vec();
        let view = dst.clone();
        dst.assign(&view);
        assert_eq!(dst.to_vec(), before);
    }

    #[test]
    fn assign_through_views_copies_elementwise() {
        let a = grid2(&[[1, 2], [3, 4]]);
        let mut t = a.t().copy();
        t.assign(&a.t());
        assert_eq!(t.to_vec(), vec![1, 3, 2, 4]);
    }

    #[test]
    #[should_panic(expected = "ExtentMismatch")]
    fn assign_rejects_unequal_extents() {
        let src = grid2(&[[1.0, 2.0, 3.0]]);
        let mut dst = DoubleGrid2d::zeros(Extent2d::new(2, 2));
        dst.assign(&src);
    }

    #[test]
    fn reduce_folds_right_to_left() {
        // subtraction is not associative; the fold order is pinned:
        // a = f(x3); a = a - x2; a = a - x1; a = a - x0
        let g = grid1(&[1.0, 2.0, 3.0, 4.0]);
        let r = g.reduce(|acc, x| acc - x, |x| x).unwrap();
        assert_eq!(r, 4.0 - 3.0 - 2.0 - 1.0);
        assert_eq!(grid1::<f64>(&[]).reduce(|acc, x| acc + x, |x| x), None);
    }

    #[test]
    fn matchers_short_circuit_semantics() {
        let g = grid2(&[[1, 5], [2, 8]]);
        assert!(g.any_match(|&x| x > 7));
        assert!(g.all_match(|&x| x > 0));
        assert!(g.non_match(|&x| x > 8));
        // zero extent: all holds vacuously, any does not
        let empty = IntGrid2d::zeros(Extent2d::new(0, 3));
        assert!(empty.all_match(|&x| x == 42));
        assert!(!empty.any_match(|_| true));
    }

    #[test]
    fn swap_exchanges_views() {
        let mut a = grid1(&[1, 2, 3]);
        let mut b = grid1(&[9, 8, 7]);
        a.swap(&mut b);
        assert_eq!(a.to_vec(), vec![9, 8, 7]);
        assert_eq!(b.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn apply_and_zip_apply_transform_in_place() {
        let mut a = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
        a.apply(|x| x * 10.0);
        assert_eq!(a.get((1, 1)), 40.0);
        let b = grid2(&[[1.0, 1.0], [2.0, 2.0]]);
        a.zip_apply(&b, |x, y| x / y);
        assert_eq!(a.get((1, 0)), 15.0);
    }

    #[test]
    fn equality_respects_extent_and_channels() {
        let a = IntGrid2d::zeros(Extent2d::new(0, 2));
        let b = IntGrid2d::zeros(Extent2d::new(0, 2));
        let c = IntGrid2d::zeros(Extent2d::new(0, 3));
        assert!(a == b);
        assert!(a != c);
        let d = IntGrid2d::zeros(Extent2d::with_channels(2, 2, 2));
        let e = IntGrid2d::zeros(Extent2d::new(2, 2));
        assert!(d != e);
    }

    #[test]
    fn traversal_orders_agree_on_the_multiset() {
        let g = grid2(&[[1, 2], [3, 4]]);
        let mut row_major = Vec::new();
        let mut backward = Vec::new();
        g.for_each(|x| row_major.push(x));
        g.for_each_in(Order::Backward, |x| backward.push(x));
        backward.reverse();
        assert_eq!(row_major, backward);
    }
}
