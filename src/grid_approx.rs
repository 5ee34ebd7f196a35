// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `approx` comparison traits for grids, behind the `approx` feature.

use approx::{AbsDiffEq, RelativeEq};

use crate::grid::{Grid1d, Grid2d, Grid3d};
use crate::indexes::Order;
use crate::storage::Array;

macro_rules! impl_grid_approx {
    ($grid:ident) => {
        impl<A, S, S2> AbsDiffEq<$grid<S2>> for $grid<S>
        where
            S: Array<Elem = A>,
            S2: Array<Elem = A>,
            A: AbsDiffEq,
            A::Epsilon: Clone,
        {
            type Epsilon = A::Epsilon;

            fn default_epsilon() -> A::Epsilon {
                A::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &$grid<S2>, epsilon: A::Epsilon) -> bool {
                self.extent() == other.extent()
                    && self
                        .offsets(Order::RowMajor)
                        .zip(other.offsets(Order::RowMajor))
                        .all(|(a, b)| {
                            self.storage
                                .get(a)
                                .abs_diff_eq(&other.storage.get(b), epsilon.clone())
                        })
            }
        }

        impl<A, S, S2> RelativeEq<$grid<S2>> for $grid<S>
        where
            S: Array<Elem = A>,
            S2: Array<Elem = A>,
            A: RelativeEq,
            A::Epsilon: Clone,
        {
            fn default_max_relative() -> A::Epsilon {
                A::default_max_relative()
            }

            fn relative_eq(
                &self,
                other: &$grid<S2>,
                epsilon: A::Epsilon,
                max_relative: A::Epsilon,
            ) -> bool {
                self.extent() == other.extent()
                    && self
                        .offsets(Order::RowMajor)
                        .zip(other.offsets(Order::RowMajor))
                        .all(|(a, b)| {
                            self.storage.get(a).relative_eq(
                                &other.storage.get(b),
                                epsilon.clone(),
                                max_relative.clone(),
                            )
                        })
            }
        }
    };
}

impl_grid_approx! {Grid1d}
impl_grid_approx! {Grid2d}
impl_grid_approx! {Grid3d}
