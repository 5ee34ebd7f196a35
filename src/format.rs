// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Debug formatting for grids: nested element lists plus the extent.

use std::fmt;

use crate::grid::{Grid1d, Grid2d, Grid3d};
use crate::storage::Array;

impl<A, S> fmt::Debug for Grid1d<S>
where
    S: Array<Elem = A>,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()?;
        write!(f, ", extent={}", self.size())
    }
}

fn write_rows<A, S>(grid: &Grid2d<S>, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    S: Array<Elem = A>,
    A: fmt::Debug,
{
    write!(f, "[")?;
    for r in 0..grid.rows() {
        if r > 0 {
            write!(f, ", ")?;
        }
        f.debug_list().entries(grid.row(r).to_vec()).finish()?;
    }
    write!(f, "]")
}

impl<A, S> fmt::Debug for Grid2d<S>
where
    S: Array<Elem = A>,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rows(self, f)?;
        write!(f, ", extent={}x{}", self.rows(), self.cols())?;
        if self.channels() > 1 {
            write!(f, "x{}", self.channels())?;
        }
        Ok(())
    }
}

impl<A, S> fmt::Debug for Grid3d<S>
where
    S: Array<Elem = A>,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for s in 0..self.extent().slices() {
            if s > 0 {
                write!(f, ", ")?;
            }
            write_rows(&self.slice(s), f)?;
        }
        write!(
            f,
            "], extent={}x{}x{}",
            self.extent().slices(),
            self.extent().rows(),
            self.extent().cols()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::grid2;

    #[test]
    fn debug_shows_rows_and_extent() {
        let g = grid2(&[[1, 2], [3, 4]]);
        let text = format!("{:?}", g);
        assert!(text.contains("[1, 2]"));
        assert!(text.contains("extent=2x2"));
    }
}
