#![allow(clippy::many_single_char_names)]

use lattix::{grid2, Axis, Extent1d, Extent2d, Extent3d, Index2d, Structure1d, Structure2d};
use quickcheck::quickcheck;

#[test]
fn range_then_stride_lands_on_the_expected_offsets() {
    // extent (10, 10), range((2, 3), (5, 5)), stride((2, 1)):
    // resulting extent (3, 5), view (0, 0) reads storage offset 23
    let base = Structure2d::new(Extent2d::new(10, 10));
    let view = base
        .range(Index2d::new(2, 3), Extent2d::new(5, 5))
        .stride(2, 1);
    assert_eq!(view.extent(), Extent2d::new(3, 5));
    assert_eq!(view.offset(Index2d::new(0, 0)), 23);

    // the same walk through grids over live storage
    let rows: Vec<[f64; 10]> = (0..10)
        .map(|r| {
            let mut row = [0.0; 10];
            for (c, slot) in row.iter_mut().enumerate() {
                *slot = (r * 10 + c) as f64;
            }
            row
        })
        .collect();
    let grid = grid2(&rows);
    let view = grid.range((2, 3), Extent2d::new(5, 5)).stride(2, 1);
    assert_eq!(view.get((0, 0)), 23.0);
    assert_eq!(view.get((2, 4)), 67.0);
}

#[test]
fn every_view_offset_agrees_with_the_index_remap() {
    let base = Structure2d::new(Extent2d::new(9, 7));
    let view = base
        .range(Index2d::new(1, 2), Extent2d::new(6, 4))
        .stride(2, 3)
        .transpose();
    for vi in 0..view.extent().rows() {
        for vj in 0..view.extent().cols() {
            // transpose swaps, stride scales, range shifts
            let bi = 1 + 2 * vj;
            let bj = 2 + 3 * vi;
            assert_eq!(
                view.offset(Index2d::new(vi, vj)),
                base.offset(Index2d::new(bi, bj)),
            );
        }
    }
}

#[test]
fn slice_projections_reduce_rank() {
    let s3 = lattix::Structure3d::new(Extent3d::new(4, 3, 5));
    let s2 = s3.slice(2);
    let s1 = s2.row(1);
    assert_eq!(s1.extent(), Extent1d::new(5));
    for c in 0..5 {
        assert_eq!(s1.offset(c), s3.offset((2usize, 1usize, c).into()));
    }
}

#[test]
fn dice_is_self_inverse_on_every_axis_pair() {
    let s = lattix::Structure3d::new(Extent3d::new(2, 5, 3)).stride(1, 2, 1);
    for (a, b) in [(0, 1), (0, 2), (1, 2), (1, 1)] {
        assert_eq!(s.dice(Axis(a), Axis(b)).dice(Axis(a), Axis(b)), s);
    }
}

quickcheck! {
    fn transpose_is_involutive(rows: u8, cols: u8) -> bool {
        let s = Structure2d::new(Extent2d::new(rows as usize % 20, cols as usize % 20));
        s.transpose().transpose() == s
    }

    fn range_of_range_is_one_range(r0: u8, c0: u8, r1: u8, c1: u8) -> bool {
        let base = Structure2d::new(Extent2d::new(16, 16));
        let (r0, c0, r1, c1) = (r0 as usize % 4, c0 as usize % 4, r1 as usize % 4, c1 as usize % 4);
        let twice = base
            .range(Index2d::new(r0, c0), Extent2d::new(8, 8))
            .range(Index2d::new(r1, c1), Extent2d::new(4, 4));
        let once = base.range(Index2d::new(r0 + r1, c0 + c1), Extent2d::new(4, 4));
        twice == once
    }

    fn stride_of_stride_multiplies(n: u8, s1: u8, s2: u8) -> bool {
        let n = n as usize % 50;
        let s1 = 1 + s1 as usize % 4;
        let s2 = 1 + s2 as usize % 4;
        let base = Structure1d::new(Extent1d::new(n));
        base.stride(s1).stride(s2) == base.stride(s1 * s2)
    }

    fn strided_extent_rounds_up(n: u8, step: u8) -> bool {
        let n = n as usize % 64;
        let step = 1 + step as usize % 7;
        let strided = Structure1d::new(Extent1d::new(n)).stride(step);
        let expected = if n > 0 { (n - 1) / step + 1 } else { 0 };
        strided.extent().length() == expected
    }
}
