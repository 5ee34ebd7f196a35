// Copyright 2025 the lattix developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::linalg::LinalgScalar;

/// Dot product of two contiguous slices.
///
/// The sum is split across four independent lanes so the loop can
/// vectorize even under strict floating point accuracy semantics; the
/// lane count is a tradeoff between register pressure and instruction
/// level parallelism, not observable in the result beyond rounding.
///
/// `xs` and `ys` must be the same length.
pub fn unrolled_dot<A>(xs: &[A], ys: &[A]) -> A
where A: LinalgScalar
{
    debug_assert_eq!(xs.len(), ys.len());
    let len = xs.len().min(ys.len());
    let mut x4 = xs[..len].chunks_exact(4);
    let mut y4 = ys[..len].chunks_exact(4);
    let mut lanes = [A::zero(); 4];
    for (x, y) in (&mut x4).zip(&mut y4) {
        for (lane, (&a, &b)) in lanes.iter_mut().zip(x.iter().zip(y)) {
            *lane = *lane + a * b;
        }
    }
    let mut sum = (lanes[0] + lanes[2]) + (lanes[1] + lanes[3]);
    for (&a, &b) in x4.remainder().iter().zip(y4.remainder()) {
        sum = sum + a * b;
    }
    sum
}
