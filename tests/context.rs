//! The numeric context is process-wide state; this file runs as its
//! own test binary so installing one cannot leak into other tests.

use lattix::context::{context, install};
use lattix::{grid2, NumericContext};

#[test]
fn install_once_wins_and_grids_compare_under_it() {
    assert_eq!(context(), NumericContext::EXACT);
    assert!(install(NumericContext::new(1e-9)));
    // the second installation is refused; the first one stays
    assert!(!install(NumericContext::new(1.0)));
    assert_eq!(context().epsilon(), 1e-9);

    let a = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
    let b = grid2(&[[1.0 + 1e-12, 2.0], [3.0, 4.0 - 1e-12]]);
    assert!(a.equals(&b));
    let c = grid2(&[[1.1, 2.0], [3.0, 4.0]]);
    assert!(!a.equals(&c));
}
