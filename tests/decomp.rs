#![allow(clippy::many_single_char_names)]

use approx::assert_abs_diff_eq;
use lattix::linalg::{
    det, general_mat_mul, inverse, norm1, norm2, norm_f, norm_inf, permute_rows, rank, solve,
    trace, CholeskyDecomposition, EigenDecomposition, LuDecomposition, QrDecomposition,
    SvdDecomposition,
};
use lattix::{grid2, DoubleGrid2d, Extent2d};

fn assert_close(a: &DoubleGrid2d, b: &DoubleGrid2d, tol: f64) {
    assert_eq!((a.rows(), a.cols()), (b.rows(), b.cols()));
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            assert_abs_diff_eq!(a.get((i, j)), b.get((i, j)), epsilon = tol);
        }
    }
}

fn mat_mul(a: &DoubleGrid2d, b: &DoubleGrid2d) -> DoubleGrid2d {
    let mut c = DoubleGrid2d::zeros(Extent2d::new(a.rows(), b.cols()));
    general_mat_mul(1.0, a, b, 0.0, &mut c);
    c
}

#[test]
fn lu_reproduces_the_permuted_matrix() {
    let a = grid2(&[
        [7.0, 3.0, -1.0, 2.0],
        [3.0, 8.0, 1.0, -4.0],
        [-1.0, 1.0, 4.0, -1.0],
        [2.0, -4.0, -1.0, 6.0],
    ]);
    let lu = LuDecomposition::decompose(&a);
    assert!(!lu.is_singular());
    let mut pa = a.copy();
    permute_rows(&mut pa, lu.pivot());
    assert_close(&pa, &mat_mul(&lu.l(), &lu.u()), 1e-12);
}

#[test]
fn lu_solve_is_accurate_elementwise() {
    let a = grid2(&[
        [4.0, -2.0, 1.0],
        [-2.0, 4.0, -2.0],
        [1.0, -2.0, 4.0],
    ]);
    let b = grid2(&[[11.0, 1.0], [-16.0, 2.0], [17.0, 3.0]]);
    let x = solve(&a, &b).unwrap();
    assert_close(&mat_mul(&a, &x), &b, 1e-10);
}

#[test]
fn qr_invariants_hold() {
    let a = grid2(&[
        [1.0, -1.0, 4.0],
        [1.0, 4.0, -2.0],
        [1.0, 4.0, 2.0],
        [1.0, -1.0, 0.0],
    ]);
    let qr = QrDecomposition::decompose(&a);
    let q = qr.q();
    let r = qr.r();
    assert_close(&a, &mat_mul(&q, &r), 1e-12);
    let gram = q.mult(&q, None, 1.0, 0.0, true, false);
    assert_close(&gram, &DoubleGrid2d::eye(3), 1e-12);
    // R is upper triangular
    for i in 0..3 {
        for j in 0..i {
            assert_eq!(r.get((i, j)), 0.0);
        }
    }
}

#[test]
fn cholesky_matches_the_spec_scenario() {
    let a = grid2(&[
        [4.0, 12.0, -16.0],
        [12.0, 37.0, -43.0],
        [-16.0, -43.0, 98.0],
    ]);
    let chol = CholeskyDecomposition::decompose(&a);
    assert!(chol.is_spd());
    assert!(*chol.l() == grid2(&[[2.0, 0.0, 0.0], [6.0, 1.0, 0.0], [-8.0, 5.0, 3.0]]));
    assert_close(&mat_mul(chol.l(), &chol.l().t()), &a, 1e-12);

    let x = chol.solve(&grid2(&[[1.0], [2.0], [3.0]])).unwrap();
    assert_abs_diff_eq!(x.get((0, 0)), 343.0 / 12.0, epsilon = 1e-10);
    assert_abs_diff_eq!(x.get((1, 0)), -23.0 / 3.0, epsilon = 1e-10);
    assert_abs_diff_eq!(x.get((2, 0)), 4.0 / 3.0, epsilon = 1e-10);
}

#[test]
fn svd_matches_the_rank_one_scenario() {
    let a = grid2(&[[1.0, 2.0], [2.0, 4.0]]);
    let svd = SvdDecomposition::decompose(&a).unwrap();
    assert_eq!(svd.rank(), 1);
    assert_abs_diff_eq!(svd.singular_values()[0], 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(svd.singular_values()[1], 0.0, epsilon = 1e-12);
}

#[test]
fn svd_factors_are_orthogonal_and_ordered() {
    let a = grid2(&[
        [2.0, 4.0, 1.0],
        [0.0, -3.0, 2.0],
        [5.0, 1.0, 0.0],
        [2.0, 2.0, 2.0],
    ]);
    let svd = SvdDecomposition::decompose(&a).unwrap();
    let s = svd.singular_values();
    assert!(s.windows(2).all(|w| w[0] >= w[1]));
    assert!(s.iter().all(|&sigma| sigma >= 0.0));

    let ugram = svd.u().mult(svd.u(), None, 1.0, 0.0, true, false);
    assert_close(&ugram, &DoubleGrid2d::eye(3), 1e-12);
    let vgram = svd.v().mult(svd.v(), None, 1.0, 0.0, true, false);
    assert_close(&vgram, &DoubleGrid2d::eye(3), 1e-12);

    let us = mat_mul(svd.u(), &svd.s_matrix());
    assert_close(&mat_mul(&us, &svd.v().t()), &a, 1e-12);
}

#[test]
fn eigen_matches_the_rotation_scenario() {
    let a = grid2(&[[0.0, 1.0], [-1.0, 0.0]]);
    let eig = EigenDecomposition::decompose(&a).unwrap();
    assert_eq!(eig.real_eigenvalues(), &[0.0, 0.0]);
    assert_eq!(eig.imag_eigenvalues(), &[1.0, -1.0]);
    // A·V = V·D with the 2×2 block encoding the conjugate pair
    let av = mat_mul(&a, eig.v());
    let vd = mat_mul(eig.v(), &eig.d_matrix());
    assert_close(&av, &vd, 1e-12);
}

#[test]
fn symmetric_eigen_diagonalizes() {
    let a = grid2(&[
        [6.0, 2.0, 1.0],
        [2.0, 3.0, 1.0],
        [1.0, 1.0, 1.0],
    ]);
    let eig = EigenDecomposition::decompose(&a).unwrap();
    assert!(eig.is_symmetric());
    let v = eig.v();
    // VᵀAV recovers the eigenvalue diagonal
    let vav = mat_mul(&v.t(), &mat_mul(&a, v));
    for i in 0..3 {
        assert_abs_diff_eq!(vav.get((i, i)), eig.real_eigenvalues()[i], epsilon = 1e-10);
        for j in 0..3 {
            if i != j {
                assert_abs_diff_eq!(vav.get((i, j)), 0.0, epsilon = 1e-10);
            }
        }
    }
    assert_abs_diff_eq!(eig.real_eigenvalues().iter().sum::<f64>(), trace(&a), epsilon = 1e-10);
}

#[test]
fn inverse_of_inverse_round_trips() {
    let a = grid2(&[[2.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]]);
    let back = inverse(&inverse(&a).unwrap()).unwrap();
    assert_close(&back, &a, 1e-10);
}

#[test]
fn facade_norms_and_derived_quantities() {
    let a = grid2(&[[3.0, 0.0], [0.0, -4.0]]);
    assert_eq!(norm1(&a), 4.0);
    assert_eq!(norm_inf(&a), 4.0);
    assert_abs_diff_eq!(norm_f(&a), 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(norm2(&a).unwrap(), 4.0, epsilon = 1e-12);
    assert_eq!(rank(&a).unwrap(), 2);
    assert_abs_diff_eq!(det(&a), -12.0, epsilon = 1e-12);
    assert_eq!(trace(&a), -1.0);
}

#[test]
fn one_by_one_factorizations_agree() {
    let a = grid2(&[[9.0]]);
    assert_eq!(LuDecomposition::decompose(&a).det(), 9.0);
    let qr = QrDecomposition::decompose(&a);
    assert_abs_diff_eq!(qr.r().get((0, 0)).abs(), 9.0, epsilon = 1e-12);
    assert!(CholeskyDecomposition::decompose(&a).is_spd());
    let svd = SvdDecomposition::decompose(&a).unwrap();
    assert_abs_diff_eq!(svd.singular_values()[0], 9.0, epsilon = 1e-12);
    let eig = EigenDecomposition::decompose(&a).unwrap();
    assert_abs_diff_eq!(eig.real_eigenvalues()[0], 9.0, epsilon = 1e-12);
}
