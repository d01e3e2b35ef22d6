//! Tests for the eigensolvers and covariance accumulators.

use super::*;
use approx::assert_abs_diff_eq;
use glam::DQuat;

/// Checks `M v = lambda v` for every eigenpair.
fn assert_eigenpairs3(m: &DMat3, eig: &SymmetricEigen3) {
    for i in 0..3 {
        let (value, vector) = eig.pair(i);
        let residual = *m * vector - vector * value;
        assert!(residual.length() < 1e-10, "pair {i} residual {residual:?}");
        assert_abs_diff_eq!(vector.length(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn eigen3_diagonal_is_sorted() {
    let m = DMat3::from_diagonal(DVec3::new(5.0, -2.0, 0.5));
    let eig = symmetric_eigen3(&m).unwrap();
    assert_abs_diff_eq!(eig.values.x, -2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.values.y, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.values.z, 5.0, epsilon = 1e-12);
    assert_eigenpairs3(&m, &eig);
}

#[test]
fn eigen3_dense_symmetric() {
    let m = DMat3::from_cols(
        DVec3::new(4.0, 1.0, -2.0),
        DVec3::new(1.0, 2.0, 0.0),
        DVec3::new(-2.0, 0.0, 3.0),
    );
    let eig = symmetric_eigen3(&m).unwrap();

    assert!(eig.values.x <= eig.values.y && eig.values.y <= eig.values.z);
    // Trace is preserved
    assert_abs_diff_eq!(eig.values.element_sum(), 9.0, epsilon = 1e-10);
    assert_eigenpairs3(&m, &eig);
}

#[test]
fn eigen3_vectors_are_orthonormal() {
    let m = DMat3::from_cols(
        DVec3::new(1.0, 0.3, 0.2),
        DVec3::new(0.3, 0.5, 0.1),
        DVec3::new(0.2, 0.1, 0.8),
    );
    let eig = symmetric_eigen3(&m).unwrap();
    let gram = eig.vectors.transpose() * eig.vectors;
    for i in 0..3 {
        for j in 0..3 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(gram.col(j)[i], expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn eigen3_reconstructs_rotated_diagonal() {
    let rotation = DMat3::from_quat(DQuat::from_axis_angle(
        DVec3::new(1.0, 2.0, 3.0).normalize(),
        0.7,
    ));
    let diagonal = DMat3::from_diagonal(DVec3::new(0.1, 0.4, 2.0));
    let m = rotation * diagonal * rotation.transpose();

    let eig = symmetric_eigen3(&m).unwrap();
    assert_abs_diff_eq!(eig.values.x, 0.1, epsilon = 1e-10);
    assert_abs_diff_eq!(eig.values.y, 0.4, epsilon = 1e-10);
    assert_abs_diff_eq!(eig.values.z, 2.0, epsilon = 1e-10);

    // Largest eigenvector matches the rotated z axis up to sign
    let expected = rotation.z_axis;
    assert_abs_diff_eq!(eig.vectors.z_axis.dot(expected).abs(), 1.0, epsilon = 1e-10);
}

#[test]
fn eigen3_zero_matrix() {
    let eig = symmetric_eigen3(&DMat3::ZERO).unwrap();
    assert_eq!(eig.values, DVec3::ZERO);
    assert_eigenpairs3(&DMat3::ZERO, &eig);
}

#[test]
fn eigen_rejects_non_finite_input() {
    let mut m = DMat3::IDENTITY;
    m.y_axis.x = f64::NAN;
    assert!(symmetric_eigen3(&m).is_none());
    assert!(symmetric_eigen3(&DMat3::from_diagonal(DVec3::new(1.0, f64::INFINITY, 0.0))).is_none());
    assert!(symmetric_eigen2(&DMat2::from_diagonal(DVec2::new(f64::NAN, 1.0))).is_none());
}

#[test]
fn eigen2_closed_form() {
    let m = DMat2::from_cols(DVec2::new(3.0, 1.0), DVec2::new(1.0, 1.0));
    let eig = symmetric_eigen2(&m).unwrap();
    let root = 2.0_f64.sqrt();
    assert_abs_diff_eq!(eig.values.x, 2.0 - root, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.values.y, 2.0 + root, epsilon = 1e-12);
    for i in 0..2 {
        let (value, vector) = eig.pair(i);
        let residual = m * vector - vector * value;
        assert!(residual.length() < 1e-12);
        assert_abs_diff_eq!(vector.length(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn eigen2_diagonal_in_either_order() {
    let eig = symmetric_eigen2(&DMat2::from_diagonal(DVec2::new(4.0, 1.0))).unwrap();
    assert_abs_diff_eq!(eig.values.x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.values.y, 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.vectors.x_axis.y.abs(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.vectors.y_axis.x.abs(), 1.0, epsilon = 1e-12);

    let eig = symmetric_eigen2(&DMat2::from_diagonal(DVec2::new(1.0, 4.0))).unwrap();
    assert_abs_diff_eq!(eig.values.x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.values.y, 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.vectors.y_axis.y.abs(), 1.0, epsilon = 1e-12);
}

#[test]
fn eigen2_repeated_eigenvalue() {
    let eig = symmetric_eigen2(&(DMat2::IDENTITY * 2.0)).unwrap();
    assert_abs_diff_eq!(eig.values.x, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.values.y, 2.0, epsilon = 1e-12);
    // Any orthonormal basis is valid
    assert_abs_diff_eq!(eig.vectors.x_axis.dot(eig.vectors.y_axis), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(eig.vectors.x_axis.length(), 1.0, epsilon = 1e-12);
}

#[test]
fn covariance3_matches_direct_formula() {
    let samples = [
        DVec3::new(1.0, 2.0, 0.0),
        DVec3::new(-1.0, 0.5, 1.0),
        DVec3::new(0.0, -1.0, 2.0),
        DVec3::new(2.0, 0.0, -1.0),
    ];
    let mut acc = Covariance3::default();
    for s in samples {
        acc.add(s, 1.0);
    }

    let mean = samples.iter().copied().sum::<DVec3>() / samples.len() as f64;
    let direct = samples
        .iter()
        .fold(DMat3::ZERO, |m, s| m + outer3(*s - mean))
        * (1.0 / samples.len() as f64);

    assert_eq!(acc.count(), 4);
    assert!((acc.mean() - mean).length() < 1e-12);
    let diff = acc.covariance() - direct;
    assert!(diff.x_axis.length() + diff.y_axis.length() + diff.z_axis.length() < 1e-12);
}

#[test]
fn covariance_weights_scale_contributions() {
    let mut acc = Covariance2::default();
    acc.add(DVec2::new(0.0, 0.0), 3.0);
    acc.add(DVec2::new(4.0, 0.0), 1.0);
    assert_eq!(acc.sum_weights(), 4.0);
    assert_eq!(acc.mean(), DVec2::new(1.0, 0.0));
    // E[x^2] - E[x]^2 = 16/4 - 1
    assert_abs_diff_eq!(acc.covariance().x_axis.x, 3.0, epsilon = 1e-12);
}

#[test]
fn empty_accumulators_are_zero() {
    let acc3 = Covariance3::default();
    assert_eq!(acc3.mean(), DVec3::ZERO);
    assert_eq!(acc3.covariance(), DMat3::ZERO);
    let acc2 = Covariance2::default();
    assert_eq!(acc2.count(), 0);
    assert_eq!(acc2.covariance(), DMat2::ZERO);
}
