//! Tests for weight functions.

use super::*;
use approx::assert_abs_diff_eq;

#[test]
fn no_weight_is_unit_everywhere() {
    let w = NoWeight;
    assert_eq!(w.weight(DVec3::ZERO, DVec3::splat(1.0e6)), 1.0);
}

#[test]
fn kernels_are_one_at_center() {
    for kernel in [WeightKernel::Constant, WeightKernel::Smooth, WeightKernel::Wendland] {
        assert_eq!(kernel.eval(0.0), 1.0, "{kernel:?}");
    }
}

#[test]
fn smooth_kernels_vanish_at_support_boundary() {
    assert_eq!(WeightKernel::Smooth.eval(1.0), 0.0);
    assert_eq!(WeightKernel::Wendland.eval(1.0), 0.0);
    assert_eq!(WeightKernel::Constant.eval(1.0), 1.0);
}

#[test]
fn smooth_kernel_midpoint() {
    // (1 - 0.25)^2
    assert_abs_diff_eq!(WeightKernel::Smooth.eval(0.5), 0.5625, epsilon = 1e-12);
    // 0.5^4 * 3
    assert_abs_diff_eq!(WeightKernel::Wendland.eval(0.5), 0.1875, epsilon = 1e-12);
}

#[test]
fn distance_weight_cuts_off_outside_scale() {
    let w = DistanceWeight::new(1.0, WeightKernel::Constant).unwrap();
    let q = DVec3::new(5.0, 5.0, 5.0);
    assert_eq!(w.weight(q, q + DVec3::new(0.5, 0.0, 0.0)), 1.0);
    assert_eq!(w.weight(q, q + DVec3::new(1.5, 0.0, 0.0)), 0.0);
    assert!(!is_accepted(w.weight(q, q + DVec3::new(0.0, 2.0, 0.0))));
}

#[test]
fn distance_weight_rejects_bad_scale() {
    assert!(matches!(
        DistanceWeight::new(0.0, WeightKernel::Smooth),
        Err(FittingError::InvalidScale(_))
    ));
    assert!(DistanceWeight::new(f64::INFINITY, WeightKernel::Smooth).is_err());
    assert!(DistanceWeight::new(-1.0, WeightKernel::Smooth).is_err());
}

#[test]
fn acceptance_requires_positive_finite_weight() {
    assert!(is_accepted(0.5));
    assert!(!is_accepted(0.0));
    assert!(!is_accepted(f64::NAN));
    assert!(!is_accepted(f64::INFINITY));
}
