//! # Tests for Config Constants
//!
//! Unit tests verifying the relationships between configuration constants.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_tolerance_is_positive() {
    assert!(EPSILON_TOLERANCE > 0.0, "EPSILON_TOLERANCE must be positive");
}

#[test]
fn test_tolerance_is_small() {
    assert!(
        EPSILON_TOLERANCE < 1e-6,
        "EPSILON_TOLERANCE should be small for precision"
    );
}

// =============================================================================
// SAMPLE THRESHOLD TESTS
// =============================================================================

#[test]
fn test_covariance_thresholds_match_dimension() {
    // An NxN covariance needs at least N samples to have full rank
    assert_eq!(MIN_COVARIANCE_3D_SAMPLES, 3);
    assert_eq!(MIN_COVARIANCE_2D_SAMPLES, 2);
}

#[test]
fn test_plane_needs_three_points() {
    assert!(MIN_PLANE_SAMPLES >= 3);
}

// =============================================================================
// STABILITY TESTS
// =============================================================================

#[test]
fn test_coherence_in_unit_range() {
    assert!(MIN_NORMAL_COHERENCE > 0.0);
    assert!(MIN_NORMAL_COHERENCE <= 1.0);
}

#[test]
fn test_degeneracy_ratio_below_one() {
    assert!(PLANE_DEGENERACY_RATIO >= 0.0);
    assert!(PLANE_DEGENERACY_RATIO < 1.0);
}

#[test]
fn test_two_pass_pipelines_fit_in_limit() {
    // The projected estimator needs two passes
    assert!(MAX_FIT_PASSES >= 2);
}
