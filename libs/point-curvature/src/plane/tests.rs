//! Tests for plane-fitting stages.

use super::*;
use crate::data::Sample;
use crate::weight::{DistanceWeight, WeightKernel};
use approx::assert_abs_diff_eq;

/// Drives one pass of a stage over `samples`.
fn run_pass<S: FittingStage<Sample>>(
    stage: &mut S,
    eval_pos: DVec3,
    samples: &[Sample],
    ctx: &mut FitContext,
) -> FitResult {
    stage.init(eval_pos);
    for s in samples {
        stage.add_neighbor(s);
    }
    stage.finalize(ctx)
}

fn tilted_grid(normal: DVec3) -> Vec<Sample> {
    let (u, v) = normal.any_orthonormal_pair();
    let mut samples = Vec::new();
    for i in -2..=2 {
        for j in -2..=2 {
            let p = u * (i as f64 * 0.1) + v * (j as f64 * 0.1);
            samples.push(Sample::new(p, normal));
        }
    }
    samples
}

#[test]
fn covariance_fit_recovers_tilted_plane() {
    let normal = DVec3::new(1.0, -2.0, 0.5).normalize();
    let samples = tilted_grid(normal);
    let mut fit = CovariancePlaneFit::new(NoWeight);
    let mut ctx = FitContext::new(DVec3::ZERO);

    assert_eq!(run_pass(&mut fit, DVec3::ZERO, &samples, &mut ctx), FitResult::Stable);
    let plane = ctx.plane().copied().unwrap();
    assert_abs_diff_eq!(plane.normal().dot(normal), 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(plane.origin().length(), 0.0, epsilon = 1e-12);
    assert_eq!(fit.plane(), Some(&plane));
}

#[test]
fn covariance_fit_orients_by_sample_normals() {
    let samples = tilted_grid(-DVec3::Z);
    let mut fit = CovariancePlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();
    run_pass(&mut fit, DVec3::ZERO, &samples, &mut ctx);
    assert_abs_diff_eq!(ctx.plane().unwrap().normal().z, -1.0, epsilon = 1e-10);
}

#[test]
fn covariance_fit_needs_three_samples() {
    let samples = tilted_grid(DVec3::Z);
    let mut fit = CovariancePlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();
    assert_eq!(
        run_pass(&mut fit, DVec3::ZERO, &samples[..2], &mut ctx),
        FitResult::Undefined
    );
    let plane = ctx.plane().unwrap();
    assert_eq!(plane.status(), FitResult::Undefined);
    assert_eq!(plane.normal(), DVec3::ZERO);
}

#[test]
fn covariance_fit_flags_collinear_points() {
    let samples: Vec<Sample> = (0..6)
        .map(|i| Sample::new(DVec3::new(i as f64, 0.0, 0.0), DVec3::Z))
        .collect();
    let mut fit = CovariancePlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();
    assert_eq!(
        run_pass(&mut fit, DVec3::ZERO, &samples, &mut ctx),
        FitResult::Unstable
    );
}

#[test]
fn covariance_fit_rejects_outside_support() {
    let mut samples = tilted_grid(DVec3::Z);
    samples.push(Sample::new(DVec3::new(50.0, 0.0, 0.0), DVec3::Z));
    let weight = DistanceWeight::new(1.0, WeightKernel::Smooth).unwrap();
    let mut fit = CovariancePlaneFit::new(weight);

    FittingStage::<Sample>::init(&mut fit, DVec3::ZERO);
    let accepted = samples.iter().filter(|s| fit.add_neighbor(*s)).count();
    assert_eq!(accepted, samples.len() - 1);
}

#[test]
fn covariance_fit_ignores_non_finite_positions() {
    let normal = DVec3::new(1.0, -2.0, 0.5).normalize();
    let mut samples = tilted_grid(normal);
    let clean = samples.len();
    samples.push(Sample::new(DVec3::new(f64::NAN, 0.0, 2.0), normal));
    samples.push(Sample::new(DVec3::splat(f64::INFINITY), normal));
    let mut fit = CovariancePlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();

    assert_eq!(run_pass(&mut fit, DVec3::ZERO, &samples, &mut ctx), FitResult::Stable);
    assert_eq!(fit.positions.count(), clean);
    let plane = ctx.plane().unwrap();
    assert!(plane.origin().is_finite());
    assert_abs_diff_eq!(plane.normal().dot(normal), 1.0, epsilon = 1e-10);
}

#[test]
fn covariance_fit_undefined_when_covariance_overflows() {
    // Finite positions whose second moments overflow to infinity
    let samples: Vec<Sample> = [DVec3::X, DVec3::Y, DVec3::Z, DVec3::ONE]
        .iter()
        .map(|&p| Sample::new(p * 1.0e200, DVec3::Z))
        .collect();
    let mut fit = CovariancePlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();

    assert_eq!(
        run_pass(&mut fit, DVec3::ZERO, &samples, &mut ctx),
        FitResult::Undefined
    );
    assert_eq!(ctx.plane().unwrap().normal(), DVec3::ZERO);
}

#[test]
fn plane_potential_and_projection() {
    let plane = PlaneEstimate::new(DVec3::new(0.0, 0.0, 1.0), DVec3::Z, FitResult::Stable);
    let q = DVec3::new(2.0, 3.0, 4.0);
    assert_eq!(plane.potential(q), 3.0);
    assert_eq!(plane.project(q), DVec3::new(2.0, 3.0, 1.0));
}

#[test]
fn mean_fit_averages_normals() {
    let samples = vec![
        Sample::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 1.0)),
        Sample::new(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(-1.0, 0.0, 1.0)),
    ];
    let mut fit = MeanPlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();
    assert_eq!(run_pass(&mut fit, DVec3::ZERO, &samples, &mut ctx), FitResult::Stable);
    let plane = ctx.plane().unwrap();
    assert_abs_diff_eq!(plane.normal().z, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(plane.origin().length(), 0.0, epsilon = 1e-12);
}

#[test]
fn mean_fit_undefined_when_normals_cancel() {
    let samples = vec![
        Sample::new(DVec3::ZERO, DVec3::Z),
        Sample::new(DVec3::X, -DVec3::Z),
    ];
    let mut fit = MeanPlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();
    assert_eq!(
        run_pass(&mut fit, DVec3::ZERO, &samples, &mut ctx),
        FitResult::Undefined
    );
}

#[test]
fn mean_fit_rejects_degenerate_normals() {
    let mut fit = MeanPlaneFit::new(NoWeight);
    FittingStage::<Sample>::init(&mut fit, DVec3::ZERO);
    assert!(!fit.add_neighbor(&Sample::new(DVec3::ZERO, DVec3::ZERO)));
    assert!(fit.add_neighbor(&Sample::new(DVec3::ZERO, DVec3::Z)));
}

#[test]
fn mean_fit_rejects_non_finite_positions() {
    let mut fit = MeanPlaneFit::new(NoWeight);
    let mut ctx = FitContext::default();
    FittingStage::<Sample>::init(&mut fit, DVec3::ZERO);
    assert!(!fit.add_neighbor(&Sample::new(DVec3::new(0.0, f64::NAN, 0.0), DVec3::Z)));
    assert!(fit.add_neighbor(&Sample::new(DVec3::X, DVec3::Z)));
    assert_eq!(FittingStage::<Sample>::finalize(&mut fit, &mut ctx), FitResult::Stable);
    assert_eq!(ctx.plane().unwrap().origin(), DVec3::X);
}

#[test]
#[should_panic(expected = "call init first")]
fn add_neighbor_before_init_panics() {
    let mut fit = CovariancePlaneFit::new(NoWeight);
    fit.add_neighbor(&Sample::new(DVec3::ZERO, DVec3::Z));
}
