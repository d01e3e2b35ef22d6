//! Single-pass curvature from the 3x3 covariance of neighbor normals.

use config::constants::{FitConfig, MIN_COVARIANCE_3D_SAMPLES};
use glam::DVec3;
use tracing::{debug, trace, warn};

use super::{curvature_from_eigenvalue, CurvatureResult};
use crate::data::{finite_position, unit_normal, DataPoint, Dimension};
use crate::fitting::{Capability, FitContext, FitResult, FittingStage, PassTracker};
use crate::linalg::{symmetric_eigen3, Covariance3};
use crate::weight::{is_accepted, NoWeight, WeightFunc};

const NAME: &str = "normal-covariance";

/// Curvature from the covariance of unit neighbor normals.
///
/// Of the three eigenpairs, the one whose eigenvector is most aligned with the
/// mean normal describes the surface normal and is discarded. The remaining
/// two are tangent: the larger eigenvalue gives `k1`, the smaller `k2`.
///
/// Outcomes:
/// - `Undefined` below three accepted samples, or when the covariance is not
///   finite
/// - `Unstable` when the normals cancel out (mean normal shorter than
///   `min_normal_coherence`) or vary most along the normal axis itself, as
///   happens with inconsistently oriented normals
/// - `Stable` otherwise
///
/// Three non-collinear samples are therefore not always enough for `Stable`.
/// The coherence check deliberately narrows that: normals that balance out,
/// such as the six axis directions `±X`, `±Y`, `±Z`, span all of space yet
/// have no mean direction to tell the normal axis apart, and are reported
/// `Unstable` with `k1 = k2 = 1/3`.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use point_curvature::data::Sample;
/// use point_curvature::{FitContext, FitResult, FittingStage, NormalCovariance};
/// use point_curvature::weight::NoWeight;
///
/// let mut stage = NormalCovariance::new(NoWeight);
/// let mut ctx = FitContext::default();
/// FittingStage::<Sample>::init(&mut stage, DVec3::ZERO);
/// for x in [-1.0, 0.0, 1.0] {
///     stage.add_neighbor(&Sample::new(DVec3::new(x, 0.0, 0.0), DVec3::Z));
/// }
/// assert_eq!(FittingStage::<Sample>::finalize(&mut stage, &mut ctx), FitResult::Stable);
/// assert_eq!(stage.result().k1(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct NormalCovariance<W = NoWeight> {
    weight: W,
    config: FitConfig,
    tracker: PassTracker,
    eval_pos: DVec3,
    normals: Covariance3,
    result: CurvatureResult,
}

impl<W: WeightFunc> NormalCovariance<W> {
    /// Creates the stage with the default configuration.
    pub fn new(weight: W) -> Self {
        Self::with_config(weight, FitConfig::default())
    }

    /// Creates the stage with an explicit configuration.
    pub fn with_config(weight: W, config: FitConfig) -> Self {
        Self {
            weight,
            config,
            tracker: PassTracker::default(),
            eval_pos: DVec3::ZERO,
            normals: Covariance3::default(),
            result: CurvatureResult::default(),
        }
    }

    /// Curvature from the last finalize; meaningful only if it was defined.
    pub fn result(&self) -> &CurvatureResult {
        &self.result
    }

    /// Outcome of the last finalize.
    pub fn status(&self) -> Option<FitResult> {
        self.tracker.last_result()
    }

    /// Number of samples accepted in the current or last pass.
    pub fn accepted(&self) -> usize {
        self.normals.count()
    }

    fn estimate(&mut self) -> FitResult {
        self.result = CurvatureResult::default();
        if self.normals.count() < MIN_COVARIANCE_3D_SAMPLES {
            return FitResult::Undefined;
        }

        let mean = self.normals.mean();
        let coherence = mean.length();
        let Some(eig) = symmetric_eigen3(&self.normals.covariance()) else {
            return FitResult::Undefined;
        };

        let normal_axis = if coherence > self.config.tolerance {
            (0..3)
                .max_by(|&i, &j| {
                    let di = eig.vectors.col(i).dot(mean).abs();
                    let dj = eig.vectors.col(j).dot(mean).abs();
                    di.total_cmp(&dj)
                })
                .unwrap_or(0)
        } else {
            0
        };
        // Eigenvalues are ascending, so `low` <= `high`
        let (low, high) = match normal_axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };

        let tolerance = self.config.tolerance;
        self.result = CurvatureResult::new(
            (
                curvature_from_eigenvalue(eig.values[high], tolerance),
                eig.vectors.col(high),
            ),
            (
                curvature_from_eigenvalue(eig.values[low], tolerance),
                eig.vectors.col(low),
            ),
        );

        let incoherent = coherence < self.config.min_normal_coherence;
        let flipped = eig.values[normal_axis] > eig.values[high] + tolerance;
        if incoherent || flipped {
            warn!(
                stage = NAME,
                coherence,
                normal_variance = eig.values[normal_axis],
                "inconsistent normal orientation"
            );
            FitResult::Unstable
        } else {
            FitResult::Stable
        }
    }
}

impl<P: DataPoint, W: WeightFunc> FittingStage<P> for NormalCovariance<W> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::PrincipalCurvatures]
    }

    fn init(&mut self, eval_pos: DVec3) {
        let () = Dimension::<P>::REQUIRE_3D;
        self.tracker.begin();
        self.eval_pos = eval_pos;
        self.normals = Covariance3::default();
    }

    fn add_neighbor(&mut self, point: &P) -> bool {
        self.tracker.require_accumulating(NAME);
        let Some(position) = finite_position(point) else {
            trace!(stage = NAME, "non-finite position");
            return false;
        };
        let w = self.weight.weight(self.eval_pos, position);
        if !is_accepted(w) {
            trace!(stage = NAME, weight = w, "sample outside support");
            return false;
        }
        let Some(normal) = unit_normal(point, self.config.tolerance) else {
            trace!(stage = NAME, "degenerate normal");
            return false;
        };
        let w = if self.config.weighted_curvature { w } else { 1.0 };
        self.normals.add(normal, w);
        true
    }

    fn finalize(&mut self, context: &mut FitContext) -> FitResult {
        self.tracker.require_accumulating(NAME);
        let status = self.estimate();
        debug!(
            stage = NAME,
            samples = self.normals.count(),
            status = ?status,
            k1 = self.result.k1(),
            k2 = self.result.k2(),
            "curvature finalized"
        );
        if status.is_defined() {
            context.publish_curvature(self.result);
        }
        self.tracker.close(NAME, status)
    }

    fn reset(&mut self) {
        self.tracker = PassTracker::default();
        self.normals = Covariance3::default();
        self.result = CurvatureResult::default();
    }
}
