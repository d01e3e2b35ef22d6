//! # Plane Fitting
//!
//! Stages that fit a local plane to the neighborhood and publish it as the
//! [`Capability::Plane`] result.
//!
//! - [`CovariancePlaneFit`]: normal is the direction of least positional
//!   variance, oriented by the sample normals
//! - [`MeanPlaneFit`]: normal is the weighted mean of the sample normals
//!
//! Both publish a [`PlaneEstimate`] on every finalize, including undefined
//! ones, so downstream stages can tell "no plane stage" from "no plane".

use config::constants::{FitConfig, MIN_PLANE_SAMPLES};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::data::{finite_position, unit_normal, DataPoint, Dimension};
use crate::fitting::{Capability, FitContext, FitResult, FittingStage, PassTracker};
use crate::linalg::{symmetric_eigen3, Covariance3};
use crate::weight::{is_accepted, NoWeight, WeightFunc};

// =============================================================================
// PLANE ESTIMATE
// =============================================================================

/// A fitted plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneEstimate {
    origin: DVec3,
    normal: DVec3,
    status: FitResult,
}

impl PlaneEstimate {
    /// Creates a plane estimate.
    pub fn new(origin: DVec3, normal: DVec3, status: FitResult) -> Self {
        Self {
            origin,
            normal,
            status,
        }
    }

    /// Placeholder published when too few samples were accepted.
    pub fn undefined(origin: DVec3) -> Self {
        Self::new(origin, DVec3::ZERO, FitResult::Undefined)
    }

    /// A point on the plane.
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Unit normal; zero when undefined.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Outcome of the fit that produced this plane.
    pub fn status(&self) -> FitResult {
        self.status
    }

    /// Signed distance from `q` to the plane, positive on the normal side.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glam::DVec3;
    /// use point_curvature::plane::PlaneEstimate;
    /// use point_curvature::FitResult;
    ///
    /// let plane = PlaneEstimate::new(DVec3::ZERO, DVec3::Z, FitResult::Stable);
    /// assert_eq!(plane.potential(DVec3::new(4.0, 1.0, 2.5)), 2.5);
    /// ```
    pub fn potential(&self, q: DVec3) -> f64 {
        self.normal.dot(q - self.origin)
    }

    /// Orthogonal projection of `q` onto the plane.
    pub fn project(&self, q: DVec3) -> DVec3 {
        q - self.normal * self.potential(q)
    }
}

// =============================================================================
// COVARIANCE PLANE FIT
// =============================================================================

/// Plane through the weighted centroid, normal along the smallest eigenvector
/// of the position covariance.
///
/// Accepts every sample with a finite position and positive weight; sample
/// normals only orient the result. The fit is `Undefined` below three samples
/// and `Unstable` when the neighborhood is (nearly) collinear.
#[derive(Debug, Clone)]
pub struct CovariancePlaneFit<W = NoWeight> {
    weight: W,
    config: FitConfig,
    tracker: PassTracker,
    eval_pos: DVec3,
    positions: Covariance3,
    normal_sum: DVec3,
    plane: Option<PlaneEstimate>,
}

impl<W: WeightFunc> CovariancePlaneFit<W> {
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
            positions: Covariance3::default(),
            normal_sum: DVec3::ZERO,
            plane: None,
        }
    }

    /// Plane from the last finalize.
    pub fn plane(&self) -> Option<&PlaneEstimate> {
        self.plane.as_ref()
    }

    fn fit(&self) -> PlaneEstimate {
        if self.positions.count() < MIN_PLANE_SAMPLES || self.positions.sum_weights() <= 0.0 {
            return PlaneEstimate::undefined(self.eval_pos);
        }

        // Positions are accumulated relative to the query for conditioning
        let origin = self.eval_pos + self.positions.mean();
        let Some(eig) = symmetric_eigen3(&self.positions.covariance()) else {
            return PlaneEstimate::undefined(self.eval_pos);
        };

        let mut normal = eig.vectors.col(0);
        if !normal.is_finite() || normal.length() <= self.config.tolerance {
            return PlaneEstimate::undefined(self.eval_pos);
        }
        if normal.dot(self.normal_sum) < 0.0 {
            normal = -normal;
        }

        let middle = eig.values.y;
        let largest = eig.values.z;
        let status = if largest <= self.config.tolerance
            || middle <= self.config.plane_degeneracy_ratio * largest
        {
            FitResult::Unstable
        } else {
            FitResult::Stable
        };

        PlaneEstimate::new(origin, normal, status)
    }
}

impl<P: DataPoint, W: WeightFunc> FittingStage<P> for CovariancePlaneFit<W> {
    fn name(&self) -> &'static str {
        "covariance-plane-fit"
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::Plane]
    }

    fn init(&mut self, eval_pos: DVec3) {
        let () = Dimension::<P>::REQUIRE_3D;
        self.tracker.begin();
        self.eval_pos = eval_pos;
        self.positions = Covariance3::default();
        self.normal_sum = DVec3::ZERO;
    }

    fn add_neighbor(&mut self, point: &P) -> bool {
        self.tracker.require_accumulating("covariance-plane-fit");
        let Some(position) = finite_position(point) else {
            trace!(stage = "covariance-plane-fit", "non-finite position");
            return false;
        };
        let w = self.weight.weight(self.eval_pos, position);
        if !is_accepted(w) {
            trace!(stage = "covariance-plane-fit", weight = w, "sample outside support");
            return false;
        }
        self.positions.add(position - self.eval_pos, w);
        if let Some(normal) = unit_normal(point, self.config.tolerance) {
            self.normal_sum += normal * w;
        }
        true
    }

    fn finalize(&mut self, context: &mut FitContext) -> FitResult {
        self.tracker.require_accumulating("covariance-plane-fit");
        let plane = self.fit();
        debug!(
            stage = "covariance-plane-fit",
            samples = self.positions.count(),
            status = ?plane.status(),
            normal = ?plane.normal(),
            "plane finalized"
        );
        self.plane = Some(plane);
        context.publish_plane(plane);
        self.tracker.close("covariance-plane-fit", plane.status())
    }

    fn reset(&mut self) {
        self.tracker = PassTracker::default();
        self.positions = Covariance3::default();
        self.normal_sum = DVec3::ZERO;
        self.plane = None;
    }
}

// =============================================================================
// MEAN PLANE FIT
// =============================================================================

/// Plane through the weighted centroid, normal along the weighted mean of the
/// sample normals.
///
/// Rejects samples outside the weight support, with a non-finite position or
/// with a degenerate normal.
/// The fit is `Undefined` without samples or when the normals cancel out.
#[derive(Debug, Clone)]
pub struct MeanPlaneFit<W = NoWeight> {
    weight: W,
    config: FitConfig,
    tracker: PassTracker,
    eval_pos: DVec3,
    sum_weights: f64,
    position_sum: DVec3,
    normal_sum: DVec3,
    plane: Option<PlaneEstimate>,
}

impl<W: WeightFunc> MeanPlaneFit<W> {
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
            sum_weights: 0.0,
            position_sum: DVec3::ZERO,
            normal_sum: DVec3::ZERO,
            plane: None,
        }
    }

    /// Plane from the last finalize.
    pub fn plane(&self) -> Option<&PlaneEstimate> {
        self.plane.as_ref()
    }

    fn fit(&self) -> PlaneEstimate {
        if self.sum_weights <= 0.0 {
            return PlaneEstimate::undefined(self.eval_pos);
        }
        let mean_normal = self.normal_sum / self.sum_weights;
        if mean_normal.length() <= self.config.tolerance {
            return PlaneEstimate::undefined(self.eval_pos);
        }
        let origin = self.eval_pos + self.position_sum / self.sum_weights;
        PlaneEstimate::new(origin, mean_normal.normalize(), FitResult::Stable)
    }
}

impl<P: DataPoint, W: WeightFunc> FittingStage<P> for MeanPlaneFit<W> {
    fn name(&self) -> &'static str {
        "mean-plane-fit"
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::Plane]
    }

    fn init(&mut self, eval_pos: DVec3) {
        let () = Dimension::<P>::REQUIRE_3D;
        self.tracker.begin();
        self.eval_pos = eval_pos;
        self.sum_weights = 0.0;
        self.position_sum = DVec3::ZERO;
        self.normal_sum = DVec3::ZERO;
    }

    fn add_neighbor(&mut self, point: &P) -> bool {
        self.tracker.require_accumulating("mean-plane-fit");
        let Some(position) = finite_position(point) else {
            trace!(stage = "mean-plane-fit", "non-finite position");
            return false;
        };
        let w = self.weight.weight(self.eval_pos, position);
        let Some(normal) = unit_normal(point, self.config.tolerance) else {
            trace!(stage = "mean-plane-fit", "degenerate normal");
            return false;
        };
        if !is_accepted(w) {
            trace!(stage = "mean-plane-fit", weight = w, "sample outside support");
            return false;
        }
        self.sum_weights += w;
        self.position_sum += (position - self.eval_pos) * w;
        self.normal_sum += normal * w;
        true
    }

    fn finalize(&mut self, context: &mut FitContext) -> FitResult {
        self.tracker.require_accumulating("mean-plane-fit");
        let plane = self.fit();
        debug!(
            stage = "mean-plane-fit",
            status = ?plane.status(),
            normal = ?plane.normal(),
            "plane finalized"
        );
        self.plane = Some(plane);
        context.publish_plane(plane);
        self.tracker.close("mean-plane-fit", plane.status())
    }

    fn reset(&mut self) {
        self.tracker = PassTracker::default();
        self.sum_weights = 0.0;
        self.position_sum = DVec3::ZERO;
        self.normal_sum = DVec3::ZERO;
        self.plane = None;
    }
}

#[cfg(test)]
mod tests;
