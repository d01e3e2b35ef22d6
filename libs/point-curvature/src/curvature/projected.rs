//! Two-pass curvature from normals projected onto the tangent plane.
//!
//! The first pass only needs the neighborhood to fit a plane (done by an
//! earlier stage); at its end a tangent frame is built from the plane normal.
//! The second pass projects every unit normal into that frame and analyses the
//! resulting 2x2 covariance.

use config::constants::{FitConfig, MIN_COVARIANCE_2D_SAMPLES};
use glam::{DVec2, DVec3};
use tracing::{debug, trace, warn};

use super::{curvature_from_eigenvalue, CurvatureResult};
use crate::data::{finite_position, unit_normal, DataPoint, Dimension};
use crate::fitting::{Capability, FitContext, FitResult, FittingStage, PassTracker};
use crate::linalg::{symmetric_eigen2, Covariance2};
use crate::weight::{is_accepted, NoWeight, WeightFunc};

const NAME: &str = "projected-normal-covariance";

// =============================================================================
// TANGENT FRAME
// =============================================================================

/// Orthonormal basis `(t1, t2)` of the plane orthogonal to `normal`.
///
/// # Example
///
/// ```rust
/// use glam::{DVec2, DVec3};
/// use point_curvature::TangentFrame;
///
/// let frame = TangentFrame::from_normal(DVec3::new(0.0, 0.0, 2.0));
/// let v = DVec3::new(0.3, -0.4, 7.0);
/// let back = frame.lift(frame.project(v));
/// assert!((back - DVec3::new(0.3, -0.4, 0.0)).length() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    normal: DVec3,
    t1: DVec3,
    t2: DVec3,
}

impl TangentFrame {
    /// Builds a frame around `normal`, which need not be unit length but must
    /// not be zero.
    pub fn from_normal(normal: DVec3) -> Self {
        let normal = normal.normalize();
        let (t1, t2) = normal.any_orthonormal_pair();
        Self { normal, t1, t2 }
    }

    /// Unit normal of the frame.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Tangent basis vectors.
    pub fn basis(&self) -> (DVec3, DVec3) {
        (self.t1, self.t2)
    }

    /// Tangent-plane coordinates of `v`.
    pub fn project(&self, v: DVec3) -> DVec2 {
        DVec2::new(self.t1.dot(v), self.t2.dot(v))
    }

    /// 3D vector with tangent-plane coordinates `e`.
    pub fn lift(&self, e: DVec2) -> DVec3 {
        self.t1 * e.x + self.t2 * e.y
    }
}

// =============================================================================
// ESTIMATOR
// =============================================================================

/// Pass state of the projected estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ProjectionState {
    /// First pass: waiting for the plane to build the tangent frame.
    AwaitingPass1,
    /// Second pass: projecting normals into the stored frame.
    AwaitingPass2 {
        frame: TangentFrame,
        plane_status: FitResult,
    },
    /// Both passes closed, or the first one failed.
    Done,
}

/// Curvature from the 2x2 covariance of normals projected on the tangent
/// plane of a fitted plane.
///
/// Requires a [`Capability::Plane`] stage earlier in the same pipeline.
/// Outcomes:
/// - `NeedOtherPass` after the first pass if the plane is defined
/// - `Undefined` if the plane is undefined, or below two samples in the
///   second pass
/// - `Unstable` if the plane was unstable or the mean normal, projected on the
///   plane normal, is below `min_normal_coherence`
/// - `Stable` otherwise
#[derive(Debug, Clone)]
pub struct ProjectedNormalCovariance<W = NoWeight> {
    weight: W,
    config: FitConfig,
    state: ProjectionState,
    tracker: PassTracker,
    eval_pos: DVec3,
    accepted: usize,
    projected: Covariance2,
    coherence_sum: f64,
    result: CurvatureResult,
}

impl<W: WeightFunc> ProjectedNormalCovariance<W> {
    /// Creates the stage with the default configuration.
    pub fn new(weight: W) -> Self {
        Self::with_config(weight, FitConfig::default())
    }

    /// Creates the stage with an explicit configuration.
    pub fn with_config(weight: W, config: FitConfig) -> Self {
        Self {
            weight,
            config,
            state: ProjectionState::AwaitingPass1,
            tracker: PassTracker::default(),
            eval_pos: DVec3::ZERO,
            accepted: 0,
            projected: Covariance2::default(),
            coherence_sum: 0.0,
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

    /// Tangent frame built at the end of the first pass.
    pub fn frame(&self) -> Option<TangentFrame> {
        match self.state {
            ProjectionState::AwaitingPass2 { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// Number of samples accepted in the current or last pass.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    fn close_first_pass(&mut self, context: &FitContext) -> FitResult {
        let Some(plane) = context.plane() else {
            panic!("stage '{NAME}' needs a plane published by an earlier stage of the same pass");
        };
        if !plane.status().is_defined() {
            self.state = ProjectionState::Done;
            return FitResult::Undefined;
        }
        self.state = ProjectionState::AwaitingPass2 {
            frame: TangentFrame::from_normal(plane.normal()),
            plane_status: plane.status(),
        };
        FitResult::NeedOtherPass
    }

    fn close_second_pass(&mut self, frame: TangentFrame, plane_status: FitResult) -> FitResult {
        self.state = ProjectionState::Done;
        if self.projected.count() < MIN_COVARIANCE_2D_SAMPLES {
            return FitResult::Undefined;
        }

        let Some(eig) = symmetric_eigen2(&self.projected.covariance()) else {
            return FitResult::Undefined;
        };
        let tolerance = self.config.tolerance;
        self.result = CurvatureResult::new(
            (
                curvature_from_eigenvalue(eig.values.y, tolerance),
                frame.lift(eig.vectors.y_axis),
            ),
            (
                curvature_from_eigenvalue(eig.values.x, tolerance),
                frame.lift(eig.vectors.x_axis),
            ),
        );

        let coherence = self.coherence_sum / self.projected.sum_weights();
        if coherence < self.config.min_normal_coherence {
            warn!(stage = NAME, coherence, "normals disagree with the fitted plane");
            return FitResult::Unstable;
        }
        plane_status.combine(FitResult::Stable)
    }
}

impl<P: DataPoint, W: WeightFunc> FittingStage<P> for ProjectedNormalCovariance<W> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn provides(&self) -> &'static [Capability] {
        &[Capability::PrincipalCurvatures]
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Plane]
    }

    fn init(&mut self, eval_pos: DVec3) {
        let () = Dimension::<P>::REQUIRE_3D;
        if self.state == ProjectionState::Done {
            self.state = ProjectionState::AwaitingPass1;
        }
        if self.state == ProjectionState::AwaitingPass1 {
            self.result = CurvatureResult::default();
        }
        self.tracker.begin();
        self.eval_pos = eval_pos;
        self.accepted = 0;
        self.projected = Covariance2::default();
        self.coherence_sum = 0.0;
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

        match self.state {
            ProjectionState::AwaitingPass1 => {}
            ProjectionState::AwaitingPass2 { frame, .. } => {
                let w = if self.config.weighted_curvature { w } else { 1.0 };
                self.projected.add(frame.project(normal), w);
                self.coherence_sum += w * normal.dot(frame.normal());
            }
            // init never leaves the stage accumulating in Done
            ProjectionState::Done => return false,
        }
        self.accepted += 1;
        true
    }

    fn finalize(&mut self, context: &mut FitContext) -> FitResult {
        self.tracker.require_accumulating(NAME);
        let status = match self.state {
            ProjectionState::AwaitingPass1 => self.close_first_pass(context),
            ProjectionState::AwaitingPass2 {
                frame,
                plane_status,
            } => self.close_second_pass(frame, plane_status),
            ProjectionState::Done => FitResult::Undefined,
        };

        debug!(
            stage = NAME,
            samples = self.accepted,
            status = ?status,
            k1 = self.result.k1(),
            k2 = self.result.k2(),
            "pass finalized"
        );
        if status.is_defined() {
            context.publish_curvature(self.result);
        }
        self.tracker.close(NAME, status)
    }

    fn reset(&mut self) {
        self.state = ProjectionState::AwaitingPass1;
        self.tracker = PassTracker::default();
        self.accepted = 0;
        self.projected = Covariance2::default();
        self.coherence_sum = 0.0;
        self.result = CurvatureResult::default();
    }
}
