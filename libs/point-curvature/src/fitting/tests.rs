//! Tests for the fitting protocol primitives.

use super::*;
use crate::plane::PlaneEstimate;

#[test]
fn combine_follows_precedence() {
    use FitResult::*;
    assert_eq!(Stable.combine(Stable), Stable);
    assert_eq!(Stable.combine(Unstable), Unstable);
    assert_eq!(Unstable.combine(NeedOtherPass), NeedOtherPass);
    assert_eq!(NeedOtherPass.combine(Unstable), NeedOtherPass);
    assert_eq!(NeedOtherPass.combine(Undefined), Undefined);
    assert_eq!(Undefined.combine(Stable), Undefined);
}

#[test]
fn result_predicates() {
    assert!(FitResult::Stable.is_stable());
    assert!(FitResult::Unstable.is_defined());
    assert!(!FitResult::Unstable.is_stable());
    assert!(!FitResult::Undefined.is_defined());
    assert!(!FitResult::NeedOtherPass.is_terminal());
    assert!(FitResult::Undefined.is_terminal());
}

#[test]
fn tracker_counts_passes() {
    let mut tracker = PassTracker::default();
    assert_eq!(tracker.phase(), PassPhase::Idle);
    assert_eq!(tracker.last_result(), None);

    assert_eq!(tracker.begin(), 0);
    // Re-init restarts the current pass
    assert_eq!(tracker.begin(), 0);
    tracker.close("test", FitResult::NeedOtherPass);
    assert_eq!(tracker.last_result(), Some(FitResult::NeedOtherPass));

    assert_eq!(tracker.begin(), 1);
    assert_eq!(tracker.require_accumulating("test"), 1);
    tracker.close("test", FitResult::Stable);

    // A terminal result starts a new query
    assert_eq!(tracker.begin(), 0);
}

#[test]
#[should_panic(expected = "call init first")]
fn tracker_rejects_finalize_before_init() {
    let mut tracker = PassTracker::default();
    tracker.close("test", FitResult::Stable);
}

#[test]
#[should_panic(expected = "not accumulating")]
fn tracker_rejects_double_finalize() {
    let mut tracker = PassTracker::default();
    tracker.begin();
    tracker.close("test", FitResult::Stable);
    tracker.close("test", FitResult::Stable);
}

#[test]
fn context_publishes_and_resets() {
    let mut ctx = FitContext::new(DVec3::X);
    assert_eq!(ctx.eval_pos(), DVec3::X);
    assert!(ctx.plane().is_none());

    ctx.publish_plane(PlaneEstimate::new(DVec3::ZERO, DVec3::Z, FitResult::Stable));
    assert_eq!(ctx.plane().map(|p| p.normal()), Some(DVec3::Z));

    ctx.reset(DVec3::Y);
    assert_eq!(ctx.eval_pos(), DVec3::Y);
    assert!(ctx.plane().is_none());
    assert!(ctx.curvature().is_none());
}

#[test]
fn capability_display() {
    assert_eq!(Capability::Plane.to_string(), "plane");
    assert_eq!(
        Capability::PrincipalCurvatures.to_string(),
        "principal curvatures"
    );
}
