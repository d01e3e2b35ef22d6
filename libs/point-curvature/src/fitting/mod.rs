//! # Fitting Protocol
//!
//! The init/accumulate/finalize contract shared by every fitting stage.
//!
//! ## Protocol
//!
//! ```text
//! init(eval_pos) → add_neighbor(p)* → finalize(ctx) ─┬─ Stable / Unstable / Undefined
//!        ▲                                            │
//!        └──────────────── NeedOtherPass ─────────────┘
//! ```
//!
//! Stages publish their results into a shared [`FitContext`] so that later
//! stages of the same pass can consume them (a plane fit feeding the
//! projected curvature estimator). Which stage depends on which is declared
//! through [`Capability`] tags and checked when a pipeline is built.

mod state;

pub use state::{PassPhase, PassTracker};

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::curvature::CurvatureResult;
use crate::data::DataPoint;
use crate::plane::PlaneEstimate;

// =============================================================================
// FIT RESULT
// =============================================================================

/// Outcome of a `finalize` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitResult {
    /// The estimate is reliable.
    Stable,
    /// The estimate is available but numerically fragile.
    Unstable,
    /// Another init/accumulate/finalize pass is required.
    NeedOtherPass,
    /// Not enough accepted samples; results are meaningless.
    Undefined,
}

impl FitResult {
    /// Whether results can be read and trusted.
    pub fn is_stable(self) -> bool {
        self == FitResult::Stable
    }

    /// Whether results can be read at all.
    pub fn is_defined(self) -> bool {
        matches!(self, FitResult::Stable | FitResult::Unstable)
    }

    /// Whether the fit is over (no further pass is requested).
    pub fn is_terminal(self) -> bool {
        self != FitResult::NeedOtherPass
    }

    /// Merges the outcomes of two stages.
    ///
    /// Precedence: `Undefined`, then `NeedOtherPass`, then `Unstable`, then
    /// `Stable`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use point_curvature::FitResult;
    /// assert_eq!(FitResult::Stable.combine(FitResult::Unstable), FitResult::Unstable);
    /// assert_eq!(FitResult::NeedOtherPass.combine(FitResult::Undefined), FitResult::Undefined);
    /// ```
    pub fn combine(self, other: FitResult) -> FitResult {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    fn severity(self) -> u8 {
        match self {
            FitResult::Stable => 0,
            FitResult::Unstable => 1,
            FitResult::NeedOtherPass => 2,
            FitResult::Undefined => 3,
        }
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// A result a stage publishes into the [`FitContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// A fitted local plane (origin and normal).
    Plane,
    /// Principal curvature values and directions.
    PrincipalCurvatures,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Plane => write!(f, "plane"),
            Capability::PrincipalCurvatures => write!(f, "principal curvatures"),
        }
    }
}

// =============================================================================
// FIT CONTEXT
// =============================================================================

/// Results shared between the stages of one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitContext {
    eval_pos: DVec3,
    plane: Option<PlaneEstimate>,
    curvature: Option<CurvatureResult>,
}

impl FitContext {
    /// Creates an empty context for a query at `eval_pos`.
    pub fn new(eval_pos: DVec3) -> Self {
        Self {
            eval_pos,
            ..Self::default()
        }
    }

    /// Clears every published result and moves to a new query position.
    pub fn reset(&mut self, eval_pos: DVec3) {
        *self = Self::new(eval_pos);
    }

    /// Query position.
    pub fn eval_pos(&self) -> DVec3 {
        self.eval_pos
    }

    /// Plane published by a plane-fitting stage.
    pub fn plane(&self) -> Option<&PlaneEstimate> {
        self.plane.as_ref()
    }

    /// Publishes a fitted plane.
    pub fn publish_plane(&mut self, plane: PlaneEstimate) {
        self.plane = Some(plane);
    }

    /// Curvature published by a curvature stage.
    pub fn curvature(&self) -> Option<&CurvatureResult> {
        self.curvature.as_ref()
    }

    /// Publishes principal curvatures.
    pub fn publish_curvature(&mut self, curvature: CurvatureResult) {
        self.curvature = Some(curvature);
    }
}

// =============================================================================
// FITTING STAGE
// =============================================================================

/// One stage of a fitting pipeline.
///
/// Calling `add_neighbor` or `finalize` without a preceding `init` is a
/// programming error and panics.
pub trait FittingStage<P: DataPoint>: Send {
    /// Short identifier used in errors and logs.
    fn name(&self) -> &'static str;

    /// Capabilities this stage publishes on finalize.
    fn provides(&self) -> &'static [Capability] {
        &[]
    }

    /// Capabilities an earlier stage must publish in the same pass.
    fn requires(&self) -> &'static [Capability] {
        &[]
    }

    /// Starts a pass for a query at `eval_pos`.
    ///
    /// After `NeedOtherPass` this begins the next pass and keeps what earlier
    /// passes computed; after a terminal result it starts over.
    fn init(&mut self, eval_pos: DVec3);

    /// Feeds one neighbor; returns whether it was accepted.
    fn add_neighbor(&mut self, point: &P) -> bool;

    /// Closes the current pass.
    fn finalize(&mut self, context: &mut FitContext) -> FitResult;

    /// Drops every pass state, including state kept for a pending pass.
    /// The next `init` starts a new query.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests;
