//! Pass bookkeeping for fitting stages.

use super::FitResult;

/// Where a stage stands in the init/accumulate/finalize cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassPhase {
    /// Never initialized.
    #[default]
    Idle,
    /// Between `init` and `finalize` of pass `pass` (zero based).
    Accumulating {
        /// Current pass index
        pass: u32,
    },
    /// `finalize` of pass `pass` returned `result`.
    Closed {
        /// Last closed pass index
        pass: u32,
        /// Outcome of that pass
        result: FitResult,
    },
}

/// Tracks the pass index and guards protocol order.
///
/// # Example
///
/// ```rust
/// use point_curvature::fitting::{PassPhase, PassTracker};
/// use point_curvature::FitResult;
///
/// let mut tracker = PassTracker::default();
/// assert_eq!(tracker.begin(), 0);
/// tracker.close("demo", FitResult::NeedOtherPass);
/// assert_eq!(tracker.begin(), 1);
/// assert_eq!(tracker.phase(), PassPhase::Accumulating { pass: 1 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassTracker {
    phase: PassPhase,
}

impl PassTracker {
    /// Enters accumulation and returns the pass index being started.
    ///
    /// Re-entering during accumulation restarts the same pass.
    pub fn begin(&mut self) -> u32 {
        let pass = match self.phase {
            PassPhase::Idle => 0,
            PassPhase::Accumulating { pass } => pass,
            PassPhase::Closed {
                pass,
                result: FitResult::NeedOtherPass,
            } => pass + 1,
            PassPhase::Closed { .. } => 0,
        };
        self.phase = PassPhase::Accumulating { pass };
        pass
    }

    /// Returns the current pass index, panicking outside accumulation.
    pub fn require_accumulating(&self, stage: &'static str) -> u32 {
        match self.phase {
            PassPhase::Accumulating { pass } => pass,
            phase => panic!("stage '{stage}' is not accumulating ({phase:?}); call init first"),
        }
    }

    /// Closes the current pass with `result` and returns it.
    pub fn close(&mut self, stage: &'static str, result: FitResult) -> FitResult {
        let pass = self.require_accumulating(stage);
        self.phase = PassPhase::Closed { pass, result };
        result
    }

    /// Current phase.
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Outcome of the last closed pass, if any.
    pub fn last_result(&self) -> Option<FitResult> {
        match self.phase {
            PassPhase::Closed { result, .. } => Some(result),
            _ => None,
        }
    }
}
