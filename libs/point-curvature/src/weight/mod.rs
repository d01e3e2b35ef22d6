//! # Weight Functions
//!
//! Maps a neighbor to a nonnegative weight relative to the evaluation
//! position. A weight of zero marks the neighbor as outside the support and
//! the stages reject it.
//!
//! ## Kernels
//!
//! With `x = |p - q| / scale` in `[0, 1]`:
//!
//! | Kernel     | Profile              |
//! |------------|----------------------|
//! | `Constant` | `1`                  |
//! | `Smooth`   | `(1 - x²)²`          |
//! | `Wendland` | `(1 - x)⁴ (4x + 1)`  |

use glam::DVec3;

use crate::error::FittingError;

/// Weight of a neighbor at `position` for a query at `eval_pos`.
pub trait WeightFunc: Send + Sync {
    /// Returns a nonnegative weight; zero outside the support.
    fn weight(&self, eval_pos: DVec3, position: DVec3) -> f64;
}

/// Unit weight everywhere. Every neighbor the source yields is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoWeight;

impl WeightFunc for NoWeight {
    fn weight(&self, _eval_pos: DVec3, _position: DVec3) -> f64 {
        1.0
    }
}

/// Radial profile of a [`DistanceWeight`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightKernel {
    /// Unit weight inside the support.
    #[default]
    Constant,
    /// `(1 - x²)²`.
    Smooth,
    /// `(1 - x)⁴ (4x + 1)`.
    Wendland,
}

impl WeightKernel {
    /// Evaluates the kernel at a normalized distance `x` in `[0, 1]`.
    pub fn eval(self, x: f64) -> f64 {
        match self {
            WeightKernel::Constant => 1.0,
            WeightKernel::Smooth => {
                let y = 1.0 - x * x;
                y * y
            }
            WeightKernel::Wendland => {
                let y = 1.0 - x;
                y * y * y * y * (4.0 * x + 1.0)
            }
        }
    }
}

/// Compactly supported radial weight.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use point_curvature::weight::{DistanceWeight, WeightFunc, WeightKernel};
///
/// let w = DistanceWeight::new(2.0, WeightKernel::Smooth).unwrap();
/// assert_eq!(w.weight(DVec3::ZERO, DVec3::ZERO), 1.0);
/// assert_eq!(w.weight(DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0)), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceWeight {
    scale: f64,
    kernel: WeightKernel,
}

impl DistanceWeight {
    /// Creates a weight with support radius `scale`.
    pub fn new(scale: f64, kernel: WeightKernel) -> Result<Self, FittingError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(FittingError::InvalidScale(scale));
        }
        Ok(Self { scale, kernel })
    }

    /// Support radius.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Radial profile.
    pub fn kernel(&self) -> WeightKernel {
        self.kernel
    }
}

impl WeightFunc for DistanceWeight {
    fn weight(&self, eval_pos: DVec3, position: DVec3) -> f64 {
        let distance = eval_pos.distance(position);
        if distance > self.scale {
            return 0.0;
        }
        self.kernel.eval(distance / self.scale)
    }
}

/// Whether a weight lets a sample through.
pub(crate) fn is_accepted(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

#[cfg(test)]
mod tests;
