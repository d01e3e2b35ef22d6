//! # Curvature Estimation
//!
//! Principal curvature estimators based on the covariance of neighbor
//! normals, and the [`CurvatureResult`] they publish.
//!
//! ## Estimators
//!
//! - [`NormalCovariance`]: single pass, 3x3 covariance of unit normals
//! - [`ProjectedNormalCovariance`]: two passes, 2x2 covariance of normals
//!   projected on the tangent plane of a previously fitted plane
//!
//! ## Curvature scale
//!
//! Curvature values are the eigenvalues of the weight-normalized covariance
//! matrix. They are nonnegative (a covariance cannot recover the sign of the
//! bending) and values at or below the configured tolerance are reported as
//! exactly zero.

mod normal_covariance;
mod projected;

pub use normal_covariance::NormalCovariance;
pub use projected::{ProjectedNormalCovariance, TangentFrame};

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Principal curvatures and directions at a query point.
///
/// Invariant: `|k1| >= |k2|`. Mean and Gaussian curvature are derived on
/// read.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use point_curvature::CurvatureResult;
///
/// let result = CurvatureResult::new((0.5, DVec3::Z), (2.0, DVec3::X));
/// assert_eq!(result.k1(), 2.0);
/// assert_eq!(result.k1_direction(), DVec3::X);
/// assert_eq!(result.k_mean(), 1.25);
/// assert_eq!(result.k_gaussian(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurvatureResult {
    k1: f64,
    k2: f64,
    v1: DVec3,
    v2: DVec3,
}

impl CurvatureResult {
    /// Builds a result from two (curvature, direction) pairs given in any
    /// order; the larger magnitude becomes `k1`.
    pub fn new(a: (f64, DVec3), b: (f64, DVec3)) -> Self {
        let (first, second) = if a.0.abs() >= b.0.abs() { (a, b) } else { (b, a) };
        Self {
            k1: first.0,
            k2: second.0,
            v1: first.1,
            v2: second.1,
        }
    }

    /// Principal curvature with the largest magnitude.
    pub fn k1(&self) -> f64 {
        self.k1
    }

    /// Principal curvature with the smallest magnitude.
    pub fn k2(&self) -> f64 {
        self.k2
    }

    /// Unit direction of `k1`.
    pub fn k1_direction(&self) -> DVec3 {
        self.v1
    }

    /// Unit direction of `k2`.
    pub fn k2_direction(&self) -> DVec3 {
        self.v2
    }

    /// Mean curvature `(k1 + k2) / 2`.
    pub fn k_mean(&self) -> f64 {
        (self.k1 + self.k2) / 2.0
    }

    /// Gaussian curvature `k1 * k2`.
    pub fn k_gaussian(&self) -> f64 {
        self.k1 * self.k2
    }
}

/// Maps a covariance eigenvalue to a curvature value.
fn curvature_from_eigenvalue(value: f64, tolerance: f64) -> f64 {
    if value <= tolerance {
        0.0
    } else {
        value
    }
}
