//! Centralized configuration values shared across the curvature fitting
//! workspace.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Numerical tolerance used by the fitting kernels.
///
/// Eigenvalues at or below this value are reported as exactly zero curvature,
/// and normals shorter than it are treated as degenerate.
///
/// # Examples
/// ```
/// use config::constants::EPSILON_TOLERANCE;
/// assert!(EPSILON_TOLERANCE < 1.0e-6);
/// ```
pub const EPSILON_TOLERANCE: f64 = 1.0e-9;

// =============================================================================
// SAMPLE THRESHOLDS
// =============================================================================

/// Minimum accepted samples for a 3x3 covariance analysis.
///
/// # Examples
/// ```
/// use config::constants::MIN_COVARIANCE_3D_SAMPLES;
/// assert_eq!(MIN_COVARIANCE_3D_SAMPLES, 3);
/// ```
pub const MIN_COVARIANCE_3D_SAMPLES: usize = 3;

/// Minimum accepted samples for a 2x2 covariance analysis.
///
/// # Examples
/// ```
/// use config::constants::MIN_COVARIANCE_2D_SAMPLES;
/// assert_eq!(MIN_COVARIANCE_2D_SAMPLES, 2);
/// ```
pub const MIN_COVARIANCE_2D_SAMPLES: usize = 2;

/// Minimum accepted samples for a covariance plane fit.
///
/// # Examples
/// ```
/// use config::constants::MIN_PLANE_SAMPLES;
/// assert!(MIN_PLANE_SAMPLES >= 3);
/// ```
pub const MIN_PLANE_SAMPLES: usize = 3;

// =============================================================================
// STABILITY CONSTANTS
// =============================================================================

/// Minimum coherence of neighbor normals for a stable curvature estimate.
///
/// Coherence is the length of the mean unit normal (or its projection onto the
/// fitted plane normal). Values near zero mean the normals point in opposing
/// directions, usually because of inconsistent orientation.
///
/// # Examples
/// ```
/// use config::constants::MIN_NORMAL_COHERENCE;
/// assert!(MIN_NORMAL_COHERENCE > 0.0 && MIN_NORMAL_COHERENCE <= 1.0);
/// ```
pub const MIN_NORMAL_COHERENCE: f64 = 0.1;

/// Ratio between the middle and the largest eigenvalue of the position
/// covariance under which a neighborhood is considered collinear.
///
/// # Examples
/// ```
/// use config::constants::PLANE_DEGENERACY_RATIO;
/// assert!(PLANE_DEGENERACY_RATIO < 1.0);
/// ```
pub const PLANE_DEGENERACY_RATIO: f64 = 1.0e-6;

/// Upper bound on fitting passes driven by a pipeline for one query point.
///
/// # Examples
/// ```
/// use config::constants::MAX_FIT_PASSES;
/// assert!(MAX_FIT_PASSES >= 2);
/// ```
pub const MAX_FIT_PASSES: u32 = 4;

// =============================================================================
// FIT CONFIGURATION
// =============================================================================

/// Immutable snapshot of the fitting parameters shared by every stage of a
/// pipeline.
///
/// # Examples
/// ```
/// use config::constants::FitConfig;
/// let config = FitConfig::default();
/// assert!(config.tolerance > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Eigenvalue/normal-length tolerance.
    pub tolerance: f64,
    /// Minimum normal coherence for a `Stable` curvature result.
    pub min_normal_coherence: f64,
    /// Collinearity threshold for plane fits.
    pub plane_degeneracy_ratio: f64,
    /// Maximum number of passes a pipeline drives per query.
    pub max_passes: u32,
    /// Scale each sample's contribution to the normal covariance by its weight.
    pub weighted_curvature: bool,
}

impl FitConfig {
    /// Builds a configuration enforcing strict validation of every value.
    ///
    /// # Examples
    /// ```
    /// use config::constants::FitConfig;
    /// let cfg = FitConfig::new(1.0e-8, 0.2, 1.0e-5, 3).expect("valid config");
    /// assert_eq!(cfg.max_passes, 3);
    /// assert!(FitConfig::new(1.0e-8, 0.2, 1.0e-5, 1).is_err());
    /// ```
    pub fn new(
        tolerance: f64,
        min_normal_coherence: f64,
        plane_degeneracy_ratio: f64,
        max_passes: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            tolerance,
            min_normal_coherence,
            plane_degeneracy_ratio,
            max_passes,
            weighted_curvature: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy with weighted normal covariance enabled or disabled.
    ///
    /// # Examples
    /// ```
    /// use config::constants::FitConfig;
    /// assert!(FitConfig::default().with_weighted_curvature(true).weighted_curvature);
    /// ```
    pub fn with_weighted_curvature(mut self, weighted: bool) -> Self {
        self.weighted_curvature = weighted;
        self
    }

    /// Checks every field, reporting the first invalid one.
    ///
    /// Useful when a configuration was assembled through its public fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        if !(self.min_normal_coherence > 0.0 && self.min_normal_coherence <= 1.0) {
            return Err(ConfigError::InvalidCoherence(self.min_normal_coherence));
        }
        if !(self.plane_degeneracy_ratio >= 0.0 && self.plane_degeneracy_ratio < 1.0) {
            return Err(ConfigError::InvalidDegeneracyRatio(
                self.plane_degeneracy_ratio,
            ));
        }
        if self.max_passes < 2 {
            return Err(ConfigError::InvalidPassLimit(self.max_passes));
        }
        Ok(())
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            tolerance: EPSILON_TOLERANCE,
            min_normal_coherence: MIN_NORMAL_COHERENCE,
            plane_degeneracy_ratio: PLANE_DEGENERACY_RATIO,
            max_passes: MAX_FIT_PASSES,
            weighted_curvature: false,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Raised when tolerance is zero, negative or not finite.
    InvalidTolerance(f64),
    /// Raised when the coherence threshold lies outside `(0, 1]`.
    InvalidCoherence(f64),
    /// Raised when the degeneracy ratio lies outside `[0, 1)`.
    InvalidDegeneracyRatio(f64),
    /// Raised when fewer than two passes are allowed.
    InvalidPassLimit(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive and finite: {value}")
            }
            ConfigError::InvalidCoherence(value) => {
                write!(f, "min_normal_coherence must lie in (0, 1]: {value}")
            }
            ConfigError::InvalidDegeneracyRatio(value) => {
                write!(f, "plane_degeneracy_ratio must lie in [0, 1): {value}")
            }
            ConfigError::InvalidPassLimit(value) => {
                write!(f, "max_passes must be >= 2: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
