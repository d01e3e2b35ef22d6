//! # Error Types
//!
//! Errors raised while assembling a fitting pipeline or its collaborators.
//!
//! ## Error Policy
//!
//! - Data-dependent outcomes (too few samples, degenerate neighborhoods) are
//!   reported through [`FitResult`](crate::fitting::FitResult), never here
//! - Misconfiguration is reported here, before any sample is processed
//! - Misuse of the stage protocol at runtime panics

use config::constants::ConfigError;
use thiserror::Error;

use crate::fitting::Capability;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building a fitting pipeline.
///
/// ## Example
///
/// ```rust
/// use point_curvature::{FittingError, PipelineBuilder, ProjectedNormalCovariance};
/// use point_curvature::data::Sample;
/// use point_curvature::weight::NoWeight;
///
/// let result = PipelineBuilder::<Sample>::default()
///     .stage(ProjectedNormalCovariance::new(NoWeight))
///     .build();
/// assert!(matches!(result, Err(FittingError::MissingCapability { .. })));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FittingError {
    /// The pipeline has no stages.
    #[error("pipeline has no stages")]
    Empty,

    /// A stage requires a capability no earlier stage provides.
    #[error("stage '{stage}' requires {capability} but no earlier stage provides it")]
    MissingCapability {
        /// Name of the stage with the unmet requirement
        stage: &'static str,
        /// The missing capability
        capability: Capability,
    },

    /// Two stages publish the same capability.
    #[error("stage '{stage}' provides {capability}, already provided by '{previous}'")]
    DuplicateCapability {
        /// Name of the second provider
        stage: &'static str,
        /// Name of the first provider
        previous: &'static str,
        /// The capability provided twice
        capability: Capability,
    },

    /// A weight function scale is not a positive finite number.
    #[error("weight scale must be positive and finite: {0}")]
    InvalidScale(f64),

    /// A neighborhood radius is not a positive finite number.
    #[error("neighborhood radius must be positive and finite: {0}")]
    InvalidRadius(f64),

    /// The fit configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// TESTS
// =============================================================================
