//! # Config Crate
//!
//! Centralized configuration constants for point-cloud curvature fitting.
//! All tolerances, sample thresholds and stability criteria are defined here
//! so the fitting library never carries literal magic numbers.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{FitConfig, EPSILON_TOLERANCE, MIN_COVARIANCE_3D_SAMPLES};
//!
//! // Eigenvalues at or below the tolerance are treated as zero curvature
//! let eigenvalue: f64 = 1e-12;
//! assert!(eigenvalue <= EPSILON_TOLERANCE);
//!
//! // A 3x3 covariance needs three accepted samples
//! let accepted = 2;
//! assert!(accepted < MIN_COVARIANCE_3D_SAMPLES);
//!
//! let cfg = FitConfig::default();
//! assert!(!cfg.weighted_curvature);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Validated Snapshots**: `FitConfig::new` rejects out-of-range values
//! - **Dependency Free**: Pure constants, usable from any crate

pub mod constants;

#[cfg(test)]
mod tests;
