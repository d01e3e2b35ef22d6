//! # Point Curvature
//!
//! Principal curvature estimation at query points of an unorganized point
//! cloud, from the covariance of neighbor normals.
//!
//! ## Architecture
//!
//! ```text
//! NeighborSource ──▶ FittingPipeline ──▶ FitContext ──▶ CurvatureResult
//!                    │
//!                    ├─ CovariancePlaneFit / MeanPlaneFit   (provides Plane)
//!                    ├─ NormalCovariance                    (provides PrincipalCurvatures)
//!                    └─ ProjectedNormalCovariance           (requires Plane)
//! ```
//!
//! Every stage follows the same protocol: `init(eval_pos)`, then
//! `add_neighbor` once per neighbor, then `finalize`. A stage answering
//! `NeedOtherPass` wants the neighborhood again; the pipeline repeats the
//! cycle until every stage reaches a terminal [`FitResult`].
//!
//! ## Example
//!
//! ```rust
//! use config::constants::FitConfig;
//! use glam::DVec3;
//! use point_curvature::data::Sample;
//! use point_curvature::neighbors::RangeNeighbors;
//! use point_curvature::weight::{DistanceWeight, WeightKernel};
//! use point_curvature::{FitResult, FittingPipeline};
//!
//! // Patch of a sphere of radius 2 around its north pole
//! let mut samples = Vec::new();
//! for i in -3..=3 {
//!     for j in -3..=3 {
//!         let n = DVec3::new(i as f64 * 0.05, j as f64 * 0.05, 1.0).normalize();
//!         samples.push(Sample::new(n * 2.0, n));
//!     }
//! }
//!
//! let weight = DistanceWeight::new(0.5, WeightKernel::Smooth).unwrap();
//! let mut pipeline = FittingPipeline::normal_covariance(weight, FitConfig::default()).unwrap();
//! let source = RangeNeighbors::new(&samples, 0.5).unwrap();
//!
//! assert_eq!(pipeline.compute(&source, DVec3::new(0.0, 0.0, 2.0)), FitResult::Stable);
//! let curvature = pipeline.curvature().unwrap();
//! assert!(curvature.k1() > 0.0 && curvature.k2() > 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`linalg`]: symmetric eigensolvers and covariance accumulators
//! - [`data`]: the [`data::DataPoint`] trait and [`data::Sample`]
//! - [`weight`]: weight functions
//! - [`neighbors`]: neighbor sources
//! - [`fitting`]: the stage protocol and shared context
//! - [`plane`]: plane-fitting stages
//! - [`curvature`]: curvature estimators
//! - [`pipeline`]: composition and multi-pass driving

pub mod curvature;
pub mod data;
pub mod error;
pub mod fitting;
pub mod linalg;
pub mod neighbors;
pub mod pipeline;
pub mod plane;
pub mod weight;

pub use curvature::{CurvatureResult, NormalCovariance, ProjectedNormalCovariance, TangentFrame};
pub use error::FittingError;
pub use fitting::{Capability, FitContext, FitResult, FittingStage};
pub use pipeline::{FittingPipeline, PipelineBuilder, PipelineState};
