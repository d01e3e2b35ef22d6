//! # Data Points
//!
//! Neighbor observations consumed by the fitting stages.
//!
//! Any type implementing [`DataPoint`] can be streamed through a pipeline.
//! [`Sample`] is the plain position + normal record used when the caller has
//! no point type of its own.

use std::marker::PhantomData;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A point of the cloud as seen by the fitting stages.
///
/// `DIM` is the dimensionality of the space the data was captured in. Data
/// from a 2D scan lifted into `DVec3` with a zero `z` must declare `DIM = 2`;
/// curvature estimators refuse such types at compile time.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use point_curvature::data::DataPoint;
///
/// struct Surfel {
///     center: [f64; 3],
///     normal: [f64; 3],
/// }
///
/// impl DataPoint for Surfel {
///     const DIM: usize = 3;
///     fn position(&self) -> DVec3 {
///         DVec3::from_array(self.center)
///     }
///     fn normal(&self) -> DVec3 {
///         DVec3::from_array(self.normal)
///     }
/// }
/// ```
///
/// Planar data does not build into a pipeline:
///
/// ```compile_fail
/// use glam::DVec3;
/// use point_curvature::data::DataPoint;
/// use point_curvature::weight::NoWeight;
/// use point_curvature::{NormalCovariance, PipelineBuilder};
///
/// struct Pixel(DVec3);
///
/// impl DataPoint for Pixel {
///     const DIM: usize = 2;
///     fn position(&self) -> DVec3 {
///         self.0
///     }
///     fn normal(&self) -> DVec3 {
///         DVec3::Z
///     }
/// }
///
/// let _ = PipelineBuilder::<Pixel>::default()
///     .stage(NormalCovariance::new(NoWeight))
///     .build();
/// ```
pub trait DataPoint {
    /// Dimensionality of the captured data.
    const DIM: usize;

    /// Position of the point.
    fn position(&self) -> DVec3;

    /// Oriented normal at the point. Need not be normalized.
    fn normal(&self) -> DVec3;
}

/// A neighbor observation: position and oriented normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Position of the sample.
    pub position: DVec3,
    /// Normal at the sample.
    pub normal: DVec3,
}

impl Sample {
    /// Creates a sample.
    pub fn new(position: DVec3, normal: DVec3) -> Self {
        Self { position, normal }
    }

    /// Returns a copy with `f` applied to both the position and the normal,
    /// e.g. a rotation.
    pub fn map(&self, f: impl Fn(DVec3) -> DVec3) -> Self {
        Self {
            position: f(self.position),
            normal: f(self.normal),
        }
    }
}

impl DataPoint for Sample {
    const DIM: usize = 3;

    fn position(&self) -> DVec3 {
        self.position
    }

    fn normal(&self) -> DVec3 {
        self.normal
    }
}

/// Compile-time dimensionality contract.
///
/// Referencing [`Dimension::REQUIRE_3D`] inside generic code makes
/// monomorphization with a non-3D point type fail to compile.
pub(crate) struct Dimension<P>(PhantomData<P>);

impl<P: DataPoint> Dimension<P> {
    pub(crate) const REQUIRE_3D: () = assert!(
        P::DIM == 3,
        "curvature estimation is only defined for 3D point data"
    );
}

/// Position of a sample, or `None` when a coordinate is NaN or infinite.
pub(crate) fn finite_position<P: DataPoint>(point: &P) -> Option<DVec3> {
    let position = point.position();
    position.is_finite().then_some(position)
}

/// Unit normal of a sample, or `None` when the normal is degenerate.
pub(crate) fn unit_normal<P: DataPoint>(point: &P, tolerance: f64) -> Option<DVec3> {
    let normal = point.normal();
    let length = normal.length();
    if length.is_finite() && length > tolerance {
        Some(normal / length)
    } else {
        None
    }
}
