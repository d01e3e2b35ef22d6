//! # Neighbor Sources
//!
//! Enumerates the neighborhood of a query point. Each call to
//! [`NeighborSource::begin_query`] returns a fresh, independent cursor, so a
//! multi-pass fit can sweep the identical neighborhood again and several
//! estimators can share one source.
//!
//! Iteration order is unspecified; stages must not depend on it.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use point_curvature::data::Sample;
//! use point_curvature::neighbors::{NeighborSource, RangeNeighbors};
//!
//! let points = vec![
//!     Sample::new(DVec3::ZERO, DVec3::Z),
//!     Sample::new(DVec3::new(0.5, 0.0, 0.0), DVec3::Z),
//!     Sample::new(DVec3::new(5.0, 0.0, 0.0), DVec3::Z),
//! ];
//! let source = RangeNeighbors::new(&points, 1.0).unwrap();
//! assert_eq!(source.begin_query(DVec3::ZERO).count(), 2);
//! ```

use glam::DVec3;

use crate::data::DataPoint;
use crate::error::FittingError;

/// Produces the neighbors of a query position.
pub trait NeighborSource<P> {
    /// Cursor over one query's neighbors.
    type Cursor<'a>: Iterator<Item = &'a P>
    where
        Self: 'a,
        P: 'a;

    /// Starts a new traversal of the neighborhood of `eval_pos`.
    fn begin_query(&self, eval_pos: DVec3) -> Self::Cursor<'_>;
}

/// Every point of a slice is a neighbor of every query.
impl<P> NeighborSource<P> for [P] {
    type Cursor<'a> = std::slice::Iter<'a, P>
    where
        Self: 'a,
        P: 'a;

    fn begin_query(&self, _eval_pos: DVec3) -> Self::Cursor<'_> {
        self.iter()
    }
}

/// Points within a fixed radius of the query, found by linear scan.
#[derive(Debug, Clone, Copy)]
pub struct RangeNeighbors<'p, P> {
    points: &'p [P],
    radius: f64,
}

impl<'p, P: DataPoint> RangeNeighbors<'p, P> {
    /// Creates a range source over `points`; the radius is inclusive.
    ///
    /// # Errors
    ///
    /// [`FittingError::InvalidRadius`] unless `radius` is positive and finite.
    pub fn new(points: &'p [P], radius: f64) -> Result<Self, FittingError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(FittingError::InvalidRadius(radius));
        }
        Ok(Self { points, radius })
    }

    /// Query radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl<'p, P: DataPoint> NeighborSource<P> for RangeNeighbors<'p, P> {
    type Cursor<'a> = RangeCursor<'a, P>
    where
        Self: 'a,
        P: 'a;

    fn begin_query(&self, eval_pos: DVec3) -> Self::Cursor<'_> {
        RangeCursor::new(self.points, eval_pos, self.radius)
    }
}

/// Cursor over the points of a slice lying within a radius of a query.
///
/// Besides the [`Iterator`] interface it exposes explicit
/// `has_next`/`current`/`advance` stepping.
#[derive(Debug, Clone)]
pub struct RangeCursor<'a, P> {
    points: &'a [P],
    eval_pos: DVec3,
    squared_radius: f64,
    index: usize,
}

impl<'a, P: DataPoint> RangeCursor<'a, P> {
    fn new(points: &'a [P], eval_pos: DVec3, radius: f64) -> Self {
        let mut cursor = Self {
            points,
            eval_pos,
            squared_radius: radius * radius,
            index: 0,
        };
        cursor.seek();
        cursor
    }

    /// Whether the cursor points at a neighbor.
    pub fn has_next(&self) -> bool {
        self.index < self.points.len()
    }

    /// The neighbor under the cursor.
    pub fn current(&self) -> Option<&'a P> {
        self.points.get(self.index)
    }

    /// Moves to the next neighbor in range.
    pub fn advance(&mut self) {
        if self.has_next() {
            self.index += 1;
            self.seek();
        }
    }

    /// Skips forward to the first in-range point at or after `index`.
    fn seek(&mut self) {
        while let Some(point) = self.points.get(self.index) {
            if point.position().distance_squared(self.eval_pos) <= self.squared_radius {
                break;
            }
            self.index += 1;
        }
    }
}

impl<'a, P: DataPoint> Iterator for RangeCursor<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        let point = self.current()?;
        self.advance();
        Some(point)
    }
}
