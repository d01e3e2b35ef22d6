//! # Linear Algebra
//!
//! Symmetric eigensolvers and weighted covariance accumulators built on
//! `glam` double precision types.
//!
//! ## Eigensolvers
//!
//! [`symmetric_eigen2`] and [`symmetric_eigen3`] hand the matrix to
//! `nalgebra::SymmetricEigen` and convert the result back to `glam`.
//! Eigenvalues come back in ascending order; column `i` of `vectors` is the
//! unit eigenvector of `values[i]`. Ties are ordered arbitrarily.
//!
//! Both return `None` for non-finite input or when the decomposition does not
//! converge within [`MAX_EIGEN_ITERATIONS`].

use glam::{DMat2, DMat3, DVec2, DVec3};
use nalgebra::{Matrix2, Matrix3, SymmetricEigen};

/// Iteration cap handed to `nalgebra::SymmetricEigen::try_new`.
pub const MAX_EIGEN_ITERATIONS: usize = 256;

// =============================================================================
// EIGENDECOMPOSITION
// =============================================================================

/// Eigendecomposition of a symmetric 2x2 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricEigen2 {
    /// Eigenvalues, ascending.
    pub values: DVec2,
    /// Unit eigenvectors stored as columns.
    pub vectors: DMat2,
}

impl SymmetricEigen2 {
    /// Returns the `i`-th eigenpair.
    pub fn pair(&self, i: usize) -> (f64, DVec2) {
        (self.values[i], self.vectors.col(i))
    }
}

/// Eigendecomposition of a symmetric 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricEigen3 {
    /// Eigenvalues, ascending.
    pub values: DVec3,
    /// Unit eigenvectors stored as columns.
    pub vectors: DMat3,
}

impl SymmetricEigen3 {
    /// Returns the `i`-th eigenpair.
    pub fn pair(&self, i: usize) -> (f64, DVec3) {
        (self.values[i], self.vectors.col(i))
    }
}

/// Computes the eigendecomposition of a symmetric 2x2 matrix.
///
/// Only the lower triangle is read; the matrix is assumed symmetric.
///
/// # Example
///
/// ```rust
/// use glam::DMat2;
/// use point_curvature::linalg::symmetric_eigen2;
///
/// let m = DMat2::from_cols_array(&[2.0, 1.0, 1.0, 2.0]);
/// let eig = symmetric_eigen2(&m).unwrap();
/// assert!((eig.values.x - 1.0).abs() < 1e-12);
/// assert!((eig.values.y - 3.0).abs() < 1e-12);
/// ```
pub fn symmetric_eigen2(m: &DMat2) -> Option<SymmetricEigen2> {
    if !m.is_finite() {
        return None;
    }
    let eigen = SymmetricEigen::try_new(
        Matrix2::from_column_slice(&m.to_cols_array()),
        f64::EPSILON,
        MAX_EIGEN_ITERATIONS,
    )?;

    let order = ascending::<2>(eigen.eigenvalues.as_slice());
    let column = |i: usize| {
        let c = eigen.eigenvectors.column(order[i]);
        DVec2::new(c[0], c[1]).normalize_or_zero()
    };

    Some(SymmetricEigen2 {
        values: DVec2::new(eigen.eigenvalues[order[0]], eigen.eigenvalues[order[1]]),
        vectors: DMat2::from_cols(column(0), column(1)),
    })
}

/// Computes the eigendecomposition of a symmetric 3x3 matrix.
///
/// Only the lower triangle is read; the matrix is assumed symmetric.
///
/// # Example
///
/// ```rust
/// use glam::{DMat3, DVec3};
/// use point_curvature::linalg::symmetric_eigen3;
///
/// let m = DMat3::from_diagonal(DVec3::new(3.0, 1.0, 2.0));
/// let eig = symmetric_eigen3(&m).unwrap();
/// assert!((eig.values - DVec3::new(1.0, 2.0, 3.0)).length() < 1e-12);
/// assert!((eig.vectors.col(0).y.abs() - 1.0).abs() < 1e-12);
///
/// assert!(symmetric_eigen3(&DMat3::from_diagonal(DVec3::splat(f64::NAN))).is_none());
/// ```
pub fn symmetric_eigen3(m: &DMat3) -> Option<SymmetricEigen3> {
    if !m.is_finite() {
        return None;
    }
    let eigen = SymmetricEigen::try_new(
        Matrix3::from_column_slice(&m.to_cols_array()),
        f64::EPSILON,
        MAX_EIGEN_ITERATIONS,
    )?;

    let order = ascending::<3>(eigen.eigenvalues.as_slice());
    let column = |i: usize| {
        let c = eigen.eigenvectors.column(order[i]);
        DVec3::new(c[0], c[1], c[2]).normalize_or_zero()
    };

    Some(SymmetricEigen3 {
        values: DVec3::new(
            eigen.eigenvalues[order[0]],
            eigen.eigenvalues[order[1]],
            eigen.eigenvalues[order[2]],
        ),
        vectors: DMat3::from_cols(column(0), column(1), column(2)),
    })
}

/// Indices of `values` in ascending order.
fn ascending<const N: usize>(values: &[f64]) -> [usize; N] {
    let mut order: [usize; N] = std::array::from_fn(|i| i);
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
    order
}

// =============================================================================
// COVARIANCE ACCUMULATORS
// =============================================================================

/// Outer product `v * v^T`.
pub fn outer3(v: DVec3) -> DMat3 {
    DMat3::from_cols(v * v.x, v * v.y, v * v.z)
}

/// Outer product `v * v^T`.
pub fn outer2(v: DVec2) -> DMat2 {
    DMat2::from_cols(v * v.x, v * v.y)
}

/// Running weighted first and second moments of 3D vectors.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use point_curvature::linalg::Covariance3;
///
/// let mut acc = Covariance3::default();
/// acc.add(DVec3::new(1.0, 0.0, 0.0), 1.0);
/// acc.add(DVec3::new(-1.0, 0.0, 0.0), 1.0);
/// assert_eq!(acc.mean(), DVec3::ZERO);
/// assert_eq!(acc.covariance().x_axis.x, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariance3 {
    sum_weights: f64,
    sum: DVec3,
    sum_outer: DMat3,
    count: usize,
}

impl Default for Covariance3 {
    fn default() -> Self {
        Self {
            sum_weights: 0.0,
            sum: DVec3::ZERO,
            sum_outer: DMat3::ZERO,
            count: 0,
        }
    }
}

impl Covariance3 {
    /// Adds `v` with weight `w`.
    pub fn add(&mut self, v: DVec3, w: f64) {
        self.sum_weights += w;
        self.sum += v * w;
        self.sum_outer += outer3(v) * w;
        self.count += 1;
    }

    /// Number of vectors added.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Total weight.
    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }

    /// Weighted mean, zero when nothing was added.
    pub fn mean(&self) -> DVec3 {
        if self.sum_weights > 0.0 {
            self.sum / self.sum_weights
        } else {
            DVec3::ZERO
        }
    }

    /// Weighted covariance about the mean, normalized by the total weight.
    pub fn covariance(&self) -> DMat3 {
        if self.sum_weights > 0.0 {
            let mean = self.mean();
            self.sum_outer * (1.0 / self.sum_weights) - outer3(mean)
        } else {
            DMat3::ZERO
        }
    }
}

/// Running weighted first and second moments of 2D vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariance2 {
    sum_weights: f64,
    sum: DVec2,
    sum_outer: DMat2,
    count: usize,
}

impl Default for Covariance2 {
    fn default() -> Self {
        Self {
            sum_weights: 0.0,
            sum: DVec2::ZERO,
            sum_outer: DMat2::ZERO,
            count: 0,
        }
    }
}

impl Covariance2 {
    /// Adds `v` with weight `w`.
    pub fn add(&mut self, v: DVec2, w: f64) {
        self.sum_weights += w;
        self.sum += v * w;
        self.sum_outer += outer2(v) * w;
        self.count += 1;
    }

    /// Number of vectors added.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Total weight.
    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }

    /// Weighted mean, zero when nothing was added.
    pub fn mean(&self) -> DVec2 {
        if self.sum_weights > 0.0 {
            self.sum / self.sum_weights
        } else {
            DVec2::ZERO
        }
    }

    /// Weighted covariance about the mean, normalized by the total weight.
    pub fn covariance(&self) -> DMat2 {
        if self.sum_weights > 0.0 {
            let mean = self.mean();
            self.sum_outer * (1.0 / self.sum_weights) - outer2(mean)
        } else {
            DMat2::ZERO
        }
    }
}

#[cfg(test)]
mod tests;
