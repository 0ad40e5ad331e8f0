//! Per-solve slice parameters.
//!
//! For a rectangular n1×n2 grid the Jacobi iteration of the 5-point
//! Laplacian has spectral radius ρ = 1 − ε with
//!
//! ε = sin²(π/(2·n1+2)) + sin²(π/(2·n2+2))
//!
//! and the optimal SOR factor is ω = 2 / (1 + √(1−ρ²)) = 2 / (1 + √(ε(2−ε))).

use std::f64::consts::PI;

use crate::types::AxisPair;

/// Theoretical optimal over-relaxation factor for an n1×n2 grid.
///
/// # Example
///
/// ```
/// use elliptic_rs::solver::optimal_relaxation_argument;
///
/// let w = optimal_relaxation_argument(65, 33);
/// assert!(w > 1.0 && w < 2.0);
/// ```
pub fn optimal_relaxation_argument(n1: usize, n2: usize) -> f64 {
    let s1 = (PI / (2 * n1 + 2) as f64).sin();
    let s2 = (PI / (2 * n2 + 2) as f64).sin();
    let eps = s1 * s1 + s2 * s2;
    2.0 / (1.0 + (eps * (2.0 - eps)).sqrt())
}

/// Immutable parameters shared by every slice of one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceParams {
    /// dim1/dim2 counts, spacings and boundary conditions
    pub axes: AxisPair,
    /// Missing-value sentinel
    pub undefined: f64,
    /// Over-relaxation factor
    pub omega: f64,
}

impl SliceParams {
    /// Create parameters with the optimal relaxation factor for the plane.
    pub fn new(axes: AxisPair, undefined: f64) -> Self {
        Self {
            axes,
            undefined,
            omega: optimal_relaxation_argument(axes.dim1.count, axes.dim2.count),
        }
    }

    /// Override the relaxation factor.
    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }

    /// Plane shape as (n2, n1).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.axes.dim2.count, self.axes.dim1.count)
    }

    /// Whether `v` is the missing-value sentinel.
    #[inline]
    pub fn is_undefined(&self, v: f64) -> bool {
        v == self.undefined
    }
}
