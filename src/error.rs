//! Error types for elliptic solves.

use thiserror::Error;

use crate::types::BoundaryCondition;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EllipticError>;

/// Errors that can occur while configuring or running an elliptic solve.
///
/// Configuration variants are raised before any slice is scheduled.
/// Per-slice divergence is not an error: it is recorded in the
/// [`SolveReport`](crate::solver::SolveReport) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EllipticError {
    /// No dimension combination was chosen before solving.
    #[error("Dimension combination not set before solve")]
    MissingDimension,

    /// A required coefficient field was not assigned.
    #[error("Coefficient {0} not assigned before solve")]
    MissingCoefficient(&'static str),

    /// Boundary condition not supported for the requested solve path.
    #[error("Boundary condition {bc} is not supported for {context}")]
    UnsupportedBoundary {
        bc: BoundaryCondition,
        context: &'static str,
    },

    /// Convergence tolerance must be positive and finite.
    #[error("Tolerance must be positive, got {0}")]
    InvalidTolerance(f64),

    /// Loop budget must allow at least one sweep.
    #[error("Max loop count must be at least 1, got {0}")]
    InvalidMaxLoopCount(usize),

    /// Overflow threshold must be positive and finite.
    #[error("Overflow threshold must be positive, got {0}")]
    InvalidOverflowThreshold(f64),

    /// Grid spacing along an axis is not a positive finite number.
    #[error("Grid spacing along {axis} must be positive, got {value}")]
    InvalidSpacing { axis: &'static str, value: f64 },

    /// Fields participating in one solve have different extents.
    #[error("Extent mismatch for field {field}: expected {expected}, got {actual}")]
    ExtentMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Fields participating in one solve use different storage orders.
    #[error("Field {0} uses a different axis order than S")]
    AxisOrderMismatch(&'static str),

    /// Fields participating in one solve mark missing values differently.
    #[error("Field {field} uses undefined sentinel {actual}, S uses {expected}")]
    UndefinedMismatch {
        field: &'static str,
        expected: f64,
        actual: f64,
    },

    /// The solve plane is too small to hold an interior point.
    #[error("Solve plane {n1}×{n2} is too small (need at least 3×3)")]
    GridTooSmall { n1: usize, n2: usize },

    /// Thread pool size must be positive.
    #[error("Worker count must be at least 1, got {0}")]
    InvalidThreadCount(usize),

    /// Stage-2 stabilization produced a non-finite rescale factor.
    #[error("Non-finite stabilization scale {scale} at (j={j}, i={i}) in slice {slice}")]
    NonFiniteScale {
        slice: String,
        j: usize,
        i: usize,
        scale: f64,
    },

    /// Zero pivot in the direct tridiagonal solve.
    #[error("Singular tridiagonal system at row {row} in slice {slice}")]
    SingularSystem { slice: String, row: usize },

    /// Worker pool could not be created.
    #[error("Executor error: {0}")]
    Executor(String),
}

impl EllipticError {
    /// Create an extent mismatch error.
    pub fn extent_mismatch(
        field: &'static str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::ExtentMismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Whether this error is a configuration error raised before scheduling.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::NonFiniteScale { .. } | Self::SingularSystem { .. } | Self::Executor(_)
        )
    }
}
