//! Iteration controls for the relaxation kernel.

use crate::error::{EllipticError, Result};

/// Default cap on relaxation sweeps per solve.
pub const DEFAULT_MAX_LOOP_COUNT: usize = 5000;

/// Default relative-change tolerance on the mean absolute solution.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default mean absolute value above which a solve counts as diverged.
pub const DEFAULT_OVERFLOW_THRESHOLD: f64 = 1e9;

/// Iteration controls shared by every slice of a solve.
///
/// # Example
///
/// ```
/// use elliptic_rs::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_max_loop_count(2000)
///     .with_tolerance(1e-8);
/// assert!(config.validate().is_ok());
///
/// assert!(SolverConfig::default().with_tolerance(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of sweeps before stopping with `MaxLoopReached`.
    pub max_loop_count: usize,
    /// Relative change of mean |S| below which the solve has converged.
    pub tolerance: f64,
    /// Mean |S| above which the solve has overflowed.
    pub overflow_threshold: f64,
    /// Print one progress line per slice to stdout.
    pub verbose: bool,
    /// Keep the per-sweep convergence speeds in the outcome.
    pub record_history: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_loop_count: DEFAULT_MAX_LOOP_COUNT,
            tolerance: DEFAULT_TOLERANCE,
            overflow_threshold: DEFAULT_OVERFLOW_THRESHOLD,
            verbose: false,
            record_history: false,
        }
    }
}

impl SolverConfig {
    /// Set the sweep cap.
    pub fn with_max_loop_count(mut self, max_loop_count: usize) -> Self {
        self.max_loop_count = max_loop_count;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the divergence threshold.
    pub fn with_overflow_threshold(mut self, overflow_threshold: f64) -> Self {
        self.overflow_threshold = overflow_threshold;
        self
    }

    /// Enable per-slice progress lines.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Record per-sweep convergence speeds.
    pub fn with_history(mut self) -> Self {
        self.record_history = true;
        self
    }

    /// Reject non-positive tolerance, threshold, or loop budget.
    pub fn validate(&self) -> Result<()> {
        if self.max_loop_count < 1 {
            return Err(EllipticError::InvalidMaxLoopCount(self.max_loop_count));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(EllipticError::InvalidTolerance(self.tolerance));
        }
        if !(self.overflow_threshold.is_finite() && self.overflow_threshold > 0.0) {
            return Err(EllipticError::InvalidOverflowThreshold(
                self.overflow_threshold,
            ));
        }
        Ok(())
    }
}
