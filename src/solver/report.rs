//! Per-solve reporting.
//!
//! Every slice of a solve produces a [`SliceSummary`]; the session gathers
//! them, in slice order, into a [`SolveReport`].
//!
//! # Example
//!
//! ```ignore
//! let report = solver.solve_separable(&mut s, Some(&f), &mut coeffs, true)?;
//! if !report.all_succeeded() {
//!     for slice in report.failed() {
//!         eprintln!("{}", slice.summary_line());
//!     }
//! }
//! report.print_summary();
//! ```

use std::time::Duration;

use crate::field::SliceId;

use super::kernel::RelaxStatus;
use super::stabilization::StabilizationStage;

/// Result of solving one slice.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceSummary {
    /// Which slice
    pub id: SliceId,
    /// Human-readable slice position, in field-origin coordinates
    pub label: String,
    /// Sweeps in the last attempt (1 for direct solves)
    pub iterations: usize,
    /// Terminal state of the last attempt
    pub status: RelaxStatus,
    /// Highest stabilization stage applied
    pub stage: StabilizationStage,
    /// Last convergence speed
    pub final_speed: f64,
    /// Per-sweep convergence speeds of the last attempt, if recorded
    pub history: Vec<f64>,
}

impl SliceSummary {
    /// Whether the slice was left at its initial guess.
    pub fn failed(&self) -> bool {
        !self.status.is_success()
    }

    /// One line for logs and progress output.
    pub fn summary_line(&self) -> String {
        let state = match self.status {
            RelaxStatus::Converged => "converged",
            RelaxStatus::MaxLoopReached => "max loop reached",
            RelaxStatus::Overflowed => "FAILED (overflow)",
        };
        let mut line = format!(
            "[{}] {} after {} sweeps (speed {:.2e})",
            self.label, state, self.iterations, self.final_speed
        );
        if self.stage != StabilizationStage::None {
            line.push_str(&format!(", stabilized: {}", self.stage));
        }
        line
    }
}

/// Outcome of one solve over all slices.
#[derive(Clone, Debug, Default)]
pub struct SolveReport {
    slices: Vec<SliceSummary>,
    elapsed: Duration,
    workers: usize,
}

impl SolveReport {
    /// Gather slice summaries in slice order.
    pub fn new(slices: Vec<SliceSummary>, elapsed: Duration, workers: usize) -> Self {
        Self {
            slices,
            elapsed,
            workers,
        }
    }

    /// All slice summaries in enumeration order.
    pub fn slices(&self) -> &[SliceSummary] {
        &self.slices
    }

    /// Summary of one slice.
    pub fn slice(&self, id: SliceId) -> Option<&SliceSummary> {
        self.slices.iter().find(|s| s.id == id)
    }

    pub fn n_slices(&self) -> usize {
        self.slices.len()
    }

    pub fn n_converged(&self) -> usize {
        self.count_status(RelaxStatus::Converged)
    }

    pub fn n_max_loop(&self) -> usize {
        self.count_status(RelaxStatus::MaxLoopReached)
    }

    pub fn n_failed(&self) -> usize {
        self.count_status(RelaxStatus::Overflowed)
    }

    /// Slices whose coefficients were repaired.
    pub fn n_stabilized(&self) -> usize {
        self.slices
            .iter()
            .filter(|s| s.stage != StabilizationStage::None)
            .count()
    }

    fn count_status(&self, status: RelaxStatus) -> usize {
        self.slices.iter().filter(|s| s.status == status).count()
    }

    /// Slices left at their initial guess.
    pub fn failed(&self) -> impl Iterator<Item = &SliceSummary> {
        self.slices.iter().filter(|s| s.failed())
    }

    pub fn all_succeeded(&self) -> bool {
        self.n_failed() == 0
    }

    /// Sum of sweeps over all slices.
    pub fn total_iterations(&self) -> usize {
        self.slices.iter().map(|s| s.iterations).sum()
    }

    pub fn max_iterations(&self) -> usize {
        self.slices.iter().map(|s| s.iterations).max().unwrap_or(0)
    }

    /// Wall-clock time of the solve.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of workers the slices ran on.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Format the counts as a single line.
    pub fn summary_line(&self) -> String {
        format!(
            "{} slices: {} converged, {} max loop, {} failed, {} stabilized | {} sweeps (max {}) | {:.3} s on {} workers",
            self.n_slices(),
            self.n_converged(),
            self.n_max_loop(),
            self.n_failed(),
            self.n_stabilized(),
            self.total_iterations(),
            self.max_iterations(),
            self.elapsed.as_secs_f64(),
            self.workers
        )
    }

    /// Print the counts and every failed or stabilized slice.
    pub fn print_summary(&self) {
        println!("=== Elliptic Solve Summary ===");
        println!("{}", self.summary_line());
        let notable: Vec<&SliceSummary> = self
            .slices
            .iter()
            .filter(|s| s.failed() || s.stage != StabilizationStage::None)
            .collect();
        if !notable.is_empty() {
            println!();
            println!("Slices needing attention:");
            for s in notable {
                println!("  {}", s.summary_line());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnIndex, TimeIndex};

    fn summary(column: usize, status: RelaxStatus, stage: StabilizationStage, iterations: usize) -> SliceSummary {
        let id = SliceId::meridional(TimeIndex::new(0), ColumnIndex::new(column));
        SliceSummary {
            id,
            label: id.label([0; 4]),
            iterations,
            status,
            stage,
            final_speed: 1e-7,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_counts() {
        let report = SolveReport::new(
            vec![
                summary(0, RelaxStatus::Converged, StabilizationStage::None, 40),
                summary(1, RelaxStatus::MaxLoopReached, StabilizationStage::None, 100),
                summary(2, RelaxStatus::Converged, StabilizationStage::PositiveCoefficients, 55),
                summary(3, RelaxStatus::Overflowed, StabilizationStage::Ellipticity, 3),
            ],
            Duration::from_millis(12),
            2,
        );

        assert_eq!(report.n_slices(), 4);
        assert_eq!(report.n_converged(), 2);
        assert_eq!(report.n_max_loop(), 1);
        assert_eq!(report.n_failed(), 1);
        assert_eq!(report.n_stabilized(), 2);
        assert_eq!(report.total_iterations(), 198);
        assert_eq!(report.max_iterations(), 100);
        assert!(!report.all_succeeded());

        let failed: Vec<_> = report.failed().map(|s| s.id).collect();
        assert_eq!(failed, vec![SliceId::meridional(TimeIndex::new(0), ColumnIndex::new(3))]);
        assert!(report.slice(SliceId::meridional(TimeIndex::new(0), ColumnIndex::new(1))).is_some());
    }

    #[test]
    fn test_summary_line_mentions_stage() {
        let s = summary(4, RelaxStatus::Converged, StabilizationStage::PositiveCoefficients, 12);
        let line = s.summary_line();
        assert!(line.contains("converged"));
        assert!(line.contains("stage 1"));

        let plain = summary(4, RelaxStatus::Converged, StabilizationStage::None, 12).summary_line();
        assert!(!plain.contains("stabilized"));
    }

    #[test]
    fn test_empty_report() {
        let report = SolveReport::default();
        assert!(report.all_succeeded());
        assert_eq!(report.max_iterations(), 0);
    }
}
