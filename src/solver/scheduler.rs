//! Slice decomposition and scheduling.
//!
//! An [`EllipticSolver`] splits a 4D problem into independent 2D slices:
//! one per (time, level) for [`DimensionCombination::XY`] and one per
//! (time, x) for [`DimensionCombination::YZ`]. Each slice is extracted into
//! fresh buffers, solved on the executor, and written back in enumeration
//! order, so the output does not depend on which worker finished first.
//!
//! # Example
//!
//! ```
//! use elliptic_rs::field::Field;
//! use elliptic_rs::solver::{EllipticSolver, SeparableCoefficients};
//! use elliptic_rs::types::{DimensionCombination, Extents4D};
//!
//! let ext = Extents4D::new(1, 2, 9, 9);
//! let mut s = Field::new("s", ext, false);
//! let f = Field::filled("f", ext, false, 1.0);
//! let mut coeffs = SeparableCoefficients::new(
//!     Field::filled("a", ext, false, 1.0),
//!     Field::filled("c", ext, false, 1.0),
//! );
//!
//! let solver = EllipticSolver::builder()
//!     .with_dimension(DimensionCombination::XY)
//!     .build()
//!     .unwrap();
//! let report = solver.solve_separable(&mut s, Some(&f), &mut coeffs, true).unwrap();
//!
//! assert_eq!(report.n_slices(), 2);
//! assert!(report.all_succeeded());
//! ```

use std::time::Instant;

use crate::error::{EllipticError, Result};
use crate::field::{Field, SliceBuffer, SliceId};
use crate::types::{AxisBoundaries, AxisPair, BoundaryCondition, DimensionCombination, GridSpacing};

use super::coefficients::{GeneralCoefficients, RepairedCoefficients, SeparableCoefficients};
use super::config::SolverConfig;
use super::executor::{Executor, SliceExecutor};
use super::kernel::{GeneralStencil, RelaxOutcome, RelaxStatus, relax_general, relax_separable};
use super::params::SliceParams;
use super::report::{SliceSummary, SolveReport};
use super::stabilization::{ScaleFailure, StabilizationPolicy, StabilizationStage};
use super::tridiagonal::{ThomasSolver, TridiagonalSolver, solve_lines};

/// Result of one slice task, returned by value to the scheduler.
#[derive(Clone, Debug)]
pub struct SliceOutcome {
    pub id: SliceId,
    /// Solved slice, or the initial guess when the slice failed
    pub solution: SliceBuffer,
    pub iterations: usize,
    pub status: RelaxStatus,
    pub stage: StabilizationStage,
    pub final_speed: f64,
    pub history: Vec<f64>,
    /// A and C as rewritten by stabilization
    pub repaired: Option<RepairedCoefficients>,
}

impl SliceOutcome {
    fn summary(&self, origin: [usize; 4]) -> SliceSummary {
        SliceSummary {
            id: self.id,
            label: self.id.label(origin),
            iterations: self.iterations,
            status: self.status,
            stage: self.stage,
            final_speed: self.final_speed,
            history: self.history.clone(),
        }
    }
}

/// Immutable state shared by every task of one solve.
#[derive(Clone, Copy)]
struct SliceContext<'a> {
    params: SliceParams,
    config: &'a SolverConfig,
    origin: [usize; 4],
    modify: bool,
}

impl SliceContext<'_> {
    fn scale_error(&self, id: SliceId, e: ScaleFailure) -> EllipticError {
        EllipticError::NonFiniteScale {
            slice: id.label(self.origin),
            j: e.j,
            i: e.i,
            scale: e.scale,
        }
    }

    /// Package a finished relaxation, restoring the initial guess on failure.
    fn finish(
        &self,
        id: SliceId,
        initial: SliceBuffer,
        solved: SliceBuffer,
        outcome: RelaxOutcome,
        stage: StabilizationStage,
        repaired: Option<RepairedCoefficients>,
    ) -> SliceOutcome {
        let label = id.label(self.origin);
        let solution = if outcome.overflowed() {
            match stage {
                StabilizationStage::None => {
                    log::warn!("slice {}: overflow; keeping initial guess", label)
                }
                _ => log::warn!(
                    "slice {}: overflow persists after {}; keeping initial guess",
                    label,
                    stage
                ),
            }
            initial
        } else {
            if stage != StabilizationStage::None {
                log::warn!("slice {}: recovered after {}", label, stage);
            }
            solved
        };
        log::debug!(
            "slice {}: {:?} after {} sweeps (speed {:.3e})",
            label,
            outcome.status,
            outcome.iterations,
            outcome.final_speed
        );

        SliceOutcome {
            id,
            solution,
            iterations: outcome.iterations,
            status: outcome.status,
            stage,
            final_speed: outcome.final_speed,
            history: outcome.history,
            repaired,
        }
    }
}

/// Optional terms of the general form for one slice.
struct LowerTerms {
    b: Option<SliceBuffer>,
    d: Option<SliceBuffer>,
    e: Option<SliceBuffer>,
    f: Option<SliceBuffer>,
    g: Option<SliceBuffer>,
}

impl LowerTerms {
    fn stencil<'s>(&'s self, a: &'s SliceBuffer, c: &'s SliceBuffer) -> GeneralStencil<'s> {
        GeneralStencil {
            a,
            b: self.b.as_ref(),
            c,
            d: self.d.as_ref(),
            e: self.e.as_ref(),
            f: self.f.as_ref(),
            g: self.g.as_ref(),
        }
    }
}

#[inline]
fn extract_opt(field: Option<&Field>, id: SliceId) -> Option<SliceBuffer> {
    field.map(|f| f.extract(id))
}

/// Session holding everything a solve needs besides the fields.
///
/// Built with [`EllipticSolver::builder`].
pub struct EllipticSolver<E: SliceExecutor = Executor> {
    combination: DimensionCombination,
    spacing: GridSpacing,
    boundaries: AxisBoundaries,
    config: SolverConfig,
    executor: E,
    tridiagonal: Box<dyn TridiagonalSolver>,
}

impl EllipticSolver<Executor> {
    /// Start configuring a solver.
    pub fn builder() -> EllipticSolverBuilder<Executor> {
        EllipticSolverBuilder::new()
    }
}

impl<E: SliceExecutor> EllipticSolver<E> {
    pub fn combination(&self) -> DimensionCombination {
        self.combination
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn boundaries(&self) -> AxisBoundaries {
        self.boundaries
    }

    pub fn spacing(&self) -> GridSpacing {
        self.spacing
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Resolve the plane axes for `s` and check the plane is large enough.
    fn slice_params(&self, s: &Field, min_n2: usize) -> Result<SliceParams> {
        let axes = AxisPair::resolve(self.combination, s.extents(), self.spacing, self.boundaries);
        let (n1, n2) = (axes.dim1.count, axes.dim2.count);
        if n1 < 3 || n2 < min_n2 {
            return Err(EllipticError::GridTooSmall { n1, n2 });
        }
        Ok(SliceParams::new(axes, s.undefined()))
    }

    /// Scatter outcomes in slice order and build the report.
    fn scatter_outcomes<W>(
        &self,
        s: &mut Field,
        outcomes: Vec<SliceOutcome>,
        started: Instant,
        mut write_back: W,
    ) -> SolveReport
    where
        W: FnMut(SliceId, &RepairedCoefficients),
    {
        let origin = s.origin();
        let mut summaries = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            s.scatter(outcome.id, &outcome.solution);
            if let Some(repaired) = &outcome.repaired {
                write_back(outcome.id, repaired);
            }
            let summary = outcome.summary(origin);
            if self.config.verbose {
                println!("  {}", summary.summary_line());
            }
            summaries.push(summary);
        }

        let report = SolveReport::new(summaries, started.elapsed(), self.executor.workers());
        log::debug!("{}: {}", s.name(), report.summary_line());
        if !report.all_succeeded() {
            log::warn!("{}: {} of {} slices failed", s.name(), report.n_failed(), report.n_slices());
        }
        report
    }

    /// Solve ∂1(A·∂1S) + ∂2(B·∂1S) + ∂1(B·∂2S) + ∂2(C·∂2S) = F.
    ///
    /// `s` holds the initial guess and boundary values on entry and the
    /// solution on return. With `modify` set, overflowing slices are
    /// stabilized and the repaired A and C are written back into `coeffs`.
    /// A slice that still overflows keeps its initial guess and is
    /// reported as failed; the other slices are unaffected.
    pub fn solve_separable(
        &self,
        s: &mut Field,
        f: Option<&Field>,
        coeffs: &mut SeparableCoefficients,
        modify: bool,
    ) -> Result<SolveReport> {
        coeffs.check_against(s)?;
        if let Some(f) = f {
            s.check_compatible("F", f)?;
        }
        let params = self.slice_params(s, 3)?;
        let (a_field, c_field) = coeffs.required()?;
        let b_field = coeffs.b.as_ref();

        let ctx = SliceContext {
            params,
            config: &self.config,
            origin: s.origin(),
            modify,
        };
        let ids = SliceId::enumerate(self.combination, s.extents());
        log::debug!(
            "{}: separable solve over {} {} slices ({})",
            s.name(),
            ids.len(),
            self.combination,
            self.boundaries
        );

        let started = Instant::now();
        let s_in: &Field = s;
        let outcomes = self.executor.map_ordered(ids, |id| -> Result<SliceOutcome> {
            let initial = s_in.extract(id);
            let f = extract_opt(f, id);
            let mut a = a_field.extract(id);
            let b = extract_opt(b_field, id);
            let mut c = c_field.extract(id);
            let (params, config) = (&ctx.params, ctx.config);

            let mut solved = initial.clone();
            let first = relax_separable(&mut solved, f.as_ref(), &a, b.as_ref(), &c, params, config);
            if !(ctx.modify && first.overflowed()) {
                return Ok(ctx.finish(id, initial, solved, first, StabilizationStage::None, None));
            }

            log::warn!("slice {}: overflow, stabilizing coefficients", id.label(ctx.origin));
            let result = StabilizationPolicy::separable(params.undefined)
                .run(first, &mut a, b.as_ref(), &mut c, |a, c| {
                    solved = initial.clone();
                    relax_separable(&mut solved, f.as_ref(), a, b.as_ref(), c, params, config)
                })
                .map_err(|e| ctx.scale_error(id, e))?;

            let repaired = RepairedCoefficients { a, c };
            Ok(ctx.finish(id, initial, solved, result.outcome, result.stage, Some(repaired)))
        });
        let outcomes = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

        Ok(self.scatter_outcomes(s, outcomes, started, |id, r| coeffs.write_back(id, r)))
    }

    /// Solve A·S11 + B·S12 + C·S22 + D·S1 + E·S2 + F·S + G = 0.
    ///
    /// Same slice handling as [`solve_separable`](Self::solve_separable);
    /// stabilization weighs B by ½ in the discriminant.
    pub fn solve_general(
        &self,
        s: &mut Field,
        coeffs: &mut GeneralCoefficients,
        modify: bool,
    ) -> Result<SolveReport> {
        coeffs.check_against(s)?;
        let params = self.slice_params(s, 3)?;
        let (a_field, c_field) = coeffs.required()?;
        let [b_field, d_field, e_field, f_field, g_field] = [
            coeffs.b.as_ref(),
            coeffs.d.as_ref(),
            coeffs.e.as_ref(),
            coeffs.f.as_ref(),
            coeffs.g.as_ref(),
        ];

        let ctx = SliceContext {
            params,
            config: &self.config,
            origin: s.origin(),
            modify,
        };
        let ids = SliceId::enumerate(self.combination, s.extents());
        log::debug!(
            "{}: general solve over {} {} slices ({})",
            s.name(),
            ids.len(),
            self.combination,
            self.boundaries
        );

        let started = Instant::now();
        let s_in: &Field = s;
        let outcomes = self.executor.map_ordered(ids, |id| -> Result<SliceOutcome> {
            let initial = s_in.extract(id);
            let mut a = a_field.extract(id);
            let mut c = c_field.extract(id);
            let terms = LowerTerms {
                b: extract_opt(b_field, id),
                d: extract_opt(d_field, id),
                e: extract_opt(e_field, id),
                f: extract_opt(f_field, id),
                g: extract_opt(g_field, id),
            };
            let (params, config) = (&ctx.params, ctx.config);

            let mut solved = initial.clone();
            let first = relax_general(&mut solved, &terms.stencil(&a, &c), params, config);
            if !(ctx.modify && first.overflowed()) {
                return Ok(ctx.finish(id, initial, solved, first, StabilizationStage::None, None));
            }

            log::warn!("slice {}: overflow, stabilizing coefficients", id.label(ctx.origin));
            let result = StabilizationPolicy::general(params.undefined)
                .run(first, &mut a, terms.b.as_ref(), &mut c, |a, c| {
                    solved = initial.clone();
                    relax_general(&mut solved, &terms.stencil(a, c), params, config)
                })
                .map_err(|e| ctx.scale_error(id, e))?;

            let repaired = RepairedCoefficients { a, c };
            Ok(ctx.finish(id, initial, solved, result.outcome, result.stage, Some(repaired)))
        });
        let outcomes = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

        Ok(self.scatter_outcomes(s, outcomes, started, |id, r| coeffs.write_back(id, r)))
    }

    /// Solve d/d1(A·dS/d1) = F directly, one tridiagonal system per dim2 line.
    ///
    /// The dim1 boundary must be `Fixed`; its end values are held. Lines
    /// containing undefined values are skipped.
    pub fn solve_tridiagonal(
        &self,
        s: &mut Field,
        f: Option<&Field>,
        a: &Field,
    ) -> Result<SolveReport> {
        s.check_compatible("A", a)?;
        if let Some(f) = f {
            s.check_compatible("F", f)?;
        }
        let params = self.slice_params(s, 1)?;
        let bc = params.axes.dim1.bc;
        if bc != BoundaryCondition::Fixed {
            return Err(EllipticError::UnsupportedBoundary {
                bc,
                context: "the tridiagonal solve",
            });
        }

        let origin = s.origin();
        let ids = SliceId::enumerate(self.combination, s.extents());
        log::debug!("{}: tridiagonal solve over {} slices", s.name(), ids.len());

        let started = Instant::now();
        let s_in: &Field = s;
        let solver = self.tridiagonal.as_ref();
        let outcomes = self.executor.map_ordered(ids, |id| -> Result<SliceOutcome> {
            let mut solved = s_in.extract(id);
            let f = extract_opt(f, id);
            let a = a.extract(id);

            let lines = solve_lines(&mut solved, f.as_ref(), &a, &params, solver).map_err(|e| {
                EllipticError::SingularSystem {
                    slice: format!("{} line {}", id.label(origin), e.line),
                    row: e.row,
                }
            })?;
            log::debug!("slice {}: {} lines solved directly", id.label(origin), lines);

            Ok(SliceOutcome {
                id,
                solution: solved,
                iterations: 1,
                status: RelaxStatus::Converged,
                stage: StabilizationStage::None,
                final_speed: 0.0,
                history: Vec::new(),
                repaired: None,
            })
        });
        let outcomes = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

        Ok(self.scatter_outcomes(s, outcomes, started, |_, _| {}))
    }
}

/// Builder for [`EllipticSolver`].
///
/// The dimension combination is required; everything else has defaults:
/// unit spacing, `Fixed` boundaries, [`SolverConfig::default`], sequential
/// execution and the Thomas algorithm.
pub struct EllipticSolverBuilder<E: SliceExecutor = Executor> {
    combination: Option<DimensionCombination>,
    spacing: GridSpacing,
    boundaries: AxisBoundaries,
    config: SolverConfig,
    executor: E,
    tridiagonal: Box<dyn TridiagonalSolver>,
}

impl EllipticSolverBuilder<Executor> {
    pub fn new() -> Self {
        Self {
            combination: None,
            spacing: GridSpacing::default(),
            boundaries: AxisBoundaries::default(),
            config: SolverConfig::default(),
            executor: Executor::default(),
            tridiagonal: Box::new(ThomasSolver),
        }
    }
}

impl Default for EllipticSolverBuilder<Executor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SliceExecutor> EllipticSolverBuilder<E> {
    /// Select the solve plane.
    pub fn with_dimension(mut self, combination: DimensionCombination) -> Self {
        self.combination = Some(combination);
        self
    }

    pub fn with_spacing(mut self, spacing: GridSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_boundaries(mut self, boundaries: AxisBoundaries) -> Self {
        self.boundaries = boundaries;
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Run slices on another executor.
    pub fn with_executor<E2: SliceExecutor>(self, executor: E2) -> EllipticSolverBuilder<E2> {
        EllipticSolverBuilder {
            combination: self.combination,
            spacing: self.spacing,
            boundaries: self.boundaries,
            config: self.config,
            executor,
            tridiagonal: self.tridiagonal,
        }
    }

    /// Use another solver for [`EllipticSolver::solve_tridiagonal`].
    pub fn with_tridiagonal_solver<T: TridiagonalSolver + 'static>(mut self, solver: T) -> Self {
        self.tridiagonal = Box::new(solver);
        self
    }

    /// Validate the settings and create the session.
    pub fn build(self) -> Result<EllipticSolver<E>> {
        let combination = self.combination.ok_or(EllipticError::MissingDimension)?;
        self.config.validate()?;
        self.spacing.validate()?;

        Ok(EllipticSolver {
            combination,
            spacing: self.spacing,
            boundaries: self.boundaries,
            config: self.config,
            executor: self.executor,
            tridiagonal: self.tridiagonal,
        })
    }
}
