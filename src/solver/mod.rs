//! Elliptic solver components.
//!
//! # Submodules
//!
//! - [`kernel`]: SOR relaxation of one slice (flux and general forms)
//! - [`tridiagonal`]: Direct solve for the one-dimensional separable case
//! - [`stabilization`]: Coefficient repair after divergence
//! - [`scheduler`]: Slice decomposition and the [`EllipticSolver`] session
//! - [`executor`]: Sequential and Rayon slice executors
//! - [`report`]: Per-slice and per-solve reporting
//!
//! # Solve flow
//!
//! ```text
//! EllipticSolver ─ extract ─▶ relax ─ overflow? ─▶ StabilizationPolicy ─▶ relax (≤ 2×)
//!        ▲                                                                    │
//!        └──────────── scatter in slice order ◀───────────────────────────────┘
//! ```

pub mod coefficients;
pub mod config;
pub mod executor;
pub mod kernel;
pub mod params;
pub mod report;
pub mod scheduler;
pub mod stabilization;
pub mod tridiagonal;

pub use coefficients::{GeneralCoefficients, RepairedCoefficients, SeparableCoefficients};
pub use config::{
    DEFAULT_MAX_LOOP_COUNT, DEFAULT_OVERFLOW_THRESHOLD, DEFAULT_TOLERANCE, SolverConfig,
};
#[cfg(feature = "parallel")]
pub use executor::RayonExecutor;
pub use executor::{Executor, SequentialExecutor, SliceExecutor};
pub use kernel::{
    GeneralStencil, RelaxOutcome, RelaxStatus, SeparableStencil, Stencil, apply_expanded_edges,
    relax, relax_general, relax_separable, sweep,
};
pub use params::{SliceParams, optimal_relaxation_argument};
pub use report::{SliceSummary, SolveReport};
pub use scheduler::{EllipticSolver, EllipticSolverBuilder, SliceOutcome};
pub use stabilization::{
    StabilizationPolicy, StabilizationStage, Stabilized, modify_coefficients_ac,
    modify_coefficients_d,
};
pub use tridiagonal::{DenseLuSolver, ThomasSolver, TridiagonalSolver, ZeroPivot, solve_lines};
