//! # elliptic-rs
//!
//! Slice-parallel relaxation solvers for two-dimensional elliptic equations
//! on four-dimensional (time, level, y, x) gridded fields.
//!
//! This crate provides:
//! - 4D field storage with missing-value sentinels and slice extraction
//! - Successive over-relaxation for the flux form
//!   ∂1(A·∂1S) + ∂2(B·∂1S) + ∂1(B·∂2S) + ∂2(C·∂2S) = F
//!   and the general form A·S11 + B·S12 + C·S22 + D·S1 + E·S2 + F·S + G = 0
//! - Fixed, periodic and expanded (zero-gradient) boundaries per axis
//! - Automatic coefficient repair when a slice diverges
//! - A direct tridiagonal path for one-dimensional separable problems
//! - Deterministic slice scheduling, sequential or on a Rayon pool
//!
//! # Example
//!
//! ```
//! use elliptic_rs::{
//!     DimensionCombination, EllipticSolver, Extents4D, Field, GeneralCoefficients,
//! };
//!
//! // Laplacian(S) = 2 on a 7×7 plane with S = 0 on the boundary.
//! let ext = Extents4D::plane(7, 7);
//! let mut s = Field::new("s", ext, false);
//! let mut coeffs = GeneralCoefficients::new(
//!     Field::filled("a", ext, false, 1.0),
//!     Field::filled("c", ext, false, 1.0),
//! )
//! .with_g(Field::filled("g", ext, false, -2.0));
//!
//! let solver = EllipticSolver::builder()
//!     .with_dimension(DimensionCombination::XY)
//!     .build()?;
//! let report = solver.solve_general(&mut s, &mut coeffs, false)?;
//!
//! assert!(report.all_succeeded());
//! assert!(s.get(0, 0, 3, 3) < 0.0);
//! # Ok::<(), elliptic_rs::EllipticError>(())
//! ```

pub mod error;
pub mod field;
pub mod solver;
pub mod types;

pub use error::{EllipticError, Result};
pub use field::{DEFAULT_UNDEFINED, Field, SliceBuffer, SliceId};
#[cfg(feature = "parallel")]
pub use solver::RayonExecutor;
pub use solver::{
    DenseLuSolver, EllipticSolver, EllipticSolverBuilder, Executor, GeneralCoefficients,
    RelaxStatus, SeparableCoefficients, SequentialExecutor, SliceExecutor, SolveReport,
    SolverConfig, StabilizationStage, ThomasSolver, TridiagonalSolver,
};
pub use types::{
    AxisBoundaries, BoundaryCondition, DimensionCombination, Extents4D, GridSpacing,
};
