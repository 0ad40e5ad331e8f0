//! Slice scheduling tests.
//!
//! Covers decomposition for both planes and storage orders, deterministic
//! write-back, per-slice failure isolation, stabilization through the
//! session, and configuration errors.

use approx::assert_abs_diff_eq;
use elliptic_rs::solver::SolverConfig;
use elliptic_rs::{
    AxisBoundaries, BoundaryCondition, DimensionCombination, EllipticError, EllipticSolver,
    Extents4D, Field, GeneralCoefficients, GridSpacing, RelaxStatus, SeparableCoefficients,
    SequentialExecutor, StabilizationStage,
};

fn solver(combination: DimensionCombination) -> EllipticSolver {
    EllipticSolver::builder()
        .with_dimension(combination)
        .with_config(SolverConfig::default().with_tolerance(1e-10))
        .build()
        .unwrap()
}

fn unit_coefficients(ext: Extents4D, major: bool) -> SeparableCoefficients {
    SeparableCoefficients::new(
        Field::filled("a", ext, major, 1.0),
        Field::filled("c", ext, major, 1.0),
    )
}

/// Forcing that differs between every (t, z) and every x.
fn varied_forcing(ext: Extents4D, major: bool) -> Field {
    Field::from_fn("f", ext, major, |t, z, y, x| {
        1.0 + 0.3 * t as f64 - 0.2 * z as f64 + ((x + 2 * y) as f64 * 0.37).sin()
    })
}

#[cfg(feature = "parallel")]
mod parallel {
    use super::*;
    use elliptic_rs::RayonExecutor;

    fn run(executor: Option<RayonExecutor>) -> Field {
        let ext = Extents4D::new(3, 4, 17, 19);
        let mut s = Field::new("s", ext, false);
        let f = varied_forcing(ext, false);
        let mut coeffs = SeparableCoefficients::new(
            Field::from_fn("a", ext, false, |_, z, _, x| 1.0 + 0.1 * z as f64 + 0.01 * x as f64),
            Field::filled("c", ext, false, 1.5),
        )
        .with_b(Field::filled("b", ext, false, 0.1));
        let builder = EllipticSolver::builder()
            .with_dimension(DimensionCombination::XY)
            .with_boundaries(AxisBoundaries::default().with_x(BoundaryCondition::Periodic));

        let report = match executor {
            Some(pool) => builder
                .with_executor(pool)
                .build()
                .unwrap()
                .solve_separable(&mut s, Some(&f), &mut coeffs, true),
            None => builder
                .build()
                .unwrap()
                .solve_separable(&mut s, Some(&f), &mut coeffs, true),
        }
        .unwrap();
        assert_eq!(report.n_slices(), 12);
        assert!(report.all_succeeded());
        s
    }

    #[test]
    fn test_parallel_matches_sequential_bitwise() {
        let sequential = run(None);
        let parallel = run(Some(RayonExecutor::new(4).unwrap()));
        assert_eq!(sequential.data(), parallel.data());
    }

    #[test]
    fn test_repeated_parallel_runs_are_identical() {
        let pool = RayonExecutor::new(3).unwrap();
        let first = run(Some(pool.clone()));
        let second = run(Some(pool));
        assert_eq!(first.data(), second.data());
    }
}

#[test]
fn test_xy_slices_match_single_plane_solves() {
    for major in [false, true] {
        let ext = Extents4D::new(2, 3, 9, 11);
        let mut s = Field::new("s", ext, major);
        let f = varied_forcing(ext, major);
        let report = solver(DimensionCombination::XY)
            .solve_separable(&mut s, Some(&f), &mut unit_coefficients(ext, major), false)
            .unwrap();
        assert_eq!(report.n_slices(), 6);

        for t in 0..2 {
            for z in 0..3 {
                let plane = Extents4D::plane(9, 11);
                let mut single = Field::new("s", plane, false);
                let f_single = Field::from_fn("f", plane, false, |_, _, y, x| f.get(t, z, y, x));
                solver(DimensionCombination::XY)
                    .solve_separable(
                        &mut single,
                        Some(&f_single),
                        &mut unit_coefficients(plane, false),
                        false,
                    )
                    .unwrap();

                for y in 0..9 {
                    for x in 0..11 {
                        assert_abs_diff_eq!(
                            s.get(t, z, y, x),
                            single.get(0, 0, y, x),
                            epsilon = 1e-13
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_yz_on_time_major_field() {
    // YZ plane: dim1 = y (spacing dy), dim2 = z (spacing dz).
    let (nt, nz, ny, nx) = (2, 7, 10, 3);
    let ext = Extents4D::new(nt, nz, ny, nx);
    let mut s = Field::new("s", ext, true);
    let f = varied_forcing(ext, true);
    let spacing = GridSpacing::new(5.0, 1.0, 2.0);

    let yz = EllipticSolver::builder()
        .with_dimension(DimensionCombination::YZ)
        .with_spacing(spacing)
        .with_config(SolverConfig::default().with_tolerance(1e-10))
        .build()
        .unwrap();
    let report = yz
        .solve_separable(&mut s, Some(&f), &mut unit_coefficients(ext, true), false)
        .unwrap();
    assert_eq!(report.n_slices(), nt * nx);

    // The same plane solved as XY with y → x and z → y.
    let xy = EllipticSolver::builder()
        .with_dimension(DimensionCombination::XY)
        .with_spacing(GridSpacing::new(1.0, 2.0, 1.0))
        .with_config(SolverConfig::default().with_tolerance(1e-10))
        .build()
        .unwrap();
    let plane = Extents4D::plane(nz, ny);
    for t in 0..nt {
        for x in 0..nx {
            let mut single = Field::new("s", plane, false);
            let f_single = Field::from_fn("f", plane, false, |_, _, z, y| f.get(t, z, y, x));
            xy.solve_separable(
                &mut single,
                Some(&f_single),
                &mut unit_coefficients(plane, false),
                false,
            )
            .unwrap();

            for z in 0..nz {
                for y in 0..ny {
                    assert_abs_diff_eq!(s.get(t, z, y, x), single.get(0, 0, z, y), epsilon = 1e-13);
                }
            }
        }
    }
}

#[test]
fn test_expanded_z_edges_copy_interior() {
    let ext = Extents4D::new(1, 6, 8, 2);
    let mut s = Field::from_fn("s", ext, false, |_, _, y, _| y as f64);
    let f = Field::filled("f", ext, false, 0.5);
    let solver = EllipticSolver::builder()
        .with_dimension(DimensionCombination::YZ)
        .with_boundaries(AxisBoundaries::default().with_z(BoundaryCondition::Expanded))
        .build()
        .unwrap();

    solver
        .solve_separable(&mut s, Some(&f), &mut unit_coefficients(ext, false), false)
        .unwrap();

    for x in 0..2 {
        for y in 1..7 {
            assert_eq!(s.get(0, 0, y, x), s.get(0, 1, y, x));
            assert_eq!(s.get(0, 5, y, x), s.get(0, 4, y, x));
        }
        // Fixed y edges are untouched.
        assert_eq!(s.get(0, 3, 0, x), 0.0);
        assert_eq!(s.get(0, 3, 7, x), 7.0);
    }
}

#[test]
fn test_failed_slice_does_not_affect_others() {
    let ext = Extents4D::new(1, 3, 9, 9);
    let initial = Field::from_fn("s", ext, false, |_, _, y, x| 0.01 * (x * y) as f64);
    let mut s = initial.clone();
    let f = Field::filled("f", ext, false, 1.0);
    let mut coeffs = unit_coefficients(ext, false);
    if let (Some(a), Some(c)) = (coeffs.a.as_mut(), coeffs.c.as_mut()) {
        a.set(0, 1, 4, 4, -1.0);
        c.set(0, 1, 4, 4, -1.0);
    }

    let report = solver(DimensionCombination::XY)
        .solve_separable(&mut s, Some(&f), &mut coeffs, false)
        .unwrap();

    let statuses: Vec<_> = report.slices().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![RelaxStatus::Converged, RelaxStatus::Overflowed, RelaxStatus::Converged]
    );
    assert_eq!(report.n_failed(), 1);
    assert_eq!(report.failed().next().map(|r| r.label.as_str()), Some("t=0 z=1"));

    for y in 0..9 {
        for x in 0..9 {
            assert_eq!(s.get(0, 1, y, x), initial.get(0, 1, y, x));
            assert_eq!(s.get(0, 0, y, x), s.get(0, 2, y, x));
        }
    }
    assert!(s.get(0, 0, 4, 4) != initial.get(0, 0, 4, 4));
}

#[test]
fn test_stabilization_rewrites_general_coefficients() {
    let ext = Extents4D::new(2, 1, 8, 8);
    let mut s = Field::new("s", ext, true);
    // A = -1, C = 1 zeroes the stencil diagonal at one point of t = 1.
    let mut a = Field::filled("a", ext, true, 1.0);
    a.set(1, 0, 3, 4, -1.0);
    let c = Field::filled("c", ext, true, 1.0);
    let mut coeffs = GeneralCoefficients::new(a, c).with_g(Field::filled("g", ext, true, -1.0));

    let solver = EllipticSolver::builder()
        .with_dimension(DimensionCombination::XY)
        .with_executor(SequentialExecutor)
        .build()
        .unwrap();
    let report = solver.solve_general(&mut s, &mut coeffs, true).unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.slices()[0].stage, StabilizationStage::None);
    assert_eq!(report.slices()[1].stage, StabilizationStage::PositiveCoefficients);
    assert_eq!(report.n_stabilized(), 1);

    let a = coeffs.a.as_ref().unwrap();
    let c = coeffs.c.as_ref().unwrap();
    assert_abs_diff_eq!(a.get(1, 0, 3, 4), 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(c.get(1, 0, 3, 4), 1.0, epsilon = 1e-15);
    assert!(a.data().iter().all(|&v| v > 0.0));
}

#[test]
fn test_non_finite_stage2_scale_aborts_solve() {
    // A < 0 everywhere leaves stage 1 nothing to spread; with B ≠ 0 the
    // stage-2 scale is the root of a negative number.
    let ext = Extents4D::new(1, 2, 6, 6);
    let initial = Field::filled("s", ext, false, 0.25);
    let mut s = initial.clone();
    let f = Field::filled("f", ext, false, 1.0);
    let mut coeffs = SeparableCoefficients::new(
        Field::filled("a", ext, false, -1.0),
        Field::filled("c", ext, false, 1.0),
    )
    .with_b(Field::filled("b", ext, false, 1.0));

    let err = solver(DimensionCombination::XY)
        .solve_separable(&mut s, Some(&f), &mut coeffs, true)
        .unwrap_err();

    assert!(matches!(err, EllipticError::NonFiniteScale { .. }));
    assert!(!err.is_configuration());
    assert_eq!(s, initial);
}

#[test]
fn test_undefined_points_survive_solve() {
    let ext = Extents4D::new(1, 1, 9, 9);
    let undef = -1.0e30;
    let field = |name: &str, value: f64| Field::filled(name, ext, false, value).with_undefined(undef);

    let mut s = field("s", 0.0);
    s.set(0, 0, 4, 4, undef);
    let mut f = field("f", 1.0);
    f.set(0, 0, 2, 6, undef);
    let mut a = field("a", 1.0);
    a.set(0, 0, 6, 6, undef);
    let mut b = field("b", 0.1);
    b.set(0, 0, 2, 2, undef);
    let mut c = field("c", 1.0);
    c.set(0, 0, 6, 4, undef);
    let mut coeffs = SeparableCoefficients::new(a, c).with_b(b);

    let report = solver(DimensionCombination::XY)
        .solve_separable(&mut s, Some(&f), &mut coeffs, false)
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(s.get(0, 0, 4, 4), undef);
    for (y, x) in [(2, 6), (6, 6), (2, 2), (6, 4)] {
        assert_eq!(s.get(0, 0, y, x), 0.0, "hole at y={y} x={x} was relaxed");
    }
    assert!(s.get(0, 0, 6, 2) < 0.0);
}

#[test]
fn test_mismatched_undefined_sentinel_is_rejected() {
    let ext = Extents4D::new(1, 1, 9, 9);
    let mut s = Field::new("s", ext, false).with_undefined(-1.0e30);
    let mut a = Field::filled("a", ext, false, 1.0);
    a.set(0, 0, 4, 4, a.undefined());
    let mut coeffs = SeparableCoefficients::new(a, Field::filled("c", ext, false, 1.0).with_undefined(-1.0e30));

    let err = solver(DimensionCombination::XY)
        .solve_separable(&mut s, None, &mut coeffs, false)
        .unwrap_err();

    assert!(matches!(err, EllipticError::UndefinedMismatch { field: "A", .. }));
    assert!(err.is_configuration());
    assert!(s.data().iter().all(|&v| v == 0.0));
}

#[test]
fn test_configuration_errors_before_scheduling() {
    let ext = Extents4D::new(1, 1, 5, 5);
    let mut s = Field::filled("s", ext, false, 3.0);
    let solver = solver(DimensionCombination::XY);

    let mut missing = SeparableCoefficients {
        a: Some(Field::filled("a", ext, false, 1.0)),
        ..Default::default()
    };
    assert_eq!(
        solver.solve_separable(&mut s, None, &mut missing, false).unwrap_err(),
        EllipticError::MissingCoefficient("C")
    );

    let wrong_f = Field::new("f", Extents4D::new(1, 1, 5, 6), false);
    let err = solver
        .solve_separable(&mut s, Some(&wrong_f), &mut unit_coefficients(ext, false), false)
        .unwrap_err();
    assert!(matches!(err, EllipticError::ExtentMismatch { field: "F", .. }));
    assert!(err.is_configuration());

    let err = solver
        .solve_separable(&mut s, None, &mut unit_coefficients(ext, true), false)
        .unwrap_err();
    assert_eq!(err, EllipticError::AxisOrderMismatch("A"));

    assert!(s.data().iter().all(|&v| v == 3.0));
}
