//! Accuracy tests for the relaxation solvers.
//!
//! Checks converged slices against exact discrete solutions: a dense LU
//! reference for the 7×7 Poisson problem, closed forms for periodic and
//! polynomial cases, and the direct tridiagonal path for 1D problems.

use approx::assert_abs_diff_eq;
use elliptic_rs::solver::SolverConfig;
use elliptic_rs::{
    AxisBoundaries, BoundaryCondition, DenseLuSolver, DimensionCombination, EllipticSolver,
    Extents4D, Field, GeneralCoefficients, GridSpacing, RelaxStatus, SeparableCoefficients,
};
use faer::{Mat, linalg::solvers::Solve};
use std::f64::consts::PI;

fn tight() -> SolverConfig {
    SolverConfig::default().with_tolerance(1e-12)
}

fn xy_solver(boundaries: AxisBoundaries, config: SolverConfig) -> EllipticSolver {
    EllipticSolver::builder()
        .with_dimension(DimensionCombination::XY)
        .with_boundaries(boundaries)
        .with_config(config)
        .build()
        .unwrap()
}

/// Interior solution of the 5-point Laplacian = `rhs` with zero Dirichlet
/// boundary on an n×n grid (unit spacing), via dense LU.
fn dense_poisson_reference(n: usize, rhs: f64) -> Vec<f64> {
    let m = n - 2;
    let idx = |j: usize, i: usize| (j - 1) * m + (i - 1);

    let mut a = Mat::zeros(m * m, m * m);
    let mut b = Mat::zeros(m * m, 1);
    for j in 1..n - 1 {
        for i in 1..n - 1 {
            let row = idx(j, i);
            a[(row, row)] = -4.0;
            for (jj, ii) in [(j - 1, i), (j + 1, i), (j, i - 1), (j, i + 1)] {
                if jj >= 1 && jj < n - 1 && ii >= 1 && ii < n - 1 {
                    a[(row, idx(jj, ii))] = 1.0;
                }
            }
            b[(row, 0)] = rhs;
        }
    }

    let lu = a.as_ref().full_piv_lu();
    let x = lu.solve(&b);
    (0..m * m).map(|k| x[(k, 0)]).collect()
}

#[test]
fn test_poisson_7x7_general_form_matches_dense_reference() {
    // Laplacian(S) = 2 written as A·S11 + C·S22 + G = 0 with G = -2.
    let n = 7;
    let ext = Extents4D::plane(n, n);
    let mut s = Field::new("s", ext, false);
    let mut coeffs = GeneralCoefficients::new(
        Field::filled("a", ext, false, 1.0),
        Field::filled("c", ext, false, 1.0),
    )
    .with_g(Field::filled("g", ext, false, -2.0));

    let report = xy_solver(AxisBoundaries::default(), tight())
        .solve_general(&mut s, &mut coeffs, false)
        .unwrap();

    assert_eq!(report.slices()[0].status, RelaxStatus::Converged);
    let reference = dense_poisson_reference(n, 2.0);
    for j in 1..n - 1 {
        for i in 1..n - 1 {
            assert_abs_diff_eq!(
                s.get(0, 0, j, i),
                reference[(j - 1) * (n - 2) + (i - 1)],
                epsilon = 1e-6
            );
        }
    }
    for k in 0..n {
        assert_eq!(s.get(0, 0, 0, k), 0.0);
        assert_eq!(s.get(0, 0, n - 1, k), 0.0);
        assert_eq!(s.get(0, 0, k, 0), 0.0);
        assert_eq!(s.get(0, 0, k, n - 1), 0.0);
    }
}

#[test]
fn test_poisson_7x7_separable_form_matches_dense_reference() {
    let n = 7;
    let ext = Extents4D::plane(n, n);
    let mut s = Field::new("s", ext, false);
    let f = Field::filled("f", ext, false, 2.0);
    let mut coeffs = SeparableCoefficients::new(
        Field::filled("a", ext, false, 1.0),
        Field::filled("c", ext, false, 1.0),
    );

    xy_solver(AxisBoundaries::default(), tight())
        .solve_separable(&mut s, Some(&f), &mut coeffs, false)
        .unwrap();

    let reference = dense_poisson_reference(n, 2.0);
    for j in 1..n - 1 {
        for i in 1..n - 1 {
            assert_abs_diff_eq!(
                s.get(0, 0, j, i),
                reference[(j - 1) * (n - 2) + (i - 1)],
                epsilon = 1e-6
            );
        }
    }
}

#[test]
fn test_quadratic_with_anisotropic_spacing() {
    // S = x² + y² in physical coordinates; Laplacian = 4 exactly in second differences.
    let (ny, nx) = (9, 13);
    let (dx, dy) = (0.5, 2.0);
    let ext = Extents4D::plane(ny, nx);
    let exact = |y: usize, x: usize| {
        let (px, py) = (x as f64 * dx, y as f64 * dy);
        px * px + py * py
    };
    let mut s = Field::from_fn("s", ext, false, |_, _, y, x| {
        if y == 0 || x == 0 || y == ny - 1 || x == nx - 1 {
            exact(y, x)
        } else {
            0.0
        }
    });
    let f = Field::filled("f", ext, false, 4.0);
    let mut coeffs = SeparableCoefficients::new(
        Field::filled("a", ext, false, 1.0),
        Field::filled("c", ext, false, 1.0),
    );

    let solver = EllipticSolver::builder()
        .with_dimension(DimensionCombination::XY)
        .with_spacing(GridSpacing::new(dx, dy, 1.0))
        .with_config(SolverConfig::default().with_tolerance(1e-13))
        .build()
        .unwrap();
    let report = solver.solve_separable(&mut s, Some(&f), &mut coeffs, false).unwrap();

    assert!(report.all_succeeded());
    for y in 0..ny {
        for x in 0..nx {
            assert_abs_diff_eq!(s.get(0, 0, y, x), exact(y, x), epsilon = 1e-7);
        }
    }
}

#[test]
fn test_periodic_x_general_form() {
    // S = y² + cos(k·x) on a periodic x axis, exact in second differences.
    let (ny, nx) = (8, 12);
    let k = 2.0 * PI / nx as f64;
    let ext = Extents4D::plane(ny, nx);
    let exact = |y: usize, x: usize| (y * y) as f64 + (k * x as f64).cos();
    let laplacian = |x: usize| 2.0 + (k * x as f64).cos() * (2.0 * k.cos() - 2.0);

    let mut s = Field::from_fn("s", ext, false, |_, _, y, x| {
        if y == 0 || y == ny - 1 { exact(y, x) } else { 0.0 }
    });
    let mut coeffs = GeneralCoefficients::new(
        Field::filled("a", ext, false, 1.0),
        Field::filled("c", ext, false, 1.0),
    )
    .with_g(Field::from_fn("g", ext, false, |_, _, _, x| -laplacian(x)));

    let boundaries = AxisBoundaries::default().with_x(BoundaryCondition::Periodic);
    let report = xy_solver(boundaries, SolverConfig::default().with_tolerance(1e-13))
        .solve_general(&mut s, &mut coeffs, false)
        .unwrap();

    assert!(report.all_succeeded());
    for y in 0..ny {
        for x in 0..nx {
            assert_abs_diff_eq!(s.get(0, 0, y, x), exact(y, x), epsilon = 1e-7);
        }
    }
}

#[test]
fn test_well_posed_problem_converges_with_decaying_speed() {
    let n = 21;
    let ext = Extents4D::plane(n, n);
    let mut s = Field::new("s", ext, false);
    let f = Field::from_fn("f", ext, false, |_, _, y, x| {
        (PI * x as f64 / (n - 1) as f64).sin() * (PI * y as f64 / (n - 1) as f64).sin()
    });
    let mut coeffs = SeparableCoefficients::new(
        Field::from_fn("a", ext, false, |_, _, _, x| 1.0 + 0.01 * x as f64),
        Field::filled("c", ext, false, 2.0),
    )
    .with_b(Field::filled("b", ext, false, 0.2));

    let config = SolverConfig::default().with_tolerance(1e-10).with_history();
    let report = xy_solver(AxisBoundaries::default(), config)
        .solve_separable(&mut s, Some(&f), &mut coeffs, false)
        .unwrap();

    let slice = &report.slices()[0];
    assert_eq!(slice.status, RelaxStatus::Converged);
    assert!(slice.iterations < config.max_loop_count);
    assert_eq!(slice.history.len(), slice.iterations);

    let quarter = slice.history.len() / 4;
    let early = slice.history[1..=quarter]
        .iter()
        .cloned()
        .fold(0.0_f64, f64::max);
    let late = slice.history[slice.history.len() - quarter..]
        .iter()
        .cloned()
        .fold(0.0_f64, f64::max);
    assert!(late < early, "late {late:e} >= early {early:e}");
    assert!(*slice.history.last().unwrap() < 1e-10);
}

#[test]
fn test_ill_posed_problem_reports_overflow_without_nan() {
    let n = 9;
    let ext = Extents4D::plane(n, n);
    let mut s = Field::new("s", ext, false);
    let f = Field::filled("f", ext, false, 1.0);
    let mut coeffs = SeparableCoefficients::new(
        Field::filled("a", ext, false, -1.0),
        Field::filled("c", ext, false, 1.0),
    );

    let report = xy_solver(AxisBoundaries::default(), SolverConfig::default())
        .solve_separable(&mut s, Some(&f), &mut coeffs, false)
        .unwrap();

    let slice = &report.slices()[0];
    assert_eq!(slice.status, RelaxStatus::Overflowed);
    assert!(slice.iterations < 100);
    assert!(s.data().iter().all(|v| v.is_finite()));
}

#[test]
fn test_tridiagonal_path_matches_relaxation() {
    // One interior row with C = 0 is a 1D problem along x.
    let nx = 17;
    let ext = Extents4D::plane(3, nx);
    let a = Field::from_fn("a", ext, false, |_, _, _, x| 1.0 + 0.5 * (x as f64 * 0.4).sin());
    let f = Field::from_fn("f", ext, false, |_, _, _, x| (x as f64 * 0.3).cos());
    let initial = Field::from_fn("s", ext, false, |_, _, _, x| {
        if x == 0 {
            1.0
        } else if x == nx - 1 {
            -0.5
        } else {
            0.0
        }
    });

    let mut s_relax = initial.clone();
    let mut coeffs = SeparableCoefficients::new(a.clone(), Field::new("c", ext, false));
    let report = xy_solver(
        AxisBoundaries::default(),
        SolverConfig::default().with_tolerance(1e-14),
    )
    .solve_separable(&mut s_relax, Some(&f), &mut coeffs, false)
    .unwrap();
    assert!(report.all_succeeded());

    let mut s_thomas = initial.clone();
    xy_solver(AxisBoundaries::default(), SolverConfig::default())
        .solve_tridiagonal(&mut s_thomas, Some(&f), &a)
        .unwrap();

    let mut s_lu = initial.clone();
    EllipticSolver::builder()
        .with_dimension(DimensionCombination::XY)
        .with_tridiagonal_solver(DenseLuSolver)
        .build()
        .unwrap()
        .solve_tridiagonal(&mut s_lu, Some(&f), &a)
        .unwrap();

    for x in 0..nx {
        assert_abs_diff_eq!(s_relax.get(0, 0, 1, x), s_thomas.get(0, 0, 1, x), epsilon = 1e-8);
        assert_abs_diff_eq!(s_lu.get(0, 0, 1, x), s_thomas.get(0, 0, 1, x), epsilon = 1e-10);
    }
}
