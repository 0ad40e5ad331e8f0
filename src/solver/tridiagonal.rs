//! Direct solve for the one-dimensional separable case.
//!
//! When the operator reduces to d/d1(A·dS/d1) = F along dim1, every dim2
//! line is an independent tridiagonal system
//!
//! ```text
//! Aw·S[i-1] - (Aw + Ae)·S[i] + Ae·S[i+1] = F[i]·Δ1²,   0 < i < n1-1
//! S[0], S[n1-1] fixed
//! ```
//!
//! with half-grid coefficients Ae = (A[i] + A[i+1]) / 2. No iteration is
//! needed. Only `Fixed` boundaries are meaningful here.

use faer::{Mat, linalg::solvers::Solve};

use crate::field::SliceBuffer;

use super::params::SliceParams;

/// Zero or non-finite pivot met while eliminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroPivot {
    /// dim2 line being solved
    pub line: usize,
    /// Row of the system where elimination broke down
    pub row: usize,
}

/// Solver for `sub·x[i-1] + diag·x[i] + sup·x[i+1] = rhs`.
///
/// `sub[0]` and `sup[n-1]` are ignored.
pub trait TridiagonalSolver: Sync {
    /// Solve the system, returning the failing row on breakdown.
    fn solve(&self, sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64])
    -> Result<Vec<f64>, usize>;
}

/// Thomas algorithm (forward elimination, back substitution).
#[derive(Debug, Clone, Copy, Default)]
pub struct ThomasSolver;

impl TridiagonalSolver for ThomasSolver {
    fn solve(
        &self,
        sub: &[f64],
        diag: &[f64],
        sup: &[f64],
        rhs: &[f64],
    ) -> Result<Vec<f64>, usize> {
        let n = rhs.len();
        assert!(sub.len() == n && diag.len() == n && sup.len() == n);
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        if diag[0] == 0.0 || !diag[0].is_finite() {
            return Err(0);
        }
        c_prime[0] = sup[0] / diag[0];
        d_prime[0] = rhs[0] / diag[0];

        for i in 1..n {
            let den = diag[i] - sub[i] * c_prime[i - 1];
            if den == 0.0 || !den.is_finite() {
                return Err(i);
            }
            if i < n - 1 {
                c_prime[i] = sup[i] / den;
            }
            d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / den;
        }

        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }

        Ok(x)
    }
}

/// Dense LU with full pivoting.
///
/// Slower than [`ThomasSolver`] but tolerates systems that need pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseLuSolver;

impl TridiagonalSolver for DenseLuSolver {
    fn solve(
        &self,
        sub: &[f64],
        diag: &[f64],
        sup: &[f64],
        rhs: &[f64],
    ) -> Result<Vec<f64>, usize> {
        let n = rhs.len();
        let mut m = Mat::zeros(n, n);
        let mut b = Mat::zeros(n, 1);
        for i in 0..n {
            m[(i, i)] = diag[i];
            if i > 0 {
                m[(i, i - 1)] = sub[i];
            }
            if i + 1 < n {
                m[(i, i + 1)] = sup[i];
            }
            b[(i, 0)] = rhs[i];
        }

        let lu = m.as_ref().full_piv_lu();
        let sol = lu.solve(&b);

        let x: Vec<f64> = (0..n).map(|i| sol[(i, 0)]).collect();
        match x.iter().position(|v| !v.is_finite()) {
            Some(row) => Err(row),
            None => Ok(x),
        }
    }
}

/// Solve every dim2 line of a slice directly.
///
/// Lines holding an undefined value in S, F or A are left untouched.
/// Returns the number of lines solved.
pub fn solve_lines<T: TridiagonalSolver + ?Sized>(
    s: &mut SliceBuffer,
    f: Option<&SliceBuffer>,
    a: &SliceBuffer,
    params: &SliceParams,
    solver: &T,
) -> Result<usize, ZeroPivot> {
    let (n2, n1) = s.shape();
    let undef = params.undefined;
    let d1_sq = params.axes.dim1.spacing * params.axes.dim1.spacing;

    let mut sub = vec![0.0; n1];
    let mut diag = vec![0.0; n1];
    let mut sup = vec![0.0; n1];
    let mut rhs = vec![0.0; n1];
    let mut solved = 0;

    for j in 0..n2 {
        let f_row = f.map(|f| f.row(j));
        let poisoned = s.row(j).iter().any(|&v| v == undef)
            || a.row(j).iter().any(|&v| v == undef)
            || f_row.is_some_and(|row| row.iter().any(|&v| v == undef));
        if poisoned {
            log::debug!("line {} skipped: undefined operand", j);
            continue;
        }

        let a_row = a.row(j);
        diag[0] = 1.0;
        sup[0] = 0.0;
        rhs[0] = s[(j, 0)];
        for i in 1..n1 - 1 {
            let ae = 0.5 * (a_row[i] + a_row[i + 1]);
            let aw = 0.5 * (a_row[i] + a_row[i - 1]);
            sub[i] = aw;
            diag[i] = -(aw + ae);
            sup[i] = ae;
            rhs[i] = f_row.map_or(0.0, |row| row[i]) * d1_sq;
        }
        sub[n1 - 1] = 0.0;
        diag[n1 - 1] = 1.0;
        rhs[n1 - 1] = s[(j, n1 - 1)];

        let x = solver
            .solve(&sub, &diag, &sup, &rhs)
            .map_err(|row| ZeroPivot { line: j, row })?;
        s.row_mut(j).copy_from_slice(&x);
        solved += 1;
    }

    Ok(solved)
}
