//! Successive over-relaxation kernel.
//!
//! Solves one slice to a terminal state. Two discretizations share the
//! same outer loop through the [`Stencil`] trait:
//!
//! - [`SeparableStencil`]: ∂1(A·∂1S) + ∂2(B·∂1S) + ∂1(B·∂2S) + ∂2(C·∂2S) = F
//! - [`GeneralStencil`]: A·S11 + B·S12 + C·S22 + D·S1 + E·S2 + F·S + G = 0
//!
//! Everything is scaled by Δ1², so with r = (Δ1/Δ2)² the separable
//! residual at (j, i) reads
//!
//! ```text
//! R = Ae(S[j][i+1] - S) - Aw(S - S[j][i-1])
//!   + r·(Cn(S[j+1][i] - S) - Cs(S - S[j-1][i]))
//!   + Δ1/(4Δ2)·(cross differences of B)
//!   - F·Δ1²
//! ```
//!
//! with half-grid coefficients such as Ae = (A[j][i] + A[j][i+1]) / 2.
//!
//! # Sweep order
//!
//! One sweep walks interior rows j = 1..n2-1 and, within each, columns
//! i = 1..n1-1, updating `S` in place. Later points see earlier updates
//! of the same sweep (Gauss-Seidel), which fixes the convergence
//! trajectory and not just the fixed point. Periodic edge columns follow
//! the interior sweep, then periodic edge rows.

use crate::field::SliceBuffer;

use super::config::SolverConfig;
use super::params::SliceParams;

/// Terminal state of a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxStatus {
    /// Relative change of mean |S| fell below the tolerance.
    Converged,
    /// Loop budget exhausted before converging.
    MaxLoopReached,
    /// Mean |S| became NaN or exceeded the overflow threshold.
    Overflowed,
}

impl RelaxStatus {
    /// Both converged and budget-exhausted solves are accepted output.
    #[inline]
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Overflowed)
    }
}

/// Result of one relaxation solve.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxOutcome {
    /// Number of sweeps performed
    pub iterations: usize,
    /// Terminal state
    pub status: RelaxStatus,
    /// Last computed convergence speed (NaN when overflowed on the first sweep)
    pub final_speed: f64,
    /// Convergence speed of every sweep (only with `record_history`)
    pub history: Vec<f64>,
}

impl RelaxOutcome {
    /// Whether the solve diverged.
    #[inline]
    pub fn overflowed(&self) -> bool {
        self.status == RelaxStatus::Overflowed
    }
}

/// Indices of a point and its (possibly wrapped) neighbours.
#[derive(Debug, Clone, Copy)]
pub struct Neighbours {
    pub j: usize,
    pub i: usize,
    pub jm: usize,
    pub jp: usize,
    pub im: usize,
    pub ip: usize,
}

/// Spacing-derived constants shared by every point of a sweep.
#[derive(Debug, Clone, Copy)]
pub struct StencilConstants {
    /// (Δ1/Δ2)²
    pub r2: f64,
    /// Δ1 / (4Δ2), cross-difference scale
    pub rx: f64,
    /// Δ1²
    pub d1_sq: f64,
    /// Δ1 / 2, first-difference scale along dim1
    pub d1_half: f64,
    /// Δ1² / (2Δ2), first-difference scale along dim2
    pub d2_half: f64,
    /// Over-relaxation factor
    pub omega: f64,
    /// Missing-value sentinel
    pub undefined: f64,
}

impl StencilConstants {
    /// Derive the constants for a plane.
    pub fn new(params: &SliceParams) -> Self {
        let d1 = params.axes.dim1.spacing;
        let d2 = params.axes.dim2.spacing;
        Self {
            r2: params.axes.spacing_ratio_sq(),
            rx: d1 / (4.0 * d2),
            d1_sq: d1 * d1,
            d1_half: d1 / 2.0,
            d2_half: d1 * d1 / (2.0 * d2),
            omega: params.omega,
            undefined: params.undefined,
        }
    }

    #[inline]
    fn any_undefined(&self, values: &[f64]) -> bool {
        values.iter().any(|&v| v == self.undefined)
    }
}

/// The 3×3 block of S around a point.
#[derive(Debug, Clone, Copy)]
struct Block {
    c: f64,
    e: f64,
    w: f64,
    n: f64,
    s: f64,
    ne: f64,
    nw: f64,
    se: f64,
    sw: f64,
}

impl Block {
    #[inline]
    fn gather(s: &SliceBuffer, at: Neighbours) -> Self {
        Self {
            c: s[(at.j, at.i)],
            e: s[(at.j, at.ip)],
            w: s[(at.j, at.im)],
            n: s[(at.jp, at.i)],
            s: s[(at.jm, at.i)],
            ne: s[(at.jp, at.ip)],
            nw: s[(at.jp, at.im)],
            se: s[(at.jm, at.ip)],
            sw: s[(at.jm, at.im)],
        }
    }

    #[inline]
    fn values(&self) -> [f64; 9] {
        [
            self.c, self.e, self.w, self.n, self.s, self.ne, self.nw, self.se, self.sw,
        ]
    }
}

/// Point update rule of a discretized elliptic operator.
pub trait Stencil {
    /// Over-relaxed correction to add to S at `at`, or `None` when any
    /// operand touching the stencil is undefined.
    fn correction(&self, s: &SliceBuffer, at: Neighbours, k: &StencilConstants) -> Option<f64>;
}

#[inline]
fn value_or_zero(buf: Option<&SliceBuffer>, j: usize, i: usize) -> f64 {
    buf.map_or(0.0, |b| b[(j, i)])
}

/// Flux-form operator with an optional symmetric cross coefficient B.
#[derive(Debug, Clone, Copy)]
pub struct SeparableStencil<'a> {
    /// Forcing; zero when absent
    pub f: Option<&'a SliceBuffer>,
    /// dim1 diffusion coefficient
    pub a: &'a SliceBuffer,
    /// Cross coefficient; zero when absent
    pub b: Option<&'a SliceBuffer>,
    /// dim2 diffusion coefficient
    pub c: &'a SliceBuffer,
}

impl Stencil for SeparableStencil<'_> {
    fn correction(&self, s: &SliceBuffer, at: Neighbours, k: &StencilConstants) -> Option<f64> {
        let Neighbours {
            j,
            i,
            jm,
            jp,
            im,
            ip,
        } = at;

        let blk = Block::gather(s, at);
        let f = value_or_zero(self.f, j, i);
        let (a_c, a_e, a_w) = (self.a[(j, i)], self.a[(j, ip)], self.a[(j, im)]);
        let (c_c, c_n, c_s) = (self.c[(j, i)], self.c[(jp, i)], self.c[(jm, i)]);
        let (b_c, b_n, b_s, b_e, b_w) = (
            value_or_zero(self.b, j, i),
            value_or_zero(self.b, jp, i),
            value_or_zero(self.b, jm, i),
            value_or_zero(self.b, j, ip),
            value_or_zero(self.b, j, im),
        );

        if k.any_undefined(&blk.values())
            || k.any_undefined(&[f, a_c, a_e, a_w, c_c, c_n, c_s, b_c, b_n, b_s, b_e, b_w])
        {
            return None;
        }

        let ae = 0.5 * (a_c + a_e);
        let aw = 0.5 * (a_c + a_w);
        let cn = 0.5 * (c_c + c_n);
        let cs = 0.5 * (c_c + c_s);

        let cross = b_n * (blk.ne - blk.nw) - b_s * (blk.se - blk.sw)
            + b_e * (blk.ne - blk.se)
            - b_w * (blk.nw - blk.sw);

        let residual = ae * (blk.e - blk.c) - aw * (blk.c - blk.w)
            + k.r2 * (cn * (blk.n - blk.c) - cs * (blk.c - blk.s))
            + k.rx * cross
            - f * k.d1_sq;
        let diag = ae + aw + k.r2 * (cn + cs);

        Some(k.omega * residual / diag)
    }
}

/// General linear operator A·S11 + B·S12 + C·S22 + D·S1 + E·S2 + F·S + G = 0.
///
/// A and C are required; missing lower-order coefficients are zero.
#[derive(Debug, Clone, Copy)]
pub struct GeneralStencil<'a> {
    pub a: &'a SliceBuffer,
    pub b: Option<&'a SliceBuffer>,
    pub c: &'a SliceBuffer,
    pub d: Option<&'a SliceBuffer>,
    pub e: Option<&'a SliceBuffer>,
    pub f: Option<&'a SliceBuffer>,
    pub g: Option<&'a SliceBuffer>,
}

impl<'a> GeneralStencil<'a> {
    /// Operator with only second-derivative coefficients.
    pub fn new(a: &'a SliceBuffer, c: &'a SliceBuffer) -> Self {
        Self {
            a,
            b: None,
            c,
            d: None,
            e: None,
            f: None,
            g: None,
        }
    }
}

impl Stencil for GeneralStencil<'_> {
    fn correction(&self, s: &SliceBuffer, at: Neighbours, k: &StencilConstants) -> Option<f64> {
        let (j, i) = (at.j, at.i);
        let blk = Block::gather(s, at);

        let a = self.a[(j, i)];
        let c = self.c[(j, i)];
        let b = value_or_zero(self.b, j, i);
        let d = value_or_zero(self.d, j, i);
        let e = value_or_zero(self.e, j, i);
        let f = value_or_zero(self.f, j, i);
        let g = value_or_zero(self.g, j, i);

        if k.any_undefined(&blk.values()) || k.any_undefined(&[a, b, c, d, e, f, g]) {
            return None;
        }

        let residual = a * (blk.e - 2.0 * blk.c + blk.w)
            + k.r2 * c * (blk.n - 2.0 * blk.c + blk.s)
            + k.rx * b * (blk.ne - blk.nw - blk.se + blk.sw)
            + k.d1_half * d * (blk.e - blk.w)
            + k.d2_half * e * (blk.n - blk.s)
            + k.d1_sq * (f * blk.c + g);
        let diag = 2.0 * a + 2.0 * k.r2 * c;

        Some(k.omega * residual / diag)
    }
}

/// Relative change of the mean absolute solution between sweeps.
#[inline]
fn convergence_speed(norm: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if norm == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        (norm - previous).abs() / previous
    }
}

/// Re-derive `Expanded` edges from their interior neighbours.
///
/// Edges take a zero-gradient copy of the adjacent interior line; they are
/// not linearly extrapolated from the two nearest interior lines. Corners
/// copy the diagonal interior neighbour when both axes are expanded.
/// Undefined values are neither copied nor overwritten.
pub fn apply_expanded_edges(s: &mut SliceBuffer, params: &SliceParams) {
    let d1 = params.axes.dim1;
    let d2 = params.axes.dim2;
    let (n2, n1) = s.shape();
    let undef = params.undefined;

    let copy = |s: &mut SliceBuffer, to: (usize, usize), from: (usize, usize)| {
        let v = s[from];
        if v != undef && s[to] != undef {
            s[to] = v;
        }
    };

    if d1.bc.is_expanded() {
        let rows = if d2.bc.is_periodic() { 0..n2 } else { 1..n2 - 1 };
        for j in rows {
            copy(s, (j, 0), (j, 1));
            copy(s, (j, n1 - 1), (j, n1 - 2));
        }
    }

    if d2.bc.is_expanded() {
        let cols = if d1.bc.is_periodic() { 0..n1 } else { 1..n1 - 1 };
        for i in cols {
            copy(s, (0, i), (1, i));
            copy(s, (n2 - 1, i), (n2 - 2, i));
        }
    }

    if d1.bc.is_expanded() && d2.bc.is_expanded() {
        copy(s, (0, 0), (1, 1));
        copy(s, (0, n1 - 1), (1, n1 - 2));
        copy(s, (n2 - 1, 0), (n2 - 2, 1));
        copy(s, (n2 - 1, n1 - 1), (n2 - 2, n1 - 2));
    }
}

/// One Gauss-Seidel/SOR sweep over the plane, in place.
pub fn sweep<K: Stencil>(s: &mut SliceBuffer, stencil: &K, params: &SliceParams) {
    let k = StencilConstants::new(params);
    let d1 = params.axes.dim1;
    let d2 = params.axes.dim2;
    let (n2, n1) = s.shape();

    let update = |s: &mut SliceBuffer, at: Neighbours| {
        if let Some(delta) = stencil.correction(s, at, &k) {
            s[(at.j, at.i)] += delta;
        }
    };

    for j in 1..n2 - 1 {
        for i in 1..n1 - 1 {
            update(
                s,
                Neighbours {
                    j,
                    i,
                    jm: j - 1,
                    jp: j + 1,
                    im: i - 1,
                    ip: i + 1,
                },
            );
        }
    }

    if d1.bc.is_periodic() {
        for j in 1..n2 - 1 {
            for i in [0, d1.last()] {
                update(
                    s,
                    Neighbours {
                        j,
                        i,
                        jm: j - 1,
                        jp: j + 1,
                        im: d1.prev(i),
                        ip: d1.next(i),
                    },
                );
            }
        }
    }

    if d2.bc.is_periodic() {
        let cols: Vec<usize> = if d1.bc.is_periodic() {
            (0..n1).collect()
        } else {
            (1..n1 - 1).collect()
        };
        for j in [0, d2.last()] {
            for &i in &cols {
                update(
                    s,
                    Neighbours {
                        j,
                        i,
                        jm: d2.prev(j),
                        jp: d2.next(j),
                        im: d1.prev(i),
                        ip: d1.next(i),
                    },
                );
            }
        }
    }
}

/// Iterate sweeps until convergence, overflow, or the loop budget.
///
/// # Panics
///
/// Panics if `s` does not have the plane shape of `params`.
pub fn relax<K: Stencil>(
    s: &mut SliceBuffer,
    stencil: &K,
    params: &SliceParams,
    config: &SolverConfig,
) -> RelaxOutcome {
    assert_eq!(s.shape(), params.shape(), "slice shape does not match params");

    let undef = params.undefined;
    let mut previous = s.mean_abs(undef);
    let mut history = Vec::new();
    let mut iterations = 0;
    let mut speed = f64::NAN;

    let status = loop {
        iterations += 1;

        apply_expanded_edges(s, params);
        sweep(s, stencil, params);

        let norm = s.mean_abs(undef);
        if norm.is_nan() || norm > config.overflow_threshold {
            log::trace!("sweep {}: norm {:e} overflowed", iterations, norm);
            break RelaxStatus::Overflowed;
        }

        speed = convergence_speed(norm, previous);
        log::trace!("sweep {}: norm {:.6e} speed {:.3e}", iterations, norm, speed);
        if config.record_history {
            history.push(speed);
        }
        previous = norm;

        if speed < config.tolerance {
            break RelaxStatus::Converged;
        }
        if iterations >= config.max_loop_count {
            break RelaxStatus::MaxLoopReached;
        }
    };

    if status.is_success() {
        apply_expanded_edges(s, params);
    }

    RelaxOutcome {
        iterations,
        status,
        final_speed: speed,
        history,
    }
}

/// Relax the flux-form equation on one slice.
pub fn relax_separable(
    s: &mut SliceBuffer,
    f: Option<&SliceBuffer>,
    a: &SliceBuffer,
    b: Option<&SliceBuffer>,
    c: &SliceBuffer,
    params: &SliceParams,
    config: &SolverConfig,
) -> RelaxOutcome {
    relax(s, &SeparableStencil { f, a, b, c }, params, config)
}

/// Relax the general linear equation on one slice.
pub fn relax_general(
    s: &mut SliceBuffer,
    stencil: &GeneralStencil<'_>,
    params: &SliceParams,
    config: &SolverConfig,
) -> RelaxOutcome {
    relax(s, stencil, params, config)
}
