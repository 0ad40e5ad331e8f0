//! Coefficient repair after a diverged relaxation.
//!
//! An elliptic operator needs A > 0, C > 0 and a positive discriminant
//! A·C − (w·B)² at every point. When a slice overflows, the coefficients
//! are repaired in two escalating stages, each followed by one re-solve:
//!
//! 1. [`modify_coefficients_ac`]: fill non-positive A and C entries with
//!    the mean of their positive neighbours.
//! 2. [`modify_coefficients_d`]: rescale A and C where the discriminant is
//!    non-positive, then smooth the rescaled patch.
//!
//! At most two repair+retry cycles run per slice.

use std::fmt;

use crate::field::SliceBuffer;

use super::kernel::RelaxOutcome;

/// Headroom factor applied when restoring a positive discriminant.
pub const DISCRIMINANT_HEADROOM: f64 = 1.1;

/// How far the stabilization escalated for a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum StabilizationStage {
    /// First solve was accepted; coefficients untouched.
    #[default]
    None,
    /// Non-positive A/C entries were filled and the slice re-solved.
    PositiveCoefficients,
    /// The discriminant was restored and the slice re-solved.
    Ellipticity,
}

impl StabilizationStage {
    /// Number of repair+retry cycles this stage implies.
    pub fn retries(self) -> usize {
        match self {
            Self::None => 0,
            Self::PositiveCoefficients => 1,
            Self::Ellipticity => 2,
        }
    }
}

impl fmt::Display for StabilizationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::PositiveCoefficients => write!(f, "stage 1 (A, C > 0)"),
            Self::Ellipticity => write!(f, "stage 2 (AC - B² > 0)"),
        }
    }
}

/// Stage-2 rescale factor that is not a finite number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFailure {
    pub j: usize,
    pub i: usize,
    pub scale: f64,
}

#[inline]
fn neighbourhood(n2: usize, n1: usize, j: usize, i: usize) -> impl Iterator<Item = (usize, usize)> {
    let j0 = j.saturating_sub(1);
    let j1 = (j + 1).min(n2 - 1);
    let i0 = i.saturating_sub(1);
    let i1 = (i + 1).min(n1 - 1);
    (j0..=j1).flat_map(move |jj| (i0..=i1).map(move |ii| (jj, ii)))
}

/// Replace non-positive entries by the mean of their positive neighbours.
///
/// Repeats until no defined non-positive entry remains, or until a pass
/// changes nothing (an isolated region with no positive neighbour).
/// Returns the number of replacements. A field with no non-positive
/// entries is returned unchanged.
pub fn modify_coefficients_ac(coef: &mut SliceBuffer, undefined: f64) -> usize {
    let (n2, n1) = coef.shape();
    let mut replaced = 0;

    loop {
        let snapshot = coef.clone();
        let mut pending = 0;
        let mut changed = 0;

        for j in 0..n2 {
            for i in 0..n1 {
                let v = snapshot[(j, i)];
                if v == undefined || v > 0.0 {
                    continue;
                }
                pending += 1;

                let (sum, count) = neighbourhood(n2, n1, j, i)
                    .filter(|&(jj, ii)| (jj, ii) != (j, i))
                    .map(|p| snapshot[p])
                    .filter(|&nv| nv != undefined && nv > 0.0)
                    .fold((0.0, 0usize), |(s, c), nv| (s + nv, c + 1));

                if count > 0 {
                    coef[(j, i)] = sum / count as f64;
                    changed += 1;
                }
            }
        }

        replaced += changed;
        if pending == 0 {
            break;
        }
        if changed == 0 {
            log::warn!(
                "{} non-positive coefficient entries have no positive neighbour",
                pending
            );
            break;
        }
    }

    replaced
}

/// Restore a positive discriminant A·C − (w·B)² at interior points.
///
/// Offending A and C entries are both multiplied by
/// `sqrt(1.1 · (wB/A) · (wB/C))`, then every corrected entry is replaced by
/// the mean over corrected points in its 3×3 neighbourhood. Points with
/// B = 0 are left alone, so a zero B behaves like a missing one. Returns
/// the number of corrected points.
pub fn modify_coefficients_d(
    a: &mut SliceBuffer,
    b: &SliceBuffer,
    c: &mut SliceBuffer,
    cross_weight: f64,
    undefined: f64,
) -> Result<usize, ScaleFailure> {
    let (n2, n1) = a.shape();
    let mut corrected = vec![false; n1 * n2];
    let mut count = 0;

    for j in 1..n2.saturating_sub(1) {
        for i in 1..n1.saturating_sub(1) {
            let (av, bv, cv) = (a[(j, i)], b[(j, i)], c[(j, i)]);
            if av == undefined || bv == undefined || cv == undefined {
                continue;
            }

            let wb = cross_weight * bv;
            if av * cv - wb * wb > 0.0 {
                continue;
            }
            if wb == 0.0 {
                // D ≤ 0 from A·C alone; no rescale of A and C changes its sign.
                continue;
            }

            let scale = (DISCRIMINANT_HEADROOM * (wb / av) * (wb / cv)).sqrt();
            if !scale.is_finite() {
                return Err(ScaleFailure { j, i, scale });
            }
            if scale <= 1.0 {
                log::warn!("discriminant at (j={}, i={}) cannot be restored by rescaling", j, i);
                continue;
            }

            a[(j, i)] = av * scale;
            c[(j, i)] = cv * scale;
            corrected[j * n1 + i] = true;
            count += 1;
        }
    }

    if count > 0 {
        smooth_corrected(a, &corrected);
        smooth_corrected(c, &corrected);
    }

    Ok(count)
}

fn smooth_corrected(coef: &mut SliceBuffer, corrected: &[bool]) {
    let (n2, n1) = coef.shape();
    let snapshot = coef.clone();

    for j in 0..n2 {
        for i in 0..n1 {
            if !corrected[j * n1 + i] {
                continue;
            }
            let (sum, cnt) = neighbourhood(n2, n1, j, i)
                .filter(|&(jj, ii)| corrected[jj * n1 + ii])
                .fold((0.0, 0usize), |(s, c), p| (s + snapshot[p], c + 1));
            coef[(j, i)] = sum / cnt as f64;
        }
    }
}

/// Outcome of a solve after any stabilization it needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Stabilized {
    /// Outcome of the last relaxation attempt
    pub outcome: RelaxOutcome,
    /// Highest stage applied
    pub stage: StabilizationStage,
}

impl Stabilized {
    /// Whether the slice still diverges after every permitted retry.
    pub fn failed(&self) -> bool {
        self.outcome.overflowed()
    }
}

/// Escalating repair+retry policy for one slice.
#[derive(Debug, Clone, Copy)]
pub struct StabilizationPolicy {
    /// Weight of B in the discriminant: 1 for the flux form, ½ for the general form
    pub cross_weight: f64,
    /// Missing-value sentinel
    pub undefined: f64,
}

impl StabilizationPolicy {
    /// Policy for the flux form ∂1(A∂1S) + ∂2(B∂1S) + ∂1(B∂2S) + ∂2(C∂2S).
    pub fn separable(undefined: f64) -> Self {
        Self {
            cross_weight: 1.0,
            undefined,
        }
    }

    /// Policy for A·S11 + B·S12 + C·S22 + ….
    pub fn general(undefined: f64) -> Self {
        Self {
            cross_weight: 0.5,
            undefined,
        }
    }

    /// Escalate from an overflowed first attempt.
    ///
    /// `resolve` re-runs the kernel with the repaired A and C; it is
    /// called at most twice. When the discriminant repair changes nothing
    /// (no `b`, or B = 0 wherever D ≤ 0) the second retry is skipped and
    /// the stage-1 outcome is final.
    pub fn run<F>(
        &self,
        first: RelaxOutcome,
        a: &mut SliceBuffer,
        b: Option<&SliceBuffer>,
        c: &mut SliceBuffer,
        mut resolve: F,
    ) -> Result<Stabilized, ScaleFailure>
    where
        F: FnMut(&SliceBuffer, &SliceBuffer) -> RelaxOutcome,
    {
        if !first.overflowed() {
            return Ok(Stabilized {
                outcome: first,
                stage: StabilizationStage::None,
            });
        }

        let replaced = modify_coefficients_ac(a, self.undefined)
            + modify_coefficients_ac(c, self.undefined);
        log::debug!("stage 1 replaced {} non-positive coefficients", replaced);
        let outcome = resolve(a, c);
        if !outcome.overflowed() {
            return Ok(Stabilized {
                outcome,
                stage: StabilizationStage::PositiveCoefficients,
            });
        }

        let rescaled = match b {
            Some(b) => modify_coefficients_d(a, b, c, self.cross_weight, self.undefined)?,
            None => 0,
        };
        log::debug!("stage 2 rescaled {} points", rescaled);
        if rescaled == 0 {
            return Ok(Stabilized {
                outcome,
                stage: StabilizationStage::PositiveCoefficients,
            });
        }
        let outcome = resolve(a, c);

        Ok(Stabilized {
            outcome,
            stage: StabilizationStage::Ellipticity,
        })
    }
}
