//! Nyström discretization of the harmonic conjugate problem.
//!
//! Purpose
//! - Given the trace of a harmonic `φ` on a punctured cell, split it as
//!   `φ = ψ + Σ aⱼ ln|x − ξⱼ|` and return the trace of the harmonic
//!   conjugate `ψ̂` together with the coefficients `aⱼ`.
//!
//! Method
//! - Log coefficients: `ψ` is written as a double layer potential with real
//!   density `μ`. Row `i` of the boundary equation (singularity subtracted,
//!   valid at corners) reads
//!   `μᵢ + Σ_{j≠i} Kᵢⱼ (μⱼ − μᵢ) + Σₖ aₖ ln|xᵢ − ξₖ| = φᵢ`, with
//!   `Kᵢⱼ = h/2π · (yⱼ − xᵢ)·nⱼ / |yⱼ − xᵢ|² · dx_normⱼ`. Constant densities
//!   on a hole generate no interior field, so each hole adds a zero-mean
//!   constraint on `μ` and one unknown `aₖ`.
//! - Conjugate: with `ψ` known, `∂ₙψ̂ · dx_norm = −d/dτ ψ`. Green's identity
//!   for `ψ̂` at boundary node `i` gives
//!   `Σ_{j≠i} Kᵢⱼ (ψ̂ⱼ − ψ̂ᵢ) = (1/2π) Σⱼ Lᵢⱼ ∂ₙψ̂ⱼ dx_normⱼ`, where `L` is
//!   the log single layer. On the node's own contour `L` uses Martensen
//!   product weights for `ln|2 sin(τ/2)|`; the smooth remainder is summed
//!   with the trapezoid rule. A Lagrange multiplier fixes the zero weighted
//!   mean of `ψ̂`.
//! - `μ` itself is never differentiated: at graded corner nodes it is
//!   singular and its derivative loses several digits.
//! - Both systems are LU-factorized once; every local function on the cell
//!   reuses the factorizations.

use std::f64::consts::PI;
use std::ops::Range;

use nalgebra::{DMatrix, DVector, Dyn, LU};

use crate::error::{check_len, Error, Result};
use crate::mesh::MeshCell;
use crate::quad::Quad;

use super::d2n::LogTerms;
use super::fft::SpectralOps;

/// Factorized boundary integral systems of one parameterized cell.
#[derive(Debug)]
pub struct NystromSolver {
    cell: MeshCell,
    log_terms: LogTerms,
    spectral: SpectralOps,
    lu: LU<f64, Dyn, Dyn>,
    single_layer: DMatrix<f64>,
    conj_lu: LU<f64, Dyn, Dyn>,
}

impl NystromSolver {
    /// Takes ownership of a parameterized cell and factorizes its systems.
    pub fn new(cell: MeshCell) -> Result<Self> {
        let n = cell.num_pts()?;
        let m = cell.num_holes()?;
        let h = cell.h()?;
        let dxn = cell.dx_norm()?;
        let log_terms = LogTerms::new(&cell)?;
        let ranges = cell.component_ranges()?.to_vec();
        let dlp = double_layer(&cell)?;

        let mut a = DMatrix::<f64>::zeros(n + m, n + m);
        let mut b = DMatrix::<f64>::zeros(n + 1, n + 1);
        for i in 0..n {
            let mut off = 0.0;
            for j in 0..n {
                if j != i {
                    a[(i, j)] = dlp[(i, j)];
                    b[(i, j)] = dlp[(i, j)];
                    off += dlp[(i, j)];
                }
            }
            a[(i, i)] = 1.0 - off;
            b[(i, i)] = -off;
            b[(i, n)] = 1.0;
            b[(n, i)] = h * dxn[i];
            for (k, tr) in log_terms.traces.iter().enumerate() {
                a[(i, n + k)] = tr[i];
            }
        }
        for (k, r) in ranges.iter().skip(1).enumerate() {
            for j in r.clone() {
                a[(n + k, j)] = h * dxn[j];
            }
        }

        let lu = a.lu();
        let conj_lu = b.lu();
        if !lu.is_invertible() || !conj_lu.is_invertible() {
            return Err(Error::SingularSystem);
        }
        let single_layer = single_layer(&cell, &ranges)?;
        let spectral = SpectralOps::new(&ranges, h);
        tracing::info!(
            cell = cell.id,
            num_pts = n,
            num_holes = m,
            "factorized Nyström systems"
        );
        Ok(Self {
            cell,
            log_terms,
            spectral,
            lu,
            single_layer,
            conj_lu,
        })
    }

    #[inline]
    pub fn cell(&self) -> &MeshCell {
        &self.cell
    }

    #[inline]
    pub fn log_terms(&self) -> &LogTerms {
        &self.log_terms
    }

    #[inline]
    pub(crate) fn spectral(&self) -> &SpectralOps {
        &self.spectral
    }

    #[inline]
    pub fn num_holes(&self) -> usize {
        self.log_terms.num_holes()
    }

    /// Coefficients `a` of the hole logarithms in `φ`.
    fn log_coefficients(&self, phi: &[f64]) -> Result<Vec<f64>> {
        let n = self.cell.num_pts()?;
        check_len("harmonic trace", n, phi.len())?;
        let m = self.num_holes();
        let rhs = DVector::from_iterator(
            n + m,
            phi.iter().copied().chain(std::iter::repeat(0.0).take(m)),
        );
        let sol = self.lu.solve(&rhs).ok_or(Error::SingularSystem)?;
        Ok(sol.as_slice()[n..].to_vec())
    }

    /// `φ` trace ↦ (`ψ̂` trace, log coefficients).
    ///
    /// `ψ̂` is normalized to zero mean over the boundary; everything
    /// downstream only sees its derivatives or `Re` parts of Cauchy
    /// integrals.
    pub fn get_harmonic_conjugate(&self, phi: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let log_coef = self.log_coefficients(phi)?;
        let n = phi.len();
        let mut dpsi = self.spectral.derivative(phi)?;
        for (d, w) in dpsi.iter_mut().zip(self.log_terms.combine_wtd(&log_coef)?) {
            *d -= w;
        }
        let lg = &self.single_layer * DVector::from_vec(dpsi);
        let rhs = DVector::from_iterator(
            n + 1,
            lg.iter()
                .map(|v| -v / (2.0 * PI))
                .chain(std::iter::once(0.0)),
        );
        let sol = self.conj_lu.solve(&rhs).ok_or(Error::SingularSystem)?;
        Ok((sol.as_slice()[..n].to_vec(), log_coef))
    }
}

/// Off-diagonal double layer weights `Kᵢⱼ`; the diagonal is left zero.
fn double_layer(cell: &MeshCell) -> Result<DMatrix<f64>> {
    let n = cell.num_pts()?;
    let c = cell.h()? / (2.0 * PI);
    let (x1, x2) = cell.get_boundary_points()?;
    let (n1, n2) = cell.unit_normal()?;
    let dxn = cell.dx_norm()?;
    Ok(DMatrix::from_fn(n, n, |i, j| {
        let (d1, d2) = (x1[j] - x1[i], x2[j] - x2[i]);
        let r2 = d1 * d1 + d2 * d2;
        if i == j || r2 == 0.0 {
            0.0
        } else {
            c * (d1 * n1[j] + d2 * n2[j]) / r2 * dxn[j]
        }
    }))
}

/// Weights `Lᵢⱼ` with `∮ ln|xᵢ − y| f(y) dτ ≈ Σⱼ Lᵢⱼ fⱼ`.
///
/// On a contour of `M` samples and period `T = M h`, the kernel splits as
/// `ln|2 sin(πk/M)| + ln(|xᵢ − yⱼ| / |2 sin(πk/M)|)` with `k = j − i`. The
/// first part is integrated exactly for trigonometric data of degree
/// `M/2`, the second is smooth and summed with the trapezoid rule. Its
/// limit at `j = i` is `ln(dx_normᵢ T / 2π)`.
fn single_layer(cell: &MeshCell, ranges: &[Range<usize>]) -> Result<DMatrix<f64>> {
    let n = cell.num_pts()?;
    let h = cell.h()?;
    let (x1, x2) = cell.get_boundary_points()?;
    let dxn = cell.dx_norm()?;
    let mut out = DMatrix::<f64>::zeros(n, n);
    for (ci, r) in ranges.iter().enumerate() {
        let len = r.len();
        let period = len as f64 * h;
        let scale = period / (2.0 * PI);
        let log_sin = log_sin_weights(len)?;
        for i in r.clone() {
            for j in 0..n {
                let (d1, d2) = (x1[j] - x1[i], x2[j] - x2[i]);
                let r2 = d1 * d1 + d2 * d2;
                if !r.contains(&j) {
                    out[(i, j)] = h * 0.5 * r2.ln();
                    continue;
                }
                let k = (j + len - i) % len;
                let mut v = scale * 0.5 * log_sin[k];
                if k == 0 {
                    if dxn[i] > 0.0 {
                        v += h * (dxn[i] * scale).ln();
                    }
                } else if r2 > 0.0 {
                    let s = (PI * k as f64 / len as f64).sin().abs();
                    v += h * (0.5 * r2.ln() - (2.0 * s).ln());
                }
                out[(i, j)] = v;
            }
        }
        tracing::trace!(contour = ci, len, "single layer block");
    }
    Ok(out)
}

/// Martensen product weights `R_k` for `∫₀^{2π} ln(4 sin²(t/2)) f(t) dt ≈
/// Σ_k R_k f(t_k)`, `t_k = 2πk/len`.
fn log_sin_weights(len: usize) -> Result<Vec<f64>> {
    let q = Quad::martensen(len / 2)?;
    let half = (len / 2) as f64;
    Ok((0..len)
        .map(|k| {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            -4.0 * PI * q.wgt[k] + sign * PI / (half * half)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sin_weights_integrate_cosines_exactly() {
        // ln(4 sin²(t/2)) = −2 Σ cos(mt)/m
        let len = 16;
        let r = log_sin_weights(len).unwrap();
        for m in 0..=len / 2 {
            let sum: f64 = (0..len)
                .map(|k| r[k] * (2.0 * PI * (m * k) as f64 / len as f64).cos())
                .sum();
            let exact = if m == 0 { 0.0 } else { -2.0 * PI / m as f64 };
            assert!((sum - exact).abs() < 1e-12, "m = {m}");
        }
    }
}
