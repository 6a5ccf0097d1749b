//! Anti-Laplacian of a harmonic part given on the boundary.
//!
//! For `φ = ψ + Σ aₖ ln|x − ξₖ|` with conjugate trace `ψ̂`, build `Φ` with
//! `ΔΦ = φ` and return its trace and weighted normal derivative.
//!
//! Construction (`z = x₁ + i x₂`, `f = ψ + iψ̂` holomorphic in the cell):
//! - Split off one simple pole per hole, `f = g + Σ bⱼ/(z − ξⱼ)`, with
//!   `bⱼ = −(1/2πi) ∮_Γⱼ f dz`, so that `g` has a single valued primitive.
//! - `ρ' = g` on the boundary by spectral integration; the per-hole constants
//!   are fixed by `(1/2πi) ∮ ρ/(z − ξⱼ) dz = 0`.
//! - `Δ[Re(z̄ρ)/4] = Re g`, `Δ[½ (b·d) ln r] = Re(b/(z − ξ))`,
//!   `Δ[¼ r² (ln r − 1)] = ln r`, where `d = x − ξ` and `r = |d|`.

use std::f64::consts::PI;

use num::complex::Complex64;

use crate::error::{check_len, Result};

use super::nystrom::NystromSolver;

/// Returns `(Φ trace, ∂ₙΦ · dx_norm)` for `ΔΦ = ψ + Σ aₖ ln|x − ξₖ|`.
pub fn get_anti_laplacian_harmonic(
    solver: &NystromSolver,
    psi: &[f64],
    psi_hat: &[f64],
    log_coef: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    let cell = solver.cell();
    let n = cell.num_pts()?;
    check_len("conjugable trace", n, psi.len())?;
    check_len("conjugate trace", n, psi_hat.len())?;
    check_len("logarithmic coefficients", solver.num_holes(), log_coef.len())?;

    let h = cell.h()?;
    let (x1, x2) = cell.get_boundary_points()?;
    let (t1, t2) = cell.unit_tangent()?;
    let (n1, n2) = cell.unit_normal()?;
    let dxn = cell.dx_norm()?;
    let ranges = cell.component_ranges()?;
    let xis: Vec<Complex64> = cell
        .hole_interior_points()?
        .iter()
        .map(|p| Complex64::new(p.x, p.y))
        .collect();

    let z: Vec<Complex64> = (0..n).map(|i| Complex64::new(x1[i], x2[i])).collect();
    // dz = T · dx_norm · dτ
    let dz: Vec<Complex64> = (0..n)
        .map(|i| Complex64::new(t1[i], t2[i]) * dxn[i])
        .collect();
    let f: Vec<Complex64> = (0..n).map(|i| Complex64::new(psi[i], psi_hat[i])).collect();
    let two_pi_i = Complex64::new(0.0, 2.0 * PI);

    let b: Vec<Complex64> = ranges
        .iter()
        .skip(1)
        .map(|r| -r.clone().map(|i| f[i] * dz[i] * h).sum::<Complex64>() / two_pi_i)
        .collect();

    let g: Vec<Complex64> = (0..n)
        .map(|i| {
            f[i] - b
                .iter()
                .zip(&xis)
                .map(|(bj, xi)| bj / (z[i] - xi))
                .sum::<Complex64>()
        })
        .collect();

    let integrand: Vec<Complex64> = (0..n).map(|i| g[i] * dz[i]).collect();
    let mut rho = solver.spectral().antiderivative(&integrand)?;
    let consts: Vec<Complex64> = xis
        .iter()
        .map(|xi| {
            (0..n)
                .map(|i| rho[i] / (z[i] - xi) * dz[i] * h)
                .sum::<Complex64>()
                / two_pi_i
        })
        .collect();
    for (r, c) in ranges.iter().skip(1).zip(&consts) {
        for i in r.clone() {
            rho[i] += c;
        }
    }

    let mut trace = Vec::with_capacity(n);
    let mut wnd = Vec::with_capacity(n);
    for i in 0..n {
        let (x, y) = (x1[i], x2[i]);
        let mut val = 0.25 * (x * rho[i].re + y * rho[i].im);
        let mut gx = 0.25 * (rho[i].re + x * g[i].re + y * g[i].im);
        let mut gy = 0.25 * (rho[i].im - x * g[i].im + y * g[i].re);
        for (k, xi) in xis.iter().enumerate() {
            let (d1, d2) = (x - xi.re, y - xi.im);
            let r2 = d1 * d1 + d2 * d2;
            let ln_r = 0.5 * r2.ln();
            // pole
            let bd = b[k].re * d1 + b[k].im * d2;
            val += 0.5 * bd * ln_r;
            gx += 0.5 * (b[k].re * ln_r + bd * d1 / r2);
            gy += 0.5 * (b[k].im * ln_r + bd * d2 / r2);
            // logarithm
            let a = log_coef[k];
            val += 0.25 * a * r2 * (ln_r - 1.0);
            gx += 0.25 * a * (2.0 * ln_r - 1.0) * d1;
            gy += 0.25 * a * (2.0 * ln_r - 1.0) * d2;
        }
        trace.push(val);
        wnd.push((gx * n1[i] + gy * n2[i]) * dxn[i]);
    }
    Ok((trace, wnd))
}
