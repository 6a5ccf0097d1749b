//! Interior values and gradients from boundary data.
//!
//! With `f = ψ + iψ̂` holomorphic in the cell, Cauchy's formula gives
//! `ψ(y) = Re (1/2πi) ∮ f/(ζ − y) dζ` and `ψ_x − iψ_y = (1/2πi) ∮ f/(ζ − y)² dζ`.
//! The polynomial part and the hole logarithms are evaluated in closed form.
//! Accuracy degrades near the boundary, where the integrand is nearly
//! singular for the trapezoid rule.

use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::error::Result;

use super::function::{ConjugateComputed, LocalFunction, PolyPartComputed, PolyPartTraceComputed};

/// Values and gradient of a local function on the cell's interior grid;
/// `NaN` at grid points outside the cell.
#[derive(Clone, Debug)]
pub struct InteriorValues {
    pub vals: DMatrix<f64>,
    pub grad1: DMatrix<f64>,
    pub grad2: DMatrix<f64>,
}

impl<'s, S> LocalFunction<'s, S>
where
    S: AsRef<PolyPartComputed> + AsRef<PolyPartTraceComputed> + AsRef<ConjugateComputed>,
{
    /// Evaluates `v`, `∂₁v` and `∂₂v` on the interior grid.
    pub fn compute_interior_values(&self) -> Result<InteriorValues> {
        let cell = self.solver().cell();
        let psi = self.get_conjugable_part()?;
        let psi_hat = self.harmonic_conjugate();
        let log_coef = self.log_coef();
        let poly = self.poly_part();
        let (px, py) = poly.grad();

        let h = cell.h()?;
        let (b1, b2) = cell.get_boundary_points()?;
        let (t1, t2) = cell.unit_tangent()?;
        let dxn = cell.dx_norm()?;
        let holes = cell.hole_interior_points()?;
        let x1 = cell.int_x1()?;
        let x2 = cell.int_x2()?;
        let inside = cell.is_inside()?;

        let (rows, cols) = x1.shape();
        let mut vals = DMatrix::from_element(rows, cols, f64::NAN);
        let mut grad1 = vals.clone();
        let mut grad2 = vals.clone();
        let c = h / (2.0 * PI);

        for i in 0..rows {
            for j in 0..cols {
                if !inside[(i, j)] {
                    continue;
                }
                let (y1, y2) = (x1[(i, j)], x2[(i, j)]);
                let (mut v, mut g1, mut g2) = (0.0, 0.0, 0.0);
                for k in 0..b1.len() {
                    let (d1, d2) = (b1[k] - y1, b2[k] - y2);
                    let r2 = d1 * d1 + d2 * d2;
                    // f/(ζ − y) = η + iη̂
                    let eta = (d1 * psi[k] + d2 * psi_hat[k]) / r2;
                    let eta_hat = (d1 * psi_hat[k] - d2 * psi[k]) / r2;
                    // f/(ζ − y)² = ω + iω̂
                    let omega = (d1 * eta + d2 * eta_hat) / r2;
                    let omega_hat = (d1 * eta_hat - d2 * eta) / r2;
                    v += (eta_hat * t1[k] + eta * t2[k]) * dxn[k];
                    g1 += (omega_hat * t1[k] + omega * t2[k]) * dxn[k];
                    g2 += (omega * t1[k] - omega_hat * t2[k]) * dxn[k];
                }
                v = c * v + poly.eval(y1, y2);
                g1 = c * g1 + px.eval(y1, y2);
                g2 = c * g2 + py.eval(y1, y2);
                for (xi, a) in holes.iter().zip(log_coef) {
                    let (d1, d2) = (y1 - xi.x, y2 - xi.y);
                    let r2 = d1 * d1 + d2 * d2;
                    v += 0.5 * a * r2.ln();
                    g1 += a * d1 / r2;
                    g2 += a * d2 / r2;
                }
                vals[(i, j)] = v;
                grad1[(i, j)] = g1;
                grad2[(i, j)] = g2;
            }
        }
        Ok(InteriorValues { vals, grad1, grad2 })
    }
}
