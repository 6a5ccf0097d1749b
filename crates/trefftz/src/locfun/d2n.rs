//! Dirichlet-to-Neumann helpers.
//!
//! - Weighted tangential derivative: `d/dτ u(x(τ)) = ∇u · t · dx_norm`,
//!   computed spectrally per contour. For a conjugate pair `(ψ, ψ̂)` the
//!   weighted normal derivative of `ψ` is the weighted tangential
//!   derivative of `ψ̂`.
//! - Per-hole tables of `λⱼ = ln|x − ξⱼ|`: trace and the weighted normal
//!   and tangential derivatives on the cell boundary, the latter two taken
//!   from the exact gradient.

use crate::error::{check_len, Result};
use crate::mesh::MeshCell;

use super::nystrom::NystromSolver;

/// `d/dτ` of boundary data, contour by contour.
pub fn weighted_tangential_derivative(solver: &NystromSolver, trace: &[f64]) -> Result<Vec<f64>> {
    solver.spectral().derivative(trace)
}

/// Boundary tables of the hole logarithms `ln|x − ξⱼ|`.
#[derive(Clone, Debug)]
pub struct LogTerms {
    num_pts: usize,
    pub traces: Vec<Vec<f64>>,
    pub wnd: Vec<Vec<f64>>,
    pub wtd: Vec<Vec<f64>>,
}

impl LogTerms {
    pub fn new(cell: &MeshCell) -> Result<Self> {
        let (x1, x2) = cell.get_boundary_points()?;
        let holes = cell.hole_interior_points()?;
        let mut out = Self {
            num_pts: x1.len(),
            traces: Vec::with_capacity(holes.len()),
            wnd: Vec::with_capacity(holes.len()),
            wtd: Vec::with_capacity(holes.len()),
        };
        for xi in holes {
            let mut tr = Vec::with_capacity(x1.len());
            let mut g1 = Vec::with_capacity(x1.len());
            let mut g2 = Vec::with_capacity(x1.len());
            for (&a, &b) in x1.iter().zip(x2) {
                let (d1, d2) = (a - xi.x, b - xi.y);
                let r2 = d1 * d1 + d2 * d2;
                tr.push(0.5 * r2.ln());
                g1.push(d1 / r2);
                g2.push(d2 / r2);
            }
            let nd = cell.dot_with_normal(&g1, &g2)?;
            let td = cell.dot_with_tangent(&g1, &g2)?;
            out.wnd.push(cell.multiply_by_dx_norm(&nd)?);
            out.wtd.push(cell.multiply_by_dx_norm(&td)?);
            out.traces.push(tr);
        }
        Ok(out)
    }

    #[inline]
    pub fn num_holes(&self) -> usize {
        self.traces.len()
    }

    /// `Σ aⱼ λⱼ` on the boundary.
    pub fn combine_trace(&self, a: &[f64]) -> Result<Vec<f64>> {
        combine(&self.traces, a, self.num_pts)
    }

    /// `Σ aⱼ ∂ₙλⱼ · dx_norm` on the boundary.
    pub fn combine_wnd(&self, a: &[f64]) -> Result<Vec<f64>> {
        combine(&self.wnd, a, self.num_pts)
    }

    /// `Σ aⱼ ∂ₜλⱼ · dx_norm`, i.e. `d/dτ` of [`LogTerms::combine_trace`].
    pub fn combine_wtd(&self, a: &[f64]) -> Result<Vec<f64>> {
        combine(&self.wtd, a, self.num_pts)
    }
}

fn combine(tables: &[Vec<f64>], a: &[f64], num_pts: usize) -> Result<Vec<f64>> {
    check_len("logarithmic coefficients", tables.len(), a.len())?;
    let mut out = vec![0.0; num_pts];
    for (t, &aj) in tables.iter().zip(a) {
        for (o, v) in out.iter_mut().zip(t) {
            *o += aj * v;
        }
    }
    Ok(out)
}
