//! Polynomials evaluated on, and integrated over, a mesh cell.
//!
//! `∫_K xᵃ yᵇ dx = ∮_∂K xᵃ⁺¹ yᵇ / (a+1) · n₁ ds` (divergence theorem), so a
//! cell integral costs one boundary sum and is exact up to boundary
//! quadrature error.

use crate::error::Result;
use crate::mesh::MeshCell;

use super::monomial::{Coefficient, Monomial, MultiIndex};
use super::polynomial::Polynomial;

/// `∫_K p dx`.
pub fn integrate_poly_over_cell<T: Coefficient>(p: &Polynomial<T>, cell: &MeshCell) -> Result<f64> {
    let antideriv_x = Polynomial::from_monomials(p.monomials().iter().map(|m| Monomial {
        coef: m.coef.clone() / T::from_int(i64::from(m.idx.x) + 1),
        idx: MultiIndex::new(m.idx.x + 1, m.idx.y),
    }));
    let (x1, x2) = cell.get_boundary_points()?;
    let vals = antideriv_x.eval_slice(x1, x2);
    let zeros = vec![0.0; vals.len()];
    let integrand = cell.dot_with_normal(&vals, &zeros)?;
    cell.integrate_over_boundary(&integrand)
}

impl<T: Coefficient> Polynomial<T> {
    /// Values at the cell's boundary samples.
    pub fn trace(&self, cell: &MeshCell) -> Result<Vec<f64>> {
        let (x1, x2) = cell.get_boundary_points()?;
        Ok(self.eval_slice(x1, x2))
    }

    /// `∇p · n · dx_norm` at the cell's boundary samples.
    pub fn weighted_normal_derivative(&self, cell: &MeshCell) -> Result<Vec<f64>> {
        let (px, py) = self.grad();
        let nd = cell.dot_with_normal(&px.trace(cell)?, &py.trace(cell)?)?;
        cell.multiply_by_dx_norm(&nd)
    }
}
