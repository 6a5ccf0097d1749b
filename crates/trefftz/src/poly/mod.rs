//! Bivariate polynomial algebra.
//!
//! Purpose
//! - Hold Laplacians, polynomial parts and edge traces of local functions.
//! - Provide the closed-form anti-Laplacian that lets volume integrals of
//!   polynomials and harmonic functions collapse to boundary sums.
//!
//! Why generic coefficients
//! - `Δ(anti_laplacian(p)) == p` must hold monomial for monomial. With
//!   `Rational64` coefficients that identity is checked structurally;
//!   numerics run on `f64`.

mod integrate;
mod monomial;
mod piecewise;
mod polynomial;

pub use integrate::integrate_poly_over_cell;
pub use monomial::{Coefficient, Monomial, MultiIndex, Var};
pub use piecewise::PiecewisePolynomial;
pub use polynomial::Polynomial;

#[cfg(test)]
mod tests;
