use super::monomial::Coefficient;
use super::polynomial::Polynomial;

/// One polynomial per boundary edge, in the cell's edge traversal order.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewisePolynomial<T: Coefficient = f64> {
    pub polys: Vec<Polynomial<T>>,
}

impl<T: Coefficient> PiecewisePolynomial<T> {
    /// `num_polys` zero polynomials.
    pub fn zeros(num_polys: usize) -> Self {
        Self {
            polys: vec![Polynomial::zero(); num_polys],
        }
    }

    pub fn from_polys(polys: Vec<Polynomial<T>>) -> Self {
        Self { polys }
    }

    #[inline]
    pub fn num_polys(&self) -> usize {
        self.polys.len()
    }

    pub fn is_zero(&self) -> bool {
        self.polys.iter().all(Polynomial::is_zero)
    }
}
