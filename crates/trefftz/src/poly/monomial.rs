//! Multi-indices, coefficient rings and single monomials.

use std::fmt::{self, Debug, Display};
use std::ops::Neg;

use num::rational::Rational64;
use num::Num;

/// Coefficient ring of a polynomial.
///
/// `f64` for numerics, `Rational64` when identities must hold exactly.
pub trait Coefficient:
    Num + Neg<Output = Self> + Clone + Debug + Display + Send + Sync + 'static
{
    fn from_int(n: i64) -> Self;
    fn to_f64(&self) -> f64;
}

impl Coefficient for f64 {
    #[inline]
    fn from_int(n: i64) -> Self {
        n as f64
    }
    #[inline]
    fn to_f64(&self) -> f64 {
        *self
    }
}

impl Coefficient for Rational64 {
    #[inline]
    fn from_int(n: i64) -> Self {
        Rational64::from_integer(n)
    }
    #[inline]
    fn to_f64(&self) -> f64 {
        *self.numer() as f64 / *self.denom() as f64
    }
}

/// Exponent pair `(x, y)` of the monomial `x₁ˣ x₂ʸ`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MultiIndex {
    pub x: u32,
    pub y: u32,
}

impl MultiIndex {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn order(&self) -> u32 {
        self.x + self.y
    }

    /// Position in the enumeration `1, x, y, x², xy, y², x³, ...`.
    #[inline]
    pub fn rank(&self) -> usize {
        let m = self.order() as usize;
        m * (m + 1) / 2 + self.y as usize
    }

    /// Inverse of [`MultiIndex::rank`].
    pub fn from_rank(idx: usize) -> Self {
        // largest m with m(m+1)/2 <= idx
        let mut m = 0usize;
        while (m + 1) * (m + 2) / 2 <= idx {
            m += 1;
        }
        let y = idx - m * (m + 1) / 2;
        Self {
            x: (m - y) as u32,
            y: y as u32,
        }
    }
}

impl PartialOrd for MultiIndex {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MultiIndex {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Coordinate selector for partial derivatives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Var {
    X,
    Y,
}

/// `coef · x₁ˣ x₂ʸ`.
#[derive(Clone, Debug, PartialEq)]
pub struct Monomial<T: Coefficient = f64> {
    pub coef: T,
    pub idx: MultiIndex,
}

impl<T: Coefficient> Monomial<T> {
    pub fn new(coef: T, x: u32, y: u32) -> Self {
        Self {
            coef,
            idx: MultiIndex::new(x, y),
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coef.is_zero()
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.coef.to_f64() * x.powi(self.idx.x as i32) * y.powi(self.idx.y as i32)
    }

    /// Exact partial derivative; the zero monomial when the exponent is 0.
    pub fn partial_deriv(&self, var: Var) -> Self {
        let (e, idx) = match var {
            Var::X if self.idx.x > 0 => (self.idx.x, MultiIndex::new(self.idx.x - 1, self.idx.y)),
            Var::Y if self.idx.y > 0 => (self.idx.y, MultiIndex::new(self.idx.x, self.idx.y - 1)),
            _ => return Self::new(T::zero(), 0, 0),
        };
        Self {
            coef: self.coef.clone() * T::from_int(i64::from(e)),
            idx,
        }
    }

    /// Product of monomials: exponents add.
    pub fn times(&self, other: &Self) -> Self {
        Self {
            coef: self.coef.clone() * other.coef.clone(),
            idx: MultiIndex::new(self.idx.x + other.idx.x, self.idx.y + other.idx.y),
        }
    }
}

impl<T: Coefficient> Display for Monomial<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coef)?;
        match self.idx.x {
            0 => {}
            1 => write!(f, " x")?,
            e => write!(f, " x^{e}")?,
        }
        match self.idx.y {
            0 => {}
            1 => write!(f, " y")?,
            e => write!(f, " y^{e}")?,
        }
        Ok(())
    }
}
