//! Consolidated bivariate polynomials.
//!
//! Invariant: every `Polynomial` is consolidated, i.e. each multi-index
//! appears at most once, no coefficient is zero, and terms are sorted by
//! rank. Structural equality (`==`) is therefore polynomial equality.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use num::rational::Rational64;

use super::monomial::{Coefficient, Monomial, MultiIndex, Var};

/// Sum of monomials with coefficients in `T`.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial<T: Coefficient = f64> {
    monos: Vec<Monomial<T>>,
}

impl<T: Coefficient> Default for Polynomial<T> {
    fn default() -> Self {
        Self { monos: Vec::new() }
    }
}

impl<T: Coefficient> Polynomial<T> {
    /// Builds `Σ c · xᵃ yᵇ` from `(c, a, b)` triples.
    pub fn new(terms: impl IntoIterator<Item = (T, u32, u32)>) -> Self {
        Self::from_monomials(terms.into_iter().map(|(c, a, b)| Monomial::new(c, a, b)))
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: T) -> Self {
        Self::new([(c, 0, 0)])
    }

    /// Single monomial `c · m` where `m` is the monomial of the given rank.
    pub fn from_rank(coef: T, idx: usize) -> Self {
        let m = MultiIndex::from_rank(idx);
        Self::new([(coef, m.x, m.y)])
    }

    pub fn from_monomials(monos: impl IntoIterator<Item = Monomial<T>>) -> Self {
        let mut p = Self {
            monos: monos.into_iter().collect(),
        };
        p.consolidate();
        p
    }

    fn consolidate(&mut self) {
        self.monos.sort_by_key(|m| m.idx.rank());
        let mut merged: Vec<Monomial<T>> = Vec::with_capacity(self.monos.len());
        for m in self.monos.drain(..) {
            match merged.last_mut() {
                Some(last) if last.idx == m.idx => last.coef = last.coef.clone() + m.coef,
                _ => merged.push(m),
            }
        }
        merged.retain(|m| !m.is_zero());
        self.monos = merged;
    }

    #[inline]
    pub fn monomials(&self) -> &[Monomial<T>] {
        &self.monos
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.monos.is_empty()
    }

    /// Total degree; `None` for the zero polynomial.
    pub fn degree(&self) -> Option<u32> {
        self.monos.iter().map(|m| m.idx.order()).max()
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.monos.iter().map(|m| m.eval(x, y)).sum()
    }

    /// Pointwise evaluation; `x` and `y` are zipped.
    pub fn eval_slice(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter().zip(y).map(|(&a, &b)| self.eval(a, b)).collect()
    }

    pub fn partial_deriv(&self, var: Var) -> Self {
        Self::from_monomials(self.monos.iter().map(|m| m.partial_deriv(var)))
    }

    pub fn grad(&self) -> (Self, Self) {
        (self.partial_deriv(Var::X), self.partial_deriv(Var::Y))
    }

    pub fn laplacian(&self) -> Self {
        let xx = self.partial_deriv(Var::X).partial_deriv(Var::X);
        let yy = self.partial_deriv(Var::Y).partial_deriv(Var::Y);
        xx + yy
    }

    /// A right inverse of the Laplacian: `anti_laplacian(p).laplacian() == p`.
    ///
    /// For a monomial `m` of order `d`, with `r² = x² + y²`,
    ///
    /// `A[m] = Σ_{k=0}^{⌊d/2⌋} s_k · r^{2(k+1)} · Δᵏ m`,
    /// `s_0 = 1 / (4(d+1))`, `s_k = -s_{k-1} / (4(k+1)(d+1-k))`.
    ///
    /// The sum stops because `Δᵏ m = 0` for `2k > d`.
    pub fn anti_laplacian(&self) -> Self {
        let r2 = Self::new([(T::one(), 2, 0), (T::one(), 0, 2)]);
        let mut out = Self::zero();
        for m in &self.monos {
            let d = i64::from(m.idx.order());
            let mut scale = T::one() / T::from_int(4 * (d + 1));
            let mut lap_k = Self::from_monomials([m.clone()]);
            let mut r_pow = r2.clone();
            for k in 0..=d / 2 {
                if k > 0 {
                    scale = -scale / T::from_int(4 * (k + 1) * (d + 1 - k));
                    lap_k = lap_k.laplacian();
                    r_pow = &r_pow * &r2;
                }
                out += &(&r_pow * &lap_k).scale(&scale);
            }
        }
        out
    }

    /// `self^n` with `p^0 = 1`.
    pub fn pow(&self, n: u32) -> Self {
        let mut acc = Self::constant(T::one());
        let mut base = self.clone();
        let mut e = n;
        while e > 0 {
            if e & 1 == 1 {
                acc = &acc * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        acc
    }

    /// Substitution `p(q1(x, y), q2(x, y))`.
    pub fn compose(&self, q1: &Self, q2: &Self) -> Self {
        let mut out = Self::zero();
        for m in &self.monos {
            let term = &q1.pow(m.idx.x) * &q2.pow(m.idx.y);
            out += &term.scale(&m.coef);
        }
        out
    }

    /// Multiplies every coefficient by `c`.
    pub fn scale(&self, c: &T) -> Self {
        Self::from_monomials(self.monos.iter().map(|m| Monomial {
            coef: m.coef.clone() * c.clone(),
            idx: m.idx,
        }))
    }

    /// Converts coefficients to `f64`.
    pub fn to_f64(&self) -> Polynomial<f64> {
        Polynomial::from_monomials(self.monos.iter().map(|m| Monomial {
            coef: m.coef.to_f64(),
            idx: m.idx,
        }))
    }
}

impl Polynomial<Rational64> {
    /// Integer-coefficient polynomial, handy for exact tests.
    pub fn from_ints(terms: impl IntoIterator<Item = (i64, u32, u32)>) -> Self {
        Self::new(
            terms
                .into_iter()
                .map(|(c, a, b)| (Rational64::from_integer(c), a, b)),
        )
    }
}

impl<T: Coefficient> fmt::Display for Polynomial<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.monos.is_empty() {
            return write!(f, "0");
        }
        for (i, m) in self.monos.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

// Arithmetic. The by-reference forms do the work; the owned forms forward.

impl<'a, T: Coefficient> Add<&'a Polynomial<T>> for &'a Polynomial<T> {
    type Output = Polynomial<T>;
    fn add(self, rhs: &'a Polynomial<T>) -> Polynomial<T> {
        Polynomial::from_monomials(self.monos.iter().chain(&rhs.monos).cloned())
    }
}

impl<'a, T: Coefficient> Sub<&'a Polynomial<T>> for &'a Polynomial<T> {
    type Output = Polynomial<T>;
    fn sub(self, rhs: &'a Polynomial<T>) -> Polynomial<T> {
        Polynomial::from_monomials(self.monos.iter().cloned().chain(rhs.monos.iter().map(|m| {
            Monomial {
                coef: -m.coef.clone(),
                idx: m.idx,
            }
        })))
    }
}

impl<'a, T: Coefficient> Mul<&'a Polynomial<T>> for &'a Polynomial<T> {
    type Output = Polynomial<T>;
    fn mul(self, rhs: &'a Polynomial<T>) -> Polynomial<T> {
        Polynomial::from_monomials(
            self.monos
                .iter()
                .flat_map(|a| rhs.monos.iter().map(move |b| a.times(b))),
        )
    }
}

impl<T: Coefficient> Neg for &Polynomial<T> {
    type Output = Polynomial<T>;
    fn neg(self) -> Polynomial<T> {
        self.scale(&-T::one())
    }
}

impl<T: Coefficient> Neg for Polynomial<T> {
    type Output = Polynomial<T>;
    fn neg(self) -> Polynomial<T> {
        -&self
    }
}

macro_rules! forward_owned_binop {
    ($Trait:ident, $method:ident) => {
        impl<T: Coefficient> $Trait for Polynomial<T> {
            type Output = Polynomial<T>;
            fn $method(self, rhs: Polynomial<T>) -> Polynomial<T> {
                (&self).$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl<T: Coefficient> AddAssign<&Polynomial<T>> for Polynomial<T> {
    fn add_assign(&mut self, rhs: &Polynomial<T>) {
        *self = &*self + rhs;
    }
}

impl<T: Coefficient> SubAssign<&Polynomial<T>> for Polynomial<T> {
    fn sub_assign(&mut self, rhs: &Polynomial<T>) {
        *self = &*self - rhs;
    }
}

macro_rules! scalar_ops {
    ($($T:ty),*) => {$(
        impl Mul<$T> for Polynomial<$T> {
            type Output = Polynomial<$T>;
            fn mul(self, rhs: $T) -> Polynomial<$T> {
                self.scale(&rhs)
            }
        }
        impl Mul<Polynomial<$T>> for $T {
            type Output = Polynomial<$T>;
            fn mul(self, rhs: Polynomial<$T>) -> Polynomial<$T> {
                rhs.scale(&self)
            }
        }
        impl Div<$T> for Polynomial<$T> {
            type Output = Polynomial<$T>;
            fn div(self, rhs: $T) -> Polynomial<$T> {
                let inv = <$T as num::One>::one() / rhs;
                self.scale(&inv)
            }
        }
    )*};
}

scalar_ops!(f64, Rational64);
