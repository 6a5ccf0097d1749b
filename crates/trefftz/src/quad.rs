//! One-dimensional quadrature on the periodic parameter interval `[0, 2π]`.
//!
//! Purpose
//! - Produce parameter nodes `t` and derivative weights `wgt` (both of length
//!   `2n + 1`) so that boundary integrals become trapezoidal sums
//!   `Σ h · wgt[i] · f(t[i]) · |x'(t[i])|` in the reparameterized variable.
//! - Three rules: uniform trapezoid, Kress corner grading, Martensen weights.
//!
//! Conventions
//! - `h = π / n`; the last node duplicates the first under periodicity.
//! - Edges carry a `QuadKind` tag and resolve it against a `QuadDict` once,
//!   during parameterization.
//!
//! References
//! - R. Kress, A Nyström method for boundary integral equations in domains
//!   with corners, Numer. Math. 58 (1990).
//! - E. Martensen, Acta Math. 109 (1963).

use std::f64::consts::PI;

use crate::cfg::{MAX_DECIMATION, MIN_QUAD_N};
use crate::error::{Error, Result};

/// Quadrature variant tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QuadKind {
    /// Uniform trapezoid rule (identity weighting).
    Trap,
    /// Kress grading for edges terminating at corners.
    #[default]
    Kress,
    /// Martensen (Fourier) weights.
    Martensen,
}

/// Sampled quadrature rule.
#[derive(Clone, Debug)]
pub struct Quad {
    pub kind: QuadKind,
    /// Interval sampled at `2n` points, excluding the last endpoint.
    pub n: usize,
    /// Sample spacing in the reparameterized variable.
    pub h: f64,
    /// Parameter nodes, length `2n + 1`.
    pub t: Vec<f64>,
    /// Derivative of the node map, length `2n + 1`.
    pub wgt: Vec<f64>,
}

impl Quad {
    /// Trapezoid rule. Technically a left sum; all integrands are periodic.
    pub fn trap(n: usize) -> Result<Self> {
        check_n(n)?;
        Ok(Self::trap_nodes(n))
    }

    /// Kress rule with grading parameter `p >= 2`.
    ///
    /// With `s = t/π - 1` and `c = (1/2 - 1/p) s³ + s/p + 1/2`, nodes are
    /// `2π cᵖ / (cᵖ + (1-c)ᵖ)`. The weight is the exact derivative of that
    /// map, so it vanishes to order `p - 1` at both corners.
    pub fn kress(n: usize, p: u32) -> Result<Self> {
        check_n(n)?;
        if p < 2 {
            return Err(Error::invalid("Kress parameter p must be at least 2"));
        }
        Ok(Self::kress_nodes(n, p))
    }

    fn trap_nodes(n: usize) -> Self {
        Self {
            kind: QuadKind::Trap,
            n,
            h: PI / n as f64,
            t: linspace_2pi(n),
            wgt: vec![1.0; 2 * n + 1],
        }
    }

    fn kress_nodes(n: usize, p: u32) -> Self {
        let pf = f64::from(p);
        let mut t = linspace_2pi(n);
        let mut wgt = Vec::with_capacity(t.len());
        for ti in t.iter_mut() {
            let s = *ti / PI - 1.0;
            let s2 = s * s;
            let c = (0.5 - 1.0 / pf) * s * s2 + s / pf + 0.5;
            let cp = c.powi(p as i32);
            let denom = cp + (1.0 - c).powi(p as i32);
            *ti = 2.0 * PI * cp / denom;
            wgt.push(
                (3.0 * (pf - 2.0) * s2 + 2.0) * (c * (1.0 - c)).powi(p as i32 - 1)
                    / (denom * denom),
            );
        }
        Self {
            kind: QuadKind::Kress,
            n,
            h: PI / n as f64,
            t,
            wgt,
        }
    }

    /// Martensen rule: `wgt = (1/2n) Σ_{m=1..n} cos(m t)/m`, `t ← 4 sin²(t/2)`.
    pub fn martensen(n: usize) -> Result<Self> {
        check_n(n)?;
        let mut t = linspace_2pi(n);
        let scale = 0.5 / n as f64;
        let wgt = t
            .iter()
            .map(|&ti| {
                let sum: f64 = (1..=n).map(|m| (m as f64 * ti).cos() / m as f64).sum();
                scale * sum
            })
            .collect();
        for ti in t.iter_mut() {
            let half = 2.0 * (0.5 * *ti).sin();
            *ti = half * half;
        }
        Ok(Self {
            kind: QuadKind::Martensen,
            n,
            h: PI / n as f64,
            t,
            wgt,
        })
    }

    /// Number of samples, `2n + 1`.
    #[inline]
    pub fn num_pts(&self) -> usize {
        2 * self.n + 1
    }
}

fn check_n(n: usize) -> Result<()> {
    if n < MIN_QUAD_N {
        return Err(Error::invalid(format!(
            "quadrature parameter n must be at least {MIN_QUAD_N}, got {n}"
        )));
    }
    Ok(())
}

fn linspace_2pi(n: usize) -> Vec<f64> {
    let h = PI / n as f64;
    (0..=2 * n).map(|i| i as f64 * h).collect()
}

/// The quadrature configuration handed to a parameterization pass.
#[derive(Clone, Debug)]
pub struct QuadDict {
    /// Validated decimation factor; `n / interp` is the coarse resolution.
    pub interp: usize,
    pub trap: Quad,
    pub kress: Quad,
}

impl QuadDict {
    /// `n`: half the samples per edge; `p`: Kress parameter; `interp`: a
    /// decimation factor dividing `n` (1 means none).
    pub fn new(n: usize, p: u32, interp: usize) -> Result<Self> {
        check_interp(interp, n)?;
        Ok(Self {
            interp,
            trap: Quad::trap(n)?,
            kress: Quad::kress(n, p)?,
        })
    }

    /// Full resolution rule for an edge's tag.
    pub fn get(&self, kind: QuadKind) -> Result<&Quad> {
        match kind {
            QuadKind::Trap => Ok(&self.trap),
            QuadKind::Kress => Ok(&self.kress),
            QuadKind::Martensen => Err(Error::invalid(
                "Martensen weights are not an edge parameterization",
            )),
        }
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.trap.n
    }
}

/// `n = 16`, `p = 7`, no decimation.
impl Default for QuadDict {
    fn default() -> Self {
        Self {
            interp: 1,
            trap: Quad::trap_nodes(16),
            kress: Quad::kress_nodes(16, 7),
        }
    }
}

fn check_interp(interp: usize, n: usize) -> Result<()> {
    const MSG: &str = "interp must be an integer dividing n such that n / interp >= 4";
    if interp < 1 || n % interp != 0 || n / interp < MIN_QUAD_N {
        return Err(Error::invalid(MSG));
    }
    if n / interp > MAX_DECIMATION {
        tracing::warn!(
            n,
            interp,
            "n > {MAX_DECIMATION} * interp may cause numerical instability"
        );
    }
    Ok(())
}
