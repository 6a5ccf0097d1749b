//! Spectral calculus on periodic boundary data.
//!
//! Each closed contour of a cell is sampled at `m` equispaced values of the
//! boundary parameter with spacing `h`, so data on it is periodic with period
//! `m · h`. Derivatives and antiderivatives are diagonal in Fourier space.
//!
//! Plans are built once per contour length and reused; the Nyquist mode is
//! dropped (its derivative is not real), and antiderivatives have zero mean.

use std::f64::consts::PI;
use std::ops::Range;
use std::sync::Arc;

use num::complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::{check_len, Result};

/// Forward/inverse plans for one contour.
struct ContourPlan {
    range: Range<usize>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

/// Per-contour FFT handler for a fixed boundary layout.
pub(crate) struct SpectralOps {
    h: f64,
    total: usize,
    plans: Vec<ContourPlan>,
}

impl std::fmt::Debug for SpectralOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralOps")
            .field("h", &self.h)
            .field("total", &self.total)
            .field("contours", &self.plans.len())
            .finish()
    }
}

impl SpectralOps {
    pub(crate) fn new(ranges: &[Range<usize>], h: f64) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let plans = ranges
            .iter()
            .map(|r| ContourPlan {
                range: r.clone(),
                forward: planner.plan_fft_forward(r.len()),
                inverse: planner.plan_fft_inverse(r.len()),
            })
            .collect();
        Self {
            h,
            total: ranges.last().map_or(0, |r| r.end),
            plans,
        }
    }

    /// Signed angular frequency of bin `k` on a contour of `m` samples;
    /// zero for the Nyquist bin.
    fn omega(&self, k: usize, m: usize) -> f64 {
        let period = m as f64 * self.h;
        let signed = if 2 * k < m {
            k as f64
        } else if 2 * k == m {
            return 0.0;
        } else {
            k as f64 - m as f64
        };
        2.0 * PI * signed / period
    }

    /// Applies the Fourier multiplier `mult(ω)` contour by contour.
    fn apply<F>(&self, vals: &[Complex64], mult: F) -> Result<Vec<Complex64>>
    where
        F: Fn(f64) -> Complex64,
    {
        check_len("periodic boundary data", self.total, vals.len())?;
        let mut out = vals.to_vec();
        for p in &self.plans {
            let buf = &mut out[p.range.clone()];
            let m = buf.len();
            p.forward.process(buf);
            for (k, c) in buf.iter_mut().enumerate() {
                *c *= mult(self.omega(k, m)) / m as f64;
            }
            p.inverse.process(buf);
        }
        Ok(out)
    }

    /// `d/dτ` of real data.
    pub(crate) fn derivative(&self, vals: &[f64]) -> Result<Vec<f64>> {
        let z: Vec<Complex64> = vals.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        Ok(self
            .apply(&z, |w| Complex64::new(0.0, w))?
            .into_iter()
            .map(|c| c.re)
            .collect())
    }

    /// Zero-mean antiderivative of complex data; the mean of the input is
    /// discarded.
    pub(crate) fn antiderivative(&self, vals: &[Complex64]) -> Result<Vec<Complex64>> {
        self.apply(vals, |w| {
            if w == 0.0 {
                Complex64::new(0.0, 0.0)
            } else {
                Complex64::new(0.0, -1.0 / w)
            }
        })
    }
}
