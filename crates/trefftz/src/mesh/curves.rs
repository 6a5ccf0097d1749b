//! Analytic curve families.
//!
//! Purpose
//! - Supply `position`, `velocity` and `acceleration` on `t ∈ [0, 2π]` for
//!   each shape an edge can take. Edges never branch on the family; they
//!   call through `dyn Curve`.
//!
//! Conventions
//! - Open curves live in a canonical frame running from `(0, 0)` to `(1, 0)`;
//!   the edge maps them onto their vertices with a similarity transform.
//! - Closed curves are traversed counterclockwise around the origin; a loop
//!   edge translates the origin onto its anchor.
//! - New families implement [`Curve`]; nothing is looked up by name.

use std::f64::consts::PI;
use std::fmt::Debug;

use nalgebra::Vector2;

use crate::error::{Error, Result};

/// Parameterized plane curve on `[0, 2π]`.
pub trait Curve: Debug + Send + Sync {
    fn position(&self, t: f64) -> Vector2<f64>;
    fn velocity(&self, t: f64) -> Vector2<f64>;
    fn acceleration(&self, t: f64) -> Vector2<f64>;

    /// Whether `position(0) == position(2π)` by construction.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Straight segment `(0, 0) → (1, 0)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Line;

impl Curve for Line {
    fn position(&self, t: f64) -> Vector2<f64> {
        Vector2::new(t / (2.0 * PI), 0.0)
    }
    fn velocity(&self, _t: f64) -> Vector2<f64> {
        Vector2::new(1.0 / (2.0 * PI), 0.0)
    }
    fn acceleration(&self, _t: f64) -> Vector2<f64> {
        Vector2::zeros()
    }
}

/// `x = t/2π`, `y = amp · sin(freq · t/2)`; an integer `freq` keeps both
/// endpoints on the x-axis.
#[derive(Clone, Copy, Debug)]
pub struct SineWave {
    amp: f64,
    freq: u32,
}

impl SineWave {
    pub fn new(amp: f64, freq: u32) -> Result<Self> {
        if !amp.is_finite() {
            return Err(Error::invalid("sine wave amplitude must be finite"));
        }
        Ok(Self { amp, freq })
    }
}

impl Curve for SineWave {
    fn position(&self, t: f64) -> Vector2<f64> {
        let w = 0.5 * f64::from(self.freq);
        Vector2::new(t / (2.0 * PI), self.amp * (w * t).sin())
    }
    fn velocity(&self, t: f64) -> Vector2<f64> {
        let w = 0.5 * f64::from(self.freq);
        Vector2::new(1.0 / (2.0 * PI), self.amp * w * (w * t).cos())
    }
    fn acceleration(&self, t: f64) -> Vector2<f64> {
        let w = 0.5 * f64::from(self.freq);
        Vector2::new(0.0, -self.amp * w * w * (w * t).sin())
    }
}

/// Circular arc over the chord `(0, 0) → (1, 0)` subtending `theta0`
/// degrees, bulging to the right of the direction of travel.
#[derive(Clone, Copy, Debug)]
pub struct CircularArcDeg {
    radius: f64,
    center: Vector2<f64>,
    alpha0: f64,
    omega: f64,
}

impl CircularArcDeg {
    /// `theta0` must lie in `(0, 360)`.
    pub fn new(theta0: f64) -> Result<Self> {
        if !(theta0 > 0.0 && theta0 < 360.0) {
            return Err(Error::invalid(format!(
                "arc angle must lie strictly between 0 and 360 degrees, got {theta0}"
            )));
        }
        let th = theta0.to_radians();
        let half = 0.5 * th;
        let radius = 0.5 / half.sin();
        Ok(Self {
            radius,
            center: Vector2::new(0.5, radius * half.cos()),
            alpha0: 1.5 * PI - half,
            omega: th / (2.0 * PI),
        })
    }

    #[inline]
    fn angle(&self, t: f64) -> f64 {
        self.alpha0 + self.omega * t
    }
}

impl Curve for CircularArcDeg {
    fn position(&self, t: f64) -> Vector2<f64> {
        let a = self.angle(t);
        self.center + self.radius * Vector2::new(a.cos(), a.sin())
    }
    fn velocity(&self, t: f64) -> Vector2<f64> {
        let a = self.angle(t);
        self.radius * self.omega * Vector2::new(-a.sin(), a.cos())
    }
    fn acceleration(&self, t: f64) -> Vector2<f64> {
        let a = self.angle(t);
        -self.radius * self.omega * self.omega * Vector2::new(a.cos(), a.sin())
    }
}

/// Axis-aligned ellipse centred at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Ellipse {
    a: f64,
    b: f64,
}

impl Ellipse {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !(a > 0.0 && b > 0.0) {
            return Err(Error::invalid("ellipse semi-axes must be positive"));
        }
        Ok(Self { a, b })
    }
}

impl Curve for Ellipse {
    fn position(&self, t: f64) -> Vector2<f64> {
        Vector2::new(self.a * t.cos(), self.b * t.sin())
    }
    fn velocity(&self, t: f64) -> Vector2<f64> {
        Vector2::new(-self.a * t.sin(), self.b * t.cos())
    }
    fn acceleration(&self, t: f64) -> Vector2<f64> {
        Vector2::new(-self.a * t.cos(), -self.b * t.sin())
    }
    fn is_closed(&self) -> bool {
        true
    }
}

/// Circle centred at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Circle {
    inner: Ellipse,
}

impl Circle {
    pub fn new(radius: f64) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(Error::invalid("circle radius must be positive"));
        }
        Ok(Self {
            inner: Ellipse {
                a: radius,
                b: radius,
            },
        })
    }
}

impl Curve for Circle {
    fn position(&self, t: f64) -> Vector2<f64> {
        self.inner.position(t)
    }
    fn velocity(&self, t: f64) -> Vector2<f64> {
        self.inner.velocity(t)
    }
    fn acceleration(&self, t: f64) -> Vector2<f64> {
        self.inner.acceleration(t)
    }
    fn is_closed(&self) -> bool {
        true
    }
}
