//! Oriented boundary edges and their sampled geometry.
//!
//! Purpose
//! - Turn a canonical [`Curve`] into samples on the true mesh: points, unit
//!   tangent, unit normal, `dx_norm = |x'| · wgt` and signed curvature.
//! - Provide the rigid transforms used to place the curve, with curvature
//!   bookkeeping (rotations keep it, reflections flip it, dilation by `α`
//!   divides it by `|α|`).
//!
//! Policy
//! - The normal is the tangent rotated by −90°, so it points to the right of
//!   travel; for a counterclockwise outer boundary that is outward.
//! - Every transform and reducer fails with `NotParameterized` before
//!   [`Edge::parameterize`] has run.
//! - Reducers take `ignore_endpoint` explicitly. With `true` they work on the
//!   `2n` unique samples (left Riemann sum); with `false` on all `2n + 1`
//!   (trapezoid).

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::{Matrix2, Vector2};

use crate::cfg::GEOM_TOL;
use crate::error::{check_len, Error, Result};
use crate::quad::{QuadDict, QuadKind};

use super::curves::Curve;
use super::vert::Vert;

/// Sampled geometry of a parameterized edge (all arrays length `2n + 1`).
#[derive(Clone, Debug)]
pub struct EdgeSamples {
    pub n: usize,
    pub x: Vec<Vector2<f64>>,
    pub tangent: Vec<Vector2<f64>>,
    pub normal: Vec<Vector2<f64>>,
    pub dx_norm: Vec<f64>,
    pub curvature: Vec<f64>,
}

impl EdgeSamples {
    #[inline]
    pub fn num_pts(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn h(&self) -> f64 {
        PI / self.n as f64
    }

    /// `t ↦ 2π − t`: reversed arrays, negated frame and curvature.
    fn flip(&mut self) {
        self.x.reverse();
        self.tangent.reverse();
        self.normal.reverse();
        self.dx_norm.reverse();
        self.curvature.reverse();
        for t in self.tangent.iter_mut().chain(self.normal.iter_mut()) {
            *t = -*t;
        }
        for k in self.curvature.iter_mut() {
            *k = -*k;
        }
    }

    fn refresh_normals(&mut self) {
        for (n, t) in self.normal.iter_mut().zip(&self.tangent) {
            *n = Vector2::new(t.y, -t.x);
        }
    }
}

/// Oriented curve between two vertices, or a loop around a hole.
#[derive(Clone, Debug)]
pub struct Edge {
    pub id: usize,
    pub anchor: Vert,
    pub endpnt: Vert,
    /// Cell on the left of travel (`None` on the mesh boundary).
    pub pos_cell_idx: Option<usize>,
    /// Cell on the right of travel (`None` on the mesh boundary).
    pub neg_cell_idx: Option<usize>,
    pub quad_kind: QuadKind,
    curve: Arc<dyn Curve>,
    /// Traversed against the curve's own direction.
    reversed: bool,
    samples: Option<EdgeSamples>,
}

impl Edge {
    /// Unparameterized edge with Kress quadrature and no adjacent cells.
    pub fn new(id: usize, anchor: Vert, endpnt: Vert, curve: Arc<dyn Curve>) -> Self {
        Self {
            id,
            anchor,
            endpnt,
            pos_cell_idx: None,
            neg_cell_idx: None,
            quad_kind: QuadKind::default(),
            curve,
            reversed: false,
            samples: None,
        }
    }

    pub fn with_cells(mut self, pos: Option<usize>, neg: Option<usize>) -> Self {
        self.pos_cell_idx = pos;
        self.neg_cell_idx = neg;
        self
    }

    pub fn with_quad(mut self, kind: QuadKind) -> Self {
        self.quad_kind = kind;
        self
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.anchor.id == self.endpnt.id
    }

    #[inline]
    pub fn is_on_mesh_boundary(&self) -> bool {
        self.pos_cell_idx.is_none() || self.neg_cell_idx.is_none()
    }

    #[inline]
    pub fn is_parameterized(&self) -> bool {
        self.samples.is_some()
    }

    pub fn curve(&self) -> &Arc<dyn Curve> {
        &self.curve
    }

    /// Sampled geometry, or `NotParameterized`.
    pub fn samples(&self) -> Result<&EdgeSamples> {
        self.samples
            .as_ref()
            .ok_or(Error::NotParameterized { action: "reading samples" })
    }

    fn samples_mut(&mut self, action: &'static str) -> Result<&mut EdgeSamples> {
        self.samples
            .as_mut()
            .ok_or(Error::NotParameterized { action })
    }

    /// Samples the curve with the rule matching `quad_kind`, then places it:
    /// loops are translated onto the anchor, other edges are joined to
    /// `anchor → endpnt`. An earlier [`Edge::reverse_orientation`] survives
    /// re-parameterization.
    ///
    /// Loop edges need a closed curve and open edges an open one.
    pub fn parameterize(&mut self, quad_dict: &QuadDict) -> Result<()> {
        if self.is_loop() != self.curve.is_closed() {
            return Err(Error::invalid(format!(
                "edge {} is {} but its curve is {}",
                self.id,
                if self.is_loop() { "a loop" } else { "open" },
                if self.curve.is_closed() { "closed" } else { "open" },
            )));
        }
        let q = quad_dict.get(self.quad_kind)?;
        let num_pts = q.num_pts();
        let mut s = EdgeSamples {
            n: q.n,
            x: Vec::with_capacity(num_pts),
            tangent: Vec::with_capacity(num_pts),
            normal: Vec::with_capacity(num_pts),
            dx_norm: Vec::with_capacity(num_pts),
            curvature: Vec::with_capacity(num_pts),
        };
        for (&t, &w) in q.t.iter().zip(&q.wgt) {
            let dx = self.curve.velocity(t);
            let dx2 = dx.norm_squared();
            if dx2 < GEOM_TOL * GEOM_TOL {
                return Err(Error::degenerate(format!(
                    "edge {} has a vanishing velocity at t = {t}",
                    self.id
                )));
            }
            let speed = dx2.sqrt();
            let tan = dx / speed;
            let nrm = Vector2::new(tan.y, -tan.x);
            s.x.push(self.curve.position(t));
            s.tangent.push(tan);
            s.normal.push(nrm);
            s.dx_norm.push(speed * w);
            s.curvature.push(self.curve.acceleration(t).dot(&nrm) / dx2);
        }
        self.samples = Some(s);
        if self.is_loop() {
            let a = self.anchor.pos();
            self.translate(a)?;
        } else if self.reversed {
            let (a, b) = (self.endpnt, self.anchor);
            self.join_points(a, b)?;
        } else {
            let (a, b) = (self.anchor, self.endpnt);
            self.join_points(a, b)?;
        }
        if self.reversed {
            self.samples_mut("reversing orientation")?.flip();
            std::mem::swap(&mut self.anchor, &mut self.endpnt);
        }
        Ok(())
    }

    /// Whether the edge runs against its curve's own direction.
    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Drops the sampled geometry.
    pub fn deparameterize(&mut self) {
        self.samples = None;
    }

    pub fn num_pts(&self) -> Result<usize> {
        Ok(self.samples()?.num_pts())
    }

    /// Sample coordinates `(x1, x2)`, all `2n + 1` points.
    pub fn get_sampled_points(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        let s = self.samples()?;
        Ok((
            s.x.iter().map(|p| p.x).collect(),
            s.x.iter().map(|p| p.y).collect(),
        ))
    }

    /// `(xmin, xmax, ymin, ymax)` of the samples.
    pub fn get_bounding_box(&self) -> Result<(f64, f64, f64, f64)> {
        let s = self.samples()?;
        Ok(bounding_box(&s.x))
    }

    // ---- transforms -------------------------------------------------------

    /// Traverses the curve backwards (`t ↦ 2π − t`), swapping the vertices
    /// and the adjacent cells so `pos_cell_idx` stays on the left.
    pub fn reverse_orientation(&mut self) -> Result<()> {
        self.samples_mut("reversing orientation")?.flip();
        std::mem::swap(&mut self.anchor, &mut self.endpnt);
        std::mem::swap(&mut self.pos_cell_idx, &mut self.neg_cell_idx);
        self.reversed = !self.reversed;
        Ok(())
    }

    /// Similarity map sending the first sample to `a` and the last to `b`.
    pub fn join_points(&mut self, a: Vert, b: Vert) -> Result<()> {
        let (x, y) = {
            let s = self.samples_mut("joining points")?;
            (s.x[0], s.x[s.x.len() - 1])
        };
        let ab = b.pos() - a.pos();
        if ab.norm() < GEOM_TOL {
            return Err(Error::degenerate("join_points needs distinct target points"));
        }
        let xy = y - x;
        if xy.norm() < GEOM_TOL {
            return Err(Error::degenerate("edge must have distinct endpoints to be joined"));
        }
        self.translate(-x)?;
        let theta = (ab.y.atan2(ab.x) - xy.y.atan2(xy.x)).to_degrees();
        self.rotate(theta)?;
        self.dilate(ab.norm() / xy.norm())?;
        self.translate(a.pos())?;
        self.anchor = a;
        self.endpnt = b;
        Ok(())
    }

    pub fn translate(&mut self, a: Vector2<f64>) -> Result<()> {
        let s = self.samples_mut("translating")?;
        for p in s.x.iter_mut() {
            *p += a;
        }
        Ok(())
    }

    /// Scales by `alpha`. A negative factor is a point reflection composed
    /// with a dilation by `|alpha|`.
    pub fn dilate(&mut self, alpha: f64) -> Result<()> {
        let s = self.samples_mut("dilating")?;
        if alpha.abs() < GEOM_TOL {
            return Err(Error::invalid("dilation factor must be nonzero"));
        }
        let mag = alpha.abs();
        for p in s.x.iter_mut() {
            *p *= alpha;
        }
        for w in s.dx_norm.iter_mut() {
            *w *= mag;
        }
        for k in s.curvature.iter_mut() {
            *k /= mag;
        }
        if alpha < 0.0 {
            for t in s.tangent.iter_mut() {
                *t = -*t;
            }
            s.refresh_normals();
        }
        Ok(())
    }

    /// Counterclockwise rotation by `theta` degrees.
    pub fn rotate(&mut self, theta: f64) -> Result<()> {
        if self.samples.is_none() {
            return Err(Error::NotParameterized { action: "rotating" });
        }
        if theta % 360.0 == 0.0 {
            return Ok(());
        }
        let (s, c) = theta.to_radians().sin_cos();
        self.apply_orthogonal_transformation(Matrix2::new(c, -s, s, c))
    }

    pub fn reflect_across_x_axis(&mut self) -> Result<()> {
        if self.samples.is_none() {
            return Err(Error::NotParameterized {
                action: "reflecting across the x axis",
            });
        }
        self.apply_orthogonal_transformation(Matrix2::new(1.0, 0.0, 0.0, -1.0))
    }

    pub fn reflect_across_y_axis(&mut self) -> Result<()> {
        if self.samples.is_none() {
            return Err(Error::NotParameterized {
                action: "reflecting across the y axis",
            });
        }
        self.apply_orthogonal_transformation(Matrix2::new(-1.0, 0.0, 0.0, 1.0))
    }

    /// `x ↦ A x` for orthogonal `A`; curvature flips when `det A < 0`.
    pub fn apply_orthogonal_transformation(&mut self, a: Matrix2<f64>) -> Result<()> {
        let s = self.samples_mut("applying an orthogonal transformation")?;
        if (a.transpose() * a - Matrix2::identity()).norm() > GEOM_TOL {
            return Err(Error::invalid("transformation matrix must be orthogonal"));
        }
        for p in s.x.iter_mut() {
            *p = a * *p;
        }
        for t in s.tangent.iter_mut() {
            *t = a * *t;
        }
        s.refresh_normals();
        if a.determinant() < 0.0 {
            for k in s.curvature.iter_mut() {
                *k = -*k;
            }
        }
        Ok(())
    }

    // ---- reducers ---------------------------------------------------------

    fn active_len(s: &EdgeSamples, ignore_endpoint: bool) -> usize {
        if ignore_endpoint {
            s.num_pts() - 1
        } else {
            s.num_pts()
        }
    }

    /// `f` evaluated at the sample points.
    pub fn evaluate_function<F>(&self, f: F, ignore_endpoint: bool) -> Result<Vec<f64>>
    where
        F: Fn(Vector2<f64>) -> f64,
    {
        let s = self.samples()?;
        let m = Self::active_len(s, ignore_endpoint);
        Ok(s.x[..m].iter().map(|&p| f(p)).collect())
    }

    pub fn multiply_by_dx_norm(&self, vals: &[f64], ignore_endpoint: bool) -> Result<Vec<f64>> {
        let s = self.samples()?;
        let m = Self::active_len(s, ignore_endpoint);
        check_len("edge values", m, vals.len())?;
        Ok(vals.iter().zip(&s.dx_norm).map(|(v, w)| v * w).collect())
    }

    pub fn dot_with_tangent(
        &self,
        v1: &[f64],
        v2: &[f64],
        ignore_endpoint: bool,
    ) -> Result<Vec<f64>> {
        let s = self.samples()?;
        dot_with(&s.tangent, v1, v2, Self::active_len(s, ignore_endpoint))
    }

    pub fn dot_with_normal(
        &self,
        v1: &[f64],
        v2: &[f64],
        ignore_endpoint: bool,
    ) -> Result<Vec<f64>> {
        let s = self.samples()?;
        dot_with(&s.normal, v1, v2, Self::active_len(s, ignore_endpoint))
    }

    /// `∫_e f ds`.
    pub fn integrate_over_edge(&self, vals: &[f64], ignore_endpoint: bool) -> Result<f64> {
        let w = self.multiply_by_dx_norm(vals, ignore_endpoint)?;
        self.integrate_over_edge_preweighted(&w, ignore_endpoint)
    }

    /// `∫ g dτ` where `g` already carries the `dx_norm` factor.
    pub fn integrate_over_edge_preweighted(
        &self,
        vals_dx_norm: &[f64],
        ignore_endpoint: bool,
    ) -> Result<f64> {
        let s = self.samples()?;
        let m = Self::active_len(s, ignore_endpoint);
        check_len("edge values", m, vals_dx_norm.len())?;
        let h = s.h();
        if ignore_endpoint {
            Ok(h * vals_dx_norm.iter().sum::<f64>())
        } else {
            let inner: f64 = vals_dx_norm[1..m - 1].iter().sum();
            Ok(h * (0.5 * (vals_dx_norm[0] + vals_dx_norm[m - 1]) + inner))
        }
    }
}

fn dot_with(field: &[Vector2<f64>], v1: &[f64], v2: &[f64], m: usize) -> Result<Vec<f64>> {
    check_len("first vector component", m, v1.len())?;
    check_len("second vector component", m, v2.len())?;
    Ok(field[..m]
        .iter()
        .zip(v1.iter().zip(v2))
        .map(|(u, (a, b))| a * u.x + b * u.y)
        .collect())
}

pub(crate) fn bounding_box(pts: &[Vector2<f64>]) -> (f64, f64, f64, f64) {
    pts.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
    )
}
