//! Mesh cells: a closed outer contour with zero or more holes.
//!
//! Purpose
//! - Own the edges bounding one cell, orient them so the cell lies on the
//!   left of travel, chain them into contours and expose the boundary as one
//!   sampled array (outer contour first, then each hole).
//! - Provide the boundary reducers and the interior evaluation grid used by
//!   local functions.
//!
//! Policy
//! - Boundary arrays hold only the `2n` unique samples per edge; the shared
//!   endpoint of consecutive edges appears once.
//! - The outer contour is the unique contour with positive signed area after
//!   orientation. Anything else is a degenerate cell.
//! - All edges of a cell share the same `n` (one `QuadDict` per pass).

use std::ops::Range;

use nalgebra::{DMatrix, Vector2};

use crate::cfg::{GridCfg, GEOM_TOL};
use crate::error::{check_len, Error, Result};
use crate::quad::QuadDict;

use super::edge::{bounding_box, Edge};

/// Samples per axis when searching a hole for an interior reference point.
const HOLE_SEARCH_RES: usize = 41;

/// Boundary geometry produced by [`MeshCell::parameterize`].
#[derive(Clone, Debug)]
struct CellGeometry {
    h: f64,
    x1: Vec<f64>,
    x2: Vec<f64>,
    t1: Vec<f64>,
    t2: Vec<f64>,
    n1: Vec<f64>,
    n2: Vec<f64>,
    dx_norm: Vec<f64>,
    component_ranges: Vec<Range<usize>>,
    edge_ranges: Vec<Range<usize>>,
    hole_points: Vec<Vector2<f64>>,
    int_x1: DMatrix<f64>,
    int_x2: DMatrix<f64>,
    is_inside: DMatrix<bool>,
}

/// A (possibly punctured) curvilinear mesh cell.
#[derive(Clone, Debug)]
pub struct MeshCell {
    pub id: usize,
    edges: Vec<Edge>,
    /// Edge count per contour, in traversal order (outer first).
    contour_sizes: Vec<usize>,
    grid: GridCfg,
    geom: Option<CellGeometry>,
}

impl MeshCell {
    /// `edges` may come in any order and orientation; each must have this
    /// cell on one of its sides.
    pub fn new(id: usize, edges: Vec<Edge>) -> Result<Self> {
        if edges.is_empty() {
            return Err(Error::invalid("a mesh cell needs at least one edge"));
        }
        if let Some(e) = edges
            .iter()
            .find(|e| e.pos_cell_idx != Some(id) && e.neg_cell_idx != Some(id))
        {
            return Err(Error::invalid(format!(
                "edge {} is not adjacent to cell {id}",
                e.id
            )));
        }
        Ok(Self {
            id,
            edges,
            contour_sizes: Vec::new(),
            grid: GridCfg::default(),
            geom: None,
        })
    }

    pub fn with_grid(mut self, grid: GridCfg) -> Self {
        self.grid = grid;
        self
    }

    #[inline]
    pub fn grid(&self) -> GridCfg {
        self.grid
    }

    fn geom(&self, action: &'static str) -> Result<&CellGeometry> {
        self.geom.as_ref().ok_or(Error::NotParameterized { action })
    }

    #[inline]
    pub fn is_parameterized(&self) -> bool {
        self.geom.is_some()
    }

    /// Parameterizes and orients every edge, then builds the boundary arrays
    /// and the interior grid.
    pub fn parameterize(&mut self, quad_dict: &QuadDict) -> Result<()> {
        self.geom = None;
        for e in self.edges.iter_mut() {
            e.parameterize(quad_dict)?;
            if e.neg_cell_idx == Some(self.id) && e.pos_cell_idx != Some(self.id) {
                e.reverse_orientation()?;
            }
        }
        let n = self.edges[0].samples()?.n;
        if let Some(e) = self.edges.iter().find(|e| e.samples().map(|s| s.n).ok() != Some(n)) {
            return Err(Error::invalid(format!(
                "edge {} uses a different sample count than the rest of cell {}",
                e.id, self.id
            )));
        }

        let contours = chain_contours(&self.edges)?;
        let areas: Vec<f64> = contours
            .iter()
            .map(|c| contour_points(&self.edges, c).map(|p| signed_area(&p)))
            .collect::<Result<_>>()?;
        let outer: Vec<usize> = (0..contours.len()).filter(|&i| areas[i] > 0.0).collect();
        let outer = match outer.as_slice() {
            [i] => *i,
            [] => return Err(Error::degenerate("cell has no positively oriented contour")),
            _ => return Err(Error::degenerate("cell has more than one outer contour")),
        };
        let mut ordered = vec![contours[outer].clone()];
        ordered.extend(
            contours
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != outer)
                .map(|(_, c)| c.clone()),
        );

        let mut taken: Vec<Option<Edge>> = self.edges.drain(..).map(Some).collect();
        let mut edges = Vec::with_capacity(taken.len());
        for &i in ordered.iter().flatten() {
            if let Some(e) = taken[i].take() {
                edges.push(e);
            }
        }
        self.edges = edges;
        self.contour_sizes = ordered.iter().map(Vec::len).collect();

        let geom = self.build_geometry(n)?;
        tracing::debug!(
            cell = self.id,
            num_edges = self.edges.len(),
            num_holes = geom.hole_points.len(),
            num_pts = geom.x1.len(),
            "parameterized mesh cell"
        );
        self.geom = Some(geom);
        Ok(())
    }

    fn build_geometry(&self, n: usize) -> Result<CellGeometry> {
        let mut g = CellGeometry {
            h: std::f64::consts::PI / n as f64,
            x1: Vec::new(),
            x2: Vec::new(),
            t1: Vec::new(),
            t2: Vec::new(),
            n1: Vec::new(),
            n2: Vec::new(),
            dx_norm: Vec::new(),
            component_ranges: Vec::new(),
            edge_ranges: Vec::new(),
            hole_points: Vec::new(),
            int_x1: DMatrix::zeros(0, 0),
            int_x2: DMatrix::zeros(0, 0),
            is_inside: DMatrix::from_element(0, 0, false),
        };
        let mut polygons: Vec<Vec<Vector2<f64>>> = Vec::new();
        let mut e_idx = 0;
        for &size in &self.contour_sizes {
            let c_start = g.x1.len();
            let mut poly = Vec::new();
            for e in &self.edges[e_idx..e_idx + size] {
                let s = e.samples()?;
                let m = s.num_pts() - 1;
                let start = g.x1.len();
                for i in 0..m {
                    g.x1.push(s.x[i].x);
                    g.x2.push(s.x[i].y);
                    g.t1.push(s.tangent[i].x);
                    g.t2.push(s.tangent[i].y);
                    g.n1.push(s.normal[i].x);
                    g.n2.push(s.normal[i].y);
                    g.dx_norm.push(s.dx_norm[i]);
                }
                poly.extend_from_slice(&s.x[..m]);
                g.edge_ranges.push(start..g.x1.len());
            }
            g.component_ranges.push(c_start..g.x1.len());
            polygons.push(poly);
            e_idx += size;
        }

        e_idx = self.contour_sizes[0];
        for (k, &size) in self.contour_sizes.iter().enumerate().skip(1) {
            let first = &self.edges[e_idx];
            let xi = if size == 1 && first.is_loop() {
                first.anchor.pos()
            } else {
                deepest_point(&polygons[k])?
            };
            g.hole_points.push(xi);
            e_idx += size;
        }

        let (xmin, xmax, ymin, ymax) = bounding_box(&polygons[0]);
        let (rows, cols) = (self.grid.rows, self.grid.cols);
        let step = |lo: f64, hi: f64, k: usize, m: usize| {
            if m > 1 {
                lo + (hi - lo) * k as f64 / (m - 1) as f64
            } else {
                0.5 * (lo + hi)
            }
        };
        g.int_x1 = DMatrix::from_fn(rows, cols, |_, j| step(xmin, xmax, j, cols));
        g.int_x2 = DMatrix::from_fn(rows, cols, |i, _| step(ymin, ymax, i, rows));
        g.is_inside = DMatrix::from_fn(rows, cols, |i, j| {
            let p = Vector2::new(g.int_x1[(i, j)], g.int_x2[(i, j)]);
            point_in_polygon(p, &polygons[0])
                && polygons[1..].iter().all(|hole| !point_in_polygon(p, hole))
                && polygons
                    .iter()
                    .all(|poly| distance_to_polygon(p, poly) > GEOM_TOL)
        });
        Ok(g)
    }

    // ---- accessors --------------------------------------------------------

    /// Edges in boundary traversal order (valid order after `parameterize`).
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_holes(&self) -> Result<usize> {
        Ok(self.geom("counting holes")?.hole_points.len())
    }

    /// Number of unique boundary samples.
    pub fn num_pts(&self) -> Result<usize> {
        Ok(self.geom("counting boundary points")?.x1.len())
    }

    /// Sample spacing `π / n` in the boundary parameter.
    pub fn h(&self) -> Result<f64> {
        Ok(self.geom("reading the sample spacing")?.h)
    }

    pub fn get_boundary_points(&self) -> Result<(&[f64], &[f64])> {
        let g = self.geom("reading boundary points")?;
        Ok((&g.x1, &g.x2))
    }

    pub fn unit_tangent(&self) -> Result<(&[f64], &[f64])> {
        let g = self.geom("reading tangents")?;
        Ok((&g.t1, &g.t2))
    }

    pub fn unit_normal(&self) -> Result<(&[f64], &[f64])> {
        let g = self.geom("reading normals")?;
        Ok((&g.n1, &g.n2))
    }

    pub fn dx_norm(&self) -> Result<&[f64]> {
        Ok(&self.geom("reading dx_norm")?.dx_norm)
    }

    /// Index ranges of the closed contours (outer first).
    pub fn component_ranges(&self) -> Result<&[Range<usize>]> {
        Ok(&self.geom("reading contours")?.component_ranges)
    }

    /// Index ranges of the edges, parallel to [`MeshCell::edges`].
    pub fn edge_ranges(&self) -> Result<&[Range<usize>]> {
        Ok(&self.geom("reading edge ranges")?.edge_ranges)
    }

    /// One reference point `ξⱼ` inside each hole.
    pub fn hole_interior_points(&self) -> Result<&[Vector2<f64>]> {
        Ok(&self.geom("reading hole points")?.hole_points)
    }

    pub fn int_x1(&self) -> Result<&DMatrix<f64>> {
        Ok(&self.geom("reading the interior grid")?.int_x1)
    }

    pub fn int_x2(&self) -> Result<&DMatrix<f64>> {
        Ok(&self.geom("reading the interior grid")?.int_x2)
    }

    pub fn is_inside(&self) -> Result<&DMatrix<bool>> {
        Ok(&self.geom("reading the interior grid")?.is_inside)
    }

    /// Bounding box `(xmin, xmax, ymin, ymax)` of the boundary samples.
    pub fn get_bounding_box(&self) -> Result<(f64, f64, f64, f64)> {
        let g = self.geom("computing the bounding box")?;
        let pts: Vec<Vector2<f64>> =
            g.x1.iter().zip(&g.x2).map(|(&a, &b)| Vector2::new(a, b)).collect();
        Ok(bounding_box(&pts))
    }

    // ---- reducers ---------------------------------------------------------

    pub fn dot_with_tangent(&self, v1: &[f64], v2: &[f64]) -> Result<Vec<f64>> {
        let g = self.geom("dotting with the tangent")?;
        dot(&g.t1, &g.t2, v1, v2)
    }

    pub fn dot_with_normal(&self, v1: &[f64], v2: &[f64]) -> Result<Vec<f64>> {
        let g = self.geom("dotting with the normal")?;
        dot(&g.n1, &g.n2, v1, v2)
    }

    pub fn multiply_by_dx_norm(&self, vals: &[f64]) -> Result<Vec<f64>> {
        let g = self.geom("multiplying by dx_norm")?;
        check_len("boundary values", g.dx_norm.len(), vals.len())?;
        Ok(vals.iter().zip(&g.dx_norm).map(|(v, w)| v * w).collect())
    }

    /// `∮ f ds` over the whole boundary.
    pub fn integrate_over_boundary(&self, vals: &[f64]) -> Result<f64> {
        let g = self.geom("integrating over the boundary")?;
        check_len("boundary values", g.dx_norm.len(), vals.len())?;
        Ok(g.h * vals.iter().zip(&g.dx_norm).map(|(v, w)| v * w).sum::<f64>())
    }

    /// `∮ g dτ` where `g` already carries the `dx_norm` factor.
    pub fn integrate_over_boundary_preweighted(&self, vals: &[f64]) -> Result<f64> {
        let g = self.geom("integrating over the boundary")?;
        check_len("boundary values", g.dx_norm.len(), vals.len())?;
        Ok(g.h * vals.iter().sum::<f64>())
    }
}

fn dot(u1: &[f64], u2: &[f64], v1: &[f64], v2: &[f64]) -> Result<Vec<f64>> {
    check_len("first vector component", u1.len(), v1.len())?;
    check_len("second vector component", u2.len(), v2.len())?;
    Ok((0..u1.len()).map(|i| v1[i] * u1[i] + v2[i] * u2[i]).collect())
}

/// Groups edge indices into closed contours following `endpnt → anchor`.
fn chain_contours(edges: &[Edge]) -> Result<Vec<Vec<usize>>> {
    let mut used = vec![false; edges.len()];
    let mut contours = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut contour = vec![start];
        if !edges[start].is_loop() {
            let first = edges[start].anchor.id;
            let mut tip = edges[start].endpnt.id;
            while tip != first {
                let next = (0..edges.len())
                    .find(|&j| !used[j] && !edges[j].is_loop() && edges[j].anchor.id == tip)
                    .ok_or_else(|| {
                        Error::degenerate(format!(
                            "boundary does not close: no edge leaves vertex {tip}"
                        ))
                    })?;
                used[next] = true;
                contour.push(next);
                tip = edges[next].endpnt.id;
            }
        }
        contours.push(contour);
    }
    Ok(contours)
}

fn contour_points(edges: &[Edge], contour: &[usize]) -> Result<Vec<Vector2<f64>>> {
    let mut pts = Vec::new();
    for &i in contour {
        let s = edges[i].samples()?;
        pts.extend_from_slice(&s.x[..s.num_pts() - 1]);
    }
    Ok(pts)
}

/// Shoelace formula for the closed polygon through `pts`.
fn signed_area(pts: &[Vector2<f64>]) -> f64 {
    let m = pts.len();
    0.5 * (0..m)
        .map(|i| {
            let (a, b) = (pts[i], pts[(i + 1) % m]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
}

/// Even-odd ray casting.
fn point_in_polygon(p: Vector2<f64>, poly: &[Vector2<f64>]) -> bool {
    let m = poly.len();
    let mut inside = false;
    for i in 0..m {
        let (a, b) = (poly[i], poly[(i + 1) % m]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn distance_to_polygon(p: Vector2<f64>, poly: &[Vector2<f64>]) -> f64 {
    let m = poly.len();
    (0..m)
        .map(|i| {
            let (a, b) = (poly[i], poly[(i + 1) % m]);
            let ab = b - a;
            let len2 = ab.norm_squared();
            let s = if len2 > 0.0 {
                ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            (p - (a + s * ab)).norm()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Grid point inside `poly` farthest from its boundary.
fn deepest_point(poly: &[Vector2<f64>]) -> Result<Vector2<f64>> {
    let (xmin, xmax, ymin, ymax) = bounding_box(poly);
    let m = HOLE_SEARCH_RES;
    let mut best: Option<(f64, Vector2<f64>)> = None;
    for i in 1..m {
        for j in 1..m {
            let p = Vector2::new(
                xmin + (xmax - xmin) * j as f64 / m as f64,
                ymin + (ymax - ymin) * i as f64 / m as f64,
            );
            if !point_in_polygon(p, poly) {
                continue;
            }
            let d = distance_to_polygon(p, poly);
            if best.map_or(true, |(bd, _)| d > bd) {
                best = Some((d, p));
            }
        }
    }
    best.map(|(_, p)| p)
        .ok_or_else(|| Error::degenerate("could not locate a point inside a hole"))
}
