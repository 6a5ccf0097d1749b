//! Local Poisson space `V_p(K)` of one mesh cell.
//!
//! Purpose
//! - Assemble the basis of a cell from per-edge trace bases (`EdgeSpace`) and
//!   polynomial Laplacians, and run every decomposition.
//!
//! Basis
//! - Vertex functions: harmonic, one per vertex of a non-loop edge; the trace
//!   is taken from every edge space that carries a function for that vertex
//!   and is zero on the other edges.
//! - Edge functions: harmonic, trace supported on one edge.
//! - Bubble functions: zero trace, Laplacian equal to the monomial of rank
//!   `k` for `k < deg(deg − 1)/2`.
//!
//! Policy
//! - Only sequential computation exists. `Parallel { processes: 1 }` runs
//!   sequentially; more processes fail fast with `Unsupported`.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::poly::{PiecewisePolynomial, Polynomial};

use super::function::{AntiLapComputed, Initialized, LocalFunction, TraceSource};
use super::interior::InteriorValues;
use super::nystrom::NystromSolver;

/// Identifies a basis function across the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlobalKey {
    Vert { vert_idx: usize },
    Edge { edge_idx: usize, edge_space_idx: usize },
    Bubble { bubb_space_idx: usize },
}

/// Trace basis of one edge: polynomials to be evaluated on that edge.
#[derive(Clone, Debug)]
pub struct EdgeSpace {
    /// Id of the owning edge.
    pub edge_idx: usize,
    /// `(vertex id, trace)`: equals one at that vertex.
    pub vert_funs: Vec<(usize, Polynomial)>,
    /// Traces vanishing at both endpoints.
    pub edge_funs: Vec<Polynomial>,
}

impl EdgeSpace {
    pub fn new(edge_idx: usize) -> Self {
        Self {
            edge_idx,
            vert_funs: Vec::new(),
            edge_funs: Vec::new(),
        }
    }

    pub fn with_vert_fun(mut self, vert_idx: usize, trace: Polynomial) -> Self {
        self.vert_funs.push((vert_idx, trace));
        self
    }

    pub fn with_edge_fun(mut self, trace: Polynomial) -> Self {
        self.edge_funs.push(trace);
        self
    }

    pub fn num_vert_funs(&self) -> usize {
        self.vert_funs.len()
    }

    pub fn num_edge_funs(&self) -> usize {
        self.edge_funs.len()
    }

    pub fn edge_fun_key(&self, k: usize) -> GlobalKey {
        GlobalKey::Edge {
            edge_idx: self.edge_idx,
            edge_space_idx: k,
        }
    }
}

/// How `LocalFunctionSpace` runs the per-function decompositions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ComputeStrategy {
    #[default]
    Sequential,
    /// Fan-out over basis functions; declared, not implemented.
    Parallel { processes: usize },
}

/// Fully computed basis of one cell.
#[derive(Debug)]
pub struct LocalFunctionSpace<'s> {
    solver: &'s NystromSolver,
    deg: u32,
    vert_funs: Vec<LocalFunction<'s, AntiLapComputed>>,
    edge_funs: Vec<LocalFunction<'s, AntiLapComputed>>,
    bubb_funs: Vec<LocalFunction<'s, AntiLapComputed>>,
    interior: Vec<InteriorValues>,
}

impl<'s> LocalFunctionSpace<'s> {
    /// Builds and decomposes every basis function. Interior values are left
    /// to [`Self::find_interior_values`].
    pub fn new(
        solver: &'s NystromSolver,
        edge_spaces: &[EdgeSpace],
        deg: u32,
        strategy: ComputeStrategy,
    ) -> Result<Self> {
        if deg < 1 {
            return Err(Error::invalid("polynomial degree must be positive"));
        }
        match strategy {
            ComputeStrategy::Sequential | ComputeStrategy::Parallel { processes: 1 } => {}
            ComputeStrategy::Parallel { processes: 0 } => {
                return Err(Error::invalid("number of processes must be positive"));
            }
            ComputeStrategy::Parallel { .. } => {
                return Err(Error::Unsupported {
                    feature: "parallel computation of local functions",
                });
            }
        }

        let vert_funs = build_vert_funs(solver, edge_spaces)?;
        let edge_funs = build_edge_funs(solver, edge_spaces)?;
        let bubb_funs = build_bubble_funs(solver, deg)?;
        let compute = |fs: Vec<LocalFunction<'s, Initialized>>| {
            fs.into_iter()
                .map(|f| f.compute_all())
                .collect::<Result<Vec<_>>>()
        };
        let space = Self {
            solver,
            deg,
            vert_funs: compute(vert_funs)?,
            edge_funs: compute(edge_funs)?,
            bubb_funs: compute(bubb_funs)?,
            interior: Vec::new(),
        };
        tracing::info!(
            cell = solver.cell().id,
            deg,
            vert = space.num_vert_funs(),
            edge = space.num_edge_funs(),
            bubble = space.num_bubb_funs(),
            "built local function space"
        );
        Ok(space)
    }

    #[inline]
    pub fn solver(&self) -> &'s NystromSolver {
        self.solver
    }

    #[inline]
    pub fn deg(&self) -> u32 {
        self.deg
    }

    pub fn num_vert_funs(&self) -> usize {
        self.vert_funs.len()
    }

    pub fn num_edge_funs(&self) -> usize {
        self.edge_funs.len()
    }

    pub fn num_bubb_funs(&self) -> usize {
        self.bubb_funs.len()
    }

    pub fn num_funs(&self) -> usize {
        self.num_vert_funs() + self.num_edge_funs() + self.num_bubb_funs()
    }

    pub fn vert_funs(&self) -> &[LocalFunction<'s, AntiLapComputed>] {
        &self.vert_funs
    }

    pub fn edge_funs(&self) -> &[LocalFunction<'s, AntiLapComputed>] {
        &self.edge_funs
    }

    pub fn bubb_funs(&self) -> &[LocalFunction<'s, AntiLapComputed>] {
        &self.bubb_funs
    }

    /// Vertex, then edge, then bubble functions.
    pub fn get_basis(&self) -> Vec<&LocalFunction<'s, AntiLapComputed>> {
        self.vert_funs
            .iter()
            .chain(&self.edge_funs)
            .chain(&self.bubb_funs)
            .collect()
    }

    /// Interior values of every basis function, in [`Self::get_basis`] order.
    pub fn find_interior_values(&mut self) -> Result<&[InteriorValues]> {
        let vals = self
            .get_basis()
            .into_iter()
            .map(|v| v.compute_interior_values())
            .collect::<Result<Vec<_>>>()?;
        self.interior = vals;
        Ok(&self.interior)
    }

    /// Empty until [`Self::find_interior_values`] ran.
    pub fn interior_values(&self) -> &[InteriorValues] {
        &self.interior
    }
}

/// Slot of the edge with id `edge_idx` in the cell's traversal order.
fn locate_edge(solver: &NystromSolver, edge_idx: usize) -> Result<usize> {
    solver
        .cell()
        .edges()
        .iter()
        .position(|e| e.id == edge_idx)
        .ok_or_else(|| Error::invalid(format!("edge {edge_idx} is not on this cell")))
}

fn build_bubble_funs(
    solver: &NystromSolver,
    deg: u32,
) -> Result<Vec<LocalFunction<'_, Initialized>>> {
    let deg = deg as usize;
    (0..deg * (deg - 1) / 2)
        .map(|k| {
            let lap = Polynomial::from_rank(1.0, k);
            Ok(LocalFunction::with_zero_trace(solver, lap)?
                .with_key(GlobalKey::Bubble { bubb_space_idx: k }))
        })
        .collect()
}

fn build_vert_funs<'s>(
    solver: &'s NystromSolver,
    edge_spaces: &[EdgeSpace],
) -> Result<Vec<LocalFunction<'s, Initialized>>> {
    let edges = solver.cell().edges();
    let verts: BTreeSet<usize> = edges
        .iter()
        .filter(|e| !e.is_loop())
        .flat_map(|e| [e.anchor.id, e.endpnt.id])
        .collect();
    let slots = edge_spaces
        .iter()
        .map(|b| locate_edge(solver, b.edge_idx))
        .collect::<Result<Vec<_>>>()?;

    verts
        .into_iter()
        .map(|vert_idx| {
            let mut polys = PiecewisePolynomial::zeros(edges.len());
            for (b, &slot) in edge_spaces.iter().zip(&slots) {
                for (_, trace) in b.vert_funs.iter().filter(|(v, _)| *v == vert_idx) {
                    polys.polys[slot] = trace.clone();
                }
            }
            Ok(
                LocalFunction::new(solver, Polynomial::zero(), TraceSource::Piecewise(polys))?
                    .with_key(GlobalKey::Vert { vert_idx }),
            )
        })
        .collect()
}

fn build_edge_funs<'s>(
    solver: &'s NystromSolver,
    edge_spaces: &[EdgeSpace],
) -> Result<Vec<LocalFunction<'s, Initialized>>> {
    let num_edges = solver.cell().num_edges();
    let mut out = Vec::new();
    for b in edge_spaces {
        let slot = locate_edge(solver, b.edge_idx)?;
        for (k, trace) in b.edge_funs.iter().enumerate() {
            let mut polys = PiecewisePolynomial::zeros(num_edges);
            polys.polys[slot] = trace.clone();
            let v = LocalFunction::new(solver, Polynomial::zero(), TraceSource::Piecewise(polys))?
                .with_key(b.edge_fun_key(k));
            out.push(v);
        }
    }
    Ok(out)
}
