//! Trefftz local functions on punctured curvilinear mesh cells.
//!
//! A local function `v = P + φ` on a cell `K` has a polynomial part `P` and a
//! harmonic part `φ = ψ + Σ aⱼ ln|x − ξⱼ|`, where `ξⱼ` sits inside hole `j`.
//! Everything a finite element method needs from `v` (H¹ and L² inner
//! products, interior values and gradients) is reduced to boundary sums over
//! the sampled cell boundary.
//!
//! Pipeline
//! - `quad`: parameter nodes and weights on `[0, 2π]`.
//! - `mesh`: vertices, curve families, parameterized edges, mesh cells.
//! - `poly`: bivariate polynomials with an exact anti-Laplacian.
//! - `locfun`: Nyström solver, boundary transforms, the local function
//!   typestate and the per-cell basis builder.
//!
//! API Policy
//! - Geometry is read-only once a `NystromSolver` is built on it; every local
//!   function borrows the solver and owns only its own arrays.

pub mod cfg;
pub mod error;
pub mod locfun;
pub mod mesh;
pub mod poly;
pub mod quad;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::GridCfg;
pub use error::{Error, Result};
pub use nalgebra::{Matrix2 as Mat2, Vector2 as Vec2};

/// Common exports for callers building cells and bases.
pub mod prelude {
    pub use crate::cfg::GridCfg;
    pub use crate::error::{Error, Result};
    pub use crate::locfun::{
        ComputeStrategy, EdgeSpace, GlobalKey, InteriorValues, LocalFunction,
        LocalFunctionSpace, NystromSolver, TraceSource,
    };
    pub use crate::mesh::{
        CircularArcDeg, Circle, Curve, Edge, Ellipse, Line, MeshCell, SineWave, Vert,
    };
    pub use crate::poly::{integrate_poly_over_cell, PiecewisePolynomial, Polynomial};
    pub use crate::quad::{Quad, QuadDict, QuadKind};
    pub use nalgebra::{Matrix2 as Mat2, Vector2 as Vec2};
}
