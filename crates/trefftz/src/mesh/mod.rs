//! Mesh geometry: vertices, curve families, parameterized edges and cells.
//!
//! Purpose
//! - Everything downstream sees a cell as sampled boundary arrays plus a few
//!   reducers; this module produces them from vertices and analytic curves.
//!
//! Why this design
//! - Curves are trait objects so that edges stay agnostic of the family and
//!   new families plug in without touching edge code.
//! - Edges hold their samples in an `Option`; geometric operations before
//!   `parameterize` surface as `Error::NotParameterized` rather than panics.

mod cell;
mod curves;
mod edge;
mod vert;

pub use cell::MeshCell;
pub use curves::{Circle, CircularArcDeg, Curve, Ellipse, Line, SineWave};
pub use edge::{Edge, EdgeSamples};
pub use vert::Vert;

#[cfg(test)]
pub(crate) use cell::test_util;

#[cfg(test)]
mod tests;
