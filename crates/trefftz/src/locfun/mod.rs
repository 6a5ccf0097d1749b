//! Local functions on a punctured cell.
//!
//! Purpose
//! - `NystromSolver`: factorized boundary integral system of one cell, the
//!   only shared (read-only) state.
//! - `LocalFunction`: the decomposition `v = P + ψ + Σ aⱼ ln|x − ξⱼ|` as a
//!   typestate, plus inner products and interior evaluation.
//! - `LocalFunctionSpace`: the vertex/edge/bubble basis of a cell.
//!
//! Why this design
//! - Local functions borrow the solver, so every function of a cell shares
//!   one factorization and geometry cannot change underneath them.

pub mod antilap;
pub mod d2n;
mod fft;
mod function;
mod interior;
mod nystrom;
mod space;

pub use function::{
    AntiLapComputed, Cleared, ConjugateComputed, HarmonicWndComputed, Initialized,
    LocalFunction, PolyPartComputed, PolyPartTraceComputed, PolyPartWndComputed, TraceSet,
    TraceSource,
};
pub use interior::InteriorValues;
pub use nystrom::NystromSolver;
pub use space::{ComputeStrategy, EdgeSpace, GlobalKey, LocalFunctionSpace};
