//! Tolerance and configuration defaults (internal).
//!
//! Policy
//! - Tolerances are fixed constants; geometry checks share one value so that
//!   "distinct", "orthogonal" and "nonzero" agree on the same scale.
//! - Run-time knobs that callers do change (quadrature sizes, interior grid)
//!   are explicit values (`QuadDict`, `GridCfg`), never globals.

/// Floating point tolerance for geometric predicates (distinctness,
/// orthogonality, nonzero dilation).
pub(crate) const GEOM_TOL: f64 = 1e-12;

/// Largest `n / interp` ratio considered numerically stable.
pub(crate) const MAX_DECIMATION: usize = 128;

/// Minimum number of half-intervals per edge (`2n` samples per edge).
pub(crate) const MIN_QUAD_N: usize = 4;

/// Interior evaluation grid of a mesh cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCfg {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridCfg {
    fn default() -> Self {
        Self {
            rows: 101,
            cols: 101,
        }
    }
}
