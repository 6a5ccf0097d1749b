//! Local functions `v = P + φ` as a typestate pipeline.
//!
//! Purpose
//! - Decompose a function with polynomial Laplacian into a polynomial part
//!   `P = anti_laplacian(Δv)` and a harmonic part `φ = ψ + Σ aⱼ ln|x − ξⱼ|`,
//!   keeping only boundary data: traces, weighted normal derivatives, the
//!   conjugate trace `ψ̂` and an anti-Laplacian of `φ`.
//! - Reduce H¹ and L² inner products of two such functions to boundary sums.
//!
//! Why a typestate
//! - Every stage reads only what earlier stages produced. Each `compute_*`
//!   consumes the function and returns it in the next stage, and accessors
//!   exist only on stages that carry their data, so "not yet computed" is a
//!   type error instead of a missing field.
//!
//! Stages
//! `Initialized → TraceSet → PolyPartComputed → PolyPartTraceComputed →
//! PolyPartWndComputed → ConjugateComputed → HarmonicWndComputed →
//! AntiLapComputed`, plus `Cleared` (scalars only).

use crate::error::{check_len, Error, Result};
use crate::poly::{integrate_poly_over_cell, PiecewisePolynomial, Polynomial};

use super::antilap::get_anti_laplacian_harmonic;
use super::d2n::weighted_tangential_derivative;
use super::nystrom::NystromSolver;
use super::space::GlobalKey;

/// How the Dirichlet trace is specified.
#[derive(Clone, Debug)]
pub enum TraceSource {
    /// One polynomial per edge, in the cell's traversal order.
    Piecewise(PiecewisePolynomial),
    /// Values at the cell's boundary samples.
    Values(Vec<f64>),
}

#[derive(Clone, Debug)]
pub struct Initialized {
    source: TraceSource,
}

#[derive(Clone, Debug)]
pub struct TraceSet {
    trace: Vec<f64>,
    poly_trace: Option<PiecewisePolynomial>,
}

#[derive(Clone, Debug)]
pub struct PolyPartComputed {
    prev: TraceSet,
    poly_part: Polynomial,
}

#[derive(Clone, Debug)]
pub struct PolyPartTraceComputed {
    prev: PolyPartComputed,
    poly_part_trace: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct PolyPartWndComputed {
    prev: PolyPartTraceComputed,
    poly_part_wnd: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct ConjugateComputed {
    prev: PolyPartWndComputed,
    conj_trace: Vec<f64>,
    log_coef: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct HarmonicWndComputed {
    prev: ConjugateComputed,
    harm_part_wnd: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct AntiLapComputed {
    prev: HarmonicWndComputed,
    antilap_trace: Vec<f64>,
    antilap_wnd: Vec<f64>,
}

/// What survives [`LocalFunction::clear`].
#[derive(Clone, Debug)]
pub struct Cleared {
    poly_part: Polynomial,
    log_coef: Vec<f64>,
}

// `Later: AsRef<Earlier>` for every ordered pair, so accessors can be
// written once per stage that introduces the data.
macro_rules! stage_chain {
    ($stage:ident => $($later:ident),*) => {
        impl AsRef<$stage> for $stage {
            fn as_ref(&self) -> &$stage {
                self
            }
        }
        $(
            impl AsRef<$stage> for $later {
                fn as_ref(&self) -> &$stage {
                    AsRef::<$stage>::as_ref(&self.prev)
                }
            }
        )*
    };
}

stage_chain!(TraceSet => PolyPartComputed, PolyPartTraceComputed, PolyPartWndComputed,
    ConjugateComputed, HarmonicWndComputed, AntiLapComputed);
stage_chain!(PolyPartComputed => PolyPartTraceComputed, PolyPartWndComputed, ConjugateComputed,
    HarmonicWndComputed, AntiLapComputed);
stage_chain!(PolyPartTraceComputed => PolyPartWndComputed, ConjugateComputed,
    HarmonicWndComputed, AntiLapComputed);
stage_chain!(PolyPartWndComputed => ConjugateComputed, HarmonicWndComputed, AntiLapComputed);
stage_chain!(ConjugateComputed => HarmonicWndComputed, AntiLapComputed);
stage_chain!(HarmonicWndComputed => AntiLapComputed);
stage_chain!(AntiLapComputed =>);

/// A local function bound to the solver of its cell.
#[derive(Clone, Debug)]
pub struct LocalFunction<'s, S> {
    solver: &'s NystromSolver,
    key: Option<GlobalKey>,
    lap: Polynomial,
    state: S,
}

impl<'s, S> LocalFunction<'s, S> {
    fn advance<T>(self, f: impl FnOnce(S) -> T) -> LocalFunction<'s, T> {
        LocalFunction {
            solver: self.solver,
            key: self.key,
            lap: self.lap,
            state: f(self.state),
        }
    }

    #[inline]
    pub fn solver(&self) -> &'s NystromSolver {
        self.solver
    }

    #[inline]
    pub fn key(&self) -> Option<&GlobalKey> {
        self.key.as_ref()
    }

    pub fn with_key(mut self, key: GlobalKey) -> Self {
        self.key = Some(key);
        self
    }

    /// The prescribed Laplacian `Δv`.
    #[inline]
    pub fn laplacian(&self) -> &Polynomial {
        &self.lap
    }

    fn same_cell<T>(&self, other: &LocalFunction<'_, T>) -> Result<()> {
        if std::ptr::eq(self.solver, other.solver) {
            Ok(())
        } else {
            Err(Error::invalid("local functions live on different cells"))
        }
    }
}

impl<'s> LocalFunction<'s, Initialized> {
    /// Validates the trace source against the solver's cell.
    pub fn new(solver: &'s NystromSolver, lap: Polynomial, source: TraceSource) -> Result<Self> {
        let cell = solver.cell();
        match &source {
            TraceSource::Piecewise(p) => {
                check_len("trace polynomials per edge", cell.num_edges(), p.num_polys())?
            }
            TraceSource::Values(v) => check_len("trace values", cell.num_pts()?, v.len())?,
        }
        Ok(Self {
            solver,
            key: None,
            lap,
            state: Initialized { source },
        })
    }

    /// Zero trace on every edge.
    pub fn with_zero_trace(solver: &'s NystromSolver, lap: Polynomial) -> Result<Self> {
        let n = solver.cell().num_edges();
        Self::new(solver, lap, TraceSource::Piecewise(PiecewisePolynomial::zeros(n)))
    }

    pub fn source(&self) -> &TraceSource {
        &self.state.source
    }

    /// Evaluates a piecewise polynomial trace edge by edge on the unique
    /// samples, in traversal order; explicit values pass through.
    pub fn compute_trace_values(self) -> Result<LocalFunction<'s, TraceSet>> {
        let cell = self.solver.cell();
        let state = match &self.state.source {
            TraceSource::Values(v) => TraceSet {
                trace: v.clone(),
                poly_trace: None,
            },
            TraceSource::Piecewise(pp) => {
                check_len("trace polynomials per edge", cell.num_edges(), pp.num_polys())?;
                let (x1, x2) = cell.get_boundary_points()?;
                let mut trace = vec![0.0; x1.len()];
                for (p, r) in pp.polys.iter().zip(cell.edge_ranges()?) {
                    for i in r.clone() {
                        trace[i] = p.eval(x1[i], x2[i]);
                    }
                }
                TraceSet {
                    trace,
                    poly_trace: Some(pp.clone()),
                }
            }
        };
        Ok(self.advance(|_| state))
    }

    /// Runs every stage in dependency order.
    pub fn compute_all(self) -> Result<LocalFunction<'s, AntiLapComputed>> {
        let f = self
            .compute_trace_values()?
            .compute_polynomial_part()
            .compute_polynomial_part_trace()?
            .compute_polynomial_part_weighted_normal_derivative()?
            .compute_harmonic_conjugate()?
            .compute_harmonic_weighted_normal_derivative()?
            .compute_anti_laplacian_harmonic_part()?;
        tracing::debug!(key = ?f.key, "computed local function");
        Ok(f)
    }
}

impl<'s, S: AsRef<TraceSet>> LocalFunction<'s, S> {
    /// Dirichlet trace at the boundary samples.
    pub fn trace(&self) -> &[f64] {
        &self.state.as_ref().trace
    }

    /// The piecewise polynomial the trace came from, if any.
    pub fn poly_trace(&self) -> Option<&PiecewisePolynomial> {
        self.state.as_ref().poly_trace.as_ref()
    }
}

impl<'s> LocalFunction<'s, TraceSet> {
    /// `P = anti_laplacian(Δv)`.
    pub fn compute_polynomial_part(self) -> LocalFunction<'s, PolyPartComputed> {
        let poly_part = self.lap.anti_laplacian();
        self.advance(|prev| PolyPartComputed { prev, poly_part })
    }
}

impl<'s, S: AsRef<PolyPartComputed>> LocalFunction<'s, S> {
    pub fn poly_part(&self) -> &Polynomial {
        &self.state.as_ref().poly_part
    }
}

impl<'s> LocalFunction<'s, PolyPartComputed> {
    pub fn compute_polynomial_part_trace(self) -> Result<LocalFunction<'s, PolyPartTraceComputed>> {
        let poly_part_trace = self.state.poly_part.trace(self.solver.cell())?;
        Ok(self.advance(|prev| PolyPartTraceComputed {
            prev,
            poly_part_trace,
        }))
    }
}

impl<'s, S: AsRef<PolyPartTraceComputed>> LocalFunction<'s, S> {
    pub fn poly_part_trace(&self) -> &[f64] {
        &self.state.as_ref().poly_part_trace
    }

    /// `φ = v − P` on the boundary.
    fn harmonic_trace(&self) -> Vec<f64> {
        let st: &PolyPartTraceComputed = self.state.as_ref();
        st.prev
            .prev
            .trace
            .iter()
            .zip(&st.poly_part_trace)
            .map(|(v, p)| v - p)
            .collect()
    }
}

impl<'s> LocalFunction<'s, PolyPartTraceComputed> {
    pub fn compute_polynomial_part_weighted_normal_derivative(
        self,
    ) -> Result<LocalFunction<'s, PolyPartWndComputed>> {
        let poly_part_wnd = self
            .poly_part()
            .weighted_normal_derivative(self.solver.cell())?;
        Ok(self.advance(|prev| PolyPartWndComputed {
            prev,
            poly_part_wnd,
        }))
    }
}

impl<'s, S: AsRef<PolyPartWndComputed>> LocalFunction<'s, S> {
    pub fn poly_part_wnd(&self) -> &[f64] {
        &self.state.as_ref().poly_part_wnd
    }
}

impl<'s> LocalFunction<'s, PolyPartWndComputed> {
    /// Splits `φ = v − P` into its conjugable part and hole logarithms.
    pub fn compute_harmonic_conjugate(self) -> Result<LocalFunction<'s, ConjugateComputed>> {
        let phi = self.harmonic_trace();
        let (conj_trace, log_coef) = self.solver.get_harmonic_conjugate(&phi)?;
        Ok(self.advance(|prev| ConjugateComputed {
            prev,
            conj_trace,
            log_coef,
        }))
    }
}

impl<'s, S: AsRef<ConjugateComputed>> LocalFunction<'s, S> {
    /// Trace of `ψ̂`.
    pub fn harmonic_conjugate(&self) -> &[f64] {
        &self.state.as_ref().conj_trace
    }

    /// `aⱼ`, one per hole.
    pub fn log_coef(&self) -> &[f64] {
        &self.state.as_ref().log_coef
    }

    /// `ψ = φ − Σ aⱼ ln|x − ξⱼ|` on the boundary.
    pub fn get_conjugable_part(&self) -> Result<Vec<f64>>
    where
        S: AsRef<PolyPartTraceComputed>,
    {
        let logs = self.solver.log_terms().combine_trace(self.log_coef())?;
        Ok(self
            .harmonic_trace()
            .into_iter()
            .zip(logs)
            .map(|(p, l)| p - l)
            .collect())
    }
}

impl<'s> LocalFunction<'s, ConjugateComputed> {
    /// `∂ₙφ · dx_norm = d/dτ ψ̂ + Σ aⱼ ∂ₙλⱼ · dx_norm`.
    pub fn compute_harmonic_weighted_normal_derivative(
        self,
    ) -> Result<LocalFunction<'s, HarmonicWndComputed>> {
        let wtd = weighted_tangential_derivative(self.solver, self.harmonic_conjugate())?;
        let logs = self.solver.log_terms().combine_wnd(self.log_coef())?;
        let harm_part_wnd = wtd.iter().zip(&logs).map(|(a, b)| a + b).collect();
        Ok(self.advance(|prev| HarmonicWndComputed {
            prev,
            harm_part_wnd,
        }))
    }
}

impl<'s, S: AsRef<HarmonicWndComputed>> LocalFunction<'s, S> {
    /// Weighted normal derivative of the harmonic part `φ`.
    pub fn harm_part_wnd(&self) -> &[f64] {
        &self.state.as_ref().harm_part_wnd
    }
}

impl<'s> LocalFunction<'s, HarmonicWndComputed> {
    pub fn compute_anti_laplacian_harmonic_part(
        self,
    ) -> Result<LocalFunction<'s, AntiLapComputed>> {
        let psi = self.get_conjugable_part()?;
        let (antilap_trace, antilap_wnd) = get_anti_laplacian_harmonic(
            self.solver,
            &psi,
            self.harmonic_conjugate(),
            self.log_coef(),
        )?;
        Ok(self.advance(|prev| AntiLapComputed {
            prev,
            antilap_trace,
            antilap_wnd,
        }))
    }
}

impl<'s> LocalFunction<'s, AntiLapComputed> {
    pub fn antilap_trace(&self) -> &[f64] {
        &self.state.antilap_trace
    }

    pub fn antilap_wnd(&self) -> &[f64] {
        &self.state.antilap_wnd
    }

    /// `∫_K ∇v · ∇w dx`.
    pub fn get_h1_semi_inner_prod(&self, other: &LocalFunction<'_, AntiLapComputed>) -> Result<f64> {
        self.same_cell(other)?;
        let cell = self.solver.cell();
        let (px, py) = self.poly_part().grad();
        let (qx, qy) = other.poly_part().grad();
        let grad_pq = &(&px * &qx) + &(&py * &qy);
        let mut val = integrate_poly_over_cell(&grad_pq, cell)?;
        let integrand: Vec<f64> = (0..self.trace().len())
            .map(|i| {
                other.trace()[i] * self.harm_part_wnd()[i]
                    + self.poly_part_trace()[i] * other.harm_part_wnd()[i]
            })
            .collect();
        val += cell.integrate_over_boundary_preweighted(&integrand)?;
        Ok(val)
    }

    /// `∫_K v w dx`.
    pub fn get_l2_inner_prod(&self, other: &LocalFunction<'_, AntiLapComputed>) -> Result<f64> {
        self.same_cell(other)?;
        let cell = self.solver.cell();
        let pq = self.poly_part() * other.poly_part();
        let mut val = integrate_poly_over_cell(&pq, cell)?;

        let self_phi = self.harmonic_trace();
        let other_phi = other.harmonic_trace();
        // ∫ φ χ
        let mut integrand: Vec<f64> = (0..self_phi.len())
            .map(|i| other_phi[i] * self.antilap_wnd()[i] - self.antilap_trace()[i] * other.harm_part_wnd()[i])
            .collect();
        // ∫ φ Q and ∫ P χ, each through an anti-Laplacian of the polynomial
        for (harm, harm_wnd, poly) in [
            (&self_phi, self.harm_part_wnd(), other.poly_part()),
            (&other_phi, other.harm_part_wnd(), self.poly_part()),
        ] {
            let r = poly.anti_laplacian();
            let r_trace = r.trace(cell)?;
            let r_wnd = r.weighted_normal_derivative(cell)?;
            for (i, v) in integrand.iter_mut().enumerate() {
                *v += harm[i] * r_wnd[i] - r_trace[i] * harm_wnd[i];
            }
        }
        val += cell.integrate_over_boundary_preweighted(&integrand)?;
        Ok(val)
    }

    /// Releases every boundary array; keeps key, Laplacian, polynomial part
    /// and log coefficients.
    pub fn clear(self) -> LocalFunction<'s, Cleared> {
        self.advance(|s| {
            let conj = s.prev.prev;
            Cleared {
                poly_part: conj.prev.prev.prev.poly_part,
                log_coef: conj.log_coef,
            }
        })
    }
}

impl<'s> LocalFunction<'s, Cleared> {
    pub fn poly_part(&self) -> &Polynomial {
        &self.state.poly_part
    }

    pub fn log_coef(&self) -> &[f64] {
        &self.state.log_coef
    }
}
