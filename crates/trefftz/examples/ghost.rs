//! Ghost-shaped cell: sine-wave floor, semicircular roof, two elliptical eyes.
//!
//! Decomposes
//! - `v = (x₁ − ¼)/|x − (¼, 0.7)|² + x₁³x₂ + x₂²` with `Δv = 6x₁x₂ + 2`,
//! - `w = ln|x − (¾, 0.7)|² + x₁²x₂² − x₁x₂³` with `Δw = 2x₁² − 6x₁x₂ + 2x₂²`,
//!
//! and prints the errors of `∫∇v·∇w`, `∫vw` and of the interior values of
//! `v` as the quadrature is refined.
//!
//! Run: `cargo run --release -p trefftz --example ghost`

use std::sync::Arc;

use tracing_subscriber::fmt::SubscriberBuilder;
use trefftz::prelude::*;

const H1_EXACT: f64 = -6.311053612386;
const L2_EXACT: f64 = -3.277578636852;

fn ghost(n: usize) -> anyhow::Result<MeshCell> {
    let v = [
        Vert::new(0, 0.0, 0.0),
        Vert::new(1, 1.0, 0.0),
        Vert::new(2, 1.0, 0.8),
        Vert::new(3, 0.0, 0.8),
        Vert::new(4, 0.25, 0.7),
        Vert::new(5, 0.75, 0.7),
    ];
    let eye = Arc::new(Ellipse::new(0.15, 0.2)?);
    let edges = vec![
        Edge::new(0, v[0], v[1], Arc::new(SineWave::new(0.1, 6)?)),
        Edge::new(1, v[1], v[2], Arc::new(Line)),
        Edge::new(2, v[2], v[3], Arc::new(CircularArcDeg::new(180.0)?)),
        Edge::new(3, v[3], v[0], Arc::new(Line)),
        Edge::new(4, v[4], v[4], eye.clone()).with_quad(QuadKind::Trap),
        Edge::new(5, v[5], v[5], eye).with_quad(QuadKind::Trap),
    ];
    let edges = edges
        .into_iter()
        .map(|e| {
            if e.is_loop() {
                e.with_cells(None, Some(0))
            } else {
                e.with_cells(Some(0), None)
            }
        })
        .collect();
    let mut cell = MeshCell::new(0, edges)?;
    cell.parameterize(&QuadDict::new(n, 7, 1)?)?;
    Ok(cell)
}

fn v_exact(x: f64, y: f64) -> (f64, f64, f64) {
    let (d1, d2) = (x - 0.25, y - 0.7);
    let r2 = d1 * d1 + d2 * d2;
    let val = d1 / r2 + x.powi(3) * y + y * y;
    let g1 = -(d1 * d1 - d2 * d2) / (r2 * r2) + 3.0 * x * x * y;
    let g2 = -2.0 * d1 * d2 / (r2 * r2) + x.powi(3) + 2.0 * y;
    (val, g1, g2)
}

fn w_exact(x: f64, y: f64) -> f64 {
    ((x - 0.75).powi(2) + (y - 0.7).powi(2)).ln() + x * x * y * y - x * y.powi(3)
}

fn main() -> anyhow::Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    tracing::info!(version = trefftz::VERSION, "ghost");

    for n in [4, 8, 16, 32, 64] {
        let solver = NystromSolver::new(ghost(n)?)?;
        let (x1, x2) = solver.cell().get_boundary_points()?;
        let v_trace = x1.iter().zip(x2).map(|(&x, &y)| v_exact(x, y).0).collect();
        let w_trace = x1.iter().zip(x2).map(|(&x, &y)| w_exact(x, y)).collect();

        let v_lap = Polynomial::new([(6.0, 1, 1), (2.0, 0, 0)]);
        let w_lap = Polynomial::new([(2.0, 2, 0), (-6.0, 1, 1), (2.0, 0, 2)]);
        let v = LocalFunction::new(&solver, v_lap, TraceSource::Values(v_trace))?.compute_all()?;
        let w = LocalFunction::new(&solver, w_lap, TraceSource::Values(w_trace))?.compute_all()?;

        let h1 = v.get_h1_semi_inner_prod(&w)?;
        let l2 = v.get_l2_inner_prod(&w)?;

        let iv = v.compute_interior_values()?;
        let cell = solver.cell();
        let (y1, y2, inside) = (cell.int_x1()?, cell.int_x2()?, cell.is_inside()?);
        let mut max_val_err = 0.0_f64;
        let mut max_grad_err = 0.0_f64;
        for (k, &is_in) in inside.iter().enumerate() {
            if !is_in {
                continue;
            }
            let (val, g1, g2) = v_exact(y1[k], y2[k]);
            max_val_err = max_val_err.max((iv.vals[k] - val).abs());
            max_grad_err = max_grad_err.max((iv.grad1[k] - g1).hypot(iv.grad2[k] - g2));
        }

        println!(
            "n = {n:2}  H1 = {h1:+.12} (err {:.2e})  L2 = {l2:+.12} (err {:.2e})  \
             interior: val err {max_val_err:.2e}, grad err {max_grad_err:.2e}",
            (h1 - H1_EXACT).abs(),
            (l2 - L2_EXACT).abs(),
        );
    }
    Ok(())
}
