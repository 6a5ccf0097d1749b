use super::*;
use crate::cfg::GridCfg;
use crate::error::Error;
use crate::quad::{QuadDict, QuadKind};
use nalgebra::{Matrix2, Vector2};
use proptest::prelude::*;
use std::f64::consts::PI;
use std::sync::Arc;

fn qd(n: usize) -> QuadDict {
    QuadDict::new(n, 7, 1).unwrap()
}

fn line_edge(a: (f64, f64), b: (f64, f64)) -> Edge {
    Edge::new(
        0,
        Vert::new(0, a.0, a.1),
        Vert::new(1, b.0, b.1),
        Arc::new(Line),
    )
}

fn arc_edge(theta0: f64) -> Edge {
    Edge::new(
        7,
        Vert::new(0, 1.0, 0.8),
        Vert::new(1, 0.0, 0.8),
        Arc::new(CircularArcDeg::new(theta0).unwrap()),
    )
}

fn assert_frame(e: &Edge) {
    let s = e.samples().unwrap();
    for (t, n) in s.tangent.iter().zip(&s.normal) {
        assert!((t.norm() - 1.0).abs() < 1e-12);
        assert!(t.dot(n).abs() < 1e-12);
        // normal is the tangent rotated clockwise
        assert!((t.x * n.y - t.y * n.x + 1.0).abs() < 1e-12);
    }
}

#[test]
fn transforms_require_parameterization() {
    let mut e = line_edge((0.0, 0.0), (1.0, 0.0));
    assert!(matches!(
        e.translate(Vector2::new(1.0, 0.0)),
        Err(Error::NotParameterized { .. })
    ));
    assert!(matches!(e.rotate(30.0), Err(Error::NotParameterized { .. })));
    assert!(matches!(e.dilate(2.0), Err(Error::NotParameterized { .. })));
    assert!(matches!(
        e.reverse_orientation(),
        Err(Error::NotParameterized { .. })
    ));
    assert!(matches!(
        e.integrate_over_edge(&[], true),
        Err(Error::NotParameterized { .. })
    ));
    e.parameterize(&qd(8)).unwrap();
    assert!(e.rotate(30.0).is_ok());
    e.deparameterize();
    assert!(matches!(e.reflect_across_x_axis(), Err(Error::NotParameterized { .. })));
}

#[test]
fn join_points_places_endpoints() {
    let mut e = line_edge((0.2, -0.3), (1.7, 0.9));
    e.parameterize(&qd(8)).unwrap();
    let s = e.samples().unwrap();
    assert!((s.x[0] - Vector2::new(0.2, -0.3)).norm() < 1e-12);
    assert!((s.x[16] - Vector2::new(1.7, 0.9)).norm() < 1e-12);
    assert_frame(&e);

    let mut bad = line_edge((0.5, 0.5), (0.5, 0.5 + 1e-14));
    // distinct ids but coincident positions
    assert!(matches!(
        bad.parameterize(&qd(8)),
        Err(Error::Degenerate { .. })
    ));
}

#[test]
fn invalid_transforms_are_rejected() {
    let mut e = line_edge((0.0, 0.0), (1.0, 0.0));
    e.parameterize(&qd(8)).unwrap();
    assert!(matches!(e.dilate(0.0), Err(Error::InvalidInput { .. })));
    assert!(matches!(
        e.apply_orthogonal_transformation(Matrix2::new(1.0, 1.0, 0.0, 1.0)),
        Err(Error::InvalidInput { .. })
    ));
}

#[test]
fn edge_lengths_match_closed_forms() {
    let mut e = line_edge((0.0, 0.0), (3.0, 4.0));
    e.parameterize(&qd(16)).unwrap();
    let ones = vec![1.0; 32];
    assert!((e.integrate_over_edge(&ones, true).unwrap() - 5.0).abs() < 1e-8);
    let ones = vec![1.0; 33];
    assert!((e.integrate_over_edge(&ones, false).unwrap() - 5.0).abs() < 1e-8);

    // semicircle over a unit chord
    let mut a = arc_edge(180.0);
    a.parameterize(&qd(16)).unwrap();
    let ones = vec![1.0; 32];
    assert!((a.integrate_over_edge(&ones, true).unwrap() - 0.5 * PI).abs() < 1e-8);
    assert_frame(&a);
    // chord from (1, .8) to (0, .8) bulges upward
    let s = a.samples().unwrap();
    assert!((s.x[16] - Vector2::new(0.5, 1.3)).norm() < 1e-12);
}

#[test]
fn circle_curvature_sign_and_reversal() {
    let c = Vert::new(3, 0.5, 0.5);
    let mut e = Edge::new(2, c, c, Arc::new(Circle::new(0.25).unwrap())).with_quad(QuadKind::Trap);
    e.parameterize(&qd(8)).unwrap();
    assert!(e.is_loop());
    for k in &e.samples().unwrap().curvature {
        assert!((k + 4.0).abs() < 1e-12);
    }
    let before = e.samples().unwrap().clone();
    e.reverse_orientation().unwrap();
    for k in &e.samples().unwrap().curvature {
        assert!((k - 4.0).abs() < 1e-12);
    }
    assert_frame(&e);
    e.reverse_orientation().unwrap();
    let after = e.samples().unwrap();
    assert_eq!(before.x, after.x);
    assert_eq!(before.tangent, after.tangent);
    assert_eq!(before.normal, after.normal);
    assert_eq!(before.dx_norm, after.dx_norm);
    assert_eq!(before.curvature, after.curvature);
}

#[test]
fn dilation_scales_curvature_and_length() {
    let mut e = arc_edge(120.0);
    e.parameterize(&qd(8)).unwrap();
    let k0 = e.samples().unwrap().curvature.clone();
    let w0 = e.samples().unwrap().dx_norm.clone();
    e.dilate(-2.0).unwrap();
    let s = e.samples().unwrap();
    for i in 0..k0.len() {
        assert!((s.curvature[i] - 0.5 * k0[i]).abs() < 1e-12);
        assert!((s.dx_norm[i] - 2.0 * w0[i]).abs() < 1e-12);
    }
    assert_frame(&e);
}

#[test]
fn reducers_check_lengths() {
    let mut e = line_edge((0.0, 0.0), (1.0, 0.0));
    e.parameterize(&qd(8)).unwrap();
    assert!(matches!(
        e.dot_with_normal(&[1.0; 16], &[1.0; 15], true),
        Err(Error::SizeMismatch { .. })
    ));
    let vals = e.evaluate_function(|p| p.x, true).unwrap();
    assert_eq!(vals.len(), 16);
    let dn = e.dot_with_normal(&vec![0.0; 16], &vec![1.0; 16], true).unwrap();
    // normal of a left-to-right segment points down
    assert!(dn.iter().all(|v| (v + 1.0).abs() < 1e-12));
    let dt = e.dot_with_tangent(&vec![1.0; 17], &vec![0.0; 17], false).unwrap();
    assert!(dt.iter().all(|v| (v - 1.0).abs() < 1e-12));
    assert!((e.get_bounding_box().unwrap().1 - 1.0).abs() < 1e-12);
}

proptest! {
    #[test]
    fn rotations_keep_and_reflections_flip_curvature(theta in 0.0f64..360.0, arc in 20.0f64..340.0) {
        let mut e = arc_edge(arc);
        e.parameterize(&qd(8)).unwrap();
        let k0 = e.samples().unwrap().curvature.clone();
        e.rotate(theta).unwrap();
        assert_frame(&e);
        for (a, b) in k0.iter().zip(&e.samples().unwrap().curvature) {
            prop_assert!((a - b).abs() < 1e-10 * a.abs().max(1.0));
        }
        e.reflect_across_y_axis().unwrap();
        assert_frame(&e);
        for (a, b) in k0.iter().zip(&e.samples().unwrap().curvature) {
            prop_assert!((a + b).abs() < 1e-10 * a.abs().max(1.0));
        }
    }

    #[test]
    fn sine_wave_frames_are_orthonormal(amp in -0.3f64..0.3, freq in 0u32..8) {
        let mut e = Edge::new(
            0,
            Vert::new(0, 0.0, 0.0),
            Vert::new(1, 1.0, 0.0),
            Arc::new(SineWave::new(amp, freq).unwrap()),
        );
        e.parameterize(&qd(8)).unwrap();
        assert_frame(&e);
        let s = e.samples().unwrap();
        prop_assert!((s.x[16] - Vector2::new(1.0, 0.0)).norm() < 1e-12);
    }
}

#[test]
fn curve_parameters_are_validated() {
    assert!(Circle::new(0.0).is_err());
    assert!(Ellipse::new(1.0, -1.0).is_err());
    assert!(CircularArcDeg::new(0.0).is_err());
    assert!(CircularArcDeg::new(360.0).is_err());
    assert!(SineWave::new(f64::NAN, 1).is_err());
}

#[test]
fn loops_and_closed_curves_go_together() {
    let (a, b) = (Vert::new(0, 0.0, 0.0), Vert::new(1, 1.0, 0.0));
    let mut open_loop = Edge::new(0, a, a, Arc::new(Line));
    assert!(matches!(
        open_loop.parameterize(&qd(8)),
        Err(Error::InvalidInput { .. })
    ));
    let mut closed_chord = Edge::new(1, a, b, Arc::new(Circle::new(1.0).unwrap()));
    assert!(matches!(
        closed_chord.parameterize(&qd(8)),
        Err(Error::InvalidInput { .. })
    ));
    assert!(!closed_chord.is_parameterized());
    let mut ring = Edge::new(2, a, a, Arc::new(Ellipse::new(1.0, 0.5).unwrap()));
    ring.parameterize(&qd(8)).unwrap();
    assert!(ring.curve().is_closed());
}

#[test]
fn punctured_square_layout() {
    let cell = test_util::punctured_square(16, 0.25, GridCfg { rows: 11, cols: 11 });
    assert_eq!(cell.num_edges(), 5);
    assert_eq!(cell.num_holes().unwrap(), 1);
    assert_eq!(cell.num_pts().unwrap(), 160);
    let ranges = cell.component_ranges().unwrap();
    assert_eq!(ranges, &[0..128, 128..160]);
    assert!(cell.edges()[4].is_loop());
    let xi = cell.hole_interior_points().unwrap()[0];
    assert!((xi - Vector2::new(0.5, 0.5)).norm() < 1e-14);

    // ∮ x₁ n₁ ds = |K|
    let (x1, x2) = cell.get_boundary_points().unwrap();
    let zeros = vec![0.0; x2.len()];
    let f = cell.dot_with_normal(x1, &zeros).unwrap();
    let area = cell.integrate_over_boundary(&f).unwrap();
    assert!((area - (1.0 - PI / 16.0)).abs() < 1e-8, "area = {area}");

    let inside = cell.is_inside().unwrap();
    assert!(inside[(1, 1)]);
    assert!(!inside[(5, 5)]);
    assert!(!inside[(0, 3)]);
    assert!((cell.int_x1().unwrap()[(2, 3)] - 0.3).abs() < 1e-14);
    assert!((cell.int_x2().unwrap()[(2, 3)] - 0.2).abs() < 1e-14);
}

/// 2 × 2 square (cell 9) with a 0.4 × 0.4 square hole whose edges are
/// listed counterclockwise with the cell on the right, in reverse order.
fn polygonal_hole_cell() -> MeshCell {
    let v = [
        Vert::new(0, 0.0, 0.0),
        Vert::new(1, 2.0, 0.0),
        Vert::new(2, 2.0, 2.0),
        Vert::new(3, 0.0, 2.0),
        Vert::new(4, 0.8, 0.8),
        Vert::new(5, 1.2, 0.8),
        Vert::new(6, 1.2, 1.2),
        Vert::new(7, 0.8, 1.2),
    ];
    let mut edges = Vec::new();
    for k in 0..4 {
        edges.push(
            Edge::new(k, v[k], v[(k + 1) % 4], Arc::new(Line)).with_cells(Some(9), None),
        );
        edges.push(
            Edge::new(4 + k, v[4 + k], v[4 + (k + 1) % 4], Arc::new(Line))
                .with_cells(None, Some(9)),
        );
    }
    edges.reverse();
    MeshCell::new(9, edges)
        .unwrap()
        .with_grid(GridCfg { rows: 5, cols: 5 })
}

fn cell_area(cell: &MeshCell) -> f64 {
    let (x1, x2) = cell.get_boundary_points().unwrap();
    let zeros = vec![0.0; x2.len()];
    let f = cell.dot_with_normal(x1, &zeros).unwrap();
    cell.integrate_over_boundary(&f).unwrap()
}

#[test]
fn polygonal_hole_gets_deepest_point_and_shuffled_edges_chain() {
    let mut cell = polygonal_hole_cell();
    cell.parameterize(&qd(8)).unwrap();
    assert_eq!(cell.num_holes().unwrap(), 1);
    let outer: Vec<usize> = cell.edges()[..4].iter().map(|e| e.id).collect();
    assert!(outer.iter().all(|&id| id < 4));
    let xi = cell.hole_interior_points().unwrap()[0];
    assert!((xi - Vector2::new(1.0, 1.0)).norm() < 0.05);
    // flipped hole edges now have the cell on their left
    assert!(cell.edges()[4..]
        .iter()
        .all(|e| e.pos_cell_idx == Some(9) && e.neg_cell_idx.is_none() && e.is_reversed()));
}

#[test]
fn cells_can_be_parameterized_again() {
    let mut cell = polygonal_hole_cell();
    cell.parameterize(&qd(8)).unwrap();
    assert!((cell_area(&cell) - 3.84).abs() < 1e-5);
    cell.parameterize(&qd(16)).unwrap();
    assert_eq!(cell.num_holes().unwrap(), 1);
    assert_eq!(cell.num_pts().unwrap(), 8 * 32);
    assert!((cell_area(&cell) - 3.84).abs() < 1e-8);

    let mut square = test_util::punctured_square(8, 0.25, GridCfg { rows: 3, cols: 3 });
    square.parameterize(&qd(16)).unwrap();
    assert_eq!(square.component_ranges().unwrap(), &[0..128, 128..160]);
    assert!((cell_area(&square) - (1.0 - PI / 16.0)).abs() < 1e-8);
}

#[test]
fn reversal_survives_reparameterization() {
    let mut e = line_edge((0.0, 0.0), (1.0, 0.5)).with_cells(None, Some(2));
    e.parameterize(&qd(8)).unwrap();
    e.reverse_orientation().unwrap();
    assert_eq!((e.anchor.id, e.endpnt.id), (1, 0));
    assert_eq!((e.pos_cell_idx, e.neg_cell_idx), (Some(2), None));
    let before = e.samples().unwrap().clone();
    e.parameterize(&qd(8)).unwrap();
    let after = e.samples().unwrap();
    for (a, b) in before.x.iter().zip(&after.x) {
        assert!((a - b).norm() < 1e-14);
    }
    assert!((after.x[0] - Vector2::new(1.0, 0.5)).norm() < 1e-14);
    assert_eq!(before.normal, after.normal);
    assert_frame(&e);
}

#[test]
fn open_boundary_is_degenerate() {
    let v = [
        Vert::new(0, 0.0, 0.0),
        Vert::new(1, 1.0, 0.0),
        Vert::new(2, 1.0, 1.0),
    ];
    let edges = vec![
        Edge::new(0, v[0], v[1], Arc::new(Line)).with_cells(Some(0), None),
        Edge::new(1, v[1], v[2], Arc::new(Line)).with_cells(Some(0), None),
    ];
    let mut cell = MeshCell::new(0, edges).unwrap();
    assert!(matches!(cell.parameterize(&qd(8)), Err(Error::Degenerate { .. })));
    assert!(matches!(cell.num_pts(), Err(Error::NotParameterized { .. })));

    let stray = Edge::new(5, v[0], v[1], Arc::new(Line)).with_cells(Some(3), None);
    assert!(matches!(MeshCell::new(0, vec![stray]), Err(Error::InvalidInput { .. })));
}

#[test]
fn boundary_reducers_check_lengths() {
    let cell = test_util::punctured_square(8, 0.25, GridCfg { rows: 3, cols: 3 });
    assert!(matches!(
        cell.integrate_over_boundary(&[1.0; 3]),
        Err(Error::SizeMismatch { .. })
    ));
    assert!(cell.multiply_by_dx_norm(&[0.0; 80]).is_ok());
}
