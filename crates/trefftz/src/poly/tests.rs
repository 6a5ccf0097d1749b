use super::*;
use crate::cfg::GridCfg;
use crate::mesh::test_util::punctured_square;
use num::rational::Rational64;
use proptest::prelude::*;
use std::f64::consts::PI;

type QPoly = Polynomial<Rational64>;

fn q(n: i64, d: i64) -> Rational64 {
    Rational64::new(n, d)
}

#[test]
fn rank_enumeration_is_triangular() {
    assert_eq!(MultiIndex::new(0, 0).rank(), 0);
    assert_eq!(MultiIndex::new(1, 0).rank(), 1);
    assert_eq!(MultiIndex::new(0, 1).rank(), 2);
    assert_eq!(MultiIndex::new(2, 0).rank(), 3);
    assert_eq!(MultiIndex::new(0, 2).rank(), 5);
    for idx in 0..200 {
        assert_eq!(MultiIndex::from_rank(idx).rank(), idx);
    }
    assert_eq!(MultiIndex::from_rank(7), MultiIndex::new(2, 1));
}

#[test]
fn consolidation_merges_drops_and_sorts() {
    let p = Polynomial::new([(1.0, 0, 2), (2.0, 1, 0), (-1.0, 0, 2), (3.0, 0, 0), (1.0, 1, 0)]);
    let idx: Vec<MultiIndex> = p.monomials().iter().map(|m| m.idx).collect();
    assert_eq!(idx, vec![MultiIndex::new(0, 0), MultiIndex::new(1, 0)]);
    assert_eq!(p.monomials()[1].coef, 3.0);
    assert_eq!(p, Polynomial::new([(3.0, 1, 0), (3.0, 0, 0)]));
    assert!((p.clone() - p).is_zero());
    assert_eq!(Polynomial::<f64>::zero().degree(), None);
}

#[test]
fn display_lists_terms_by_rank() {
    let p = Polynomial::new([(2.0, 2, 1), (1.0, 0, 0), (-1.5, 0, 1)]);
    assert_eq!(p.to_string(), "1 + -1.5 y + 2 x^2 y");
    assert_eq!(Polynomial::<f64>::zero().to_string(), "0");
}

#[test]
fn derivatives_are_literal() {
    // x³y + y²
    let p = QPoly::from_ints([(1, 3, 1), (1, 0, 2)]);
    let (px, py) = p.grad();
    assert_eq!(px, QPoly::from_ints([(3, 2, 1)]));
    assert_eq!(py, QPoly::from_ints([(1, 3, 0), (2, 0, 1)]));
    assert_eq!(p.laplacian(), QPoly::from_ints([(6, 1, 1), (2, 0, 0)]));
}

#[test]
fn anti_laplacian_closed_forms() {
    let one = QPoly::constant(q(1, 1));
    assert_eq!(
        one.anti_laplacian(),
        QPoly::new([(q(1, 4), 2, 0), (q(1, 4), 0, 2)])
    );
    let x2 = QPoly::from_ints([(1, 2, 0)]);
    assert_eq!(
        x2.anti_laplacian(),
        QPoly::new([(q(7, 96), 4, 0), (q(1, 16), 2, 2), (q(-1, 96), 0, 4)])
    );
    // degree-d monomials stop after ⌊d/2⌋ corrections: A has degree d + 2
    let m = QPoly::from_ints([(1, 3, 2)]);
    assert_eq!(m.anti_laplacian().degree(), Some(7));
}

#[test]
fn anti_laplacian_passes_finite_difference_check() {
    let (x, y, h) = (0.3, 0.7, 1e-3);
    for idx in 0..21 {
        let m = Polynomial::from_rank(1.0, idx);
        let a = m.anti_laplacian();
        let fd = (a.eval(x + h, y) + a.eval(x - h, y) + a.eval(x, y + h) + a.eval(x, y - h)
            - 4.0 * a.eval(x, y))
            / (h * h);
        let exact = m.eval(x, y);
        assert!((fd - exact).abs() < 1e-5, "rank {idx}: {fd} vs {exact}");
    }
}

#[test]
fn pow_and_compose() {
    let xy = QPoly::from_ints([(1, 1, 0), (1, 0, 1)]);
    assert_eq!(xy.pow(2), QPoly::from_ints([(1, 2, 0), (2, 1, 1), (1, 0, 2)]));
    assert_eq!(xy.pow(0), QPoly::constant(q(1, 1)));
    let p = QPoly::from_ints([(1, 1, 1)]);
    let shifted = p.compose(&QPoly::from_ints([(1, 1, 0), (1, 0, 0)]), &QPoly::from_ints([(1, 0, 1)]));
    assert_eq!(shifted, QPoly::from_ints([(1, 1, 1), (1, 0, 1)]));
}

#[test]
fn scalar_ops_and_conversion() {
    let p = Polynomial::new([(2.0, 1, 0)]) * 3.0;
    assert_eq!(p, Polynomial::new([(6.0, 1, 0)]));
    assert_eq!(0.5 * p.clone(), Polynomial::new([(3.0, 1, 0)]));
    assert_eq!(p / 2.0, Polynomial::new([(3.0, 1, 0)]));
    let r = QPoly::new([(q(1, 4), 2, 0)]);
    assert_eq!(r.to_f64(), Polynomial::new([(0.25, 2, 0)]));
    assert!((r.eval(2.0, 5.0) - 1.0).abs() < 1e-15);
    assert_eq!(PiecewisePolynomial::<f64>::zeros(3).num_polys(), 3);
    assert!(PiecewisePolynomial::<f64>::zeros(3).is_zero());
}

fn small_poly() -> impl Strategy<Value = QPoly> {
    proptest::collection::vec((-5i64..=5, 0u32..4, 0u32..4), 0..6).prop_map(QPoly::from_ints)
}

proptest! {
    #[test]
    fn laplacian_inverts_anti_laplacian_exactly(p in small_poly()) {
        prop_assert_eq!(p.anti_laplacian().laplacian(), p);
    }

    #[test]
    fn ring_laws_hold_exactly(a in small_poly(), b in small_poly(), c in small_poly()) {
        prop_assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
        prop_assert_eq!(&(&a * &b) * &c, &a * &(&b * &c));
        prop_assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
        prop_assert_eq!(&a * &b, &b * &a);
        prop_assert!((&a - &a).is_zero());
    }
}

#[test]
fn cell_integrals_match_closed_forms() {
    let r = 0.25;
    let cell = punctured_square(32, r, GridCfg { rows: 3, cols: 3 });
    let area = 1.0 - PI * r * r;
    let one = Polynomial::constant(1.0);
    assert!((integrate_poly_over_cell(&one, &cell).unwrap() - area).abs() < 1e-9);

    // ∫_disk x² = π r² cₓ² + π r⁴ / 4
    let x2 = Polynomial::new([(1.0, 2, 0)]);
    let exact = 1.0 / 3.0 - (PI * r * r * 0.25 + PI * r.powi(4) / 4.0);
    assert!((integrate_poly_over_cell(&x2, &cell).unwrap() - exact).abs() < 1e-9);
    let x2q = QPoly::from_ints([(1, 2, 0)]);
    assert!((integrate_poly_over_cell(&x2q, &cell).unwrap() - exact).abs() < 1e-9);

    // ∮ ∂ₙp ds = ∫ Δp
    let r2 = Polynomial::new([(1.0, 2, 0), (1.0, 0, 2)]);
    let wnd = r2.weighted_normal_derivative(&cell).unwrap();
    let flux = cell.integrate_over_boundary_preweighted(&wnd).unwrap();
    assert!((flux - 4.0 * area).abs() < 1e-9);
    assert_eq!(r2.trace(&cell).unwrap().len(), cell.num_pts().unwrap());
}
