use nalgebra::{DMatrix, DVector};

use super::*;
use crate::error::SreachError;
use crate::lp::DenseSimplex;

fn vecd(xs: &[f64]) -> DVector<f64> {
    DVector::from_column_slice(xs)
}

fn has_vertex(vs: &[DVector<f64>], p: &[f64]) -> bool {
    vs.iter().any(|v| (v - vecd(p)).norm() < 1e-7)
}

#[test]
fn box_round_trips_between_representations() {
    let b = ConvexSet::box_nd(&[-1.0, -2.0], &[1.0, 2.0]).expect("box");
    let vs = b.vertices().expect("vertices");
    assert_eq!(vs.len(), 4);
    for p in [[1.0, 2.0], [1.0, -2.0], [-1.0, 2.0], [-1.0, -2.0]] {
        assert!(has_vertex(&vs, &p));
    }
    // V -> H -> V
    let from_v = ConvexSet::from_vertices(2, vs).expect("set");
    let again = from_v.canonicalize().expect("canonical");
    assert_eq!(again.vertices().expect("vertices").len(), 4);
    assert!(again.contains_eps(&vecd(&[0.9, 1.9]), 1e-9));
    assert!(!again.contains_eps(&vecd(&[1.1, 0.0]), 1e-9));
}

#[test]
fn cube_3d_recovers_six_facets() {
    let cube = ConvexSet::box_nd(&[-1.0; 3], &[1.0; 3]).expect("cube");
    let vs = cube.vertices().expect("vertices");
    assert_eq!(vs.len(), 8);
    let from_v = ConvexSet::from_vertices(3, vs).expect("set");
    let hs = from_v.halfspaces().expect("facets");
    // Exactly the six axis planes; diagonal vertex triples do not support.
    assert_eq!(hs.len(), 6);
    for h in &hs {
        assert!((h.c - 1.0).abs() < 1e-7);
        assert!((h.n.norm() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn intersect_concatenates_facets() {
    let a = ConvexSet::box_nd(&[-2.0, -2.0], &[2.0, 2.0]).expect("a");
    let b = ConvexSet::box_nd(&[0.0, -1.0], &[3.0, 1.0]).expect("b");
    let c = a.intersect(&b).expect("intersection");
    let vs = c.vertices().expect("vertices");
    assert_eq!(vs.len(), 4);
    assert!(has_vertex(&vs, &[0.0, -1.0]));
    assert!(has_vertex(&vs, &[2.0, 1.0]));
}

#[test]
fn minkowski_difference_against_polytope_shrinks_box() {
    let b = ConvexSet::box_nd(&[-1.0, -1.0], &[1.0, 1.0]).expect("box");
    let w = Disturbance::Polytope(
        ConvexSet::box_nd(&[-0.25, -0.25], &[0.25, 0.25]).expect("w"),
    );
    let d = b.minkowski_difference(&w).expect("difference");
    let vs = d.vertices().expect("vertices");
    assert!(has_vertex(&vs, &[0.75, 0.75]));
    assert!(has_vertex(&vs, &[-0.75, -0.75]));
    assert_eq!(vs.len(), 4);
}

#[test]
fn minkowski_difference_against_ball_uses_support_closed_form() {
    let b = ConvexSet::box_nd(&[-1.0, -1.0], &[1.0, 1.0]).expect("box");
    let w = Disturbance::SupportFn(SupportFnSet::Ball {
        center: vecd(&[0.0, 0.0]),
        radius: 0.5,
    });
    let d = b.minkowski_difference(&w).expect("difference");
    // Every facet offset tightens by the radius (unit normals).
    for h in d.halfspaces().expect("facets") {
        assert!((h.c - 0.5).abs() < 1e-9);
    }
}

#[test]
fn minkowski_sum_outer_inflates_box() {
    let b = ConvexSet::box_nd(&[-1.0, -1.0], &[1.0, 1.0]).expect("box");
    let w = Disturbance::SupportFn(SupportFnSet::Ball {
        center: vecd(&[0.0, 0.0]),
        radius: 0.5,
    });
    let s = b.minkowski_sum_outer(&w).expect("sum");
    for h in s.halfspaces().expect("facets") {
        assert!((h.c - 1.5).abs() < 1e-9);
    }
}

#[test]
fn ellipsoid_support_values() {
    let e = SupportFnSet::Ellipsoid {
        center: vecd(&[1.0, 0.0]),
        shape: DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 0.0, 1.0]),
    };
    // Along x: center + sqrt(4) = 3; along y: 0 + 1.
    assert!((e.support_value(&vecd(&[1.0, 0.0])) - 3.0).abs() < 1e-12);
    assert!((e.support_value(&vecd(&[0.0, 1.0])) - 1.0).abs() < 1e-12);
    // Linear image under a rotation keeps support along mapped axes.
    let rot = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
    let re = e.linear_image(&rot).expect("image");
    assert!((re.support_value(&vecd(&[0.0, 1.0])) - 3.0).abs() < 1e-9);
}

#[test]
fn projection_of_cube_is_square() {
    let cube = ConvexSet::box_nd(&[-1.0, -2.0, -3.0], &[1.0, 2.0, 3.0]).expect("cube");
    let sq = cube.project(&[0, 1]).expect("projection");
    let vs = sq.vertices().expect("vertices");
    assert_eq!(vs.len(), 4);
    assert!(has_vertex(&vs, &[1.0, 2.0]));
    let line = cube.project(&[2]).expect("projection");
    let vs = line.vertices().expect("vertices");
    assert!(has_vertex(&vs, &[-3.0]) && has_vertex(&vs, &[3.0]));
}

#[test]
fn projection_of_flat_vertex_cloud_degenerates_cleanly() {
    // Segment in the plane: collinear cloud must still produce a bounded
    // facet form.
    let seg = ConvexSet::from_vertices(
        2,
        vec![vecd(&[-2.0, 1.0]), vecd(&[0.0, 1.0]), vecd(&[2.0, 1.0])],
    )
    .expect("segment");
    let hs = seg.halfspaces().expect("facets");
    let back = ConvexSet::from_halfspaces(2, hs).expect("set");
    let vs = back.vertices().expect("vertices");
    assert_eq!(vs.len(), 2);
    assert!(has_vertex(&vs, &[-2.0, 1.0]) && has_vertex(&vs, &[2.0, 1.0]));
}

#[test]
fn preimage_lift_pulls_constraints_back() {
    // Target x <= 1 under x' = 2x + u: lifted facet 2x + u <= 1.
    let t = ConvexSet::from_halfspaces(1, vec![Halfspace::new(vecd(&[1.0]), 1.0)]).expect("t");
    let phi = DMatrix::from_row_slice(1, 1, &[2.0]);
    let gamma = DMatrix::from_row_slice(1, 1, &[1.0]);
    let lifted = t.preimage_lift(&phi, &gamma).expect("lift");
    let hs = lifted.halfspaces().expect("facets");
    assert_eq!(hs.len(), 1);
    assert!((hs[0].n[0] - 2.0).abs() < 1e-12);
    assert!((hs[0].n[1] - 1.0).abs() < 1e-12);
    assert!((hs[0].c - 1.0).abs() < 1e-12);
}

#[test]
fn chebyshev_center_of_rectangle() {
    let b = ConvexSet::box_nd(&[0.0, 0.0], &[4.0, 2.0]).expect("box");
    let ball = b
        .chebyshev_center(&DenseSimplex)
        .expect("solve")
        .expect("nonempty");
    assert!((ball.radius - 1.0).abs() < 1e-7);
    // Center is 1 away from top and bottom; x is any point in [1, 3].
    assert!((ball.center[1] - 1.0).abs() < 1e-7);
    assert!(ball.center[0] >= 1.0 - 1e-7 && ball.center[0] <= 3.0 + 1e-7);
}

#[test]
fn chebyshev_detects_empty_facet_form() {
    let e = ConvexSet::from_halfspaces(
        1,
        vec![
            Halfspace::new(vecd(&[1.0]), 0.0),
            Halfspace::new(vecd(&[-1.0]), -1.0),
        ],
    )
    .expect("set");
    assert!(e.chebyshev_center(&DenseSimplex).expect("solve").is_none());
}

#[test]
fn unbounded_facet_form_is_a_geometry_error() {
    // Halfplane x <= 1: no corner enumeration can bound it.
    let hp = ConvexSet::from_halfspaces(2, vec![Halfspace::new(vecd(&[1.0, 0.0]), 1.0)])
        .expect("set");
    assert!(matches!(hp.vertices(), Err(SreachError::Geometry { .. })));
    // Wedge x >= 0, y >= 0: has a corner, still recedes to infinity.
    let wedge = ConvexSet::from_halfspaces(
        2,
        vec![
            Halfspace::new(vecd(&[-1.0, 0.0]), 0.0),
            Halfspace::new(vecd(&[0.0, -1.0]), 0.0),
        ],
    )
    .expect("set");
    assert!(matches!(wedge.vertices(), Err(SreachError::Geometry { .. })));
}

#[test]
fn infeasible_bounded_facet_form_yields_no_vertices() {
    // x <= 0 and x >= 1 inside |y| <= 1: empty, not unbounded.
    let s = ConvexSet::from_halfspaces(
        2,
        vec![
            Halfspace::new(vecd(&[1.0, 0.0]), 0.0),
            Halfspace::new(vecd(&[-1.0, 0.0]), -1.0),
            Halfspace::new(vecd(&[0.0, 1.0]), 1.0),
            Halfspace::new(vecd(&[0.0, -1.0]), 1.0),
        ],
    )
    .expect("set");
    assert!(s.vertices().expect("conversion").is_empty());
}

#[test]
fn inverted_interval_is_empty() {
    let e = ConvexSet::interval(1.0, -1.0);
    assert!(e.is_empty());
    assert!(e.vertices().expect("vertices").is_empty());
}

#[test]
fn translate_shifts_both_representations() {
    let b = ConvexSet::box_nd(&[-1.0, -1.0], &[1.0, 1.0])
        .expect("box")
        .canonicalize()
        .expect("canonical");
    let t = b.translate(&vecd(&[2.0, -1.0])).expect("translate");
    let vs = t.vertices().expect("vertices");
    assert!(has_vertex(&vs, &[3.0, 0.0]) && has_vertex(&vs, &[1.0, -2.0]));
    assert!(t.contains_eps(&vecd(&[2.0, -1.0]), 1e-9));
    assert!(!t.contains_eps(&vecd(&[0.0, 0.0]), -1e-9));
}

#[test]
fn scale_grows_about_the_origin() {
    let b = ConvexSet::box_nd(&[-1.0, -2.0], &[1.0, 2.0]).expect("box");
    let s = b.scale(0.5).expect("scale");
    assert!((s.support(&vecd(&[1.0, 0.0])).expect("support") - 0.5).abs() < 1e-9);
    assert!((s.support(&vecd(&[0.0, 1.0])).expect("support") - 1.0).abs() < 1e-9);
    assert!(b.scale(0.0).is_err());
    assert!(b.scale(-2.0).is_err());
}

#[test]
fn support_of_polytope_via_vertices() {
    let b = ConvexSet::box_nd(&[-1.0, -2.0], &[3.0, 2.0]).expect("box");
    assert!((b.support(&vecd(&[1.0, 0.0])).expect("support") - 3.0).abs() < 1e-9);
    assert!((b.support(&vecd(&[-1.0, 0.0])).expect("support") - 1.0).abs() < 1e-9);
    assert!((b.support(&vecd(&[1.0, 1.0])).expect("support") - 5.0).abs() < 1e-9);
}

#[test]
fn equality_rows_expand_to_paired_inequalities() {
    // x + y = 1 inside the unit square: a diagonal segment.
    let a = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, -1.0]);
    let b = DVector::from_column_slice(&[1.0, 0.0, 1.0, 0.0]);
    let ae = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
    let be = DVector::from_column_slice(&[1.0]);
    let s = ConvexSet::from_facets(&a, &b, Some((&ae, &be))).expect("set");
    let vs = s.vertices().expect("vertices");
    assert_eq!(vs.len(), 2);
    assert!(has_vertex(&vs, &[1.0, 0.0]) && has_vertex(&vs, &[0.0, 1.0]));
}
