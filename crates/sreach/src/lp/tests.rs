use nalgebra::{DMatrix, DVector};

use super::shoot::boundary_point;
use super::{DenseSimplex, LinearProgram, LpBackend, LpStatus};
use crate::geom::Halfspace;

fn lp(obj: &[f64], rows: &[(&[f64], f64)]) -> LinearProgram {
    let n = obj.len();
    let m = rows.len();
    let mut a = DMatrix::<f64>::zeros(m, n);
    let mut b = DVector::<f64>::zeros(m);
    for (i, (row, c)) in rows.iter().enumerate() {
        for j in 0..n {
            a[(i, j)] = row[j];
        }
        b[i] = *c;
    }
    LinearProgram::new(DVector::from_column_slice(obj), a, b)
}

#[test]
fn box_corner_optimum() {
    // max x + y over [0,1]^2 -> 2 at (1,1)
    let p = lp(
        &[1.0, 1.0],
        &[
            (&[1.0, 0.0], 1.0),
            (&[-1.0, 0.0], 0.0),
            (&[0.0, 1.0], 1.0),
            (&[0.0, -1.0], 0.0),
        ],
    );
    let out = DenseSimplex.solve(&p);
    assert_eq!(out.status, LpStatus::Solved);
    let x = out.x.expect("optimizer");
    assert!((x[0] - 1.0).abs() < 1e-9 && (x[1] - 1.0).abs() < 1e-9);
    assert!((out.value.expect("value") - 2.0).abs() < 1e-9);
}

#[test]
fn negative_rhs_forces_phase_one() {
    // x >= 1, x <= 3, max -x -> optimum at x = 1
    let p = lp(&[-1.0], &[(&[-1.0], -1.0), (&[1.0], 3.0)]);
    let out = DenseSimplex.solve(&p);
    assert_eq!(out.status, LpStatus::Solved);
    assert!((out.x.expect("optimizer")[0] - 1.0).abs() < 1e-9);
}

#[test]
fn detects_infeasible() {
    // x <= 0 and x >= 1
    let p = lp(&[1.0], &[(&[1.0], 0.0), (&[-1.0], -1.0)]);
    let out = DenseSimplex.solve(&p);
    assert_eq!(out.status, LpStatus::Infeasible);
    assert!(out.x.is_none());
}

#[test]
fn detects_unbounded() {
    // max x with only x >= 0
    let p = lp(&[1.0], &[(&[-1.0], 0.0)]);
    let out = DenseSimplex.solve(&p);
    assert_eq!(out.status, LpStatus::Unbounded);
}

#[test]
fn free_variables_take_negative_values() {
    // min x over x >= -2 (max -x), optimum x = -2
    let p = lp(&[-1.0], &[(&[-1.0], 2.0)]);
    let out = DenseSimplex.solve(&p);
    assert_eq!(out.status, LpStatus::Solved);
    assert!((out.x.expect("optimizer")[0] + 2.0).abs() < 1e-9);
}

#[test]
fn ray_shoot_hits_box_facet() {
    let hs = vec![
        Halfspace::new(DVector::from_column_slice(&[1.0, 0.0]), 1.0),
        Halfspace::new(DVector::from_column_slice(&[-1.0, 0.0]), 1.0),
        Halfspace::new(DVector::from_column_slice(&[0.0, 1.0]), 1.0),
        Halfspace::new(DVector::from_column_slice(&[0.0, -1.0]), 1.0),
    ];
    let anchor = DVector::from_column_slice(&[0.0, 0.0]);
    let dir = DVector::from_column_slice(&[1.0, 0.0]);
    let bp = boundary_point(&hs, &anchor, &dir, &DenseSimplex).expect("solved");
    assert!((bp.theta - 1.0).abs() < 1e-9);
    assert!((bp.point[0] - 1.0).abs() < 1e-9 && bp.point[1].abs() < 1e-9);

    // Off-center anchor still reaches the same facet.
    let anchor = DVector::from_column_slice(&[0.5, -0.25]);
    let bp = boundary_point(&hs, &anchor, &dir, &DenseSimplex).expect("solved");
    assert!((bp.theta - 0.5).abs() < 1e-9);
    assert!((bp.point[0] - 1.0).abs() < 1e-9);
}

#[test]
fn ray_shoot_reports_unbounded_ray() {
    // Halfline x >= 0 only: shooting along +x never leaves the set.
    let hs = vec![Halfspace::new(DVector::from_column_slice(&[-1.0]), 0.0)];
    let anchor = DVector::from_column_slice(&[0.5]);
    let dir = DVector::from_column_slice(&[1.0]);
    let err = boundary_point(&hs, &anchor, &dir, &DenseSimplex).unwrap_err();
    assert_eq!(err, LpStatus::Unbounded);
}

#[test]
fn ray_shoot_zero_direction_component_rows_are_neutral() {
    // Degenerate segment [−1,1] × {0}: equality rows on the second
    // coordinate must not block a shoot along the first.
    let hs = vec![
        Halfspace::new(DVector::from_column_slice(&[1.0, 0.0]), 1.0),
        Halfspace::new(DVector::from_column_slice(&[-1.0, 0.0]), 1.0),
        Halfspace::new(DVector::from_column_slice(&[0.0, 1.0]), 0.0),
        Halfspace::new(DVector::from_column_slice(&[0.0, -1.0]), 0.0),
    ];
    let anchor = DVector::from_column_slice(&[0.0, 0.0]);
    let dir = DVector::from_column_slice(&[-1.0, 0.0]);
    let bp = boundary_point(&hs, &anchor, &dir, &DenseSimplex).expect("solved");
    assert!((bp.theta - 1.0).abs() < 1e-9);
    assert!((bp.point[0] + 1.0).abs() < 1e-9);
}
