//! Boundary-point solver: ray maximization from an interior anchor.
//!
//! The program `max θ >= 0 s.t. anchor + θ·dir ∈ S` is feasible by
//! construction (θ = 0 always qualifies because the anchor is S's own
//! Chebyshev center), so infeasibility reports here signal an internal
//! inconsistency, not a legitimate outcome. The caller converts the status
//! into the fatal error carrying step/direction/realization context.

use nalgebra::{DMatrix, DVector};

use super::{LinearProgram, LpBackend, LpStatus};
use crate::geom::Halfspace;

/// One accepted ray solve: the scale and the achieved boundary point.
#[derive(Clone, Debug)]
pub struct BoundaryPoint {
    pub theta: f64,
    pub point: DVector<f64>,
    /// Accepted from a solved-but-inaccurate status; advisory for the
    /// diagnostics channel.
    pub inaccurate: bool,
}

/// Shoot a ray from `anchor` along `dir` inside the facet-form set `hs`.
///
/// Returns the non-solved status on failure; classification into a fatal
/// error happens at the recursion level where the context lives.
pub fn boundary_point(
    hs: &[Halfspace],
    anchor: &DVector<f64>,
    dir: &DVector<f64>,
    backend: &dyn LpBackend,
) -> Result<BoundaryPoint, LpStatus> {
    // One scalar variable θ: (n_i·dir) θ <= c_i - n_i·anchor, θ >= 0.
    let nrows = hs.len() + 1;
    let mut a = DMatrix::<f64>::zeros(nrows, 1);
    let mut b = DVector::<f64>::zeros(nrows);
    for (i, h) in hs.iter().enumerate() {
        a[(i, 0)] = h.n.dot(dir);
        b[i] = h.c - h.n.dot(anchor);
    }
    a[(hs.len(), 0)] = -1.0;
    b[hs.len()] = 0.0;
    let obj = DVector::from_element(1, 1.0);
    let out = backend.solve(&LinearProgram::new(obj, a, b));
    match out.status {
        LpStatus::Solved | LpStatus::SolvedInaccurate => {
            let theta = match (&out.x, out.value) {
                (Some(x), _) => x[0],
                (None, Some(v)) => v,
                _ => return Err(LpStatus::Error),
            };
            let theta = theta.max(0.0);
            Ok(BoundaryPoint {
                theta,
                point: anchor + dir * theta,
                inaccurate: out.status == LpStatus::SolvedInaccurate,
            })
        }
        other => Err(other),
    }
}
