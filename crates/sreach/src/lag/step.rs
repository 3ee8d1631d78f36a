//! One-step robust backward-reachable-set computation.
//!
//! The step is the composition the whole engine is built around: tighten
//! the next-step target against one disturbance realization, pull the
//! result back through the dynamics into (state, input) space, sample that
//! lifted polytope's boundary by ray shooting from its Chebyshev center,
//! and project the sampled under-polytope onto the state coordinates.
//! Finitely many directions necessarily under-approximate the lifted
//! shape, which is exactly the conservative side for this algorithm.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::diag::{DiagCode, Diagnostic};
use crate::dirs::DirectionSet;
use crate::error::SreachError;
use crate::geom::{ConvexSet, Disturbance, Halfspace};
use crate::lp::shoot::boundary_point;
use crate::lp::LpBackend;
use crate::sys::Dynamics;

/// Recorded outcome of one accepted ray solve, kept when the caller wants
/// boundary data for downstream controller extraction.
#[derive(Clone, Debug)]
pub struct BoundaryRecord {
    pub step: usize,
    pub realization: usize,
    pub dir_index: usize,
    pub theta: f64,
    pub point: DVector<f64>,
}

pub(crate) struct StepOutput {
    pub set: ConvexSet,
    pub records: Vec<BoundaryRecord>,
    pub diags: Vec<Diagnostic>,
}

/// Robust backward step for a single disturbance realization.
///
/// Produces `T_k = proj_x( under(L) ) ∩ target_k` where
/// `L = { (x,u) : Φx + Γu ∈ T_{k+1} ⊖ F·W, u ∈ U }`.
pub(crate) fn backward_reach_step(
    dynamics: &Dynamics,
    k: usize,
    target_next: &ConvexSet,
    target_now: &ConvexSet,
    realization: &Disturbance,
    realization_index: usize,
    dirs: &DirectionSet,
    backend: &dyn LpBackend,
    want_records: bool,
) -> Result<StepOutput, SreachError> {
    let n = dynamics.state_dim();
    let m = dynamics.input_dim();
    let mut diags = Vec::new();

    // 1. Robustify the next-step target against the realized disturbance.
    let mapped = realization.linear_image(dynamics.dist_mat(k))?;
    let tightened = target_next.minkowski_difference(&mapped)?;

    // 2. Pull back through the one-step map and constrain the input.
    let mut lifted_h = tightened
        .preimage_lift(dynamics.state_mat(k), dynamics.input_mat(k))?
        .halfspaces()?;
    for h in dynamics.input_space().halfspaces()? {
        let mut row = DVector::zeros(n + m);
        row.rows_mut(n, m).copy_from(&h.n);
        lifted_h.push(Halfspace::new(row, h.c));
    }
    let lifted = ConvexSet::from_halfspaces(n + m, lifted_h.clone())?;

    // 3. Interior anchor. An infeasible Chebyshev program certifies that
    // the tightened target admits no precursor at all; the effective
    // target collapses to empty from here backward.
    let Some(ball) = lifted.chebyshev_center(backend)? else {
        return Ok(StepOutput {
            set: ConvexSet::empty(n),
            records: Vec::new(),
            diags,
        });
    };
    if ball.inaccurate {
        diags.push(
            Diagnostic::new(
                DiagCode::InaccurateSolve,
                "chebyshev anchor accepted from an inaccurate solve",
            )
            .at(k)
            .realization(realization_index),
        );
    }

    // 4. Per-direction ray shoots: independent pure solves over shared
    // read-only inputs; collected by index so vertex order is scheduling-
    // independent.
    let shots: Vec<_> = (0..dirs.len())
        .into_par_iter()
        .map(|j| {
            let d = dirs.column(j);
            boundary_point(&lifted_h, &ball.center, &d, backend)
        })
        .collect();

    let mut points = Vec::with_capacity(shots.len());
    let mut records = Vec::new();
    for (j, shot) in shots.into_iter().enumerate() {
        let bp = shot.map_err(|status| SreachError::InternalInconsistency {
            step: k,
            dir: j,
            realization: realization_index,
            status,
        })?;
        if bp.inaccurate {
            diags.push(
                Diagnostic::new(
                    DiagCode::InaccurateSolve,
                    "boundary point accepted from an inaccurate solve",
                )
                .at(k)
                .direction(j)
                .realization(realization_index),
            );
        }
        if want_records {
            records.push(BoundaryRecord {
                step: k,
                realization: realization_index,
                dir_index: j,
                theta: bp.theta,
                point: bp.point.clone(),
            });
        }
        points.push(bp.point);
    }

    // 5-7. Vertex under-polytope, state projection, tube containment.
    let under = ConvexSet::from_vertices(n + m, points)?;
    let state_coords: Vec<usize> = (0..n).collect();
    let candidate = under.project(&state_coords)?;
    let set = candidate.intersect(target_now)?;

    Ok(StepOutput {
        set,
        records,
        diags,
    })
}
