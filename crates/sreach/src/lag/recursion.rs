//! Backward recursion over the time horizon, under- and over-approximating
//! variants.
//!
//! Time is strictly sequential: step k needs step k+1's fully merged
//! result. Within a step, realizations (and inside them, directions) are
//! independent and run on the worker pool; results are reassembled by
//! index, never by completion order.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::diag::{DiagCode, DiagSink, Diagnostic};
use crate::dirs::DirectionSet;
use crate::error::SreachError;
use crate::geom::{ConvexSet, Halfspace};
use crate::lp::{LinearProgram, LpBackend, LpStatus};
use crate::sys::{DisturbanceList, Dynamics, Tube};

use super::step::{backward_reach_step, BoundaryRecord, StepOutput};

/// Under-approximating Lagrangian recursion.
///
/// Returns the full effective target tube (length = input tube length);
/// element 0 is the initial-state under-approximation. Any fatal solver
/// outcome aborts the whole recursion; no partial tube survives.
pub(crate) fn lag_under_recursion(
    dynamics: &Dynamics,
    tube: &Tube,
    dists: &DisturbanceList,
    dirs: &DirectionSet,
    backend: &dyn LpBackend,
    sink: &mut DiagSink,
    want_records: bool,
) -> Result<(Vec<ConvexSet>, Vec<BoundaryRecord>), SreachError> {
    let len = tube.len();
    let n = dynamics.state_dim();

    if dists.len() > 1 && n > 2 {
        // The hull merge across realizations has no established soundness
        // argument above two state dimensions; preserved behavior, advised.
        sink.push(Diagnostic::new(
            DiagCode::HullMergeDimension,
            format!(
                "merging {} disturbance realizations by convex hull in state dimension {n}",
                dists.len()
            ),
        ));
    }

    // Fixed-length effective tube, written by index during the backward
    // pass; the terminal element is the tube's own last set.
    let mut effective: Vec<ConvexSet> = vec![ConvexSet::empty(n); len];
    effective[len - 1] = tube.last().clone();
    let mut records: Vec<BoundaryRecord> = Vec::new();

    for k in (0..len - 1).rev() {
        let target_next = effective[k + 1].clone();
        if target_next.is_empty() {
            // Empty propagates: no precursor can reach an empty target.
            effective[k] = ConvexSet::empty(n);
            continue;
        }
        let target_now = tube.get(k);

        let outputs: Vec<Result<StepOutput, SreachError>> = (0..dists.len())
            .into_par_iter()
            .map(|r| {
                backward_reach_step(
                    dynamics,
                    k,
                    &target_next,
                    target_now,
                    dists.get(r),
                    r,
                    dirs,
                    backend,
                    want_records,
                )
            })
            .collect();

        let mut step_sets = Vec::with_capacity(dists.len());
        for out in outputs {
            let out = out?; // fail fast, in realization order
            for d in out.diags {
                sink.push(d);
            }
            records.extend(out.records);
            step_sets.push(out.set);
        }
        effective[k] = merge_realizations(n, step_sets)?;
    }

    Ok((effective, records))
}

/// Merge per-realization backward images: a single realization passes
/// through unchanged; several are combined as the convex hull of their
/// vertex union. Each input is individually sound and contained in the
/// convex step-k target, so the hull stays inside that target as well.
fn merge_realizations(
    dim: usize,
    sets: Vec<ConvexSet>,
) -> Result<ConvexSet, SreachError> {
    if sets.len() == 1 {
        let mut it = sets;
        return Ok(it.pop().unwrap_or_else(|| unreachable!()));
    }
    let mut union: Vec<DVector<f64>> = Vec::new();
    for s in &sets {
        if s.is_empty() {
            continue;
        }
        union.extend(s.vertices()?);
    }
    ConvexSet::from_vertices(dim, union)
}

/// Over-approximating dual recursion.
///
/// Structurally symmetric to the under variant: the next-step target is
/// inflated by an outer Minkowski sum instead of tightened, and the lifted
/// polytope is projected from outside by per-direction support values over
/// a state-dimension direction set. Realizations merge by intersection
/// (each outer set covers its realization; their intersection covers
/// states admissible under every one).
pub(crate) fn lag_over_recursion(
    dynamics: &Dynamics,
    tube: &Tube,
    dists: &DisturbanceList,
    dirs: &DirectionSet,
    backend: &dyn LpBackend,
    sink: &mut DiagSink,
) -> Result<Vec<ConvexSet>, SreachError> {
    let len = tube.len();
    let n = dynamics.state_dim();
    let m = dynamics.input_dim();

    let mut effective: Vec<ConvexSet> = vec![ConvexSet::empty(n); len];
    effective[len - 1] = tube.last().clone();

    for k in (0..len - 1).rev() {
        let target_next = effective[k + 1].clone();
        if target_next.is_empty() {
            effective[k] = ConvexSet::empty(n);
            continue;
        }
        let target_now = tube.get(k);

        let mut merged: Option<ConvexSet> = None;
        for (r, w) in dists.iter().enumerate() {
            let mapped = w.linear_image(dynamics.dist_mat(k))?;
            let inflated = target_next.minkowski_sum_outer(&mapped)?;
            let mut lifted_h = inflated
                .preimage_lift(dynamics.state_mat(k), dynamics.input_mat(k))?
                .halfspaces()?;
            for h in dynamics.input_space().halfspaces()? {
                let mut row = DVector::zeros(n + m);
                row.rows_mut(n, m).copy_from(&h.n);
                lifted_h.push(Halfspace::new(row, h.c));
            }
            let nrows = lifted_h.len();
            let mut a = nalgebra::DMatrix::<f64>::zeros(nrows, n + m);
            let mut b = DVector::<f64>::zeros(nrows);
            for (i, h) in lifted_h.iter().enumerate() {
                a.row_mut(i).copy_from(&h.n.transpose());
                b[i] = h.c;
            }

            // Outer projection: support of the lifted polytope along each
            // state direction gives one facet of a covering polytope.
            let supports: Vec<Result<(f64, bool), LpStatus>> = (0..dirs.len())
                .into_par_iter()
                .map(|j| {
                    let d = dirs.column(j);
                    let mut obj = DVector::<f64>::zeros(n + m);
                    obj.rows_mut(0, n).copy_from(&d);
                    let out = backend.solve(&LinearProgram::new(obj, a.clone(), b.clone()));
                    match out.status {
                        LpStatus::Solved | LpStatus::SolvedInaccurate => {
                            let v = out.value.ok_or(LpStatus::Error)?;
                            Ok((v, out.status == LpStatus::SolvedInaccurate))
                        }
                        other => Err(other),
                    }
                })
                .collect();

            let mut facets = Vec::with_capacity(dirs.len());
            let mut infeasible = false;
            for (j, s) in supports.into_iter().enumerate() {
                match s {
                    Ok((val, inaccurate)) => {
                        if inaccurate {
                            sink.push(
                                Diagnostic::new(
                                    DiagCode::InaccurateSolve,
                                    "support value accepted from an inaccurate solve",
                                )
                                .at(k)
                                .direction(j)
                                .realization(r),
                            );
                        }
                        facets.push(Halfspace::new(dirs.column(j), val));
                    }
                    Err(LpStatus::Infeasible) => {
                        // The inflated lifted polytope is empty: the
                        // effective target collapses for this realization.
                        infeasible = true;
                        break;
                    }
                    Err(status) => {
                        return Err(SreachError::InternalInconsistency {
                            step: k,
                            dir: j,
                            realization: r,
                            status,
                        })
                    }
                }
            }
            let outer = if infeasible {
                ConvexSet::empty(n)
            } else {
                ConvexSet::from_halfspaces(n, facets)?.intersect(target_now)?
            };
            merged = Some(match merged {
                None => outer,
                Some(prev) => prev.intersect(&outer)?,
            });
        }
        effective[k] = merged.unwrap_or_else(|| ConvexSet::empty(n));
    }

    Ok(effective)
}
