//! H↔V conversions in arbitrary (small) dimension.
//!
//! Why enumeration
//! - Vertices are intersections of `dim` active facets; supporting
//!   hyperplanes pass through `dim` affinely independent vertices. Both are
//!   found by enumerating `dim`-tuples, O(m^dim). Acceptable at the state
//!   dimensions this engine targets; above dimension four the caller emits
//!   a performance advisory and support-function disturbances are preferred
//!   precisely to avoid these conversions.

use std::collections::HashSet;

use nalgebra::{DMatrix, DVector, SVD};

use super::cfg::{DET_EPS, FEAS_EPS};
use super::types::Halfspace;
use super::util::{convex_hull_2d, dedup_points_in_place, index_combinations, quantize_plane};
use crate::error::SreachError;
use crate::lp::{DenseSimplex, LinearProgram, LpBackend, LpStatus};

/// Enumerate vertices of `∩ {n_i · x <= c_i}` by intersecting `dim`-tuples
/// of facet boundaries and keeping feasible intersection points.
///
/// Unbounded facet forms are rejected up front (corner enumeration would
/// silently misread them as a smaller polytope); an infeasible form yields
/// an empty list.
pub(crate) fn h_to_vertices(dim: usize, hs: &[Halfspace]) -> Result<Vec<DVector<f64>>, SreachError> {
    if dim == 1 {
        return h_to_vertices_1d(hs);
    }
    if has_recession_direction(dim, hs)? {
        return Err(SreachError::geometry("unbounded facet form"));
    }
    let mut out: Vec<DVector<f64>> = Vec::new();
    for comb in index_combinations(hs.len(), dim) {
        let mut a = DMatrix::<f64>::zeros(dim, dim);
        let mut b = DVector::<f64>::zeros(dim);
        for (r, &i) in comb.iter().enumerate() {
            a.row_mut(r).copy_from(&hs[i].n.transpose());
            b[r] = hs[i].c;
        }
        let lu = a.full_piv_lu();
        if lu.determinant().abs() < DET_EPS {
            continue;
        }
        if let Some(x) = lu.solve(&b) {
            if hs.iter().all(|h| h.satisfies(&x)) {
                out.push(x);
            }
        }
    }
    dedup_points_in_place(&mut out, FEAS_EPS);
    Ok(out)
}

/// True when the recession cone `{ d : n_i·d <= 0 }` contains a nonzero
/// direction, i.e. the facet form is unbounded. Probed per signed axis:
/// maximize `±d_j` over the cone under a unit cap, so each program is
/// feasible (`d = 0`) and bounded by construction; a positive optimum is a
/// recession direction scaled to the cap.
fn has_recession_direction(dim: usize, hs: &[Halfspace]) -> Result<bool, SreachError> {
    let nrows = hs.len() + 1;
    let mut base = DMatrix::<f64>::zeros(nrows, dim);
    for (i, h) in hs.iter().enumerate() {
        base.row_mut(i).copy_from(&h.n.transpose());
    }
    let mut b = DVector::<f64>::zeros(nrows);
    b[hs.len()] = 1.0;
    for j in 0..dim {
        for sign in [1.0, -1.0] {
            let mut a = base.clone();
            a[(hs.len(), j)] = sign;
            let mut obj = DVector::<f64>::zeros(dim);
            obj[j] = sign;
            let out = DenseSimplex.solve(&LinearProgram::new(obj, a, b.clone()));
            match out.status {
                LpStatus::Solved | LpStatus::SolvedInaccurate => {
                    if out.value.unwrap_or(0.0) > 0.5 {
                        return Ok(true);
                    }
                }
                LpStatus::Unbounded => return Ok(true),
                LpStatus::Infeasible | LpStatus::Error => {
                    return Err(SreachError::geometry(
                        "recession probe failed on a feasible cone program",
                    ))
                }
            }
        }
    }
    Ok(false)
}

fn h_to_vertices_1d(hs: &[Halfspace]) -> Result<Vec<DVector<f64>>, SreachError> {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;
    for h in hs {
        let n = h.n[0];
        if n.abs() < DET_EPS {
            if h.c < -FEAS_EPS {
                return Ok(Vec::new()); // contradictory 0 <= c
            }
            continue;
        }
        let bound = h.c / n;
        if n > 0.0 {
            hi = hi.min(bound);
        } else {
            lo = lo.max(bound);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return Err(SreachError::geometry("unbounded 1-D facet form"));
    }
    if lo > hi + FEAS_EPS {
        return Ok(Vec::new());
    }
    if (hi - lo).abs() < FEAS_EPS {
        return Ok(vec![DVector::from_element(1, lo)]);
    }
    Ok(vec![
        DVector::from_element(1, lo),
        DVector::from_element(1, hi),
    ])
}

/// Recover a facet form from a vertex cloud.
///
/// Dimension dispatch: 1-D interval, 2-D hull edges (with a segment special
/// case), >=3-D supporting-hyperplane enumeration over vertex tuples.
pub(crate) fn v_to_halfspaces(
    dim: usize,
    vs: &[DVector<f64>],
) -> Result<Vec<Halfspace>, SreachError> {
    if vs.is_empty() {
        return Err(SreachError::geometry("facet form of an empty vertex set"));
    }
    match dim {
        1 => Ok(v_to_halfspaces_1d(vs)),
        2 => v_to_halfspaces_2d(vs),
        _ => v_to_halfspaces_nd(dim, vs),
    }
}

fn v_to_halfspaces_1d(vs: &[DVector<f64>]) -> Vec<Halfspace> {
    let lo = vs.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let hi = vs.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
    vec![
        Halfspace::new(DVector::from_element(1, 1.0), hi),
        Halfspace::new(DVector::from_element(1, -1.0), -lo),
    ]
}

/// CCW hull edges with outward normals `(e_y, -e_x)`; collinear clouds
/// degenerate to a segment (two parallel cuts plus two end cuts).
fn v_to_halfspaces_2d(vs: &[DVector<f64>]) -> Result<Vec<Halfspace>, SreachError> {
    if let Some(hull) = convex_hull_2d(vs) {
        let mut out = Vec::with_capacity(hull.len());
        for k in 0..hull.len() {
            let p = &hull[k];
            let q = &hull[(k + 1) % hull.len()];
            let ex = q[0] - p[0];
            let ey = q[1] - p[1];
            let norm = (ex * ex + ey * ey).sqrt();
            if norm < FEAS_EPS {
                continue;
            }
            let n = DVector::from_vec(vec![ey / norm, -ex / norm]);
            let c = n.dot(p);
            out.push(Halfspace::new(n, c));
        }
        return Ok(out);
    }
    // Collinear: direction of maximal spread plus its perpendicular.
    let p0 = &vs[0];
    let far = vs
        .iter()
        .max_by(|a, b| {
            let da = (*a - p0).norm();
            let db = (*b - p0).norm();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .ok_or_else(|| SreachError::geometry("empty vertex set"))?;
    let t = far - p0;
    let tn = t.norm();
    if tn < FEAS_EPS {
        // Single point: box it exactly.
        let n1 = DVector::from_vec(vec![1.0, 0.0]);
        let n2 = DVector::from_vec(vec![0.0, 1.0]);
        return Ok(vec![
            Halfspace::new(n1.clone(), p0[0]),
            Halfspace::new(-n1, -p0[0]),
            Halfspace::new(n2.clone(), p0[1]),
            Halfspace::new(-n2, -p0[1]),
        ]);
    }
    let t = t / tn;
    let perp = DVector::from_vec(vec![-t[1], t[0]]);
    let along: Vec<f64> = vs.iter().map(|p| t.dot(p)).collect();
    let lo = along.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = along.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let off = perp.dot(p0);
    Ok(vec![
        Halfspace::new(t.clone(), hi),
        Halfspace::new(-t, -lo),
        Halfspace::new(perp.clone(), off),
        Halfspace::new(-perp, -off),
    ])
}

fn v_to_halfspaces_nd(dim: usize, vs: &[DVector<f64>]) -> Result<Vec<Halfspace>, SreachError> {
    if vs.len() < dim {
        return Err(SreachError::geometry(format!(
            "{} vertices cannot span facets in dimension {}",
            vs.len(),
            dim
        )));
    }
    let mut out: Vec<Halfspace> = Vec::new();
    let mut seen: HashSet<Vec<i64>> = HashSet::new();
    for comb in index_combinations(vs.len(), dim) {
        let Some(n) = hyperplane_normal(dim, vs, &comb) else {
            continue;
        };
        let c = n.dot(&vs[comb[0]]);
        let forward = vs.iter().all(|p| n.dot(p) <= c + FEAS_EPS);
        let backward = vs.iter().all(|p| n.dot(p) >= c - FEAS_EPS);
        if forward {
            let key = quantize_plane(&n, c, FEAS_EPS);
            if seen.insert(key) {
                out.push(Halfspace::new(n.clone(), c));
            }
        }
        if backward {
            let n = -n;
            let c = -c;
            let key = quantize_plane(&n, c, FEAS_EPS);
            if seen.insert(key) {
                out.push(Halfspace::new(n, c));
            }
        }
    }
    if out.is_empty() {
        return Err(SreachError::geometry(
            "no supporting hyperplanes found (degenerate vertex set)",
        ));
    }
    Ok(out)
}

/// Unit normal of the hyperplane through `dim` vertices, or `None` when the
/// tuple is affinely degenerate. Found as the right singular vector of the
/// difference matrix belonging to its (unique) zero singular value.
fn hyperplane_normal(dim: usize, vs: &[DVector<f64>], comb: &[usize]) -> Option<DVector<f64>> {
    let p0 = &vs[comb[0]];
    let mut m = DMatrix::<f64>::zeros(dim, dim);
    for r in 1..dim {
        let d = &vs[comb[r]] - p0;
        m.row_mut(r - 1).copy_from(&d.transpose());
    }
    // Last row stays zero; the padded square matrix always has a zero
    // singular value whose right vector is the sought normal, provided the
    // differences themselves have full rank dim-1.
    let svd = SVD::new(m, false, true);
    let v_t = svd.v_t?;
    let sv = &svd.singular_values;
    let mut min_i = 0;
    for i in 1..sv.len() {
        if sv[i] < sv[min_i] {
            min_i = i;
        }
    }
    // Degenerate tuple: a second vanishing singular value.
    let second_min = sv
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != min_i)
        .map(|(_, s)| *s)
        .fold(f64::INFINITY, f64::min);
    if second_min < DET_EPS.sqrt() {
        return None;
    }
    let n = v_t.row(min_i).transpose();
    let norm = n.norm();
    if norm < DET_EPS || !norm.is_finite() {
        return None;
    }
    Some(n / norm)
}
