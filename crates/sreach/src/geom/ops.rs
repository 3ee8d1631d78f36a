//! Set algebra on `ConvexSet`: intersection, Minkowski tightening and
//! inflation, projection, preimage lifting, Chebyshev center.
//!
//! All operations are pure; each returns a new set. Facet-form results do
//! not carry vertices (the cache is rebuilt on demand).

use nalgebra::{DMatrix, DVector};

use super::convert::{h_to_vertices, v_to_halfspaces};
use super::support::Disturbance;
use super::types::{ConvexSet, Halfspace};
use crate::error::SreachError;
use crate::lp::{LinearProgram, LpBackend, LpStatus};

/// Chebyshev ball of a facet-form set: the largest inscribed ball.
///
/// The anchor of every ray-shooting program is such a center, which is what
/// makes those programs feasible by construction.
#[derive(Clone, Debug)]
pub struct ChebyshevBall {
    pub center: DVector<f64>,
    pub radius: f64,
    /// Solver reported a solved-but-inaccurate status; accept, advise.
    pub inaccurate: bool,
}

impl ConvexSet {
    /// Intersection by facet concatenation. Cheap; no reduction is
    /// performed.
    pub fn intersect(&self, other: &ConvexSet) -> Result<ConvexSet, SreachError> {
        if self.dim() != other.dim() {
            return Err(SreachError::invalid(format!(
                "intersection dimension mismatch: {} vs {}",
                self.dim(),
                other.dim()
            )));
        }
        if self.is_empty() || other.is_empty() {
            return Ok(ConvexSet::empty(self.dim()));
        }
        let mut h = self.halfspaces()?;
        h.extend(other.halfspaces()?);
        ConvexSet::from_halfspaces(self.dim(), h)
    }

    /// Minkowski difference `self ⊖ W`: per facet normal `n`, the offset
    /// tightens to `c - sup_{w in W} n·w`. Exact for facet-form `self` and
    /// bounded `W`; this is the robustification step of the backward
    /// recursion.
    pub fn minkowski_difference(&self, w: &Disturbance) -> Result<ConvexSet, SreachError> {
        self.minkowski_offset(w, -1.0)
    }

    /// H-rep outer bound of the Minkowski sum `self ⊕ W`: per facet normal
    /// the offset relaxes to `c + sup_{w in W} n·w`. One-sided by design
    /// (a superset of the true sum); used only by the over-approximation
    /// recursion, where that direction of error is the sound one.
    pub fn minkowski_sum_outer(&self, w: &Disturbance) -> Result<ConvexSet, SreachError> {
        self.minkowski_offset(w, 1.0)
    }

    fn minkowski_offset(&self, w: &Disturbance, sign: f64) -> Result<ConvexSet, SreachError> {
        if w.dim() != self.dim() {
            return Err(SreachError::invalid(format!(
                "disturbance dimension {} does not match set dimension {}",
                w.dim(),
                self.dim()
            )));
        }
        if self.is_empty() {
            return Ok(ConvexSet::empty(self.dim()));
        }
        let hs = self.halfspaces()?;
        let mut out = Vec::with_capacity(hs.len());
        for h in hs {
            let s = w.support(&h.n)?;
            out.push(Halfspace::new(h.n, h.c + sign * s));
        }
        ConvexSet::from_halfspaces(self.dim(), out)
    }

    /// Translate by `t`. Both caches survive: facet offsets shift by
    /// `n·t`, vertices by `t`.
    pub fn translate(&self, t: &DVector<f64>) -> Result<ConvexSet, SreachError> {
        if t.len() != self.dim() {
            return Err(SreachError::invalid("translation dimension mismatch"));
        }
        if self.is_empty() {
            return Ok(self.clone());
        }
        let mut out = self.clone();
        out.shift_in_place(t);
        Ok(out)
    }

    /// Scale about the origin by `k > 0`. Facet offsets and vertices both
    /// scale linearly.
    pub fn scale(&self, k: f64) -> Result<ConvexSet, SreachError> {
        if !(k > 0.0) || !k.is_finite() {
            return Err(SreachError::invalid(format!(
                "scale factor {k} must be positive and finite"
            )));
        }
        if self.is_empty() {
            return Ok(self.clone());
        }
        let mut out = self.clone();
        out.scale_in_place(k);
        Ok(out)
    }

    /// Orthogonal projection onto coordinates `dims`: vertex projection
    /// followed by facet reconstruction. Returns a set with both
    /// representations populated.
    pub fn project(&self, dims: &[usize]) -> Result<ConvexSet, SreachError> {
        if dims.is_empty() {
            return Err(SreachError::invalid("projection onto zero coordinates"));
        }
        let mut sorted = dims.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != dims.len() || dims.iter().any(|&d| d >= self.dim()) {
            return Err(SreachError::invalid(
                "projection coordinates out of range or repeated",
            ));
        }
        let k = dims.len();
        if self.is_empty() {
            return Ok(ConvexSet::empty(k));
        }
        let vs = self.vertices()?;
        let sub: Vec<DVector<f64>> = vs
            .iter()
            .map(|p| DVector::from_iterator(k, dims.iter().map(|&d| p[d])))
            .collect();
        let h = v_to_halfspaces(k, &sub)?;
        let v = h_to_vertices(k, &h)?;
        let mut out = ConvexSet::from_halfspaces(k, h)?;
        out.set_vertex_cache(v);
        Ok(out)
    }

    /// Pull a next-state constraint set back through one step of the
    /// dynamics: `A x_{k+1} <= b` becomes `A Φ x_k + A Γ u_k <= b`, a
    /// polytope over the lifted variable `(x_k, u_k)`.
    pub fn preimage_lift(
        &self,
        state_mat: &DMatrix<f64>,
        input_mat: &DMatrix<f64>,
    ) -> Result<ConvexSet, SreachError> {
        let n = state_mat.ncols();
        let m = input_mat.ncols();
        if state_mat.nrows() != self.dim() || input_mat.nrows() != self.dim() {
            return Err(SreachError::invalid(
                "dynamics matrices do not match target dimension",
            ));
        }
        if self.is_empty() {
            return Ok(ConvexSet::empty(n + m));
        }
        let hs = self.halfspaces()?;
        let mut out = Vec::with_capacity(hs.len());
        for h in hs {
            let ax = state_mat.transpose() * &h.n;
            let au = input_mat.transpose() * &h.n;
            let mut row = DVector::zeros(n + m);
            row.rows_mut(0, n).copy_from(&ax);
            row.rows_mut(n, m).copy_from(&au);
            out.push(Halfspace::new(row, h.c));
        }
        ConvexSet::from_halfspaces(n + m, out)
    }

    /// Largest inscribed ball via one linear program over `(x, r)`:
    /// maximize `r` subject to `n_i·x + ||n_i|| r <= c_i`, `r >= 0`.
    ///
    /// `Ok(None)` means the facet form is infeasible, i.e. the set is
    /// empty; that is a legitimate outcome here, unlike in ray shooting.
    pub fn chebyshev_center(
        &self,
        backend: &dyn LpBackend,
    ) -> Result<Option<ChebyshevBall>, SreachError> {
        if self.is_empty() {
            return Ok(None);
        }
        let hs = self.halfspaces()?;
        let dim = self.dim();
        let nvars = dim + 1;
        let nrows = hs.len() + 1;
        let mut a = DMatrix::<f64>::zeros(nrows, nvars);
        let mut b = DVector::<f64>::zeros(nrows);
        for (i, h) in hs.iter().enumerate() {
            for j in 0..dim {
                a[(i, j)] = h.n[j];
            }
            a[(i, dim)] = h.n.norm();
            b[i] = h.c;
        }
        // r >= 0
        a[(hs.len(), dim)] = -1.0;
        b[hs.len()] = 0.0;
        let mut obj = DVector::zeros(nvars);
        obj[dim] = 1.0;
        let out = backend.solve(&LinearProgram::new(obj, a, b));
        match out.status {
            LpStatus::Solved | LpStatus::SolvedInaccurate => {
                let x = out
                    .x
                    .ok_or_else(|| SreachError::geometry("solver returned no point"))?;
                Ok(Some(ChebyshevBall {
                    center: x.rows(0, dim).into_owned(),
                    radius: x[dim],
                    inaccurate: out.status == LpStatus::SolvedInaccurate,
                }))
            }
            LpStatus::Infeasible => Ok(None),
            LpStatus::Unbounded => Err(SreachError::geometry(
                "chebyshev program unbounded (set is unbounded)",
            )),
            LpStatus::Error => Err(SreachError::geometry(
                "solver error in chebyshev program",
            )),
        }
    }
}
