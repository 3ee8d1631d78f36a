//! Core set types: halfspaces and dual-represented convex polytopes.
//!
//! Purpose
//! - `ConvexSet` carries both a facet (H) and a vertex (V) description as
//!   lazily populated caches; at least one is valid at any time unless the
//!   set is the canonical empty set. Conversion between the two is computed
//!   on demand and is the dominant cost driver above dimension four.
//!
//! Invariants
//! - All normals have the ambient dimension of the set.
//! - Sets entering Minkowski operations are nonempty and bounded; callers
//!   establish this (tube validation, input-space validation).

use nalgebra::{DMatrix, DVector};

use super::cfg::FEAS_EPS;
use super::convert::{h_to_vertices, v_to_halfspaces};
use crate::error::SreachError;

/// Closed halfspace `n · x <= c` in R^dim.
///
/// `n` is not required to be normalized; membership uses `<= c + FEAS_EPS`.
#[derive(Clone, Debug)]
pub struct Halfspace {
    pub n: DVector<f64>,
    pub c: f64,
}

impl Halfspace {
    #[inline]
    pub fn new(n: DVector<f64>, c: f64) -> Self {
        Self { n, c }
    }

    #[inline]
    pub fn satisfies_eps(&self, p: &DVector<f64>, eps: f64) -> bool {
        self.n.dot(p) <= self.c + eps
    }

    #[inline]
    pub fn satisfies(&self, p: &DVector<f64>) -> bool {
        self.satisfies_eps(p, FEAS_EPS)
    }
}

/// Convex polytope with dual H/V caches.
#[derive(Clone, Debug)]
pub struct ConvexSet {
    dim: usize,
    h: Vec<Halfspace>,
    v: Vec<DVector<f64>>,
    empty: bool,
}

impl ConvexSet {
    /// Facet-form constructor. Normals must match `dim`.
    pub fn from_halfspaces(dim: usize, h: Vec<Halfspace>) -> Result<Self, SreachError> {
        for hs in &h {
            if hs.n.len() != dim {
                return Err(SreachError::invalid(format!(
                    "halfspace normal has length {}, expected {}",
                    hs.n.len(),
                    dim
                )));
            }
        }
        Ok(Self {
            dim,
            h,
            v: Vec::new(),
            empty: false,
        })
    }

    /// Facet-form constructor from matrix data `A x <= b`, with optional
    /// equality rows `Ae x = be` expanded into paired inequalities.
    pub fn from_facets(
        a: &DMatrix<f64>,
        b: &DVector<f64>,
        eq: Option<(&DMatrix<f64>, &DVector<f64>)>,
    ) -> Result<Self, SreachError> {
        if a.nrows() != b.len() {
            return Err(SreachError::invalid(format!(
                "facet matrix has {} rows but offset vector has length {}",
                a.nrows(),
                b.len()
            )));
        }
        let dim = a.ncols();
        let mut h = Vec::with_capacity(a.nrows());
        for i in 0..a.nrows() {
            h.push(Halfspace::new(a.row(i).transpose(), b[i]));
        }
        if let Some((ae, be)) = eq {
            if ae.ncols() != dim || ae.nrows() != be.len() {
                return Err(SreachError::invalid(
                    "equality rows inconsistent with facet dimension",
                ));
            }
            for i in 0..ae.nrows() {
                let n = ae.row(i).transpose();
                h.push(Halfspace::new(n.clone(), be[i]));
                h.push(Halfspace::new(-n, -be[i]));
            }
        }
        Self::from_halfspaces(dim, h)
    }

    /// Vertex-form constructor. All points must share a dimension.
    pub fn from_vertices(dim: usize, v: Vec<DVector<f64>>) -> Result<Self, SreachError> {
        for p in &v {
            if p.len() != dim {
                return Err(SreachError::invalid(format!(
                    "vertex has length {}, expected {}",
                    p.len(),
                    dim
                )));
            }
        }
        if v.is_empty() {
            return Ok(Self::empty(dim));
        }
        Ok(Self {
            dim,
            h: Vec::new(),
            v,
            empty: false,
        })
    }

    /// Axis-aligned box `prod_i [lower_i, upper_i]`, both representations.
    pub fn box_nd(lower: &[f64], upper: &[f64]) -> Result<Self, SreachError> {
        if lower.len() != upper.len() || lower.is_empty() {
            return Err(SreachError::invalid("box bounds length mismatch"));
        }
        let dim = lower.len();
        if lower.iter().zip(upper).any(|(l, u)| l > u) {
            return Ok(Self::empty(dim));
        }
        let mut h = Vec::with_capacity(2 * dim);
        for i in 0..dim {
            let mut n = DVector::zeros(dim);
            n[i] = 1.0;
            h.push(Halfspace::new(n.clone(), upper[i]));
            h.push(Halfspace::new(-n, -lower[i]));
        }
        Self::from_halfspaces(dim, h)
    }

    /// 1-D interval `[lo, hi]`; inverted bounds give the empty set.
    pub fn interval(lo: f64, hi: f64) -> Self {
        if lo > hi {
            return Self::empty(1);
        }
        Self {
            dim: 1,
            h: vec![
                Halfspace::new(DVector::from_element(1, 1.0), hi),
                Halfspace::new(DVector::from_element(1, -1.0), -lo),
            ],
            v: vec![
                DVector::from_element(1, lo),
                DVector::from_element(1, hi),
            ],
            empty: false,
        }
    }

    /// The canonical empty set in R^dim.
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            h: Vec::new(),
            v: Vec::new(),
            empty: true,
        }
    }

    /// Singleton `{p}`.
    pub fn singleton(p: DVector<f64>) -> Self {
        let dim = p.len();
        Self {
            dim,
            h: Vec::new(),
            v: vec![p],
            empty: false,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// True for the canonical empty set (the marker, not an LP emptiness
    /// certificate; facet forms may still be infeasible and are detected
    /// when a Chebyshev center is requested).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    #[inline]
    pub(crate) fn set_vertex_cache(&mut self, v: Vec<DVector<f64>>) {
        self.v = v;
    }

    pub(crate) fn shift_in_place(&mut self, t: &DVector<f64>) {
        for hs in &mut self.h {
            hs.c += hs.n.dot(t);
        }
        for p in &mut self.v {
            *p += t;
        }
    }

    pub(crate) fn scale_in_place(&mut self, k: f64) {
        for hs in &mut self.h {
            hs.c *= k;
        }
        for p in &mut self.v {
            *p *= k;
        }
    }

    /// Facet form, converting from vertices when required.
    pub fn halfspaces(&self) -> Result<Vec<Halfspace>, SreachError> {
        if self.empty {
            return Err(SreachError::geometry("facet form of the empty set"));
        }
        if !self.h.is_empty() {
            return Ok(self.h.clone());
        }
        let h = v_to_halfspaces(self.dim, &self.v)?;
        Ok(h)
    }

    /// Vertex form, converting from facets when required. An infeasible
    /// facet form yields no vertices; callers read that as empty.
    pub fn vertices(&self) -> Result<Vec<DVector<f64>>, SreachError> {
        if self.empty {
            return Ok(Vec::new());
        }
        if !self.v.is_empty() {
            return Ok(self.v.clone());
        }
        h_to_vertices(self.dim, &self.h)
    }

    /// Same set with both caches populated.
    pub fn canonicalize(&self) -> Result<Self, SreachError> {
        if self.empty {
            return Ok(self.clone());
        }
        let h = self.halfspaces()?;
        let v = self.vertices()?;
        Ok(Self {
            dim: self.dim,
            h,
            v,
            empty: false,
        })
    }

    /// Membership with signed slack; `eps > 0` is permissive, `eps < 0`
    /// strict.
    pub fn contains_eps(&self, p: &DVector<f64>, eps: f64) -> bool {
        if self.empty {
            return false;
        }
        if !self.h.is_empty() {
            return self.h.iter().all(|hs| hs.satisfies_eps(p, eps));
        }
        // Vertex-only cache: fall back to conversion.
        match v_to_halfspaces(self.dim, &self.v) {
            Ok(h) => h.iter().all(|hs| hs.satisfies_eps(p, eps)),
            Err(_) => false,
        }
    }

    /// Support value `max_{x in S} dir · x`, via the vertex form.
    pub fn support(&self, dir: &DVector<f64>) -> Result<f64, SreachError> {
        let vs = self.vertices()?;
        vs.iter()
            .map(|p| dir.dot(p))
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| SreachError::geometry("support of the empty set"))
    }

    /// Image under a linear map `x -> M x` (vertex map).
    pub fn linear_image(&self, m: &DMatrix<f64>) -> Result<Self, SreachError> {
        if m.ncols() != self.dim {
            return Err(SreachError::invalid("linear image dimension mismatch"));
        }
        if self.empty {
            return Ok(Self::empty(m.nrows()));
        }
        let vs = self.vertices()?;
        let mapped: Vec<DVector<f64>> = vs.iter().map(|p| m * p).collect();
        Self::from_vertices(m.nrows(), mapped)
    }
}
