//! Support-function disturbance sets and the disturbance variant.
//!
//! Why support functions
//! - Minkowski tightening only ever evaluates the disturbance along facet
//!   normals: `c' = c - sup_{w} n·w`. An ellipsoid answers that query in
//!   closed form, so no vertex enumeration of the disturbance is needed.
//!   This is the reason ellipsoidal disturbances are preferred above two
//!   dimensions.

use nalgebra::{DMatrix, DVector};

use super::types::ConvexSet;
use crate::error::SreachError;

/// Convex set exposed only through its support function.
#[derive(Clone, Debug)]
pub enum SupportFnSet {
    /// Euclidean ball `{ c + r u : ||u|| <= 1 }`.
    Ball { center: DVector<f64>, radius: f64 },
    /// Ellipsoid `{ c + L u : ||u|| <= 1 }` with `shape = L Lᵀ` (positive
    /// semidefinite).
    Ellipsoid {
        center: DVector<f64>,
        shape: DMatrix<f64>,
    },
}

impl SupportFnSet {
    pub fn dim(&self) -> usize {
        match self {
            SupportFnSet::Ball { center, .. } => center.len(),
            SupportFnSet::Ellipsoid { center, .. } => center.len(),
        }
    }

    /// `sup_{w in W} dir · w`.
    pub fn support_value(&self, dir: &DVector<f64>) -> f64 {
        match self {
            SupportFnSet::Ball { center, radius } => center.dot(dir) + radius * dir.norm(),
            SupportFnSet::Ellipsoid { center, shape } => {
                let q = (dir.transpose() * shape * dir)[(0, 0)];
                center.dot(dir) + q.max(0.0).sqrt()
            }
        }
    }

    /// Scale about the origin: `k·W = { k w : w ∈ W }` for `k > 0`.
    pub fn scale(&self, k: f64) -> Result<Self, SreachError> {
        if !(k > 0.0) || !k.is_finite() {
            return Err(SreachError::invalid(format!(
                "scale factor {k} must be positive and finite"
            )));
        }
        Ok(match self {
            SupportFnSet::Ball { center, radius } => SupportFnSet::Ball {
                center: center * k,
                radius: radius * k,
            },
            SupportFnSet::Ellipsoid { center, shape } => SupportFnSet::Ellipsoid {
                center: center * k,
                shape: shape * (k * k),
            },
        })
    }

    /// Image under `w -> F w`; closed under linear maps.
    pub fn linear_image(&self, f: &DMatrix<f64>) -> Result<Self, SreachError> {
        if f.ncols() != self.dim() {
            return Err(SreachError::invalid(
                "disturbance map dimension mismatch",
            ));
        }
        Ok(match self {
            SupportFnSet::Ball { center, radius } => SupportFnSet::Ellipsoid {
                center: f * center,
                shape: (f * f.transpose()) * (radius * radius),
            },
            SupportFnSet::Ellipsoid { center, shape } => SupportFnSet::Ellipsoid {
                center: f * center,
                shape: f * shape * f.transpose(),
            },
        })
    }
}

/// Disturbance representation variant. Sealed: tightening dispatches by
/// pattern match, never by open-ended type inspection.
#[derive(Clone, Debug)]
pub enum Disturbance {
    Polytope(ConvexSet),
    SupportFn(SupportFnSet),
}

impl Disturbance {
    pub fn dim(&self) -> usize {
        match self {
            Disturbance::Polytope(p) => p.dim(),
            Disturbance::SupportFn(s) => s.dim(),
        }
    }

    /// `sup_{w in W} dir · w`; exact for both variants.
    pub fn support(&self, dir: &DVector<f64>) -> Result<f64, SreachError> {
        match self {
            Disturbance::Polytope(p) => p.support(dir),
            Disturbance::SupportFn(s) => Ok(s.support_value(dir)),
        }
    }

    /// Image under the per-step disturbance matrix `w -> F w`.
    pub fn linear_image(&self, f: &DMatrix<f64>) -> Result<Self, SreachError> {
        Ok(match self {
            Disturbance::Polytope(p) => Disturbance::Polytope(p.linear_image(f)?),
            Disturbance::SupportFn(s) => Disturbance::SupportFn(s.linear_image(f)?),
        })
    }

    /// Scale about the origin by `k > 0`.
    pub fn scale(&self, k: f64) -> Result<Self, SreachError> {
        Ok(match self {
            Disturbance::Polytope(p) => Disturbance::Polytope(p.scale(k)?),
            Disturbance::SupportFn(s) => Disturbance::SupportFn(s.scale(k)?),
        })
    }
}
