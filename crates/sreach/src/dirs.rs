//! Direction-vector sets for boundary sampling.
//!
//! Purpose
//! - A fixed matrix of unit columns, chosen once per invocation and reused
//!   at every time step. Under-approximation shoots rays along lifted
//!   (state+input) directions; over-approximation evaluates support along
//!   state-only directions.
//! - Dimension mismatch against the space a set will be used in is a fatal
//!   configuration error, never a runtime warning.
//!
//! Determinism
//! - Sampling above 2-D uses a seeded `StdRng`, so a `(count, dim, seed)`
//!   triple always reproduces the same direction set.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SreachError;

const UNIT_TOL: f64 = 1e-9;

/// Fixed collection of unit direction vectors (matrix columns).
#[derive(Clone, Debug)]
pub struct DirectionSet {
    mat: DMatrix<f64>,
}

impl DirectionSet {
    /// Wrap a caller-supplied matrix; every column must have unit norm.
    pub fn new(mat: DMatrix<f64>) -> Result<Self, SreachError> {
        if mat.ncols() == 0 || mat.nrows() == 0 {
            return Err(SreachError::invalid("direction set must be nonempty"));
        }
        for j in 0..mat.ncols() {
            let norm = mat.column(j).norm();
            if (norm - 1.0).abs() > UNIT_TOL {
                return Err(SreachError::invalid(format!(
                    "direction column {j} has norm {norm}, expected 1"
                )));
            }
        }
        Ok(Self { mat })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.mat.nrows()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mat.ncols()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // construction guarantees at least one column
    }

    #[inline]
    pub fn column(&self, j: usize) -> DVector<f64> {
        self.mat.column(j).into_owned()
    }

    pub fn iter(&self) -> impl Iterator<Item = DVector<f64>> + '_ {
        (0..self.len()).map(|j| self.column(j))
    }

    /// Map every direction into a subspace spanned by the columns of
    /// `basis` (dim × k, applied as `basis · d` for k-dimensional `d`) and
    /// re-normalize. Used to restrict sampling to an affine slice.
    pub fn restrict_to_span(&self, basis: &DMatrix<f64>) -> Result<Self, SreachError> {
        if basis.ncols() != self.dim() {
            return Err(SreachError::invalid(
                "restriction basis does not match direction dimension",
            ));
        }
        let mut mat = DMatrix::<f64>::zeros(basis.nrows(), self.len());
        for j in 0..self.len() {
            let mapped = basis * self.column(j);
            let norm = mapped.norm();
            if norm < UNIT_TOL {
                return Err(SreachError::invalid(format!(
                    "direction column {j} vanishes under the restriction basis"
                )));
            }
            mat.set_column(j, &(mapped / norm));
        }
        Self::new(mat)
    }
}

/// Spread `count` unit directions across R^dim.
///
/// 1-D alternates the two signs; 2-D uses equally spaced angles; higher
/// dimensions draw seeded Gaussian samples and normalize. The result is a
/// function of `(count, dim, seed)` alone; in the sampled regime a larger
/// count extends the smaller one as a prefix (2-D respaces the angles).
pub fn spread_directions(count: usize, dim: usize, seed: u64) -> Result<DirectionSet, SreachError> {
    if count == 0 || dim == 0 {
        return Err(SreachError::invalid(
            "direction spread needs positive count and dimension",
        ));
    }
    let mut mat = DMatrix::<f64>::zeros(dim, count);
    match dim {
        1 => {
            for j in 0..count {
                mat[(0, j)] = if j % 2 == 0 { 1.0 } else { -1.0 };
            }
        }
        2 => {
            for j in 0..count {
                let th = std::f64::consts::TAU * (j as f64) / (count as f64);
                mat[(0, j)] = th.cos();
                mat[(1, j)] = th.sin();
            }
        }
        _ => {
            let mut rng = StdRng::seed_from_u64(seed);
            for j in 0..count {
                loop {
                    let mut v = DVector::<f64>::zeros(dim);
                    for i in 0..dim {
                        // Box-Muller pair from two uniforms.
                        let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
                        let u2: f64 = rng.gen::<f64>();
                        v[i] = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
                    }
                    let norm = v.norm();
                    if norm > UNIT_TOL {
                        mat.set_column(j, &(v / norm));
                        break;
                    }
                }
            }
        }
    }
    DirectionSet::new(mat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_unit_columns() {
        let mat = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 0.0]);
        assert!(DirectionSet::new(mat).is_err());
        let mat = DMatrix::from_row_slice(1, 1, &[0.0]);
        assert!(DirectionSet::new(mat).is_err());
    }

    #[test]
    fn spread_is_deterministic_and_prefix_stable() {
        let a = spread_directions(6, 5, 13).expect("dirs");
        let b = spread_directions(6, 5, 13).expect("dirs");
        let c = spread_directions(12, 5, 13).expect("dirs");
        for j in 0..6 {
            assert_eq!(a.column(j).as_slice(), b.column(j).as_slice());
            assert_eq!(a.column(j).as_slice(), c.column(j).as_slice());
        }
        for j in 0..12 {
            assert!((c.column(j).norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn planar_spread_covers_the_circle() {
        let d = spread_directions(4, 2, 0).expect("dirs");
        assert_eq!(d.len(), 4);
        // Opposite columns cancel pairwise.
        let sum = d.column(0) + d.column(1) + d.column(2) + d.column(3);
        assert!(sum.norm() < 1e-9);
    }

    #[test]
    fn restriction_maps_and_renormalizes() {
        let d = spread_directions(3, 2, 0).expect("dirs");
        // Embed the plane into the x-z coordinates of R^3.
        let basis = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let r = d.restrict_to_span(&basis).expect("restricted");
        assert_eq!(r.dim(), 3);
        for j in 0..r.len() {
            assert!((r.column(j).norm() - 1.0).abs() < 1e-12);
            assert!(r.column(j)[1].abs() < 1e-12);
        }
    }
}
