//! Convex-optimization seam: problem/outcome types, the backend trait, and
//! the default dense simplex.
//!
//! Why a seam
//! - The recursion treats optimization as a stateless external service:
//!   submit a well-formed program, receive a status and optional solution.
//!   Backends are substitutable without touching recursion logic, which is
//!   also what makes solver fault injection testable.

mod simplex;

pub mod shoot;

pub use simplex::DenseSimplex;

#[cfg(test)]
mod tests;

use nalgebra::{DMatrix, DVector};

/// Maximize `objective · x` subject to `a x <= b`, `x` free.
#[derive(Clone, Debug)]
pub struct LinearProgram {
    pub objective: DVector<f64>,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
}

impl LinearProgram {
    pub fn new(objective: DVector<f64>, a: DMatrix<f64>, b: DVector<f64>) -> Self {
        debug_assert_eq!(a.ncols(), objective.len());
        debug_assert_eq!(a.nrows(), b.len());
        Self { objective, a, b }
    }

    pub fn nvars(&self) -> usize {
        self.objective.len()
    }
}

/// Solver status classification. `SolvedInaccurate` is accepted with an
/// advisory; the remaining non-solved statuses are terminal for the caller
/// to interpret (legitimately empty for feasibility probes, fatal for
/// guaranteed-feasible programs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LpStatus {
    Solved,
    SolvedInaccurate,
    Infeasible,
    Unbounded,
    Error,
}

/// Status plus optional optimizer and objective value.
#[derive(Clone, Debug)]
pub struct LpOutcome {
    pub status: LpStatus,
    pub x: Option<DVector<f64>>,
    pub value: Option<f64>,
}

impl LpOutcome {
    pub fn terminal(status: LpStatus) -> Self {
        Self {
            status,
            x: None,
            value: None,
        }
    }
}

/// Stateless optimization backend. `Sync` because per-direction solves are
/// dispatched to a worker pool over shared read-only inputs.
pub trait LpBackend: Sync {
    fn solve(&self, prob: &LinearProgram) -> LpOutcome;
}
