//! Error taxonomy for the Lagrangian reach-avoid engine.
//!
//! Policy
//! - `InvalidArguments` is raised at the API boundary before any recursion
//!   runs; it is never retried internally.
//! - `InternalInconsistency` means a convex program that is feasible by
//!   construction reported otherwise. The whole recursion aborts; a partial
//!   effective-target tube is never returned.
//! - Advisory conditions (inaccurate solves, high-dimension conversions,
//!   hull merges beyond 2D) are not errors; see `diag`.

use thiserror::Error;

use crate::lp::LpStatus;

#[derive(Debug, Error)]
pub enum SreachError {
    /// Caller-supplied arguments are malformed or mutually inconsistent.
    #[error("invalid arguments: {what}")]
    InvalidArguments { what: String },

    /// A guaranteed-feasible convex program reported a non-solved status.
    /// Carries enough context to reproduce the offending solve.
    #[error(
        "internal inconsistency at step {step}, direction {dir}, realization {realization}: \
         solver returned {status:?} on a feasible program"
    )]
    InternalInconsistency {
        step: usize,
        dir: usize,
        realization: usize,
        status: LpStatus,
    },

    /// Representation conversion failed on degenerate or unbounded input.
    #[error("geometry error: {what}")]
    Geometry { what: String },
}

impl SreachError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        SreachError::InvalidArguments { what: what.into() }
    }

    pub(crate) fn geometry(what: impl Into<String>) -> Self {
        SreachError::Geometry { what: what.into() }
    }
}
