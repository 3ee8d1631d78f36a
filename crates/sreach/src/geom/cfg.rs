//! Tolerance defaults for set geometry (internal).
//!
//! Policy
//! - Defaults are fixed constants to avoid tolerance juggling during normal
//!   development. If a caller ever needs custom epsilons we can thread a
//!   small config struct through without changing call sites broadly.

/// Feasibility/membership epsilon used by `Halfspace::satisfies` and
/// geometric dedup.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Singularity threshold for linear solves during vertex enumeration.
pub(crate) const DET_EPS: f64 = 1e-12;
/// State dimension above which dual-representation conversion is expected
/// to dominate runtime; crossing it is an advisory, not an error.
pub(crate) const CONVERT_DIM_WARN: usize = 4;
