//! Curated internal API surface (UNSTABLE).
//!
//! Convenience re-exports grouped by concern; prefer these in experiments
//! and downstream tooling for consistency.

// Set geometry
pub use crate::geom::{ChebyshevBall, ConvexSet, Disturbance, Halfspace, SupportFnSet};
// Direction sampling
pub use crate::dirs::{spread_directions, DirectionSet};
// Optimization seam
pub use crate::lp::shoot::{boundary_point, BoundaryPoint};
pub use crate::lp::{DenseSimplex, LinearProgram, LpBackend, LpOutcome, LpStatus};
// System inputs
pub use crate::sys::{
    DisturbanceLevelSet, DisturbanceList, Dynamics, FixedDisturbance, ScaledDisturbance, Tube,
};
// Engine
pub use crate::lag::{sreach_set_lag, ApproxMode, BoundaryRecord, LagOptions, LagResult};
// Diagnostics and errors
pub use crate::diag::{DiagCode, DiagSink, Diagnostic};
pub use crate::error::SreachError;
