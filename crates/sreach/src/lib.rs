//! Lagrangian approximation of stochastic reach-avoid sets for linear
//! systems with additive disturbance.
//!
//! The engine converts a probabilistic staying-in-the-tube guarantee into
//! a deterministic set-based one by scaling a bounded disturbance set to
//! the required per-step level, then propagates convex targets backward
//! through the dynamics one step at a time. The deliverable is a set of
//! admissible initial states: an under- or over-approximation of the true
//! reach-avoid set, which has no closed form in general.

pub mod api;
pub mod diag;
pub mod dirs;
pub mod error;
pub mod geom;
pub mod lag;
pub mod lp;
pub mod sys;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::dirs::{spread_directions, DirectionSet};
    pub use crate::error::SreachError;
    pub use crate::geom::{ConvexSet, Disturbance, Halfspace, SupportFnSet};
    pub use crate::lag::{sreach_set_lag, ApproxMode, LagOptions, LagResult};
    pub use crate::lp::{DenseSimplex, LpBackend};
    pub use crate::sys::{
        DisturbanceLevelSet, DisturbanceList, Dynamics, FixedDisturbance, ScaledDisturbance,
        Tube,
    };
}
