//! Convex-set geometry: dual-represented polytopes and their set algebra.
//!
//! Purpose
//! - Provide the `ConvexSet` the backward recursion runs on: facet and
//!   vertex forms as lazy caches, exact intersection and Minkowski
//!   tightening, projection, preimage lifting, and the Chebyshev anchor.
//! - Keep disturbance representations behind a sealed variant so the
//!   tightening update dispatches by pattern match.
//!
//! Code cross-refs: `types::{Halfspace, ConvexSet}`, `ops`, `convert`,
//! `support::{SupportFnSet, Disturbance}`.

mod cfg;
mod convert;
mod ops;
mod support;
mod types;
mod util;

pub use ops::ChebyshevBall;
pub use support::{Disturbance, SupportFnSet};
pub use types::{ConvexSet, Halfspace};

pub(crate) use cfg::CONVERT_DIM_WARN;
#[cfg(test)]
pub(crate) use util::convex_hull_2d;

#[cfg(test)]
mod tests;
